use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use url::Url;

use super::{ ProfileError, ProfileStore, UserProfile };

/// Reads profile rows through the Supabase PostgREST interface.
pub struct SupabaseProfileStore {
    http: HttpClient,
    base_url: Url,
    api_key: String,
    table: String,
    key_column: String,
}

impl SupabaseProfileStore {
    pub fn new(
        base_url: &str,
        api_key: String,
        table: String,
        key_column: String
    ) -> Result<Self, ProfileError> {
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Ok(Self {
            http: HttpClient::builder().build()?,
            base_url,
            api_key,
            table,
            key_column,
        })
    }

    fn table_url(&self, id: &str) -> Result<Url, ProfileError> {
        let mut url = self.base_url.join(&format!("rest/v1/{}", self.table))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair(&self.key_column, &format!("eq.{}", id))
            .append_pair("limit", "1");
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileStore {
    async fn fetch_profile(&self, id: &str) -> Result<Option<UserProfile>, ProfileError> {
        let url = self.table_url(id)?;
        debug!("Fetching profile {} from {}", id, self.table);

        let resp = self.http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProfileError::Status { status, body });
        }

        let rows: Vec<UserProfile> = resp.json().await?;
        Ok(rows.into_iter().next())
    }
}
