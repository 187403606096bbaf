mod memory;
mod supabase;

use async_trait::async_trait;
use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value as JsonValue };
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;

pub use memory::InMemoryProfileStore;
pub use supabase::SupabaseProfileStore;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("profile store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid profile store url: {0}")]
    Url(#[from] url::ParseError),
}

/// A row from the external profile table, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, JsonValue>);

impl UserProfile {
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Exact-match lookup by id. Returns the first matching row, if any.
    async fn fetch_profile(&self, id: &str) -> Result<Option<UserProfile>, ProfileError>;
}

pub fn create_profile_store(args: &Args) -> Option<Arc<dyn ProfileStore>> {
    let url = args.supabase_url.as_deref().filter(|u| !u.trim().is_empty());
    let key = args.supabase_key.as_deref().filter(|k| !k.trim().is_empty());

    match (url, key) {
        (Some(url), Some(key)) =>
            match
                SupabaseProfileStore::new(
                    url,
                    key.to_string(),
                    args.profile_table.clone(),
                    args.profile_key_column.clone()
                )
            {
                Ok(store) => {
                    info!("Profile store configured: {} (table={})", url, args.profile_table);
                    Some(Arc::new(store))
                }
                Err(e) => {
                    warn!("Profile store disabled: {}", e);
                    None
                }
            }
        _ => {
            info!("Profile store not configured");
            None
        }
    }
}
