use async_trait::async_trait;
use std::collections::HashMap;

use super::{ ProfileError, ProfileStore, UserProfile };

#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: HashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, id: impl Into<String>, profile: UserProfile) -> Self {
        self.rows.insert(id.into(), profile);
        self
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profile(&self, id: &str) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.rows.get(id).cloned())
    }
}
