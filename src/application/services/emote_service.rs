//! Per-scope emote lookups

use std::sync::Arc;

use crate::application::errors::{BotError, StorageError};
use crate::domain::entities::ScopeId;
use crate::domain::traits::{Persistence, StoreKind};
use crate::infrastructure::storage::ScopedStores;

pub struct EmoteService {
    stores: ScopedStores,
}

impl EmoteService {
    pub fn new(backend: Arc<dyn Persistence>) -> Self {
        Self {
            stores: ScopedStores::new(StoreKind::Emotes, backend),
        }
    }

    pub fn stores(&self) -> &ScopedStores {
        &self.stores
    }

    pub async fn add_scope(&self, scope: ScopeId) -> Result<(), BotError> {
        tracing::info!("Tracking emotes for scope {}", scope);
        self.stores.open(scope).await?;
        Ok(())
    }

    /// The stored payload for `name`, if the scope has one
    pub async fn lookup(&self, scope: ScopeId, name: &str) -> Result<Option<String>, BotError> {
        let store = self.stores.open(scope).await?;
        let store = store.lock().await;
        match store.get(name) {
            Ok(value) => Ok(Some(match value.as_str() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            })),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count_emotes(&self) -> usize {
        self.stores.total_entries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::FileBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_lookup_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let emotes = EmoteService::new(Arc::new(FileBackend::new(dir.path())));
        emotes.add_scope(ScopeId(1)).await.unwrap();
        emotes
            .stores()
            .open(ScopeId(1))
            .await
            .unwrap()
            .lock()
            .await
            .add("Shrug", json!("¯\\_(ツ)_/¯"))
            .unwrap();

        assert_eq!(emotes.lookup(ScopeId(1), " SHRUG").await.unwrap().as_deref(), Some("¯\\_(ツ)_/¯"));
        assert_eq!(emotes.lookup(ScopeId(1), "nope").await.unwrap(), None);
        assert_eq!(emotes.lookup(ScopeId(2), "shrug").await.unwrap(), None);
        assert_eq!(emotes.count_emotes().await, 1);
    }
}
