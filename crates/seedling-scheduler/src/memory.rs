use crate::commit::{ShootUpdater, UpdateError};
use async_trait::async_trait;
use seedling_core::{ObjectKey, Resource, Shoot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory shoot store with resource-version checked updates
///
/// Backs the command-line scheduler and tests. An update succeeds only when the
/// incoming shoot carries the stored resource version; the stored copy then
/// gets the next version.
#[derive(Clone, Default)]
pub struct MemoryShootStore {
    shoots: Arc<RwLock<HashMap<ObjectKey, Shoot>>>,
}

impl MemoryShootStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shoots(shoots: impl IntoIterator<Item = Shoot>) -> Self {
        let shoots = shoots
            .into_iter()
            .map(|shoot| (shoot.object_key(), shoot))
            .collect();
        Self {
            shoots: Arc::new(RwLock::new(shoots)),
        }
    }

    pub async fn get(&self, key: &ObjectKey) -> Option<Shoot> {
        self.shoots.read().await.get(key).cloned()
    }

    /// All stored shoots ordered by key
    pub async fn list(&self) -> Vec<Shoot> {
        let mut shoots: Vec<Shoot> = self.shoots.read().await.values().cloned().collect();
        shoots.sort_by_key(|s| s.object_key());
        shoots
    }
}

#[async_trait]
impl ShootUpdater for MemoryShootStore {
    async fn update(&self, shoot: &Shoot) -> Result<Shoot, UpdateError> {
        let key = shoot.object_key();
        let mut shoots = self.shoots.write().await;

        let stored = shoots
            .get(&key)
            .ok_or_else(|| UpdateError::other(format!("shoot {} not found", key)))?;

        let stored_version = stored.resource_version();
        if shoot.resource_version() != stored_version {
            return Err(UpdateError::conflict(format!(
                "shoot {} has resource version {}, update carries {}",
                key,
                stored_version.map(|v| v.to_string()).unwrap_or_default(),
                shoot
                    .resource_version()
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            )));
        }

        let mut updated = shoot.clone();
        let next = stored_version
            .map(|v| v.next())
            .unwrap_or_else(|| seedling_core::ResourceVersion::new("1"));
        updated.set_resource_version(next);
        shoots.insert(key.clone(), updated.clone());

        debug!(
            "Stored shoot {} at resource version {}",
            key,
            updated.metadata.resource_version.as_deref().unwrap_or_default()
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_shoot(version: &str) -> Shoot {
        let mut shoot = Shoot::default();
        shoot.metadata.name = Some("shoot".to_string());
        shoot.metadata.namespace = Some("garden-dev".to_string());
        shoot.metadata.resource_version = Some(version.to_string());
        shoot
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = MemoryShootStore::from_shoots([create_test_shoot("7")]);

        let mut shoot = create_test_shoot("7");
        shoot.spec.seed_name = Some("seed-1".to_string());
        let updated = store.update(&shoot).await.unwrap();

        assert_eq!(updated.metadata.resource_version.as_deref(), Some("8"));
        let stored = store.get(&shoot.object_key()).await.unwrap();
        assert_eq!(stored.seed_name(), Some("seed-1"));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let store = MemoryShootStore::from_shoots([create_test_shoot("7")]);

        let shoot = create_test_shoot("6");
        let err = store.update(&shoot).await.unwrap_err();
        assert!(matches!(err, UpdateError::Conflict { .. }));

        let stored = store.get(&shoot.object_key()).await.unwrap();
        assert_eq!(stored.metadata.resource_version.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_missing_shoot() {
        let store = MemoryShootStore::new();
        let err = store.update(&create_test_shoot("1")).await.unwrap_err();
        assert!(matches!(err, UpdateError::Other { .. }));
    }

    #[tokio::test]
    async fn test_second_writer_loses() {
        let store = MemoryShootStore::from_shoots([create_test_shoot("1")]);

        let mut first = create_test_shoot("1");
        first.spec.seed_name = Some("seed-a".to_string());
        let mut second = create_test_shoot("1");
        second.spec.seed_name = Some("seed-b".to_string());

        assert!(store.update(&first).await.is_ok());
        assert!(matches!(
            store.update(&second).await,
            Err(UpdateError::Conflict { .. })
        ));
        assert_eq!(store.list().await[0].seed_name(), Some("seed-a"));
    }
}
