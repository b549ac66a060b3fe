use crate::{Result, SchedulerError};
use async_trait::async_trait;
use seedling_core::{Resource, Seed, Shoot};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Failure reported by a [`ShootUpdater`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateError {
    /// The stored shoot changed since it was read
    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl UpdateError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Conditional write of a shoot, guarded by its resource version
#[async_trait]
pub trait ShootUpdater: Send + Sync {
    /// Persist `shoot` if its resource version is still current and return
    /// the stored object
    async fn update(&self, shoot: &Shoot) -> std::result::Result<Shoot, UpdateError>;
}

/// Write `seed` into the shoot's `seedName` with a single update call.
///
/// The input shoot is not modified. If `cancel` fires first the update future
/// is dropped and `CommitCancelled` is returned.
pub async fn schedule_onto_seed(
    shoot: &Shoot,
    seed: &Seed,
    updater: &dyn ShootUpdater,
    cancel: &CancellationToken,
) -> Result<Shoot> {
    let shoot_key = shoot.object_key().to_string();
    let seed_name = seed.name();

    let mut assigned = shoot.clone();
    assigned.spec.seed_name = Some(seed_name.to_string());

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Commit of shoot {} onto seed {} cancelled", shoot_key, seed_name);
            return Err(SchedulerError::commit_cancelled(shoot_key));
        }
        outcome = updater.update(&assigned) => outcome,
    };

    match outcome {
        Ok(updated) => {
            info!("Scheduled shoot {} onto seed {}", shoot_key, seed_name);
            Ok(updated)
        }
        Err(UpdateError::Conflict { message }) => {
            warn!("Conflict scheduling shoot {}: {}", shoot_key, message);
            Err(SchedulerError::commit_conflict(shoot_key, message))
        }
        Err(UpdateError::Other { message }) => {
            warn!("Failed to schedule shoot {}: {}", shoot_key, message);
            Err(SchedulerError::commit_failed(shoot_key, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct RecordingUpdater {
        calls: AtomicUsize,
        result: std::result::Result<(), UpdateError>,
        delay: Option<Duration>,
    }

    impl RecordingUpdater {
        fn new(result: std::result::Result<(), UpdateError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ShootUpdater for RecordingUpdater {
        async fn update(&self, shoot: &Shoot) -> std::result::Result<Shoot, UpdateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone().map(|_| shoot.clone())
        }
    }

    fn create_test_seed() -> Seed {
        let mut seed = Seed::default();
        seed.metadata.name = Some("seed-1".to_string());
        seed
    }

    fn create_test_shoot() -> Shoot {
        let mut shoot = Shoot::default();
        shoot.metadata.name = Some("shoot".to_string());
        shoot.metadata.namespace = Some("garden-dev".to_string());
        shoot
    }

    #[tokio::test]
    async fn test_commit_success() {
        let updater = RecordingUpdater::new(Ok(()));
        let shoot = create_test_shoot();

        let updated = schedule_onto_seed(
            &shoot,
            &create_test_seed(),
            &updater,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(updated.seed_name(), Some("seed-1"));
        assert!(shoot.seed_name().is_none());
        assert_eq!(updater.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_commit_conflict() {
        let updater = RecordingUpdater::new(Err(UpdateError::conflict("stale resource version")));

        let err = schedule_onto_seed(
            &create_test_shoot(),
            &create_test_seed(),
            &updater,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SchedulerError::CommitConflict { .. }));
        assert_eq!(updater.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_commit_failed() {
        let updater = RecordingUpdater::new(Err(UpdateError::other("connection refused")));

        let err = schedule_onto_seed(
            &create_test_shoot(),
            &create_test_seed(),
            &updater,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SchedulerError::CommitFailed { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_commit_cancelled_before_update() {
        let updater = RecordingUpdater::new(Ok(()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = schedule_onto_seed(&create_test_shoot(), &create_test_seed(), &updater, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SchedulerError::CommitCancelled { .. }));
        assert_eq!(updater.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_cancelled_while_in_flight() {
        let mut updater = RecordingUpdater::new(Ok(()));
        updater.delay = Some(Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = schedule_onto_seed(&create_test_shoot(), &create_test_seed(), &updater, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SchedulerError::CommitCancelled { .. }));
    }
}
