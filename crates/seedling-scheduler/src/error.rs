// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// Every seed failed the visibility, health or taint checks
    #[error("No eligible seed for shoot {shoot}: {}", .reasons.join("; "))]
    #[diagnostic(
        code(scheduler::no_eligible_seed),
        help("Check seed visibility, the GardenletReady and Bootstrapped conditions, and seed taints")
    )]
    NoEligibleSeed { shoot: String, reasons: Vec<String> },

    /// No seed satisfied the provider type or label selector constraints
    #[error("No compatible seed for shoot {shoot}: {}", .reasons.join("; "))]
    #[diagnostic(
        code(scheduler::no_compatible_seed),
        help("Check the provider types and label selector of the shoot's or cloud profile's seed selector")
    )]
    NoCompatibleSeed { shoot: String, reasons: Vec<String> },

    /// No seed's networks are disjoint from the shoot's effective networks
    #[error("No seed with disjoint networks for shoot {shoot}: {}", .reasons.join("; "))]
    #[diagnostic(
        code(scheduler::network_incompatible),
        help("Choose shoot node/pod/service ranges that do not overlap the seed ranges, or configure seed shoot defaults")
    )]
    NetworkIncompatible { shoot: String, reasons: Vec<String> },

    /// Candidates exist but none satisfies the strategy
    #[error("No seed matches strategy {strategy} for shoot {shoot} in region {region}")]
    #[diagnostic(
        code(scheduler::no_strategy_match),
        help("Add a seed in the shoot's region or configure the MinimalDistance strategy")
    )]
    NoStrategyMatch {
        shoot: String,
        strategy: String,
        region: String,
    },

    /// The shoot references a cloud profile missing from the snapshot
    #[error("Cloud profile {cloud_profile} referenced by shoot {shoot} not found")]
    #[diagnostic(
        code(scheduler::cloud_profile_not_found),
        help("Create the cloud profile or fix spec.cloudProfileName")
    )]
    CloudProfileNotFound { shoot: String, cloud_profile: String },

    /// The shoot already carries a seed assignment
    #[error("Shoot {shoot} is already scheduled onto seed {seed}")]
    #[diagnostic(
        code(scheduler::already_scheduled),
        help("Seed assignments are written once; only unassigned shoots are scheduled")
    )]
    AlreadyScheduled { shoot: String, seed: String },

    /// The shoot was modified concurrently
    #[error("Conflict committing seed assignment for shoot {shoot}: {message}")]
    #[diagnostic(
        code(scheduler::commit_conflict),
        help("Re-run scheduling against a fresh snapshot")
    )]
    CommitConflict { shoot: String, message: String },

    /// The update call failed for another reason
    #[error("Failed to commit seed assignment for shoot {shoot}: {message}")]
    #[diagnostic(
        code(scheduler::commit_failed),
        help("Check connectivity to the API server; the shoot was left unassigned")
    )]
    CommitFailed { shoot: String, message: String },

    /// The request was cancelled before the update completed
    #[error("Commit for shoot {shoot} was cancelled")]
    #[diagnostic(
        code(scheduler::commit_cancelled),
        help("The shoot was left unassigned and will be scheduled on the next attempt")
    )]
    CommitCancelled { shoot: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(scheduler::configuration_error),
        help("{suggestion}")
    )]
    Configuration { message: String, suggestion: String },

    /// Core error
    #[error("Core error: {0}")]
    #[diagnostic(
        code(scheduler::core_error),
        help("Check the snapshot resources and selectors")
    )]
    CoreError(#[from] seedling_core::CoreError),

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    InternalError { message: String },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a NoEligibleSeed error
    pub fn no_eligible_seed(shoot: impl Into<String>, reasons: Vec<String>) -> Self {
        Self::NoEligibleSeed {
            shoot: shoot.into(),
            reasons,
        }
    }

    /// Create a NoCompatibleSeed error
    pub fn no_compatible_seed(shoot: impl Into<String>, reasons: Vec<String>) -> Self {
        Self::NoCompatibleSeed {
            shoot: shoot.into(),
            reasons,
        }
    }

    /// Create a NetworkIncompatible error
    pub fn network_incompatible(shoot: impl Into<String>, reasons: Vec<String>) -> Self {
        Self::NetworkIncompatible {
            shoot: shoot.into(),
            reasons,
        }
    }

    /// Create a NoStrategyMatch error
    pub fn no_strategy_match(
        shoot: impl Into<String>,
        strategy: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::NoStrategyMatch {
            shoot: shoot.into(),
            strategy: strategy.into(),
            region: region.into(),
        }
    }

    /// Create a CloudProfileNotFound error
    pub fn cloud_profile_not_found(
        shoot: impl Into<String>,
        cloud_profile: impl Into<String>,
    ) -> Self {
        Self::CloudProfileNotFound {
            shoot: shoot.into(),
            cloud_profile: cloud_profile.into(),
        }
    }

    /// Create an AlreadyScheduled error
    pub fn already_scheduled(shoot: impl Into<String>, seed: impl Into<String>) -> Self {
        Self::AlreadyScheduled {
            shoot: shoot.into(),
            seed: seed.into(),
        }
    }

    /// Create a CommitConflict error
    pub fn commit_conflict(shoot: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommitConflict {
            shoot: shoot.into(),
            message: message.into(),
        }
    }

    /// Create a CommitFailed error
    pub fn commit_failed(shoot: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommitFailed {
            shoot: shoot.into(),
            message: message.into(),
        }
    }

    /// Create a CommitCancelled error
    pub fn commit_cancelled(shoot: impl Into<String>) -> Self {
        Self::CommitCancelled {
            shoot: shoot.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Whether the caller should retry against a fresh snapshot
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CommitConflict { .. } | Self::CommitFailed { .. } | Self::CommitCancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_in_message() {
        let err = SchedulerError::no_eligible_seed(
            "garden-dev/dev",
            vec![
                "seed-a: not visible".to_string(),
                "seed-b: condition Bootstrapped is False".to_string(),
            ],
        );
        let message = err.to_string();
        assert!(message.contains("seed-a: not visible; seed-b"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(SchedulerError::commit_conflict("garden-dev/dev", "stale").is_retryable());
        assert!(!SchedulerError::no_strategy_match("garden-dev/dev", "SameRegion", "eu").is_retryable());
    }
}
