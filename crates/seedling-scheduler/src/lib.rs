//! Seedling Scheduler - Shoot to Seed scheduling
//!
//! This crate provides:
//! - Health, taint and compatibility filters
//! - Network disjointedness checks against seed defaults
//! - Region strategies (SameRegion, MinimalDistance)
//! - Load-aware selection among the joint best seeds
//! - A single conditional commit through an injected updater

pub mod commit;
pub mod config;
pub mod error;
pub mod filter;
pub mod memory;
pub mod network;
pub mod scheduler;
pub mod score;
pub mod select;
pub mod types;

// Re-export commonly used types
pub use commit::{schedule_onto_seed, ShootUpdater, UpdateError};
pub use config::{SchedulerConfig, Strategy};
pub use error::{Result, SchedulerError};
pub use memory::MemoryShootStore;
pub use scheduler::{Decision, Explanation, SeedScheduler, SeedVerdict};
pub use types::{FilterResult, SchedulingContext, ScoreResult};
