use clap::{Args, Parser, Subcommand};
use seedling_core::{ObjectKey, Resource, Snapshot};
use seedling_scheduler::{MemoryShootStore, SchedulerConfig, SeedScheduler, Strategy};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "seedling", about = "Seed scheduler for Gardener shoots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule every unassigned shoot in a snapshot
    Schedule {
        /// Snapshot manifest (YAML, or JSON with a .json extension)
        #[arg(long)]
        snapshot: PathBuf,
        #[command(flatten)]
        scheduler: SchedulerArgs,
        /// Write the resulting shoots here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show why each seed was accepted or rejected for one shoot
    Explain {
        /// Snapshot manifest (YAML, or JSON with a .json extension)
        #[arg(long)]
        snapshot: PathBuf,
        /// Shoot as namespace/name
        #[arg(long)]
        shoot: String,
        #[command(flatten)]
        scheduler: SchedulerArgs,
    },
}

#[derive(Args)]
struct SchedulerArgs {
    /// Scheduler configuration file (YAML)
    #[arg(long, env = "SEEDLING_CONFIG")]
    config: Option<PathBuf>,
    /// Strategy override: SameRegion or MinimalDistance
    #[arg(long, env = "SEEDLING_STRATEGY")]
    strategy: Option<String>,
    /// Maximum number of shoots scheduled in parallel
    #[arg(long, env = "SEEDLING_CONCURRENT_SYNCS")]
    concurrent_syncs: Option<usize>,
}

impl SchedulerArgs {
    /// File settings first, then command-line overrides
    fn load(&self) -> miette::Result<SchedulerConfig> {
        let mut config = match &self.config {
            Some(path) => SchedulerConfig::from_yaml_file(path)?,
            None => SchedulerConfig::default(),
        };

        if let Some(strategy) = &self.strategy {
            config.strategy = strategy.parse::<Strategy>()?;
        }
        if let Some(concurrent_syncs) = self.concurrent_syncs {
            config.concurrent_syncs = concurrent_syncs;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule {
            snapshot,
            scheduler,
            output,
        } => run_schedule(&snapshot, scheduler.load()?, output.as_deref()).await,
        Commands::Explain {
            snapshot,
            shoot,
            scheduler,
        } => run_explain(&snapshot, &shoot, scheduler.load()?),
    }
}

/// Schedule all unassigned shoots concurrently and write the results
async fn run_schedule(
    snapshot_path: &Path,
    config: SchedulerConfig,
    output: Option<&Path>,
) -> miette::Result<()> {
    let snapshot = Arc::new(Snapshot::from_file(snapshot_path)?);
    let store = Arc::new(MemoryShootStore::from_shoots(snapshot.shoots().cloned()));
    let permits = Arc::new(Semaphore::new(config.concurrent_syncs));

    info!(
        "Scheduling with strategy {} and {} concurrent syncs",
        config.strategy, config.concurrent_syncs
    );
    let scheduler = Arc::new(SeedScheduler::new(config));

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight commits");
            signal_token.cancel();
        }
    });

    let mut tasks = JoinSet::new();
    for shoot in snapshot.unscheduled_shoots() {
        let key = shoot.object_key();
        let shoot = shoot.clone();
        let snapshot = snapshot.clone();
        let store = store.clone();
        let scheduler = scheduler.clone();
        let permits = permits.clone();
        let token = token.clone();

        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| miette::miette!("Worker pool closed: {}", e))?;
            scheduler
                .schedule(&shoot, &snapshot, store.as_ref(), &token)
                .await
                .map(|updated| (key.clone(), updated.seed_name().map(String::from)))
                .map_err(|e| miette::miette!("Shoot {}: {}", key, e))
        });
    }

    let total = tasks.len();
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok((key, seed))) => {
                info!("Shoot {} -> seed {}", key, seed.unwrap_or_default());
            }
            Ok(Err(e)) => {
                failed += 1;
                error!("{}", e);
            }
            Err(e) => {
                failed += 1;
                error!("Scheduling task panicked: {}", e);
            }
        }
    }

    info!("Scheduled {} of {} shoots", total - failed, total);

    let yaml = seedling_core::to_yaml(&store.list().await)?;
    match output {
        Some(path) => std::fs::write(path, yaml)
            .map_err(|e| miette::miette!("Failed to write '{}': {}", path.display(), e))?,
        None => print!("{}", yaml),
    }

    if failed > 0 {
        return Err(miette::miette!(
            "{} of {} shoots could not be scheduled",
            failed,
            total
        ));
    }

    Ok(())
}

/// Print per-seed verdicts and the decision for one shoot
fn run_explain(snapshot_path: &Path, shoot: &str, config: SchedulerConfig) -> miette::Result<()> {
    let snapshot = Snapshot::from_file(snapshot_path)?;
    let key = ObjectKey::parse(shoot);
    let shoot = snapshot
        .shoot(&key)
        .ok_or_else(|| miette::miette!("Shoot '{}' not found in snapshot", key))?;

    let scheduler = SeedScheduler::new(config);
    let explanation = scheduler.explain(shoot, &snapshot);

    println!("Shoot {} (strategy {})", key, scheduler.config().strategy);
    for verdict in &explanation.verdicts {
        println!(
            "  {:<24} {:<24} {:<8} {}",
            verdict.seed_name,
            verdict.stage,
            if verdict.passed { "pass" } else { "reject" },
            verdict.reason.as_deref().unwrap_or_default()
        );
    }

    let decision = explanation.outcome?;
    println!(
        "Selected seed {} (joint best: {}; {} assigned shoots)",
        decision.seed_name(),
        decision.joint_best.join(", "),
        decision.assigned_shoots
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "strategy: SameRegion\nconcurrentSyncs: 3").unwrap();

        let args = SchedulerArgs {
            config: Some(file.path().to_path_buf()),
            strategy: Some("minimal-distance".to_string()),
            concurrent_syncs: None,
        };
        let config = args.load().unwrap();

        assert_eq!(config.strategy, Strategy::MinimalDistance);
        assert_eq!(config.concurrent_syncs, 3);
    }

    #[test]
    fn test_legacy_strategy_flag_rejected() {
        let args = SchedulerArgs {
            config: None,
            strategy: Some("BestRegion".to_string()),
            concurrent_syncs: None,
        };
        assert!(args.load().is_err());
    }

    #[test]
    fn test_cli_parses_schedule() {
        let cli = Cli::try_parse_from([
            "seedling",
            "schedule",
            "--snapshot",
            "snapshot.yaml",
            "--strategy",
            "MinimalDistance",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Schedule { .. }));
    }
}
