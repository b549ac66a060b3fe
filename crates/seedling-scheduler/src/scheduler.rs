use crate::commit::{schedule_onto_seed, ShootUpdater};
use crate::config::SchedulerConfig;
use crate::filter::{compatibility_filters, health_filters, FilterPredicate};
use crate::network::NetworkDisjointedness;
use crate::score::{joint_best, ScoreFunction};
use crate::select::{seed_loads, select_least_loaded};
use crate::types::SchedulingContext;
use crate::{Result, SchedulerError};
use seedling_core::{Resource, Seed, Shoot, Snapshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of seed determination for one shoot
#[derive(Debug, Clone)]
pub struct Decision<'a> {
    /// Selected seed
    pub seed: &'a Seed,
    /// Names of all seeds tied for the best strategy score, in name order
    pub joint_best: Vec<String>,
    /// Shoots already assigned to the selected seed
    pub assigned_shoots: usize,
}

impl Decision<'_> {
    pub fn seed_name(&self) -> &str {
        self.seed.name()
    }
}

/// Verdict for one seed at one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedVerdict {
    pub seed_name: String,
    /// Filter, scorer or selector that produced the verdict
    pub stage: String,
    pub passed: bool,
    pub reason: Option<String>,
}

/// Per-seed verdicts plus the final result of a determination
#[derive(Debug)]
pub struct Explanation<'a> {
    pub verdicts: Vec<SeedVerdict>,
    pub outcome: Result<Decision<'a>>,
}

/// Seed scheduler
///
/// Pure with respect to the snapshot it is given; only [`SeedScheduler::schedule`]
/// performs I/O, through the injected [`ShootUpdater`].
pub struct SeedScheduler {
    config: SchedulerConfig,
    health_filters: Vec<Box<dyn FilterPredicate>>,
    compatibility_filters: Vec<Box<dyn FilterPredicate>>,
    network_filters: Vec<Box<dyn FilterPredicate>>,
    scorer: Box<dyn ScoreFunction>,
}

impl SeedScheduler {
    /// Create a new scheduler
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            scorer: config.strategy.scorer(),
            config,
            health_filters: health_filters(),
            compatibility_filters: compatibility_filters(),
            network_filters: vec![Box::new(NetworkDisjointedness)],
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Pick the seed for `shoot` from `snapshot` without writing anything
    pub fn determine_seed<'s>(&self, shoot: &Shoot, snapshot: &'s Snapshot) -> Result<Decision<'s>> {
        self.evaluate(shoot, snapshot, &mut Vec::new())
    }

    /// Like [`SeedScheduler::determine_seed`], also returning every per-seed verdict
    pub fn explain<'s>(&self, shoot: &Shoot, snapshot: &'s Snapshot) -> Explanation<'s> {
        let mut verdicts = Vec::new();
        let outcome = self.evaluate(shoot, snapshot, &mut verdicts);
        Explanation { verdicts, outcome }
    }

    /// Determine a seed for an unassigned shoot and commit the assignment
    ///
    /// Load counts come from `snapshot`, not from commits still in flight, so
    /// concurrent calls may pick the same least-loaded seed.
    pub async fn schedule(
        &self,
        shoot: &Shoot,
        snapshot: &Snapshot,
        updater: &dyn ShootUpdater,
        cancel: &CancellationToken,
    ) -> Result<Shoot> {
        let shoot_key = shoot.object_key().to_string();

        if let Some(seed) = shoot.seed_name() {
            return Err(SchedulerError::already_scheduled(shoot_key, seed));
        }

        let decision = self.determine_seed(shoot, snapshot).inspect_err(|e| {
            warn!("Failed to determine seed for shoot {}: {}", shoot_key, e);
        })?;

        schedule_onto_seed(shoot, decision.seed, updater, cancel).await
    }

    fn evaluate<'s>(
        &self,
        shoot: &Shoot,
        snapshot: &'s Snapshot,
        verdicts: &mut Vec<SeedVerdict>,
    ) -> Result<Decision<'s>> {
        let shoot_key = shoot.object_key().to_string();
        shoot.validate()?;

        let profile_name = &shoot.spec.cloud_profile_name;

        let cloud_profile = snapshot
            .cloud_profile(profile_name)
            .ok_or_else(|| SchedulerError::cloud_profile_not_found(&shoot_key, profile_name))?;

        if !cloud_profile.has_region(shoot.region()) {
            warn!(
                "Shoot {} requests region {} which cloud profile {} does not list",
                shoot_key,
                shoot.region(),
                profile_name
            );
        }

        let context = SchedulingContext::new(shoot, cloud_profile);

        if let Some(selector) = context
            .effective_seed_selector()
            .and_then(|s| s.label_selector.as_ref())
        {
            selector.validate()?;
        }

        let seeds: Vec<&Seed> = snapshot.seeds().collect();
        debug!("Scheduling shoot {} against {} seeds", shoot_key, seeds.len());

        let (eligible, reasons) = run_filters(&self.health_filters, &context, seeds, verdicts);
        if eligible.is_empty() {
            return Err(SchedulerError::no_eligible_seed(shoot_key, reasons));
        }

        let (compatible, reasons) =
            run_filters(&self.compatibility_filters, &context, eligible, verdicts);
        if compatible.is_empty() {
            return Err(SchedulerError::no_compatible_seed(shoot_key, reasons));
        }

        let (candidates, reasons) =
            run_filters(&self.network_filters, &context, compatible, verdicts);
        if candidates.is_empty() {
            return Err(SchedulerError::network_incompatible(shoot_key, reasons));
        }

        let scores = candidates
            .iter()
            .map(|seed| self.scorer.score(&context, seed))
            .collect::<Vec<_>>();
        let best = joint_best(self.scorer.as_ref(), scores.clone());

        for score in &scores {
            let in_best = best.iter().any(|b| b.seed_name == score.seed_name);
            verdicts.push(SeedVerdict {
                seed_name: score.seed_name.clone(),
                stage: self.scorer.name().to_string(),
                passed: in_best,
                reason: Some(format!("score {}", score.score)),
            });
        }

        if best.is_empty() {
            return Err(SchedulerError::no_strategy_match(
                shoot_key,
                self.config.strategy.to_string(),
                shoot.region(),
            ));
        }

        let best_seeds: Vec<&'s Seed> = candidates
            .iter()
            .copied()
            .filter(|seed| best.iter().any(|b| b.seed_name == seed.name()))
            .collect();

        let loads = seed_loads(snapshot, &best_seeds);
        let selected = select_least_loaded(&loads)
            .ok_or_else(|| SchedulerError::internal_error("Joint-best set is empty"))?;

        for load in &loads {
            verdicts.push(SeedVerdict {
                seed_name: load.seed.name().to_string(),
                stage: "LeastLoaded".to_string(),
                passed: load.seed.name() == selected.seed.name(),
                reason: Some(format!("{} assigned shoots", load.assigned_shoots)),
            });
        }

        info!(
            "Selected seed {} for shoot {} ({} joint best, {} assigned shoots)",
            selected.seed.name(),
            shoot_key,
            best_seeds.len(),
            selected.assigned_shoots
        );

        Ok(Decision {
            seed: selected.seed,
            joint_best: best_seeds.iter().map(|s| s.name().to_string()).collect(),
            assigned_shoots: selected.assigned_shoots,
        })
    }
}

/// Apply `filters` to `seeds` in order; a seed stops at its first failing filter.
/// Returns the survivors and one "seed: reason" line per rejected seed.
fn run_filters<'s>(
    filters: &[Box<dyn FilterPredicate>],
    context: &SchedulingContext<'_>,
    seeds: Vec<&'s Seed>,
    verdicts: &mut Vec<SeedVerdict>,
) -> (Vec<&'s Seed>, Vec<String>) {
    let mut passed = Vec::new();
    let mut reasons = Vec::new();

    for seed in seeds {
        let rejection = filters.iter().find_map(|filter| {
            let result = filter.filter(context, seed);
            (!result.passed).then(|| (filter.name().to_string(), result))
        });

        match rejection {
            Some((filter_name, result)) => {
                debug!(
                    "Seed {} filtered out by {}: {}",
                    seed.name(),
                    filter_name,
                    result.reason.as_deref().unwrap_or_default()
                );
                reasons.push(result.describe());
                verdicts.push(SeedVerdict {
                    seed_name: result.seed_name,
                    stage: filter_name,
                    passed: false,
                    reason: result.reason,
                });
            }
            None => passed.push(seed),
        }
    }

    (passed, reasons)
}
