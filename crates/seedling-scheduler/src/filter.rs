use crate::types::{FilterResult, SchedulingContext};
use seedling_core::{
    Resource, Seed, GARDEN_NAMESPACE, SEED_TAINT_INVISIBLE, SEED_TAINT_PROTECTED,
};
use tracing::debug;

/// Filter predicate trait
pub trait FilterPredicate: Send + Sync {
    /// Filter a seed for the given shoot
    fn filter(&self, context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult;

    /// Name of the filter
    fn name(&self) -> &str;
}

/// Excludes seeds hidden from scheduling
pub struct SeedVisible;

impl FilterPredicate for SeedVisible {
    fn filter(&self, _context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        if seed.is_visible() {
            FilterResult::pass(seed.name())
        } else {
            FilterResult::fail(seed.name(), "Seed is not visible for scheduling")
        }
    }

    fn name(&self) -> &str {
        "SeedVisible"
    }
}

/// Excludes seeds that are being deleted
pub struct SeedNotDeleting;

impl FilterPredicate for SeedNotDeleting {
    fn filter(&self, _context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        if seed.is_being_deleted() {
            FilterResult::fail(seed.name(), "Seed is being deleted")
        } else {
            FilterResult::pass(seed.name())
        }
    }

    fn name(&self) -> &str {
        "SeedNotDeleting"
    }
}

/// Requires both health conditions to be `True`; anything else fails closed
pub struct SeedHealthy;

impl FilterPredicate for SeedHealthy {
    fn filter(&self, _context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        if seed.is_healthy() {
            return FilterResult::pass(seed.name());
        }

        let conditions = seed
            .status
            .conditions
            .iter()
            .map(|c| format!("{}={:?}", c.type_, c.status))
            .collect::<Vec<_>>()
            .join(", ");

        FilterResult::fail(
            seed.name(),
            format!("Seed is not ready and bootstrapped (conditions: [{}])", conditions),
        )
    }

    fn name(&self) -> &str {
        "SeedHealthy"
    }
}

/// Filter for seed taints
///
/// The protected taint is tolerated by shoots in the garden namespace.
/// Every other taint excludes the seed.
pub struct TaintToleration;

impl FilterPredicate for TaintToleration {
    fn filter(&self, context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        let namespace = context.shoot.namespace();

        for taint in &seed.spec.taints {
            // reported by SeedVisible
            if taint.key == SEED_TAINT_INVISIBLE {
                continue;
            }

            if taint.key == SEED_TAINT_PROTECTED && namespace == GARDEN_NAMESPACE {
                continue;
            }

            return FilterResult::fail(
                seed.name(),
                format!(
                    "Shoot in namespace {} does not tolerate taint: {}",
                    namespace, taint.key
                ),
            );
        }

        FilterResult::pass(seed.name())
    }

    fn name(&self) -> &str {
        "TaintToleration"
    }
}

/// Filter for the seed provider type
pub struct ProviderTypeMatch;

impl FilterPredicate for ProviderTypeMatch {
    fn filter(&self, context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        let seed_type = seed.provider_type();

        if seed_type == context.shoot.provider_type() {
            return FilterResult::pass(seed.name());
        }

        if context
            .effective_seed_selector()
            .is_some_and(|s| s.allows_provider_type(seed_type))
        {
            debug!(
                "Seed {} admitted for cross-provider scheduling ({} -> {})",
                seed.name(),
                context.shoot.provider_type(),
                seed_type
            );
            return FilterResult::pass(seed.name());
        }

        FilterResult::fail(
            seed.name(),
            format!(
                "Provider type mismatch: seed is {}, shoot requests {}",
                seed_type,
                context.shoot.provider_type()
            ),
        )
    }

    fn name(&self) -> &str {
        "ProviderTypeMatch"
    }
}

/// Filter for the label selector of the effective seed selector
pub struct SeedSelectorMatch;

impl FilterPredicate for SeedSelectorMatch {
    fn filter(&self, context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        let selector = match context
            .effective_seed_selector()
            .and_then(|s| s.label_selector.as_ref())
        {
            Some(selector) => selector,
            None => return FilterResult::pass(seed.name()), // No selector = pass
        };

        if selector.matches(seed.labels()) {
            FilterResult::pass(seed.name())
        } else {
            FilterResult::fail(seed.name(), "Seed labels do not match the seed selector")
        }
    }

    fn name(&self) -> &str {
        "SeedSelectorMatch"
    }
}

/// Filters deciding whether a seed can host anything at all
pub fn health_filters() -> Vec<Box<dyn FilterPredicate>> {
    vec![
        Box::new(SeedVisible),
        Box::new(SeedNotDeleting),
        Box::new(SeedHealthy),
        Box::new(TaintToleration),
    ]
}

/// Filters deciding whether a seed is acceptable for the shoot's provider and selector
pub fn compatibility_filters() -> Vec<Box<dyn FilterPredicate>> {
    vec![Box::new(ProviderTypeMatch), Box::new(SeedSelectorMatch)]
}
