use seedling_core::{CloudProfile, Resource, SeedSelector, Shoot};

/// Scheduling context: the shoot being placed and its cloud profile
#[derive(Debug, Clone, Copy)]
pub struct SchedulingContext<'a> {
    /// Shoot to be scheduled
    pub shoot: &'a Shoot,
    /// Cloud profile referenced by the shoot
    pub cloud_profile: &'a CloudProfile,
}

impl<'a> SchedulingContext<'a> {
    /// Create a new scheduling context
    pub fn new(shoot: &'a Shoot, cloud_profile: &'a CloudProfile) -> Self {
        Self {
            shoot,
            cloud_profile,
        }
    }

    /// The shoot's seed selector if it declares one, otherwise the cloud profile's
    pub fn effective_seed_selector(&self) -> Option<&'a SeedSelector> {
        self.shoot
            .spec
            .seed_selector
            .as_ref()
            .or(self.cloud_profile.spec.seed_selector.as_ref())
    }

    /// `namespace/name` of the shoot, for logs and errors
    pub fn shoot_key(&self) -> String {
        self.shoot.object_key().to_string()
    }
}

/// Result of filtering a seed
#[derive(Debug, Clone)]
pub struct FilterResult {
    /// Seed name
    pub seed_name: String,
    /// Whether the seed passed the filter
    pub passed: bool,
    /// Reason for failure (if any)
    pub reason: Option<String>,
}

impl FilterResult {
    /// Create a passing filter result
    pub fn pass(seed_name: impl Into<String>) -> Self {
        Self {
            seed_name: seed_name.into(),
            passed: true,
            reason: None,
        }
    }

    /// Create a failing filter result
    pub fn fail(seed_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            seed_name: seed_name.into(),
            passed: false,
            reason: Some(reason.into()),
        }
    }

    /// "seed: reason" line used in error reports
    pub fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}: {}", self.seed_name, reason),
            None => format!("{}: passed", self.seed_name),
        }
    }
}

/// Result of scoring a seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    /// Seed name
    pub seed_name: String,
    /// Score (higher is better)
    pub score: usize,
}

impl ScoreResult {
    /// Create a new score result
    pub fn new(seed_name: impl Into<String>, score: usize) -> Self {
        Self {
            seed_name: seed_name.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedling_core::{LabelSelector, SeedSelector};

    #[test]
    fn test_filter_result() {
        let pass = FilterResult::pass("seed-1");
        assert!(pass.passed);
        assert!(pass.reason.is_none());

        let fail = FilterResult::fail("seed-2", "not visible");
        assert!(!fail.passed);
        assert_eq!(fail.describe(), "seed-2: not visible");
    }

    #[test]
    fn test_effective_seed_selector_prefers_shoot() {
        let mut profile = CloudProfile::default();
        profile.spec.seed_selector = Some(SeedSelector {
            label_selector: Some(LabelSelector::from_labels([("environment", "two")])),
            provider_types: vec![],
        });

        let mut shoot = Shoot::default();
        let context = SchedulingContext::new(&shoot, &profile);
        assert_eq!(
            context.effective_seed_selector(),
            profile.spec.seed_selector.as_ref()
        );

        shoot.spec.seed_selector = Some(SeedSelector {
            label_selector: None,
            provider_types: vec!["*".to_string()],
        });
        let context = SchedulingContext::new(&shoot, &profile);
        assert_eq!(
            context.effective_seed_selector(),
            shoot.spec.seed_selector.as_ref()
        );
    }
}
