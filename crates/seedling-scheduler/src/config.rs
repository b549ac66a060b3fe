use crate::score::{RegionMatch, RegionPrefix, ScoreFunction};
use crate::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default number of shoots scheduled in parallel
pub const DEFAULT_CONCURRENT_SYNCS: usize = 5;

/// Candidate ranking strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// Only seeds in the shoot's region
    #[default]
    SameRegion,
    /// Seeds whose region name shares the longest prefix with the shoot's
    MinimalDistance,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SameRegion => "SameRegion",
            Strategy::MinimalDistance => "MinimalDistance",
        }
    }

    /// Scoring function implementing this strategy
    pub fn scorer(&self) -> Box<dyn ScoreFunction> {
        match self {
            Strategy::SameRegion => Box::new(RegionMatch),
            Strategy::MinimalDistance => Box::new(RegionPrefix),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SameRegion" | "same-region" => Ok(Strategy::SameRegion),
            "MinimalDistance" | "minimal-distance" => Ok(Strategy::MinimalDistance),
            "BestRegion" | "best-region" => Err(SchedulerError::configuration(
                "Strategy BestRegion is no longer supported",
                "Use SameRegion or MinimalDistance",
            )),
            other => Err(SchedulerError::configuration(
                format!("Unknown scheduling strategy '{}'", other),
                "Use SameRegion or MinimalDistance",
            )),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = SchedulerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Configuration for the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// Ranking strategy for eligible seeds
    pub strategy: Strategy,
    /// Maximum shoots scheduled in parallel
    pub concurrent_syncs: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            concurrent_syncs: DEFAULT_CONCURRENT_SYNCS,
        }
    }
}

impl SchedulerConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Parse a YAML configuration document
    pub fn from_yaml(data: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(data).map_err(|e| {
            SchedulerError::configuration(
                format!("Invalid scheduler configuration: {}", e),
                "Expected keys: strategy (SameRegion | MinimalDistance), concurrentSyncs",
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            SchedulerError::configuration(
                format!("Failed to read {}: {}", path.display(), e),
                "Check the --config path",
            )
        })?;
        Self::from_yaml(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrent_syncs == 0 {
            return Err(SchedulerError::configuration(
                "concurrentSyncs must be at least 1",
                "Set concurrentSyncs to a positive number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("SameRegion".parse::<Strategy>().unwrap(), Strategy::SameRegion);
        assert_eq!("same-region".parse::<Strategy>().unwrap(), Strategy::SameRegion);
        assert_eq!(
            "minimal-distance".parse::<Strategy>().unwrap(),
            Strategy::MinimalDistance
        );
        assert_eq!(Strategy::MinimalDistance.to_string(), "MinimalDistance");
    }

    #[test]
    fn test_legacy_strategy_rejected() {
        let err = "BestRegion".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, SchedulerError::Configuration { .. }));
        assert!(err.to_string().contains("no longer supported"));

        let err = "Nearest".parse::<Strategy>().unwrap_err();
        assert!(err.to_string().contains("Nearest"));
    }

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.strategy, Strategy::SameRegion);
        assert_eq!(config.concurrent_syncs, 5);

        let config = SchedulerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "strategy: MinimalDistance\nconcurrentSyncs: 2").unwrap();

        let config = SchedulerConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.strategy, Strategy::MinimalDistance);
        assert_eq!(config.concurrent_syncs, 2);
    }

    #[test]
    fn test_invalid_config() {
        assert!(SchedulerConfig::from_yaml("strategy: BestRegion").is_err());
        assert!(SchedulerConfig::from_yaml("concurrentSyncs: 0").is_err());
    }
}
