use crate::error::{CoreError, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Provider type entry that admits seeds of every provider
pub const PROVIDER_TYPE_WILDCARD: &str = "*";

/// Set-based operator of a label selector requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl fmt::Display for SelectorOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SelectorOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "In" => Ok(Self::In),
            "NotIn" => Ok(Self::NotIn),
            "Exists" => Ok(Self::Exists),
            "DoesNotExist" => Ok(Self::DoesNotExist),
            other => Err(CoreError::invalid_selector(format!(
                "unknown operator '{}'",
                other
            ))),
        }
    }
}

/// A single `matchExpressions` term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl LabelSelectorRequirement {
    pub fn new(key: impl Into<String>, operator: SelectorOperator, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            operator,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self.operator {
            SelectorOperator::In | SelectorOperator::NotIn if self.values.is_empty() => {
                Err(CoreError::invalid_selector(format!(
                    "operator {} on key '{}' requires at least one value",
                    self.operator, self.key
                )))
            }
            SelectorOperator::Exists | SelectorOperator::DoesNotExist
                if !self.values.is_empty() =>
            {
                Err(CoreError::invalid_selector(format!(
                    "operator {} on key '{}' must not have values",
                    self.operator, self.key
                )))
            }
            _ => Ok(()),
        }
    }

    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            SelectorOperator::In => value.is_some_and(|v| self.values.contains(v)),
            SelectorOperator::NotIn => value.is_none_or(|v| !self.values.contains(v)),
            SelectorOperator::Exists => value.is_some(),
            SelectorOperator::DoesNotExist => value.is_none(),
        }
    }
}

/// Label selector: equality terms AND expression terms
///
/// An empty selector matches every label set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    /// Selector consisting only of equality terms
    pub fn from_labels<K, V>(labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            match_labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            match_expressions: Vec::new(),
        }
    }

    /// Add an expression term
    pub fn with_expression(mut self, requirement: LabelSelectorRequirement) -> Self {
        self.match_expressions.push(requirement);
        self
    }

    /// Check operator/value consistency of every expression
    pub fn validate(&self) -> Result<()> {
        self.match_expressions
            .iter()
            .try_for_each(LabelSelectorRequirement::validate)
    }

    /// Evaluate the selector against a label set
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
            && self.match_expressions.iter().all(|req| req.matches(labels))
    }
}

impl TryFrom<&metav1::LabelSelector> for LabelSelector {
    type Error = CoreError;

    fn try_from(selector: &metav1::LabelSelector) -> Result<Self> {
        let match_expressions = selector
            .match_expressions
            .iter()
            .flatten()
            .map(|req| {
                Ok(LabelSelectorRequirement {
                    key: req.key.clone(),
                    operator: req.operator.parse()?,
                    values: req.values.clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let converted = Self {
            match_labels: selector.match_labels.clone().unwrap_or_default(),
            match_expressions,
        };
        converted.validate()?;
        Ok(converted)
    }
}

/// Constraint on which seeds may host a shoot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSelector {
    /// Label selector evaluated against seed labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    /// Seed provider types allowed in addition to an exact match; may contain `*`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_types: Vec<String>,
}

impl SeedSelector {
    /// Whether `provider_type` is explicitly admitted (by name or wildcard)
    pub fn allows_provider_type(&self, provider_type: &str) -> bool {
        self.provider_types
            .iter()
            .any(|t| t == PROVIDER_TYPE_WILDCARD || t == provider_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = LabelSelector::default();
        assert!(selector.matches(&BTreeMap::new()));
        assert!(selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_match_labels() {
        let selector = LabelSelector::from_labels([("environment", "two")]);
        assert!(selector.matches(&labels(&[("environment", "two"), ("x", "y")])));
        assert!(!selector.matches(&labels(&[("environment", "one")])));
        assert!(!selector.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_match_expressions() {
        let set = labels(&[("tier", "gold"), ("zone", "a")]);

        let in_req = LabelSelectorRequirement::new("tier", SelectorOperator::In, &["gold", "silver"]);
        let not_in = LabelSelectorRequirement::new("zone", SelectorOperator::NotIn, &["b"]);
        let exists = LabelSelectorRequirement::new("zone", SelectorOperator::Exists, &[]);
        let absent = LabelSelectorRequirement::new("legacy", SelectorOperator::DoesNotExist, &[]);

        let selector = LabelSelector::default()
            .with_expression(in_req)
            .with_expression(not_in)
            .with_expression(exists)
            .with_expression(absent);
        assert!(selector.matches(&set));

        let failing = LabelSelector::default().with_expression(LabelSelectorRequirement::new(
            "tier",
            SelectorOperator::NotIn,
            &["gold"],
        ));
        assert!(!failing.matches(&set));
    }

    #[test]
    fn test_not_in_matches_missing_key() {
        let selector = LabelSelector::default().with_expression(LabelSelectorRequirement::new(
            "tier",
            SelectorOperator::NotIn,
            &["gold"],
        ));
        assert!(selector.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_labels_and_expressions_are_conjunctive() {
        let selector = LabelSelector::from_labels([("env", "prod")]).with_expression(
            LabelSelectorRequirement::new("gpu", SelectorOperator::Exists, &[]),
        );
        assert!(!selector.matches(&labels(&[("env", "prod")])));
        assert!(selector.matches(&labels(&[("env", "prod"), ("gpu", "a100")])));
    }

    #[test]
    fn test_validate() {
        let bad_in = LabelSelector::default().with_expression(LabelSelectorRequirement::new(
            "tier",
            SelectorOperator::In,
            &[],
        ));
        assert!(bad_in.validate().is_err());

        let bad_exists = LabelSelector::default().with_expression(LabelSelectorRequirement::new(
            "tier",
            SelectorOperator::Exists,
            &["x"],
        ));
        assert!(bad_exists.validate().is_err());

        assert!(LabelSelector::from_labels([("a", "b")]).validate().is_ok());
    }

    #[test]
    fn test_from_k8s_label_selector() {
        let k8s = metav1::LabelSelector {
            match_labels: Some(labels(&[("env", "prod")])),
            match_expressions: Some(vec![metav1::LabelSelectorRequirement {
                key: "tier".to_string(),
                operator: "In".to_string(),
                values: Some(vec!["gold".to_string()]),
            }]),
        };
        let selector = LabelSelector::try_from(&k8s).unwrap();
        assert_eq!(selector.match_expressions[0].operator, SelectorOperator::In);
        assert!(selector.matches(&labels(&[("env", "prod"), ("tier", "gold")])));

        let unknown = metav1::LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![metav1::LabelSelectorRequirement {
                key: "tier".to_string(),
                operator: "Gt".to_string(),
                values: Some(vec!["1".to_string()]),
            }]),
        };
        assert!(LabelSelector::try_from(&unknown).is_err());
    }

    #[test]
    fn test_provider_types() {
        let selector = SeedSelector {
            label_selector: None,
            provider_types: vec!["aws".to_string()],
        };
        assert!(selector.allows_provider_type("aws"));
        assert!(!selector.allows_provider_type("gcp"));

        let any = SeedSelector {
            label_selector: None,
            provider_types: vec![PROVIDER_TYPE_WILDCARD.to_string()],
        };
        assert!(any.allows_provider_type("gcp"));
        assert!(!SeedSelector::default().allows_provider_type("aws"));
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = r#"
labelSelector:
  matchLabels:
    environment: two
  matchExpressions:
    - key: tier
      operator: NotIn
      values: [bronze]
providerTypes: ["*"]
"#;
        let selector: SeedSelector = serde_yaml::from_str(yaml).unwrap();
        let label_selector = selector.label_selector.unwrap();
        assert_eq!(label_selector.match_labels["environment"], "two");
        assert_eq!(
            label_selector.match_expressions[0].operator,
            SelectorOperator::NotIn
        );
        assert_eq!(selector.provider_types, vec!["*".to_string()]);
    }
}
