//! Seedling Core - Resource model for seed scheduling
//!
//! This crate provides:
//! - Seed, Shoot and CloudProfile resources
//! - Label and seed selectors
//! - CIDR parsing and overlap checks
//! - Immutable cluster-state snapshots
//! - Error types with miette diagnostics

pub mod cidr;
pub mod error;
pub mod resources;
pub mod selector;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use cidr::Cidr;
pub use error::{CoreError, Result};
pub use resources::{
    CloudProfile, Condition, ConditionStatus, Networking, Resource, Seed, SeedNetworks, Shoot,
    ShootNetworks, GARDEN_NAMESPACE, SEED_TAINT_INVISIBLE, SEED_TAINT_PROTECTED,
};
pub use selector::{
    LabelSelector, LabelSelectorRequirement, SeedSelector, SelectorOperator,
    PROVIDER_TYPE_WILDCARD,
};
pub use snapshot::{Snapshot, SnapshotManifest};
pub use types::{ObjectKey, ResourceVersion};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Serialize a value to JSON
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| {
        CoreError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from JSON
pub fn from_json<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| {
        CoreError::serialization_error(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a value to YAML
pub fn to_yaml<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| {
        CoreError::serialization_error(
            format!("Failed to serialize to YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        CoreError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_serialization() {
        let mut shoot = Shoot::default();
        shoot.metadata.name = Some("dev".to_string());
        shoot.spec.seed_name = Some("aws-eu1".to_string());

        let yaml = to_yaml(&shoot).unwrap();
        assert!(yaml.contains("seedName: aws-eu1"));

        let deserialized: Shoot = from_yaml(&yaml).unwrap();
        assert_eq!(deserialized.seed_name(), Some("aws-eu1"));
    }

    #[test]
    fn test_invalid_yaml() {
        let result: Result<Shoot> = from_yaml("spec: [not, a, shoot]");
        assert!(matches!(result, Err(CoreError::SerializationError { .. })));
    }
}
