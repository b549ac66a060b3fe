pub mod cloud_profile;
pub mod seed;
pub mod shoot;

pub use cloud_profile::{CloudProfile, CloudProfileSpec, Region};
pub use seed::{
    Seed, SeedNetworks, SeedProvider, SeedSettingScheduling, SeedSettings, SeedSpec, SeedStatus,
    SeedTaint, ShootNetworks,
};
pub use shoot::{Networking, Shoot, ShootProvider, ShootSpec};

use crate::error::{CoreError, Result};
use crate::types::{ObjectKey, ResourceVersion};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// Reserved system namespace whose shoots may use protected seeds
pub const GARDEN_NAMESPACE: &str = "garden";

/// Seed taint restricting a seed to shoots in the garden namespace
pub const SEED_TAINT_PROTECTED: &str = "seed.gardener.cloud/protected";

/// Legacy taint equivalent to `settings.scheduling.visible: false`
pub const SEED_TAINT_INVISIBLE: &str = "seed.gardener.cloud/invisible";

/// Condition reported by the agent running in the seed
pub const SEED_CONDITION_GARDENLET_READY: &str = "GardenletReady";

/// Condition reported once the seed's system components are installed
pub const SEED_CONDITION_BOOTSTRAPPED: &str = "Bootstrapped";

/// Status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Progressing,
    #[serde(other)]
    Unknown,
}

/// Observed condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn new(type_: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: None,
            message: None,
        }
    }
}

/// Base validation for all resources
pub fn validate_base(kind: &str, metadata: &ObjectMeta) -> Result<()> {
    let name = metadata
        .name
        .as_deref()
        .ok_or_else(|| CoreError::invalid_resource(kind, "missing metadata.name"))?;

    if !is_valid_name(name) {
        return Err(CoreError::invalid_resource(
            kind,
            format!("invalid name '{}'", name),
        ));
    }

    Ok(())
}

/// Trait for the scheduler's resources
pub trait Resource: Serialize + for<'de> Deserialize<'de> + Send + Sync {
    /// Kind of this resource
    const KIND: &'static str;

    /// Get the metadata of this resource
    fn metadata(&self) -> &ObjectMeta;

    /// Get mutable metadata
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// Name of the resource, empty if unset
    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    /// Key of this resource within its kind
    fn object_key(&self) -> ObjectKey {
        let metadata = self.metadata();
        ObjectKey::new(
            metadata.namespace.clone().unwrap_or_default(),
            self.name(),
        )
    }

    /// Get the resource version
    fn resource_version(&self) -> Option<ResourceVersion> {
        self.metadata()
            .resource_version
            .as_ref()
            .map(ResourceVersion::new)
    }

    /// Set the resource version
    fn set_resource_version(&mut self, version: ResourceVersion) {
        self.metadata_mut().resource_version = Some(version.0);
    }

    /// Validate the resource
    fn validate(&self) -> Result<()> {
        validate_base(Self::KIND, self.metadata())
    }
}

/// Validate a resource name (DNS-1123 subdomain)
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    let bytes = name.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    if !alnum(&bytes[0]) || !alnum(&bytes[bytes.len() - 1]) {
        return false;
    }

    bytes.iter().all(|b| alnum(b) || *b == b'-' || *b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("aws-eu1"));
        assert!(is_valid_name("seed.example.com"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-seed"));
        assert!(!is_valid_name("seed-"));
        assert!(!is_valid_name("Seed"));
        assert!(!is_valid_name(&"a".repeat(254)));
    }

    #[test]
    fn test_validate_base() {
        let mut metadata = ObjectMeta::default();
        assert!(validate_base("Seed", &metadata).is_err());

        metadata.name = Some("aws-eu1".to_string());
        assert!(validate_base("Seed", &metadata).is_ok());
    }

    #[test]
    fn test_condition_status_unknown_fallback() {
        let condition: Condition =
            serde_json::from_str(r#"{"type":"Bootstrapped","status":"Weird"}"#).unwrap();
        assert_eq!(condition.status, ConditionStatus::Unknown);

        let condition: Condition =
            serde_json::from_str(r#"{"type":"Bootstrapped","status":"True"}"#).unwrap();
        assert_eq!(condition.status, ConditionStatus::True);
    }
}
