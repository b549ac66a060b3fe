use super::Resource;
use crate::error::{CoreError, Result};
use crate::selector::SeedSelector;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// A workload cluster whose control plane runs on a seed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shoot {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: ShootSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootSpec {
    pub cloud_profile_name: String,
    pub region: String,
    pub provider: ShootProvider,
    #[serde(default)]
    pub networking: Networking,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_selector: Option<SeedSelector>,
    /// Seed hosting this shoot; set exactly once by the scheduler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootProvider {
    #[serde(rename = "type")]
    pub type_: String,
}

/// Requested address ranges; unset ranges may be defaulted by the seed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Networking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
}

impl Shoot {
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    pub fn provider_type(&self) -> &str {
        &self.spec.provider.type_
    }

    pub fn region(&self) -> &str {
        &self.spec.region
    }

    pub fn seed_name(&self) -> Option<&str> {
        self.spec.seed_name.as_deref()
    }

    pub fn is_scheduled(&self) -> bool {
        self.spec.seed_name.is_some()
    }
}

impl Resource for Shoot {
    const KIND: &'static str = "Shoot";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn validate(&self) -> Result<()> {
        super::validate_base(Self::KIND, &self.metadata)?;

        if self.namespace().is_empty() {
            return Err(CoreError::invalid_resource(
                Self::KIND,
                format!("shoot '{}' has no namespace", self.name()),
            ));
        }

        if let Some(selector) = self
            .spec
            .seed_selector
            .as_ref()
            .and_then(|s| s.label_selector.as_ref())
        {
            selector.validate()?;
        }

        Ok(())
    }
}
