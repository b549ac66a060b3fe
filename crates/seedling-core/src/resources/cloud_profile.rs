use super::Resource;
use crate::error::Result;
use crate::selector::SeedSelector;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

/// Template of a provider offering: type, regions and seed constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudProfile {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: CloudProfileSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfileSpec {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_selector: Option<SeedSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
}

impl CloudProfile {
    pub fn has_region(&self, region: &str) -> bool {
        self.spec.regions.iter().any(|r| r.name == region)
    }
}

impl Resource for CloudProfile {
    const KIND: &'static str = "CloudProfile";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn validate(&self) -> Result<()> {
        super::validate_base(Self::KIND, &self.metadata)?;

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
