use super::{
    Condition, ConditionStatus, Resource, SEED_CONDITION_BOOTSTRAPPED,
    SEED_CONDITION_GARDENLET_READY, SEED_TAINT_INVISIBLE, SEED_TAINT_PROTECTED,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static NO_LABELS: BTreeMap<String, String> = BTreeMap::new();

/// A management cluster able to host shoot control planes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: SeedSpec,
    #[serde(default)]
    pub status: SeedStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSpec {
    pub provider: SeedProvider,
    pub networks: SeedNetworks,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<SeedTaint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SeedSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedProvider {
    #[serde(rename = "type")]
    pub type_: String,
    pub region: String,
}

/// Address ranges used by the seed itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedNetworks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,
    pub pods: String,
    pub services: String,
    /// Ranges offered to shoots that leave their own unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoot_defaults: Option<ShootNetworks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootNetworks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTaint {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SeedTaint {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<SeedSettingScheduling>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSettingScheduling {
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Seed {
    pub fn provider_type(&self) -> &str {
        &self.spec.provider.type_
    }

    pub fn region(&self) -> &str {
        &self.spec.provider.region
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        self.metadata.labels.as_ref().unwrap_or(&NO_LABELS)
    }

    pub fn has_taint(&self, key: &str) -> bool {
        self.spec.taints.iter().any(|t| t.key == key)
    }

    /// Protected seeds only accept shoots from the garden namespace
    pub fn is_protected(&self) -> bool {
        self.has_taint(SEED_TAINT_PROTECTED)
    }

    /// Seeds are visible unless the scheduling setting or the legacy taint hides them
    pub fn is_visible(&self) -> bool {
        let visible_setting = self
            .spec
            .settings
            .as_ref()
            .and_then(|s| s.scheduling.as_ref())
            .map(|s| s.visible)
            .unwrap_or(true);

        visible_setting && !self.has_taint(SEED_TAINT_INVISIBLE)
    }

    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.status.conditions.iter().find(|c| c.type_ == type_)
    }

    /// Status of a condition; a missing condition reads as `Unknown`
    pub fn condition_status(&self, type_: &str) -> ConditionStatus {
        self.condition(type_)
            .map(|c| c.status)
            .unwrap_or(ConditionStatus::Unknown)
    }

    /// Both the agent and the bootstrap conditions are `True`
    pub fn is_healthy(&self) -> bool {
        [SEED_CONDITION_GARDENLET_READY, SEED_CONDITION_BOOTSTRAPPED]
            .iter()
            .all(|t| self.condition_status(t) == ConditionStatus::True)
    }
}

impl Resource for Seed {
    const KIND: &'static str = "Seed";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
