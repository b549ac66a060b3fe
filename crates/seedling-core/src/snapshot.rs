use crate::error::{CoreError, Result};
use crate::resources::{CloudProfile, Resource, Seed, Shoot};
use crate::types::ObjectKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Serialized form of a snapshot: plain lists of resources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotManifest {
    #[serde(default)]
    pub seeds: Vec<Seed>,
    #[serde(default)]
    pub shoots: Vec<Shoot>,
    #[serde(default)]
    pub cloud_profiles: Vec<CloudProfile>,
}

/// Immutable view of seeds, shoots and cloud profiles as of one instant
///
/// Seeds and cloud profiles are keyed by name, shoots by `namespace/name`.
/// Iteration follows key order, so every consumer sees the same sequence
/// for the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    seeds: BTreeMap<String, Seed>,
    shoots: BTreeMap<ObjectKey, Shoot>,
    cloud_profiles: BTreeMap<String, CloudProfile>,
}

impl Snapshot {
    /// Build a snapshot, rejecting unnamed resources and duplicate keys.
    ///
    /// Resource contents (names, selectors) are not validated here; a bad
    /// shoot fails its own scheduling attempt only.
    pub fn new(
        seeds: Vec<Seed>,
        shoots: Vec<Shoot>,
        cloud_profiles: Vec<CloudProfile>,
    ) -> Result<Self> {
        let snapshot = Self {
            seeds: index(seeds, |s| s.name().to_string())?,
            shoots: index(shoots, |s| s.object_key())?,
            cloud_profiles: index(cloud_profiles, |p| p.name().to_string())?,
        };

        debug!(
            "Snapshot with {} seeds, {} shoots, {} cloud profiles",
            snapshot.seeds.len(),
            snapshot.shoots.len(),
            snapshot.cloud_profiles.len()
        );

        Ok(snapshot)
    }

    pub fn from_manifest(manifest: SnapshotManifest) -> Result<Self> {
        Self::new(manifest.seeds, manifest.shoots, manifest.cloud_profiles)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Self::from_manifest(crate::from_yaml(data)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Self::from_manifest(crate::from_json(data)?)
    }

    /// Load a manifest file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CoreError::io_error(path.display().to_string(), e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&data),
            _ => Self::from_yaml(&data),
        }
    }

    /// Lists of resources in key order
    pub fn to_manifest(&self) -> SnapshotManifest {
        SnapshotManifest {
            seeds: self.seeds.values().cloned().collect(),
            shoots: self.shoots.values().cloned().collect(),
            cloud_profiles: self.cloud_profiles.values().cloned().collect(),
        }
    }

    pub fn seeds(&self) -> impl Iterator<Item = &Seed> {
        self.seeds.values()
    }

    pub fn shoots(&self) -> impl Iterator<Item = &Shoot> {
        self.shoots.values()
    }

    pub fn shoot(&self, key: &ObjectKey) -> Option<&Shoot> {
        self.shoots.get(key)
    }

    /// Shoots without a seed assignment
    pub fn unscheduled_shoots(&self) -> impl Iterator<Item = &Shoot> {
        self.shoots.values().filter(|s| !s.is_scheduled())
    }

    pub fn cloud_profile(&self, name: &str) -> Option<&CloudProfile> {
        self.cloud_profiles.get(name)
    }

    /// Number of shoots in this snapshot assigned to `seed_name`
    pub fn assigned_shoot_count(&self, seed_name: &str) -> usize {
        self.shoots
            .values()
            .filter(|s| s.seed_name() == Some(seed_name))
            .count()
    }
}

fn index<K, R>(resources: Vec<R>, key_of: impl Fn(&R) -> K) -> Result<BTreeMap<K, R>>
where
    K: Ord + ToString,
    R: Resource,
{
    let mut indexed = BTreeMap::new();

    for resource in resources {
        if resource.name().is_empty() {
            return Err(CoreError::invalid_resource(R::KIND, "missing metadata.name"));
        }
        let key = key_of(&resource);
        if indexed.contains_key(&key) {
            return Err(CoreError::duplicate_resource(R::KIND, key.to_string()));
        }
        indexed.insert(key, resource);
    }

    Ok(indexed)
}
