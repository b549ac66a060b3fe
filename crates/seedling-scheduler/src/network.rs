use crate::filter::FilterPredicate;
use crate::types::{FilterResult, SchedulingContext};
use seedling_core::{Cidr, Resource, Seed, SeedNetworks, Shoot};
use tracing::debug;

/// Shoot address ranges after applying the seed's defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveNetworks {
    /// Node range; never defaulted, compared only when set
    pub nodes: Option<String>,
    pub pods: String,
    pub services: String,
}

/// Resolve the shoot's ranges against a seed: the shoot's own value first,
/// then the seed's shoot default. Pods and services must resolve.
pub fn effective_shoot_networks(shoot: &Shoot, seed: &Seed) -> Result<EffectiveNetworks, String> {
    let networking = &shoot.spec.networking;
    let defaults = seed.spec.networks.shoot_defaults.as_ref();

    let pods = networking
        .pods
        .clone()
        .or_else(|| defaults.and_then(|d| d.pods.clone()))
        .ok_or_else(|| {
            "Shoot pod network is unset and the seed offers no default".to_string()
        })?;

    let services = networking
        .services
        .clone()
        .or_else(|| defaults.and_then(|d| d.services.clone()))
        .ok_or_else(|| {
            "Shoot service network is unset and the seed offers no default".to_string()
        })?;

    Ok(EffectiveNetworks {
        nodes: networking.nodes.clone(),
        pods,
        services,
    })
}

/// Compare every shoot range with every seed range.
/// Returns one message per overlap or malformed range; empty means disjoint.
pub fn validate_network_disjointedness(
    seed_networks: &SeedNetworks,
    shoot_networks: &EffectiveNetworks,
) -> Vec<String> {
    let mut violations = Vec::new();

    let seed_ranges = parse_ranges(
        "seed",
        [
            ("nodes", seed_networks.nodes.as_deref()),
            ("pods", Some(seed_networks.pods.as_str())),
            ("services", Some(seed_networks.services.as_str())),
        ],
        &mut violations,
    );

    let shoot_ranges = parse_ranges(
        "shoot",
        [
            ("nodes", shoot_networks.nodes.as_deref()),
            ("pods", Some(shoot_networks.pods.as_str())),
            ("services", Some(shoot_networks.services.as_str())),
        ],
        &mut violations,
    );

    for (shoot_name, shoot_cidr) in &shoot_ranges {
        for (seed_name, seed_cidr) in &seed_ranges {
            if shoot_cidr.overlaps(seed_cidr) {
                violations.push(format!(
                    "shoot {} network {} overlaps seed {} network {}",
                    shoot_name, shoot_cidr, seed_name, seed_cidr
                ));
            }
        }
    }

    violations
}

fn parse_ranges<'a>(
    owner: &str,
    ranges: [(&'a str, Option<&str>); 3],
    violations: &mut Vec<String>,
) -> Vec<(&'a str, Cidr)> {
    ranges
        .into_iter()
        .filter_map(|(name, value)| {
            let value = value?;
            match Cidr::parse(value) {
                Ok(cidr) => Some((name, cidr)),
                Err(e) => {
                    violations.push(format!("{} {} network: {}", owner, name, e));
                    None
                }
            }
        })
        .collect()
}

/// Filter for address-range collisions between shoot and seed
pub struct NetworkDisjointedness;

impl FilterPredicate for NetworkDisjointedness {
    fn filter(&self, context: &SchedulingContext<'_>, seed: &Seed) -> FilterResult {
        let shoot_networks = match effective_shoot_networks(context.shoot, seed) {
            Ok(networks) => networks,
            Err(reason) => return FilterResult::fail(seed.name(), reason),
        };

        debug!(
            "Effective networks of shoot {} on seed {}: nodes={:?}, pods={}, services={}",
            context.shoot_key(),
            seed.name(),
            shoot_networks.nodes,
            shoot_networks.pods,
            shoot_networks.services
        );

        let violations = validate_network_disjointedness(&seed.spec.networks, &shoot_networks);
        if violations.is_empty() {
            FilterResult::pass(seed.name())
        } else {
            FilterResult::fail(seed.name(), violations.join(", "))
        }
    }

    fn name(&self) -> &str {
        "NetworkDisjointedness"
    }
}
