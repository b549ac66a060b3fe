use seedling_core::{Resource, Seed, Snapshot};
use tracing::debug;

/// A candidate with its current number of assigned shoots
#[derive(Debug, Clone, Copy)]
pub struct SeedLoad<'a> {
    pub seed: &'a Seed,
    pub assigned_shoots: usize,
}

/// Count the shoots the snapshot already places on each candidate.
/// Assignments committed after the snapshot was taken are not seen, so two
/// concurrent attempts may both pick the same least-loaded seed.
pub fn seed_loads<'a>(snapshot: &Snapshot, candidates: &[&'a Seed]) -> Vec<SeedLoad<'a>> {
    candidates
        .iter()
        .map(|seed| SeedLoad {
            seed,
            assigned_shoots: snapshot.assigned_shoot_count(seed.name()),
        })
        .collect()
}

/// Pick the seed with the fewest assigned shoots; equal loads go to the
/// lexicographically smallest seed name
pub fn select_least_loaded<'a>(loads: &[SeedLoad<'a>]) -> Option<SeedLoad<'a>> {
    let selected = loads
        .iter()
        .min_by(|a, b| {
            a.assigned_shoots
                .cmp(&b.assigned_shoots)
                .then_with(|| a.seed.name().cmp(b.seed.name()))
        })
        .copied();

    if let Some(load) = &selected {
        debug!(
            "Least loaded of {} candidates: {} ({} shoots)",
            loads.len(),
            load.seed.name(),
            load.assigned_shoots
        );
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedling_core::Shoot;

    fn create_test_seed(name: &str) -> Seed {
        let mut seed = Seed::default();
        seed.metadata.name = Some(name.to_string());
        seed
    }

    fn create_assigned_shoot(name: &str, seed: &str) -> Shoot {
        let mut shoot = Shoot::default();
        shoot.metadata.name = Some(name.to_string());
        shoot.metadata.namespace = Some("garden-dev".to_string());
        shoot.spec.seed_name = Some(seed.to_string());
        shoot
    }

    #[test]
    fn test_select_least_loaded() {
        let seeds = vec![create_test_seed("seed-a"), create_test_seed("seed-b")];
        let shoots = vec![
            create_assigned_shoot("one", "seed-a"),
            create_assigned_shoot("two", "seed-a"),
            create_assigned_shoot("three", "seed-b"),
        ];
        let snapshot = Snapshot::new(seeds.clone(), shoots, vec![]).unwrap();

        let candidates: Vec<&Seed> = seeds.iter().collect();
        let loads = seed_loads(&snapshot, &candidates);
        assert_eq!(loads[0].assigned_shoots, 2);
        assert_eq!(loads[1].assigned_shoots, 1);

        let selected = select_least_loaded(&loads).unwrap();
        assert_eq!(selected.seed.name(), "seed-b");
    }

    #[test]
    fn test_tie_broken_by_name() {
        let seeds = vec![
            create_test_seed("seed-c"),
            create_test_seed("seed-a"),
            create_test_seed("seed-b"),
        ];
        let loads: Vec<SeedLoad<'_>> = seeds
            .iter()
            .map(|seed| SeedLoad {
                seed,
                assigned_shoots: 0,
            })
            .collect();

        assert_eq!(select_least_loaded(&loads).unwrap().seed.name(), "seed-a");
    }

    #[test]
    fn test_additional_assignment_never_helps() {
        let seeds = vec![create_test_seed("seed-a"), create_test_seed("seed-b")];
        let candidates: Vec<&Seed> = seeds.iter().collect();

        let before = Snapshot::new(seeds.clone(), vec![], vec![]).unwrap();
        let loads = seed_loads(&before, &candidates);
        assert_eq!(select_least_loaded(&loads).unwrap().seed.name(), "seed-a");

        let after = Snapshot::new(
            seeds.clone(),
            vec![create_assigned_shoot("one", "seed-a")],
            vec![],
        )
        .unwrap();
        let loads = seed_loads(&after, &candidates);
        assert_eq!(loads[0].assigned_shoots, 1);
        assert_eq!(select_least_loaded(&loads).unwrap().seed.name(), "seed-b");
    }

    #[test]
    fn test_empty() {
        assert!(select_least_loaded(&[]).is_none());
    }
}
