//! Radius queries checked against a brute-force scan of the whole field

mod common;

use jump_sim_core::field::PointField;
use jump_sim_core::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every unvisited point the query should return, in no particular order
fn brute_force(field: &PointField, center: &Vec3, radius: f64) -> Vec<usize> {
    let mut ids: Vec<usize> = field
        .iter()
        .filter(|(id, p)| {
            !field.is_visited(*id)
                && p.x >= center.x - radius / 2.0
                && (*p - center).norm_squared() < radius * radius
        })
        .map(|(id, _)| id.index())
        .collect();
    ids.sort_unstable();
    ids
}

fn random_center(rng: &mut StdRng, half: f64) -> Vec3 {
    Vec3::new(
        rng.random_range(-half..half),
        rng.random_range(-half..half),
        rng.random_range(-half..half),
    )
}

#[test]
fn test_within_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(2024);
    let field = PointField::generate(80.0, 0.01, &mut rng).unwrap();
    assert_eq!(field.len(), 5120);

    for _ in 0..200 {
        let center = random_center(&mut rng, 40.0);
        let radius = rng.random_range(1.0..20.0);

        let found = field.within(&center, radius);
        let mut ids: Vec<usize> = found.iter().map(|id| id.index()).collect();

        // Descending x, one entry per point
        for pair in found.windows(2) {
            assert!(field.position(pair[0]).x >= field.position(pair[1]).x);
        }
        for id in &found {
            let p = field.position(*id);
            assert!(p.x >= center.x - radius / 2.0);
            assert!(p.x < center.x + radius);
        }

        ids.sort_unstable();
        assert_eq!(ids, brute_force(&field, &center, radius));
    }
}

#[test]
fn test_within_skips_visited_points() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut field = PointField::generate(60.0, 0.01, &mut rng).unwrap();

    // Mark every third point
    let marked: Vec<_> = field.iter().map(|(id, _)| id).step_by(3).collect();
    for id in &marked {
        field.mark_visited(*id);
    }
    assert_eq!(field.visited_count(), marked.len());

    for _ in 0..100 {
        let center = random_center(&mut rng, 30.0);
        let radius = rng.random_range(2.0..15.0);
        let found = field.within(&center, radius);
        assert!(found.iter().all(|id| !field.is_visited(*id)));

        let mut ids: Vec<usize> = found.iter().map(|id| id.index()).collect();
        ids.sort_unstable();
        assert_eq!(ids, brute_force(&field, &center, radius));
    }

    field.reset_visited();
    assert_eq!(field.visited_count(), 0);
}

#[test]
fn test_extended_field_still_queries_correctly() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut field = PointField::generate(40.0, 0.005, &mut rng).unwrap();
    let extra: Vec<Vec3> = (0..100).map(|_| random_center(&mut rng, 20.0)).collect();
    field.extend(extra);
    field.insert(Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(field.len(), 320 + 101);

    for _ in 0..50 {
        let center = random_center(&mut rng, 20.0);
        let radius = rng.random_range(1.0..10.0);
        let mut ids: Vec<usize> = field
            .within(&center, radius)
            .iter()
            .map(|id| id.index())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, brute_force(&field, &center, radius));
    }
}
