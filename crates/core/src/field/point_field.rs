use crate::core_types::vec3::{within_sq, Vec3};
use crate::error::FieldError;
use rand::Rng;
use std::ops::Range;

/// Largest field [`PointField::generate`] will build
pub const MAX_POINTS: f64 = u32::MAX as f64;

/// Index of a point inside a [`PointField`]
///
/// Ids are positions in the x-sorted order, so they are invalidated by
/// [`PointField::insert`] and [`PointField::extend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(usize);

impl PointId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Uniform random 3D point set, sorted by x, with a per-run visited flag
///
/// Radius queries binary-search the x-sorted positions for the slab
/// `[x - r, x + r)` and test only that slab, so a query costs
/// `O(log n + k)` where `k` is the slab population.
#[derive(Debug, Clone, Default)]
pub struct PointField {
    positions: Vec<Vec3>,
    visited: Vec<bool>,
}

impl PointField {
    /// Generate `floor(side^3 * density)` points uniformly in the cube
    /// `[-side/2, side/2)^3`.
    pub fn generate<R: Rng>(side: f64, density: f64, rng: &mut R) -> Result<Self, FieldError> {
        if !side.is_finite() || side <= 0.0 {
            return Err(FieldError::InvalidSide(side));
        }
        if !density.is_finite() || density < 0.0 {
            return Err(FieldError::InvalidDensity(density));
        }

        let expected = (side * side * side * density).floor();
        if expected > MAX_POINTS {
            return Err(FieldError::TooManyPoints {
                side,
                density,
                count: expected,
            });
        }
        let count = expected as usize;

        let half = side / 2.0;
        let mut positions = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(Vec3::new(
                side * rng.random::<f64>() - half,
                side * rng.random::<f64>() - half,
                side * rng.random::<f64>() - half,
            ));
        }

        Ok(Self::from_points(positions))
    }

    /// Build a field from arbitrary positions. The positions are sorted by x.
    pub fn from_points(mut positions: Vec<Vec3>) -> Self {
        positions.sort_unstable_by(|a, b| a.x.total_cmp(&b.x));
        let visited = vec![false; positions.len()];
        Self { positions, visited }
    }

    /// Insert one point, keeping the x order.
    pub fn insert(&mut self, position: Vec3) -> PointId {
        let at = self.positions.partition_point(|p| p.x <= position.x);
        self.positions.insert(at, position);
        self.visited.insert(at, false);
        PointId(at)
    }

    /// Add many points and re-sort once.
    ///
    /// Visited flags travel with their points.
    pub fn extend<I: IntoIterator<Item = Vec3>>(&mut self, points: I) {
        let mut merged: Vec<(Vec3, bool)> = self
            .positions
            .drain(..)
            .zip(self.visited.drain(..))
            .chain(points.into_iter().map(|p| (p, false)))
            .collect();
        merged.sort_by(|a, b| a.0.x.total_cmp(&b.0.x));
        (self.positions, self.visited) = merged.into_iter().unzip();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, id: PointId) -> Vec3 {
        self.positions[id.0]
    }

    pub fn is_visited(&self, id: PointId) -> bool {
        self.visited[id.0]
    }

    pub fn mark_visited(&mut self, id: PointId) {
        self.visited[id.0] = true;
    }

    /// Clear every visited flag so the field can serve another run.
    pub fn reset_visited(&mut self) {
        self.visited.fill(false);
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }

    /// All points in x order.
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &Vec3)> + '_ {
        self.positions.iter().enumerate().map(|(i, p)| (PointId(i), p))
    }

    /// Index range of points whose x lies in `[center.x - radius, center.x + radius)`.
    pub fn x_window(&self, center: &Vec3, radius: f64) -> Range<usize> {
        let x_min = center.x - radius;
        let x_max = center.x + radius;
        let lo = self.positions.partition_point(|p| p.x < x_min);
        let hi = self.positions.partition_point(|p| p.x < x_max);
        lo..hi.max(lo)
    }

    /// Unvisited points strictly inside the sphere of `radius` around `center`.
    ///
    /// Points with `x < center.x - radius/2` are pruned even when inside the
    /// sphere: the search only looks backwards up to half a jump. Results come
    /// in descending x order.
    pub fn within(&self, center: &Vec3, radius: f64) -> Vec<PointId> {
        let radius_sq = radius * radius;
        let x_floor = center.x - radius / 2.0;

        let window = self.x_window(center, radius);
        let mut found = Vec::new();
        for i in window.rev() {
            let p = &self.positions[i];
            if p.x >= x_floor && within_sq(center, p, radius_sq) && !self.visited[i] {
                found.push(PointId(i));
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_field() -> PointField {
        // Unsorted on purpose
        PointField::from_points(vec![
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ])
    }

    fn is_sorted(field: &PointField) -> bool {
        field
            .iter()
            .zip(field.iter().skip(1))
            .all(|((_, a), (_, b))| a.x <= b.x)
    }

    #[test]
    fn test_generate_count_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = PointField::generate(100.0, 0.002, &mut rng).unwrap();
        // 100^3 * 0.002 = 2000
        assert_eq!(field.len(), 2000);
        assert!(is_sorted(&field));
        for (_, p) in field.iter() {
            for c in [p.x, p.y, p.z] {
                assert!((-50.0..50.0).contains(&c), "coordinate {c} out of cube");
            }
        }
        assert_eq!(field.visited_count(), 0);
    }

    #[test]
    fn test_generate_degenerate() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty = PointField::generate(10.0, 0.0, &mut rng).unwrap();
        assert!(empty.is_empty());
        assert!(empty.within(&Vec3::zeros(), 100.0).is_empty());

        assert_eq!(
            PointField::generate(-1.0, 0.1, &mut rng).unwrap_err(),
            FieldError::InvalidSide(-1.0)
        );
        assert!(matches!(
            PointField::generate(10.0, f64::NAN, &mut rng),
            Err(FieldError::InvalidDensity(_))
        ));
    }

    #[test]
    fn test_x_window_is_half_open() {
        let field = line_field();
        // x values: -3, -1, 0.5, 1, 2, 3
        let window = field.x_window(&Vec3::new(0.0, 0.0, 0.0), 1.0);
        let xs: Vec<f64> = window.map(|i| field.position(PointId(i)).x).collect();
        assert_eq!(xs, vec![-1.0, 0.5]);
    }

    #[test]
    fn test_within_prunes_behind_half_radius() {
        let field = line_field();
        let hits = field.within(&Vec3::new(0.0, 0.0, 0.0), 2.5);
        let xs: Vec<f64> = hits.iter().map(|id| field.position(*id).x).collect();
        // -1.0 clears the x = -1.25 cut; both 3.0 and -3.0 fall outside the sphere
        assert_eq!(xs, vec![2.0, 1.0, 0.5, -1.0]);

        let hits = field.within(&Vec3::new(0.0, 0.0, 0.0), 1.8);
        let xs: Vec<f64> = hits.iter().map(|id| field.position(*id).x).collect();
        // -1.0 is inside the sphere but behind x = -0.9
        assert_eq!(xs, vec![1.0, 0.5]);
    }

    #[test]
    fn test_within_skips_visited() {
        let mut field = line_field();
        let center = Vec3::new(0.0, 0.0, 0.0);
        let first = field.within(&center, 2.5);
        field.mark_visited(first[0]);
        let second = field.within(&center, 2.5);
        assert_eq!(second.len(), first.len() - 1);
        assert!(!second.contains(&first[0]));

        field.reset_visited();
        assert_eq!(field.within(&center, 2.5), first);
    }

    #[test]
    fn test_insert_and_extend_keep_order() {
        let mut field = line_field();
        let id = field.insert(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(field.position(id), Vec3::new(0.0, 1.0, 0.0));
        assert!(is_sorted(&field));

        let visited = field.within(&Vec3::new(3.0, 0.0, 0.0), 0.5)[0];
        field.mark_visited(visited);

        field.extend(vec![Vec3::new(10.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)]);
        assert_eq!(field.len(), 9);
        assert!(is_sorted(&field));
        assert_eq!(field.visited_count(), 1);
        let (_, last) = field.iter().last().unwrap();
        assert_eq!(last.x, 10.0);
        // The visited point kept its flag through the re-sort
        let three = field.iter().find(|(_, p)| p.x == 3.0).map(|(id, _)| id).unwrap();
        assert!(field.is_visited(three));
    }
}
