//! Vector type alias for 3D positions.

use nalgebra::Vector3;

/// 3D vector type for field points, the start, and the goal.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`. Distances in a field
/// reach into the thousands of units, so positions are kept in f64 to keep
/// summed path lengths stable.
pub type Vec3 = Vector3<f64>;

/// Squared Euclidean distance between two positions.
#[inline]
pub fn distance_sq(a: &Vec3, b: &Vec3) -> f64 {
    (a - b).norm_squared()
}

/// Strict containment test used by every radius query: `|a - b|^2 < radius_sq`.
#[inline]
pub fn within_sq(a: &Vec3, b: &Vec3, radius_sq: f64) -> bool {
    distance_sq(a, b) < radius_sq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_is_strict() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(distance_sq(&a, &b), 25.0);
        assert!(!within_sq(&a, &b, 25.0));
        assert!(within_sq(&a, &b, 25.0001));
    }
}
