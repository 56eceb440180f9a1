//! Density helpers for choosing field parameters.

use std::f64::consts::PI;

/// Density of `count` points spread evenly through a sphere of `radius`.
///
/// `count / (4/3 * pi * radius^3)`, e.g. 50 systems within 20 units gives
/// roughly 0.00149 points per cubic unit.
pub fn sphere_density(radius: f64, count: f64) -> f64 {
    let volume = 4.0 / 3.0 * PI * radius.powi(3);
    count / volume
}

/// Number of points a cube of `side` holds at `density`, as generated.
pub fn expected_point_count(side: f64, density: f64) -> usize {
    (side * side * side * density).floor().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_density() {
        let density = sphere_density(20.0, 50.0);
        assert_relative_eq!(density, 50.0 / (4.0 / 3.0 * PI * 8000.0), max_relative = 1e-12);
        assert_relative_eq!(density, 0.001_492_077, max_relative = 1e-6);
    }

    #[test]
    fn test_reference_field_population() {
        // 1160^3 * 0.002375
        assert_eq!(expected_point_count(1160.0, 0.002_375), 3_707_128);
        assert_eq!(expected_point_count(10.0, 0.0), 0);
    }
}
