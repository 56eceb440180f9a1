//! Random point fields and the radius queries the route search runs against

pub mod density;
pub mod point_field;

pub use density::{expected_point_count, sphere_density};
pub use point_field::{PointField, PointId, MAX_POINTS};
