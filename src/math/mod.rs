//! Geometry primitives: boxes, rays and metrics

pub mod aabb;
pub mod ray;
pub mod metric;

pub use aabb::Aabb;
pub use ray::Ray;
pub use metric::{sum, sqr_metric, abs_metric, closest_in_set, Metric};
