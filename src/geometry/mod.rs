// ============================================
// Geometry - Общие геометрические примитивы
// ============================================
// Используются и камерой, и квадродеревом, и каскадами теней

mod bounding;
mod frustum;

pub use bounding::BoundingSphere;
pub use frustum::{aabb_outside_frustum, extract_frustum_planes, extract_side_planes, Plane};
