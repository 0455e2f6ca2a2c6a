//! CPU path tracer for a small chess scene: a checkerboard floor and a pawn
//! mesh, each indexed by a sweep-SAH bounding volume hierarchy.

pub mod aabb;
pub mod bvh;
pub mod display;
pub mod distributions;
pub mod geometry;
pub mod mesh;
pub mod obj;
pub mod rendering;
pub mod scene;
