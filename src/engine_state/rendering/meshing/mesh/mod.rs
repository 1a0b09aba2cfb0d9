//! Mesh generation for the chunked field.
//!
//! # Architecture
//! - [`Face`]: one unit quad on one side of a voxel
//! - [`ChunkMesh`]: the triangles gathered for a single chunk
//! - `greedy`: the six directional sweeps and [`Plane::generate_meshes`]
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use octree_voxel_engine::Plane;
//!
//! let mut plane = Plane::new([1, 1, 1], Point3::new(0, 0, 0)).unwrap();
//! plane.set_voxel(2, 2, 2, 1).unwrap();
//! let meshes = plane.generate_meshes();
//! assert_eq!(meshes[0].quad_count(), 6);
//! ```
//!
//! [`Plane::generate_meshes`]: crate::engine_state::voxels::chunk::plane::Plane::generate_meshes

mod face;
mod greedy;
mod mesh;

pub use face::{side_color, Face};
pub use greedy::SWEEP_ORDER;
pub use mesh::ChunkMesh;
