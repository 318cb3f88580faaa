//! Scene data: meshes, instances and textures.
//!
//! - `model` holds the box geometry, its GPU mesh and the instanced draw helper
//! - `instance` holds per-instance transformation data
//! - `texture` wraps GPU textures, offscreen targets and texture bind groups

pub mod instance;
pub mod model;
pub mod texture;
