//! Render pipelines: matcap boxes and backgrounds for the scene targets, and the
//! cross-fade pass onto the visible surface.

pub mod background;
pub mod basic;
pub mod crossfade;
pub mod matcap;
