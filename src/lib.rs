//! scene-fade
//!
//! Three box-cloud scenes, each drawn with a matcap material in front of its own
//! background image, rendered into offscreen targets and cross-faded onto the window by a
//! full-screen shader quad. A small debug panel drives the fade. Runs natively and in the
//! browser (WebGL).
//!
//! High-level modules
//! - `camera`: scene and compositor cameras and their uniforms
//! - `compositor`: the cross-fade quad, its uniform and the composite pass
//! - `config`: startup configuration
//! - `context`: window surface, device and queue
//! - `data_structures`: meshes, instances and textures
//! - `flow`: the winit event loop
//! - `gesture`: wheel inertia classification
//! - `gui`: the `progress` debug panel
//! - `pipelines`: matcap, background and cross-fade render pipelines
//! - `render`: the play/stop render loop and its frame scheduling
//! - `resources`: image loading for native and web
//! - `scene`: the scene bank and its offscreen targets
//! - `sketch`: everything above wired into one frame
//! - `transition`: which scene pair is being blended
//!

pub mod camera;
pub mod compositor;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gesture;
pub mod gui;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod sketch;
pub mod transition;

pub use config::{Config, TargetResize};
pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(Config::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
