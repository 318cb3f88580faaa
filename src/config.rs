//! Startup configuration.
//!
//! Fixed parameters (camera, clear colour, instance count, time step) are constants next
//! to the code that uses them. `Config` only carries the host element, the scene list and
//! two switchable behaviours.

use crate::scene::{SceneDescriptor, default_scenes};

/// What happens to the offscreen scene targets when the viewport changes size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetResize {
    /// Rebuild every target at the new viewport size.
    #[default]
    Follow,
    /// Keep the startup resolution. The compositor stretches the targets over the
    /// resized surface.
    Fixed,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Id of the DOM element the canvas is appended to (wasm only).
    pub container_id: String,
    pub target_resize: TargetResize,
    /// Let intentional wheel steps move the cross-fade to the neighbouring scene pair.
    /// Off by default: wheel gestures are classified and logged only.
    pub wheel_advances_scene: bool,
    pub scenes: Vec<SceneDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container_id: "container".to_string(),
            target_resize: TargetResize::default(),
            wheel_advances_scene: false,
            scenes: default_scenes(),
        }
    }
}

impl Config {
    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    pub fn with_target_resize(mut self, target_resize: TargetResize) -> Self {
        self.target_resize = target_resize;
        self
    }

    pub fn with_wheel_transitions(mut self, enabled: bool) -> Self {
        self.wheel_advances_scene = enabled;
        self
    }

    /// Fails when there is nothing to cross-fade.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scenes.is_empty() {
            anyhow::bail!("at least one scene is required");
        }
        Ok(())
    }
}
