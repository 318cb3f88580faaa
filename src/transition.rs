//! Which two scenes are being cross-faded, and how far.

/// `current` and `next = (current + 1) mod len` name the scene pair. `progress` is the
/// blend factor handed to the compositor.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    progress: f32,
    current: usize,
    len: usize,
}

impl Transition {
    pub fn new(len: usize) -> anyhow::Result<Self> {
        if len == 0 {
            anyhow::bail!("a transition needs at least one scene");
        }
        Ok(Self {
            progress: 0.0,
            current: 0,
            len,
        })
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Stored as given. The cross-fade shader clamps.
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&self) -> usize {
        (self.current + 1) % self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Moves the pair by `step` scenes, wrapping in both directions.
    pub fn advance(&mut self, step: isize) {
        let len = self.len as isize;
        self.current = (self.current as isize + step).rem_euclid(len) as usize;
        log::debug!("transition now {} -> {}", self.current, self.next());
    }
}
