//! The render loop state machine.
//!
//! The loop is either [`LoopState::Stopped`] or [`LoopState::Running`]. While running it
//! holds the token of the one frame it has asked its [`FrameHost`] for. A tick only happens
//! when that exact token comes back, so stopping the loop (which cancels the token) also
//! stops the frame that was already queued.
//!
//! # Key types
//!
//! - [`RenderLoop`] is the state machine itself
//! - [`FrameHost`] is the scheduler it talks to, implemented by [`HostFrames`] for winit
//! - [`Tick`] is handed to the caller for every frame that should be rendered

use std::sync::Arc;

/// Simulation time added per tick. Not tied to wall-clock time.
pub const TIME_STEP: f32 = 0.05;

/// Identifies one requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Something that can deliver frames on request, like a window's redraw queue.
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameToken;
    /// After cancelling, `token` must never be delivered again.
    fn cancel_frame(&mut self, token: FrameToken);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running { pending: Option<FrameToken> },
}

/// One frame to render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Number of ticks since the loop was created.
    pub frame: u64,
    /// Simulation time since the last `play`.
    pub elapsed: f32,
}

#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    elapsed: f32,
    frames: u64,
}

impl RenderLoop {
    /// Creates a running loop and schedules its first frame.
    pub fn start(host: &mut impl FrameHost) -> Self {
        Self {
            state: LoopState::Running {
                pending: Some(host.request_frame()),
            },
            elapsed: 0.0,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Resumes a stopped loop. Elapsed time starts over at zero.
    pub fn play(&mut self, host: &mut impl FrameHost) {
        if self.is_running() {
            return;
        }
        self.elapsed = 0.0;
        self.state = LoopState::Running {
            pending: Some(host.request_frame()),
        };
        log::info!("render loop playing");
    }

    /// Halts the loop. The frame it was waiting for is cancelled.
    pub fn stop(&mut self, host: &mut impl FrameHost) {
        if let LoopState::Running { pending } = self.state {
            if let Some(token) = pending {
                host.cancel_frame(token);
            }
            self.state = LoopState::Stopped;
            log::info!("render loop stopped after {} frames", self.frames);
        }
    }

    /// Handles a delivered frame.
    ///
    /// Returns `None` for stale tokens and while stopped. Otherwise time advances by
    /// [`TIME_STEP`], the next frame is requested and the caller should render.
    pub fn on_frame(&mut self, token: FrameToken, host: &mut impl FrameHost) -> Option<Tick> {
        match &mut self.state {
            LoopState::Running { pending } if *pending == Some(token) => {
                *pending = Some(host.request_frame());
                self.elapsed += TIME_STEP;
                self.frames += 1;
                Some(Tick {
                    frame: self.frames,
                    elapsed: self.elapsed,
                })
            }
            _ => None,
        }
    }
}

/// A window that can be asked to redraw.
pub trait RequestRedraw {
    fn request_redraw(&self);
}

impl RequestRedraw for winit::window::Window {
    fn request_redraw(&self) {
        winit::window::Window::request_redraw(self)
    }
}

impl<T: RequestRedraw + ?Sized> RequestRedraw for Arc<T> {
    fn request_redraw(&self) {
        (**self).request_redraw()
    }
}

/// [`FrameHost`] on top of a redraw queue.
///
/// A request asks the window for a redraw and remembers the token. The next
/// `RedrawRequested` picks it up with [`take_due`](Self::take_due). Redraws the platform
/// sends on its own (exposure, resize) find no token and tick nothing.
#[derive(Debug)]
pub struct HostFrames<W: RequestRedraw> {
    window: W,
    next_id: u64,
    due: Option<FrameToken>,
}

pub type WindowFrames = HostFrames<Arc<winit::window::Window>>;

impl<W: RequestRedraw> HostFrames<W> {
    pub fn new(window: W) -> Self {
        Self {
            window,
            next_id: 0,
            due: None,
        }
    }

    /// The token of the frame that is due, if any.
    pub fn take_due(&mut self) -> Option<FrameToken> {
        self.due.take()
    }
}

impl<W: RequestRedraw> FrameHost for HostFrames<W> {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.due = Some(token);
        self.window.request_redraw();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.due == Some(token) {
            self.due = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct CountingWindow {
        redraws: Cell<u32>,
    }

    impl RequestRedraw for CountingWindow {
        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }
    }

    /// Delivers whatever is due, the way the event loop does on `RedrawRequested`.
    fn refresh(lp: &mut RenderLoop, host: &mut HostFrames<CountingWindow>) -> Option<Tick> {
        let token = host.take_due()?;
        lp.on_frame(token, host)
    }

    #[test]
    fn start_schedules_the_first_frame() {
        let mut host = HostFrames::new(CountingWindow::default());
        let lp = RenderLoop::start(&mut host);
        assert!(lp.is_running());
        assert_eq!(host.window.redraws.get(), 1);
        assert_eq!(lp.elapsed(), 0.0);
    }

    #[test]
    fn every_refresh_advances_by_the_fixed_step() {
        let mut host = HostFrames::new(CountingWindow::default());
        let mut lp = RenderLoop::start(&mut host);
        for _ in 0..4 {
            assert!(refresh(&mut lp, &mut host).is_some());
        }
        assert_eq!(lp.frames(), 4);
        assert!((lp.elapsed() - 0.2).abs() < 1e-6);
        assert_eq!(host.window.redraws.get(), 5);
    }

    #[test]
    fn stop_freezes_time_and_ticks() {
        let mut host = HostFrames::new(CountingWindow::default());
        let mut lp = RenderLoop::start(&mut host);
        refresh(&mut lp, &mut host);
        let (elapsed, frames) = (lp.elapsed(), lp.frames());

        lp.stop(&mut host);
        for _ in 0..5 {
            assert_eq!(refresh(&mut lp, &mut host), None);
        }
        assert_eq!(lp.state(), LoopState::Stopped);
        assert_eq!(lp.elapsed(), elapsed);
        assert_eq!(lp.frames(), frames);
    }

    #[test]
    fn queued_frame_is_dropped_after_stop() {
        let mut host = HostFrames::new(CountingWindow::default());
        let mut lp = RenderLoop::start(&mut host);
        let queued = FrameToken(host.next_id);
        lp.stop(&mut host);
        assert_eq!(host.take_due(), None);
        assert_eq!(lp.on_frame(queued, &mut host), None);
        assert_eq!(lp.frames(), 0);
    }

    #[test]
    fn play_resets_elapsed_and_ticks_on_next_refresh() {
        let mut host = HostFrames::new(CountingWindow::default());
        let mut lp = RenderLoop::start(&mut host);
        refresh(&mut lp, &mut host);
        refresh(&mut lp, &mut host);
        lp.stop(&mut host);

        lp.play(&mut host);
        assert_eq!(lp.elapsed(), 0.0);
        let tick = refresh(&mut lp, &mut host).expect("tick after play");
        assert!((tick.elapsed - TIME_STEP).abs() < 1e-6);
        assert_eq!(tick.frame, 3);
    }

    #[test]
    fn play_while_running_keeps_the_pending_frame() {
        let mut host = HostFrames::new(CountingWindow::default());
        let mut lp = RenderLoop::start(&mut host);
        let before = lp.state();
        lp.play(&mut host);
        assert_eq!(lp.state(), before);
        assert_eq!(host.window.redraws.get(), 1);
    }

    #[test]
    fn stale_token_changes_nothing() {
        let mut host = HostFrames::new(CountingWindow::default());
        let mut lp = RenderLoop::start(&mut host);
        let stale = host.take_due().expect("first frame");
        assert!(lp.on_frame(stale, &mut host).is_some());
        let state = lp.state();
        assert_eq!(lp.on_frame(stale, &mut host), None);
        assert_eq!(lp.state(), state);
        assert_eq!(lp.frames(), 1);
    }
}
