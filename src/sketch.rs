//! The sketch: scene bank, compositor, transition, debug panel and render loop wired
//! together into one frame.

use winit::{event::MouseScrollDelta, event::WindowEvent};

use crate::{
    compositor::Compositor,
    config::{Config, TargetResize},
    context::Context,
    gesture::{InertiaFilter, WheelClass, WheelSample},
    gui::{DebugPanel, Settings},
    render::{FrameHost, FrameToken, RenderLoop, Tick},
    scene::{AssetRequest, AssetSlot, SceneBank},
    transition::Transition,
};

#[derive(Debug)]
pub struct Sketch {
    bank: SceneBank,
    compositor: Compositor,
    transition: Transition,
    settings: Settings,
    render_loop: RenderLoop,
    inertia: InertiaFilter,
    panel: DebugPanel,
    target_resize: TargetResize,
    wheel_advances_scene: bool,
}

impl Sketch {
    /// Builds every scene and starts the render loop.
    ///
    /// The returned requests still have to be loaded; see [`Sketch::apply_asset`].
    pub fn new(
        ctx: &Context,
        config: Config,
        host: &mut impl FrameHost,
    ) -> anyhow::Result<(Self, Vec<AssetRequest>)> {
        config.validate()?;
        let transition = Transition::new(config.scenes.len())?;
        let (bank, requests) = SceneBank::new(
            &ctx.device,
            &ctx.queue,
            &ctx.camera.bind_group_layout,
            config.scenes,
            ctx.size(),
        );
        let compositor = Compositor::new(&ctx.device, ctx.config.format);
        let panel = DebugPanel::new(&ctx.window, &ctx.device, ctx.config.format);
        let render_loop = RenderLoop::start(host);

        Ok((
            Self {
                bank,
                compositor,
                transition,
                settings: Settings::default(),
                render_loop,
                inertia: InertiaFilter::default(),
                panel,
                target_resize: config.target_resize,
                wheel_advances_scene: config.wheel_advances_scene,
            },
            requests,
        ))
    }

    pub fn play(&mut self, host: &mut impl FrameHost) {
        self.render_loop.play(host);
    }

    pub fn stop(&mut self, host: &mut impl FrameHost) {
        self.render_loop.stop(host);
    }

    pub fn toggle_playback(&mut self, host: &mut impl FrameHost) {
        if self.render_loop.is_running() {
            self.stop(host);
        } else {
            self.play(host);
        }
    }

    /// Hands the event to the debug panel. Returns `true` when the panel consumed it.
    pub fn on_window_event(&mut self, ctx: &Context, event: &WindowEvent) -> bool {
        self.panel.on_window_event(&ctx.window, event)
    }

    pub fn on_wheel(&mut self, delta: &MouseScrollDelta) -> WheelClass {
        let sample = WheelSample::from_scroll(delta, instant::Instant::now());
        let class = self.inertia.check(sample);
        log::info!("wheel {:+.1}: {:?}", sample.delta, class);
        if let Some(step) = wheel_step(class, self.wheel_advances_scene) {
            self.transition.advance(step);
        }
        class
    }

    /// Swaps a placeholder for the loaded image, or keeps it when loading failed.
    pub fn apply_asset(
        &mut self,
        ctx: &Context,
        slot: AssetSlot,
        image: anyhow::Result<image::DynamicImage>,
    ) {
        match image {
            Ok(image) => {
                self.bank.apply_asset(&ctx.device, &ctx.queue, slot, &image);
            }
            Err(e) => log::warn!(
                "scene {} {:?} keeps its placeholder: {:#}",
                slot.scene,
                slot.kind,
                e
            ),
        }
    }

    /// Follows a surface resize. `ctx` must already be resized.
    pub fn resize(&mut self, ctx: &Context) {
        resize_scene_targets(self.target_resize, &mut self.bank, &ctx.device, ctx.size());
    }

    /// Renders one frame if `token` is the one the render loop is waiting for.
    pub fn frame(
        &mut self,
        ctx: &Context,
        token: FrameToken,
        host: &mut impl FrameHost,
    ) -> Result<Option<Tick>, wgpu::SurfaceError> {
        let Some(tick) = self.render_loop.on_frame(token, host) else {
            return Ok(None);
        };

        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let (current, next) = (self.transition.current(), self.transition.next());
        self.bank
            .render_entry(current, &mut encoder, &ctx.camera.bind_group);
        if next != current {
            self.bank
                .render_entry(next, &mut encoder, &ctx.camera.bind_group);
        }

        sync_progress(
            &self.settings,
            &mut self.transition,
            &mut self.compositor,
            &ctx.queue,
        );
        if let (Some(first), Some(second)) = (self.bank.get(current), self.bank.get(next)) {
            self.compositor.composite(
                &ctx.device,
                &mut encoder,
                &view,
                &first.target.color,
                &second.target.color,
            );
        }

        self.panel.draw(
            &ctx.window,
            &ctx.device,
            &ctx.queue,
            &mut encoder,
            &view,
            ctx.size(),
            &mut self.settings,
        );

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(Some(tick))
    }
}

/// Copies the slider value read on this tick into the transition and the compositor
/// uniform.
pub fn sync_progress(
    settings: &Settings,
    transition: &mut Transition,
    compositor: &mut Compositor,
    queue: &wgpu::Queue,
) {
    transition.set_progress(settings.progress);
    compositor.set_progress(queue, transition.progress());
}

/// Rebuilds the scene targets at `size` when `policy` follows the viewport.
///
/// Returns whether the targets were rebuilt.
pub fn resize_scene_targets(
    policy: TargetResize,
    bank: &mut SceneBank,
    device: &wgpu::Device,
    size: [u32; 2],
) -> bool {
    match policy {
        TargetResize::Follow => {
            bank.resize_targets(device, size);
            true
        }
        TargetResize::Fixed => false,
    }
}

/// Scene step a classified wheel event asks for. Inertia never steps, and nothing steps
/// unless wheel transitions are enabled.
pub fn wheel_step(class: WheelClass, wheel_advances_scene: bool) -> Option<isize> {
    match class {
        WheelClass::Intentional(direction) if wheel_advances_scene => Some(direction.step()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Direction;

    #[test]
    fn wheel_is_ignored_unless_enabled() {
        let class = WheelClass::Intentional(Direction::Down);
        assert_eq!(wheel_step(class, false), None);
        assert_eq!(wheel_step(class, true), Some(1));
    }

    #[test]
    fn inertia_never_steps() {
        assert_eq!(wheel_step(WheelClass::Inertia, true), None);
        assert_eq!(wheel_step(WheelClass::Inertia, false), None);
    }

    #[test]
    fn wheel_steps_move_the_scene_pair() {
        let mut transition = Transition::new(3).unwrap();
        let classes = [
            WheelClass::Intentional(Direction::Up),
            WheelClass::Inertia,
            WheelClass::Intentional(Direction::Up),
        ];
        for class in classes {
            if let Some(step) = wheel_step(class, true) {
                transition.advance(step);
            }
        }
        assert_eq!((transition.current(), transition.next()), (1, 2));
    }
}
