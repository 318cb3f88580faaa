//! Debug panel: a floating "Controls" window with the `progress` slider.

use winit::{event::WindowEvent, window::Window};

/// Values the panel edits. Read by the sketch on every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Settings {
    pub progress: f32,
}

pub const PANEL_TITLE: &str = "Controls";

/// Lays out the slider panel. Kept apart from [`DebugPanel`] so it runs without a window.
pub fn controls(ctx: &egui::Context, settings: &mut Settings) {
    egui::Window::new(PANEL_TITLE)
        .resizable(false)
        .default_pos(egui::pos2(10.0, 10.0))
        .show(ctx, |ui| {
            ui.add(
                egui::Slider::new(&mut settings.progress, 0.0..=1.0)
                    .step_by(0.01)
                    .text("progress"),
            );
        });
}

/// Pixels per point to render the panel at.
///
/// egui lays out and hit-tests against the window, but the surface may be smaller than
/// the window (see [`crate::flow::MAX_PIXEL_RATIO`]). Scaling by the width ratio keeps the
/// same points on screen.
pub fn render_pixels_per_point(
    pixels_per_point: f32,
    window_width: u32,
    surface_width: u32,
) -> f32 {
    if window_width == 0 {
        return pixels_per_point;
    }
    pixels_per_point * surface_width as f32 / window_width as f32
}

pub struct DebugPanel {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl std::fmt::Debug for DebugPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DebugPanel")
    }
}

impl DebugPanel {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer =
            egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns `true` when the panel consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Runs the panel for one frame and draws it on top of `view`.
    pub fn draw(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        settings: &mut Settings,
    ) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| controls(ctx, settings));
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = render_pixels_per_point(
            self.ctx.pixels_per_point(),
            window.inner_size().width,
            size_in_pixels[0],
        );
        let tris = self.ctx.tessellate(full_output.shapes, pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Debug Panel Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.renderer
                .render(&mut render_pass.forget_lifetime(), &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_start_on_the_first_scene() {
        assert_eq!(Settings::default().progress, 0.0);
    }

    #[test]
    fn full_size_surface_keeps_the_window_scale() {
        assert_eq!(render_pixels_per_point(2.0, 1600, 1600), 2.0);
        assert_eq!(render_pixels_per_point(1.5, 0, 0), 1.5);
    }

    #[test]
    fn smaller_surface_renders_fewer_pixels_per_point() {
        assert_eq!(render_pixels_per_point(3.0, 3000, 2000), 2.0);
    }

    #[test]
    fn panel_lays_out_without_changing_settings() {
        let ctx = egui::Context::default();
        let mut settings = Settings { progress: 0.42 };
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| controls(ctx, &mut settings));
        }
        assert_eq!(settings.progress, 0.42);
    }
}
