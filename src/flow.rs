//! Application event loop.
//!
//! [`run`] creates the window and hands control to winit. Once the window exists the GPU
//! context and the [`Sketch`] are built, and the scene images start loading in the
//! background. Everything after that is driven by window events:
//!
//! 1. `Resized` reconfigures the surface, the camera and (by policy) the scene targets
//! 2. `RedrawRequested` delivers the frame token the render loop is waiting for
//! 3. `MouseWheel` goes through the inertia filter
//! 4. `Space` toggles play/stop
//!
//! Loaded images come back as [`FadeEvent::AssetLoaded`] user events and are uploaded on
//! the event loop thread.

use std::{fmt::Debug, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    config::Config,
    context::Context,
    render::WindowFrames,
    resources::load_asset,
    scene::{AssetRequest, AssetSlot},
    sketch::Sketch,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Largest device pixel ratio the canvas is rendered at.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// GPU context, sketch and frame scheduling of a live window.
#[derive(Debug)]
pub struct AppState {
    ctx: Context,
    sketch: Sketch,
    frames: WindowFrames,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: Config) -> anyhow::Result<(Self, Vec<AssetRequest>)> {
        let ctx = Context::new(window.clone()).await?;
        let mut frames = WindowFrames::new(window);
        let (sketch, requests) = Sketch::new(&ctx, config, &mut frames)?;
        Ok((
            Self {
                ctx,
                sketch,
                frames,
                is_surface_configured: false,
            },
            requests,
        ))
    }

    fn resize(&mut self, width: u32, height: u32) {
        #[cfg(target_arch = "wasm32")]
        let (width, height) = capped_size(width, height, self.ctx.window.scale_factor());
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
            self.sketch.resize(&self.ctx);
            // A frame that arrived before the surface was ready is still due.
            self.ctx.window.request_redraw();
        }
    }

    fn redraw(&mut self) {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return;
        }
        let Some(token) = self.frames.take_due() else {
            return;
        };
        match self.sketch.frame(&self.ctx, token, &mut self.frames) {
            Ok(_) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window.inner_size();
                self.resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
    }
}

/// Scales a physical size down so it never exceeds [`MAX_PIXEL_RATIO`] device pixels per
/// CSS pixel.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn capped_size(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    if scale_factor <= MAX_PIXEL_RATIO {
        return (width, height);
    }
    let scale = MAX_PIXEL_RATIO / scale_factor;
    let cap = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (cap(width), cap(height))
}

pub(crate) enum FadeEvent {
    #[cfg(target_arch = "wasm32")]
    Initialized(anyhow::Result<(AppState, Vec<AssetRequest>)>),
    AssetLoaded {
        slot: AssetSlot,
        image: anyhow::Result<image::DynamicImage>,
    },
}

impl Debug for FadeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(result) => f
                .debug_tuple("Initialized")
                .field(&result.as_ref().map(|_| "AppState"))
                .finish(),
            Self::AssetLoaded { slot, image } => f
                .debug_struct("AssetLoaded")
                .field("slot", slot)
                .field("ok", &image.is_ok())
                .finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FadeEvent>,
    // Taken once the window exists.
    config: Option<Config>,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<FadeEvent>, config: Config) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            state: None,
        })
    }

    fn load_assets(&self, requests: Vec<AssetRequest>) {
        log::info!("loading {} images", requests.len());
        for request in requests {
            let proxy = self.proxy.clone();
            let load = async move {
                let (slot, image) = load_asset(request).await;
                if proxy
                    .send_event(FadeEvent::AssetLoaded { slot, image })
                    .is_err()
                {
                    log::warn!("event loop closed before scene {} {:?} loaded", slot.scene, slot.kind);
                }
            };
            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(load);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(load);
        }
    }

    fn on_initialized(
        &mut self,
        event_loop: &ActiveEventLoop,
        result: anyhow::Result<(AppState, Vec<AssetRequest>)>,
    ) {
        let (mut state, requests) = match result {
            Ok(initialized) => initialized,
            Err(e) => {
                log::error!("App initialization failed: {:#}", e);
                event_loop.exit();
                return;
            }
        };
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        self.state = Some(state);
        self.load_assets(requests);
    }
}

impl ApplicationHandler<FadeEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        let window_attributes = Window::default_attributes().with_title("scene-fade");

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(target_arch = "wasm32")]
        if let Err(e) = attach_canvas(&window, &config.container_id) {
            log::error!("{:#}", e);
        }

        let init_future = AppState::new(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let result = self.async_runtime.block_on(init_future);
            self.on_initialized(event_loop, result);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                if proxy.send_event(FadeEvent::Initialized(result)).is_err() {
                    log::error!("event loop closed during initialization");
                }
            });
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(unused_variables))]
    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FadeEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FadeEvent::Initialized(result) => self.on_initialized(event_loop, result),
            FadeEvent::AssetLoaded { slot, image } => {
                if let Some(state) = &mut self.state {
                    state.sketch.apply_asset(&state.ctx, slot, image);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        let consumed = state.sketch.on_window_event(&state.ctx, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => state.redraw(),
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                state.sketch.on_wheel(&delta);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => state.sketch.toggle_playback(&mut state.frames),
            _ => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn attach_canvas(window: &Window, container_id: &str) -> anyhow::Result<()> {
    use anyhow::Context as _;
    use winit::platform::web::WindowExtWebSys;

    let canvas = window.canvas().context("window has no canvas")?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .context("no document")?;
    let container = document
        .get_element_by_id(container_id)
        .with_context(|| format!("no element with id {:?}", container_id))?;
    container
        .append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("cannot append the canvas: {:?}", e))?;
    let _ = window.request_inner_size(winit::dpi::LogicalSize::new(
        container.client_width().max(1) as f64,
        container.client_height().max(1) as f64,
    ));
    Ok(())
}

pub fn run(config: Config) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FadeEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
