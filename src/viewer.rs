//! Desktop host for the engine.
//!
//! Opens a window, mounts an [`Engine`] on a [`GpuSurface`] and forwards
//! window events to it. Frames are driven by redraw requests: the engine
//! asks for the next frame at the end of each one, so the loop runs at the
//! display rate and the engine throttles itself to its target rate.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::EngineConfig;
use crate::engine::{Engine, FrameOutcome};
use crate::error::ViewerError;
use crate::gpu::GpuSurface;

const WINDOW_TITLE: &str = "morph-viewer";

/// The winit application.
pub struct App {
    config: EngineConfig,
    window: Option<Arc<Window>>,
    engine: Option<Engine<GpuSurface>>,
    start: Instant,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            window: None,
            engine: None,
            start: Instant::now(),
            error: None,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(Arc::clone(&window));

        let surface = pollster::block_on(GpuSurface::new(Arc::clone(&window)))?;
        let size = window.inner_size();

        let title = format!("{} - {}", WINDOW_TITLE, self.config.label);
        let on_complete = {
            let window = Arc::clone(&window);
            move || window.set_title(&title)
        };

        let engine = Engine::mount_scaled(
            surface,
            self.config.clone(),
            (size.width, size.height),
            window.scale_factor(),
            on_complete,
        )?;
        self.engine = Some(engine);
        self.start = Instant::now();
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(engine) = self.engine.as_mut() {
            engine.teardown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.mount(event_loop) {
            error!(error = %e, "failed to start viewer");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => engine.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                engine.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::RedrawRequested => {
                if engine.frame(self.start.elapsed()) == FrameOutcome::Stopped {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

/// Open the viewer window and run until it is closed.
pub fn run(config: EngineConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
