use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "spanlens".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Opens one window and redraws it on demand (creation, resize, surface
/// reconfiguration). Closing the window ends the loop.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    window_id: Option<WindowId>,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            window_id: None,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        log::info!("window {id:?} ready");
        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        self.window_id = Some(id);
        Ok(())
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.window = None;
        self.window_id = None;
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shut_down(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                // Split borrows to avoid `self` capture inside `ouroboros` closures.
                let (app, window) = (&mut self.app, &mut self.window);
                let Some(entry) = window.as_mut() else { return };

                let control = entry.with_mut(|fields| {
                    let size = fields.gpu.size();
                    if size.width == 0 || size.height == 0 {
                        return AppControl::Continue;
                    }
                    let mut ctx = FrameCtx {
                        window: fields.window,
                        gpu: fields.gpu,
                    };
                    app.on_frame(&mut ctx)
                });

                if control == AppControl::Exit {
                    self.shut_down(event_loop);
                }
            }

            _ => {}
        }
    }
}
