//! The application shell: window, event loop and async dispatch.
//!
//! Owns the winit plumbing on both targets. The native build drives async
//! loads on a tokio runtime; the web build uses `spawn_local` and reports
//! back through user events. All load results are stamped with the session
//! generation they were requested under, so results arriving after a
//! session was torn down are recognised and dropped.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::SceneConfig,
    context::Context,
    data_structures::node::LoadedModel,
    resources::load_model_gltf,
    scene::{Command, SceneSession},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub enum SessionEvent {
    /// The async part of startup finished (web only; native startup blocks).
    #[allow(dead_code)]
    Initialized(Box<SceneSession>),
    /// A dispatched load finished, successfully or not.
    ModelLoaded {
        slot: usize,
        generation: u64,
        request: u64,
        result: anyhow::Result<LoadedModel>,
    },
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<SessionEvent>,
    config: SceneConfig,
    session: Option<SceneSession>,
    /// Stamp for the next session; bumped whenever a session is replaced.
    next_generation: u64,
}

impl App {
    fn new(event_loop: &EventLoop<SessionEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy: event_loop.create_proxy(),
            config,
            session: None,
            next_generation: 0,
        })
    }

    /// Hands the session's requested loads to the platform executor. Results
    /// come back as [`SessionEvent::ModelLoaded`] user events.
    fn dispatch(&self, commands: Vec<Command>) {
        let Some(session) = &self.session else {
            return;
        };
        for command in commands {
            let Command::Load {
                slot,
                path,
                generation,
                request,
            } = command;
            let device = session.ctx.device.clone();
            let queue = session.ctx.queue.clone();
            let proxy = self.proxy.clone();
            let load = async move {
                let result = load_model_gltf(&path, &device, &queue).await;
                if proxy
                    .send_event(SessionEvent::ModelLoaded {
                        slot,
                        generation,
                        request,
                        result,
                    })
                    .is_err()
                {
                    log::error!("event loop closed before load of {} completed", path);
                }
            };

            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(load);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(load);
        }
    }

    fn install(&mut self, mut session: SceneSession) {
        let commands = session.startup_commands();
        let size = session.ctx.window.inner_size();
        self.session = Some(session);
        if let Some(session) = &mut self.session {
            session.resize(size.width, size.height);
            session.ctx.window.request_redraw();
        }
        self.dispatch(commands);
    }
}

impl ApplicationHandler<SessionEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let generation = self.next_generation;
        self.next_generation += 1;
        let config = self.config.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = match self.async_runtime.block_on(Context::new(window, &config)) {
                Ok(ctx) => ctx,
                Err(e) => {
                    log::error!("GPU initialization failed: {:#}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.install(SceneSession::new(ctx, config, generation));
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window, &config)
                    .await
                    .expect_throw("GPU initialization failed");
                let session = SceneSession::new(ctx, config, generation);
                assert!(
                    proxy
                        .send_event(SessionEvent::Initialized(Box::new(session)))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: SessionEvent) {
        match event {
            SessionEvent::Initialized(session) => {
                // This is the message from our wasm `spawn_local`
                self.install(*session);
            }
            SessionEvent::ModelLoaded {
                slot,
                generation,
                request,
                result,
            } => {
                let Some(session) = &mut self.session else {
                    return;
                };
                match result {
                    Ok(model) => session.attach(slot, generation, request, model),
                    Err(error) => session.load_failed(slot, generation, request, &error),
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
        let Some(session) = &mut self.session else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                // Dropping the session tears down the scene; in-flight load
                // results are rejected by their stale generation.
                self.session = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => session.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                session.pointer_moved(position.x, position.y)
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left && state.is_pressed() {
                    session.trigger_evolution(Instant::now());
                }
            }
            WindowEvent::RedrawRequested => {
                let commands = session.frame(Instant::now());
                match session.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = session.ctx.window.inner_size();
                        session.ctx.is_surface_configured = false;
                        session.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("unable to render {}", e);
                    }
                }
                self.dispatch(commands);
            }
            _ => {}
        }
    }
}

/// Builds the event loop and runs the viewer until the window closes.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<SessionEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Web entry point: starts the default evolving-bean scene in the page's
/// `canvas` element.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() {
    run(SceneConfig::evolving_bean()).expect_throw("viewer failed to start");
}
