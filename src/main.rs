#![warn(clippy::pedantic)]
use std::{path::PathBuf, process::ExitCode, rc::Rc};

use anyhow::{anyhow, Context as _};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::{
    event::{DeviceEvent, ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::CursorGrabMode,
};

use glflycam::{CurrentGl, GlContext, Settings, ShaderProgram};

mod buffer;
mod frame;
mod texture;
mod window;

#[derive(Parser)]
#[command(name = "glflycam", about = "Lit, textured cubes with a fly camera")]
struct Cli {
    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vertex shader, overrides the config file
    #[arg(long)]
    vertex: Option<PathBuf>,

    /// Fragment shader, overrides the config file
    #[arg(long)]
    fragment: Option<PathBuf>,

    /// Image to put on the cubes instead of the checkerboard
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(vertex) = cli.vertex {
        settings.shaders.vertex = vertex;
    }
    if let Some(fragment) = cli.fragment {
        settings.shaders.fragment = fragment;
    }

    let event_loop = EventLoop::new()?;
    let (target, gl) = window::GlTarget::new(&event_loop, &settings.window)?;
    // SAFETY: GlTarget::new made the context current on this thread, and `target`
    // keeps it alive until the event loop ends.
    let ctx = Rc::new(GlContext::new(unsafe { CurrentGl::new(gl) }));

    let program = ShaderProgram::from_files(
        &ctx,
        &settings.shaders.vertex,
        &settings.shaders.fragment,
    )
    .or_else(|e| {
        if !e.is_build_failure() {
            return Err(e);
        }
        tracing::error!("{e}");
        tracing::warn!("drawing with the fallback shader");
        ShaderProgram::fallback(&ctx)
    })?;

    let image = match &cli.texture {
        Some(path) => texture::load(path)?,
        None => texture::checkerboard(256, 8),
    };
    let texture = texture::Texture::new(ctx.api(), &image)
        .map_err(|e| anyhow!("failed to upload texture: {e}"))?;
    let (vertices, indices) = buffer::cube();
    let mesh = buffer::Mesh::new(ctx.api(), &vertices, &indices)
        .map_err(|e| anyhow!("failed to upload cube: {e}"))?;

    let mut app = Some(frame::Application::new(
        Rc::clone(&ctx),
        program,
        mesh,
        texture,
        &settings.camera,
    ));

    // A locked cursor reports raw motion only, so looking around never hits the window
    // edge. Platforms without locking get a confined cursor and absolute positions.
    let locked = match target.window.set_cursor_grab(CursorGrabMode::Locked) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("cursor lock unavailable: {e}");
            if let Err(e) = target.window.set_cursor_grab(CursorGrabMode::Confined) {
                tracing::warn!("could not grab cursor: {e}");
            }
            false
        }
    };
    target.window.set_cursor_visible(false);

    event_loop.set_control_flow(ControlFlow::Poll);

    // rendering loop
    event_loop
        .run(move |event, window_target| {
            let Some(application) = app.as_mut() else {
                return;
            };
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => window_target.exit(),

                    WindowEvent::RedrawRequested => {
                        application.draw_frame(target.window.inner_size());
                        if let Err(e) = target.swap_buffers() {
                            tracing::error!("{e:#}");
                            window_target.exit();
                        }
                    }
                    WindowEvent::Resized(size) => {
                        target.resize(size.width, size.height);
                        application.resize(size);
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key,
                                state,
                                ..
                            },
                        ..
                    } => {
                        if physical_key == PhysicalKey::Code(KeyCode::Escape)
                            && state == ElementState::Pressed
                        {
                            window_target.exit();
                        }
                        application.key(physical_key, state);
                    }
                    WindowEvent::CursorMoved { position, .. } if !locked => {
                        application.cursor_moved(position.x, position.y);
                    }
                    WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                        application.suspend_input();
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let y = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            #[allow(clippy::cast_possible_truncation)]
                            MouseScrollDelta::PixelDelta(p) => (p.y / 20.0) as f32,
                        };
                        application.scroll(y);
                    }
                    _ => (),
                },
                Event::DeviceEvent {
                    event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                    ..
                } if locked && target.window.has_focus() => application.mouse_motion(dx, dy),
                // ensures continuous rendering
                Event::AboutToWait => target.window.request_redraw(),
                Event::LoopExiting => {
                    if let Some(application) = app.take() {
                        application.release();
                    }
                }
                _ => (),
            }
        })
        .context("event loop failed")?;

    Ok(())
}
