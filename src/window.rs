use std::num::NonZeroU32;

use anyhow::{anyhow, Context as _};
use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{
        ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    surface::{GlSurface, Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use winit::{dpi::LogicalSize, event_loop::EventLoop, window::Window, window::WindowBuilder};

use glflycam::config::WindowSettings;

/// A window with a current OpenGL 3.3 context and its function loader.
pub struct GlTarget {
    pub window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlTarget {
    pub fn new(
        event_loop: &EventLoop<()>,
        settings: &WindowSettings,
    ) -> anyhow::Result<(Self, glow::Context)> {
        let window_builder = WindowBuilder::new()
            .with_title(&settings.title)
            .with_inner_size(LogicalSize::new(settings.width, settings.height));
        let template = ConfigTemplateBuilder::new().with_depth_size(24);

        let (window, config) = DisplayBuilder::new()
            .with_window_builder(Some(window_builder))
            .build(event_loop, template, |configs| {
                configs
                    .max_by_key(GlConfig::num_samples)
                    .expect("the display offers at least one config")
            })
            .map_err(|e| anyhow!("failed to create window: {e}"))?;
        let window = window.ok_or_else(|| anyhow!("display builder returned no window"))?;

        let display = config.display();
        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(window.raw_window_handle()));
        let not_current = unsafe { display.create_context(&config, &attributes) }
            .context("failed to create an OpenGL 3.3 context")?;

        let surface_attributes = window.build_surface_attributes(Default::default());
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make context current")?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            tracing::warn!("vsync unavailable: {e}");
        }

        let gl =
            unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };
        tracing::info!(samples = config.num_samples(), "created OpenGL context");

        Ok((
            Self {
                window,
                surface,
                context,
            },
            gl,
        ))
    }

    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
        }
    }

    pub fn swap_buffers(&self) -> anyhow::Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}
