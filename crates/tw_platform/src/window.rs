use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Tilewalk".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl PlatformConfig {
    /// Physical pixels. The viewport, camera clamp and projection all use the
    /// surface size, which must match the configured size at any scale factor.
    pub fn inner_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }
}

/// The drawing surface is a fixed-size canvas, so the window is not resizable.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_resizable(false)
        .with_inner_size(config.inner_size());

    let window = event_loop.create_window(attrs)?;
    let surface = window.inner_size();
    log::info!(
        "Window '{}' created: {}x{} (scale factor {:.2})",
        config.title,
        surface.width,
        surface.height,
        window.scale_factor()
    );
    Ok(Arc::new(window))
}
