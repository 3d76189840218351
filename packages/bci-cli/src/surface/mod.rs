// Render surfaces for the feedback views
//
// - `headless`: no window; logs the scene's text and turns Ctrl-C into a quit
// - `window`: software-rendered `minifb` window (feature `window`)

pub mod headless;
#[cfg(feature = "window")]
pub mod window;

use bci_rs::config::ScreenConfig;
use bci_rs::render::RenderSurface;
use bci_rs::Result;

pub use headless::HeadlessSurface;

/// Open the surface a session draws on.
pub fn open(window: bool, screen: &ScreenConfig, title: &str) -> Result<Box<dyn RenderSurface>> {
    if window {
        return open_window(screen, title);
    }
    log::info!("Running headless; press Ctrl-C to stop");
    Ok(Box::new(HeadlessSurface::with_ctrl_c()))
}

#[cfg(feature = "window")]
fn open_window(screen: &ScreenConfig, title: &str) -> Result<Box<dyn RenderSurface>> {
    Ok(Box::new(window::WindowSurface::open(screen, title)?))
}

#[cfg(not(feature = "window"))]
fn open_window(_screen: &ScreenConfig, _title: &str) -> Result<Box<dyn RenderSurface>> {
    Err(bci_rs::BciError::BackendUnavailable(
        "window surface is not compiled in; rebuild with --features window".to_string(),
    ))
}
