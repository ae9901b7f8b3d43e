//! Narrow interface to the rendering engine.
//!
//! The engine itself is external. Whatever implements [`RenderSurface`] is
//! owned by exactly one [`RenderLoop`](super::RenderLoop) and only ever
//! called from that loop's thread; the trait has no `Send`/`Sync` bound so
//! engines with thread affinity can implement it directly.

use image::RgbaImage;

use super::error::SurfaceError;
use super::input::InputEvent;

/// Where synthetic input is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// The currently focused interactive element
    Focused,
    /// The surface itself (nothing has focus)
    Surface,
}

pub trait RenderSurface {
    /// Grab the current rendered output. Pixel coordinates of the image are
    /// the coordinates input events use.
    fn render(&mut self) -> Result<RgbaImage, SurfaceError>;

    /// Deliver one input event.
    fn dispatch(&mut self, target: InputTarget, event: &InputEvent) -> Result<(), SurfaceError>;

    /// Start loading `url`. Completion is not awaited.
    fn load(&mut self, url: &str) -> Result<(), SurfaceError>;

    /// Target for the next input event.
    fn focus_target(&self) -> InputTarget;

    /// URL of the page currently shown.
    fn url(&self) -> String;
}
