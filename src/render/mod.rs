//! Render side: the surface interface, input mapping, encoding, and the
//! single-threaded loop that owns the surface.

pub mod driver;
pub mod encode;
pub mod error;
pub mod headless;
pub mod input;
pub mod surface;

pub use driver::{LoopConfig, RenderLoop};
pub use encode::FrameEncoder;
pub use error::{DispatchError, SurfaceError};
pub use headless::HeadlessSurface;
pub use input::{Action, InputEvent, KeyCode, MouseButton};
pub use surface::{InputTarget, RenderSurface};
