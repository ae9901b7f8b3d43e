//! pagecast - drive a locally rendered web page over HTTP.
//!
//! Remote clients watch an MJPEG feed of the page and send navigation,
//! click and key commands. Commands cross into a single render thread
//! through [`CommandChannel`](crate::core::CommandChannel); rendered frames come back out through
//! [`FrameStore`](crate::core::FrameStore).

// Shared state between HTTP handlers and the render thread
pub mod core;

// Render thread, surface interface, input mapping
pub mod render;

// HTTP control surface
pub mod server;

// App modules
pub mod cli;
pub mod config;
pub mod runner;

pub use crate::core::{Bridge, Command, Frame, FrameFormat};
pub use render::{RenderLoop, RenderSurface};
pub use server::ApiServer;
