use thiserror::Error;

/// Failure reported by a [`RenderSurface`](super::RenderSurface) implementation.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("render failed: {0}")]
    Render(String),
    #[error("input event rejected: {0}")]
    Input(String),
}

/// Anything that can go wrong while the render loop applies a command or
/// captures a frame. These never leave the render thread; they are logged.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("unsupported key token {0:?}")]
    UnsupportedKey(String),
    #[error("frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("panicked: {0}")]
    Panicked(String),
}
