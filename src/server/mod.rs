//! HTTP control surface for remote clients.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐     CommandChannel       ┌──────────────────────┐
//! │   HTTP worker threads   │  ───── Command ───────▶  │   Render thread      │
//! │   (rouille)             │                          │   (RenderLoop)       │
//! │                         │                          │                      │
//! │  GET /click?x=10&y=20   │  ──▶ Click{10,20} ────▶  │  press + release     │
//! │  GET /navigate?url=..   │  ──▶ Navigate ────────▶  │  surface.load()      │
//! └─────────────────────────┘                          └──────────────────────┘
//!          │                                                      │
//!          │  FrameStore (Arc<Frame>)                             │
//!          │◀──────────── latest frame ──────────────────────────│
//!          │                                           capture every ~100 ms
//! ```
//!
//! # Endpoints
//!
//! | Method   | Path             | Description                              |
//! |----------|------------------|------------------------------------------|
//! | GET      | `/`              | Viewer page (stream + click/key capture) |
//! | GET      | `/stream.mjpeg`  | `multipart/x-mixed-replace` frame feed   |
//! | GET      | `/snapshot`      | Latest frame, 404 before first capture   |
//! | GET/POST | `/navigate?url=` | Load a page                              |
//! | GET/POST | `/click?x=&y=`   | Left click at frame coordinates          |
//! | GET/POST | `/type?key=`     | Single key, `Enter` or `Backspace`       |
//! | GET      | `/status`        | Frame and queue stats (JSON)             |
//! | GET      | `/health`        | Health check                             |

mod api;
mod stream;

pub use api::{ApiServer, RequestError};
pub use stream::{BOUNDARY, MjpegStream};
