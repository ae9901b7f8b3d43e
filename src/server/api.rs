//! HTTP control surface using rouille.
//!
//! # Purpose
//!
//! Mutating endpoints (`/navigate`, `/click`, `/type`) validate their query
//! parameters and enqueue a [`Command`]; they answer as soon as the command is
//! queued and never report what the page did with it. Read endpoints
//! (`/snapshot`, `/stream.mjpeg`, `/status`) serve from the frame store.
//!
//! # Key types
//!
//! - [`ApiServer`] - binds the socket and serves from a background thread
//! - [`RequestError`] - parameter validation failure, answered with 400
//!
//! # Thread safety
//!
//! Handlers run on rouille's worker threads and only touch the shared
//! [`Bridge`]. They never call into the rendering surface.

use anyhow::{Result, anyhow};
use log::{debug, info};
use rouille::{Request, Response};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

use super::stream;
use crate::core::{Bridge, Command, FrameFormat};

const INDEX_HTML: &str = include_str!("index.html");

/// Query parameter validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("missing required parameter '{0}'")]
    MissingParam(&'static str),
    #[error("parameter '{name}' must be an integer, got {value:?}")]
    InvalidInteger { name: &'static str, value: String },
}

/// Latest frame metadata for `/status`
#[derive(Debug, Serialize)]
struct FrameStatus {
    seq: u64,
    width: u32,
    height: u32,
    format: FrameFormat,
    bytes: usize,
    url: String,
}

/// `/status` response body
#[derive(Debug, Serialize)]
struct StatusResponse {
    frame: Option<FrameStatus>,
    frames_published: u64,
    pending_commands: usize,
}

/// Running HTTP server.
pub struct ApiServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    stop: mpsc::Sender<()>,
}

impl ApiServer {
    /// Bind `addr` and serve requests from a background thread.
    pub fn start(addr: &str, bridge: Arc<Bridge>, stream_interval: Duration) -> Result<Self> {
        let server = rouille::Server::new(addr, move |request| {
            Self::handle_request(request, &bridge, stream_interval)
        })
        .map_err(|e| anyhow!("Failed to bind API server to {}: {}", addr, e))?;

        let addr = server.server_addr();
        info!("API server listening on http://{}", addr);

        let (handle, stop) = server.stoppable();
        Ok(Self { addr, handle, stop })
    }

    /// Address actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting requests and wait for the server thread.
    /// Open streams finish on their own worker threads.
    pub fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.handle.join();
        info!("API server on {} stopped", self.addr);
    }

    fn handle_request(request: &Request, bridge: &Arc<Bridge>, stream_interval: Duration) -> Response {
        // Handle preflight
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        let result = rouille::router!(request,
            // Viewer and frames
            (GET) ["/"] => {
                Ok(Response::html(INDEX_HTML))
            },
            (GET) ["/stream.mjpeg"] => {
                debug!("MJPEG client connected from {}", request.remote_addr());
                Ok(stream::response(Arc::clone(bridge), stream_interval))
            },
            (GET) ["/snapshot"] => {
                Ok(Self::snapshot(bridge))
            },

            // Page control
            (GET) ["/navigate"] => { Self::navigate(request, bridge) },
            (POST) ["/navigate"] => { Self::navigate(request, bridge) },
            (GET) ["/click"] => { Self::click(request, bridge) },
            (POST) ["/click"] => { Self::click(request, bridge) },
            (GET) ["/type"] => { Self::type_key(request, bridge) },
            (POST) ["/type"] => { Self::type_key(request, bridge) },

            // Introspection
            (GET) ["/status"] => {
                Ok(Self::status(bridge))
            },
            (GET) ["/health"] => {
                Ok(Response::json(&serde_json::json!({ "success": true, "message": "pagecast" })))
            },

            // Fallback
            _ => {
                Ok(Response::text("Not found").with_status_code(404))
            }
        );

        // Validation errors end here, the render loop never sees them
        let response = result.unwrap_or_else(|err: RequestError| {
            debug!("Rejected {} {}: {}", request.method(), request.raw_url(), err);
            Response::text(err.to_string()).with_status_code(400)
        });

        response.with_additional_header("Access-Control-Allow-Origin", "*")
    }

    fn snapshot(bridge: &Bridge) -> Response {
        match bridge.frames.current() {
            Some(frame) => Response::from_data(frame.format.mime(), frame.data.clone())
                .with_additional_header("Cache-Control", "no-cache"),
            None => Response::text("No image yet").with_status_code(404),
        }
    }

    fn navigate(request: &Request, bridge: &Bridge) -> Result<Response, RequestError> {
        let url = required_param(request, "url")?;
        if url.trim().is_empty() {
            return Err(RequestError::MissingParam("url"));
        }
        bridge.commands.enqueue(Command::Navigate { url });
        Ok(Response::text("Navigating"))
    }

    fn click(request: &Request, bridge: &Bridge) -> Result<Response, RequestError> {
        let x = int_param(request, "x")?;
        let y = int_param(request, "y")?;
        bridge.commands.enqueue(Command::Click { x, y });
        Ok(Response::text("Clicked"))
    }

    fn type_key(request: &Request, bridge: &Bridge) -> Result<Response, RequestError> {
        // Not trimmed: " " is a valid key
        let key = required_param(request, "key")?;
        bridge.commands.enqueue(Command::KeyInput { key });
        Ok(Response::text("Typed"))
    }

    fn status(bridge: &Bridge) -> Response {
        let frame = bridge.frames.current().map(|f| FrameStatus {
            seq: f.seq,
            width: f.width,
            height: f.height,
            format: f.format,
            bytes: f.data.len(),
            url: f.url.clone(),
        });
        Response::json(&StatusResponse {
            frame,
            frames_published: bridge.frames.published(),
            pending_commands: bridge.commands.len(),
        })
    }
}

fn required_param(request: &Request, name: &'static str) -> Result<String, RequestError> {
    request
        .get_param(name)
        .filter(|value| !value.is_empty())
        .ok_or(RequestError::MissingParam(name))
}

fn int_param(request: &Request, name: &'static str) -> Result<i32, RequestError> {
    let raw = required_param(request, name)?;
    raw.trim()
        .parse::<i32>()
        .map_err(|_| RequestError::InvalidInteger { name, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frame;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    const INTERVAL: Duration = Duration::from_millis(5);

    fn call(bridge: &Arc<Bridge>, method: &str, url: &str) -> Response {
        let request = Request::fake_http(method, url, vec![], vec![]);
        ApiServer::handle_request(&request, bridge, INTERVAL)
    }

    fn body(response: Response) -> Vec<u8> {
        let (mut reader, _) = response.data.into_reader_and_size();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        out
    }

    fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
        response
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }

    fn jpeg_frame(data: &[u8]) -> Frame {
        Frame::new(data.to_vec(), FrameFormat::Jpeg, 4, 3, "https://x.test".into())
    }

    #[test]
    fn test_snapshot_before_and_after_capture() {
        let bridge = Arc::new(Bridge::new());
        assert_eq!(call(&bridge, "GET", "/snapshot").status_code, 404);

        bridge.frames.publish(jpeg_frame(b"\xFF\xD8frame"));
        let response = call(&bridge, "GET", "/snapshot");
        assert_eq!(response.status_code, 200);
        assert_eq!(header(&response, "Content-Type"), Some("image/jpeg"));
        assert_eq!(body(response), b"\xFF\xD8frame");
    }

    #[test]
    fn test_snapshot_png_content_type() {
        let bridge = Arc::new(Bridge::new());
        bridge.frames.publish(Frame::new(vec![1, 2, 3], FrameFormat::Png, 1, 1, String::new()));
        let response = call(&bridge, "GET", "/snapshot");
        assert_eq!(header(&response, "Content-Type"), Some("image/png"));
    }

    #[test]
    fn test_click_validation() {
        let bridge = Arc::new(Bridge::new());

        let response = call(&bridge, "GET", "/click?x=abc&y=5");
        assert_eq!(response.status_code, 400);
        assert!(String::from_utf8(body(response)).unwrap().contains("'x'"));

        assert_eq!(call(&bridge, "GET", "/click?x=10").status_code, 400);
        assert!(bridge.commands.is_empty());

        let response = call(&bridge, "GET", "/click?x=10&y=20");
        assert_eq!(response.status_code, 200);
        assert_eq!(body(response), b"Clicked");
        assert_eq!(bridge.commands.drain_all(), vec![Command::Click { x: 10, y: 20 }]);
    }

    #[test]
    fn test_click_accepts_post_and_negative() {
        let bridge = Arc::new(Bridge::new());
        assert_eq!(call(&bridge, "POST", "/click?x=-3&y=7").status_code, 200);
        assert_eq!(bridge.commands.drain_all(), vec![Command::Click { x: -3, y: 7 }]);
    }

    #[test]
    fn test_navigate() {
        let bridge = Arc::new(Bridge::new());
        assert_eq!(call(&bridge, "GET", "/navigate").status_code, 400);
        assert_eq!(call(&bridge, "GET", "/navigate?url=").status_code, 400);

        let response = call(&bridge, "POST", "/navigate?url=example.com");
        assert_eq!(response.status_code, 200);
        assert_eq!(body(response), b"Navigating");
        // Normalization happens on the render thread
        assert_eq!(
            bridge.commands.drain_all(),
            vec![Command::Navigate { url: "example.com".into() }]
        );
    }

    #[test]
    fn test_type() {
        let bridge = Arc::new(Bridge::new());
        let response = call(&bridge, "GET", "/type");
        assert_eq!(response.status_code, 400);
        assert_eq!(body(response), b"missing required parameter 'key'");

        assert_eq!(call(&bridge, "GET", "/type?key=Enter").status_code, 200);
        assert_eq!(call(&bridge, "GET", "/type?key=a").status_code, 200);
        assert_eq!(
            bridge.commands.drain_all(),
            vec![
                Command::KeyInput { key: "Enter".into() },
                Command::KeyInput { key: "a".into() },
            ]
        );
    }

    #[test]
    fn test_stream_headers_and_first_part() {
        let bridge = Arc::new(Bridge::new());
        bridge.frames.publish(jpeg_frame(b"live"));

        let response = call(&bridge, "GET", "/stream.mjpeg");
        assert_eq!(response.status_code, 200);
        assert_eq!(
            header(&response, "Content-Type"),
            Some("multipart/x-mixed-replace; boundary=frame")
        );

        let (mut reader, size) = response.data.into_reader_and_size();
        assert!(size.is_none());
        let mut buf = [0u8; 256];
        let n = reader.read(&mut buf).unwrap();
        assert!(buf[..n].starts_with(b"\r\n--frame\r\nContent-Type: image/jpeg\r\n"));
        assert!(buf[..n].windows(8).any(|w| w == b"\r\n\r\nlive"));
    }

    #[test]
    fn test_status_and_health() {
        let bridge = Arc::new(Bridge::new());
        bridge.commands.enqueue(Command::Click { x: 1, y: 1 });
        bridge.frames.publish(jpeg_frame(b"12345"));

        let status: serde_json::Value =
            serde_json::from_slice(&body(call(&bridge, "GET", "/status"))).unwrap();
        assert_eq!(status["frames_published"], 1);
        assert_eq!(status["pending_commands"], 1);
        assert_eq!(status["frame"]["bytes"], 5);
        assert_eq!(status["frame"]["format"], "jpeg");
        assert_eq!(status["frame"]["url"], "https://x.test");

        let health: serde_json::Value =
            serde_json::from_slice(&body(call(&bridge, "GET", "/health"))).unwrap();
        assert_eq!(health["success"], true);
    }

    #[test]
    fn test_cors_and_fallback() {
        let bridge = Arc::new(Bridge::new());
        let response = call(&bridge, "GET", "/nope");
        assert_eq!(response.status_code, 404);
        assert_eq!(header(&response, "Access-Control-Allow-Origin"), Some("*"));

        let preflight = call(&bridge, "OPTIONS", "/click");
        assert_eq!(preflight.status_code, 204);

        // Frames are read-only
        assert_eq!(call(&bridge, "POST", "/snapshot").status_code, 404);
    }

    #[test]
    fn test_index_page() {
        let bridge = Arc::new(Bridge::new());
        let response = call(&bridge, "GET", "/");
        assert_eq!(response.status_code, 200);
        assert!(String::from_utf8(body(response)).unwrap().contains("/stream.mjpeg"));
    }

    #[test]
    fn test_server_over_tcp() {
        let bridge = Arc::new(Bridge::new());
        let server = ApiServer::start("127.0.0.1:0", Arc::clone(&bridge), INTERVAL).unwrap();

        let mut conn = TcpStream::connect(server.addr()).unwrap();
        conn.write_all(b"GET /click?x=1&y=2 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .unwrap();
        let mut reply = String::new();
        conn.read_to_string(&mut reply).unwrap();

        assert!(reply.starts_with("HTTP/1.1 200"));
        assert!(reply.ends_with("Clicked"));
        assert_eq!(bridge.commands.drain_all(), vec![Command::Click { x: 1, y: 2 }]);

        server.stop();
    }
}
