//! MJPEG feed: `multipart/x-mixed-replace` over a long-lived response.
//!
//! Each connected client gets its own [`MjpegStream`], a blocking reader
//! that rouille drains into the socket. The reader polls the frame store on
//! a fixed interval and emits whatever frame is current, so idle periods
//! repeat the same frame. When the client goes away the socket write fails,
//! the server drops the reader, and the loop ends with it.
//!
//! The body goes out with chunked transfer encoding, and the encoder only
//! writes a chunk once it is full and another byte follows. Every staged
//! part is therefore zero-padded so the running total lands one byte past
//! a chunk boundary: the frame is on the wire as soon as it is staged and
//! only a single filler byte is held back. Until the first capture exists
//! the stream emits filler on every tick, which keeps writes hitting the
//! socket so a client that already left is noticed.

use log::debug;
use rouille::{Response, ResponseBody};
use std::io::{self, Read};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::core::{Bridge, Frame};

/// Multipart boundary token.
pub const BOUNDARY: &str = "frame";

/// Chunk size of the HTTP server's chunked transfer encoder.
const CHUNK_SIZE: u64 = 8192;

pub struct MjpegStream {
    bridge: Arc<Bridge>,
    interval: Duration,
    part: Vec<u8>,
    pos: usize,
    parts_sent: u64,
    /// Bytes handed to the server so far
    written: u64,
    ticks: u64,
}

impl MjpegStream {
    pub fn new(bridge: Arc<Bridge>, interval: Duration) -> Self {
        Self { bridge, interval, part: Vec::new(), pos: 0, parts_sent: 0, written: 0, ticks: 0 }
    }

    /// Wait out one interval (except before the first tick), then stage the
    /// current frame, or filler if nothing has been captured yet.
    fn next_part(&mut self) {
        if self.ticks > 0 {
            thread::sleep(self.interval);
        }
        self.ticks += 1;

        self.part = match self.bridge.frames.current() {
            Some(frame) => {
                self.parts_sent += 1;
                encode_part(&frame, self.written)
            }
            None => vec![0; padding(self.written, 0)],
        };
        self.pos = 0;
    }
}

impl Read for MjpegStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.part.len() {
            self.next_part();
        }
        let n = (&self.part[self.pos..]).read(buf)?;
        self.pos += n;
        self.written += n as u64;
        Ok(n)
    }
}

impl Drop for MjpegStream {
    fn drop(&mut self) {
        debug!("MJPEG client disconnected after {} parts", self.parts_sent);
    }
}

/// Filler bytes that bring `written + len` to one past a chunk boundary.
/// Never zero, so the byte the encoder holds back is always filler.
fn padding(written: u64, len: usize) -> usize {
    let end = (written + len as u64) % CHUNK_SIZE;
    match (CHUNK_SIZE + 1 - end) % CHUNK_SIZE {
        0 => CHUNK_SIZE as usize,
        pad => pad as usize,
    }
}

/// One multipart section: delimiter, headers, image bytes, zero padding.
///
/// The delimiter's leading CRLF closes the previous part, so padding after
/// the image stays inside that part's body where decoders ignore it.
fn encode_part(frame: &Frame, written: u64) -> Vec<u8> {
    let header = format!(
        "\r\n--{}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        BOUNDARY,
        frame.format.mime(),
        frame.data.len()
    );
    let len = header.len() + frame.data.len();
    let pad = padding(written, len);
    let mut part = Vec::with_capacity(len + pad);
    part.extend_from_slice(header.as_bytes());
    part.extend_from_slice(&frame.data);
    part.resize(len + pad, 0);
    part
}

/// Streaming response for one client.
pub fn response(bridge: Arc<Bridge>, interval: Duration) -> Response {
    Response {
        status_code: 200,
        headers: vec![
            (
                "Content-Type".into(),
                format!("multipart/x-mixed-replace; boundary={}", BOUNDARY).into(),
            ),
            ("Cache-Control".into(), "no-cache".into()),
        ],
        data: ResponseBody::from_reader(MjpegStream::new(bridge, interval)),
        upgrade: None,
    }
}
