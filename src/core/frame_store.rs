//! Single-slot store for the most recently captured frame.
//!
//! The render loop is the only writer. Stream and snapshot handlers read
//! from any number of threads. A frame is shared as `Arc<Frame>`, so a reader
//! holds the lock only long enough to clone the pointer and can never see a
//! half-written frame. The previous frame is released outside the lock.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Image encoding of a published frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// Lossy, low latency (stream default)
    #[default]
    Jpeg,
    /// Lossless, used by the legacy high-fidelity mode
    Png,
}

impl FrameFormat {
    /// MIME type for HTTP responses and multipart headers.
    pub fn mime(self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "image/jpeg",
            FrameFormat::Png => "image/png",
        }
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameFormat::Jpeg => write!(f, "jpeg"),
            FrameFormat::Png => write!(f, "png"),
        }
    }
}

/// One encoded snapshot of the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Encoded image bytes
    pub data: Vec<u8>,
    pub format: FrameFormat,
    pub width: u32,
    pub height: u32,
    /// Page URL at capture time
    pub url: String,
    /// Publish order, assigned by [`FrameStore::publish`] (first frame is 1)
    pub seq: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, format: FrameFormat, width: u32, height: u32, url: String) -> Self {
        Self { data, format, width, height, url, seq: 0 }
    }
}

#[derive(Default)]
struct Slot {
    latest: Option<Arc<Frame>>,
    published: u64,
}

/// Latest-frame holder: last write wins, no history.
#[derive(Default)]
pub struct FrameStore {
    slot: Mutex<Slot>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame. Returns the sequence number assigned to it.
    pub fn publish(&self, mut frame: Frame) -> u64 {
        let (seq, previous) = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.published += 1;
            frame.seq = slot.published;
            (slot.published, slot.latest.replace(Arc::new(frame)))
        };
        // Old frame freed here, not under the lock
        drop(previous);
        seq
    }

    /// Most recently published frame, `None` until the first capture.
    pub fn current(&self) -> Option<Arc<Frame>> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .latest
            .clone()
    }

    /// Total number of frames published so far.
    pub fn published(&self) -> u64 {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).published
    }
}
