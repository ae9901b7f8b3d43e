//! Many-producer, single-consumer command queue.
//!
//! HTTP handlers push [`Command`]s from any thread. The render loop takes
//! everything queued once per tick with [`CommandChannel::drain_all`].
//!
//! Capacity is unbounded: producers never wait on a slow render loop.
//! Enqueue and drain share one mutex, so both are linearizable and the
//! drain order is exactly the order in which enqueues completed.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Remote action queued for the render loop.
///
/// Created by a request handler, consumed exactly once by the render loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a page. The URL is normalized by the input mapper, not here.
    Navigate { url: String },
    /// Left click at surface-local pixel coordinates
    Click { x: i32, y: i32 },
    /// Press + release of a single key token ("a", "Enter", ...)
    KeyInput { key: String },
}

/// Thread-safe FIFO of pending [`Command`]s.
#[derive(Debug, Default)]
pub struct CommandChannel {
    queue: Mutex<VecDeque<Command>>,
}

impl CommandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the tail. Never blocks beyond the queue lock.
    pub fn enqueue(&self, command: Command) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(command);
    }

    /// Remove and return every queued command, oldest first.
    ///
    /// Returns an empty `Vec` when nothing is queued.
    pub fn drain_all(&self) -> Vec<Command> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.drain(..).collect()
    }

    /// Number of commands waiting for the next drain.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
