//! Render loop: the single owner of the rendering surface.
//!
//! Two periodic tasks share this thread:
//! - capture: render, encode, publish to the [`FrameStore`](crate::core::FrameStore)
//! - commands: drain the [`CommandChannel`](crate::core::CommandChannel) and
//!   apply every command in order
//!
//! Both are driven by an [`IntervalScheduler`] and never overlap. Every
//! capture and every command runs inside [`contain`], which turns errors and
//! panics into log lines: nothing that happens inside the surface may take
//! the loop down, since no one would restart it.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, trace, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use super::encode::FrameEncoder;
use super::error::DispatchError;
use super::input::{self, Action};
use super::surface::RenderSurface;
use crate::core::{Bridge, Clock, Command, Frame, FrameFormat, IntervalScheduler, MonotonicClock};

/// Sleep cap when nothing is scheduled
const IDLE_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Capture,
    Commands,
}

/// Timing and encoding parameters of the render loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub capture_interval: Duration,
    pub command_interval: Duration,
    pub format: FrameFormat,
    pub jpeg_quality: u8,
    /// Page loaded by [`RenderLoop::start`]
    pub home_url: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            capture_interval: Duration::from_millis(100),
            command_interval: Duration::from_millis(50),
            format: FrameFormat::Jpeg,
            jpeg_quality: 30,
            home_url: "https://www.google.com".to_string(),
        }
    }
}

pub struct RenderLoop<S, C = MonotonicClock> {
    surface: S,
    bridge: Arc<Bridge>,
    encoder: FrameEncoder,
    scheduler: IntervalScheduler<Task>,
    clock: C,
    home_url: String,
}

impl<S: RenderSurface, C: Clock> RenderLoop<S, C> {
    pub fn new(surface: S, bridge: Arc<Bridge>, config: LoopConfig, clock: C) -> Self {
        let now = clock.now();
        let mut scheduler = IntervalScheduler::new();
        scheduler.every(Task::Capture, config.capture_interval, now);
        scheduler.every(Task::Commands, config.command_interval, now);

        Self {
            surface,
            bridge,
            encoder: FrameEncoder::new(config.format, config.jpeg_quality),
            scheduler,
            clock,
            home_url: config.home_url,
        }
    }

    /// Navigate to the home page.
    pub fn start(&mut self) {
        let target = input::normalize_url(&self.home_url);
        info!("Render loop starting at {}", target);
        contain("home navigation", || self.apply(Action::Load(target)));
    }

    /// Run every task due now. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let due = self.scheduler.due(self.clock.now());
        for task in &due {
            match task {
                Task::Capture => {
                    self.capture();
                }
                Task::Commands => {
                    self.process_commands();
                }
            }
        }
        due.len()
    }

    /// Start, then loop until `shutdown` receives a message or disconnects.
    pub fn run(mut self, shutdown: &Receiver<()>) {
        self.start();
        loop {
            self.run_pending();

            let wait = self
                .scheduler
                .next_deadline()
                .map(|deadline| deadline.saturating_sub(self.clock.now()))
                .unwrap_or(IDLE_WAIT);
            match shutdown.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!(
            "Render loop stopped after {} frames",
            self.bridge.frames.published()
        );
    }

    /// Render, encode and publish one frame. Returns its sequence number.
    pub fn capture(&mut self) -> Option<u64> {
        contain("capture", || {
            let image = self.surface.render()?;
            let (width, height) = image.dimensions();
            let data = self.encoder.encode(image)?;
            let frame = Frame::new(data, self.encoder.format(), width, height, self.surface.url());
            Ok(self.bridge.frames.publish(frame))
        })
    }

    /// Apply every queued command in order. Returns how many were drained.
    pub fn process_commands(&mut self) -> usize {
        let commands = self.bridge.commands.drain_all();
        for command in &commands {
            trace!("Applying {:?}", command);
            contain("command", || self.apply_command(command));
        }
        commands.len()
    }

    /// The owned surface, for inspection.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn apply_command(&mut self, command: &Command) -> Result<(), DispatchError> {
        let action = input::translate(command)?;
        self.apply(action)
    }

    fn apply(&mut self, action: Action) -> Result<(), DispatchError> {
        match action {
            Action::Load(url) => {
                debug!("Navigating to {}", url);
                self.surface.load(&url)?;
            }
            Action::Input(events) => {
                let target = self.surface.focus_target();
                for event in &events {
                    self.surface.dispatch(target, event)?;
                }
            }
        }
        Ok(())
    }
}

/// Single choke point for render-thread failures: errors and panics are
/// logged and swallowed.
fn contain<T>(what: &str, f: impl FnOnce() -> Result<T, DispatchError>) -> Option<T> {
    let result = panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(DispatchError::Panicked(panic_message(payload.as_ref()))));

    match result {
        Ok(value) => Some(value),
        Err(err @ DispatchError::UnsupportedKey(_)) => {
            debug!("Ignoring {}: {}", what, err);
            None
        }
        Err(err) => {
            warn!("{} failed: {}", what, err);
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
