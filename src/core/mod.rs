//! Core bridge between the HTTP side and the render thread.
//!
//! [`Bridge`] is the only state shared across threads: a command queue
//! flowing into the render loop and a frame slot flowing out of it. It is
//! created once at startup and handed to both sides as `Arc<Bridge>`.

pub mod command_channel;
pub mod frame_store;
pub mod scheduler;

pub use command_channel::{Command, CommandChannel};
pub use frame_store::{Frame, FrameFormat, FrameStore};
pub use scheduler::{Clock, IntervalScheduler, MIN_INTERVAL, ManualClock, MonotonicClock};

/// Shared context: commands in, frames out.
#[derive(Default)]
pub struct Bridge {
    pub commands: CommandChannel,
    pub frames: FrameStore,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }
}
