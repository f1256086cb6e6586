//! A frame loop the host drives.
//!
//! The engine never spins its own timer. The host calls the controller once per animation frame
//! while [`FrameLoop::needs_frame`] is true; that single entry point runs work deferred from event
//! handlers and ticks the particle trail. Swapping the host's frame source (a terminal poll
//! timeout, a vsync callback, a fixed timer) does not touch the particle logic.

use std::time::Duration;
use std::time::Instant;

/// Work postponed to the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameTask {
    /// Turn caret transitions back on after a focus snap.
    EnableTransition,
    /// Re-read the caret position once the host has applied a key press.
    Recompute,
}

#[derive(Clone, Debug, Default)]
pub struct FrameLoop {
    running: bool,
    burst_until: Option<Instant>,
    tasks: Vec<FrameTask>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the trail loop. Starting a running loop does nothing.
    pub fn start(&mut self) {
        if !self.running {
            tracing::trace!("frame loop started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::trace!("frame loop stopped");
        }
        self.running = false;
        self.burst_until = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Keeps the loop alive for at least `window` from `now`.
    pub fn arm_burst(&mut self, now: Instant, window: Duration) {
        self.burst_until = Some(now + window);
    }

    pub fn burst_active(&self, now: Instant) -> bool {
        self.burst_until.is_some_and(|until| now < until)
    }

    pub fn defer(&mut self, task: FrameTask) {
        if !self.tasks.contains(&task) {
            self.tasks.push(task);
        }
    }

    pub fn pending(&self) -> &[FrameTask] {
        &self.tasks
    }

    pub fn take_tasks(&mut self) -> Vec<FrameTask> {
        std::mem::take(&mut self.tasks)
    }

    pub fn cancel_tasks(&mut self) {
        self.tasks.clear();
    }

    /// Whether the host should schedule another frame.
    pub fn needs_frame(&self) -> bool {
        self.running || !self.tasks.is_empty()
    }
}
