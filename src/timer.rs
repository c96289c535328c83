//! Per-question countdown.
//!
//! A timer is identified by a [`TimerHandle`], a generation number that grows
//! with every start. Starting a new countdown invalidates all earlier handles,
//! so a consumer can drop any [`TimerEvent`] whose handle is not the one it is
//! currently waiting on.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining` seconds are left.
    Tick { handle: TimerHandle, remaining: u32 },
    /// The countdown reached zero. Always preceded by a tick with `remaining == 0`.
    Expired { handle: TimerHandle },
}

impl TimerEvent {
    pub fn handle(&self) -> TimerHandle {
        match self {
            TimerEvent::Tick { handle, .. } | TimerEvent::Expired { handle } => *handle,
        }
    }
}

/// A source of cancellable countdowns.
///
/// `cancel` must be idempotent: cancelling twice, cancelling a superseded
/// handle or cancelling after expiry does nothing.
pub trait Timer {
    fn start(&mut self, duration_secs: u32) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Countdown backed by a tokio task that reports over an unbounded channel.
///
/// Must be started from inside a tokio runtime.
pub struct Countdown {
    generation: u64,
    active: Option<(TimerHandle, JoinHandle<()>)>,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl Countdown {
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            generation: 0,
            active: None,
            events,
        }
    }

    /// Create a countdown together with the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn active(&self) -> Option<TimerHandle> {
        self.active.as_ref().map(|(handle, _)| *handle)
    }
}

impl Timer for Countdown {
    fn start(&mut self, duration_secs: u32) -> TimerHandle {
        if let Some((previous, task)) = self.active.take() {
            log::debug!("Countdown {} superseded", previous.generation());
            task.abort();
        }

        self.generation += 1;
        let handle = TimerHandle(self.generation);
        let task = tokio::spawn(run_countdown(handle, duration_secs, self.events.clone()));
        self.active = Some((handle, task));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.active() != Some(handle) {
            return;
        }
        if let Some((_, task)) = self.active.take() {
            task.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some((_, task)) = self.active.take() {
            task.abort();
        }
    }
}

async fn run_countdown(
    handle: TimerHandle,
    duration_secs: u32,
    events: mpsc::UnboundedSender<TimerEvent>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    interval.tick().await;

    let mut remaining = duration_secs;
    while remaining > 0 {
        interval.tick().await;
        remaining -= 1;
        if events.send(TimerEvent::Tick { handle, remaining }).is_err() {
            return;
        }
    }

    let _ = events.send(TimerEvent::Expired { handle });
}

/// A countdown driven by the caller instead of a clock.
///
/// [`ManualTimer::advance_secs`] returns the events a real countdown would have
/// delivered over that span, which lets a front end with its own clock (or a
/// test) feed them to the session.
#[derive(Debug, Default)]
pub struct ManualTimer {
    generation: u64,
    running: Option<(TimerHandle, u32)>,
    started: usize,
    cancelled: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<TimerHandle> {
        self.running.map(|(handle, _)| handle)
    }

    pub fn remaining(&self) -> Option<u32> {
        self.running.map(|(_, remaining)| remaining)
    }

    /// Number of countdowns started so far.
    pub fn started(&self) -> usize {
        self.started
    }

    /// Number of cancellations that stopped a running countdown.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    pub fn advance_secs(&mut self, secs: u32) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        for _ in 0..secs {
            let Some((handle, remaining)) = self.running.as_mut() else {
                break;
            };
            *remaining = remaining.saturating_sub(1);
            let (handle, remaining) = (*handle, *remaining);
            events.push(TimerEvent::Tick { handle, remaining });
            if remaining == 0 {
                events.push(TimerEvent::Expired { handle });
                self.running = None;
            }
        }
        events
    }
}

impl Timer for ManualTimer {
    fn start(&mut self, duration_secs: u32) -> TimerHandle {
        self.generation += 1;
        self.started += 1;
        let handle = TimerHandle(self.generation);
        self.running = Some((handle, duration_secs));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.active() == Some(handle) {
            self.running = None;
            self.cancelled += 1;
        }
    }
}
