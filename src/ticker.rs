//! Periodic invokers for the frame loop when no display drives it.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::controller::Player;
use crate::error::Error;
use crate::session::FrameOutput;

pub trait TickSource {
    /// Blocks until the next frame is due. `None` ends the loop.
    fn next_tick(&mut self) -> Option<Instant>;
}

/// Ticks at a fixed interval on the calling thread.
///
/// If a frame runs late the schedule restarts from that frame instead of
/// firing the missed ones in a burst.
pub struct IntervalTicker {
    interval: Duration,
    next: Option<Instant>,
    remaining: Option<u64>,
    shutdown: Arc<AtomicBool>,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
            remaining: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop after `frames` ticks.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }

    /// Setting the returned flag ends the loop at the next tick.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }
}

impl TickSource for IntervalTicker {
    fn next_tick(&mut self) -> Option<Instant> {
        if self.shutdown.load(Ordering::Relaxed) {
            return None;
        }

        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }

        let now = Instant::now();
        let due = self.next.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }

        let now = Instant::now();
        self.next = Some(if now > due + self.interval {
            now + self.interval
        } else {
            due + self.interval
        });

        Some(now)
    }
}

/// A fixed amount of ticks with synthetic timestamps and no sleeping.
pub struct ManualTicks {
    now: Instant,
    step: Duration,
    remaining: u64,
}

impl ManualTicks {
    pub fn new(frames: u64, step: Duration) -> Self {
        Self {
            now: Instant::now(),
            step,
            remaining: frames,
        }
    }
}

impl TickSource for ManualTicks {
    fn next_tick(&mut self) -> Option<Instant> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let tick = self.now;
        self.now += self.step;
        Some(tick)
    }
}

/// Runs the player's frame loop until the ticks run out or the player is
/// stopped. Returns the amount of processed frames.
pub fn drive<T, F>(player: &mut Player, ticks: &mut T, mut on_frame: F) -> Result<u64, Error>
where
    T: TickSource + ?Sized,
    F: FnMut(&FrameOutput),
{
    let mut frames = 0;

    while let Some(now) = ticks.next_tick() {
        let Some(output) = player.tick(now)? else {
            break;
        };

        on_frame(&output);
        frames += 1;
    }

    Ok(frames)
}
