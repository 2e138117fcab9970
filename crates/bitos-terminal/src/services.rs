//! Services injected into command handlers: wall clock and artificial latency.
//!
//! Handlers never read the system clock or sleep directly, so tests can pin
//! the time and skip (or record) every simulated pause.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of wall-clock time and uptime.
pub trait Clock {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Seconds since the simulated machine booted.
    fn uptime_secs(&self) -> u64;
}

/// Real clock; uptime counts from construction.
#[derive(Debug)]
pub struct SystemClock {
    start_time: Instant,
    boot_offset_secs: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            boot_offset_secs: 0,
        }
    }

    /// Pretend the machine booted `secs` seconds before construction.
    pub fn booted_ago(secs: u64) -> Self {
        Self {
            start_time: Instant::now(),
            boot_offset_secs: secs,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn uptime_secs(&self) -> u64 {
        self.boot_offset_secs + self.start_time.elapsed().as_secs()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub uptime_secs: u64,
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn uptime_secs(&self) -> u64 {
        self.uptime_secs
    }
}

// ---------------------------------------------------------------------------
// Latency
// ---------------------------------------------------------------------------

/// Artificial delay used by commands that pretend to talk to a network.
pub trait Latency {
    fn pause(&self, duration: Duration);
}

/// Blocks the calling thread for the (scaled) duration.
#[derive(Debug, Clone, Copy)]
pub struct RealLatency {
    scale: f32,
}

impl RealLatency {
    /// `scale` multiplies every pause; negative or non-finite values are
    /// treated as zero.
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        Self { scale }
    }
}

impl Latency for RealLatency {
    fn pause(&self, duration: Duration) {
        // Out-of-range products skip the pause instead of overflowing.
        let Ok(scaled) = Duration::try_from_secs_f32(duration.as_secs_f32() * self.scale) else {
            return;
        };
        if !scaled.is_zero() {
            std::thread::sleep(scaled);
        }
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

impl Latency for NoLatency {
    fn pause(&self, _duration: Duration) {}
}

/// Records requested pauses without sleeping.
#[derive(Debug, Default)]
pub struct RecordingLatency {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingLatency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested so far, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }

    pub fn total(&self) -> Duration {
        self.pauses.borrow().iter().sum()
    }
}

impl Latency for RecordingLatency {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}
