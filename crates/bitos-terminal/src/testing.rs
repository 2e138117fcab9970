//! Test fixtures shared by the command modules.

use bitos_types::config::TerminalConfig;
use bitos_vfs::{CurrentDir, VirtualFileSystem};
use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::interpreter::Environment;
use crate::services::{FixedClock, NoLatency, RecordingLatency};
use crate::shell::Shell;

/// 2024-03-01 12:30:00 UTC, up 3h25m.
pub(crate) fn fixed_clock() -> FixedClock {
    FixedClock {
        now: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        uptime_secs: 3 * 3_600 + 25 * 60,
    }
}

/// Seeded shell on a frozen clock with no pauses.
pub(crate) fn shell() -> Shell {
    let config = TerminalConfig {
        seed: Some(42),
        ..TerminalConfig::default()
    };
    Shell::with_services(&config, Box::new(fixed_clock()), Box::new(NoLatency))
}

/// Owned pieces of an [`Environment`] for driving a registry directly.
pub(crate) struct Fixture {
    pub vfs: VirtualFileSystem,
    pub cwd: CurrentDir,
    pub history: Vec<String>,
    pub clock: FixedClock,
    pub latency: RecordingLatency,
    pub rng: StdRng,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            vfs: VirtualFileSystem::seeded(),
            cwd: CurrentDir::home(),
            history: Vec::new(),
            clock: fixed_clock(),
            latency: RecordingLatency::new(),
            rng: StdRng::seed_from_u64(7),
        }
    }

    pub fn env(&mut self) -> Environment<'_> {
        Environment {
            cwd: &mut self.cwd,
            vfs: &mut self.vfs,
            history: &self.history,
            clock: &self.clock,
            latency: &self.latency,
            rng: &mut self.rng,
            hostname: "bitos",
            user: "user",
            program: String::new(),
        }
    }
}
