#![allow(dead_code)]

pub mod mocks;

use std::time::{Duration, Instant};

use pal_metrics::config::SamplingConfig;

pub use mocks::{FakeCpuSource, FakeDiskSource, FakeMemorySource};

/// Interval long enough that the sampling thread never fires during a test.
pub const IDLE_INTERVAL: Duration = Duration::from_secs(3600);

pub fn config(interval: Duration) -> SamplingConfig {
    SamplingConfig::new(interval, 6).expect("valid test config")
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
