use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::types::{CpuSelector, CpuTicks};
use crate::error::{Error, Result};

/// Supplies raw CPU tick counters to a [`CpuEnumeration`](super::CpuEnumeration).
///
/// Only called from the enumeration's own methods and its sampling thread,
/// never concurrently.
#[cfg_attr(test, automock)]
pub trait CpuCounterSource: Send + Debug {
    /// Ids of the processors currently online.
    fn online_processors(&mut self) -> Result<Vec<u32>>;

    /// Takes a fresh snapshot of the counters. Called once per pass before
    /// any `read_ticks`.
    fn refresh(&mut self) -> Result<()>;

    /// Tick counters of one processor from the latest snapshot.
    fn read_ticks(&mut self, selector: CpuSelector) -> Result<CpuTicks>;
}

/// Counter source for platforms without a CPU collector.
#[derive(Debug, Default)]
pub struct UnsupportedCpuSource;

impl CpuCounterSource for UnsupportedCpuSource {
    fn online_processors(&mut self) -> Result<Vec<u32>> {
        Err(Error::not_available("CPU counters are not supported on this platform"))
    }

    fn refresh(&mut self) -> Result<()> {
        Err(Error::not_available("CPU counters are not supported on this platform"))
    }

    fn read_ticks(&mut self, _selector: CpuSelector) -> Result<CpuTicks> {
        Err(Error::not_available("CPU counters are not supported on this platform"))
    }
}

/// The collector for the target platform.
#[cfg(target_os = "linux")]
pub fn default_source() -> Box<dyn CpuCounterSource> {
    Box::new(super::linux::ProcStatSource::new())
}

/// The collector for the target platform.
#[cfg(not(target_os = "linux"))]
pub fn default_source() -> Box<dyn CpuCounterSource> {
    Box::new(UnsupportedCpuSource)
}
