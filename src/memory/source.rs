use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::types::{MemoryStats, PagingCounters};
use crate::error::{Error, Result};

/// Supplies paging counters and memory sizes to a
/// [`MemoryInstance`](super::MemoryInstance).
#[cfg_attr(test, automock)]
pub trait MemoryCounterSource: Send + Debug {
    /// Cumulative pages read from and written to backing store.
    fn paging_since_boot(&mut self) -> Result<PagingCounters>;

    /// Current memory and swap sizes.
    fn memory_stats(&mut self) -> Result<MemoryStats>;
}

/// Counter source for platforms without a memory collector.
#[derive(Debug, Default)]
pub struct UnsupportedMemorySource;

impl MemoryCounterSource for UnsupportedMemorySource {
    fn paging_since_boot(&mut self) -> Result<PagingCounters> {
        Err(Error::not_available("paging counters are not supported on this platform"))
    }

    fn memory_stats(&mut self) -> Result<MemoryStats> {
        Err(Error::not_available("memory statistics are not supported on this platform"))
    }
}

/// The collector for the target platform.
#[cfg(target_os = "linux")]
pub fn default_source() -> Box<dyn MemoryCounterSource> {
    Box::new(super::linux::ProcMemorySource::new())
}

/// The collector for the target platform.
#[cfg(not(target_os = "linux"))]
pub fn default_source() -> Box<dyn MemoryCounterSource> {
    Box::new(UnsupportedMemorySource)
}
