use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::types::{DiskCounters, DiskDevice, DiskKind, DiskSpace};
use crate::error::{Error, Result};

/// Supplies disk devices and their I/O counters to a
/// [`StatisticalDiskEnumeration`](super::StatisticalDiskEnumeration).
#[cfg_attr(test, automock)]
pub trait DiskCounterSource: Send + Debug {
    /// Disks currently present.
    fn discover(&mut self) -> Result<Vec<DiskDevice>>;

    /// Takes a fresh snapshot of the counters. Called once per pass before
    /// any `read_counters`.
    fn refresh(&mut self) -> Result<()>;

    /// Counters of one disk from the latest snapshot.
    fn read_counters(&mut self, device: &DiskDevice) -> Result<DiskCounters>;

    /// Filesystem capacity, or `None` for disks without a mounted
    /// filesystem.
    fn space(&mut self, device: &DiskDevice) -> Result<Option<DiskSpace>>;
}

/// Counter source for platforms without a disk collector.
#[derive(Debug, Default)]
pub struct UnsupportedDiskSource;

impl DiskCounterSource for UnsupportedDiskSource {
    fn discover(&mut self) -> Result<Vec<DiskDevice>> {
        Err(Error::not_available("disk counters are not supported on this platform"))
    }

    fn refresh(&mut self) -> Result<()> {
        Err(Error::not_available("disk counters are not supported on this platform"))
    }

    fn read_counters(&mut self, _device: &DiskDevice) -> Result<DiskCounters> {
        Err(Error::not_available("disk counters are not supported on this platform"))
    }

    fn space(&mut self, _device: &DiskDevice) -> Result<Option<DiskSpace>> {
        Err(Error::not_available("disk space is not supported on this platform"))
    }
}

/// The collector of `kind` for the target platform.
#[cfg(target_os = "linux")]
pub fn default_source(kind: DiskKind) -> Box<dyn DiskCounterSource> {
    Box::new(super::linux::ProcDiskSource::new(kind))
}

/// The collector of `kind` for the target platform.
#[cfg(not(target_os = "linux"))]
pub fn default_source(_kind: DiskKind) -> Box<dyn DiskCounterSource> {
    Box::new(UnsupportedDiskSource)
}
