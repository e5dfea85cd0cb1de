//! PAL Metrics - sampled system metrics for Unix monitoring agents
//!
//! Counters such as CPU ticks, pages swapped or sectors read only become
//! meaningful as rates. This crate keeps a short history of every counter
//! in a fixed-depth [`SampleWindow`](sampler::SampleWindow) and fills it
//! from a background [`PeriodicSamplingLoop`](sampling::PeriodicSamplingLoop),
//! so readers get averages and per-second rates without blocking on the
//! platform.
//!
//! # Features
//!
//! - **CPU Metrics**: busy, idle, user, privileged and interrupt percentages
//!   per processor and for the whole system
//! - **Memory Metrics**: paging rates plus physical memory and swap sizes
//! - **Disk Metrics**: I/O rates, time per operation and capacity of
//!   physical disks and mounted filesystems
//!
//! # Examples
//!
//! ```rust,no_run
//! use pal_metrics::prelude::*;
//!
//! fn main() -> Result<()> {
//!     pal_metrics::logging::init();
//!
//!     let mut cpus = CpuEnumeration::new()?;
//!     let mut memory = MemoryInstance::new()?;
//!     cpus.init()?;
//!     memory.init()?;
//!
//!     println!("CPU busy: {:?}%", cpus.total().processor_time());
//!     println!("Memory used: {:?} MB", memory.used_memory());
//!
//!     cpus.clean_up();
//!     memory.clean_up();
//!     Ok(())
//! }
//! ```
//!
//! # Thread Safety
//!
//! Windows serialise access internally, so instances are shared as
//! `Arc`s between the sampling thread and any number of readers. Dropping
//! an enumeration stops and joins its sampling thread.

pub mod config;
mod error;
pub mod logging;
pub mod sampler;
pub mod sampling;
pub mod traits;
mod utils;

#[cfg(feature = "cpu")]
pub mod cpu;
#[cfg(feature = "disk")]
pub mod disk;
#[cfg(feature = "memory")]
pub mod memory;

pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::config::{MetricsDomain, SamplingConfig};
    #[cfg(feature = "cpu")]
    pub use crate::cpu::{CpuEnumeration, CpuInstance};
    #[cfg(feature = "disk")]
    pub use crate::disk::{DiskKind, DiskStatistics, StatisticalDiskEnumeration, StatisticalDiskInstance};
    #[cfg(feature = "memory")]
    pub use crate::memory::MemoryInstance;
    pub use crate::sampler::{FixedCapacitySequence, SampleWindow};
    pub use crate::sampling::{LoopState, PeriodicSamplingLoop};
    pub use crate::traits::Enumeration;
    pub use crate::{Error, Result};
}
