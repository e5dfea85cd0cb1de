//! # Disk Module
//!
//! I/O rates and capacity of physical disks and mounted filesystems.
//!
//! A [`StatisticalDiskEnumeration`] tracks either whole block devices or
//! logical (mounted) disks. Every interval its sampling thread appends one
//! counter sample per disk; a disk that cannot be read is skipped for that
//! pass while the others are still sampled.
//!
//! ```rust,no_run
//! use pal_metrics::{disk::StatisticalDiskEnumeration, traits::Enumeration};
//!
//! let mut disks = StatisticalDiskEnumeration::logical()?;
//! disks.init()?;
//! for disk in disks.instances() {
//!     println!("{}: {:?} MB used/free", disk.name(), disk.disk_size());
//! }
//! disks.clean_up();
//! # Ok::<(), pal_metrics::Error>(())
//! ```

mod constants;
mod instance;
pub mod linux;
mod source;
mod types;


pub use constants::*;
pub use instance::StatisticalDiskInstance;
#[cfg(test)]
pub use source::MockDiskCounterSource;
pub use source::{default_source, DiskCounterSource, UnsupportedDiskSource};
pub use types::{DiskCounters, DiskDevice, DiskKind, DiskSpace, DiskStatistics, LastMetrics};

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, span, trace, warn, Level, Span};

use crate::{
    config::{MetricsDomain, SamplingConfig},
    error::{Error, Result},
    sampling::{LoopState, PeriodicSamplingLoop},
    traits::Enumeration,
};

#[derive(Debug)]
struct DiskShared {
    source: Mutex<Box<dyn DiskCounterSource>>,
    instances: RwLock<Vec<Arc<StatisticalDiskInstance>>>,
    config: SamplingConfig,
}

impl DiskShared {
    /// Syncs the instance list with the disks present now. Disks that went
    /// away are marked offline and dropped.
    fn update_instances(&self) -> Result<()> {
        let present = self.source.lock().discover()?;

        let mut instances = self.instances.write();
        instances.retain(|inst| {
            let keep = present.iter().any(|d| d == inst.device());
            if !keep {
                info!(disk = inst.name(), "disk removed");
                inst.set_online(false);
            }
            keep
        });

        for device in present {
            if !instances.iter().any(|inst| inst.device() == &device) {
                debug!(disk = %device.name, id = %device.id, "adding disk instance");
                instances.push(Arc::new(StatisticalDiskInstance::new(
                    device,
                    self.config.depth,
                    self.config.interval_secs(),
                )?));
            }
        }
        drop(instances);

        self.refresh_space();
        Ok(())
    }

    fn refresh_space(&self) {
        let mut source = self.source.lock();
        for inst in self.instances.read().iter() {
            match source.space(inst.device()) {
                Ok(space) => inst.set_space(space),
                Err(e) => warn!(disk = inst.name(), error = %e, "could not read disk space"),
            }
        }
    }

    /// One sampling pass over every disk. A failing disk is logged and
    /// skipped; the pass continues with the next one.
    fn sample(&self) -> Result<()> {
        let mut source = self.source.lock();
        source.refresh()?;

        for inst in self.instances.read().iter() {
            match source.read_counters(inst.device()) {
                Ok(counters) => {
                    trace!(disk = inst.name(), reads = counters.reads, writes = counters.writes, "sampled counters");
                    inst.add_counters(&counters);
                },
                Err(e) => warn!(disk = inst.name(), error = %e, "skipping disk this pass"),
            }
        }
        Ok(())
    }
}

/// Physical or logical disks and their sampling thread.
#[derive(Debug)]
pub struct StatisticalDiskEnumeration {
    kind: DiskKind,
    config: SamplingConfig,
    shared: Arc<DiskShared>,
    sampling: PeriodicSamplingLoop,
    span: Span,
}

impl StatisticalDiskEnumeration {
    /// Whole block devices, read through the platform collector.
    pub fn physical() -> Result<Self> {
        Self::with_source(
            DiskKind::Physical,
            default_source(DiskKind::Physical),
            SamplingConfig::for_domain(MetricsDomain::Disk),
        )
    }

    /// Mounted filesystems, read through the platform collector.
    pub fn logical() -> Result<Self> {
        Self::with_source(
            DiskKind::Logical,
            default_source(DiskKind::Logical),
            SamplingConfig::for_domain(MetricsDomain::Disk),
        )
    }

    pub fn with_source(kind: DiskKind, source: Box<dyn DiskCounterSource>, config: SamplingConfig) -> Result<Self> {
        config.validate()?;
        let thread_name = match kind {
            DiskKind::Physical => PHYSICAL_DISK_SAMPLER_THREAD,
            DiskKind::Logical => LOGICAL_DISK_SAMPLER_THREAD,
        };
        Ok(Self {
            kind,
            config,
            shared: Arc::new(DiskShared {
                source: Mutex::new(source),
                instances: RwLock::new(Vec::new()),
                config,
            }),
            sampling: PeriodicSamplingLoop::new(thread_name, config.interval),
            span: span!(Level::INFO, "disk_enumeration", kind = ?kind),
        })
    }

    /// Replaces the span the sampling thread logs under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn kind(&self) -> DiskKind {
        self.kind
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn instances(&self) -> Vec<Arc<StatisticalDiskInstance>> {
        self.shared.instances.read().clone()
    }

    /// Looks a disk up by instance name (device name or mount point).
    pub fn find(&self, name: &str) -> Option<Arc<StatisticalDiskInstance>> {
        self.shared.instances.read().iter().find(|inst| inst.name() == name).cloned()
    }

    /// Looks a disk up by device node, given as `/dev/sda` or `sda`.
    pub fn find_by_device(&self, device: &str) -> Option<Arc<StatisticalDiskInstance>> {
        let id = device.rsplit('/').next().unwrap_or(device);
        self.shared.instances.read().iter().find(|inst| inst.device_id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Statistics of all disks combined.
    ///
    /// Rates and sizes are summed. Seconds per operation are computed from
    /// the summed window deltas, so busy disks weigh more than idle ones.
    pub fn total(&self) -> DiskStatistics {
        let mut total = DiskStatistics { name: TOTAL_DISK_NAME.to_string(), ..Default::default() };
        let (mut reads, mut writes, mut read_ms, mut write_ms) = (0u64, 0u64, 0u64, 0u64);

        for inst in self.shared.instances.read().iter() {
            let stats = inst.statistics();
            total.reads_per_second = total.reads_per_second.saturating_add(stats.reads_per_second);
            total.writes_per_second = total.writes_per_second.saturating_add(stats.writes_per_second);
            total.transfers_per_second = total.transfers_per_second.saturating_add(stats.transfers_per_second);
            total.read_bytes_per_second = total.read_bytes_per_second.saturating_add(stats.read_bytes_per_second);
            total.write_bytes_per_second = total.write_bytes_per_second.saturating_add(stats.write_bytes_per_second);
            total.bytes_per_second_total = total.bytes_per_second_total.saturating_add(stats.bytes_per_second_total);
            total.mb_used = total.mb_used.saturating_add(stats.mb_used);
            total.mb_free = total.mb_free.saturating_add(stats.mb_free);

            // Wrapped counters contribute zero deltas
            let deltas = inst.deltas();
            reads = reads.saturating_add(deltas.reads);
            writes = writes.saturating_add(deltas.writes);
            read_ms = read_ms.saturating_add(deltas.read_ms);
            write_ms = write_ms.saturating_add(deltas.write_ms);
        }

        let per_op = |ms: u64, ops: u64| if ops == 0 { 0.0 } else { ms as f64 / ops as f64 / MS_PER_SECOND };
        total.seconds_per_read = per_op(read_ms, reads);
        total.seconds_per_write = per_op(write_ms, writes);
        total.seconds_per_transfer = per_op(read_ms.saturating_add(write_ms), reads.saturating_add(writes));
        total
    }

    /// Runs one sampling pass on the calling thread.
    pub fn sample(&self) -> Result<()> {
        let _entered = self.span.enter();
        self.shared.sample()
    }

    pub fn sampling_state(&self) -> LoopState {
        self.sampling.state()
    }

    /// Completed passes of the sampling thread.
    pub fn sampling_passes(&self) -> u64 {
        self.sampling.passes()
    }
}

impl Enumeration for StatisticalDiskEnumeration {
    fn init(&mut self) -> Result<()> {
        let _entered = self.span.enter();
        match self.sampling.state() {
            LoopState::Created => {},
            LoopState::Stopped => {
                self.sampling = PeriodicSamplingLoop::new(self.sampling.name().to_string(), self.config.interval);
            },
            state => return Err(Error::system(format!("disk enumeration already initialised ({state:?})"))),
        }

        self.shared.update_instances()?;
        self.shared.sample()?;
        debug!(disks = self.len(), "disk enumeration initialised");

        let shared = Arc::clone(&self.shared);
        self.sampling.start(self.span.clone(), move || shared.sample())
    }

    /// Rediscovers disks when `update_instances` is set, otherwise only
    /// refreshes filesystem capacity.
    fn update(&mut self, update_instances: bool) -> Result<()> {
        let _entered = self.span.enter();
        if update_instances {
            self.shared.update_instances()
        } else {
            self.shared.refresh_space();
            Ok(())
        }
    }

    fn clean_up(&mut self) {
        self.sampling.stop();
        for inst in self.shared.instances.write().drain(..) {
            inst.set_online(false);
        }
        debug!(parent: &self.span, "disk enumeration cleaned up");
    }

    fn is_running(&self) -> bool {
        self.sampling.is_running()
    }
}
