use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::{
    constants::MS_PER_SECOND,
    types::{DiskCounters, DiskDevice, DiskSpace, DiskStatistics, LastMetrics},
};
use crate::{
    error::Result,
    sampler::{CounterWindow, SampleWindow},
};

/// Raw window deltas of one disk, summed up for the total.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DiskDeltas {
    pub reads: u64,
    pub writes: u64,
    pub read_ms: u64,
    pub write_ms: u64,
}

/// I/O counter history and filesystem capacity of one disk.
///
/// Rates are average deltas over the window divided by the sampling
/// interval. Seconds per operation fall back to 0 when the time counter
/// wrapped inside the window or no operation completed.
#[derive(Debug)]
pub struct StatisticalDiskInstance {
    device: DiskDevice,
    interval_secs: f64,
    online: AtomicBool,
    reads: SampleWindow<u64>,
    writes: SampleWindow<u64>,
    transfers: SampleWindow<u64>,
    read_bytes: SampleWindow<u64>,
    write_bytes: SampleWindow<u64>,
    total_bytes: SampleWindow<u64>,
    read_ms: CounterWindow<u64>,
    write_ms: CounterWindow<u64>,
    queue_length: CounterWindow<u64>,
    space: RwLock<Option<DiskSpace>>,
}

impl StatisticalDiskInstance {
    pub fn new(device: DiskDevice, depth: usize, interval_secs: f64) -> Result<Self> {
        Ok(Self {
            device,
            interval_secs,
            online: AtomicBool::new(true),
            reads: SampleWindow::new(depth)?,
            writes: SampleWindow::new(depth)?,
            transfers: SampleWindow::new(depth)?,
            read_bytes: SampleWindow::new(depth)?,
            write_bytes: SampleWindow::new(depth)?,
            total_bytes: SampleWindow::new(depth)?,
            read_ms: CounterWindow::new(depth)?,
            write_ms: CounterWindow::new(depth)?,
            queue_length: CounterWindow::new(depth)?,
            space: RwLock::new(None),
        })
    }

    pub fn device(&self) -> &DiskDevice {
        &self.device
    }

    /// Device node file name, e.g. `sda`.
    pub fn device_id(&self) -> &str {
        self.device.device_id()
    }

    pub fn name(&self) -> &str {
        &self.device.name
    }

    pub fn fs_type(&self) -> Option<&str> {
        self.device.fs_type.as_deref()
    }

    /// `false` once the disk has disappeared from the system.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    pub(crate) fn set_space(&self, space: Option<DiskSpace>) {
        *self.space.write() = space;
    }

    pub(crate) fn add_counters(&self, counters: &DiskCounters) {
        self.reads.add_sample(counters.reads);
        self.writes.add_sample(counters.writes);
        self.transfers.add_sample(counters.reads.wrapping_add(counters.writes));
        self.read_bytes.add_sample(counters.read_bytes);
        self.write_bytes.add_sample(counters.write_bytes);
        self.total_bytes.add_sample(counters.read_bytes.wrapping_add(counters.write_bytes));
        self.read_ms.record(counters.read_ms);
        self.write_ms.record(counters.write_ms);
        self.queue_length.record(counters.queue_length);
    }

    /// Number of counter samples collected so far.
    pub fn samples(&self) -> usize {
        self.reads.len()
    }

    fn per_second(&self, window: &SampleWindow<u64>) -> u64 {
        (window.get_average_delta(window.depth()) as f64 / self.interval_secs) as u64
    }

    fn delta(window: &SampleWindow<u64>) -> u64 {
        window.get_delta(window.depth())
    }

    fn seconds_per_op(time: &CounterWindow<u64>, ops: &SampleWindow<u64>) -> f64 {
        let depth = ops.depth();
        let op_delta = ops.get_delta(depth);
        if time.has_wrapped(depth) || ops.has_wrapped(depth) || op_delta == 0 {
            return 0.0;
        }
        time.get_delta(depth) as f64 / op_delta as f64 / MS_PER_SECOND
    }

    pub fn reads_per_second(&self) -> Option<u64> {
        Some(self.per_second(&self.reads))
    }

    pub fn writes_per_second(&self) -> Option<u64> {
        Some(self.per_second(&self.writes))
    }

    pub fn transfers_per_second(&self) -> Option<u64> {
        Some(self.per_second(&self.transfers))
    }

    /// Bytes read and written per second.
    pub fn bytes_per_second(&self) -> Option<(u64, u64)> {
        Some((self.per_second(&self.read_bytes), self.per_second(&self.write_bytes)))
    }

    pub fn bytes_per_second_total(&self) -> Option<u64> {
        Some(self.per_second(&self.total_bytes))
    }

    /// Seconds per read and per write operation.
    pub fn io_times(&self) -> Option<(f64, f64)> {
        if !self.read_ms.is_supported() || !self.write_ms.is_supported() {
            return None;
        }
        Some((Self::seconds_per_op(&self.read_ms, &self.reads), Self::seconds_per_op(&self.write_ms, &self.writes)))
    }

    /// Seconds per transfer, reads and writes combined.
    pub fn io_times_total(&self) -> Option<f64> {
        if !self.read_ms.is_supported() || !self.write_ms.is_supported() {
            return None;
        }
        let deltas = self.deltas();
        let ops = deltas.reads.saturating_add(deltas.writes);
        if ops == 0 {
            return Some(0.0);
        }
        let ms = deltas.read_ms.saturating_add(deltas.write_ms);
        Some(ms as f64 / ops as f64 / MS_PER_SECOND)
    }

    /// Average number of I/Os in flight over the window.
    pub fn disk_queue_length(&self) -> Option<f64> {
        self.queue_length.is_supported().then(|| self.queue_length.get_average::<f64>())
    }

    /// Share of time spent reading and writing. Not reported on Linux.
    pub fn io_percentage(&self) -> Option<(u64, u64)> {
        None
    }

    /// Share of time spent on I/O. Not reported on Linux.
    pub fn io_percentage_total(&self) -> Option<u64> {
        None
    }

    /// Megabytes used and free on the mounted filesystem.
    pub fn disk_size(&self) -> Option<(u64, u64)> {
        self.space.read().map(|s| (s.mb_used, s.mb_free))
    }

    /// Total and free inodes; `None` for filesystems without inodes.
    pub fn inode_usage(&self) -> Option<(u64, u64)> {
        self.space.read().filter(|s| s.inodes_total != 0).map(|s| (s.inodes_total, s.inodes_free))
    }

    pub fn block_size(&self) -> Option<u64> {
        self.space.read().map(|s| s.block_size)
    }

    /// Newest raw counter values.
    pub fn last_metrics(&self) -> Option<LastMetrics> {
        Some(LastMetrics {
            reads: self.reads.latest()?,
            writes: self.writes.latest()?,
            read_bytes: self.read_bytes.latest()?,
            write_bytes: self.write_bytes.latest()?,
            read_ms: self.read_ms.latest()?,
            write_ms: self.write_ms.latest()?,
        })
    }

    /// Operation and time deltas over the window. A direction whose
    /// operation or time counter wrapped contributes nothing.
    pub(crate) fn deltas(&self) -> DiskDeltas {
        let depth = self.reads.depth();
        let direction = |ops: &SampleWindow<u64>, time: &CounterWindow<u64>| {
            if ops.has_wrapped(depth) || time.has_wrapped(depth) {
                (0, 0)
            } else {
                (Self::delta(ops), time.get_delta(depth))
            }
        };
        let (reads, read_ms) = direction(&self.reads, &self.read_ms);
        let (writes, write_ms) = direction(&self.writes, &self.write_ms);
        DiskDeltas { reads, writes, read_ms, write_ms }
    }

    /// Snapshot of every rate of this disk.
    pub fn statistics(&self) -> DiskStatistics {
        let (seconds_per_read, seconds_per_write) = self.io_times().unwrap_or_default();
        let (mb_used, mb_free) = self.disk_size().unwrap_or_default();
        DiskStatistics {
            name: self.name().to_string(),
            reads_per_second: self.per_second(&self.reads),
            writes_per_second: self.per_second(&self.writes),
            transfers_per_second: self.per_second(&self.transfers),
            read_bytes_per_second: self.per_second(&self.read_bytes),
            write_bytes_per_second: self.per_second(&self.write_bytes),
            bytes_per_second_total: self.per_second(&self.total_bytes),
            seconds_per_read,
            seconds_per_write,
            seconds_per_transfer: self.io_times_total().unwrap_or_default(),
            mb_used,
            mb_free,
        }
    }
}
