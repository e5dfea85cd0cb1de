//! Scripted counter sources driven by a shared pass counter.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;

use pal_metrics::{
    cpu::{CpuCounterSource, CpuSelector, CpuTicks},
    disk::{DiskCounterSource, DiskCounters, DiskDevice, DiskSpace},
    memory::{MemoryCounterSource, MemoryStats, PagingCounters},
    Error, Result,
};

/// Every refresh adds 30 user, 10 system and 60 idle ticks per processor.
#[derive(Debug, Clone, Default)]
pub struct FakeCpuSource {
    pub online: Arc<Mutex<Vec<u32>>>,
    pub passes: Arc<AtomicU64>,
}

impl FakeCpuSource {
    pub fn new(online: &[u32]) -> Self {
        Self { online: Arc::new(Mutex::new(online.to_vec())), passes: Arc::default() }
    }
}

impl CpuCounterSource for FakeCpuSource {
    fn online_processors(&mut self) -> Result<Vec<u32>> {
        Ok(self.online.lock().clone())
    }

    fn refresh(&mut self) -> Result<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_ticks(&mut self, selector: CpuSelector) -> Result<CpuTicks> {
        let pass = self.passes.load(Ordering::SeqCst);
        let scale = match selector {
            CpuSelector::Total => self.online.lock().len() as u64,
            CpuSelector::Processor(_) => 1,
        };
        Ok(CpuTicks::new(pass * 30 * scale, pass * 10 * scale, pass * 60 * scale))
    }
}

/// Paging grows by 120 pages read and 60 written per refresh.
#[derive(Debug, Clone, Default)]
pub struct FakeMemorySource {
    pub passes: Arc<AtomicU64>,
    pub stats: MemoryStats,
}

impl FakeMemorySource {
    pub fn new(stats: MemoryStats) -> Self {
        Self { passes: Arc::default(), stats }
    }
}

impl MemoryCounterSource for FakeMemorySource {
    fn paging_since_boot(&mut self) -> Result<PagingCounters> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PagingCounters { page_reads: pass * 120, page_writes: pass * 60 })
    }

    fn memory_stats(&mut self) -> Result<MemoryStats> {
        Ok(self.stats)
    }
}

/// Disks whose counters grow by 100 reads and 50 writes per refresh.
/// Reads of the disks in `failing` return an error.
#[derive(Debug, Clone, Default)]
pub struct FakeDiskSource {
    pub disks: Arc<Mutex<Vec<DiskDevice>>>,
    pub failing: Arc<Mutex<HashSet<String>>>,
    pub passes: Arc<AtomicU64>,
    pub reads: Arc<AtomicU64>,
}

impl FakeDiskSource {
    pub fn new(disks: Vec<DiskDevice>) -> Self {
        Self { disks: Arc::new(Mutex::new(disks)), ..Default::default() }
    }

    pub fn fail(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }
}

impl DiskCounterSource for FakeDiskSource {
    fn discover(&mut self) -> Result<Vec<DiskDevice>> {
        Ok(self.disks.lock().clone())
    }

    fn refresh(&mut self) -> Result<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_counters(&mut self, device: &DiskDevice) -> Result<DiskCounters> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(&device.id) {
            return Err(Error::NotAvailable(format!("{} stopped responding", device.id)));
        }
        let pass = self.passes.load(Ordering::SeqCst);
        Ok(DiskCounters {
            reads: pass * 100,
            writes: pass * 50,
            read_bytes: pass * 100 * 512,
            write_bytes: pass * 50 * 512,
            read_ms: Some(pass * 100),
            write_ms: Some(pass * 100),
            queue_length: Some(1),
        })
    }

    fn space(&mut self, device: &DiskDevice) -> Result<Option<DiskSpace>> {
        Ok(device.mount_point.as_ref().map(|_| DiskSpace {
            mb_used: 250,
            mb_free: 750,
            block_size: 4096,
            inodes_total: 65_536,
            inodes_free: 60_000,
        }))
    }
}
