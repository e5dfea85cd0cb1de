use serde::{Deserialize, Serialize};

/// Which processor a tick reading refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuSelector {
    /// All processors combined
    Total,
    /// One logical processor by id
    Processor(u32),
}

/// Cumulative CPU tick counters since boot for one processor.
///
/// `user`, `system` and `idle` exist on every platform. The remaining
/// counters are `None` where the kernel does not report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTicks {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub nice: Option<u64>,
    pub iowait: Option<u64>,
    pub irq: Option<u64>,
    pub softirq: Option<u64>,
    /// Run queue length; a gauge, not a tick counter
    pub queue_length: Option<u64>,
}

impl CpuTicks {
    pub fn new(user: u64, system: u64, idle: u64) -> Self {
        Self { user, system, idle, ..Default::default() }
    }

    /// Sum of all tick counters present. The queue length is not a tick
    /// counter and is excluded.
    pub fn total(&self) -> u64 {
        [self.nice, self.iowait, self.irq, self.softirq]
            .into_iter()
            .flatten()
            .fold(self.user.wrapping_add(self.system).wrapping_add(self.idle), u64::wrapping_add)
    }
}
