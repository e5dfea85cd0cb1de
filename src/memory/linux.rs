use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::warn;

use super::{
    constants::{BYTES_PER_KB, PROC_MEMINFO, PROC_VMSTAT},
    source::MemoryCounterSource,
    types::{MemoryStats, PagingCounters},
};
use crate::error::{Error, Result};

/// Raw `/proc/meminfo` fields in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: Option<u64>,
    pub mem_free: Option<u64>,
    pub mem_available: Option<u64>,
    pub buffers: Option<u64>,
    pub cached: Option<u64>,
    pub swap_total: Option<u64>,
    pub swap_free: Option<u64>,
}

impl MemInfo {
    /// Converts to bytes. Available memory is `MemAvailable` on kernels
    /// that report it (3.14+), otherwise `MemFree + Buffers + Cached`.
    pub fn to_stats(&self) -> MemoryStats {
        let bytes = |kb: Option<u64>| kb.map(|v| v.saturating_mul(BYTES_PER_KB));

        let available = self.mem_available.or_else(|| {
            self.mem_free.map(|free| free + self.buffers.unwrap_or(0) + self.cached.unwrap_or(0))
        });

        MemoryStats {
            total_physical: bytes(self.mem_total),
            available: bytes(available),
            reserved: None,
            total_swap: bytes(self.swap_total),
            available_swap: bytes(self.swap_free),
        }
    }
}

/// Parses `/proc/meminfo`. Unparsable values are logged and left absent.
pub fn parse_meminfo(content: &str) -> MemInfo {
    let mut info = MemInfo::default();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };

        let slot = match key {
            "MemTotal:" => &mut info.mem_total,
            "MemFree:" => &mut info.mem_free,
            "MemAvailable:" => &mut info.mem_available,
            "Buffers:" => &mut info.buffers,
            "Cached:" => &mut info.cached,
            "SwapTotal:" => &mut info.swap_total,
            "SwapFree:" => &mut info.swap_free,
            _ => continue,
        };

        match raw.parse() {
            Ok(kb) => *slot = Some(kb),
            Err(_) => warn!(line, "could not parse /proc/meminfo value"),
        }
    }

    info
}

/// Extracts `pgpgin` and `pgpgout` from `/proc/vmstat`.
pub fn parse_vmstat(content: &str) -> Result<PagingCounters> {
    let mut page_reads = None;
    let mut page_writes = None;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };
        match key {
            "pgpgin" => page_reads = raw.parse().ok(),
            "pgpgout" => page_writes = raw.parse().ok(),
            _ => {},
        }
    }

    match (page_reads, page_writes) {
        (Some(page_reads), Some(page_writes)) => Ok(PagingCounters { page_reads, page_writes }),
        _ => Err(Error::invalid_data("pgpgin/pgpgout missing from /proc/vmstat")),
    }
}

/// Reads paging counters from `/proc/vmstat` and sizes from `/proc/meminfo`.
#[derive(Debug)]
pub struct ProcMemorySource {
    root: PathBuf,
}

impl ProcMemorySource {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for ProcMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCounterSource for ProcMemorySource {
    fn paging_since_boot(&mut self) -> Result<PagingCounters> {
        parse_vmstat(&fs::read_to_string(self.root.join(PROC_VMSTAT))?)
    }

    fn memory_stats(&mut self) -> Result<MemoryStats> {
        Ok(parse_meminfo(&fs::read_to_string(self.root.join(PROC_MEMINFO))?).to_stats())
    }
}
