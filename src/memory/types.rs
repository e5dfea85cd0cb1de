use serde::{Deserialize, Serialize};

/// Pages paged in and out since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingCounters {
    pub page_reads: u64,
    pub page_writes: u64,
}

/// Memory and swap sizes in bytes. A field is `None` when the platform does
/// not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_physical: Option<u64>,
    pub available: Option<u64>,
    pub reserved: Option<u64>,
    pub total_swap: Option<u64>,
    pub available_swap: Option<u64>,
}

impl MemoryStats {
    pub fn used(&self) -> Option<u64> {
        Some(self.total_physical?.saturating_sub(self.available?))
    }

    pub fn used_swap(&self) -> Option<u64> {
        Some(self.total_swap?.saturating_sub(self.available_swap?))
    }
}
