/// Seconds between two paging samples
pub const MEMORY_SECONDS_PER_SAMPLE: u64 = 60;

/// Paging samples kept per counter
pub const MAX_MEMINSTANCE_SAMPLES: usize = 6;

/// Thread name of the memory sampling loop
pub const MEMORY_SAMPLER_THREAD: &str = "pal-memory-sampler";

/// Paging counters, relative to the proc root
pub const PROC_VMSTAT: &str = "vmstat";

/// Memory sizes, relative to the proc root
pub const PROC_MEMINFO: &str = "meminfo";

pub(crate) const BYTES_PER_KB: u64 = 1024;
