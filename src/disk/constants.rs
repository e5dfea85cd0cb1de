/// Seconds between two disk sampling passes
pub const DISK_SECONDS_PER_SAMPLE: u64 = 60;

/// Counter samples kept per disk
pub const MAX_DISKINSTANCE_SAMPLES: usize = 6;

/// Name of the aggregated statistics over all disks
pub const TOTAL_DISK_NAME: &str = "_Total";

/// Thread names of the disk sampling loops
pub const PHYSICAL_DISK_SAMPLER_THREAD: &str = "pal-physical-disk-sampler";
pub const LOGICAL_DISK_SAMPLER_THREAD: &str = "pal-logical-disk-sampler";

/// `/proc/diskstats` counts sectors of 512 bytes regardless of the device
pub const DISKSTATS_SECTOR_SIZE: u64 = 512;

/// Relative to the proc root
pub const PROC_DISKSTATS: &str = "diskstats";
pub const PROC_MOUNTS: &str = "mounts";

/// Relative to the sysfs root
pub const SYS_BLOCK: &str = "block";

/// Block devices that never back a physical disk
pub const VIRTUAL_BLOCK_PREFIXES: &[&str] = &["loop", "ram", "zram", "fd"];

pub(crate) const MS_PER_SECOND: f64 = 1000.0;
