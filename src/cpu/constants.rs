/// Seconds between two CPU sampling passes
pub const CPU_SECONDS_PER_SAMPLE: u64 = 60;

/// Tick samples kept per CPU counter
pub const MAX_CPUINSTANCE_SAMPLES: usize = 6;

/// Name of the instance aggregating all processors
pub const TOTAL_INSTANCE_NAME: &str = "_Total";

/// Thread name of the CPU sampling loop
pub const CPU_SAMPLER_THREAD: &str = "pal-cpu-sampler";

/// Kernel statistics file, relative to the proc root
pub const PROC_STAT: &str = "stat";
