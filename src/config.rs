use std::{env, fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound for any window depth
pub const MAX_SAMPLE_DEPTH: usize = 1024;

/// Seconds between samples unless configured otherwise
pub const DEFAULT_SAMPLE_SECS: u64 = 60;

/// Samples kept per counter unless configured otherwise
pub const DEFAULT_SAMPLE_DEPTH: usize = 6;

/// The metrics domains that own a sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsDomain {
    Cpu,
    Memory,
    Disk,
}

impl MetricsDomain {
    fn env_prefix(self) -> &'static str {
        match self {
            MetricsDomain::Cpu => "PAL_CPU",
            MetricsDomain::Memory => "PAL_MEMORY",
            MetricsDomain::Disk => "PAL_DISK",
        }
    }
}

impl fmt::Display for MetricsDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricsDomain::Cpu => "cpu",
            MetricsDomain::Memory => "memory",
            MetricsDomain::Disk => "disk",
        };
        f.write_str(name)
    }
}

/// Sampling interval and window depth for one metrics domain.
///
/// Both values are fixed once an enumeration is constructed. Rates are
/// computed as the average delta over the window divided by the interval,
/// so changing either one changes the smoothing of every reported rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Time between two sampling passes
    pub interval: Duration,
    /// Number of samples kept per counter
    pub depth: usize,
}

impl SamplingConfig {
    pub fn new(interval: Duration, depth: usize) -> Result<Self> {
        let config = Self { interval, depth };
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults for `domain`, taken from the domain's own
    /// constants. Domains compiled out fall back to the crate defaults.
    #[allow(unreachable_patterns)]
    pub fn for_domain(domain: MetricsDomain) -> Self {
        let (secs, depth) = match domain {
            #[cfg(feature = "cpu")]
            MetricsDomain::Cpu => (crate::cpu::CPU_SECONDS_PER_SAMPLE, crate::cpu::MAX_CPUINSTANCE_SAMPLES),
            #[cfg(feature = "memory")]
            MetricsDomain::Memory => (crate::memory::MEMORY_SECONDS_PER_SAMPLE, crate::memory::MAX_MEMINSTANCE_SAMPLES),
            #[cfg(feature = "disk")]
            MetricsDomain::Disk => (crate::disk::DISK_SECONDS_PER_SAMPLE, crate::disk::MAX_DISKINSTANCE_SAMPLES),
            _ => (DEFAULT_SAMPLE_SECS, DEFAULT_SAMPLE_DEPTH),
        };
        Self { interval: Duration::from_secs(secs), depth }
    }

    /// Defaults for `domain`, overridden by `PAL_<DOMAIN>_SAMPLE_SECS` and
    /// `PAL_<DOMAIN>_SAMPLE_DEPTH` when set.
    pub fn from_env(domain: MetricsDomain) -> Result<Self> {
        let mut config = Self::for_domain(domain);
        let prefix = domain.env_prefix();

        if let Some(secs) = read_var::<u64>(&format!("{prefix}_SAMPLE_SECS"))? {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(depth) = read_var::<usize>(&format!("{prefix}_SAMPLE_DEPTH"))? {
            config.depth = depth;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::invalid_config("sampling interval must be non-zero"));
        }
        if !(2..=MAX_SAMPLE_DEPTH).contains(&self.depth) {
            return Err(Error::invalid_config(format!(
                "sample depth {} outside 2..={MAX_SAMPLE_DEPTH}",
                self.depth
            )));
        }
        Ok(())
    }

    /// Interval in seconds as used for per-second rates.
    pub fn interval_secs(&self) -> f64 {
        self.interval.as_secs_f64()
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::for_domain(MetricsDomain::Cpu)
    }
}

fn read_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_config(format!("{name}: cannot parse '{raw}'"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(Error::invalid_config(format!("{name}: not valid unicode"))),
    }
}
