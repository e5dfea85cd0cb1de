use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{trace, warn};

use super::{
    constants::PROC_STAT,
    source::CpuCounterSource,
    types::{CpuSelector, CpuTicks},
};
use crate::error::{Error, Result};

/// Reads CPU ticks from `/proc/stat`.
///
/// Lines look like `cpu3 user nice system idle [iowait irq softirq ...]`.
/// Kernels older than 2.6 stop after `idle`; those counters are then
/// reported as absent.
#[derive(Debug)]
pub struct ProcStatSource {
    root: PathBuf,
    snapshot: HashMap<CpuSelector, CpuTicks>,
}

impl ProcStatSource {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Reads from `<root>/stat` instead of `/proc/stat`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), snapshot: HashMap::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self) -> Result<HashMap<CpuSelector, CpuTicks>> {
        let content = fs::read_to_string(self.root.join(PROC_STAT))?;
        Ok(parse_proc_stat(&content))
    }
}

impl Default for ProcStatSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCounterSource for ProcStatSource {
    fn online_processors(&mut self) -> Result<Vec<u32>> {
        let mut ids: Vec<u32> = self
            .read()?
            .into_keys()
            .filter_map(|selector| match selector {
                CpuSelector::Processor(id) => Some(id),
                CpuSelector::Total => None,
            })
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn refresh(&mut self) -> Result<()> {
        self.snapshot = self.read()?;
        trace!(rows = self.snapshot.len(), "refreshed /proc/stat snapshot");
        Ok(())
    }

    fn read_ticks(&mut self, selector: CpuSelector) -> Result<CpuTicks> {
        self.snapshot
            .get(&selector)
            .copied()
            .ok_or_else(|| Error::not_available(format!("no /proc/stat row for {selector:?}")))
    }
}

/// Parses every `cpu` row of `/proc/stat`. Malformed rows are skipped.
pub fn parse_proc_stat(content: &str) -> HashMap<CpuSelector, CpuTicks> {
    let mut rows = HashMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(name) = parts.first().and_then(|p| p.strip_prefix("cpu")) else {
            continue;
        };

        let selector = if name.is_empty() {
            CpuSelector::Total
        } else {
            match name.parse() {
                Ok(id) => CpuSelector::Processor(id),
                Err(_) => continue,
            }
        };

        if parts.len() < 5 {
            warn!(columns = parts.len(), row = parts[0], "too few columns in /proc/stat row");
            continue;
        }

        let values: Option<Vec<u64>> = parts[1..].iter().map(|s| s.parse().ok()).collect();
        let Some(values) = values else {
            warn!(line, "could not parse /proc/stat row");
            continue;
        };

        let extended = values.len() >= 7;
        let field = |idx: usize| if extended { values.get(idx).copied() } else { None };

        rows.insert(
            selector,
            CpuTicks {
                user: values[0],
                nice: Some(values[1]),
                system: values[2],
                idle: values[3],
                iowait: field(4),
                irq: field(5),
                softirq: field(6),
                queue_length: None,
            },
        );
    }

    rows
}
