//! # Memory Module
//!
//! Paging rates sampled in the background plus memory and swap sizes
//! refreshed on demand.
//!
//! The system has exactly one memory instance, so [`MemoryInstance`] is
//! both the instance and its own enumeration.

mod constants;
pub mod linux;
mod source;
mod types;


pub use constants::*;
#[cfg(test)]
pub use source::MockMemoryCounterSource;
pub use source::{default_source, MemoryCounterSource, UnsupportedMemorySource};
pub use types::{MemoryStats, PagingCounters};

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, span, trace, Level, Span};

use crate::{
    config::{MetricsDomain, SamplingConfig},
    error::{Error, Result},
    sampler::SampleWindow,
    sampling::{LoopState, PeriodicSamplingLoop},
    traits::Enumeration,
};

#[derive(Debug)]
struct MemoryShared {
    source: Mutex<Box<dyn MemoryCounterSource>>,
    page_reads: SampleWindow<u64>,
    page_writes: SampleWindow<u64>,
    stats: RwLock<MemoryStats>,
}

impl MemoryShared {
    fn sample(&self) -> Result<()> {
        let paging = self.source.lock().paging_since_boot()?;
        trace!(page_reads = paging.page_reads, page_writes = paging.page_writes, "sampled paging counters");
        self.page_reads.add_sample(paging.page_reads);
        self.page_writes.add_sample(paging.page_writes);
        Ok(())
    }

    fn refresh_stats(&self) -> Result<()> {
        let stats = self.source.lock().memory_stats()?;
        *self.stats.write() = stats;
        Ok(())
    }
}

/// System memory: sizes plus page read and write rates.
#[derive(Debug)]
pub struct MemoryInstance {
    config: SamplingConfig,
    shared: Arc<MemoryShared>,
    sampling: PeriodicSamplingLoop,
    span: Span,
}

impl MemoryInstance {
    /// Uses the platform collector and the default memory sampling settings.
    pub fn new() -> Result<Self> {
        Self::with_source(default_source(), SamplingConfig::for_domain(MetricsDomain::Memory))
    }

    pub fn with_source(source: Box<dyn MemoryCounterSource>, config: SamplingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shared: Arc::new(MemoryShared {
                source: Mutex::new(source),
                page_reads: SampleWindow::new(config.depth)?,
                page_writes: SampleWindow::new(config.depth)?,
                stats: RwLock::new(MemoryStats::default()),
            }),
            sampling: PeriodicSamplingLoop::new(MEMORY_SAMPLER_THREAD, config.interval),
            span: span!(Level::INFO, "memory_instance"),
        })
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Runs one paging sampling pass on the calling thread.
    pub fn sample(&self) -> Result<()> {
        let _entered = self.span.enter();
        self.shared.sample()
    }

    pub fn sampling_state(&self) -> LoopState {
        self.sampling.state()
    }

    fn per_second(&self, window: &SampleWindow<u64>) -> Option<u64> {
        let delta = window.get_average_delta(window.depth());
        Some((delta as f64 / self.config.interval_secs()) as u64)
    }

    /// Pages read per second, averaged over the window.
    pub fn page_reads(&self) -> Option<u64> {
        self.per_second(&self.shared.page_reads)
    }

    /// Pages written per second, averaged over the window.
    pub fn page_writes(&self) -> Option<u64> {
        self.per_second(&self.shared.page_writes)
    }

    /// Latest cumulative paging counters.
    pub fn paging_since_boot(&self) -> Option<PagingCounters> {
        Some(PagingCounters {
            page_reads: self.shared.page_reads.latest()?,
            page_writes: self.shared.page_writes.latest()?,
        })
    }

    /// Snapshot of the sizes read by the last `init` or `update`.
    pub fn stats(&self) -> MemoryStats {
        *self.shared.stats.read()
    }

    pub fn total_physical_memory(&self) -> Option<u64> {
        self.stats().total_physical
    }

    pub fn available_memory(&self) -> Option<u64> {
        self.stats().available
    }

    pub fn used_memory(&self) -> Option<u64> {
        self.stats().used()
    }

    pub fn reserved_memory(&self) -> Option<u64> {
        self.stats().reserved
    }

    pub fn total_swap(&self) -> Option<u64> {
        self.stats().total_swap
    }

    pub fn available_swap(&self) -> Option<u64> {
        self.stats().available_swap
    }

    pub fn used_swap(&self) -> Option<u64> {
        self.stats().used_swap()
    }
}

impl Enumeration for MemoryInstance {
    fn init(&mut self) -> Result<()> {
        let _entered = self.span.enter();
        match self.sampling.state() {
            LoopState::Created => {},
            LoopState::Stopped => {
                self.sampling = PeriodicSamplingLoop::new(MEMORY_SAMPLER_THREAD, self.config.interval);
            },
            state => return Err(Error::system(format!("memory instance already initialised ({state:?})"))),
        }

        self.shared.refresh_stats()?;
        self.shared.sample()?;
        debug!("memory instance initialised");

        let shared = Arc::clone(&self.shared);
        self.sampling.start(self.span.clone(), move || shared.sample())
    }

    /// Refreshes memory and swap sizes. There are no instances to
    /// re-discover.
    fn update(&mut self, _update_instances: bool) -> Result<()> {
        let _entered = self.span.enter();
        self.shared.refresh_stats()
    }

    fn clean_up(&mut self) {
        self.sampling.stop();
        debug!(parent: &self.span, "memory instance cleaned up");
    }

    fn is_running(&self) -> bool {
        self.sampling.is_running()
    }
}
