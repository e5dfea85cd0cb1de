//! # CPU Module
//!
//! Per-processor tick histories and the percentages derived from them.
//!
//! A [`CpuEnumeration`] owns one [`CpuInstance`] per online processor plus
//! a total instance, and a background thread that adds one tick sample to
//! every instance per interval.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pal_metrics::{cpu::CpuEnumeration, traits::Enumeration};
//!
//! let mut cpus = CpuEnumeration::new()?;
//! cpus.init()?;
//!
//! // One interval later the window holds two samples
//! if let Some(busy) = cpus.total().processor_time() {
//!     println!("CPU busy: {busy}%");
//! }
//! cpus.clean_up();
//! # Ok::<(), pal_metrics::Error>(())
//! ```

mod constants;
mod instance;
pub mod linux;
mod source;
mod types;


pub use constants::*;
pub use instance::CpuInstance;
#[cfg(test)]
pub use source::MockCpuCounterSource;
pub use source::{default_source, CpuCounterSource, UnsupportedCpuSource};
pub use types::{CpuSelector, CpuTicks};

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, span, trace, warn, Level, Span};

use crate::{
    config::{MetricsDomain, SamplingConfig},
    error::{Error, Result},
    sampling::{LoopState, PeriodicSamplingLoop},
    traits::Enumeration,
};

#[derive(Debug)]
struct CpuShared {
    source: Mutex<Box<dyn CpuCounterSource>>,
    total: Arc<CpuInstance>,
    instances: RwLock<Vec<Arc<CpuInstance>>>,
    depth: usize,
}

impl CpuShared {
    /// Adds instances for newly online processors and drops the ones that
    /// went offline.
    fn update_instances(&self) -> Result<()> {
        let online = self.source.lock().online_processors()?;

        let mut instances = self.instances.write();
        instances.retain(|inst| {
            let keep = online.contains(&inst.proc_number());
            if !keep {
                debug!(cpu = inst.proc_number(), "processor went offline, removing instance");
            }
            keep
        });

        for id in online {
            if !instances.iter().any(|inst| inst.proc_number() == id) {
                debug!(cpu = id, "adding processor instance");
                instances.push(Arc::new(CpuInstance::new(id, self.depth, false)?));
            }
        }
        instances.sort_by_key(|inst| inst.proc_number());
        Ok(())
    }

    /// One sampling pass: the total first, then every processor. A
    /// processor that cannot be read is skipped for this pass only.
    fn sample(&self) -> Result<()> {
        let mut source = self.source.lock();
        source.refresh()?;

        match source.read_ticks(CpuSelector::Total) {
            Ok(ticks) => self.total.add_ticks(&ticks),
            Err(e) => warn!(error = %e, "could not read total CPU ticks"),
        }

        for inst in self.instances.read().iter() {
            match source.read_ticks(CpuSelector::Processor(inst.proc_number())) {
                Ok(ticks) => {
                    trace!(cpu = inst.proc_number(), user = ticks.user, idle = ticks.idle, "sampled ticks");
                    inst.add_ticks(&ticks);
                },
                Err(e) => warn!(cpu = inst.proc_number(), error = %e, "skipping processor this pass"),
            }
        }
        Ok(())
    }
}

/// All online processors and their sampling thread.
#[derive(Debug)]
pub struct CpuEnumeration {
    config: SamplingConfig,
    shared: Arc<CpuShared>,
    sampling: PeriodicSamplingLoop,
    span: Span,
}

impl CpuEnumeration {
    /// Uses the platform collector and the default CPU sampling settings.
    pub fn new() -> Result<Self> {
        Self::with_source(default_source(), SamplingConfig::for_domain(MetricsDomain::Cpu))
    }

    pub fn with_source(source: Box<dyn CpuCounterSource>, config: SamplingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shared: Arc::new(CpuShared {
                source: Mutex::new(source),
                total: Arc::new(CpuInstance::new(0, config.depth, true)?),
                instances: RwLock::new(Vec::new()),
                depth: config.depth,
            }),
            sampling: PeriodicSamplingLoop::new(CPU_SAMPLER_THREAD, config.interval),
            span: span!(Level::INFO, "cpu_enumeration"),
        })
    }

    /// Replaces the span the sampling thread logs under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// The instance aggregating all processors.
    pub fn total(&self) -> Arc<CpuInstance> {
        Arc::clone(&self.shared.total)
    }

    /// Per-processor instances ordered by processor id.
    pub fn instances(&self) -> Vec<Arc<CpuInstance>> {
        self.shared.instances.read().clone()
    }

    pub fn find(&self, proc_number: u32) -> Option<Arc<CpuInstance>> {
        self.shared.instances.read().iter().find(|inst| inst.proc_number() == proc_number).cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of logical processors currently online.
    pub fn processor_count_logical(&self) -> Result<usize> {
        Ok(self.shared.source.lock().online_processors()?.len())
    }

    /// Runs one sampling pass on the calling thread.
    pub fn sample(&self) -> Result<()> {
        let _entered = self.span.enter();
        self.shared.sample()
    }

    pub fn sampling_state(&self) -> LoopState {
        self.sampling.state()
    }
}

impl Enumeration for CpuEnumeration {
    fn init(&mut self) -> Result<()> {
        let _entered = self.span.enter();
        match self.sampling.state() {
            LoopState::Created => {},
            LoopState::Stopped => self.sampling = PeriodicSamplingLoop::new(CPU_SAMPLER_THREAD, self.config.interval),
            state => return Err(Error::system(format!("CPU enumeration already initialised ({state:?})"))),
        }

        self.shared.update_instances()?;
        self.shared.sample()?;
        debug!(processors = self.len(), "CPU enumeration initialised");

        let shared = Arc::clone(&self.shared);
        self.sampling.start(self.span.clone(), move || shared.sample())
    }

    fn update(&mut self, update_instances: bool) -> Result<()> {
        if update_instances {
            let _entered = self.span.enter();
            self.shared.update_instances()?;
        }
        Ok(())
    }

    fn clean_up(&mut self) {
        self.sampling.stop();
        self.shared.instances.write().clear();
        debug!(parent: &self.span, "CPU enumeration cleaned up");
    }

    fn is_running(&self) -> bool {
        self.sampling.is_running()
    }
}
