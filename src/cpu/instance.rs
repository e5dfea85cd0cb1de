use super::{constants::TOTAL_INSTANCE_NAME, types::CpuTicks};
use crate::{
    error::Result,
    sampler::{CounterWindow, SampleWindow},
    utils::percentage,
};

/// Tick history of one logical processor, or of all processors combined.
///
/// Percentages are computed over the whole window: the change of one
/// counter between the oldest and the newest sample relative to the change
/// of the total tick count. They are whole numbers in `0..=100`.
#[derive(Debug)]
pub struct CpuInstance {
    proc_number: u32,
    proc_name: String,
    is_total: bool,
    user: SampleWindow<u64>,
    system: SampleWindow<u64>,
    idle: SampleWindow<u64>,
    total: SampleWindow<u64>,
    nice: CounterWindow<u64>,
    iowait: CounterWindow<u64>,
    irq: CounterWindow<u64>,
    softirq: CounterWindow<u64>,
    queue_length: CounterWindow<u64>,
}

impl CpuInstance {
    pub fn new(proc_number: u32, depth: usize, is_total: bool) -> Result<Self> {
        let proc_name = if is_total { TOTAL_INSTANCE_NAME.to_string() } else { proc_number.to_string() };
        Ok(Self {
            proc_number,
            proc_name,
            is_total,
            user: SampleWindow::new(depth)?,
            system: SampleWindow::new(depth)?,
            idle: SampleWindow::new(depth)?,
            total: SampleWindow::new(depth)?,
            nice: CounterWindow::new(depth)?,
            iowait: CounterWindow::new(depth)?,
            irq: CounterWindow::new(depth)?,
            softirq: CounterWindow::new(depth)?,
            queue_length: CounterWindow::new(depth)?,
        })
    }

    /// Processor id; 0 for the total instance.
    pub fn proc_number(&self) -> u32 {
        self.proc_number
    }

    /// The processor id as text, or `_Total`.
    pub fn proc_name(&self) -> &str {
        &self.proc_name
    }

    pub fn is_total(&self) -> bool {
        self.is_total
    }

    pub(crate) fn add_ticks(&self, ticks: &CpuTicks) {
        self.user.add_sample(ticks.user);
        self.system.add_sample(ticks.system);
        self.idle.add_sample(ticks.idle);

        // The total uses the stored values so a missed counter does not dip it
        let optional = [
            self.nice.record(ticks.nice),
            self.iowait.record(ticks.iowait),
            self.irq.record(ticks.irq),
            self.softirq.record(ticks.softirq),
        ];
        let required = ticks.user.wrapping_add(ticks.system).wrapping_add(ticks.idle);
        self.total.add_sample(optional.into_iter().flatten().fold(required, u64::wrapping_add));
        self.queue_length.record(ticks.queue_length);
    }

    fn share(&self, window: &SampleWindow<u64>, inverse: bool) -> u64 {
        let depth = self.total.depth();
        percentage(window.get_delta(depth), self.total.get_delta(depth), inverse)
    }

    fn optional_share(&self, counter: &CounterWindow<u64>) -> Option<u64> {
        counter.is_supported().then(|| self.share(counter, false))
    }

    /// Busy time: everything except idle.
    pub fn processor_time(&self) -> Option<u64> {
        Some(self.share(&self.idle, true))
    }

    pub fn idle_time(&self) -> Option<u64> {
        Some(self.share(&self.idle, false))
    }

    pub fn user_time(&self) -> Option<u64> {
        Some(self.share(&self.user, false))
    }

    pub fn nice_time(&self) -> Option<u64> {
        self.optional_share(&self.nice)
    }

    /// Time spent in kernel mode.
    pub fn privileged_time(&self) -> Option<u64> {
        Some(self.share(&self.system, false))
    }

    pub fn iowait_time(&self) -> Option<u64> {
        self.optional_share(&self.iowait)
    }

    /// Time servicing hardware interrupts.
    pub fn interrupt_time(&self) -> Option<u64> {
        self.optional_share(&self.irq)
    }

    /// Time servicing deferred procedure calls (softirqs on Linux).
    pub fn dpc_time(&self) -> Option<u64> {
        self.optional_share(&self.softirq)
    }

    /// Latest run queue length.
    pub fn queue_length(&self) -> Option<u64> {
        if self.queue_length.is_supported() {
            self.queue_length.latest()
        } else {
            None
        }
    }

    pub fn user_last_tick(&self) -> u64 {
        self.user.latest().unwrap_or(0)
    }

    pub fn nice_last_tick(&self) -> u64 {
        self.nice.latest().unwrap_or(0)
    }

    pub fn system_last_tick(&self) -> u64 {
        self.system.latest().unwrap_or(0)
    }

    pub fn idle_last_tick(&self) -> u64 {
        self.idle.latest().unwrap_or(0)
    }

    pub fn iowait_last_tick(&self) -> u64 {
        self.iowait.latest().unwrap_or(0)
    }

    pub fn irq_last_tick(&self) -> u64 {
        self.irq.latest().unwrap_or(0)
    }

    pub fn softirq_last_tick(&self) -> u64 {
        self.softirq.latest().unwrap_or(0)
    }

    pub fn total_last_tick(&self) -> u64 {
        self.total.latest().unwrap_or(0)
    }

    /// Number of tick samples collected so far.
    pub fn samples(&self) -> usize {
        self.total.len()
    }
}
