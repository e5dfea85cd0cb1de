use std::{
    ops::Deref,
    sync::atomic::{AtomicU8, Ordering},
};

use super::{sample::Sample, window::SampleWindow};
use crate::error::Result;

const UNKNOWN: u8 = 0;
const SUPPORTED: u8 = 1;
const UNSUPPORTED: u8 = 2;

/// Whether a platform supplies a given counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// No sample has been offered yet
    Unknown,
    /// The platform delivered at least one value
    Supported,
    /// The platform reported the counter as absent; it is never retried
    Unsupported,
}

/// A [`SampleWindow`] that also tracks whether its counter exists at all.
///
/// The first offered value decides: a value marks the counter supported, an
/// absent value marks it unsupported for the lifetime of the window. After
/// that, absent values are transient misses that repeat the last sample.
#[derive(Debug)]
pub struct CounterWindow<T: Sample> {
    window: SampleWindow<T>,
    support: AtomicU8,
}

impl<T: Sample> CounterWindow<T> {
    pub fn new(depth: usize) -> Result<Self> {
        Ok(Self { window: SampleWindow::new(depth)?, support: AtomicU8::new(UNKNOWN) })
    }

    /// Offers one pass's reading and returns the value stored for it.
    ///
    /// A transient miss stores the previous value again so the window stays
    /// aligned with its sibling windows. Returns `None` when nothing was
    /// stored.
    pub fn record(&self, value: Option<T>) -> Option<T> {
        if self.support.load(Ordering::Acquire) == UNSUPPORTED {
            return None;
        }
        match value {
            Some(v) => {
                self.support.store(SUPPORTED, Ordering::Release);
                self.window.add_sample(v);
                Some(v)
            },
            None => {
                if self.support.compare_exchange(UNKNOWN, UNSUPPORTED, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                    return None;
                }
                let last = self.window.latest()?;
                self.window.add_sample(last);
                Some(last)
            },
        }
    }

    pub fn support(&self) -> Support {
        match self.support.load(Ordering::Acquire) {
            SUPPORTED => Support::Supported,
            UNSUPPORTED => Support::Unsupported,
            _ => Support::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.support() == Support::Supported
    }

    pub fn window(&self) -> &SampleWindow<T> {
        &self.window
    }
}

impl<T: Sample> Deref for CounterWindow<T> {
    type Target = SampleWindow<T>;

    fn deref(&self) -> &SampleWindow<T> {
        &self.window
    }
}
