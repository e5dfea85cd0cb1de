use parking_lot::Mutex;

use super::{sample::Sample, sequence::FixedCapacitySequence};
use crate::error::{Error, Result};

/// Thread-safe history of one metric's samples with windowed statistics.
///
/// The window keeps at most `depth` samples, newest first. Every operation
/// takes the window's own lock, so a sampling thread can add samples while
/// foreground callers query the same window.
///
/// Statistical queries never fail: with fewer than two samples there is no
/// delta and the type's default value (zero) is returned instead.
///
/// # Examples
///
/// ```rust
/// use pal_metrics::sampler::SampleWindow;
///
/// let window = SampleWindow::<u64>::new(6).unwrap();
/// for ticks in [100, 110, 125] {
///     window.add_sample(ticks);
/// }
///
/// assert_eq!(window.get_delta(6), 25);
/// assert_eq!(window.get_average_delta(6), 12);
/// ```
#[derive(Debug)]
pub struct SampleWindow<T: Sample> {
    samples: Mutex<FixedCapacitySequence<T>>,
    depth: usize,
}

impl<T: Sample> SampleWindow<T> {
    /// Creates an empty window holding at most `depth` samples.
    pub fn new(depth: usize) -> Result<Self> {
        Ok(Self { samples: Mutex::new(FixedCapacitySequence::new(depth)?), depth })
    }

    /// Maximum number of samples kept.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Adds a new sample, evicting the oldest one when the window is full.
    pub fn add_sample(&self, sample: T) {
        let mut samples = self.samples.lock();
        if samples.is_full() {
            samples.pop_back();
        }
        samples.push_front(sample);
    }

    /// Checks whether the newest sample is smaller than the one `lookback`
    /// positions back (clamped to the available history).
    ///
    /// Used to detect counters that rolled over between samples.
    pub fn has_wrapped(&self, lookback: usize) -> bool {
        let samples = self.samples.lock();
        if samples.len() < 2 {
            return false;
        }
        let index = lookback.clamp(1, samples.len()) - 1;
        samples[0] < samples[index]
    }

    /// Arithmetic mean of all stored samples, computed in `V`.
    ///
    /// Integer result types truncate. Returns zero for an empty window.
    pub fn get_average<V: Sample>(&self) -> V {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return V::default();
        }
        let sum = samples.iter().fold(V::default().widen(), |acc, s| acc.add(s.cast::<V>().widen()));
        V::narrow(sum.div_count(samples.len()))
    }

    /// Change between the newest sample and the one `lookback` positions back.
    ///
    /// A `lookback` larger than the history uses the oldest sample. Returns
    /// zero when `lookback < 2` or fewer than two samples exist. No
    /// wraparound correction is applied.
    pub fn get_delta(&self, lookback: usize) -> T {
        let samples = self.samples.lock();
        if lookback < 2 || samples.len() < 2 {
            return T::default();
        }
        let index = lookback.min(samples.len()) - 1;
        samples[0].diff(samples[index])
    }

    /// Average change per sampling interval over the last `lookback` samples.
    pub fn get_average_delta(&self, lookback: usize) -> T {
        self.get_average_delta_factored(lookback, T::from_count(1))
    }

    /// Average change per interval, multiplied by `factor` before the
    /// division so integer averages keep precision.
    ///
    /// Returns zero when `lookback < 2`, fewer than two samples exist or
    /// `factor` is zero.
    pub fn get_average_delta_factored(&self, lookback: usize, factor: T) -> T {
        let samples = self.samples.lock();
        if lookback < 2 || samples.len() < 2 || factor.is_zero() {
            return T::default();
        }
        let index = lookback.min(samples.len()) - 1;
        let scaled = samples[0].diff(samples[index]).scale(factor);
        T::narrow(scaled.widen().div_count(index))
    }

    /// Sample at `index` (0 is the newest).
    pub fn get(&self, index: usize) -> Result<T> {
        let samples = self.samples.lock();
        samples.get(index).ok_or(Error::IllegalIndex { index, size: samples.len() })
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<T> {
        self.samples.lock().get(0)
    }

    /// Removes all samples.
    pub fn clear(&self) {
        self.samples.lock().clear();
    }

    pub fn get_number_of_samples(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn len(&self) -> usize {
        self.get_number_of_samples()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current samples, newest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.samples.lock().as_slice().to_vec()
    }
}

impl<T: Sample> Clone for SampleWindow<T> {
    fn clone(&self) -> Self {
        Self { samples: Mutex::new(self.samples.lock().clone()), depth: self.depth }
    }
}
