//! Fixed-depth sample histories.
//!
//! [`SampleWindow`] is the building block every metrics domain stores its
//! raw counters in: a background pass adds one sample per interval and
//! foreground getters turn the history into rates and percentages.

mod counter;
mod sample;
mod sequence;
mod window;


pub use counter::{CounterWindow, Support};
pub use sample::{Sample, Widened};
pub use sequence::FixedCapacitySequence;
pub use window::SampleWindow;
