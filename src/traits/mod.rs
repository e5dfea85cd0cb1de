// Traits module
//
// Lifecycle shared by every metrics enumeration. The per-domain counter
// source traits live next to the domain that consumes them.

use crate::error::Result;

/// A collection of sampled resources refreshed by one background thread.
///
/// Lifecycle: construct, [`init`](Enumeration::init) once, query getters
/// while the sampling loop runs, [`clean_up`](Enumeration::clean_up) when
/// done. Dropping an enumeration cleans it up as well.
pub trait Enumeration {
    /// Discovers instances, takes the first sample synchronously and starts
    /// the sampling loop.
    fn init(&mut self) -> Result<()>;

    /// Re-discovers instances when `update_instances` is set: new resources
    /// are added and vanished ones removed. Otherwise a no-op beyond
    /// refreshing slow-changing values such as filesystem space.
    fn update(&mut self, update_instances: bool) -> Result<()>;

    /// Stops and joins the sampling loop, then releases all instances.
    fn clean_up(&mut self);

    /// Whether the sampling loop is currently running.
    fn is_running(&self) -> bool;
}
