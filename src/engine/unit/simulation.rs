use crate::net::Snapshot;
use crate::render::{DrawBatch, SurfaceSize};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Per-module behaviour plugged into the generic
/// [`SimulationUnit`](crate::engine::unit::SimulationUnit).
///
/// The unit owns the entity list; a simulation only turns it into aggregates,
/// draw instructions and a statistics line. Aggregates that survive across
/// ticks (for example a running mean) live in the simulation itself.
pub trait Simulation: Send + 'static {
    type Entity: DeserializeOwned + Send + Sync + 'static;

    /// Parses the `data` array of a snapshot. An error makes the whole tick a
    /// failed fetch.
    fn parse_entities(&self, data: Vec<Value>) -> Result<Vec<Self::Entity>, serde_json::Error> {
        serde_json::from_value(Value::Array(data))
    }

    /// Recomputes derived aggregates after a successful fetch.
    fn aggregate(&mut self, _entities: &[Self::Entity]) {}

    /// Called on `init`, before the first tick.
    fn reset(&mut self) {}

    /// Appends the frame's instructions to `batch`, which already holds `clear`.
    fn draw(&self, entities: &[Self::Entity], size: SurfaceSize, batch: &mut DrawBatch);

    /// Display-ready statistics line.
    fn stats(&self, entities: &[Self::Entity], snapshot: &Snapshot) -> String;
}

/// Arithmetic mean of `f` over `items`, `0.0` when there are none.
pub fn mean<T>(items: &[T], f: impl Fn(&T) -> f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().map(f).sum::<f64>() / items.len() as f64
}

/// Rounds to the nearest integer, halves towards positive infinity
/// (`-2.5` becomes `-2`).
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}
