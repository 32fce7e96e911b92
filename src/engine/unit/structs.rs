use crate::engine::events::{UnitCommand, UnitEvent};
use crate::net::DataSource;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A unique identifier for one simulation unit.
///
/// Every `start` of a module spawns a fresh unit with a fresh id, so an id
/// also tells a restarted unit apart from the one it replaced. Treat it as an
/// opaque handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(Uuid);

impl UnitId {
    /// Create a new unique `UnitId` using a random UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a unit.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// Spawned, waiting for `init`.
    #[default]
    Idle,
    /// `init` received, private state being reset.
    Initializing,
    /// Fetch cycle active.
    Running,
    /// `stop` received. Terminal.
    Stopped,
}

/// Arguments required to spawn a new unit task.
pub struct UnitSpawnArgs {
    /// Unit id
    pub unit_id: UnitId,
    /// Module name, used as the data endpoint suffix
    pub module: String,
    /// Where snapshots are fetched from
    pub source: Arc<dyn DataSource>,
    /// Receive channel for commands for the unit
    pub cmd_rx: mpsc::Receiver<UnitCommand>,
    /// Send channel for draw batches and statistics
    pub event_tx: mpsc::Sender<UnitEvent>,
    /// Delay between the end of one tick and the start of the next
    pub tick_interval: Duration,
}

impl fmt::Debug for UnitSpawnArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitSpawnArgs")
            .field("unit_id", &self.unit_id)
            .field("module", &self.module)
            .field("source", &"Arc<dyn DataSource>")
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}
