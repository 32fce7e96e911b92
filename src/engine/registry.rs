use crate::engine::events::UnitCommand;
use crate::engine::unit::UnitId;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Orchestrator-side handle of a live unit.
pub(crate) struct ActiveUnit {
    pub id: UnitId,
    /// Command sender for the unit
    pub cmd_tx: mpsc::Sender<UnitCommand>,
    /// Task running the unit
    pub join: JoinHandle<()>,
    /// Closes the unit's event stream in the orchestrator inbox
    pub closed: CancellationToken,
}

impl ActiveUnit {
    /// Best-effort `stop`, then unconditional termination. Does not wait for
    /// the unit to acknowledge anything.
    pub fn terminate(self) {
        if let Err(e) = self.cmd_tx.try_send(UnitCommand::Stop) {
            log::trace!("Unit[{}]: stop not delivered: {}", self.id, e);
        }
        self.closed.cancel();
        self.join.abort();
    }
}

/// Active units keyed by module name. At most one unit per module.
#[derive(Default)]
pub(crate) struct UnitRegistry {
    units: HashMap<String, ActiveUnit>,
}

impl UnitRegistry {
    /// Binds `unit` to `module`, returning the unit it replaces.
    pub fn insert(&mut self, module: &str, unit: ActiveUnit) -> Option<ActiveUnit> {
        self.units.insert(module.to_string(), unit)
    }

    pub fn remove(&mut self, module: &str) -> Option<ActiveUnit> {
        self.units.remove(module)
    }

    /// Whether `unit` is the unit currently bound to `module`.
    pub fn is_current(&self, module: &str, unit: UnitId) -> bool {
        self.units.get(module).is_some_and(|u| u.id == unit)
    }

    /// `(module, unit)` pairs sorted by module name.
    pub fn active(&self) -> Vec<(String, UnitId)> {
        let mut active: Vec<_> = self.units.iter().map(|(m, u)| (m.clone(), u.id)).collect();
        active.sort();
        active
    }

    pub fn modules(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }
}
