//! Simulation units: [`SimulationUnit`], [`PollSchedule`] and [`UnitId`].
//!
//! Every module runs as one unit task. All units share the same skeleton and
//! differ only in the [`Simulation`] strategy they are spawned with.

mod schedule;
mod simulation;
mod structs;
mod worker;

pub use schedule::PollSchedule;
pub use simulation::{mean, round_half_up, Simulation};
pub use structs::{UnitId, UnitSpawnArgs, UnitState};
pub use worker::SimulationUnit;

use crate::engine::module::ModuleKind;
use crate::simulations::{Climate, Food, Life, Trees};
use tokio::task::JoinHandle;

/// Spawns the unit task for `kind`.
pub fn spawn_unit(kind: ModuleKind, args: UnitSpawnArgs) -> JoinHandle<()> {
    match kind {
        ModuleKind::Trees => tokio::spawn(SimulationUnit::new(Trees, args).run()),
        ModuleKind::Life => tokio::spawn(SimulationUnit::new(Life, args).run()),
        ModuleKind::Food => tokio::spawn(SimulationUnit::new(Food, args).run()),
        ModuleKind::Climate => tokio::spawn(SimulationUnit::new(Climate::default(), args).run()),
    }
}
