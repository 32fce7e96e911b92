//! Engine: the lifecycle orchestrator, its handle, and the simulation units it
//! spawns.

pub mod events;
mod handle;
pub mod module;
mod orchestrator;
mod registry;
pub mod unit;

pub use events::{EngineEvent, UnitCommand, UnitEvent};
pub use handle::EngineHandle;
pub use module::{LogStatSink, ModuleDescriptor, ModuleKind, StatSink};
pub use orchestrator::Orchestrator;
pub use unit::UnitId;
