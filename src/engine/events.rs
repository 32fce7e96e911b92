//! Engine event types and commands.
//!
//! Two channel families are defined here:
//!
//! - Unit channels, one pair per simulation unit. [`UnitCommand`] flows from
//!   the orchestrator to a unit, [`UnitEvent`] flows back. Both serialize as
//!   `{"type": ..., "payload": ...}` so they can cross any process boundary.
//! - Engine channels. [`EngineCommand`] is sent by an
//!   [`EngineHandle`](crate::engine::EngineHandle) to the orchestrator task, and
//!   [`EngineEvent`] is broadcast to every subscriber.

use crate::assets::ImageState;
use crate::engine::unit::UnitId;
use crate::render::DrawBatch;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Orchestrator → unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum UnitCommand {
    /// Start polling. Carries the pixel size of the module's surface at the
    /// moment the unit is started.
    Init { width: u32, height: u32 },
    /// Stop polling. An in-flight fetch still completes.
    Stop,
}

/// Unit → orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum UnitEvent {
    /// Display-ready statistics line.
    Stats { text: String },
    /// One full frame.
    Draw { ops: DrawBatch },
}

/// Commands handled by the orchestrator task.
#[derive(Debug)]
pub(crate) enum EngineCommand {
    Start {
        module: String,
    },
    Stop {
        module: String,
    },
    ActiveUnits {
        reply: oneshot::Sender<Vec<(String, UnitId)>>,
    },
    Preload {
        reply: oneshot::Sender<Vec<(String, ImageState)>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Events broadcast by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The orchestrator task is running.
    EngineStarted,
    /// A new unit has been spawned and initialized for `module`.
    UnitStarted { module: String, unit: UnitId },
    /// The unit bound to `module` has been terminated.
    UnitStopped { module: String, unit: UnitId },
    /// A draw batch was executed on the module's surface.
    FrameRendered {
        module: String,
        unit: UnitId,
        executed: usize,
        skipped: usize,
    },
    /// A statistics line was written to the module's stat sink.
    StatsUpdated { module: String, text: String },
    /// `start` was requested for a module that could not be started.
    StartFailed { module: String, reason: String },
    /// The orchestrator stopped every unit and exited.
    Shutdown,
}
