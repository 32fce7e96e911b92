use crate::assets::ImageState;
use crate::engine::events::{EngineCommand, EngineEvent};
use crate::engine::unit::UnitId;
use crate::errors::EngineError;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Cloneable handle to a running [`Orchestrator`](crate::engine::Orchestrator).
///
/// `start` and `stop` are fire-and-forget: they never report failure to the
/// caller and only log when the engine is gone. Queries reply over a oneshot.
#[derive(Clone)]
pub struct EngineHandle {
    /// Engine command sender
    cmd_tx: mpsc::Sender<EngineCommand>,
    /// Event sender, only used to hand out subscriptions
    event_tx: broadcast::Sender<EngineEvent>,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("cmd_tx", &self.cmd_tx)
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

impl EngineHandle {
    pub(crate) fn new(cmd_tx: mpsc::Sender<EngineCommand>, event_tx: broadcast::Sender<EngineEvent>) -> Self {
        Self { cmd_tx, event_tx }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// (Re)starts `module`.
    pub async fn start(&self, module: &str) {
        let cmd = EngineCommand::Start {
            module: module.to_string(),
        };
        if self.cmd_tx.send(cmd).await.is_err() {
            log::warn!("Engine: cannot start {}, engine is gone", module);
        }
    }

    /// Stops `module`. Stopping a module that is not running is a no-op.
    pub async fn stop(&self, module: &str) {
        let cmd = EngineCommand::Stop {
            module: module.to_string(),
        };
        if self.cmd_tx.send(cmd).await.is_err() {
            log::warn!("Engine: cannot stop {}, engine is gone", module);
        }
    }

    /// `(module, unit)` pairs of all running units.
    pub async fn active_units(&self) -> Result<Vec<(String, UnitId)>, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.send(EngineCommand::ActiveUnits { reply: tx }).await?;
        Ok(rx.await?)
    }

    /// Loads every asset of the registered modules and reports their final state.
    pub async fn preload_assets(&self) -> Result<Vec<(String, ImageState)>, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.send(EngineCommand::Preload { reply: tx }).await?;
        Ok(rx.await?)
    }

    /// Stops every unit and ends the engine task.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.send(EngineCommand::Shutdown { reply: tx }).await?;
        Ok(rx.await?)
    }

    async fn send(&self, cmd: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(cmd).await.map_err(|_| EngineError::ChannelClosed)
    }
}
