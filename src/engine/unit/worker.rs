use crate::engine::events::{UnitCommand, UnitEvent};
use crate::engine::unit::schedule::PollSchedule;
use crate::engine::unit::simulation::Simulation;
use crate::engine::unit::structs::{UnitId, UnitSpawnArgs, UnitState};
use crate::net::{DataSource, FetchError, Snapshot};
use crate::render::{DrawBatch, SurfaceSize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Generic polling unit: fetch a snapshot, parse it into entities, emit one
/// draw batch and one statistics line, wait, repeat.
///
/// The unit is a single task. Its only suspension points are the command
/// channel, the tick timer and the in-flight fetch. Commands are still read
/// while a fetch is in flight, so a `stop` is observed immediately, but the
/// fetch itself is never interrupted: its result is emitted and only the next
/// tick is suppressed.
pub struct SimulationUnit<S: Simulation> {
    unit_id: UnitId,
    module: String,
    sim: S,
    entities: Vec<S::Entity>,
    state: UnitState,
    size: SurfaceSize,
    schedule: PollSchedule,
    source: Arc<dyn DataSource>,
    cmd_rx: mpsc::Receiver<UnitCommand>,
    event_tx: mpsc::Sender<UnitEvent>,
    inbox_closed: bool,
}

impl<S: Simulation> SimulationUnit<S> {
    pub fn new(sim: S, args: UnitSpawnArgs) -> Self {
        Self {
            unit_id: args.unit_id,
            module: args.module,
            sim,
            entities: Vec::new(),
            state: UnitState::Idle,
            size: SurfaceSize::new(0, 0),
            schedule: PollSchedule::new(args.tick_interval),
            source: args.source,
            cmd_rx: args.cmd_rx,
            event_tx: args.event_tx,
            inbox_closed: false,
        }
    }

    pub async fn run(mut self) {
        log::debug!("Unit[{}/{}]: spawned", self.module, self.unit_id);

        while self.state != UnitState::Stopped {
            tokio::select! {
                cmd = self.cmd_rx.recv(), if !self.inbox_closed => {
                    self.on_command(cmd);
                }
                _ = self.schedule.elapsed(), if self.schedule.is_armed() => {
                    self.tick().await;
                }
                else => break,
            }
        }

        log::debug!("Unit[{}/{}]: exited in state {:?}", self.module, self.unit_id, self.state);
    }

    fn on_command(&mut self, cmd: Option<UnitCommand>) {
        match cmd {
            Some(cmd) => self.handle_command(cmd),
            None => {
                // Orchestrator dropped the sender.
                self.inbox_closed = true;
                self.stop();
            }
        }
    }

    fn handle_command(&mut self, cmd: UnitCommand) {
        match cmd {
            UnitCommand::Init { width, height } => {
                if self.state != UnitState::Idle {
                    log::debug!("Unit[{}/{}]: ignoring init in state {:?}", self.module, self.unit_id, self.state);
                    return;
                }

                self.state = UnitState::Initializing;
                self.size = SurfaceSize::new(width, height);
                self.entities.clear();
                self.sim.reset();

                self.state = UnitState::Running;
                self.schedule.arm_now();
                log::debug!("Unit[{}/{}]: running on {}x{}", self.module, self.unit_id, width, height);
            }
            UnitCommand::Stop => self.stop(),
        }
    }

    fn stop(&mut self) {
        if self.state != UnitState::Stopped {
            log::debug!("Unit[{}/{}]: stopping", self.module, self.unit_id);
        }
        self.state = UnitState::Stopped;
        self.schedule.stop();
    }

    /// One fetch-compute-emit-reschedule cycle.
    async fn tick(&mut self) {
        if self.schedule.is_stopped() {
            return;
        }

        match self.fetch().await {
            Ok(snapshot) => match self.sim.parse_entities(snapshot.data.clone()) {
                Ok(entities) => {
                    self.entities = entities;
                    self.sim.aggregate(&self.entities);
                    if let Err(e) = self.emit(&snapshot).await {
                        log::debug!("Unit[{}/{}]: {}", self.module, self.unit_id, e);
                        self.stop();
                    }
                }
                Err(e) => {
                    log::debug!("Unit[{}/{}]: malformed entities: {}", self.module, self.unit_id, e);
                }
            },
            Err(e) => {
                log::debug!("Unit[{}/{}]: fetch failed: {}", self.module, self.unit_id, e);
            }
        }

        self.schedule.reschedule();
    }

    /// Awaits the snapshot while still handling commands.
    async fn fetch(&mut self) -> Result<Snapshot, FetchError> {
        let source = self.source.clone();
        let module = self.module.clone();
        let fetch = async move { source.snapshot(&module).await };
        tokio::pin!(fetch);

        loop {
            tokio::select! {
                biased;
                res = &mut fetch => return res,
                cmd = self.cmd_rx.recv(), if !self.inbox_closed => self.on_command(cmd),
            }
        }
    }

    async fn emit(&mut self, snapshot: &Snapshot) -> Result<(), mpsc::error::SendError<UnitEvent>> {
        let mut ops = DrawBatch::frame();
        self.sim.draw(&self.entities, self.size, &mut ops);
        let text = self.sim.stats(&self.entities, snapshot);

        self.event_tx.send(UnitEvent::Draw { ops }).await?;
        self.event_tx.send(UnitEvent::Stats { text }).await
    }
}
