use crate::assets::{loader_for, AssetLoader, ImageCache, ImageState};
use crate::config::EngineConfig;
use crate::engine::events::{EngineCommand, EngineEvent, UnitCommand, UnitEvent};
use crate::engine::handle::EngineHandle;
use crate::engine::module::{ModuleDescriptor, ModuleKind, StatSink};
use crate::engine::registry::{ActiveUnit, UnitRegistry};
use crate::engine::unit::{spawn_unit, UnitId, UnitSpawnArgs};
use crate::errors::EngineError;
use crate::net::{build_client, DataSource, HttpDataSource};
use crate::render::{self, Surface};
use futures::stream::{self, BoxStream, SelectAll};
use futures::StreamExt;
use std::collections::{BTreeSet, HashMap};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A registered module: its descriptor plus the surface and stat sink it
/// owns exclusively.
struct ModuleSlot {
    descriptor: ModuleDescriptor,
    surface: Box<dyn Surface>,
    sink: Box<dyn StatSink>,
}

type Inbox = SelectAll<BoxStream<'static, (String, UnitId, UnitEvent)>>;

/// Owns the module registry, the active-unit registry and the image cache,
/// and is the only place where surfaces and stat sinks are touched.
///
/// The orchestrator can be driven directly (`start_module`, `stop_module`,
/// `process_next`) or moved onto its own task with [`Orchestrator::start`] and
/// controlled through the returned [`EngineHandle`].
pub struct Orchestrator {
    /// Configuration for the whole engine.
    config: Arc<EngineConfig>,
    /// Registered modules, indexed by name.
    modules: HashMap<String, ModuleSlot>,
    /// Units currently running, at most one per module.
    registry: UnitRegistry,
    /// Image cache shared with the interpreter.
    cache: Arc<ImageCache>,
    /// Snapshot provider handed to every unit.
    source: Arc<dyn DataSource>,
    /// Event streams of all active units, merged.
    inbox: Inbox,
    /// Broadcast bus for hosts.
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Orchestrator {
    /// Creates an orchestrator that fetches snapshots from `config.data_url`
    /// and loads assets from `config.assets`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = build_client(&config)?;
        let source = Arc::new(HttpDataSource::with_client(client.clone(), config.data_url.clone()));
        let loader = loader_for(&config.assets, client);
        Ok(Self::with_services(config, source, loader))
    }

    /// Creates an orchestrator on top of custom data and asset providers.
    pub fn with_services(
        config: EngineConfig,
        source: Arc<dyn DataSource>,
        loader: Arc<dyn AssetLoader>,
    ) -> Self {
        let (event_tx, _first_rx) = broadcast::channel(config.channel_capacity);

        Self {
            config: Arc::new(config),
            modules: HashMap::new(),
            registry: UnitRegistry::default(),
            cache: Arc::new(ImageCache::new(loader)),
            source,
            inbox: SelectAll::new(),
            event_tx,
        }
    }

    /// Registers a module with the surface it renders to and the sink its
    /// statistics go to.
    pub fn register(
        &mut self,
        kind: ModuleKind,
        surface: Box<dyn Surface>,
        sink: Box<dyn StatSink>,
    ) -> Result<(), EngineError> {
        let descriptor = ModuleDescriptor::new(kind);
        if self.modules.contains_key(&descriptor.name) {
            return Err(EngineError::DuplicateModule(descriptor.name));
        }

        log::debug!("Engine: registered module {}", descriptor.name);
        self.modules.insert(
            descriptor.name.clone(),
            ModuleSlot {
                descriptor,
                surface,
                sink,
            },
        );
        Ok(())
    }

    /// Registered module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every asset referenced by the registered modules, deduplicated and sorted.
    pub fn asset_paths(&self) -> Vec<String> {
        self.modules
            .values()
            .flat_map(|slot| slot.descriptor.kind.asset_paths().iter().map(|p| p.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Loads every referenced asset. Resolves once each one is loaded or failed.
    pub async fn preload_assets(&self) -> Vec<(String, ImageState)> {
        self.cache.preload(self.asset_paths()).await
    }

    /// Preloads all assets, then starts every registered module. Failed assets
    /// do not prevent modules from starting.
    pub async fn boot(&mut self) {
        let states = self.preload_assets().await;
        let failed = states.iter().filter(|(_, s)| !s.is_loaded()).count();
        if failed > 0 {
            log::warn!("Engine: {} of {} assets failed to load", failed, states.len());
        }

        for name in self.module_names() {
            if let Err(e) = self.start_module(&name) {
                log::error!("Engine: cannot start {}: {}", name, e);
            }
        }
    }

    /// Starts a fresh unit for `name`, stopping the current one first.
    pub fn start_module(&mut self, name: &str) -> Result<UnitId, EngineError> {
        let slot = self
            .modules
            .get(name)
            .ok_or_else(|| EngineError::UnknownModule(name.to_string()))?;
        let kind = slot.descriptor.kind;
        let size = slot.surface.size();

        self.stop_module(name);

        let capacity = self.config.channel_capacity;
        let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
        let (unit_tx, unit_rx) = mpsc::channel(capacity);
        let id = UnitId::new();

        let join = spawn_unit(
            kind,
            UnitSpawnArgs {
                unit_id: id,
                module: name.to_string(),
                source: self.source.clone(),
                cmd_rx,
                event_tx: unit_tx,
                tick_interval: self.config.tick_interval,
            },
        );

        // Fresh channel with non-zero capacity: cannot be full.
        if let Err(e) = cmd_tx.try_send(UnitCommand::Init {
            width: size.width,
            height: size.height,
        }) {
            log::error!("Engine: cannot init unit for {}: {}", name, e);
        }

        let closed = CancellationToken::new();
        self.inbox.push(unit_stream(name.to_string(), id, unit_rx, closed.clone()));
        self.registry.insert(
            name,
            ActiveUnit {
                id,
                cmd_tx,
                join,
                closed,
            },
        );

        log::info!("Engine: started {} ({}x{}) as unit {}", name, size.width, size.height, id);
        let _ = self.event_tx.send(EngineEvent::UnitStarted {
            module: name.to_string(),
            unit: id,
        });
        Ok(id)
    }

    /// Stops the unit bound to `name`. Returns `false` when there was none.
    pub fn stop_module(&mut self, name: &str) -> bool {
        let Some(unit) = self.registry.remove(name) else {
            return false;
        };

        let id = unit.id;
        unit.terminate();

        log::info!("Engine: stopped {} (unit {})", name, id);
        let _ = self.event_tx.send(EngineEvent::UnitStopped {
            module: name.to_string(),
            unit: id,
        });
        true
    }

    /// `(module, unit)` pairs of all running units.
    pub fn active_units(&self) -> Vec<(String, UnitId)> {
        self.registry.active()
    }

    pub fn surface(&self, name: &str) -> Option<&dyn Surface> {
        self.modules.get(name).map(|slot| slot.surface.as_ref())
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Waits for the next unit message and handles it. Returns `false` right
    /// away when no unit is running.
    pub async fn process_next(&mut self) -> bool {
        match self.inbox.next().await {
            Some((module, unit, event)) => {
                self.dispatch(&module, unit, event);
                true
            }
            None => false,
        }
    }

    /// Routes one unit message to the module's surface or stat sink. Messages
    /// from a unit that is no longer bound to its module are dropped.
    pub(crate) fn dispatch(&mut self, module: &str, unit: UnitId, event: UnitEvent) {
        if !self.registry.is_current(module, unit) {
            log::trace!("Engine: dropping message from retired unit {} of {}", unit, module);
            return;
        }
        let Some(slot) = self.modules.get_mut(module) else {
            return;
        };

        match event {
            UnitEvent::Draw { ops } => {
                let report = render::execute(slot.surface.as_mut(), &self.cache, &ops);
                log::trace!(
                    "Engine: {} frame, {} executed, {} skipped",
                    module,
                    report.executed,
                    report.skipped
                );
                let _ = self.event_tx.send(EngineEvent::FrameRendered {
                    module: module.to_string(),
                    unit,
                    executed: report.executed,
                    skipped: report.skipped,
                });
            }
            UnitEvent::Stats { text } => {
                slot.sink.publish(&text);
                let _ = self.event_tx.send(EngineEvent::StatsUpdated {
                    module: module.to_string(),
                    text,
                });
            }
        }
    }

    /// Stops every unit.
    pub fn shutdown(&mut self) {
        for name in self.registry.modules() {
            self.stop_module(&name);
        }
        let _ = self.event_tx.send(EngineEvent::Shutdown);
    }

    /// Moves the orchestrator onto its own task. The join handle yields the
    /// orchestrator back after shutdown, so hosts can still read its surfaces.
    pub fn start(self) -> (EngineHandle, JoinHandle<Orchestrator>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.channel_capacity);
        let handle = EngineHandle::new(cmd_tx, self.event_tx.clone());
        let join = tokio::spawn(self.run(cmd_rx));
        (handle, join)
    }

    /// Command loop. Never blocks on a unit: unit messages and handle
    /// commands are served as they arrive. Ends on `Shutdown` or when every
    /// handle is dropped.
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<EngineCommand>) -> Self {
        let _ = self.event_tx.send(EngineEvent::EngineStarted);

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd).is_break() {
                            break;
                        }
                    }
                    None => {
                        self.shutdown();
                        break;
                    }
                },
                Some((module, unit, event)) = self.inbox.next(), if !self.inbox.is_empty() => {
                    self.dispatch(&module, unit, event);
                }
            }
        }

        log::debug!("Engine: command loop exited");
        self
    }

    /// Serves one handle command. Breaks once the engine has shut down.
    fn handle_command(&mut self, cmd: EngineCommand) -> ControlFlow<()> {
        match cmd {
            EngineCommand::Start { module } => {
                if let Err(e) = self.start_module(&module) {
                    log::warn!("Engine: start {} failed: {}", module, e);
                    let _ = self.event_tx.send(EngineEvent::StartFailed {
                        module,
                        reason: e.to_string(),
                    });
                }
            }
            EngineCommand::Stop { module } => {
                self.stop_module(&module);
            }
            EngineCommand::ActiveUnits { reply } => {
                let _ = reply.send(self.active_units());
            }
            EngineCommand::Preload { reply } => {
                // Off the loop: loading may take a while.
                let cache = self.cache.clone();
                let paths = self.asset_paths();
                tokio::spawn(async move {
                    let _ = reply.send(cache.preload(paths).await);
                });
            }
            EngineCommand::Shutdown { reply } => {
                self.shutdown();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Tags a unit's messages with its module and id, and ends the stream once
/// `closed` is cancelled.
fn unit_stream(
    module: String,
    unit: UnitId,
    rx: mpsc::Receiver<UnitEvent>,
    closed: CancellationToken,
) -> BoxStream<'static, (String, UnitId, UnitEvent)> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|ev| (ev, rx)) })
        .map(move |ev| (module.clone(), unit, ev))
        .take_until(closed.cancelled_owned())
        .boxed()
}
