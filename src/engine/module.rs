//! Module descriptors and stat sinks.

use crate::simulations::{CLOUD_ASSET, FOOD_ASSET, LION_ASSET, TREE_ASSET};
use std::fmt;

/// The simulations the engine knows how to run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    Trees,
    Life,
    Food,
    Climate,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::Trees,
        ModuleKind::Life,
        ModuleKind::Food,
        ModuleKind::Climate,
    ];

    /// Module name, also used as the data endpoint suffix.
    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Trees => "trees",
            ModuleKind::Life => "life",
            ModuleKind::Food => "food",
            ModuleKind::Climate => "climate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Image assets this module's draw batches reference.
    pub fn asset_paths(&self) -> &'static [&'static str] {
        match self {
            ModuleKind::Trees => &[TREE_ASSET],
            ModuleKind::Life => &[LION_ASSET],
            ModuleKind::Food => &[FOOD_ASSET],
            ModuleKind::Climate => &[CLOUD_ASSET],
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable description of a registered module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub kind: ModuleKind,
}

impl ModuleDescriptor {
    pub fn new(kind: ModuleKind) -> Self {
        Self {
            name: kind.name().to_string(),
            kind,
        }
    }
}

/// Receives the statistics lines of one module.
pub trait StatSink: Send {
    fn publish(&mut self, text: &str);
}

impl<F> StatSink for F
where
    F: FnMut(&str) + Send,
{
    fn publish(&mut self, text: &str) {
        self(text)
    }
}

/// Writes statistics to the log at `info` level.
pub struct LogStatSink {
    module: String,
}

impl LogStatSink {
    pub fn new(module: impl Into<String>) -> Self {
        Self { module: module.into() }
    }
}

impl StatSink for LogStatSink {
    fn publish(&mut self, text: &str) {
        log::info!("[{}] {}", self.module, text);
    }
}
