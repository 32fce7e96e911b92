pub mod assets;
pub mod config;
pub mod engine;
pub mod errors;
pub mod net;
pub mod render;
pub mod simulations;

#[cfg(test)]
mod testing;

pub use config::{AssetSource, EngineConfig};
pub use engine::*;
pub use errors::EngineError;
