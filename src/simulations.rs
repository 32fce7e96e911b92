//! The four ecosystem simulations.
//!
//! Each one is a [`Simulation`](crate::engine::unit::Simulation) strategy:
//! an entity type parsed from the module's snapshot, the image it is drawn
//! with, and its statistics line.

mod climate;
mod food;
mod life;
mod trees;

pub use climate::{Climate, Cloud};
pub use food::{Food, Resource};
pub use life::{Animal, Life};
pub use trees::{Tree, Trees};

pub const TREE_ASSET: &str = "/static/img/arbol.png";
pub const LION_ASSET: &str = "/static/img/leon.png";
pub const FOOD_ASSET: &str = "/static/img/comida.png";
pub const CLOUD_ASSET: &str = "/static/img/nube.png";
