pub mod backend;

/// Drawing surfaces.
pub mod backends {
    pub mod null;
    /// Software RGBA8 surface
    pub mod pixels;
}

mod draw_list;
pub use draw_list::*;

mod interpreter;
pub use interpreter::{execute, ExecuteReport};

pub use backend::{Surface, SurfaceSize};
