//! Image assets shared by every module: decoding, loading and the
//! [`ImageCache`] the interpreter draws from.

mod cache;
mod image;
mod loader;

pub use cache::{ImageCache, ImageState};
pub use image::{decode_png, Image};
pub use loader::{loader_for, AssetError, AssetLoader, FsAssetLoader, HttpAssetLoader};
