//! Shared image cache.
//!
//! Every asset path goes through `unloaded → loading → loaded | failed` exactly
//! once per session. Entries are never evicted. A path that is absent from the
//! map is *unloaded*; a path whose cell is not yet initialized is *loading*.
//!
//! Concurrent [`ImageCache::load`] calls for the same path share one
//! [`OnceCell`], so the underlying [`AssetLoader`] runs at most once per path.

use crate::assets::{AssetLoader, Image};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Readiness of a cached image.
#[derive(Debug, Clone)]
pub enum ImageState {
    Loading,
    Loaded(Arc<Image>),
    Failed(Arc<str>),
}

impl ImageState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageState::Loaded(_))
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ImageState::Loading)
    }
}

pub struct ImageCache {
    loader: Arc<dyn AssetLoader>,
    entries: Mutex<HashMap<String, Arc<OnceCell<ImageState>>>>,
}

impl ImageCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cell(&self, path: &str) -> Arc<OnceCell<ImageState>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(path.to_string()).or_default().clone()
    }

    /// Loads `path` if nobody did yet and returns its terminal state.
    pub async fn load(&self, path: &str) -> ImageState {
        let cell = self.cell(path);

        cell.get_or_init(|| async {
            match self.loader.load(path).await {
                Ok(image) => {
                    log::info!("Assets: loaded {} ({}x{})", path, image.width, image.height);
                    ImageState::Loaded(Arc::new(image))
                }
                Err(e) => {
                    log::error!("Assets: failed to load {}: {}", path, e);
                    ImageState::Failed(e.to_string().into())
                }
            }
        })
        .await
        .clone()
    }

    /// Resolves once every path reached a terminal state. Failures never abort
    /// the batch; the returned states are in input order.
    pub async fn preload<I, S>(&self, paths: I) -> Vec<(String, ImageState)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
        let states = futures::future::join_all(paths.iter().map(|p| self.load(p))).await;
        paths.into_iter().zip(states).collect()
    }

    /// Current state of `path`, or `None` if it was never requested.
    pub fn lookup(&self, path: &str) -> Option<ImageState> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let cell = entries.get(path)?;
        Some(cell.get().cloned().unwrap_or(ImageState::Loading))
    }

    /// The decoded image, only when `path` is loaded.
    pub fn image(&self, path: &str) -> Option<Arc<Image>> {
        match self.lookup(path)? {
            ImageState::Loaded(image) => Some(image),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
