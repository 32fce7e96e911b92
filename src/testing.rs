//! Test doubles shared by the unit tests.

use crate::assets::{AssetError, AssetLoader, Image};
use crate::net::{DataSource, FetchError, Snapshot};
use crate::render::{Color, Surface, SurfaceSize};
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Asset loader that hands out a 2x2 green image for every path, except
/// the ones marked as failing.
#[derive(Default)]
pub struct StubLoader {
    delay: Option<Duration>,
    failing: HashSet<String>,
    attempts: Mutex<HashMap<String, usize>>,
}

impl StubLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    pub fn attempts(&self, path: &str) -> usize {
        self.attempts.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl AssetLoader for StubLoader {
    async fn load(&self, path: &str) -> Result<Image, AssetError> {
        *self.attempts.lock().unwrap().entry(path.to_string()).or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(path) {
            return Err(AssetError::Unsupported);
        }
        Image::from_raw(2, 2, [0u8, 200, 0, 255].repeat(4))
    }
}

/// Data source replaying a script of snapshots. `None` entries fail with a
/// 503; once the script runs out the last entry repeats.
pub struct StubSource {
    script: Vec<Option<Value>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    modules: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn new(script: Vec<Option<Value>>) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            modules: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with `snapshot`.
    pub fn always(snapshot: Value) -> Self {
        Self::new(vec![Some(snapshot)])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn modules(&self) -> Vec<String> {
        self.modules.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for StubSource {
    async fn snapshot(&self, module: &str) -> Result<Snapshot, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.modules.lock().unwrap().push(module.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let entry = self.script.get(n).or(self.script.last()).cloned().flatten();
        match entry {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(FetchError::Status {
                status: 503,
                url: Url::parse("http://stub.invalid/").unwrap(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Clear,
    Image { x: f64, y: f64, w: f64, h: f64 },
    Circle { x: f64, y: f64, r: f64, color: [u8; 4] },
    Rect { x: f64, y: f64, w: f64, h: f64, color: [u8; 4] },
}

/// Surface that records every call for later inspection.
pub struct RecordingSurface {
    size: SurfaceSize,
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the recorded calls; stays valid after the surface moves.
    pub fn calls(&self) -> Arc<Mutex<Vec<SurfaceCall>>> {
        self.calls.clone()
    }

    fn record(&self, call: SurfaceCall) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.record(SurfaceCall::Clear)
    }

    fn draw_image(&mut self, _image: &Image, x: f64, y: f64, w: f64, h: f64) -> anyhow::Result<()> {
        self.record(SurfaceCall::Image { x, y, w, h })
    }

    fn fill_circle(&mut self, x: f64, y: f64, r: f64, color: Color) -> anyhow::Result<()> {
        self.record(SurfaceCall::Circle { x, y, r, color: color.to_rgba8() })
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> anyhow::Result<()> {
        self.record(SurfaceCall::Rect { x, y, w, h, color: color.to_rgba8() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Serves a single HTTP/1.1 response on a local port. The join handle yields
/// the request line the server saw.
pub async fn serve_once(status: &str, body: impl Into<Vec<u8>>) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let status = status.to_string();
    let body = body.into();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }

        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
    });

    (addr, server)
}

/// Client that never goes through a proxy, so local servers are reached directly.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
