//! Engine configuration.
//!
//! `EngineConfig` controls where the simulation units fetch their state from,
//! where image assets are resolved, and how fast units tick. It provides
//! defaults via [`Default`], a fluent [`EngineConfig::builder()`] with
//! validation, and [`EngineConfig::from_env()`] for the viewer binary.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use ecosim::config::{AssetSource, EngineConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = EngineConfig::builder()
//!     .data_url("http://192.168.1.10:5000")?
//!     .assets(AssetSource::Directory("public".into()))
//!     .tick_interval(Duration::from_millis(500))
//!     .build()?;
//! assert_eq!(cfg.data_url.as_str(), "http://192.168.1.10:5000/");
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `data_url`: base URL of the data server. Module endpoints are resolved as
//!   `<data_url>/api/data/<module>`. Always stored with a trailing slash.
//! - `assets`: where image paths like `/static/img/arbol.png` are resolved.
//! - `tick_interval`: fixed delay between two fetch cycles of a unit (default 1s).
//! - `channel_capacity`: capacity of every unit and engine channel.
//! - `user_agent`: UA string sent with data and asset requests.
//! - `fetch_timeout`: optional transport timeout. `None` (the default) means a
//!   hanging endpoint stalls that unit's cycle indefinitely.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_DATA_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_USER_AGENT: &str = "ecosim-render/0.1";

/// Where image assets are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Asset paths are joined onto this directory (leading `/` stripped).
    Directory(PathBuf),
    /// Asset paths are joined onto this base URL.
    Http(Url),
}

impl Default for AssetSource {
    fn default() -> Self {
        AssetSource::Directory(PathBuf::from("."))
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub data_url: Url,
    pub assets: AssetSource,
    pub tick_interval: Duration,
    pub channel_capacity: usize,
    pub user_agent: String,
    pub fetch_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_url: Url::parse(DEFAULT_DATA_URL).expect("default data url is valid"),
            assets: AssetSource::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: None,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Reads the configuration from `ECOSIM_*` environment variables, falling
    /// back to the defaults for anything not set.
    ///
    /// - `ECOSIM_DATA_URL`: data server base URL
    /// - `ECOSIM_ASSET_DIR` / `ECOSIM_ASSET_URL`: asset root (directory wins)
    /// - `ECOSIM_TICK_MS`: tick interval in milliseconds
    /// - `ECOSIM_FETCH_TIMEOUT_MS`: transport timeout in milliseconds
    pub fn from_env() -> Result<EngineConfig, ConfigError> {
        let mut builder = EngineConfig::builder();

        if let Ok(url) = std::env::var("ECOSIM_DATA_URL") {
            builder = builder.data_url(&url)?;
        }
        if let Ok(dir) = std::env::var("ECOSIM_ASSET_DIR") {
            builder = builder.assets(AssetSource::Directory(dir.into()));
        } else if let Ok(url) = std::env::var("ECOSIM_ASSET_URL") {
            let url = Url::parse(&url).map_err(|e| ConfigError::InvalidUrl(url, e))?;
            builder = builder.assets(AssetSource::Http(url));
        }
        if let Some(ms) = env_millis("ECOSIM_TICK_MS")? {
            builder = builder.tick_interval(ms);
        }
        if let Some(ms) = env_millis("ECOSIM_FETCH_TIMEOUT_MS")? {
            builder = builder.fetch_timeout(ms);
        }

        builder.build()
    }
}

fn env_millis(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        Err(_) => Ok(None),
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    inner: EngineConfig,
}

impl EngineConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut EngineConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn data_url(self, url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl(url.to_string(), e))?;
        Ok(self.map(|c| c.data_url = with_trailing_slash(parsed)))
    }
    pub fn assets(self, source: AssetSource) -> Self {
        let source = match source {
            AssetSource::Http(base) => AssetSource::Http(with_trailing_slash(base)),
            dir => dir,
        };
        self.map(|c| c.assets = source)
    }
    pub fn tick_interval(self, interval: Duration) -> Self { self.map(|c| c.tick_interval = interval) }
    pub fn channel_capacity(self, n: usize) -> Self { self.map(|c| c.channel_capacity = n) }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn fetch_timeout(self, timeout: Duration) -> Self { self.map(|c| c.fetch_timeout = Some(timeout)) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut EngineConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidUrl(String, url::ParseError),
    InvalidEnv { name: &'static str, value: String },
    ZeroTickInterval,
    ZeroChannelCapacity,
    NotHttp(Url),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl(url, e) => write!(f, "invalid url {url:?}: {e}"),
            ConfigError::InvalidEnv { name, value } =>
                write!(f, "{name}={value:?} is not a number of milliseconds"),
            ConfigError::ZeroTickInterval => write!(f, "tick_interval must be non-zero"),
            ConfigError::ZeroChannelCapacity => write!(f, "channel_capacity must be at least 1"),
            ConfigError::NotHttp(url) => write!(f, "{url} is not an http(s) url"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &EngineConfig) -> Result<(), ConfigError> {
    if c.tick_interval.is_zero() {
        return Err(ConfigError::ZeroTickInterval);
    }
    if c.channel_capacity == 0 {
        return Err(ConfigError::ZeroChannelCapacity);
    }
    if !matches!(c.data_url.scheme(), "http" | "https") {
        return Err(ConfigError::NotHttp(c.data_url.clone()));
    }
    if let AssetSource::Http(url) = &c.assets {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::NotHttp(url.clone()));
        }
    }
    Ok(())
}
