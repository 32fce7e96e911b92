use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Module already registered: {0}")]
    DuplicateModule(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot build network client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Engine channel closed")]
    ChannelClosed,

    #[error("Engine did not reply: {0}")]
    NoReply(#[from] tokio::sync::oneshot::error::RecvError),
}
