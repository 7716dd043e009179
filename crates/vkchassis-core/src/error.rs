#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unknown handle: {0:#x}")]
    UnknownHandle(u64),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
