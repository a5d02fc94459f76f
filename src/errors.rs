#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("Screen worker is not running")]
    ChannelClosed,

    #[error("Screen worker dropped the reply")]
    ReplyDropped,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Renderer(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Script is not a JSON array of strings: {0}")]
    InvalidScript(String),

    #[error("Surface size must be at least 1x1")]
    ZeroSurface,
}
