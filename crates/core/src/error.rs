use thiserror::Error;

#[derive(Error, Debug)]
pub enum StealscopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker pool could not be built: {0}")]
    PoolBuild(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Computation never completed: {0}")]
    Incomplete(String),
}

pub type Result<T> = std::result::Result<T, StealscopeError>;
