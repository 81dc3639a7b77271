use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Token store error: {0}")]
    TokenStore(String),

    #[error("No route matches path: {0}")]
    UnknownRoute(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
