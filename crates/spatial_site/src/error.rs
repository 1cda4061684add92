//! Error types for spatial_site

use spatial_animation::AnimationError;
use spatial_core::CoreError;
use thiserror::Error;

/// Errors raised while building the page
#[derive(Error, Debug)]
pub enum SiteError {
    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`SiteConfig`](crate::SiteConfig)
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// Config could not be written back out
    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// An animation parameter was rejected
    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// Element bounds or timings were rejected
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Failure talking to the form relay
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    /// The request never got a response
    #[error("relay unreachable: {0}")]
    Network(String),

    /// The relay answered with a non-success HTTP status
    #[error("relay returned status {0}")]
    Status(u16),

    /// The response body was not the expected JSON
    #[error("malformed relay response: {0}")]
    Malformed(String),

    /// The relay answered but declined the submission
    #[error("relay rejected the submission: {0}")]
    Rejected(String),
}

/// Failure fetching or reading the earthquake feed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("feed unavailable: {0}")]
    Unavailable(String),

    #[error("malformed feed: {0}")]
    Parse(String),

    /// The feed parsed but held no usable events
    #[error("feed has no events")]
    Empty,
}

/// A submission refused before it reached the relay
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("email address is not valid")]
    InvalidEmail,

    /// A submission is already in flight
    #[error("a submission is already in progress")]
    Busy,
}

/// Result type for spatial_site operations
pub type Result<T> = std::result::Result<T, SiteError>;
