//! Error types for pedigree-crawler
//!
//! The traversal core has no error class of its own: a missing record, a
//! failed request or a revisited id only ends that branch. The types here
//! cover what sits around the core:
//! - configuration validation
//! - building the HTTP client
//! - individual record fetches, before they are folded into "absent"

use thiserror::Error;

/// Top-level error type for the crawler library
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Invalid command line or environment settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Server URL is empty or not http(s)
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    /// Request timeout of zero
    #[error("Invalid timeout {secs}s: must be at least 1 second")]
    InvalidTimeout { secs: u64 },

    /// Mock pedigree depth out of range
    #[error("Invalid mock generation count {count}: must be between 1 and {max}")]
    InvalidGenerations { count: u32, max: u32 },

    /// Neither a root id nor mock mode was given
    #[error("A root family id is required unless --mock is used")]
    MissingRoot,
}

/// Failure to obtain one record from the record store
///
/// Never reaches the traversal engine; fetchers log it and report the
/// record as absent.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure or timeout
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not a valid record
    #[error("malformed record from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CrawlerError>;
