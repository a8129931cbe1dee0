//! # Pedigree Crawler
//!
//! A concurrent crawler that rebuilds a family tree by fetching family and
//! person records from a remote record store, starting from one family and
//! following each spouse back to the family they were born into.
//!
//! ## Key Features
//!
//! - **Two strategies**: depth-first recursion and generation-by-generation
//!   breadth-first expansion produce the same tree
//! - **No duplicate lookups**: run-scoped visited sets give every family and
//!   person id to exactly one branch, which also breaks cycles
//! - **Async/await**: every lookup is its own Tokio task; locks guard only
//!   in-memory inserts, never a request in flight
//! - **Resilient**: missing, malformed or timed-out records end a branch
//!   without failing the run

pub mod config;
pub mod error;
pub mod fetcher;
pub mod mock;
pub mod model;
pub mod registry;
pub mod stats;
pub mod traversal;
pub mod tree;

pub use error::{ConfigError, CrawlerError, FetchError};
pub use fetcher::{FetchFuture, HttpFetcher, RecordFetcher};
pub use mock::{generate_mock_pedigree, MockConfig, MockFetcher, MockPedigree};
pub use model::{Family, FamilyId, Person, PersonId};
pub use registry::{VisitedRegistry, VisitedSet};
pub use stats::{CrawlStats, CrawlSummary};
pub use traversal::{Crawler, Strategy, TreeSnapshot};
pub use tree::{Tree, TreeAggregator};
