//! Configuration types for pedigree-crawler
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::fetcher::DEFAULT_SERVER_URL;
use crate::model::FamilyId;
use crate::traversal::Strategy;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Deepest mock pedigree accepted on the command line
const MAX_MOCK_GENERATIONS: u32 = 16;

/// Rebuild a family tree from a remote record store
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pedigree-crawler",
    version,
    about = "Rebuild a family tree from a remote record store",
    long_about = "Fetches family and person records starting from one family and follows \
                  each spouse's parent family until the known ancestry is exhausted.\n\n\
                  Runs depth-first, breadth-first, or both and reports what was found.",
    after_help = "EXAMPLES:\n    \
        pedigree-crawler 6128784944\n    \
        pedigree-crawler 6128784944 --strategy bfs --server http://10.0.0.5:8123\n    \
        pedigree-crawler --mock --mock-generations 8 -v"
)]
pub struct CliArgs {
    /// Family id to start from (required unless --mock)
    #[arg(value_name = "FAMILY_ID", allow_negative_numbers = true)]
    pub root: Option<i64>,

    /// Traversal order
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Both)]
    pub strategy: StrategyArg,

    /// Record store base URL
    #[arg(
        long,
        env = "PEDIGREE_SERVER_URL",
        default_value = DEFAULT_SERVER_URL,
        value_name = "URL"
    )]
    pub server: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "PEDIGREE_TIMEOUT_SECS", default_value_t = 180, value_name = "SECS")]
    pub timeout_secs: u64,

    /// Crawl a generated in-memory pedigree instead of the server
    #[arg(long)]
    pub mock: bool,

    /// Generations in the mock pedigree
    #[arg(long, default_value_t = 6, value_name = "NUM")]
    pub mock_generations: u32,

    /// Maximum simulated latency per mock lookup
    #[arg(long, default_value_t = 20, value_name = "MS")]
    pub mock_latency_ms: u64,

    /// Seed for the mock pedigree
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Verbose output (per-family debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Traversal choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Dfs,
    Bfs,
    /// Run both and compare the results
    Both,
}

impl StrategyArg {
    pub fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategyArg::Dfs => vec![Strategy::DepthFirst],
            StrategyArg::Bfs => vec![Strategy::BreadthFirst],
            StrategyArg::Both => vec![Strategy::DepthFirst, Strategy::BreadthFirst],
        }
    }
}

/// Where records come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    Http {
        server_url: String,
        timeout: Duration,
    },
    Mock {
        generations: u32,
        latency_ms: u64,
        seed: Option<u64>,
    },
}

/// Validated runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Starting family; `None` means the mock pedigree's root
    pub root: Option<FamilyId>,
    pub strategies: Vec<Strategy>,
    pub source: RecordSource,
    pub verbose: bool,
}

impl CrawlConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root = args.root.map(FamilyId);

        let source = if args.mock {
            if args.mock_generations == 0 || args.mock_generations > MAX_MOCK_GENERATIONS {
                return Err(ConfigError::InvalidGenerations {
                    count: args.mock_generations,
                    max: MAX_MOCK_GENERATIONS,
                });
            }
            RecordSource::Mock {
                generations: args.mock_generations,
                latency_ms: args.mock_latency_ms,
                seed: args.seed,
            }
        } else {
            if root.is_none() {
                return Err(ConfigError::MissingRoot);
            }
            validate_server_url(&args.server)?;
            if args.timeout_secs == 0 {
                return Err(ConfigError::InvalidTimeout {
                    secs: args.timeout_secs,
                });
            }
            RecordSource::Http {
                server_url: args.server,
                timeout: Duration::from_secs(args.timeout_secs),
            }
        };

        Ok(Self {
            root,
            strategies: args.strategy.strategies(),
            source,
            verbose: args.verbose,
        })
    }
}

fn validate_server_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidServerUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| invalid("must start with http:// or https://"))?;
    if rest.trim_matches('/').is_empty() {
        return Err(invalid("missing host"));
    }
    Ok(())
}
