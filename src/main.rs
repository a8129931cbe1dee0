//! pedigree-crawler - rebuild a family tree from a remote record store
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use pedigree_crawler::config::{CliArgs, CrawlConfig, RecordSource};
use pedigree_crawler::mock::{generate_mock_pedigree_with_config, MockConfig};
use pedigree_crawler::{Crawler, FamilyId, HttpFetcher, RecordFetcher, TreeSnapshot};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = CrawlConfig::from_args(CliArgs::parse()).context("Invalid configuration")?;
    setup_logging(config.verbose);

    let (fetcher, root) = build_fetcher(&config)?;
    let crawler = Crawler::new(fetcher);

    println!("=== Pedigree Crawler ===\n");
    println!("Starting from family {}", root);

    let mut snapshots = Vec::with_capacity(config.strategies.len());
    for strategy in &config.strategies {
        let snapshot = crawler.run(*strategy, root).await;
        print_summary(&snapshot);
        snapshots.push(snapshot);
    }

    if let [first, second] = snapshots.as_slice() {
        if first.tree.same_ids(&second.tree) {
            println!("\n  - {} and {} found the same tree", first.strategy, second.strategy);
        } else {
            warn!("traversal strategies disagree");
            println!(
                "\n  - MISMATCH: {} and {} found different trees",
                first.strategy, second.strategy
            );
        }
    }

    Ok(())
}

/// Builds the record source and picks the root family
fn build_fetcher(config: &CrawlConfig) -> Result<(Arc<dyn RecordFetcher>, FamilyId)> {
    match &config.source {
        RecordSource::Http { server_url, timeout } => {
            let fetcher = HttpFetcher::new(server_url.clone(), *timeout)
                .context("Failed to initialize record fetcher")?;
            info!(server = %server_url, timeout_secs = timeout.as_secs(), "using record server");
            let root = config.root.context("A root family id is required")?;
            let fetcher: Arc<dyn RecordFetcher> = Arc::new(fetcher);
            Ok((fetcher, root))
        }
        RecordSource::Mock {
            generations,
            latency_ms,
            seed,
        } => {
            let pedigree = generate_mock_pedigree_with_config(MockConfig {
                generations: *generations,
                seed: *seed,
                ..Default::default()
            });
            info!(
                families = pedigree.families.len(),
                people = pedigree.people.len(),
                "generated mock pedigree"
            );
            let root = config.root.unwrap_or(pedigree.root);
            let fetcher: Arc<dyn RecordFetcher> =
                Arc::new(pedigree.into_fetcher().with_latency(0, *latency_ms));
            Ok((fetcher, root))
        }
    }
}

fn print_summary(snapshot: &TreeSnapshot) {
    let stats = &snapshot.stats;
    let secs = snapshot.elapsed.as_secs_f64();

    println!("\n=== {} ===", snapshot.strategy);
    println!("  - Families:        {}", snapshot.family_count());
    println!("  - People:          {}", snapshot.person_count());
    println!(
        "  - Requests:        {} ({} absent)",
        stats.total_requests(),
        stats.families_absent + stats.people_absent
    );
    println!("  - Revisits:        {}", stats.revisits_skipped);
    if stats.generations > 0 {
        println!("  - Generations:     {}", stats.generations);
    }
    if stats.max_depth > 0 {
        println!("  - Max depth:       {}", stats.max_depth);
    }
    println!("  - Total time:      {:.3}s", secs);
    if !snapshot.root.is_valid() {
        println!("  - Nothing to traverse: root family {} is not a valid id", snapshot.root);
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pedigree_crawler=debug,warn")
    } else {
        EnvFilter::new("pedigree_crawler=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
