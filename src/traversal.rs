//! Depth-first and breadth-first pedigree traversal
//!
//! Both strategies share one expansion step: claim a family id, fetch the
//! family, record it, then claim and fetch its husband, wife and children
//! concurrently. What differs is scheduling. Depth-first recurses into the
//! spouses' parent families as soon as a family is expanded; breadth-first
//! finishes a whole generation, person lookups included, before it derives
//! the next one.

use crate::fetcher::RecordFetcher;
use crate::model::{FamilyId, Person, PersonId};
use crate::registry::VisitedRegistry;
use crate::stats::{CrawlStats, CrawlSummary};
use crate::tree::{Tree, TreeAggregator};
use futures::future::join_all;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Order in which the pedigree is explored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    DepthFirst,
    BreadthFirst,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DepthFirst => write!(f, "depth-first"),
            Strategy::BreadthFirst => write!(f, "breadth-first"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" | "depth" | "depth-first" => Ok(Strategy::DepthFirst),
            "bfs" | "breadth" | "breadth-first" => Ok(Strategy::BreadthFirst),
            other => Err(format!("unknown traversal strategy '{}'", other)),
        }
    }
}

/// Result of one traversal run
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    /// Every family and person discovered
    pub tree: Tree,
    /// Always true once the run has drained; an invalid root is a no-op, not a failure
    pub success: bool,
    pub strategy: Strategy,
    pub root: FamilyId,
    pub stats: CrawlSummary,
    pub elapsed: Duration,
}

impl TreeSnapshot {
    pub fn family_count(&self) -> usize {
        self.tree.family_count()
    }

    pub fn person_count(&self) -> usize {
        self.tree.person_count()
    }
}

type Branch = Pin<Box<dyn Future<Output = ()> + Send>>;

/// State owned by a single run; nothing here outlives it
struct CrawlRun {
    fetcher: Arc<dyn RecordFetcher>,
    visited: VisitedRegistry,
    tree: Arc<TreeAggregator>,
    stats: CrawlStats,
}

impl CrawlRun {
    fn new(fetcher: Arc<dyn RecordFetcher>) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            visited: VisitedRegistry::new(),
            tree: Arc::new(TreeAggregator::new()),
            stats: CrawlStats::new(),
        })
    }

    /// Expands one family and returns the parent families of its spouses.
    ///
    /// Returns `None` when the id is a sentinel, was already claimed, or
    /// the family record is absent.
    async fn expand_family(self: &Arc<Self>, id: FamilyId) -> Option<Vec<FamilyId>> {
        if !id.is_valid() {
            return None;
        }
        if !self.visited.families.claim(id).await {
            self.stats.record_revisit();
            debug!(family = %id, "family already claimed");
            return None;
        }

        let family = self.fetcher.fetch_family(id).await;
        self.stats.record_family(family.is_some());
        let Some(family) = family else {
            debug!(family = %id, "family absent");
            return None;
        };

        let husband_id = family.husband_id;
        let wife_id = family.wife_id;
        let linked = family.linked_people();
        self.tree.add_family(family).await;

        let people = self.fetch_people(linked).await;

        let mut parents: Vec<FamilyId> = people
            .iter()
            .filter(|p| p.id == husband_id || p.id == wife_id)
            .map(|p| p.parent_id)
            .filter(|parent| parent.is_valid())
            .collect();
        parents.sort();
        parents.dedup();

        debug!(family = %id, people = people.len(), parents = parents.len(), "family expanded");
        Some(parents)
    }

    /// Claims and fetches every person concurrently, recording each hit.
    ///
    /// Only people this call claimed are returned.
    async fn fetch_people(self: &Arc<Self>, ids: Vec<PersonId>) -> Vec<Person> {
        let mut handles = Vec::with_capacity(ids.len());

        for id in ids {
            if !self.visited.people.claim(id).await {
                self.stats.record_revisit();
                continue;
            }

            let run = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                let person = run.fetcher.fetch_person(id).await;
                run.stats.record_person(person.is_some());
                match person {
                    Some(person) => {
                        run.tree.add_person(person.clone()).await;
                        Some(person)
                    }
                    None => {
                        debug!(person = %id, "person absent");
                        None
                    }
                }
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(person) => person,
                Err(e) => {
                    warn!(error = %e, "person lookup task failed");
                    None
                }
            })
            .collect()
    }

    /// Expands `id` then visits both spouses' parent families concurrently,
    /// returning once every branch below has finished.
    fn visit_depth_first(self: Arc<Self>, id: FamilyId, depth: u64) -> Branch {
        Box::pin(async move {
            let Some(parents) = self.expand_family(id).await else {
                return;
            };
            self.stats.record_depth(depth);

            let branches: Vec<_> = parents
                .into_iter()
                .map(|parent| {
                    tokio::spawn(Arc::clone(&self).visit_depth_first(parent, depth + 1))
                })
                .collect();

            for joined in join_all(branches).await {
                if let Err(e) = joined {
                    warn!(error = %e, "depth-first branch failed");
                }
            }
        })
    }

    async fn visit_breadth_first(self: &Arc<Self>, root: FamilyId) {
        let mut frontier = if root.is_valid() { vec![root] } else { Vec::new() };
        let mut generation = 0u64;

        while !frontier.is_empty() {
            generation += 1;
            debug!(generation, families = frontier.len(), "expanding generation");

            let handles: Vec<_> = frontier
                .into_iter()
                .map(|id| {
                    let run = Arc::clone(self);
                    tokio::spawn(async move { run.expand_family(id).await.unwrap_or_default() })
                })
                .collect();

            // Level barrier: each task finishes its person lookups before it
            // yields parent ids, so the whole generation is in.
            let mut discovered = Vec::new();
            for joined in join_all(handles).await {
                match joined {
                    Ok(parents) => discovered.extend(parents),
                    Err(e) => warn!(error = %e, "breadth-first expansion failed"),
                }
            }

            self.stats.record_generation();
            frontier = self.next_frontier(discovered).await;
        }
    }

    /// Positive, distinct, not yet claimed
    async fn next_frontier(&self, mut discovered: Vec<FamilyId>) -> Vec<FamilyId> {
        discovered.retain(|id| id.is_valid());
        discovered.sort();
        discovered.dedup();

        let mut frontier = Vec::with_capacity(discovered.len());
        for id in discovered {
            if !self.visited.families.is_claimed(id).await {
                frontier.push(id);
            }
        }
        frontier
    }
}

/// Rebuilds a pedigree from a [`RecordFetcher`]
///
/// Each call to a `run_*` method starts from an empty tree and empty
/// visited sets, so one crawler can serve several runs, even at once.
#[derive(Clone)]
pub struct Crawler {
    fetcher: Arc<dyn RecordFetcher>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn RecordFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn run(&self, strategy: Strategy, root: FamilyId) -> TreeSnapshot {
        let start = Instant::now();
        let run = CrawlRun::new(Arc::clone(&self.fetcher));

        if root.is_valid() {
            info!(root = %root, %strategy, "starting traversal");
        } else {
            debug!(root = %root, "nothing to traverse");
        }

        match strategy {
            Strategy::DepthFirst => Arc::clone(&run).visit_depth_first(root, 1).await,
            Strategy::BreadthFirst => run.visit_breadth_first(root).await,
        }

        let stats = run.stats.summary();
        let aggregator = Arc::clone(&run.tree);
        drop(run);
        let tree = aggregator.into_tree().await;
        let elapsed = start.elapsed();

        info!(
            %strategy,
            families = tree.family_count(),
            people = tree.person_count(),
            requests = stats.total_requests(),
            elapsed_ms = elapsed.as_millis() as u64,
            "traversal complete"
        );

        TreeSnapshot {
            tree,
            success: true,
            strategy,
            root,
            stats,
            elapsed,
        }
    }

    pub async fn run_depth_first(&self, root: FamilyId) -> TreeSnapshot {
        self.run(Strategy::DepthFirst, root).await
    }

    pub async fn run_breadth_first(&self, root: FamilyId) -> TreeSnapshot {
        self.run(Strategy::BreadthFirst, root).await
    }
}
