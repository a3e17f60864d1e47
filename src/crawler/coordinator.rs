//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier
//! - Dispatching visits as concurrent tasks
//! - Coordinating claim, fetch, persist, link extraction and recursion
//! - Post-crawl normalization and sitemap export

use crate::config::Config;
use crate::crawler::fetcher::FetchEngine;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::scheduler::{CrawlTask, Frontier, PendingGuard, WorkerPool};
use crate::output::{write_sitemap, CrawlStats, CrawlSummary};
use crate::state::CrawlGraph;
use crate::storage::{normalize_save_root, ContentStore};
use crate::url::{page_key, UriGate};
use crate::{GraphError, MirrorError};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use url::Url;

/// Components shared by every crawl task
struct CrawlContext {
    gate: Arc<UriGate>,
    graph: Arc<CrawlGraph>,
    fetcher: FetchEngine,
    store: ContentStore,
    extractor: Arc<dyn LinkExtractor>,
    workers: WorkerPool,
    stats: CrawlStats,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    ctx: Arc<CrawlContext>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The configuration is expected to be validated already.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, MirrorError> {
        Self::with_extractor(config, Arc::new(HtmlLinkExtractor))
    }

    /// Creates a coordinator that uses a custom link extractor
    pub fn with_extractor(
        config: Config,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Result<Self, MirrorError> {
        let gate = Arc::new(UriGate::new(config.allowed_domains.iter().cloned()));
        let fetcher = FetchEngine::from_config(&config, Arc::clone(&gate))?;

        let ctx = CrawlContext {
            gate,
            graph: Arc::new(CrawlGraph::new()),
            fetcher,
            store: ContentStore::new(config.save_to.clone()),
            extractor,
            workers: WorkerPool::new(config.max_workers),
            stats: CrawlStats::new(),
        };

        Ok(Self {
            config: Arc::new(config),
            ctx: Arc::new(ctx),
        })
    }

    /// The crawl graph built so far
    pub fn graph(&self) -> Arc<CrawlGraph> {
        Arc::clone(&self.ctx.graph)
    }

    /// Crawls from the given seeds until no work remains
    ///
    /// Seeds refused by the gate are skipped. Per-page failures are logged and
    /// absorbed; only a crawl-graph invariant violation is returned as an error.
    pub async fn crawl(&self, seeds: &[Url]) -> Result<CrawlSummary, MirrorError> {
        let frontier = Arc::new(Frontier::new());

        for seed in seeds {
            if !self.ctx.gate.can_crawl(seed) {
                CrawlStats::bump(&self.ctx.stats.gate_rejections);
                continue;
            }
            CrawlStats::bump(&self.ctx.stats.tasks_spawned);
            frontier.push(CrawlTask::seed(seed.clone()));
        }

        tracing::info!(
            "Starting crawl with {} seed(s) and {} worker(s)",
            frontier.pending(),
            self.ctx.workers.size()
        );

        let mut tasks = JoinSet::new();
        let mut violation: Option<GraphError> = None;

        // Finished tasks are reaped while dispatching continues
        loop {
            tokio::select! {
                next = frontier.next() => {
                    let Some(task) = next else { break };
                    let ctx = Arc::clone(&self.ctx);
                    let guard = PendingGuard::new(Arc::clone(&frontier));
                    let frontier = Arc::clone(&frontier);
                    tasks.spawn(async move {
                        let _guard = guard;
                        ctx.visit(task, &frontier).await
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    record_outcome(joined, &mut violation);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            record_outcome(joined, &mut violation);
        }

        let summary = self.ctx.stats.snapshot(self.ctx.graph.edge_count());
        tracing::info!(
            "Crawl completed: {} pages fetched, {} failed, {} claimed",
            summary.pages_fetched,
            summary.fetch_failures,
            summary.pages_claimed
        );

        match violation {
            Some(e) => Err(e.into()),
            None => Ok(summary),
        }
    }

    /// Runs the post-crawl passes under the save root, if one is configured
    ///
    /// Normalizes each allow-listed domain directory and writes `sitemap.dot`.
    pub async fn finish(&self) -> Result<(), MirrorError> {
        let Some(root) = self.config.save_to.clone() else {
            return Ok(());
        };

        let gate = Arc::clone(&self.ctx.gate);
        let normalize_root = root.clone();
        let collapsed = tokio::task::spawn_blocking(move || {
            normalize_save_root(&normalize_root, gate.domains())
        })
        .await??;
        tracing::info!("Normalized save root, {} page(s) collapsed", collapsed);

        write_sitemap(&self.ctx.graph, &root).await?;
        Ok(())
    }
}

impl CrawlContext {
    /// Visits one page
    ///
    /// 1. Claim the page key; a lost claim ends the task
    /// 2. Fetch while holding a worker slot
    /// 3. Persist the content and record the discovery edge
    /// 4. Queue every unclaimed, allow-listed link
    async fn visit(&self, task: CrawlTask, frontier: &Frontier) -> Result<(), GraphError> {
        let key = page_key(&task.url);
        if !self.graph.try_visit(&key) {
            tracing::debug!("Already claimed: {}", key);
            CrawlStats::bump(&self.stats.duplicate_claims);
            return Ok(());
        }
        CrawlStats::bump(&self.stats.pages_claimed);

        let fetched = {
            let Some(_slot) = self.workers.acquire().await else {
                tracing::error!("Worker pool closed, dropping {}", task.url);
                return Ok(());
            };
            self.fetcher.fetch(&task.url).await
        };

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::debug!("Fetch failed: {}", e);
                CrawlStats::bump(&self.stats.fetch_failures);
                return Ok(());
            }
        };
        CrawlStats::bump(&self.stats.pages_fetched);

        match self.store.save(&fetched).await {
            Ok(Some(_)) => CrawlStats::bump(&self.stats.pages_saved),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", fetched.final_url, e);
                CrawlStats::bump(&self.stats.save_failures);
            }
        }

        if let Some(referrer) = &task.referrer {
            self.graph.add_edge(&page_key(referrer), &key)?;
        }

        let links = self
            .extractor
            .extract(&fetched.body, &fetched.content_type, &fetched.final_url);
        self.stats
            .links_discovered
            .fetch_add(links.len() as u64, std::sync::atomic::Ordering::Relaxed);

        for link in links {
            if !self.gate.can_crawl(&link) {
                CrawlStats::bump(&self.stats.gate_rejections);
                continue;
            }
            if self.graph.contains(&page_key(&link)) {
                continue;
            }
            CrawlStats::bump(&self.stats.tasks_spawned);
            frontier.push(CrawlTask::discovered(link, task.url.clone()));
        }

        Ok(())
    }
}

/// Logs the outcome of a finished crawl task, keeping the first graph violation
fn record_outcome(
    joined: Result<Result<(), GraphError>, JoinError>,
    violation: &mut Option<GraphError>,
) {
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!("{}", e);
            violation.get_or_insert(e);
        }
        Err(e) => tracing::error!("Crawl task failed: {}", e),
    }
}

/// Runs a complete crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the coordinator from the configuration
/// 2. Crawl from the configured start URIs
/// 3. Normalize mirrored directories (when saving)
/// 4. Write `sitemap.dot` (when saving)
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::load_config;
/// use sumi_mirror::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} pages fetched", summary.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, MirrorError> {
    crate::config::validate(&config)?;

    let seeds = config
        .start_uris
        .iter()
        .map(|s| Url::parse(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| crate::ConfigError::InvalidSeeds(config.start_uris.clone()))?;

    let coordinator = Coordinator::new(config)?;
    let summary = coordinator.crawl(&seeds).await?;
    coordinator.finish().await?;
    Ok(summary)
}
