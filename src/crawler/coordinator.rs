//! Crawler coordinator - main crawl orchestration logic
//!
//! The crawl is a batch-synchronous breadth-first traversal. Each round:
//! 1. Builds the fetch set from the frontier (exclusions dropped, addresses
//!    canonicalized, already visited addresses skipped)
//! 2. Fetches the whole set concurrently and waits for every fetch
//! 3. Extracts links from successful pages on the root host, concurrently,
//!    and waits for every extraction
//! 4. Queues new addresses as the next frontier and records the round's
//!    outcomes as visited
//!
//! Round n+1 never starts before both waits of round n are over. Within a
//! round, tasks only hand their outcome back through the join set; the
//! frontier and visited map are touched by the coordinator alone, between
//! the two waits.

use crate::config::{validate_crawl_options, CrawlOptions};
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::{FetchGateway, FetchOutcome, HttpGateway};
use crate::crawler::progress::Progress;
use crate::crawler::result::CrawlResult;
use crate::quirks::Quirks;
use crate::url::{normalize_parsed, same_host};
use crate::LinkSpectorError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    root: Url,
    options: CrawlOptions,
    gateway: Arc<dyn FetchGateway>,
    quirks: Arc<Quirks>,
    progress: Arc<Progress>,
}

impl Coordinator {
    /// Creates a coordinator that fetches through an [`HttpGateway`]
    ///
    /// # Arguments
    ///
    /// * `root` - The address the crawl starts from
    /// * `options` - Options for the whole lifetime of the coordinator
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(LinkSpectorError)` - Invalid root address or options, or HTTP client setup failure
    pub fn new(root: Url, options: CrawlOptions) -> Result<Self, LinkSpectorError> {
        validate_crawl_options(&options)?;
        let gateway = HttpGateway::new(&options)?;
        Self::with_gateway(root, options, Arc::new(gateway))
    }

    /// Creates a coordinator around any [`FetchGateway`]
    ///
    /// Fails if the root is not an HTTP(S) address or the options are out
    /// of range.
    pub fn with_gateway(
        root: Url,
        options: CrawlOptions,
        gateway: Arc<dyn FetchGateway>,
    ) -> Result<Self, LinkSpectorError> {
        validate_crawl_options(&options)?;
        let root = normalize_parsed(root)?;

        Ok(Self {
            root,
            options,
            gateway,
            quirks: Arc::new(Quirks::default()),
            progress: Arc::new(Progress::new()),
        })
    }

    /// Replaces the built-in quirks, e.g. to add configured exclusions
    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = Arc::new(quirks);
        self
    }

    /// The normalized root address
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Live counters for a progress reporter
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// The gateway this coordinator fetches through
    ///
    /// Calling [`FetchGateway::stop`] on it winds a running crawl down:
    /// remaining fetches fail immediately and the crawl finishes with what
    /// it has.
    pub fn gateway(&self) -> Arc<dyn FetchGateway> {
        Arc::clone(&self.gateway)
    }

    /// Runs one full crawl from the root address
    ///
    /// Every call starts from scratch with an empty frontier and visited
    /// map. The returned results are sorted by address.
    pub async fn run(&self) -> Vec<CrawlResult> {
        tracing::info!("Starting crawl of {}", self.root);
        let start_time = Instant::now();
        self.progress.reset();

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_fetches));
        let last_round = self.options.last_round();

        let mut frontier: HashSet<Url> = HashSet::from([self.root.clone()]);
        let mut visited: HashMap<Url, FetchOutcome> = HashMap::new();
        let mut round = 0usize;

        while !frontier.is_empty() {
            if last_round.is_some_and(|last| round > last) {
                tracing::info!(
                    "Non-recursive crawl stops after round {}, {} addresses left unchecked",
                    round - 1,
                    frontier.len()
                );
                break;
            }

            let fetch_set = self.build_fetch_set(std::mem::take(&mut frontier), &visited);
            tracing::info!("Round {}: fetching {} addresses", round, fetch_set.len());

            let mut outcomes = self.fetch_all(fetch_set, &semaphore).await;
            let discovered = self.extract_all(&mut outcomes).await;

            for url in discovered {
                let url = self.quirks.canonicalize(&url);
                if visited.contains_key(&url) || outcomes.contains_key(&url) {
                    continue;
                }
                if self.quirks.excludes(&url) {
                    tracing::debug!("Not queueing excluded address {}", url);
                    continue;
                }
                if frontier.insert(url) {
                    self.progress.record_discovered();
                }
            }

            for (url, outcome) in outcomes {
                visited.entry(url).or_insert(outcome);
            }

            tracing::debug!(
                "Round {} done: {} visited, {} queued",
                round,
                visited.len(),
                frontier.len()
            );
            round += 1;
        }

        let results = self.collect_results(visited);
        tracing::info!(
            "Crawl completed: {} addresses checked in {:?}",
            results.len(),
            start_time.elapsed()
        );
        results
    }

    /// Applies exclusion and canonicalization to the frontier
    fn build_fetch_set(
        &self,
        frontier: HashSet<Url>,
        visited: &HashMap<Url, FetchOutcome>,
    ) -> HashSet<Url> {
        let mut fetch_set = HashSet::with_capacity(frontier.len());

        for url in frontier {
            if self.quirks.excludes(&url) {
                tracing::debug!("Skipping excluded address {}", url);
                continue;
            }

            let canonical = self.quirks.canonicalize(&url);
            if visited.contains_key(&canonical) {
                continue;
            }
            fetch_set.insert(canonical);
        }

        fetch_set
    }

    /// Fetches every address concurrently and waits for all of them
    async fn fetch_all(
        &self,
        fetch_set: HashSet<Url>,
        semaphore: &Arc<Semaphore>,
    ) -> HashMap<Url, FetchOutcome> {
        let mut tasks = JoinSet::new();

        for url in fetch_set {
            let gateway = Arc::clone(&self.gateway);
            let semaphore = Arc::clone(semaphore);
            let progress = Arc::clone(&self.progress);

            tasks.spawn(async move {
                // The permit is held for the whole request
                let _permit = semaphore.acquire_owned().await.ok();
                tracing::debug!("Requesting {}", url);
                let outcome = gateway.fetch(&url).await;
                progress.record_visited();
                (url, outcome)
            });
        }

        let mut outcomes = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, outcome)) => {
                    match &outcome {
                        Ok(response) => {
                            tracing::debug!("{} answered {}", url, response.status_code)
                        }
                        Err(e) => tracing::warn!("{}", e),
                    }
                    outcomes.insert(url, outcome);
                }
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }

        outcomes
    }

    /// Extracts links from every successful page on the root host
    ///
    /// Host scope and relative links both follow the address a page was
    /// finally served from, so a redirect off the root host ends recursion
    /// there. Page bodies are moved out of the outcomes: once links are extracted
    /// nothing reads them again.
    async fn extract_all(&self, outcomes: &mut HashMap<Url, FetchOutcome>) -> HashSet<Url> {
        let mut tasks = JoinSet::new();

        for outcome in outcomes.values_mut() {
            let Ok(response) = outcome else {
                continue;
            };
            if response.status_code != 200 || !same_host(&response.final_url, &self.root) {
                continue;
            }

            let body = std::mem::take(&mut response.body);
            let content_type = response.content_type.clone();
            let base = response.final_url.clone();
            tasks.spawn_blocking(move || extract_links(&body, &content_type, &base));
        }

        let mut discovered = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(links) => discovered.extend(links),
                Err(e) => tracing::error!("Link extraction task failed: {}", e),
            }
        }

        discovered
    }

    /// Turns the visited map into the final result list
    fn collect_results(&self, visited: HashMap<Url, FetchOutcome>) -> Vec<CrawlResult> {
        let mut results: Vec<CrawlResult> = visited
            .into_iter()
            .map(|(url, outcome)| match outcome {
                Ok(response) => {
                    let verdict = self.quirks.reinterpret(&url, &response);
                    CrawlResult {
                        url,
                        status_code: verdict.status_code,
                        status_text: verdict.status_text,
                        is_quirky: verdict.is_quirky,
                    }
                }
                Err(_) => CrawlResult::exception(url),
            })
            .collect();

        results.sort_by(|a, b| a.url.as_str().cmp(b.url.as_str()));
        results
    }
}

/// Crawls from `root` with the given options and returns every result
///
/// # Example
///
/// ```no_run
/// use linkspector::config::CrawlOptions;
/// use linkspector::crawler::run_crawl;
/// use linkspector::quirks::Quirks;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let root = Url::parse("https://example.com/")?;
/// let results = run_crawl(root, CrawlOptions::default(), Quirks::default()).await?;
/// println!("{} links checked", results.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    root: Url,
    options: CrawlOptions,
    quirks: Quirks,
) -> Result<Vec<CrawlResult>, LinkSpectorError> {
    let coordinator = Coordinator::new(root, options)?.with_quirks(quirks);
    Ok(coordinator.run().await)
}
