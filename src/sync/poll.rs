//! Progress poll loop.
//!
//! Every interval a tick is spawned as its own task: fetch the batch, then
//! reconcile it into the shared page under a single write lock. Ticks are not
//! serialized against each other, so a slow response never holds back the
//! next one; whichever batch is applied last wins. With
//! `discard_stale_ticks`, a batch whose tick was issued before the last
//! applied one is dropped instead.

use super::error::{SyncError, SyncResult};
use super::format::DisplayOptions;
use super::reconcile::{reconcile_batch, ReconcileReport};
use super::snapshot::{parse_batch, DownloadSnapshot};
use crate::page::document::Page;
use crate::page::markup::{ATTR_DATA_PAGE, VIEW_DOWNLOADS};
use reqwest::header::ACCEPT;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use url::Url;

/// Page shared between the poll loop and its readers
pub type SharedPage = Arc<RwLock<Page>>;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub endpoint: Url,
    pub interval: Duration,
    pub discard_stale_ticks: bool,
    pub display: DisplayOptions,
}

impl PollOptions {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            interval: DEFAULT_INTERVAL,
            discard_stale_ticks: false,
            display: DisplayOptions::default(),
        }
    }

    /// Parse an absolute http(s) endpoint URL
    pub fn parse_endpoint(raw: &str) -> SyncResult<Url> {
        let url = Url::parse(raw).map_err(|e| SyncError::invalid_endpoint(raw, e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SyncError::invalid_endpoint(
                raw,
                format!("unsupported scheme '{}'", other),
            )),
        }
    }
}

/// HTTP client for progress requests. No timeout unless one is given.
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> SyncResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Fetch the current batch of snapshots
pub async fn fetch_snapshots(client: &reqwest::Client, endpoint: &Url) -> SyncResult<Vec<DownloadSnapshot>> {
    let response = client
        .get(endpoint.clone())
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    Ok(parse_batch(&body)?)
}

/// True when the page is the downloads listing
pub fn is_listing_view(page: &Page) -> bool {
    page.attr(page.body(), ATTR_DATA_PAGE) == Some(VIEW_DOWNLOADS)
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Batch reconciled into the page
    Applied(ReconcileReport),
    /// Non-success status; page left as is
    Rejected(u16),
    /// Transport or decode failure; page left as is
    Failed,
    /// Batch arrived after a newer one had been applied
    Stale { sequence: u64, last_applied: u64 },
}

#[derive(Clone)]
pub struct PollLoop {
    client: reqwest::Client,
    options: Arc<PollOptions>,
    page: SharedPage,
    issued: Arc<AtomicU64>,
    last_applied: Arc<AtomicU64>,
}

impl PollLoop {
    pub fn new(client: reqwest::Client, options: PollOptions, page: SharedPage) -> Self {
        Self {
            client,
            options: Arc::new(options),
            page,
            issued: Arc::new(AtomicU64::new(0)),
            last_applied: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    /// Sequence number for a newly issued tick (starts at 1)
    pub fn next_sequence(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Sequence of the most recently applied tick, 0 before the first
    pub fn last_applied(&self) -> u64 {
        self.last_applied.load(Ordering::SeqCst)
    }

    /// Run one fetch-and-reconcile cycle
    pub async fn tick(&self) -> TickOutcome {
        let sequence = self.next_sequence();
        tracing::trace!("Progress tick #{} -> {}", sequence, self.options.endpoint);

        match fetch_snapshots(&self.client, &self.options.endpoint).await {
            Ok(batch) => self.apply(sequence, &batch).await,
            Err(SyncError::Status(code)) => {
                tracing::debug!("Progress tick #{} skipped: HTTP {}", sequence, code);
                TickOutcome::Rejected(code)
            }
            Err(e) => {
                tracing::error!("Progress poll failed: {}", e);
                TickOutcome::Failed
            }
        }
    }

    /// Reconcile a fetched batch into the page as tick `sequence`.
    ///
    /// The whole pass runs under one write lock.
    pub async fn apply(&self, sequence: u64, batch: &[DownloadSnapshot]) -> TickOutcome {
        let mut page = self.page.write().await;

        let last_applied = self.last_applied();
        if self.options.discard_stale_ticks && sequence < last_applied {
            tracing::debug!(
                "Discarding progress batch #{} (already applied #{})",
                sequence,
                last_applied
            );
            return TickOutcome::Stale {
                sequence,
                last_applied,
            };
        }

        let report = reconcile_batch(&mut page, batch, &self.options.display);
        self.last_applied.fetch_max(sequence, Ordering::SeqCst);

        tracing::debug!(
            "Applied progress batch #{}: {} rows, {} without row, {} bars",
            sequence,
            report.applied,
            report.skipped,
            report.bars
        );
        TickOutcome::Applied(report)
    }

    /// Spawn a tick every interval, forever. The first tick fires one
    /// interval after start.
    pub async fn run(self) {
        let period = self.options.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Polling {} every {}ms",
            self.options.endpoint,
            period.as_millis()
        );

        loop {
            ticker.tick().await;
            let this = self.clone();
            tokio::spawn(async move {
                this.tick().await;
            });
        }
    }

    /// Start the loop if the page is the downloads listing.
    ///
    /// The view is checked once; on any other view nothing is spawned.
    pub async fn start(self) -> Option<JoinHandle<()>> {
        if !is_listing_view(&*self.page.read().await) {
            tracing::info!("Not on the downloads listing, progress polling disabled");
            return None;
        }
        Some(tokio::spawn(self.run()))
    }
}
