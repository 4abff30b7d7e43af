//! Business insight advisory.
//!
//! An [`AdvisoryClient`] turns a snapshot of the catalog and recent sales into a
//! short [`Insight`]. [`HttpAdvisoryClient`] talks to a JSON endpoint; tests
//! substitute their own client.
//!
//! [`InsightBoard`] owns the panel shown by `/insight show`. Every catalog or
//! ledger mutation bumps its version. A refresh runs in the background; starting
//! another aborts the one in flight, and a result is only published when the
//! catalog version has not moved since the request was built. Failures are logged
//! and leave the previous insight on the panel.

use crate::{
    config::AdvisoryConfig,
    entities::{product, transaction},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Write as _,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Advice returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// One-paragraph assessment
    pub insight: String,
    /// Concrete suggestions, most important first
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Snapshot of the store an insight is generated from.
#[derive(Debug, Clone, Default)]
pub struct InsightRequest {
    /// Every product in the catalog
    pub products: Vec<product::Model>,
    /// Recent SALE transactions, newest first
    pub recent_sales: Vec<transaction::Model>,
}

impl InsightRequest {
    /// Builds a request from loaded rows, keeping only SALE transactions.
    #[must_use]
    pub fn from_snapshot(
        products: Vec<product::Model>,
        transactions: Vec<transaction::Model>,
    ) -> Self {
        Self {
            products,
            recent_sales: transactions.into_iter().filter(transaction::Model::is_sale).collect(),
        }
    }

    /// Plain-text prompt describing the snapshot.
    #[must_use]
    pub fn to_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are advising a small retail store. Review the inventory and recent sales \
             below and reply with a short assessment and a list of recommendations.\n\n",
        );

        prompt.push_str("Inventory (name | sku | quantity | reorder threshold | price | cost):\n");
        if self.products.is_empty() {
            prompt.push_str("- (no products)\n");
        }
        for p in &self.products {
            let _ = writeln!(
                prompt,
                "- {} | {} | {} | {} | {:.2} | {:.2}",
                p.name, p.sku, p.quantity, p.min_threshold, p.price, p.cost_price
            );
        }

        prompt.push_str("\nRecent sales (timestamp | total | cost):\n");
        if self.recent_sales.is_empty() {
            prompt.push_str("- (no sales yet)\n");
        }
        for t in &self.recent_sales {
            let _ = writeln!(
                prompt,
                "- {} | {:.2} | {:.2}",
                t.timestamp.format("%Y-%m-%d %H:%M"),
                t.total,
                t.total_cost
            );
        }
        prompt
    }
}

/// Source of business insights.
#[async_trait]
pub trait AdvisoryClient: Send + Sync {
    /// Generates an insight for `request`.
    ///
    /// # Errors
    /// Returns [`Error::AdvisoryUnavailable`] when no insight could be produced.
    async fn generate_insight(&self, request: &InsightRequest) -> Result<Insight>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// [`AdvisoryClient`] that POSTs `{model, prompt}` to a JSON endpoint.
pub struct HttpAdvisoryClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpAdvisoryClient {
    /// Builds a client for the configured endpoint. `api_key` is sent as a bearer token.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if no endpoint is configured, or [`Error::Http`]
    /// if the HTTP client cannot be built.
    pub fn new(config: &AdvisoryConfig, api_key: Option<String>) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(Error::Config {
                message: "advisory.endpoint must be set to enable insights".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim().to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }
}

#[async_trait]
impl AdvisoryClient for HttpAdvisoryClient {
    async fn generate_insight(&self, request: &InsightRequest) -> Result<Insight> {
        let prompt = request.to_prompt();
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| Error::AdvisoryUnavailable {
            message: format!("request failed: {e}"),
        })?;

        if !response.status().is_success() {
            return Err(Error::AdvisoryUnavailable {
                message: format!("service returned status {}", response.status()),
            });
        }

        response
            .json::<Insight>()
            .await
            .map_err(|e| Error::AdvisoryUnavailable {
                message: format!("unreadable response: {e}"),
            })
    }
}

/// What `/insight show` displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightPanel {
    /// Latest published insight
    pub insight: Option<Insight>,
    /// A refresh is in flight
    pub loading: bool,
    /// Catalog version the insight was generated for
    pub version: Option<u64>,
    /// When the insight was published
    pub updated_at: Option<DateTime<Utc>>,
    /// Message of the last failed refresh, cleared on success
    pub last_error: Option<String>,
}

struct InsightTask {
    request_id: u64,
    handle: JoinHandle<()>,
}

/// Shared insight panel plus the background refresh that feeds it.
#[derive(Default)]
pub struct InsightBoard {
    version: AtomicU64,
    latest_request: AtomicU64,
    panel: Mutex<InsightPanel>,
    task: Mutex<Option<InsightTask>>,
}

impl InsightBoard {
    /// An empty board at catalog version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current catalog version.
    #[must_use]
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Records a catalog or ledger mutation and returns the new version.
    pub fn bump_version(&self) -> u64 {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(version, "Catalog version bumped");
        version
    }

    /// Copy of the panel.
    #[must_use]
    pub fn snapshot(&self) -> InsightPanel {
        self.panel.lock().clone()
    }

    /// Whether the published insight predates the current catalog version.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        let panel = self.panel.lock();
        panel.insight.is_some() && panel.version != Some(self.current_version())
    }

    /// Starts a background refresh with `client` and returns its request id.
    ///
    /// Any refresh already in flight is aborted.
    pub fn refresh(
        self: &Arc<Self>,
        client: Arc<dyn AdvisoryClient>,
        request: InsightRequest,
    ) -> u64 {
        let version = self.current_version();

        // Ids are handed out under the task lock so the stored task is always the newest.
        let mut task = self.task.lock();
        let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.panel.lock().loading = true;

        let board = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = client.generate_insight(&request).await;
            board.complete(request_id, version, result);
        });

        if let Some(previous) = task.replace(InsightTask { request_id, handle }) {
            previous.handle.abort();
            debug!(request_id = previous.request_id, "Aborted superseded insight refresh");
        }
        drop(task);

        info!(request_id, version, "Insight refresh started");
        request_id
    }

    /// Waits for the refresh in flight, if any, to finish.
    pub async fn wait_idle(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            // An aborted task resolves to a JoinError; there is nothing to report.
            let _ = task.handle.await;
        }
    }

    /// Publishes the outcome of a refresh. Returns whether the panel's insight changed.
    fn complete(&self, request_id: u64, version: u64, result: Result<Insight>) -> bool {
        let mut panel = self.panel.lock();
        if self.latest_request.load(Ordering::SeqCst) != request_id {
            debug!(request_id, "Dropped result of superseded insight refresh");
            return false;
        }
        panel.loading = false;

        match result {
            Ok(insight) if version == self.current_version() => {
                panel.insight = Some(insight);
                panel.version = Some(version);
                panel.updated_at = Some(Utc::now());
                panel.last_error = None;
                info!(request_id, version, "Insight published");
                true
            }
            Ok(_) => {
                debug!(
                    request_id,
                    version,
                    current = self.current_version(),
                    "Discarded stale insight"
                );
                false
            }
            Err(e) => {
                warn!(request_id, error = %e, "Insight refresh failed");
                panel.last_error = Some(e.to_string());
                false
            }
        }
    }
}
