//! Product Feed
//!
//! Pagination and search over a catalog snapshot. The whole catalog is
//! fetched in one bulk call and paged client-side; searches always run over
//! the full snapshot, never just the window currently displayed.
//!
//! State lives behind a short-lived mutex that is never held across an
//! `.await`. Collaborator calls run with the lock released and their results
//! re-enter the state afterwards, guarded by in-flight flags and counters so
//! that overlapping calls either no-op or discard stale results.

use crate::shopping_assistant::ShoppingAssistant;
use ephone_core::config::FeedConfig;
use ephone_core::error::Result;
use ephone_core::product::{CatalogClient, Product, ProductId, dedup_by_id, filter_products};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Error state surfaced after a failed catalog load.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load products. Please try again.";

/// Result of [`ProductFeed::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { total: usize, displayed: usize },
    /// Another load was already in flight.
    AlreadyLoading,
}

/// Result of [`ProductFeed::load_more`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Appended {
        added: usize,
        cursor: usize,
        has_more: bool,
    },
    /// A load or another page append is in flight.
    Busy,
    /// Paging is disabled while a search query is active.
    Searching,
    /// The window already covers the whole snapshot.
    Exhausted,
    /// The snapshot was replaced while the page was pending.
    Superseded,
}

/// Result of [`ProductFeed::ai_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiSearchOutcome {
    /// Empty query: the paginated window is shown again.
    Cleared,
    /// The AI ranking replaced the provisional result.
    Refined { results: usize },
    /// The AI call failed; the local result stays.
    Provisional { results: usize },
    /// A newer search or load happened first; the AI ranking was dropped.
    Stale,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView {
    /// Products to render: the window when no query is set, the search result otherwise.
    pub products: Vec<Product>,
    pub query: String,
    pub loading: bool,
    pub refining: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub cursor: usize,
    pub catalog_len: usize,
}

#[derive(Default)]
struct FeedState {
    catalog: Arc<Vec<Product>>,
    displayed: Vec<Product>,
    cursor: usize,
    query: String,
    filtered: Vec<Product>,
    fetching: bool,
    paging: bool,
    refining: Option<u64>,
    error: Option<String>,
    /// Bumped by every search, load and refresh; AI results carry the value
    /// they started with.
    search_epoch: u64,
    /// Bumped whenever the snapshot is replaced or discarded.
    snapshot_generation: u64,
}

impl FeedState {
    fn has_more(&self) -> bool {
        self.cursor < self.catalog.len()
    }

    fn is_searching(&self) -> bool {
        !self.query.trim().is_empty()
    }

    fn visible(&self) -> &[Product] {
        if self.is_searching() {
            &self.filtered
        } else {
            &self.displayed
        }
    }
}

enum InFlight {
    Fetching,
    Paging,
    Refining(u64),
}

/// Clears an in-flight marker when the owning call finishes or is dropped.
struct InFlightGuard<'a> {
    state: &'a Mutex<FeedState>,
    kind: InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock_state(self.state);
        match self.kind {
            InFlight::Fetching => state.fetching = false,
            InFlight::Paging => state.paging = false,
            InFlight::Refining(epoch) => {
                if state.refining == Some(epoch) {
                    state.refining = None;
                }
            }
        }
    }
}

fn lock_state(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Paginated, searchable product listing.
pub struct ProductFeed {
    catalog: Arc<dyn CatalogClient>,
    assistant: Arc<ShoppingAssistant>,
    page_size: usize,
    load_more_delay: Duration,
    state: Mutex<FeedState>,
}

impl ProductFeed {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        assistant: Arc<ShoppingAssistant>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            catalog,
            assistant,
            page_size: config.page_size.max(1),
            load_more_delay: Duration::from_millis(config.load_more_delay_ms),
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Snapshot of everything the presentation layer needs.
    pub fn snapshot(&self) -> FeedView {
        let state = self.lock();
        FeedView {
            products: state.visible().to_vec(),
            query: state.query.clone(),
            loading: state.fetching || state.paging,
            refining: state.refining.is_some(),
            error: state.error.clone(),
            has_more: state.has_more(),
            cursor: state.cursor,
            catalog_len: state.catalog.len(),
        }
    }

    /// The full catalog snapshot.
    pub fn catalog(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.lock().catalog)
    }

    /// Fetches the entire catalog and shows its first page.
    ///
    /// On failure the previous snapshot and window are kept, the error state
    /// is set, and the error is returned.
    pub async fn load(&self) -> Result<LoadOutcome> {
        {
            let mut state = self.lock();
            if state.fetching {
                tracing::debug!("Load already in flight");
                return Ok(LoadOutcome::AlreadyLoading);
            }
            state.fetching = true;
            state.error = None;
        }
        let _guard = self.guard(InFlight::Fetching);

        match self.catalog.list_all().await {
            Ok(products) => {
                let products = dedup_by_id(products);
                let total = products.len();
                let displayed = self.page_size.min(total);

                let mut state = self.lock();
                state.displayed = products[..displayed].to_vec();
                state.cursor = displayed;
                state.catalog = Arc::new(products);
                state.query.clear();
                state.filtered.clear();
                state.search_epoch += 1;
                state.snapshot_generation += 1;

                tracing::info!(total, displayed, "Catalog loaded");
                Ok(LoadOutcome::Loaded { total, displayed })
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load products");
                self.lock().error = Some(LOAD_ERROR_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    /// Appends the next page of the snapshot to the displayed window.
    ///
    /// No-op while a load or another page is in flight, while searching, and
    /// once the window covers the whole snapshot.
    pub async fn load_more(&self) -> PageOutcome {
        let generation = {
            let mut state = self.lock();
            if state.fetching || state.paging {
                tracing::debug!(
                    fetching = state.fetching,
                    paging = state.paging,
                    "load_more blocked"
                );
                return PageOutcome::Busy;
            }
            if state.is_searching() {
                return PageOutcome::Searching;
            }
            if !state.has_more() {
                return PageOutcome::Exhausted;
            }
            state.paging = true;
            state.snapshot_generation
        };
        let _guard = self.guard(InFlight::Paging);

        if !self.load_more_delay.is_zero() {
            tokio::time::sleep(self.load_more_delay).await;
        }

        let mut state = self.lock();
        if state.snapshot_generation != generation {
            return PageOutcome::Superseded;
        }

        let catalog = Arc::clone(&state.catalog);
        let start = state.cursor;
        let end = (start + self.page_size).min(catalog.len());

        let known: HashSet<ProductId> = state.displayed.iter().map(|p| p.id).collect();
        let batch: Vec<Product> = catalog[start..end]
            .iter()
            .filter(|p| !known.contains(&p.id))
            .cloned()
            .collect();
        let added = batch.len();

        state.displayed.extend(batch);
        state.cursor = end;
        let has_more = state.has_more();

        tracing::debug!(added, cursor = end, has_more, "Appended page");
        PageOutcome::Appended {
            added,
            cursor: end,
            has_more,
        }
    }

    /// Discards snapshot, window and query, then loads from scratch.
    ///
    /// The client's cache is dropped first so the bulk call reaches the source.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        {
            let mut state = self.lock();
            state.catalog = Arc::default();
            state.displayed.clear();
            state.filtered.clear();
            state.query.clear();
            state.cursor = 0;
            state.error = None;
            state.search_epoch += 1;
            state.snapshot_generation += 1;
        }
        tracing::info!("Refreshing catalog");
        self.catalog.invalidate().await;
        self.load().await
    }

    /// Plain local search over the full snapshot.
    ///
    /// An empty query shows the paginated window again. Returns the products
    /// now visible.
    pub fn search(&self, query: &str) -> Vec<Product> {
        let mut state = self.lock();
        state.search_epoch += 1;
        state.query = query.to_string();

        if !state.is_searching() {
            state.filtered.clear();
            return state.displayed.clone();
        }

        let filtered = filter_products(&state.catalog, query);
        tracing::debug!(query, results = filtered.len(), "Local search");
        state.filtered = filtered;
        state.filtered.clone()
    }

    /// Search with an AI-ranked refinement.
    ///
    /// The local match is applied immediately as a provisional result, then
    /// replaced by the AI ranking if it arrives before any newer search or
    /// load. AI failures keep the provisional result and are only logged.
    pub async fn ai_search(&self, query: &str) -> AiSearchOutcome {
        if query.trim().is_empty() {
            self.search(query);
            return AiSearchOutcome::Cleared;
        }

        let (epoch, catalog, provisional) = {
            let mut state = self.lock();
            state.search_epoch += 1;
            state.query = query.to_string();
            let filtered = filter_products(&state.catalog, query);
            state.filtered = filtered;
            state.refining = Some(state.search_epoch);
            (
                state.search_epoch,
                Arc::clone(&state.catalog),
                state.filtered.len(),
            )
        };
        let _guard = self.guard(InFlight::Refining(epoch));

        match self.assistant.rank_search(query, &catalog).await {
            Ok(ranked) => {
                let mut state = self.lock();
                if state.search_epoch != epoch {
                    tracing::debug!(query, "Discarding stale AI search result");
                    return AiSearchOutcome::Stale;
                }
                let results = ranked.len();
                state.filtered = ranked;
                tracing::debug!(query, results, "AI search refined results");
                AiSearchOutcome::Refined { results }
            }
            Err(err) => {
                if self.lock().search_epoch != epoch {
                    tracing::debug!(query, error = %err, "AI search failed after being superseded");
                    return AiSearchOutcome::Stale;
                }
                tracing::warn!(query, error = %err, "AI search failed, using basic results");
                AiSearchOutcome::Provisional {
                    results: provisional,
                }
            }
        }
    }

    /// Looks a product up in the snapshot, falling back to the catalog API.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        let cached = self.lock().catalog.iter().find(|p| p.id == id).cloned();
        match cached {
            Some(product) => Ok(product),
            None => self.catalog.get_product(id).await,
        }
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.catalog.list_categories().await
    }

    fn guard(&self, kind: InFlight) -> InFlightGuard<'_> {
        InFlightGuard {
            state: &self.state,
            kind,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        lock_state(&self.state)
    }
}
