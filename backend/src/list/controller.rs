use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

use super::{ListError, ListQuery, ListRequest, ListResult, ListSource};
use crate::{api::ApiError, config::AppConfig};

/// ListState
///
/// What a listing screen renders: the query in effect, the latest result, and
/// whether a fetch is running or the last one failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub query: ListQuery,
    pub result: ListResult<T>,
    pub loading: bool,
    // Message of the last failed fetch; cleared by the next successful one.
    pub error: Option<String>,
    // Sequence number of the change that produced `result` / `error`. 0 until the
    // first fetch settles.
    pub applied_seq: u64,
    // Request that produced `result`. None until the first successful fetch.
    pub result_request: Option<ListRequest>,
}

impl<T> ListState<T> {
    fn initial(query: ListQuery) -> Self {
        let page_size = query.page_size();
        Self {
            query,
            result: ListResult::new(Vec::new(), 0, page_size),
            loading: true,
            error: None,
            applied_seq: 0,
            result_request: None,
        }
    }
}

// A query revision. `seq` grows by one with every accepted change.
#[derive(Debug, Clone)]
struct Change {
    query: ListQuery,
    seq: u64,
    debounce: bool,
}

/// ListController
///
/// Owns the query of one listing screen and keeps its result synchronized. Every
/// accepted change schedules one fetch on a driver task:
///
/// - free-text edits are debounced, so a burst of keystrokes costs one request
/// - a change arriving while a fetch is in flight cancels that fetch
/// - a response is applied only if its sequence number is still the latest
/// - a failed fetch keeps the previous result and records the error
///
/// Dropping the controller stops the driver.
pub struct ListController<S: ListSource> {
    changes: Arc<watch::Sender<Change>>,
    state: watch::Receiver<ListState<S::Item>>,
    driver: JoinHandle<()>,
}

impl<S: ListSource> ListController<S> {
    /// Starts with the default query and fetches immediately.
    pub fn spawn(source: S, debounce: Duration) -> Self {
        Self::spawn_with(source, ListQuery::default(), debounce)
    }

    /// Like [`ListController::spawn`], debounced by the configured `list_debounce`.
    pub fn from_config(source: S, config: &AppConfig) -> Self {
        Self::spawn(source, config.list_debounce)
    }

    pub fn spawn_with(source: S, initial: ListQuery, debounce: Duration) -> Self {
        let (changes, change_rx) = watch::channel(Change {
            query: initial.clone(),
            seq: 1,
            debounce: false,
        });
        let changes = Arc::new(changes);
        let (state_tx, state) = watch::channel(ListState::initial(initial));

        let driver = tokio::spawn(drive(
            source,
            change_rx,
            Arc::clone(&changes),
            state_tx,
            debounce,
        ));

        Self {
            changes,
            state,
            driver,
        }
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ListState<S::Item>> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> ListState<S::Item> {
        self.state.borrow().clone()
    }

    /// The latest query, including changes not fetched yet.
    pub fn query(&self) -> ListQuery {
        self.changes.borrow().query.clone()
    }

    /// Changes the free-text filter and goes back to page 1. Debounced.
    pub fn set_text_filter(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(true, |query| {
            if query.text_filter == value {
                return false;
            }
            query.text_filter = value;
            query.set_page(1).is_ok()
        });
    }

    /// Changes the category filter and goes back to page 1.
    pub fn set_category_filter(&self, category: Option<String>) {
        let category = category.filter(|id| !id.is_empty());
        self.update(false, |query| {
            if query.category_filter == category {
                return false;
            }
            query.category_filter = category;
            query.set_page(1).is_ok()
        });
    }

    /// Moves to `page`. Rejects 0 and pages past the last known page of the listing
    /// being requested; a rejected page is never requested. While a filter or page
    /// size change is still pending only page 1 is known to exist.
    pub fn set_page(&self, page: u32) -> Result<(), ListError> {
        if page == 0 {
            return Err(ListError::ZeroPage);
        }

        let mut outcome = Ok(());
        self.update(false, |query| {
            let last = self.last_known_page(query);
            if page > last {
                outcome = Err(ListError::PageOutOfRange {
                    requested: page,
                    last,
                });
                return false;
            }
            query.page() != page && query.set_page(page).is_ok()
        });
        outcome
    }

    fn last_known_page(&self, query: &ListQuery) -> u32 {
        let state = self.state.borrow();
        match &state.result_request {
            Some(fetched) if fetched.same_listing(&query.request()) => {
                state.result.total_pages.max(1)
            }
            _ => 1,
        }
    }

    /// Changes the page size and goes back to page 1.
    pub fn set_page_size(&self, page_size: u32) -> Result<(), ListError> {
        if page_size == 0 {
            return Err(ListError::ZeroPageSize);
        }
        self.update(false, |query| {
            query.page_size() != page_size
                && query.set_page_size(page_size).is_ok()
                && query.set_page(1).is_ok()
        });
        Ok(())
    }

    /// Fetches again with the current query, e.g. after a create/edit/delete.
    pub fn refetch(&self) {
        self.changes.send_modify(|change| {
            change.seq += 1;
            change.debounce = false;
        });
    }

    /// Waits until the latest change has been fetched (or has failed) and returns the
    /// resulting state.
    pub async fn settled(&self) -> ListState<S::Item> {
        let target = self.changes.borrow().seq;
        let mut state = self.state.clone();
        match state
            .wait_for(|s| !s.loading && s.applied_seq >= target)
            .await
        {
            Ok(settled) => settled.clone(),
            Err(_) => self.snapshot(),
        }
    }

    fn update(&self, debounce: bool, mutate: impl FnOnce(&mut ListQuery) -> bool) {
        self.changes.send_if_modified(|change| {
            if !mutate(&mut change.query) {
                return false;
            }
            change.seq += 1;
            change.debounce = debounce;
            true
        });
    }
}

impl<S: ListSource> Drop for ListController<S> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive<S: ListSource>(
    source: S,
    mut changes: watch::Receiver<Change>,
    sender: Arc<watch::Sender<Change>>,
    state: watch::Sender<ListState<S::Item>>,
    debounce: Duration,
) {
    let mut pending = Some(changes.borrow_and_update().clone());

    loop {
        let mut change = match pending.take() {
            Some(change) => change,
            None => match next_change(&mut changes).await {
                Some(change) => change,
                None => return,
            },
        };

        if change.debounce {
            change = match settle(&mut changes, change, debounce).await {
                Some(change) => change,
                None => return,
            };
        }

        let request = change.query.request();
        state.send_modify(|s| {
            s.query = change.query.clone();
            s.loading = true;
        });

        tokio::select! {
            biased;
            next = next_change(&mut changes) => match next {
                Some(next) => {
                    tracing::debug!(superseded = change.seq, by = next.seq, "list fetch superseded");
                    pending = Some(next);
                }
                None => return,
            },
            outcome = source.fetch(&request) => apply(&state, &sender, &change, outcome),
        }
    }
}

async fn next_change(changes: &mut watch::Receiver<Change>) -> Option<Change> {
    changes.changed().await.ok()?;
    Some(changes.borrow_and_update().clone())
}

// Waits for a quiet period. Further debounced changes restart it; an immediate change
// ends it early.
async fn settle(
    changes: &mut watch::Receiver<Change>,
    mut change: Change,
    quiet: Duration,
) -> Option<Change> {
    loop {
        tokio::select! {
            next = next_change(changes) => {
                change = next?;
                if !change.debounce {
                    return Some(change);
                }
            }
            _ = tokio::time::sleep(quiet) => return Some(change),
        }
    }
}

fn apply<T>(
    state: &watch::Sender<ListState<T>>,
    sender: &watch::Sender<Change>,
    change: &Change,
    outcome: Result<ListResult<T>, ApiError>,
) {
    let latest = sender.borrow().seq;
    if latest != change.seq {
        tracing::debug!(stale = change.seq, latest, "discarding stale list response");
        return;
    }

    match outcome {
        Ok(result) if result.is_beyond_last_page(change.query.page()) => {
            let last = result.total_pages;
            tracing::debug!(requested = change.query.page(), last, "page beyond last page, clamping");
            sender.send_if_modified(|current| {
                if current.seq != change.seq || current.query.set_page(last).is_err() {
                    return false;
                }
                current.seq += 1;
                current.debounce = false;
                true
            });
        }
        Ok(result) => state.send_modify(|s| {
            s.query = change.query.clone();
            s.result = result;
            s.result_request = Some(change.query.request());
            s.error = None;
            s.loading = false;
            s.applied_seq = change.seq;
        }),
        Err(err) => {
            tracing::warn!(error = %err, "list fetch failed");
            state.send_modify(|s| {
                s.error = Some(err.user_message());
                s.loading = false;
                s.applied_seq = change.seq;
            });
        }
    }
}
