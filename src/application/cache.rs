use crate::domain::error::CacheError;
use crate::domain::model::{AugmentedData, CacheEvent, EntryStatus};
use crate::domain::traits::{BatchFetch, CacheKey};
use crate::infrastructure::config::CacheConfig;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};

// Per-key entry state. A key with no entry at all is in the implicit
// Absent state.
enum EntryState<D, Q> {
    Pending,
    Complete {
        data: AugmentedData<D, Q>,
        resolved_at: i64,
    },
    Error {
        message: String,
    },
}

impl<D: Clone, Q: Clone> EntryState<D, Q> {
    fn to_lookup(&self) -> CacheLookup<D, Q> {
        match self {
            EntryState::Pending => CacheLookup::Pending,
            EntryState::Complete { data, .. } => CacheLookup::Complete(data.clone()),
            EntryState::Error { message } => CacheLookup::Error(message.clone()),
        }
    }
}

/// What a caller observes for one query at one point in time.
///
/// The three states are never conflated: `Pending` is "still loading",
/// `Complete` with empty data is "confirmed empty", and `Error` is a failed
/// fetch that stays failed until [`LazyAsyncCache::invalidate`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<D, Q> {
    Pending,
    Complete(AugmentedData<D, Q>),
    Error(String),
}

impl<D, Q> CacheLookup<D, Q> {
    pub fn status(&self) -> EntryStatus {
        match self {
            CacheLookup::Pending => EntryStatus::Pending,
            CacheLookup::Complete(_) => EntryStatus::Complete,
            CacheLookup::Error(_) => EntryStatus::Error,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CacheLookup::Pending)
    }

    pub fn into_complete(self) -> Option<AugmentedData<D, Q>> {
        match self {
            CacheLookup::Complete(augment) => Some(augment),
            _ => None,
        }
    }
}

/// Reactive cache engine: per-key state, request coalescing, one batched
/// fetch per population cycle, change events to subscribers.
///
/// Policy (key codec, fetch grouping, normalization) lives in the
/// [`BatchFetch`] implementation; the engine only runs the state machine
/// `Absent -> Pending -> Complete | Error`. Entries are retained for the
/// lifetime of the cache instance.
pub struct LazyAsyncCache<D, Q, F> {
    entries: Arc<DashMap<String, EntryState<D, Q>>>,
    fetcher: Arc<F>,
    events: broadcast::Sender<CacheEvent>,
}

impl<D, Q, F> LazyAsyncCache<D, Q, F>
where
    D: Clone + Send + Sync + 'static,
    Q: CacheKey + Clone + Send + Sync + 'static,
    F: BatchFetch<D, Q> + 'static,
{
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, CacheConfig::default())
    }

    pub fn with_config(fetcher: F, config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            entries: Arc::new(DashMap::new()),
            fetcher: Arc::new(fetcher),
            events,
        }
    }

    /// Subscribe to entry transitions. Delivery order across different
    /// batches is unspecified, but an entry's data is always written before
    /// its event is published, so a notified observer reads consistent
    /// state.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Snapshot the state of every query, scheduling a fetch for the keys
    /// never requested before.
    ///
    /// All keys newly flipped Absent -> Pending by this call go out as one
    /// batch. Keys already `Pending` attach to their outstanding fetch, and
    /// `Error` keys stay errored until invalidated; neither triggers
    /// another fetch.
    pub fn get(&self, queries: &[Q]) -> Vec<CacheLookup<D, Q>> {
        let mut lookups = Vec::with_capacity(queries.len());
        let mut to_fetch: Vec<Q> = Vec::new();

        for query in queries {
            match self.entries.entry(query.cache_key()) {
                Entry::Occupied(occupied) => lookups.push(occupied.get().to_lookup()),
                Entry::Vacant(vacant) => {
                    // Flipping to Pending under the entry lock is what keeps
                    // concurrent callers from double-fetching this key.
                    vacant.insert(EntryState::Pending);
                    to_fetch.push(query.clone());
                    lookups.push(CacheLookup::Pending);
                }
            }
        }

        if !to_fetch.is_empty() {
            self.spawn_fetch(to_fetch);
        }
        lookups
    }

    /// Read one key without scheduling anything. `None` means the key was
    /// never requested.
    pub fn peek(&self, query: &Q) -> Option<CacheLookup<D, Q>> {
        self.entries
            .get(&query.cache_key())
            .map(|entry| entry.value().to_lookup())
    }

    /// Unix timestamp at which the key resolved, if it is `Complete`.
    pub fn resolved_at(&self, query: &Q) -> Option<i64> {
        self.entries
            .get(&query.cache_key())
            .and_then(|entry| match entry.value() {
                EntryState::Complete { resolved_at, .. } => Some(*resolved_at),
                _ => None,
            })
    }

    /// Insert externally produced results directly, marking their keys
    /// `Complete` without a fetch.
    pub fn add_data(&self, augments: Vec<AugmentedData<D, Q>>) {
        for augment in augments {
            let key = augment.meta.cache_key();
            self.entries.insert(
                key.clone(),
                EntryState::Complete {
                    data: augment,
                    resolved_at: Utc::now().timestamp(),
                },
            );
            let _ = self.events.send(CacheEvent {
                key,
                status: EntryStatus::Complete,
            });
        }
    }

    /// Clear `Error` entries back to the never-requested state so a later
    /// `get` retries them. `Pending` and `Complete` entries are left alone.
    pub fn invalidate(&self, queries: &[Q]) {
        for query in queries {
            self.entries
                .remove_if(&query.cache_key(), |_, state| {
                    matches!(state, EntryState::Error { .. })
                });
        }
    }

    /// Await a terminal state for every query, scheduling fetches as
    /// needed. Returns the augmented data for all queries, or the first
    /// errored key encountered.
    pub async fn resolve(
        &self,
        queries: &[Q],
    ) -> Result<Vec<AugmentedData<D, Q>>, CacheError> {
        let mut events = self.subscribe();
        loop {
            let lookups = self.get(queries);
            let mut out = Vec::with_capacity(lookups.len());
            let mut waiting = false;
            for (lookup, query) in lookups.into_iter().zip(queries) {
                match lookup {
                    CacheLookup::Complete(augment) => out.push(augment),
                    CacheLookup::Error(message) => {
                        return Err(CacheError::Entry {
                            key: query.cache_key(),
                            message,
                        });
                    }
                    CacheLookup::Pending => {
                        waiting = true;
                        break;
                    }
                }
            }
            if !waiting {
                return Ok(out);
            }
            match events.recv().await {
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(CacheError::BatchFetch(
                        "cache event channel closed".to_string(),
                    ));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn spawn_fetch(&self, batch: Vec<Q>) {
        let entries = Arc::clone(&self.entries);
        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();
        debug!(keys = batch.len(), "scheduling batch fetch");

        tokio::spawn(async move {
            match fetcher.fetch(batch.clone()).await {
                Ok(augments) => {
                    for augment in augments {
                        let key = augment.meta.cache_key();
                        entries.insert(
                            key.clone(),
                            EntryState::Complete {
                                data: augment,
                                resolved_at: Utc::now().timestamp(),
                            },
                        );
                        let _ = events.send(CacheEvent {
                            key,
                            status: EntryStatus::Complete,
                        });
                    }
                    // A scheduled key the fetch did not answer must not stay
                    // Pending forever.
                    for query in &batch {
                        let key = query.cache_key();
                        let transitioned =
                            mark_error_if_pending(&entries, &key, "fetch returned no result");
                        if transitioned {
                            error!(%key, "batch fetch resolved without covering scheduled key");
                            let _ = events.send(CacheEvent {
                                key,
                                status: EntryStatus::Error,
                            });
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, keys = batch.len(), "batch fetch failed");
                    let message = err.to_string();
                    // The whole batch shares one failure; every key still
                    // pending from it goes to Error.
                    for query in batch {
                        let key = query.cache_key();
                        if mark_error_if_pending(&entries, &key, &message) {
                            let _ = events.send(CacheEvent {
                                key,
                                status: EntryStatus::Error,
                            });
                        }
                    }
                }
            }
        });
    }
}

fn mark_error_if_pending<D, Q>(
    entries: &DashMap<String, EntryState<D, Q>>,
    key: &str,
    message: &str,
) -> bool {
    let Some(mut entry) = entries.get_mut(key) else {
        return false;
    };
    if matches!(entry.value(), EntryState::Pending) {
        *entry.value_mut() = EntryState::Error {
            message: message.to_string(),
        };
        return true;
    }
    false
}
