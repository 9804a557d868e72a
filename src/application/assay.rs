use crate::application::augment::augment_query_results;
use crate::application::cache::{CacheLookup, LazyAsyncCache};
use crate::domain::error::CacheError;
use crate::domain::model::{AssayQuery, AssayRecord, AugmentedData, CacheEvent, SampleFilter};
use crate::domain::traits::{BatchFetch, MolecularDataSource};
use crate::infrastructure::config::CacheConfig;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type AssayData = Vec<AssayRecord>;
pub type AssayAugment = AugmentedData<AssayData, AssayQuery>;
pub type AssayLookup = CacheLookup<AssayData, AssayQuery>;

// Fetch policy bound into the generic engine: group a population cycle's
// queries by profile, issue one grouped call against the data source, then
// pair and normalize the results.
struct GroupedAssayFetch {
    source: Arc<dyn MolecularDataSource>,
    sample_filter_by_profile: BTreeMap<String, SampleFilter>,
}

#[async_trait]
impl BatchFetch<AssayData, AssayQuery> for GroupedAssayFetch {
    async fn fetch(&self, queries: Vec<AssayQuery>) -> Result<Vec<AssayAugment>, CacheError> {
        // BTreeMap keeps group iteration order deterministic, which the
        // source's one-result-array-per-group contract relies on.
        let mut entity_ids_by_profile: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for query in &queries {
            entity_ids_by_profile
                .entry(query.profile_id.clone())
                .or_default()
                .push(query.entity_id.clone());
        }

        let results = self
            .source
            .fetch_grouped(entity_ids_by_profile, &self.sample_filter_by_profile)
            .await?;

        augment_query_results(&queries, results)
    }
}

/// Lazy cache for generic-assay molecular data keyed by
/// `(profile_id, entity_id)`.
///
/// Pure configuration of [`LazyAsyncCache`]: the key codec, the grouped
/// fetch and the value normalization step. Adds no state machine of its
/// own.
pub struct AssayMolecularDataCache {
    inner: LazyAsyncCache<AssayData, AssayQuery, GroupedAssayFetch>,
}

impl AssayMolecularDataCache {
    pub fn new(
        source: Arc<dyn MolecularDataSource>,
        sample_filter_by_profile: BTreeMap<String, SampleFilter>,
    ) -> Self {
        Self::with_config(source, sample_filter_by_profile, CacheConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn MolecularDataSource>,
        sample_filter_by_profile: BTreeMap<String, SampleFilter>,
        config: CacheConfig,
    ) -> Self {
        Self {
            inner: LazyAsyncCache::with_config(
                GroupedAssayFetch {
                    source,
                    sample_filter_by_profile,
                },
                config,
            ),
        }
    }

    /// See [`LazyAsyncCache::get`].
    pub fn get(&self, queries: &[AssayQuery]) -> Vec<AssayLookup> {
        self.inner.get(queries)
    }

    /// See [`LazyAsyncCache::peek`].
    pub fn peek(&self, query: &AssayQuery) -> Option<AssayLookup> {
        self.inner.peek(query)
    }

    /// See [`LazyAsyncCache::resolved_at`].
    pub fn resolved_at(&self, query: &AssayQuery) -> Option<i64> {
        self.inner.resolved_at(query)
    }

    /// See [`LazyAsyncCache::add_data`].
    pub fn add_data(&self, augments: Vec<AssayAugment>) {
        self.inner.add_data(augments)
    }

    /// See [`LazyAsyncCache::invalidate`].
    pub fn invalidate(&self, queries: &[AssayQuery]) {
        self.inner.invalidate(queries)
    }

    /// See [`LazyAsyncCache::subscribe`].
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.subscribe()
    }

    /// See [`LazyAsyncCache::resolve`].
    pub async fn resolve(&self, queries: &[AssayQuery]) -> Result<Vec<AssayAugment>, CacheError> {
        self.inner.resolve(queries).await
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
