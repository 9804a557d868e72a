use crate::domain::error::CacheError;
use crate::domain::model::{AssayRecord, AugmentedData, SampleFilter};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Deterministic string encoding of a query identity.
///
/// Two values encode to the same key iff they are the same identity; the key
/// is used both to address cache entries and to route fetched results back
/// to the entry that asked for them.
pub trait CacheKey {
    fn cache_key(&self) -> String;
}

/// Fetch seam for the generic cache engine.
///
/// Receives every query scheduled in one population cycle and must return
/// exactly one augmented result per query, empty data included.
#[async_trait]
pub trait BatchFetch<D, Q>: Send + Sync {
    async fn fetch(&self, queries: Vec<Q>) -> Result<Vec<AugmentedData<D, Q>>, CacheError>;
}

/// Remote service seam for generic-assay data.
///
/// One call covers a whole population cycle: entity ids grouped by profile,
/// with a per-profile sample selection. Returns one record array per group,
/// order-aligned with the map's iteration order. Implementations supply
/// their own transport; this crate never issues network calls itself.
#[async_trait]
pub trait MolecularDataSource: Send + Sync {
    async fn fetch_grouped(
        &self,
        entity_ids_by_profile: BTreeMap<String, Vec<String>>,
        sample_filter_by_profile: &BTreeMap<String, SampleFilter>,
    ) -> Result<Vec<Vec<AssayRecord>>, CacheError>;
}
