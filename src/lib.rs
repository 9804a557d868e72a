//! Lazy, query-coalescing async cache for generic-assay molecular data.
//!
//! UI collaborators ask for records by `(profile_id, entity_id)`. The cache
//! coalesces concurrent requests per key, batches never-seen keys into one
//! grouped call against a [`MolecularDataSource`], pairs the results back
//! onto every original query (empty matches included), normalizes
//! threshold-prefixed values, and publishes change events so a rendering
//! layer can redraw without ever blocking.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::assay::{AssayAugment, AssayData, AssayLookup, AssayMolecularDataCache};
pub use application::augment::augment_query_results;
pub use application::cache::{CacheLookup, LazyAsyncCache};
pub use application::normalize::normalize_threshold;
pub use domain::error::CacheError;
pub use domain::model::{
    AssayQuery, AssayRecord, AugmentedData, CacheEvent, EntryStatus, SampleFilter, ThresholdType,
};
pub use domain::traits::{BatchFetch, CacheKey, MolecularDataSource};
pub use infrastructure::config::CacheConfig;
pub use infrastructure::decode::{decode_grouped_records, decode_records};
