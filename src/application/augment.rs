use crate::application::normalize::normalize_threshold;
use crate::domain::error::CacheError;
use crate::domain::model::{AssayQuery, AssayRecord, AugmentedData};
use crate::domain::traits::CacheKey;
use std::collections::HashMap;
use tracing::error;

/// Pairs each query with the (possibly empty) subset of fetched records that
/// match it, normalizing every record on the way through.
///
/// The output has exactly one element per input query, in input order; a
/// query that matched nothing gets an empty record list rather than being
/// omitted. A record whose key matches no query means the service answered
/// something that was never asked, which fails the whole batch.
pub fn augment_query_results(
    queries: &[AssayQuery],
    results: Vec<Vec<AssayRecord>>,
) -> Result<Vec<AugmentedData<Vec<AssayRecord>, AssayQuery>>, CacheError> {
    let mut slots_by_key: HashMap<String, Vec<usize>> = HashMap::with_capacity(queries.len());
    let mut augments: Vec<AugmentedData<Vec<AssayRecord>, AssayQuery>> =
        Vec::with_capacity(queries.len());

    for (slot, query) in queries.iter().enumerate() {
        slots_by_key.entry(query.cache_key()).or_default().push(slot);
        augments.push(AugmentedData {
            data: Vec::new(),
            meta: query.clone(),
        });
    }

    for batch in results {
        for mut record in batch {
            normalize_threshold(&mut record);
            let key = record.cache_key();
            let Some(slots) = slots_by_key.get(&key) else {
                error!(%key, "service returned data for a query that was never asked");
                return Err(CacheError::UnrequestedResultKey { key });
            };
            for &slot in slots {
                augments[slot].data.push(record.clone());
            }
        }
    }

    Ok(augments)
}
