// Deserialization boundary for service payloads. Shape mismatches are
// rejected here instead of being trusted implicitly downstream.
use crate::domain::error::CacheError;
use crate::domain::model::AssayRecord;

/// Decode one flat array of records.
pub fn decode_records(payload: &str) -> Result<Vec<AssayRecord>, CacheError> {
    Ok(serde_json::from_str(payload)?)
}

/// Decode a grouped payload: one record array per profile group, as a
/// [`crate::domain::traits::MolecularDataSource`] returns them.
pub fn decode_grouped_records(payload: &str) -> Result<Vec<Vec<AssayRecord>>, CacheError> {
    Ok(serde_json::from_str(payload)?)
}
