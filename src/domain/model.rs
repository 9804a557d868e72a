use crate::domain::traits::CacheKey;
use serde::{Deserialize, Serialize};
use std::fmt;

// Separator between the profile and entity halves of a cache key.
// Neither identifier is expected to contain it.
const KEY_SEPARATOR: char = '~';

// Compound identity of one cached request: which molecular profile,
// which assay entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssayQuery {
    pub profile_id: String,
    pub entity_id: String,
}

impl AssayQuery {
    pub fn new(profile_id: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            entity_id: entity_id.into(),
        }
    }
}

impl CacheKey for AssayQuery {
    fn cache_key(&self) -> String {
        format!("{}{}{}", self.profile_id, KEY_SEPARATOR, self.entity_id)
    }
}

/// Inequality marker carried in front of a censored measurement
/// (a value reported as "greater than X" rather than exactly X).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdType {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl ThresholdType {
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            ">" => Some(Self::Greater),
            "<" => Some(Self::Less),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
        }
    }
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Generic-assay data record as the service reports it. `value` arrives as a
// string and may carry a threshold prefix; `threshold_type` is derived
// locally by the normalizer, exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssayRecord {
    pub generic_assay_stable_id: String,
    pub molecular_profile_id: String,
    pub sample_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_sample_key: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_type: Option<ThresholdType>,
}

impl AssayRecord {
    pub fn new(
        profile_id: impl Into<String>,
        entity_id: impl Into<String>,
        sample_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            generic_assay_stable_id: entity_id.into(),
            molecular_profile_id: profile_id.into(),
            sample_id: sample_id.into(),
            patient_id: None,
            study_id: None,
            unique_sample_key: None,
            value: value.into(),
            threshold_type: None,
        }
    }

    /// Same encoding as [`AssayQuery::cache_key`], built from the record's
    /// own fields, so results route back to the entry that asked for them.
    pub fn cache_key(&self) -> String {
        format!(
            "{}{}{}",
            self.molecular_profile_id, KEY_SEPARATOR, self.generic_assay_stable_id
        )
    }
}

// Sample selection applied per profile when fetching: either an explicit id
// list or a named sample list on the server side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_list_id: Option<String>,
}

/// A query paired with whatever resolved for it. `data` may be empty;
/// absence of matches is represented, never dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedData<T, Q> {
    pub data: T,
    pub meta: Q,
}

// Observable state of a cache entry. A key never requested has no entry at
// all (the implicit Absent state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Complete,
    Error,
}

/// Change notification published whenever an entry transitions state.
/// The entry's data is always written before its event is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: String,
    pub status: EntryStatus,
}
