use crate::domain::model::{AssayRecord, ThresholdType};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// Values come back from the REST facility as strings and may carry a
// threshold marker in front of the number:
//   10          integer
//   10.0015     float
//   >10         integer with threshold
//   <10.0015    float with threshold
//   > 10        threshold with space
// The pattern is anchored to the whole value; partial matches are rejected.
static THRESHOLD_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([><]? *)(-?\d+(?:\.\d+)?)$").expect("valid threshold pattern"));

/// Splits an inequality-prefixed value into a bare numeric string plus an
/// explicit [`ThresholdType`].
///
/// A record whose `threshold_type` is already set has been through the
/// pipeline before and is left untouched, which makes the function
/// idempotent. Non-numeric values pass through unchanged with
/// `threshold_type` unset.
pub fn normalize_threshold(record: &mut AssayRecord) {
    if record.threshold_type.is_some() {
        return;
    }

    let Some(captures) = THRESHOLD_VALUE.captures(&record.value) else {
        // Categorical or otherwise non-numeric value; keep it as delivered.
        debug!(
            key = %record.cache_key(),
            value = %record.value,
            "value is not numeric, skipping threshold normalization"
        );
        return;
    };

    let marker = captures
        .get(1)
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    let numeric = captures
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    // An empty marker group means a plain number: no threshold.
    record.threshold_type = ThresholdType::from_marker(marker);
    record.value = numeric;
}
