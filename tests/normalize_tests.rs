//! Value normalizer threshold-parsing tests

use assay_cache::{normalize_threshold, AssayRecord, ThresholdType};

fn record(value: &str) -> AssayRecord {
    AssayRecord::new("profile_a", "entity_1", "sample_1", value)
}

#[test]
fn test_plain_integer_passes_through() {
    let mut datum = record("10");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "10");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_plain_float_passes_through() {
    let mut datum = record("10.0015");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "10.0015");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_greater_than_prefix_is_extracted() {
    let mut datum = record(">10");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "10");
    assert_eq!(datum.threshold_type, Some(ThresholdType::Greater));
}

#[test]
fn test_less_than_prefix_with_space_is_extracted() {
    let mut datum = record("< 10.0015");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "10.0015");
    assert_eq!(datum.threshold_type, Some(ThresholdType::Less));
}

#[test]
fn test_greater_than_prefix_with_space_is_extracted() {
    let mut datum = record("> 10");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "10");
    assert_eq!(datum.threshold_type, Some(ThresholdType::Greater));
}

#[test]
fn test_negative_number_keeps_sign() {
    let mut datum = record("-5.5");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "-5.5");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_threshold_before_negative_number() {
    let mut datum = record("<-2");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "-2");
    assert_eq!(datum.threshold_type, Some(ThresholdType::Less));
}

#[test]
fn test_non_numeric_value_is_unchanged() {
    let mut datum = record("abc");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "abc");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_internal_whitespace_is_rejected() {
    // No space allowed mid-number
    let mut datum = record("1 0");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "1 0");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_trailing_characters_are_rejected() {
    // Anchored to the whole string, no partial matches
    let mut datum = record("10x");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "10x");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_marker_without_number_is_rejected() {
    let mut datum = record(">abc");
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, ">abc");
    assert_eq!(datum.threshold_type, None);
}

#[test]
fn test_normalization_is_idempotent() {
    let mut datum = record(">10");
    normalize_threshold(&mut datum);
    let once = datum.clone();
    normalize_threshold(&mut datum);
    assert_eq!(datum, once);
}

#[test]
fn test_already_set_threshold_short_circuits() {
    // A record that has been through the pipeline keeps its value even if
    // the value would parse differently now.
    let mut datum = record("<3");
    datum.threshold_type = Some(ThresholdType::Greater);
    normalize_threshold(&mut datum);
    assert_eq!(datum.value, "<3");
    assert_eq!(datum.threshold_type, Some(ThresholdType::Greater));
}

#[test]
fn test_threshold_type_serializes_as_marker() {
    assert_eq!(
        serde_json::to_string(&ThresholdType::Greater).unwrap(),
        "\">\""
    );
    assert_eq!(serde_json::to_string(&ThresholdType::Less).unwrap(), "\"<\"");
}
