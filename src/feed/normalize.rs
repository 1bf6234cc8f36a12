//! Response-shape normalization.
//!
//! Backends have answered the feed endpoint in several shapes over time. Rather
//! than probing the JSON ad hoc at every call site, the body is matched against
//! a fixed list of known shapes, in priority order:
//!
//! 1. a bare sequence of records
//! 2. `{"extracted_intel": [...]}`
//! 3. `{"extracted_intel": {"Data": [...]}}`
//! 4. `{"intel": [...]}` (the scan endpoint's reply)
//!
//! The first shape that matches wins, even if it holds zero records.

use serde::Deserialize;
use serde_json::Value;

use super::types::Deal;

/// The recognised response shape, reported for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    BareSequence,
    ExtractedIntel,
    ExtractedIntelData,
    ScanIntel,
}

/// Outcome of normalizing one response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// At least one record decoded.
    Live(Vec<Deal>),
    /// A known shape, but nothing in it.
    Empty,
    /// Parseable JSON in none of the known shapes.
    Unrecognized,
}

/// Result of [`normalize`] with the bookkeeping the caller logs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeResult {
    pub outcome: Normalized,
    pub shape: Option<Shape>,
    /// Elements of the recognised sequence that were not valid records.
    pub skipped: usize,
}

/// Locate the record sequence in `value`, trying shapes in priority order.
fn locate(value: &Value) -> Option<(Shape, &Vec<Value>)> {
    if let Value::Array(items) = value {
        return Some((Shape::BareSequence, items));
    }

    let object = value.as_object()?;

    if let Some(intel) = object.get("extracted_intel") {
        match intel {
            Value::Array(items) => return Some((Shape::ExtractedIntel, items)),
            Value::Object(inner) => {
                if let Some(Value::Array(items)) = inner.get("Data") {
                    return Some((Shape::ExtractedIntelData, items));
                }
            }
            _ => {}
        }
    }

    if let Some(Value::Array(items)) = object.get("intel") {
        return Some((Shape::ScanIntel, items));
    }

    None
}

/// Normalize a parsed response body into a record sequence.
///
/// Elements that fail to decode as a [`Deal`] are dropped individually and
/// counted in `skipped`; they never invalidate the rest of the sequence.
pub fn normalize(value: &Value) -> NormalizeResult {
    let Some((shape, items)) = locate(value) else {
        return NormalizeResult {
            outcome: Normalized::Unrecognized,
            shape: None,
            skipped: 0,
        };
    };

    let mut deals = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        match Deal::deserialize(item) {
            Ok(deal) => deals.push(deal),
            Err(e) => {
                skipped += 1;
                tracing::debug!(error = %e, "Skipping malformed record");
            }
        }
    }

    let outcome = if deals.is_empty() {
        Normalized::Empty
    } else {
        Normalized::Live(deals)
    };

    NormalizeResult {
        outcome,
        shape: Some(shape),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn deals(value: &Value) -> Vec<Deal> {
        serde_json::from_value(value.clone()).unwrap()
    }

    #[test]
    fn test_bare_sequence() {
        let body = json!([{ "id": 1, "brand": "X", "value_score": 80 }]);
        let result = normalize(&body);
        assert_eq!(result.shape, Some(Shape::BareSequence));
        assert_eq!(result.outcome, Normalized::Live(deals(&body)));
    }

    #[test]
    fn test_extracted_intel_sequence() {
        let inner = json!([{ "id": "a", "task": "RECON" }]);
        let body = json!({ "mission": "sniff", "extracted_intel": inner });
        let result = normalize(&body);
        assert_eq!(result.shape, Some(Shape::ExtractedIntel));
        assert_eq!(result.outcome, Normalized::Live(deals(&inner)));
    }

    #[test]
    fn test_extracted_intel_data() {
        let inner = json!([{ "id": 3, "brand": "Notion" }, { "id": 4, "brand": "Figma" }]);
        let body = json!({ "extracted_intel": { "Data": inner } });
        let result = normalize(&body);
        assert_eq!(result.shape, Some(Shape::ExtractedIntelData));
        assert_eq!(result.outcome, Normalized::Live(deals(&inner)));
    }

    #[test]
    fn test_scan_reply_intel() {
        let inner = json!([{ "id": "b", "task": "DEV" }]);
        let body = json!({ "status": "SUCCESS", "intel_count": 1, "intel": inner });
        let result = normalize(&body);
        assert_eq!(result.shape, Some(Shape::ScanIntel));
        assert_eq!(result.outcome, Normalized::Live(deals(&inner)));
    }

    #[test]
    fn test_extracted_intel_wins_over_intel() {
        let body = json!({
            "extracted_intel": [{ "id": 1, "brand": "first" }],
            "intel": [{ "id": 2, "brand": "second" }]
        });
        match normalize(&body).outcome {
            Normalized::Live(d) => assert_eq!(d[0].label, "first"),
            other => panic!("Expected Live, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_in_every_shape() {
        for body in [
            json!([]),
            json!({ "extracted_intel": [] }),
            json!({ "extracted_intel": { "Data": [] } }),
            json!({ "intel": [] }),
        ] {
            let result = normalize(&body);
            assert_eq!(result.outcome, Normalized::Empty, "body: {body}");
            assert!(result.shape.is_some());
        }
    }

    #[test]
    fn test_unrecognized_shapes() {
        for body in [
            json!({ "error": "boom" }),
            json!({ "extracted_intel": { "Brand": "Adobe", "Verdict": "BUY" } }),
            json!({ "extracted_intel": "nope" }),
            json!("just a string"),
            json!(42),
            json!(null),
        ] {
            let result = normalize(&body);
            assert_eq!(result.outcome, Normalized::Unrecognized, "body: {body}");
            assert_eq!(result.shape, None);
        }
    }

    #[test]
    fn test_malformed_records_skipped() {
        let body = json!([
            { "id": 1, "brand": "ok" },
            "not a record",
            { "brand": "no id" },
            { "id": 2, "brand": "also ok" }
        ]);
        let result = normalize(&body);
        assert_eq!(result.skipped, 2);
        match result.outcome {
            Normalized::Live(d) => {
                assert_eq!(d.len(), 2);
                assert_eq!(d[1].label, "also ok");
            }
            other => panic!("Expected Live, got {:?}", other),
        }
    }

    #[test]
    fn test_all_records_malformed_is_empty() {
        let result = normalize(&json!([1, 2, 3]));
        assert_eq!(result.outcome, Normalized::Empty);
        assert_eq!(result.skipped, 3);
    }

    fn arb_record() -> impl Strategy<Value = Value> {
        (
            prop_oneof![any::<i64>().prop_map(Value::from), "[a-z0-9]{1,8}".prop_map(Value::from)],
            "[A-Za-z ]{1,16}",
            proptest::option::of(0u32..=100),
        )
            .prop_map(|(id, brand, score)| {
                let mut record = json!({ "id": id, "brand": brand });
                if let Some(score) = score {
                    record["value_score"] = json!(score);
                }
                record
            })
    }

    proptest! {
        #[test]
        fn prop_bare_sequence_is_identity(records in proptest::collection::vec(arb_record(), 1..12)) {
            let body = Value::Array(records);
            prop_assert_eq!(normalize(&body).outcome, Normalized::Live(deals(&body)));
        }

        #[test]
        fn prop_extracted_intel_unwraps(records in proptest::collection::vec(arb_record(), 1..12)) {
            let inner = Value::Array(records);
            let body = json!({ "extracted_intel": inner.clone() });
            prop_assert_eq!(normalize(&body).outcome, Normalized::Live(deals(&inner)));
        }

        #[test]
        fn prop_extracted_intel_data_unwraps(records in proptest::collection::vec(arb_record(), 1..12)) {
            let inner = Value::Array(records);
            let body = json!({ "extracted_intel": { "Data": inner.clone() } });
            prop_assert_eq!(normalize(&body).outcome, Normalized::Live(deals(&inner)));
        }
    }
}
