//! Hand-authored fallback records.
//!
//! Shown whenever the live endpoint is unreachable or answers with nothing, so
//! the dashboard is never left blank.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map, Value};

use super::types::{Deal, DealId};

/// Number of records in the built-in fixture set.
pub const FIXTURE_COUNT: usize = 8;

/// Supplies the fixed fallback sequence and random permutations of it.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    records: Vec<Deal>,
}

impl Default for FixtureProvider {
    fn default() -> Self {
        Self::new(builtin_records())
    }
}

impl FixtureProvider {
    /// Provider over a caller-supplied record set.
    pub fn new(records: Vec<Deal>) -> Self {
        Self { records }
    }

    /// The fixture records in their authored order.
    pub fn records(&self) -> &[Deal] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A uniform random permutation of the fixture records (Fisher-Yates).
    pub fn reshuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Deal> {
        let mut records = self.records.clone();
        records.shuffle(rng);
        records
    }
}

fn record(
    id: DealId,
    label: &str,
    summary: &str,
    value_score: f64,
    url: Option<&str>,
    details: Value,
) -> Deal {
    let details = match details {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Deal {
        id,
        label: label.to_string(),
        summary: Some(summary.to_string()),
        value_score: Some(value_score),
        url: url.map(str::to_string),
        image: None,
        details,
    }
}

fn builtin_records() -> Vec<Deal> {
    vec![
        record(
            DealId::Number(1),
            "ADOBE CREATIVE CLOUD",
            "Three months of the full suite at no cost for new accounts.",
            92.0,
            None,
            json!({ "discount_amount": 100, "duration_months": 3, "price": "$0.00" }),
        ),
        record(
            DealId::Number(2),
            "NOTION PLUS",
            "Six months free on the Plus plan via the startup programme.",
            85.5,
            None,
            json!({ "discount_amount": 100, "duration_months": 6 }),
        ),
        record(
            DealId::Number(3),
            "JETBRAINS ALL PRODUCTS",
            "Forty percent off the first year of an individual licence.",
            71.0,
            None,
            json!({ "discount_amount": 40, "duration_months": 12 }),
        ),
        record(
            DealId::Number(4),
            "FIGMA PROFESSIONAL",
            "Education tier unlocked for verified students.",
            64.0,
            None,
            json!({ "discount_amount": 100, "duration_months": 12 }),
        ),
        record(
            DealId::Text("GHOST-01".to_string()),
            "SENIOR RUST ENGINEER",
            "TARGET: NEON SYNDICATE. OBJECTIVE: SENIOR RUST ENGINEER. REQUIRES: RUST, TOKIO, SQL.",
            88.0,
            None,
            json!({ "client": "NEON SYNDICATE", "reward": "$4200 USDC", "difficulty": "LETHAL", "type": "DEV", "status": "OPEN" }),
        ),
        record(
            DealId::Text("GHOST-02".to_string()),
            "GROWTH MARKETER",
            "TARGET: HALCYON LABS. OBJECTIVE: GROWTH MARKETER. REQUIRES: SEO, CONTENT, ANALYTICS.",
            58.0,
            None,
            json!({ "client": "HALCYON LABS", "reward": "$1200 USDC", "difficulty": "VETERAN", "type": "MARKETING", "status": "OPEN" }),
        ),
        record(
            DealId::Text("GHOST-03".to_string()),
            "JUNIOR PRODUCT DESIGNER",
            "TARGET: ORBITAL. OBJECTIVE: JUNIOR PRODUCT DESIGNER. REQUIRES: FIGMA, UX, ART.",
            47.0,
            None,
            json!({ "client": "ORBITAL", "reward": "$600 USDC", "difficulty": "NOVICE", "type": "DESIGN", "status": "OPEN" }),
        ),
        record(
            DealId::Text("ERR-001".to_string()),
            "RECONNECT NEURAL LINK",
            "Remote uplink failed. Manual override required.",
            0.0,
            None,
            json!({ "client": "SYSTEM FAILURE", "reward": "$0.00", "difficulty": "NOVICE", "type": "DEV", "status": "TAKEN" }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_count_matches_constant() {
        let provider = FixtureProvider::default();
        assert_eq!(provider.len(), FIXTURE_COUNT);
        assert!(!provider.is_empty());
    }

    #[test]
    fn test_builtin_ids_unique() {
        let provider = FixtureProvider::default();
        let ids: HashSet<_> = provider.records().iter().map(|d| &d.id).collect();
        assert_eq!(ids.len(), provider.len());
    }

    #[test]
    fn test_empty_provider_reshuffles_to_empty() {
        let provider = FixtureProvider::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(provider.reshuffled(&mut rng).is_empty());
    }

    proptest! {
        #[test]
        fn prop_reshuffle_keeps_every_record(seed in any::<u64>()) {
            let provider = FixtureProvider::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let shuffled = provider.reshuffled(&mut rng);

            prop_assert_eq!(shuffled.len(), provider.len());
            for deal in provider.records() {
                prop_assert!(shuffled.contains(deal));
            }
        }
    }
}
