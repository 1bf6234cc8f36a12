use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Label used when a record carries none of `brand`, `title` or `task`.
pub const UNKNOWN_LABEL: &str = "UNKNOWN TARGET";

/// An ordered feed snapshot, replaced wholesale on every poll or scan.
///
/// `Arc` so the view can take a copy of the current snapshot in O(1).
pub type FeedSnapshot = Arc<Vec<Deal>>;

/// Opaque record identifier. Backends emit both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum DealId {
    Number(i64),
    Text(String),
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealId::Number(n) => write!(f, "{n}"),
            DealId::Text(s) => f.write_str(s),
        }
    }
}

/// A single feed item: a deal, a bounty, or an intercept, depending on the backend.
///
/// Only the fields the view keys off are typed. Everything else lands in
/// `details`, keyed by field name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDeal")]
pub struct Deal {
    pub id: DealId,
    /// Display label (`brand`, `title` or `task`, in that order).
    pub label: String,
    /// Free text (`summary`, falling back to `description`).
    pub summary: Option<String>,
    pub value_score: Option<f64>,
    pub url: Option<String>,
    pub image: Option<String>,
    /// Presentation-only fields: `reward`, `difficulty`, `duration_months`, ...
    pub details: Map<String, Value>,
}

impl Deal {
    /// Outbound link for this record, or `fallback` when the backend sent none.
    ///
    /// The scraper backends emit `"#"` as a placeholder link; that counts as absent.
    pub fn link_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.url.as_deref() {
            Some(url) if !url.trim().is_empty() && url != "#" => url,
            _ => fallback,
        }
    }

    /// Render a detail value as short display text, if present.
    pub fn detail_text(&self, key: &str) -> Option<String> {
        match self.details.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// A single-target scan result: what was sniffed and the backend's call on it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Intercept {
    #[serde(rename = "Brand", default)]
    pub target: Option<String>,
    #[serde(rename = "Discount_Summary", default)]
    pub deal: Option<String>,
    #[serde(rename = "Verdict", default)]
    pub verdict: Option<String>,
}

impl Intercept {
    pub fn verdict_or_unknown(&self) -> &str {
        self.verdict.as_deref().unwrap_or("UNKNOWN")
    }

    fn is_blank(&self) -> bool {
        self.target.is_none() && self.deal.is_none() && self.verdict.is_none()
    }

    /// Read the intercept out of a scan reply's `extracted_intel` object.
    ///
    /// Sequences and `{Data: [...]}` wrappers are feed shapes, not intercepts.
    pub fn from_reply(body: &Value) -> Option<Self> {
        let intel = body.get("extracted_intel")?;
        if !intel.is_object() || intel.get("Data").is_some() {
            return None;
        }
        Intercept::deserialize(intel)
            .ok()
            .filter(|intercept| !intercept.is_blank())
    }
}

#[derive(Deserialize)]
struct RawDeal {
    id: DealId,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    value_score: Option<f64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl From<RawDeal> for Deal {
    fn from(raw: RawDeal) -> Self {
        let label = raw
            .brand
            .or(raw.title)
            .or(raw.task)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());

        Deal {
            id: raw.id,
            label,
            summary: raw.summary.or(raw.description),
            value_score: raw.value_score,
            url: raw.url,
            image: raw.image,
            details: raw.details,
        }
    }
}
