//! Query parameter structs for the hypergraph endpoints

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

use crate::store::models::{DikwLayer, FactFilters};

/// Helper to deserialize numbers from query string (which are always strings)
fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// Helper to deserialize optional numbers from query string
fn deserialize_option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

// ============================================================================
// Snapshot filters
// ============================================================================

/// Snapshot filter parameters accepted by every hypergraph endpoint.
/// Combined conjunctively; all optional.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SnapshotFilterParams {
    /// Keep facts with aggregate confidence ≥ this value (0..1)
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub min_confidence: Option<f64>,
    /// Keep facts whose participants all sit on this DIKW layer
    pub layer: Option<String>,
    /// Keep facts extracted from this source document
    pub document_id: Option<String>,
    /// Keep facts of this type
    pub fact_type: Option<String>,
}

impl SnapshotFilterParams {
    /// Convert to store filters, validating ranges and enum names
    pub fn to_filters(&self) -> Result<FactFilters, String> {
        if let Some(confidence) = self.min_confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(format!(
                    "min_confidence must be in [0, 1], got {confidence}"
                ));
            }
        }

        let layer = match self.layer.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(DikwLayer::parse(raw).ok_or_else(|| {
                format!(
                    "unknown layer '{raw}' (expected perception, semantic, reasoning or application)"
                )
            })?),
            None => None,
        };

        Ok(FactFilters {
            min_confidence: self.min_confidence,
            layer,
            document_id: self.document_id.clone().filter(|s| !s.is_empty()),
            fact_type: self.fact_type.clone().filter(|s| !s.is_empty()),
        })
    }
}

// ============================================================================
// Overlap threshold (s)
// ============================================================================

/// Overlap threshold parameter: two hyperedges count as adjacent when they
/// share at least `s` participants
#[derive(Debug, Deserialize, Clone)]
pub struct SParam {
    #[serde(default = "default_s", deserialize_with = "deserialize_from_str")]
    pub s: usize,
}

fn default_s() -> usize {
    1
}

impl Default for SParam {
    fn default() -> Self {
        Self { s: default_s() }
    }
}

impl SParam {
    pub fn validate(&self) -> Result<(), String> {
        if self.s == 0 {
            return Err("s must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Comma-separated list of overlap thresholds for connectivity analysis
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SValuesParam {
    /// e.g. "1,2,3"; defaults to "1,2"
    pub s_values: Option<String>,
}

/// Hard cap on thresholds per request; each one costs a component scan
const MAX_S_VALUES: usize = 8;

impl SValuesParam {
    /// Parse to a sorted, deduplicated list
    pub fn to_vec(&self) -> Result<Vec<usize>, String> {
        let raw = match self.s_values.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw,
            None => return Ok(vec![1, 2]),
        };

        let mut values = Vec::new();
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let value: usize = part
                .parse()
                .map_err(|_| format!("invalid s value '{part}'"))?;
            if value == 0 {
                return Err("s values must be at least 1".to_string());
            }
            values.push(value);
        }
        if values.is_empty() {
            return Err("s_values must contain at least one threshold".to_string());
        }
        values.sort_unstable();
        values.dedup();
        if values.len() > MAX_S_VALUES {
            return Err(format!("at most {MAX_S_VALUES} s values per request"));
        }
        Ok(values)
    }
}

// ============================================================================
// Result bounds
// ============================================================================

/// Max ranked rows to return (default: 50, capped at 500)
#[derive(Debug, Deserialize, Clone)]
pub struct LimitParam {
    #[serde(default = "default_limit", deserialize_with = "deserialize_from_str")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

const MAX_LIMIT: usize = 500;

impl Default for LimitParam {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl LimitParam {
    /// Get validated limit (capped at 500)
    pub fn validated_limit(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }
}

/// Bound on the visualization payload, in hyperedges
#[derive(Debug, Deserialize, Default, Clone)]
pub struct MaxEdgesParam {
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub max_edges: Option<usize>,
}

/// Absolute ceiling regardless of what the client asks for
pub const MAX_EDGES_CEILING: usize = 2_000;

impl MaxEdgesParam {
    /// Effective bound: the requested value capped at the ceiling, or the
    /// configured default when absent
    pub fn effective(&self, configured_default: usize) -> usize {
        self.max_edges
            .unwrap_or(configured_default)
            .min(MAX_EDGES_CEILING)
    }
}
