//! Analysis specifications: the durable, declarative record of one
//! analysis invocation.
//!
//! A spec stores *which* analysis ran, on *which* dataset, with which
//! inputs, options, and seed. Results are never persisted — replay always
//! recomputes from the spec. The spec JSON document
//! `{analysis, dataset, inputs, options, seed, version}` is an external,
//! file-exchangeable format with stable field names.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::errors::CoreError;

/// Version tag embedded in every spec this build produces.
pub const ENGINE_VERSION: &str = concat!("tally ", env!("CARGO_PKG_VERSION"));

/// Enumerated dispatch key — one variant per supported analysis.
///
/// The snake_case serde names are the stable wire keys; a spec whose
/// `analysis` field matches no variant fails closed at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Describe,
    FrequencyTable,
    MannWhitneyU,
    WilcoxonSignedRank,
    // serde's snake_case conversion drops the underscore before the digit
    // ("fisher_exact2x2"); pin the documented stable key instead.
    #[serde(rename = "fisher_exact_2x2")]
    FisherExact2x2,
    SimpleLinearRegression,
    Ols,
}

impl AnalysisKind {
    /// Every registered analysis, in dispatch-table order.
    pub const ALL: &'static [Self] = &[
        Self::Describe,
        Self::FrequencyTable,
        Self::MannWhitneyU,
        Self::WilcoxonSignedRank,
        Self::FisherExact2x2,
        Self::SimpleLinearRegression,
        Self::Ols,
    ];

    /// The stable string key used in spec documents and SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Describe => "describe",
            Self::FrequencyTable => "frequency_table",
            Self::MannWhitneyU => "mann_whitney_u",
            Self::WilcoxonSignedRank => "wilcoxon_signed_rank",
            Self::FisherExact2x2 => "fisher_exact_2x2",
            Self::SimpleLinearRegression => "simple_linear_regression",
            Self::Ols => "ols",
        }
    }

    /// Parse a wire key. Fails closed on anything unregistered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAnalysis`] for an unrecognized key.
    pub fn parse(key: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| CoreError::UnknownAnalysis(key.to_string()))
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A replayable description of one analysis invocation.
///
/// `inputs` maps role names to either a column name in the target dataset
/// or a literal value (e.g., an embedded 2×2 table for Fisher's test);
/// resolution happens at replay time. `seed` is captured for provenance
/// and reserved for future randomized analyses — current analyses are
/// deterministic and do not consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSpec {
    pub analysis: AnalysisKind,
    pub dataset: String,
    pub inputs: Map<String, serde_json::Value>,
    pub options: Map<String, serde_json::Value>,
    pub seed: u32,
    pub version: String,
}

impl AnalysisSpec {
    /// Create a spec for a registered analysis, capturing a fresh random
    /// seed and this build's version tag.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAnalysis`] if `analysis` is not a
    /// registered key.
    pub fn new(
        analysis: &str,
        dataset: impl Into<String>,
        inputs: Map<String, serde_json::Value>,
        options: Map<String, serde_json::Value>,
    ) -> Result<Self, CoreError> {
        let kind = AnalysisKind::parse(analysis)?;
        Ok(Self {
            analysis: kind,
            dataset: dataset.into(),
            inputs,
            options,
            seed: fresh_seed()?,
            version: ENGINE_VERSION.to_string(),
        })
    }

    /// Parse an externally supplied spec document, failing closed if the
    /// stored analysis key is no longer registered (schema/version drift).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownAnalysis`] on key drift and
    /// [`CoreError::InvalidSpec`] on any other malformation.
    pub fn from_json(document: &str) -> Result<Self, CoreError> {
        // Probe the key first so drift reports as UnknownAnalysis rather
        // than a generic deserialization failure.
        let probe: serde_json::Value = serde_json::from_str(document)
            .map_err(|e| CoreError::InvalidSpec(e.to_string()))?;
        if let Some(key) = probe.get("analysis").and_then(serde_json::Value::as_str) {
            AnalysisKind::parse(key)?;
        }
        serde_json::from_value(probe).map_err(|e| CoreError::InvalidSpec(e.to_string()))
    }
}

fn fresh_seed() -> Result<u32, CoreError> {
    let mut buf = [0_u8; 4];
    getrandom::fill(&mut buf).map_err(|e| CoreError::Other(anyhow::anyhow!("seed: {e}")))?;
    Ok(u32::from_le_bytes(buf))
}
