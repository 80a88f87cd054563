//! Pricing table: per-model rate configuration.
//!
//! A [`PricingTable`] maps model identifiers (e.g. `openai:gpt-4o-mini`) to
//! validated [`PricingEntry`] records. Tables are immutable once built and
//! replaced wholesale on refresh via [`SharedPricing`], so concurrent readers
//! never observe a half-populated table.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TokenMeterError};

// ---------------------------------------------------------------------------
// Pricing entry
// ---------------------------------------------------------------------------

/// Rate configuration for a single model.
///
/// Rates are expressed per 1000 tokens. `output_per_1k` is absent for models
/// that are never billed for output (e.g. embedding models).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingEntry {
    /// Vendor name (e.g. "openai", "anthropic").
    pub vendor: String,
    /// Context window size in tokens, if the model has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<u64>,
    /// Input cost per 1k tokens.
    pub input_per_1k: f64,
    /// Output cost per 1k tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_per_1k: Option<f64>,
    /// Tokenizer name (e.g. "cl100k_base", "anthropic_approx_bpe").
    pub tokenizer: String,
    /// Model kind ("chat", "embedding", ...).
    pub kind: String,
}

impl PricingEntry {
    /// Check the entry's invariants, reporting the first violation.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.vendor.is_empty() {
            return Err("vendor must not be empty".into());
        }
        if self.tokenizer.is_empty() {
            return Err("tokenizer must not be empty".into());
        }
        if self.kind.is_empty() {
            return Err("kind must not be empty".into());
        }
        if self.input_per_1k < 0.0 {
            return Err(format!(
                "input_per_1k must be non-negative, got {}",
                self.input_per_1k
            ));
        }
        if let Some(rate) = self.output_per_1k {
            if rate < 0.0 {
                return Err(format!("output_per_1k must be non-negative, got {rate}"));
            }
        }
        if self.context == Some(0) {
            return Err("context must be a positive token count".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pricing table
// ---------------------------------------------------------------------------

/// Immutable mapping from model identifier to its pricing entry.
///
/// Backed by a `BTreeMap` so iteration order is deterministic; lookups that
/// take "the first matching entry" (see the estimator's embedding-model
/// search) are therefore stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingTable {
    entries: BTreeMap<String, PricingEntry>,
}

impl PricingTable {
    /// Build a table from pre-validated entries, validating each record.
    ///
    /// Any invalid record rejects the whole load and names the offending
    /// model identifier.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, PricingEntry)>,
    ) -> Result<Self> {
        let mut table = BTreeMap::new();
        for (model, entry) in entries {
            entry
                .validate()
                .map_err(|msg| TokenMeterError::validation(&model, msg))?;
            table.insert(model, entry);
        }
        Ok(Self { entries: table })
    }

    /// Parse a table from a JSON object of model-id → pricing record.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let raw: BTreeMap<String, PricingEntry> = serde_json::from_str(data)
            .map_err(|e| TokenMeterError::config_with_source("invalid pricing JSON", e))?;
        Self::from_entries(raw)
    }

    /// Look up the pricing entry for a model identifier.
    pub fn get(&self, model: &str) -> Option<&PricingEntry> {
        self.entries.get(model)
    }

    /// Number of models in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in deterministic (lexicographic model-id) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PricingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read-only snapshot of all models and their entries.
    pub fn list_models(&self) -> &BTreeMap<String, PricingEntry> {
        &self.entries
    }
}

/// Load and validate a pricing table from a JSON file.
pub fn load_pricing_file(path: &Path) -> Result<PricingTable> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        TokenMeterError::io(format!("reading pricing file '{}'", path.display()), e)
    })?;
    let table = PricingTable::from_json_str(&data)?;
    info!(models = table.len(), path = %path.display(), "loaded pricing table");
    Ok(table)
}

// ---------------------------------------------------------------------------
// Shared handle (atomic replace)
// ---------------------------------------------------------------------------

/// Shared, atomically replaceable pricing table handle.
///
/// Readers call [`snapshot`](Self::snapshot) and keep using that `Arc` for
/// the duration of an estimation; a refresh builds the new table fully off
/// to the side and publishes it with a single swap. A failed reload leaves
/// the prior table in effect.
#[derive(Debug)]
pub struct SharedPricing {
    current: RwLock<Arc<PricingTable>>,
}

impl SharedPricing {
    pub fn new(table: PricingTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Get the current table snapshot. Cheap (one Arc clone).
    pub fn snapshot(&self) -> Arc<PricingTable> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publish a fully built replacement table.
    pub fn replace(&self, table: PricingTable) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(table);
    }

    /// Reload from a pricing file, publishing only on success.
    pub fn reload(&self, path: &Path) -> Result<usize> {
        let table = load_pricing_file(path)?;
        let count = table.len();
        self.replace(table);
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
