//! The estimation engine: token counts, cost breakdowns, warnings.
//!
//! A pure, synchronous computation over a pricing table snapshot and a
//! tokenizer registry. Safe for concurrent callers; nothing here blocks or
//! mutates shared state.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenMeterError};
use crate::pricing::{PricingEntry, PricingTable};
use crate::registry::TokenizerRegistry;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A single estimation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Model identifier (e.g. "openai:gpt-4o-mini").
    pub model: String,
    /// System prompt.
    #[serde(default)]
    pub system: Option<String>,
    /// User prompt.
    #[serde(default)]
    pub user: Option<String>,
    /// Serialized tool definitions, counted as input.
    #[serde(default)]
    pub tools_json: Option<String>,
    /// Expected output token count.
    pub expected_output_tokens: u64,
    /// Optional RAG add-on costs.
    #[serde(default)]
    pub rag: Option<RagOptions>,
}

impl EstimateRequest {
    /// Check the request's invariants at the intake boundary.
    ///
    /// The engine itself preserves the reference cost formulas unchanged,
    /// so malformed values are rejected here before they reach it.
    pub fn validate(&self) -> Result<()> {
        if let Some(rag) = &self.rag {
            rag.validate()?;
        }
        Ok(())
    }
}

/// RAG sub-request: embedding generation and vector-store reads that
/// accompany the primary call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagOptions {
    /// Tokens sent to the vendor's embedding model.
    pub embedding_tokens: u64,
    /// Number of vectors read from the store.
    pub num_vectors_read: u64,
    /// Read fee charged per vector. Despite the field name, this is a flat
    /// per-unit fee, not per 1000 — the config wire format keeps the name.
    pub vector_read_fee_per_1k: f64,
}

impl RagOptions {
    /// The read fee must be non-negative; a negative fee would surface as a
    /// negative cost component.
    pub fn validate(&self) -> Result<()> {
        if self.vector_read_fee_per_1k < 0.0 {
            return Err(TokenMeterError::invalid_request(format!(
                "vector_read_fee_per_1k must be non-negative, got {}",
                self.vector_read_fee_per_1k
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which tokenizer produced the counts, and whether it approximates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenizerInfo {
    pub name: String,
    pub approx: bool,
}

/// Cost components; the total is always their sum.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub model_input_cost: f64,
    pub model_output_cost: f64,
    pub embedding_cost: f64,
    pub vector_io_cost: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.model_input_cost + self.model_output_cost + self.embedding_cost + self.vector_io_cost
    }
}

/// A complete estimation result for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub model: String,
    pub tokenizer: TokenizerInfo,
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_utilization_pct: Option<f64>,
    pub cost: f64,
    pub breakdown: CostBreakdown,
    pub warnings: Vec<String>,
}

/// Batch results with aggregated totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEstimate {
    pub results: Vec<Estimate>,
    pub total_cost: f64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Utilization at or above this percentage triggers a context warning.
const CONTEXT_WARN_PCT: f64 = 90.0;

/// Estimate tokens and cost for a single request.
///
/// Fails with [`TokenMeterError::UnknownModel`] when the model identifier is
/// absent from the pricing table, and with a `Tokenization` error if the
/// exact vocabulary cannot be loaded. Never returns a partial result.
pub fn estimate(
    table: &PricingTable,
    registry: &TokenizerRegistry,
    request: &EstimateRequest,
) -> Result<Estimate> {
    let entry = table
        .get(&request.model)
        .ok_or_else(|| TokenMeterError::unknown_model(&request.model))?;

    let input_tokens = count_input_tokens(registry, request, &entry.tokenizer)?;
    let output_tokens = request.expected_output_tokens;

    let breakdown = compute_breakdown(table, entry, input_tokens, output_tokens, request.rag.as_ref());

    let context_utilization_pct = entry
        .context
        .map(|limit| (input_tokens + output_tokens) as f64 / limit as f64 * 100.0);

    let approx = registry.is_approximate(&entry.tokenizer)?;
    let warnings = build_warnings(
        input_tokens,
        output_tokens,
        entry.context,
        &entry.tokenizer,
        approx,
    );

    Ok(Estimate {
        model: request.model.clone(),
        tokenizer: TokenizerInfo {
            name: entry.tokenizer.clone(),
            approx,
        },
        input_tokens,
        output_tokens,
        context_limit: entry.context,
        context_utilization_pct,
        cost: breakdown.total(),
        breakdown,
        warnings,
    })
}

/// Estimate a batch of requests in order.
///
/// Totals are sums over the individual results. Any single failure (unknown
/// model, tokenization) aborts the whole batch; there is no partial-success
/// mode.
pub fn estimate_batch(
    table: &PricingTable,
    registry: &TokenizerRegistry,
    requests: &[EstimateRequest],
) -> Result<BatchEstimate> {
    let mut results = Vec::with_capacity(requests.len());
    let mut total_cost = 0.0;
    let mut total_input_tokens = 0;
    let mut total_output_tokens = 0;

    for request in requests {
        let result = estimate(table, registry, request)?;
        total_cost += result.cost;
        total_input_tokens += result.input_tokens;
        total_output_tokens += result.output_tokens;
        results.push(result);
    }

    Ok(BatchEstimate {
        results,
        total_cost,
        total_input_tokens,
        total_output_tokens,
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Sum tokenizer counts over the request's prompt fragments.
///
/// Absent or empty fragments count as zero without invoking the tokenizer.
fn count_input_tokens(
    registry: &TokenizerRegistry,
    request: &EstimateRequest,
    tokenizer: &str,
) -> Result<u64> {
    let mut total = 0u64;
    for fragment in [&request.system, &request.user, &request.tools_json] {
        if let Some(text) = fragment {
            if !text.is_empty() {
                let (tokens, _) = registry.count(text, tokenizer)?;
                total += tokens as u64;
            }
        }
    }
    Ok(total)
}

/// Compose the four cost components.
fn compute_breakdown(
    table: &PricingTable,
    entry: &PricingEntry,
    input_tokens: u64,
    output_tokens: u64,
    rag: Option<&RagOptions>,
) -> CostBreakdown {
    let model_input_cost = input_tokens as f64 / 1000.0 * entry.input_per_1k;

    let model_output_cost = entry
        .output_per_1k
        .map_or(0.0, |rate| output_tokens as f64 / 1000.0 * rate);

    let mut embedding_cost = 0.0;
    let mut vector_io_cost = 0.0;
    if let Some(rag) = rag {
        if rag.embedding_tokens > 0 {
            // First embedding-kind entry from the same vendor, in table
            // iteration order; no match means no embedding cost.
            if let Some((_, embedding)) = table
                .iter()
                .find(|(_, e)| e.kind == "embedding" && e.vendor == entry.vendor)
            {
                embedding_cost = rag.embedding_tokens as f64 / 1000.0 * embedding.input_per_1k;
            }
        }
        if rag.num_vectors_read > 0 {
            // Flat per-vector fee; see RagOptions::vector_read_fee_per_1k.
            vector_io_cost = rag.num_vectors_read as f64 * rag.vector_read_fee_per_1k;
        }
    }

    CostBreakdown {
        model_input_cost,
        model_output_cost,
        embedding_cost,
        vector_io_cost,
    }
}

/// Warnings in fixed order: context utilization first, then approximation.
fn build_warnings(
    input_tokens: u64,
    output_tokens: u64,
    context_limit: Option<u64>,
    tokenizer: &str,
    approx: bool,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(limit) = context_limit {
        let pct = (input_tokens + output_tokens) as f64 / limit as f64 * 100.0;
        if pct >= CONTEXT_WARN_PCT {
            warnings.push(format!(
                "High context utilization: {pct:.1}% of {} tokens",
                group_digits(limit)
            ));
        }
    }

    if approx {
        warnings.push(format!(
            "Tokenizer '{tokenizer}' uses approximation - actual token counts may vary"
        ));
    }

    warnings
}

/// Format an integer with thousands separators (1000 → "1,000").
pub(crate) fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
