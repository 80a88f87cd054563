//! Rendering of estimation results and model listings.
//!
//! Every command builds its typed result (an [`Estimate`], [`BatchEstimate`],
//! or pricing table view) and hands it to a `format_*` function here, keeping
//! presentation logic centralised and consistent across the CLI.

use colored::Colorize;

use crate::error::{Result, TokenMeterError};
use crate::estimator::{BatchEstimate, Estimate};
use crate::pricing::PricingTable;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Render a single estimate.
///
/// `quiet` drops everything but the total cost and warnings.
pub fn format_estimate(estimate: &Estimate, format: Format, quiet: bool) -> Result<String> {
    match format {
        Format::Json => to_json(estimate),
        Format::Text => Ok(estimate_text(estimate, quiet)),
    }
}

/// Render a batch result: per-request sections plus aggregated totals.
///
/// `quiet` drops the per-request sections, leaving only the totals.
pub fn format_batch(batch: &BatchEstimate, format: Format, quiet: bool) -> Result<String> {
    match format {
        Format::Json => to_json(batch),
        Format::Text => {
            let mut out = String::new();
            if !quiet {
                for (i, estimate) in batch.results.iter().enumerate() {
                    out.push_str(&format!("{}\n", format!("[{}]", i + 1).dimmed()));
                    out.push_str(&estimate_text(estimate, false));
                    out.push('\n');
                }
            }
            out.push_str(&format!("{}\n", "Batch totals".bold()));
            out.push_str(&format!(
                "  requests:      {}\n",
                batch.results.len()
            ));
            out.push_str(&format!(
                "  input tokens:  {}\n",
                crate::estimator::group_digits(batch.total_input_tokens)
            ));
            out.push_str(&format!(
                "  output tokens: {}\n",
                crate::estimator::group_digits(batch.total_output_tokens)
            ));
            out.push_str(&format!("  total cost:    {}\n", money(batch.total_cost)));
            Ok(out)
        }
    }
}

/// Render the pricing table as a model listing.
///
/// `quiet` prints bare model identifiers, one per line.
pub fn format_models(table: &PricingTable, format: Format, quiet: bool) -> Result<String> {
    match format {
        Format::Json => to_json(table.list_models()),
        Format::Text if quiet => {
            let mut out = String::new();
            for (model, _) in table.iter() {
                out.push_str(model);
                out.push('\n');
            }
            Ok(out)
        }
        Format::Text => {
            let mut out = String::new();
            out.push_str(&format!(
                "{}\n",
                format!("{} models", table.len()).bold()
            ));
            for (model, entry) in table.iter() {
                let context = entry
                    .context
                    .map_or("-".to_string(), crate::estimator::group_digits);
                let output_rate = entry
                    .output_per_1k
                    .map_or("-".to_string(), |r| format!("{r}"));
                out.push_str(&format!(
                    "  {}  vendor={} kind={} context={} in/1k={} out/1k={} tokenizer={}\n",
                    model.bold(),
                    entry.vendor,
                    entry.kind,
                    context,
                    entry.input_per_1k,
                    output_rate,
                    entry.tokenizer,
                ));
            }
            Ok(out)
        }
    }
}

fn estimate_text(estimate: &Estimate, quiet: bool) -> String {
    let mut out = String::new();

    if quiet {
        out.push_str(&format!("{}\n", money(estimate.cost)));
        for warning in &estimate.warnings {
            out.push_str(&format!("{} {warning}\n", "warning:".yellow().bold()));
        }
        return out;
    }

    out.push_str(&format!(
        "{}\n",
        format!("Estimate for {}", estimate.model).bold()
    ));

    let kind = if estimate.tokenizer.approx {
        "approximate"
    } else {
        "exact"
    };
    out.push_str(&format!(
        "  tokenizer:     {} ({kind})\n",
        estimate.tokenizer.name
    ));
    out.push_str(&format!(
        "  input tokens:  {}\n",
        crate::estimator::group_digits(estimate.input_tokens)
    ));
    out.push_str(&format!(
        "  output tokens: {}\n",
        crate::estimator::group_digits(estimate.output_tokens)
    ));

    if let (Some(limit), Some(pct)) = (estimate.context_limit, estimate.context_utilization_pct) {
        out.push_str(&format!(
            "  context:       {pct:.1}% of {}\n",
            crate::estimator::group_digits(limit)
        ));
    }

    out.push_str(&format!("  cost:          {}\n", money(estimate.cost)));
    out.push_str(&format!(
        "    input:       {}\n",
        money(estimate.breakdown.model_input_cost)
    ));
    out.push_str(&format!(
        "    output:      {}\n",
        money(estimate.breakdown.model_output_cost)
    ));
    out.push_str(&format!(
        "    embedding:   {}\n",
        money(estimate.breakdown.embedding_cost)
    ));
    out.push_str(&format!(
        "    vector I/O:  {}\n",
        money(estimate.breakdown.vector_io_cost)
    ));

    for warning in &estimate.warnings {
        out.push_str(&format!("  {} {warning}\n", "warning:".yellow().bold()));
    }

    out
}

fn money(amount: f64) -> String {
    format!("${amount:.6}")
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| TokenMeterError::config_with_source("failed to serialize output", e))
}
