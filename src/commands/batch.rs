//! Handler for the `tokenmeter batch` command.
//!
//! Reads a JSON array of estimation requests, runs them in order, and
//! prints per-request results plus aggregated totals. One bad request
//! fails the whole batch.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, TokenMeterError};
use crate::estimator::{self, EstimateRequest};
use crate::output::{self, Format};
use crate::registry::TokenizerRegistry;

/// All inputs needed to run the batch command.
#[derive(Debug)]
pub struct BatchCommandOptions {
    /// JSON file containing an array of [`EstimateRequest`]s.
    pub file: PathBuf,
    pub pricing: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub format: Format,
    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Run the batch command.
pub fn run(options: BatchCommandOptions) -> Result<()> {
    let (_, table, pricing_path) =
        super::load_environment(options.config_path.as_deref(), options.pricing.as_deref())?;
    debug!(pricing = %pricing_path.display(), "pricing loaded");

    let data = std::fs::read_to_string(&options.file).map_err(|e| {
        TokenMeterError::io(
            format!("reading batch file '{}'", options.file.display()),
            e,
        )
    })?;
    let requests: Vec<EstimateRequest> = serde_json::from_str(&data).map_err(|e| {
        TokenMeterError::config_with_source(
            format!("invalid batch file '{}'", options.file.display()),
            e,
        )
    })?;

    for request in &requests {
        request.validate()?;
    }

    let registry = TokenizerRegistry::new();
    let batch = estimator::estimate_batch(&table, &registry, &requests)?;

    print!(
        "{}",
        output::format_batch(&batch, options.format, options.quiet)?
    );
    Ok(())
}
