//! Handler for the `tokenmeter estimate` command.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, TokenMeterError};
use crate::estimator::{self, EstimateRequest, RagOptions};
use crate::output::{self, Format};
use crate::registry::TokenizerRegistry;

/// All inputs needed to run the estimate command.
#[derive(Debug)]
pub struct EstimateCommandOptions {
    pub model: Option<String>,
    pub system: Option<String>,
    pub user: Option<String>,
    pub user_file: Option<PathBuf>,
    pub tools_json: Option<String>,
    pub output_tokens: u64,
    pub embedding_tokens: Option<u64>,
    pub vectors_read: Option<u64>,
    pub vector_read_fee: f64,
    pub pricing: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub format: Format,
    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Run the estimate command.
pub fn run(options: EstimateCommandOptions) -> Result<()> {
    let (config, table, pricing_path) =
        super::load_environment(options.config_path.as_deref(), options.pricing.as_deref())?;
    debug!(pricing = %pricing_path.display(), models = table.len(), "pricing loaded");

    let model = options.model.or(config.default_model).ok_or_else(|| {
        TokenMeterError::config(
            "no model specified (use --model or set default_model in tokenmeter.toml)",
        )
    })?;

    let user = match options.user_file {
        Some(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
            TokenMeterError::io(format!("reading user prompt from '{}'", path.display()), e)
        })?),
        None => options.user,
    };

    let rag = build_rag(
        options.embedding_tokens,
        options.vectors_read,
        options.vector_read_fee,
    );

    let request = EstimateRequest {
        model,
        system: options.system,
        user,
        tools_json: options.tools_json,
        expected_output_tokens: options.output_tokens,
        rag,
    };
    request.validate()?;

    let registry = TokenizerRegistry::new();
    let estimate = estimator::estimate(&table, &registry, &request)?;

    print!(
        "{}",
        output::format_estimate(&estimate, options.format, options.quiet)?
    );
    Ok(())
}

/// A RAG sub-request exists only when one of its flags was given.
fn build_rag(
    embedding_tokens: Option<u64>,
    vectors_read: Option<u64>,
    vector_read_fee: f64,
) -> Option<RagOptions> {
    if embedding_tokens.is_none() && vectors_read.is_none() {
        return None;
    }
    Some(RagOptions {
        embedding_tokens: embedding_tokens.unwrap_or(0),
        num_vectors_read: vectors_read.unwrap_or(0),
        vector_read_fee_per_1k: vector_read_fee,
    })
}
