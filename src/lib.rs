//! tokenmeter: token count and cost estimation for LLM requests.
//!
//! Given a model identifier, prompt fragments, and a pricing table, the
//! estimation engine tokenizes the input, looks up per-model rates, and
//! produces a cost breakdown with contextual warnings.
//!
//! The core pieces:
//! - [`pricing`] — the validated per-model rate table, atomically
//!   replaceable via [`pricing::SharedPricing`].
//! - [`tokenizers`] / [`registry`] — exact and approximate token counters
//!   dispatched by name.
//! - [`estimator`] — the engine itself: [`estimator::estimate`] and
//!   [`estimator::estimate_batch`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod estimator;
pub mod output;
pub mod pricing;
pub mod registry;
pub mod tokenizers;

pub use error::{Result, TokenMeterError};
pub use estimator::{estimate, estimate_batch, BatchEstimate, Estimate, EstimateRequest};
pub use pricing::{load_pricing_file, PricingEntry, PricingTable, SharedPricing};
pub use registry::TokenizerRegistry;
