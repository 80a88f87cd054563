//! Tokenizer dispatch: name → strategy resolution with memoization.
//!
//! Pricing entries carry a tokenizer *name*; the registry turns that name
//! into a concrete [`TokenCounter`]. Unrecognized names silently fall back
//! to the default exact encoding (cl100k), mirroring how most vendors tag
//! new chat models.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::tokenizers::{ApproxFamily, CharRatioCounter, Encoding, TiktokenCounter, TokenCounter};

/// Maps tokenizer names to cached strategy instances.
///
/// Strategies are stateless aside from their configuration, so memoization
/// is pure: a name always resolves to the same instance for the registry's
/// lifetime. The cache lock is held only during resolution, never during
/// counting.
#[derive(Default)]
pub struct TokenizerRegistry {
    cache: Mutex<HashMap<String, Arc<dyn TokenCounter>>>,
}

impl TokenizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a tokenizer name to a counter, creating and caching it on
    /// first use.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn TokenCounter>> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(counter) = cache.get(name) {
            return Ok(counter.clone());
        }

        let counter = create_counter(name)?;
        cache.insert(name.to_string(), counter.clone());
        Ok(counter)
    }

    /// Count tokens in `text` using the named tokenizer.
    ///
    /// Returns the count together with the strategy's approximation flag.
    pub fn count(&self, text: &str, name: &str) -> Result<(usize, bool)> {
        let counter = self.resolve(name)?;
        Ok((counter.count(text)?, counter.is_approximate()))
    }

    /// Whether the named tokenizer produces approximate counts.
    pub fn is_approximate(&self, name: &str) -> Result<bool> {
        Ok(self.resolve(name)?.is_approximate())
    }
}

/// Resolution policy, first match wins:
/// 1. A known tiktoken encoding name (`cl100k_base`, or `o*_base`) → exact.
/// 2. A recognized approximate family name → that family's heuristic.
/// 3. Anything else → default exact cl100k, silently.
fn create_counter(name: &str) -> Result<Arc<dyn TokenCounter>> {
    match name {
        "cl100k_base" => Ok(Arc::new(TiktokenCounter::new(Encoding::Cl100k)?)),
        "o200k_base" => Ok(Arc::new(TiktokenCounter::new(Encoding::O200k)?)),
        "anthropic_approx_bpe" => Ok(Arc::new(CharRatioCounter::new(ApproxFamily::Anthropic))),
        "llama_approx_bpe" => Ok(Arc::new(CharRatioCounter::new(ApproxFamily::Llama))),
        // Unknown o*_base encodings map to cl100k at construction time.
        other if other.starts_with('o') && other.ends_with("_base") => {
            debug!(tokenizer = other, "unknown tiktoken encoding, using cl100k_base");
            Ok(Arc::new(TiktokenCounter::new(Encoding::Cl100k)?))
        }
        other => {
            debug!(tokenizer = other, "unrecognized tokenizer, using cl100k_base");
            Ok(Arc::new(TiktokenCounter::new(Encoding::Cl100k)?))
        }
    }
}
