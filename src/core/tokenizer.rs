//! Token counting for LLM context budgeting
//!
//! The scan pipeline only needs a count per text, so the encoder sits behind the
//! [`Tokenizer`] trait. [`TokenCounter`] is the production implementation backed
//! by tiktoken BPE encodings (o200k_base by default), with a fast heuristic
//! model that needs no encoding at all.
//!
//! ```rust,ignore
//! let counter = TokenCounter::new(TokenModel::default())?;
//! let tokens = counter.count("Hello world")?;
//! ```

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

use crate::core::model::ScanError;

/// Per-text tokenization failure; the caller skips the text and carries on.
///
/// The BPE and heuristic counters never fail on valid UTF-8; other
/// [`Tokenizer`] implementations may.
#[derive(Debug, Error)]
#[error("tokenization failed: {0}")]
pub struct TokenizeError(pub String);

/// Anything that can turn text into a token count
pub trait Tokenizer {
    fn count(&self, text: &str) -> Result<usize, TokenizeError>;
}

/// Supported token models/encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// o200k_base encoding (GPT-4o native)
    #[default]
    O200k,
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo, Claude 3)
    Cl100k,
    /// GPT-4 / GPT-4-turbo (alias for Cl100k)
    Gpt4,
    /// GPT-4o (alias for O200k)
    Gpt4o,
    /// Claude 3 / 3.5 (approximated with Cl100k)
    Claude3,
    /// Fast heuristic estimation (no BPE encoding)
    Heuristic,
}

/// BPE encodings backing the models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    O200k,
    Cl100k,
}

impl Encoding {
    fn name(self) -> &'static str {
        match self {
            Encoding::O200k => "o200k_base",
            Encoding::Cl100k => "cl100k_base",
        }
    }

    fn load(self) -> Result<&'static CoreBPE, ScanError> {
        let loaded = match self {
            Encoding::O200k => &*O200K_BPE,
            Encoding::Cl100k => &*CL100K_BPE,
        };
        loaded.as_ref().map_err(|reason| ScanError::EncoderInit {
            encoding: self.name().to_string(),
            reason: reason.clone(),
        })
    }
}

impl TokenModel {
    fn encoding(self) -> Option<Encoding> {
        match self {
            TokenModel::O200k | TokenModel::Gpt4o => Some(Encoding::O200k),
            TokenModel::Cl100k | TokenModel::Gpt4 | TokenModel::Claude3 => Some(Encoding::Cl100k),
            TokenModel::Heuristic => None,
        }
    }

    /// List all available models
    pub fn available_models() -> &'static [&'static str] {
        &["o200k", "cl100k", "gpt4", "gpt4o", "claude3", "heuristic"]
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::O200k => "o200k",
            TokenModel::Cl100k => "cl100k",
            TokenModel::Gpt4 => "gpt4",
            TokenModel::Gpt4o => "gpt4o",
            TokenModel::Claude3 => "claude3",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "o200k" | "o200k_base" | "default" => Ok(TokenModel::O200k),
            "cl100k" | "cl100k_base" => Ok(TokenModel::Cl100k),
            "gpt4" | "gpt-4" | "gpt-4-turbo" => Ok(TokenModel::Gpt4),
            "gpt4o" | "gpt-4o" => Ok(TokenModel::Gpt4o),
            "claude" | "claude3" | "claude-3" | "claude-3.5" => Ok(TokenModel::Claude3),
            "heuristic" | "fast" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

// Lazy-initialized BPE encodings (loaded once on first use)
static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| e.to_string()));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| e.to_string()));

/// Tokenizer backed by a tiktoken encoding or the heuristic
#[derive(Clone, Copy)]
pub struct TokenCounter {
    model: TokenModel,
    bpe: Option<&'static CoreBPE>,
}

impl TokenCounter {
    /// Load the encoding for `model`; fails if the BPE data cannot be loaded
    pub fn new(model: TokenModel) -> Result<Self, ScanError> {
        let bpe = match model.encoding() {
            Some(encoding) => Some(encoding.load()?),
            None => None,
        };
        Ok(Self { model, bpe })
    }

    pub fn model(&self) -> TokenModel {
        self.model
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("model", &self.model)
            .finish()
    }
}

impl Tokenizer for TokenCounter {
    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        if text.is_empty() {
            return Ok(0);
        }

        Ok(match self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => estimate_tokens_heuristic(text),
        })
    }
}

/// Estimate tokens using a fast heuristic (no BPE encoding)
///
/// The heuristic accounts for:
/// - ASCII text: ~4 characters per token
/// - Code symbols: ~2 characters per token
/// - CJK characters: ~1.5 characters per token
/// - Other Unicode: ~2 characters per token
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let mut ascii_chars = 0usize;
    let mut cjk_chars = 0usize;
    let mut other_unicode = 0usize;
    let mut code_symbols = 0usize;

    for c in text.chars() {
        if c.is_ascii() {
            if c.is_ascii_punctuation() {
                code_symbols += 1;
            } else {
                ascii_chars += 1;
            }
        } else if is_cjk_char(c) {
            cjk_chars += 1;
        } else {
            other_unicode += 1;
        }
    }

    ascii_chars.div_ceil(4)
        + code_symbols.div_ceil(2)
        + (cjk_chars * 2).div_ceil(3)
        + other_unicode.div_ceil(2)
}

/// Check if a character is CJK (Chinese/Japanese/Korean)
#[inline]
fn is_cjk_char(c: char) -> bool {
    let cp = c as u32;
    (0x4E00..=0x9FFF).contains(&cp)      // CJK Unified Ideographs
        || (0x3400..=0x4DBF).contains(&cp)  // CJK Extension A
        || (0x3000..=0x303F).contains(&cp)  // CJK Symbols and Punctuation
        || (0x3040..=0x309F).contains(&cp)  // Hiragana
        || (0x30A0..=0x30FF).contains(&cp)  // Katakana
        || (0xAC00..=0xD7AF).contains(&cp)  // Hangul Syllables
        || (0xFF00..=0xFFEF).contains(&cp) // Fullwidth Forms
}
