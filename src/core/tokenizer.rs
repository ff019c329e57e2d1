//! Token counting for LLM context budgeting
//!
//! A [`Tokenizer`] owns its BPE tables for exactly as long as a pack run
//! needs them; dropping it releases the encoding on every exit path,
//! including early returns through `?`.
//!
//! ```rust
//! use repopack::core::tokenizer::{TokenModel, Tokenizer};
//!
//! let tokenizer = Tokenizer::new(TokenModel::Heuristic).unwrap();
//! let tokens = tokenizer.count("Hello world");
//! assert!(tokens > 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};
use tracing::{debug, warn};

use crate::error::PackError;

/// Supported token encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenModel {
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo)
    #[default]
    Cl100k,
    /// o200k_base encoding (GPT-4o)
    O200k,
    /// Fast heuristic estimation (no BPE encoding)
    Heuristic,
}

impl TokenModel {
    /// List all accepted model names
    pub fn available_models() -> &'static [&'static str] {
        &["cl100k", "o200k", "heuristic"]
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "gpt4" | "gpt-4" | "gpt-3.5-turbo" => {
                Ok(TokenModel::Cl100k)
            }
            "o200k" | "o200k_base" | "gpt4o" | "gpt-4o" => Ok(TokenModel::O200k),
            "heuristic" | "fast" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

/// An acquired token encoding
pub struct Tokenizer {
    model: TokenModel,
    bpe: Option<CoreBPE>,
}

impl Tokenizer {
    /// Load the encoding for `model`
    pub fn new(model: TokenModel) -> Result<Self, PackError> {
        let bpe = match model {
            TokenModel::Cl100k => Some(cl100k_base()),
            TokenModel::O200k => Some(o200k_base()),
            TokenModel::Heuristic => None,
        };
        let bpe = bpe.transpose().map_err(|e| PackError::Tokenizer {
            encoding: model.to_string(),
            message: e.to_string(),
        })?;
        debug!(model = %model, "tokenizer acquired");
        Ok(Self { model, bpe })
    }

    pub fn model(&self) -> TokenModel {
        self.model
    }

    /// Count tokens in `text`.
    ///
    /// A failure inside the encoder is contained: it is logged against `label`
    /// and counted as zero tokens.
    pub fn count_labeled(&self, text: &str, label: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let Some(bpe) = &self.bpe else {
            return estimate_tokens_heuristic(text);
        };
        count_guarded(label, self.model, || bpe.encode_with_special_tokens(text).len())
    }

    pub fn count(&self, text: &str) -> usize {
        self.count_labeled(text, "<text>")
    }
}

/// Run `encode`, counting a panic inside it as zero tokens
fn count_guarded(label: &str, model: TokenModel, encode: impl FnOnce() -> usize) -> usize {
    match catch_unwind(AssertUnwindSafe(encode)) {
        Ok(n) => n,
        Err(_) => {
            warn!(path = %label, model = %model, "token counting failed, reporting 0");
            0
        }
    }
}

impl Drop for Tokenizer {
    fn drop(&mut self) {
        debug!(model = %self.model, "tokenizer released");
    }
}

/// Character classes for the heuristic token estimate
#[derive(Clone, Copy)]
enum CharClass {
    /// Letters, digits and whitespace: about four per token
    Word,
    /// ASCII punctuation: about two per token
    Symbol,
    /// Han, kana, hangul and fullwidth forms: about one and a half per token
    Wide,
    /// Any other non-ASCII character: about two per token
    Other,
}

const WIDE_RANGES: &[(u32, u32)] = &[
    (0x3000, 0x30FF), // CJK punctuation, hiragana, katakana
    (0x3400, 0x4DBF), // CJK extension A
    (0x4E00, 0x9FFF), // CJK unified ideographs
    (0xAC00, 0xD7AF), // hangul syllables
    (0xFF00, 0xFFEF), // fullwidth forms
];

fn classify(c: char) -> CharClass {
    if c.is_ascii_punctuation() {
        CharClass::Symbol
    } else if c.is_ascii() {
        CharClass::Word
    } else if is_wide_char(c) {
        CharClass::Wide
    } else {
        CharClass::Other
    }
}

fn is_wide_char(c: char) -> bool {
    let cp = c as u32;
    WIDE_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Token estimate without any BPE tables.
///
/// Each character class is counted separately and rounded up, so a
/// non-empty text always costs at least one token.
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    let mut counts = [0usize; 4];
    for c in text.chars() {
        counts[classify(c) as usize] += 1;
    }
    let [word, symbol, wide, other] = counts;
    word.div_ceil(4) + symbol.div_ceil(2) + (wide * 2).div_ceil(3) + other.div_ceil(2)
}
