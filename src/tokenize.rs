//! Tokenization.
//!
//! Records hold token sequences for the context, the caption and every name.
//! The training side usually plugs its own [Tokenizer];
//! [WordTokenizer] splits on Unicode word boundaries.
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    /// Byte offset in the tokenized text.
    pub idx: usize,
}

pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Unicode word boundary tokenizer (UAX #29), whitespace dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_word_bound_indices()
            .filter(|(_, w)| !w.trim().is_empty())
            .map(|(idx, w)| Token {
                text: w.to_string(),
                idx,
            })
            .collect()
    }
}
