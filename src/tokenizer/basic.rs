use super::{TokenizeError, Tokenizer};

/// Built-in word/punctuation tokenizer that needs no model download
///
/// Lowercases input, keeps runs of alphanumeric characters together and
/// emits every other non-whitespace character as its own token.
pub struct BasicTokenizer;

impl BasicTokenizer {
    /// Model id that selects this tokenizer
    pub const MODEL_ID: &'static str = "basic";
}

impl Tokenizer for BasicTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        let mut tokens = Vec::new();
        let mut word = String::new();

        for c in text.chars() {
            if c.is_alphanumeric() {
                word.extend(c.to_lowercase());
                continue;
            }

            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if !c.is_whitespace() {
                tokens.push(c.to_lowercase().collect());
            }
        }

        if !word.is_empty() {
            tokens.push(word);
        }

        Ok(tokens)
    }
}
