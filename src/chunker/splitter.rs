use serde::{Deserialize, Serialize};

use super::params::ChunkParameters;
use super::window::plan_windows;
use crate::fingerprint::sha256_hex;

/// Separator placed between tokens when rebuilding chunk text
pub const TOKEN_SEPARATOR: &str = " ";

/// A window of tokens rebuilt into text, ready for embedding/indexing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Tokens joined with a single space
    pub text: String,
    /// SHA-256 hex digest of `text`
    pub sha256: String,
    /// Number of tokens in this chunk
    pub token_count: usize,
}

/// Split a token sequence into overlapping chunks
///
/// Chunks come out in ascending window-start order. An empty sequence
/// produces no chunks.
pub fn chunk_tokens<S: AsRef<str>>(tokens: &[S], params: &ChunkParameters) -> Vec<Chunk> {
    plan_windows(tokens, params)
        .into_iter()
        .map(|span| create_chunk(&tokens[span]))
        .collect()
}

/// Join tokens the way chunk text is rebuilt
///
/// Lossy with respect to input spacing: `how's` tokenized as
/// `how`, `'`, `s` comes back as `how ' s`.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(TOKEN_SEPARATOR)
}

fn create_chunk<S: AsRef<str>>(window: &[S]) -> Chunk {
    let text = join_tokens(window);
    let sha256 = sha256_hex(&text);

    Chunk {
        text,
        sha256,
        token_count: window.len(),
    }
}
