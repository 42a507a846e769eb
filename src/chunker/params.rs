use thiserror::Error;

/// Rejected chunking parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkParameterError {
    #[error("max_tokens_per_chunk must be at least 1 (got {0})")]
    NonPositiveWindow(i64),

    #[error("token_overlap cannot be negative (got {0})")]
    NegativeOverlap(i64),

    #[error("token_overlap ({overlap}) must be smaller than max_tokens_per_chunk ({max_tokens})")]
    OverlapTooLarge { overlap: i64, max_tokens: i64 },

    #[error("max_chunk_length must be at least 1 (got {0})")]
    NonPositiveLength(i64),
}

/// Validated sliding-window settings
///
/// Construction guarantees `token_overlap < max_tokens_per_chunk`, so the
/// stride is always at least one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParameters {
    max_tokens_per_chunk: usize,
    token_overlap: usize,
    max_chunk_length: Option<usize>,
}

impl ChunkParameters {
    /// Create parameters without a character cap
    pub fn new(max_tokens_per_chunk: usize, token_overlap: usize) -> Result<Self, ChunkParameterError> {
        Self::from_raw(to_signed(max_tokens_per_chunk), Some(to_signed(token_overlap)), None)
    }

    /// Validate parameters exactly as they arrive on a request
    ///
    /// Signed inputs let negative values surface as parameter errors instead
    /// of decoding failures. A missing overlap means no overlap and a missing
    /// length means no character cap.
    pub fn from_raw(
        max_tokens_per_chunk: i64,
        token_overlap: Option<i64>,
        max_chunk_length: Option<i64>,
    ) -> Result<Self, ChunkParameterError> {
        if max_tokens_per_chunk < 1 {
            return Err(ChunkParameterError::NonPositiveWindow(max_tokens_per_chunk));
        }

        let overlap = token_overlap.unwrap_or(0);
        if overlap < 0 {
            return Err(ChunkParameterError::NegativeOverlap(overlap));
        }
        if overlap >= max_tokens_per_chunk {
            return Err(ChunkParameterError::OverlapTooLarge {
                overlap,
                max_tokens: max_tokens_per_chunk,
            });
        }

        let max_chunk_length = match max_chunk_length {
            Some(length) if length < 1 => {
                return Err(ChunkParameterError::NonPositiveLength(length));
            }
            Some(length) => Some(to_unsigned(length)),
            None => None,
        };

        Ok(Self {
            max_tokens_per_chunk: to_unsigned(max_tokens_per_chunk),
            token_overlap: to_unsigned(overlap),
            max_chunk_length,
        })
    }

    /// Set a character cap on reconstructed chunk text
    pub fn with_max_chunk_length(self, max_chunk_length: usize) -> Result<Self, ChunkParameterError> {
        Self::from_raw(
            to_signed(self.max_tokens_per_chunk),
            Some(to_signed(self.token_overlap)),
            Some(to_signed(max_chunk_length)),
        )
    }

    pub fn max_tokens_per_chunk(&self) -> usize {
        self.max_tokens_per_chunk
    }

    pub fn token_overlap(&self) -> usize {
        self.token_overlap
    }

    pub fn max_chunk_length(&self) -> Option<usize> {
        self.max_chunk_length
    }

    /// Tokens the window start advances by between untruncated windows
    pub fn stride(&self) -> usize {
        self.max_tokens_per_chunk - self.token_overlap
    }
}

fn to_signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// Only called on values already checked to be positive
fn to_unsigned(value: i64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
