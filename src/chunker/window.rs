use std::ops::Range;

use super::params::{ChunkParameterError, ChunkParameters};

/// Compute the token ranges of an uncapped sliding window
///
/// Windows hold up to `max_tokens_per_chunk` tokens and start `stride` tokens
/// apart. Planning stops after the first window that reaches the end of the
/// sequence, so the final window may be shorter but is never redundant.
pub fn window_spans(
    len: usize,
    max_tokens_per_chunk: usize,
    token_overlap: usize,
) -> Result<Vec<Range<usize>>, ChunkParameterError> {
    let params = ChunkParameters::new(max_tokens_per_chunk, token_overlap)?;
    Ok(plan(len, &params, |_, end| end))
}

/// Compute token ranges for a concrete token sequence, honoring the character cap
///
/// Each window drops trailing tokens until its single-space join fits
/// `max_chunk_length`, but always keeps at least one token. The next window
/// starts `token_overlap` tokens before the (possibly shortened) end and at
/// least one token after the current start, so every index is covered.
pub fn plan_windows<S: AsRef<str>>(tokens: &[S], params: &ChunkParameters) -> Vec<Range<usize>> {
    let Some(cap) = params.max_chunk_length() else {
        return plan(tokens.len(), params, |_, end| end);
    };

    let widths: Vec<usize> = tokens.iter().map(|t| t.as_ref().chars().count()).collect();
    plan(tokens.len(), params, |start, end| shrink_to_fit(&widths, start, end, cap))
}

fn plan(
    len: usize,
    params: &ChunkParameters,
    fit: impl Fn(usize, usize) -> usize,
) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    if len == 0 {
        return spans;
    }

    let mut start = 0;
    loop {
        let end = fit(start, (start + params.max_tokens_per_chunk()).min(len));
        spans.push(start..end);

        if end >= len {
            break;
        }
        start = end.saturating_sub(params.token_overlap()).max(start + 1);
    }

    spans
}

/// Shrink `start..end` from the right until the joined text fits `cap` characters
fn shrink_to_fit(widths: &[usize], start: usize, end: usize, cap: usize) -> usize {
    let mut end = end;
    // Sum of token widths plus one separator between each pair
    let mut joined = widths[start..end].iter().sum::<usize>() + (end - start - 1);

    while joined > cap && end - start > 1 {
        end -= 1;
        joined -= widths[end] + 1;
    }

    end
}
