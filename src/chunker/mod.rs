mod params;
mod splitter;
mod window;


pub use params::{ChunkParameterError, ChunkParameters};
pub use splitter::{Chunk, TOKEN_SEPARATOR, chunk_tokens, join_tokens};
pub use window::{plan_windows, window_spans};
