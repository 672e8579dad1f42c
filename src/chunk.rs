//! Fixed-size text chunker.
//!
//! Splits document text into consecutive, non-overlapping pieces of
//! `chunk_size` characters. The last piece carries the remainder. Sizes
//! count `char`s, so a chunk boundary never lands inside a UTF-8 sequence.

/// Chunk size used when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split text into chunks of at most `chunk_size` characters.
///
/// Concatenating the result in order reproduces `text` exactly. Empty
/// input yields no chunks. A `chunk_size` of 0 is treated as 1.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(text[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}
