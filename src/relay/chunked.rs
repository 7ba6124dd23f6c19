// Fixed-stride chunking for single-shot responses presented as streams

use std::time::Duration;

use async_stream::stream;
use futures::Stream;

/// Split text into fixed-stride chunks on character boundaries.
///
/// Stride counts characters, not bytes, so multi-byte text never splits
/// mid-character. Concatenating the chunks reproduces the input exactly.
/// A zero stride returns the whole text as one chunk.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    if chunk_size == 0 {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Emit a single-shot response as fixed-stride chunks with an artificial
/// delay between them, giving pull-only sources a streamed presentation.
/// The first chunk goes out immediately.
pub fn chunk_stream(
    text: String,
    chunk_size: usize,
    delay: Duration,
) -> impl Stream<Item = String> + Send {
    stream! {
        let mut first = true;
        for chunk in chunk_text(&text, chunk_size) {
            if !first {
                tokio::time::sleep(delay).await;
            }
            first = false;
            yield chunk;
        }
    }
}
