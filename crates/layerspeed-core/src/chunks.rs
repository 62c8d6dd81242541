//! Chunked instruction streams
//!
//! A slicer hands post-processors its output as an ordered list of text
//! chunks, roughly one per layer. These helpers build that list from a flat
//! G-code file and flatten it back.

use crate::error::{Result, StreamError};

/// Layer-boundary marker written by the slicer ahead of each layer
pub const LAYER_MARKER: &str = ";LAYER:";

/// Split a flat G-code text into chunks.
///
/// Every line starting with [`LAYER_MARKER`] opens a new chunk; whatever
/// precedes the first marker becomes the header chunk. Line endings are
/// preserved, so `join_chunks(&split_into_chunks(s)) == s`.
pub fn split_into_chunks(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if line.starts_with(LAYER_MARKER) && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Concatenate chunks back into a single G-code text
pub fn join_chunks(chunks: &[String]) -> String {
    chunks.concat()
}

/// Count the layer-boundary marker lines across all chunks
pub fn count_layer_markers(chunks: &[String]) -> usize {
    chunks
        .iter()
        .flat_map(|chunk| chunk.lines())
        .filter(|line| line.contains(LAYER_MARKER))
        .count()
}

/// Check that a stream is something the layer-based processors can work on
pub fn ensure_layered(chunks: &[String]) -> Result<()> {
    if chunks.is_empty() {
        return Err(StreamError::Empty.into());
    }
    if count_layer_markers(chunks) == 0 {
        return Err(StreamError::NoLayerMarkers {
            chunks: chunks.len(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = ";FLAVOR:Marlin\n;Generated with Cura_SteamEngine 5.6.0\n;LAYER_COUNT:2\n;LAYER:0\nG1 X1\n;LAYER:1\nG1 X2\nM84\n";

    #[test]
    fn test_split_starts_chunk_at_each_layer() {
        let chunks = split_into_chunks(SAMPLE);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].ends_with(";LAYER_COUNT:2\n"));
        assert_eq!(chunks[1], ";LAYER:0\nG1 X1\n");
        assert_eq!(chunks[2], ";LAYER:1\nG1 X2\nM84\n");
    }

    #[test]
    fn test_join_restores_text() {
        assert_eq!(join_chunks(&split_into_chunks(SAMPLE)), SAMPLE);
        assert_eq!(join_chunks(&split_into_chunks("G1 X1")), "G1 X1");
    }

    #[test]
    fn test_ensure_layered() {
        assert!(ensure_layered(&split_into_chunks(SAMPLE)).is_ok());
        assert!(matches!(
            ensure_layered(&[]),
            Err(crate::Error::Stream(StreamError::Empty))
        ));
        assert!(matches!(
            ensure_layered(&["G28\nG1 X1\n".to_string()]),
            Err(crate::Error::Stream(StreamError::NoLayerMarkers { chunks: 1 }))
        ));
    }
}
