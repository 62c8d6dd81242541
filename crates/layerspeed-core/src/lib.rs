//! # LayerSpeed Core
//!
//! Core types and traits shared by the LayerSpeed crates: the error types,
//! helpers for chunked G-code streams, and the chunk processor pipeline.

pub mod chunks;
pub mod error;
pub mod pipeline;

pub use chunks::{count_layer_markers, ensure_layered, join_chunks, split_into_chunks, LAYER_MARKER};
pub use error::{Error, Result, StreamError};
pub use pipeline::{ChunkProcessor, ProcessorHandle, ProcessorPipeline};
