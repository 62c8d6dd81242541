//! Chunk processor pipeline

use std::sync::Arc;

use crate::error::{Error, Result};

/// Trait for chunked-stream processors
///
/// Processors rewrite an ordered list of G-code chunks in place. They are
/// applied in a pipeline, each one seeing the output of the previous one.
///
/// # Examples
/// - Per-layer speed and fan overrides
/// - Stacked instances of the same transform with different settings
pub trait ChunkProcessor: Send + Sync {
    /// Get the name/identifier of this processor
    fn name(&self) -> &str;

    /// Get a description of what this processor does
    fn description(&self) -> &str;

    /// Rewrite the chunks in place
    ///
    /// The number of chunks never changes; only their text does.
    fn process(&self, chunks: &mut [String]) -> Result<()>;

    /// Check if this processor is enabled
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Arc-wrapped processor for thread-safe sharing
pub type ProcessorHandle = Arc<dyn ChunkProcessor>;

/// Chunk processor pipeline
///
/// Manages a sequence of processors that are applied to a chunked stream
/// in registration order.
///
/// # Example
/// ```ignore
/// let mut pipeline = ProcessorPipeline::new();
/// pipeline.register(Arc::new(SpeedChangeByLayer::new(first)));
/// pipeline.register(Arc::new(SpeedChangeByLayer::new(second)));
///
/// pipeline.process_chunks(&mut chunks)?;
/// ```
pub struct ProcessorPipeline {
    processors: Vec<ProcessorHandle>,
}

impl ProcessorPipeline {
    /// Create a new empty processor pipeline
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Register a processor in the pipeline
    ///
    /// Processors are applied in the order they are registered.
    pub fn register(&mut self, processor: ProcessorHandle) -> &mut Self {
        self.processors.push(processor);
        self
    }

    /// Register multiple processors at once
    pub fn register_all(&mut self, processors: Vec<ProcessorHandle>) -> &mut Self {
        self.processors.extend(processors);
        self
    }

    /// Get the number of registered processors
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Get a reference to a processor by name
    pub fn get_processor_by_name(&self, name: &str) -> Option<&ProcessorHandle> {
        self.processors.iter().find(|p| p.name() == name)
    }

    /// List all registered processors
    pub fn list_processors(&self) -> Vec<(&str, &str, bool)> {
        self.processors
            .iter()
            .map(|p| (p.name(), p.description(), p.is_enabled()))
            .collect()
    }

    /// Run every enabled processor over the chunks, in order
    pub fn process_chunks(&self, chunks: &mut [String]) -> Result<()> {
        for (index, processor) in self.processors.iter().enumerate() {
            if !processor.is_enabled() {
                tracing::debug!("Skipping disabled processor '{}'", processor.name());
                continue;
            }

            tracing::debug!(
                "Running processor #{} '{}' over {} chunks",
                index + 1,
                processor.name(),
                chunks.len()
            );

            if let Err(e) = processor.process(chunks) {
                tracing::warn!("Processor '{}' failed: {}", processor.name(), e);
                return Err(match e {
                    Error::Processor { .. } => e,
                    other => Error::processor(processor.name(), other.to_string()),
                });
            }
        }

        Ok(())
    }

    /// Clear all processors from the pipeline
    pub fn clear(&mut self) {
        self.processors.clear();
    }
}

impl Default for ProcessorPipeline {
    fn default() -> Self {
        Self::new()
    }
}
