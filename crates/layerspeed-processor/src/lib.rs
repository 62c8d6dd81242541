//! # LayerSpeed Processor
//!
//! Per-layer print and fan speed overrides for chunked 3D-printer G-code.
//!
//! - **Value extraction**: comment-aware reading of numbers after a marker
//! - **Layer tracking**: current layer, instance count and prior fan duty
//! - **Stream rewriting**: override and restore blocks at layer boundaries

pub mod channel;
pub mod markers;
pub mod rewriter;
pub mod tracker;
pub mod value;

pub use channel::{ChannelKind, SpeedChannel, SpeedChannels};
pub use rewriter::{RewriteOptions, RewriteReport, SpeedChangeByLayer, TRANSFORM_VERSION};
pub use tracker::{LayerTracker, ScanPhase, ScanState, LAYER_SENTINEL};
pub use value::get_value;
