//! Layer tracking
//!
//! Keeps the state of one forward scan over a chunked stream: which layer is
//! being printed, how many stacked applications the stream has already seen,
//! which firmware flavor produced it, and which fan duty was in effect when
//! the target layer started.

use serde::{Deserialize, Serialize};

use crate::markers::{
    FAN_DUTY_ARGUMENT, FAN_DUTY_COMMAND, FAN_OFF_COMMAND, INSTANCE_MARKER, LAYER_MARKER,
    LEGACY_FLAVOR_MARKER,
};
use crate::value::{get_value, has_command};

/// Layer number used before any layer marker has been seen
pub const LAYER_SENTINEL: i64 = -100_000;

/// Where the scan is relative to the affected layer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanPhase {
    /// The override has not been inserted yet
    #[default]
    BeforeTarget,
    /// The override is in effect
    WithinOverride,
    /// The prior values have been restored
    AfterEnd,
}

/// Mutable state spanning one pass over the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    pub current_layer: i64,
    /// Layer counter of the fan pre-scan, kept apart from `current_layer`
    pub current_fan_layer: i64,
    /// Layers an override has been inserted into
    pub completed_layers: i64,
    pub legacy_firmware: bool,
    pub prior_value_unknown: bool,
    pub instance_counter: u32,
    pub phase: ScanPhase,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            current_layer: LAYER_SENTINEL,
            current_fan_layer: LAYER_SENTINEL,
            completed_layers: 0,
            legacy_firmware: false,
            prior_value_unknown: false,
            instance_counter: 0,
            phase: ScanPhase::BeforeTarget,
        }
    }
}

/// Layer number on a layer marker line, or `current` if it has none
pub fn layer_number(line: &str, current: i64) -> i64 {
    get_value(line, LAYER_MARKER, current as f64) as i64
}

/// Tracks layers, flavor and instance count while the rewriter walks the stream
#[derive(Debug, Clone)]
pub struct LayerTracker {
    target_layer: i64,
    state: ScanState,
}

impl LayerTracker {
    /// Create a tracker for a run starting its override at `target_layer`
    pub fn new(target_layer: i64) -> Self {
        Self {
            target_layer,
            state: ScanState::default(),
        }
    }

    /// Mark the prior values as unknown to the post-processor
    pub fn with_prior_value_unknown(mut self, unknown: bool) -> Self {
        self.state.prior_value_unknown = unknown;
        self
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn current_layer(&self) -> i64 {
        self.state.current_layer
    }

    pub fn instance(&self) -> u32 {
        self.state.instance_counter
    }

    /// Recover the fan duty in effect at the target layer from one chunk.
    ///
    /// A fan-off anywhere in the chunk resets the duty to 0. When the chunk
    /// sets a duty, its lines are walked on their own layer counter: below
    /// the target layer the running duty is followed, and on the target layer
    /// the last duty set wins.
    pub fn recover_prior_fan(&mut self, chunk: &str, prior: f64) -> f64 {
        let mut prior = prior;

        if chunk.contains(FAN_OFF_COMMAND) {
            prior = 0.0;
        }

        if !chunk.contains(FAN_DUTY_COMMAND) {
            return prior;
        }

        for line in chunk.split('\n') {
            if line.contains(LAYER_MARKER) {
                self.state.current_fan_layer = layer_number(line, self.state.current_fan_layer);
            }

            let fan_layer = self.state.current_fan_layer;
            if fan_layer > self.target_layer {
                continue;
            }

            if line.contains(FAN_DUTY_COMMAND) {
                prior = get_value(line, FAN_DUTY_ARGUMENT, prior);
                if fan_layer == self.target_layer {
                    tracing::debug!("Fan duty {} in effect at layer {}", prior, fan_layer);
                }
            } else if fan_layer < self.target_layer && has_command(line, FAN_OFF_COMMAND) {
                prior = 0.0;
            }
        }

        prior
    }

    /// Advance past a layer marker line and return the new layer
    pub fn enter_layer(&mut self, line: &str) -> i64 {
        self.state.current_layer = layer_number(line, self.state.current_layer);
        self.state.current_layer
    }

    /// Note the firmware flavor if this line names the legacy one
    pub fn observe_flavor(&mut self, line: &str) {
        if !self.state.legacy_firmware && line.contains(LEGACY_FLAVOR_MARKER) {
            tracing::debug!("Legacy firmware flavor detected");
            self.state.legacy_firmware = true;
        }
    }

    /// Count a new slicer generation and return the instance number
    pub fn begin_instance(&mut self) -> u32 {
        self.state.instance_counter += 1;
        self.state.instance_counter
    }

    /// Adopt the count recorded by a previous application's annotation
    pub fn adopt_instance(&mut self, line: &str) {
        let previous = line
            .find(INSTANCE_MARKER)
            .map(|i| &line[i + INSTANCE_MARKER.len()..])
            .and_then(|rest| rest.trim().parse::<u32>().ok())
            .unwrap_or(self.state.instance_counter);

        tracing::debug!("Found {} earlier application(s) in stream", previous);
        self.state.instance_counter = previous;
    }

    /// Record that the override was inserted at the current layer
    pub fn mark_override(&mut self) {
        self.state.completed_layers += 1;
        self.state.phase = ScanPhase::WithinOverride;
    }

    /// Record that the prior values were restored
    pub fn mark_restore(&mut self) {
        self.state.phase = ScanPhase::AfterEnd;
    }

    /// True when a restore should recall saved firmware settings instead
    pub fn should_recall(&self) -> bool {
        self.state.legacy_firmware && self.state.prior_value_unknown
    }
}
