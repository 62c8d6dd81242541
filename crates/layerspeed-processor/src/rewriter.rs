//! Per-layer speed change
//!
//! Rewrites a chunked G-code stream so that print and/or fan speed are
//! overridden from a chosen layer for a number of layers, then put back to
//! what they were. Each application leaves an instance annotation behind so
//! that stacked applications can number themselves.

use layerspeed_core::{ChunkProcessor, Result};
use layerspeed_settings::SpeedChangeSettings;
use serde::{Deserialize, Serialize};

use crate::channel::SpeedChannels;
use crate::markers::{
    FAN_DUTY_COMMAND, FAN_OFF_COMMAND, INSTANCE_MARKER, LAYER_MARKER, PAUSE_COMMAND,
    RECALL_SETTINGS_COMMAND, STOP_MOTORS_COMMAND, STREAM_START_MARKER, TRANSFORM_TAG,
};
use crate::tracker::{LayerTracker, ScanPhase};

/// Version written into every generated annotation
pub const TRANSFORM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Switches for the legacy firmware paths, both off by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewriteOptions {
    /// Drop stop-motors and pause commands from the stream
    pub legacy_execution: bool,
    /// Restore with the firmware recall command on legacy firmware
    pub prior_value_unknown: bool,
}

/// Outcome of one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Instance number this application ran as
    pub instance: u32,
    pub overrides_inserted: usize,
    pub restores_inserted: usize,
    /// Fan duty written by the restore, 0 when no fan restore line was written
    pub prior_fan_duty: f64,
    pub phase: ScanPhase,
}

impl RewriteReport {
    /// True when the target layer was never found
    pub fn is_noop(&self) -> bool {
        self.overrides_inserted == 0 && self.restores_inserted == 0
    }
}

/// The per-layer speed change transform
#[derive(Debug, Clone)]
pub struct SpeedChangeByLayer {
    settings: SpeedChangeSettings,
    options: RewriteOptions,
}

impl SpeedChangeByLayer {
    pub fn new(settings: SpeedChangeSettings) -> Self {
        Self {
            settings,
            options: RewriteOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Rewrite every chunk in place
    pub fn execute(&self, chunks: &mut [String]) -> RewriteReport {
        let target_layer = self.settings.target_layer();
        let mut channels = SpeedChannels::from_settings(&self.settings);
        let mut tracker = LayerTracker::new(target_layer)
            .with_prior_value_unknown(self.options.prior_value_unknown);
        let mut report = RewriteReport {
            instance: 0,
            overrides_inserted: 0,
            restores_inserted: 0,
            prior_fan_duty: 0.0,
            phase: ScanPhase::BeforeTarget,
        };

        tracing::debug!(
            "Speed change from layer {} to layer {} over {} chunks",
            target_layer,
            self.settings.end_layer(),
            chunks.len()
        );

        for chunk in chunks.iter_mut() {
            channels.fan.prior_value = tracker.recover_prior_fan(chunk, channels.fan.prior_value);
            *chunk = self.rewrite_chunk(chunk, &mut tracker, &channels, &mut report);
        }

        report.instance = tracker.instance();
        report.phase = tracker.state().phase;
        report
    }

    fn rewrite_chunk(
        &self,
        chunk: &str,
        tracker: &mut LayerTracker,
        channels: &SpeedChannels,
        report: &mut RewriteReport,
    ) -> String {
        let target_layer = self.settings.target_layer();
        let end_layer = self.settings.end_layer();
        let mut output = String::with_capacity(chunk.len() + 256);

        for line in chunk.split('\n') {
            if line.trim().is_empty() {
                continue;
            }

            if line.contains(STREAM_START_MARKER) {
                let instance = tracker.begin_instance();
                output.push_str(&format!("{} {}\n", INSTANCE_MARKER, instance));
            }

            tracker.observe_flavor(line);

            let is_annotation = line.contains(INSTANCE_MARKER);
            if is_annotation {
                tracker.adopt_instance(line);
            }

            let is_boundary = line.contains(LAYER_MARKER);
            let mut generated = String::new();
            if is_boundary {
                let layer = tracker.enter_layer(line);

                if layer == target_layer
                    && tracker.state().completed_layers < self.settings.layer_count()
                {
                    generated.push_str(&self.override_block(tracker.instance(), channels));
                    tracker.mark_override();
                    report.overrides_inserted += 1;
                    tracing::debug!("Inserted speed override at layer {}", layer);
                }

                if layer == end_layer {
                    generated.push_str(&self.restore_block(tracker, channels));
                    if channels.fan.enabled && !tracker.should_recall() {
                        report.prior_fan_duty = channels.fan.prior_value;
                    }
                    tracker.mark_restore();
                    report.restores_inserted += 1;
                    tracing::debug!("Inserted speed restore at layer {}", layer);
                }
            }

            if is_annotation || self.is_suppressed_stop(line) {
                continue;
            }

            let current_layer = tracker.current_layer();
            if is_boundary && current_layer == target_layer {
                output.push_str(line);
                output.push('\n');
                output.push_str(&generated);
            } else if is_boundary && current_layer == end_layer {
                output.push_str(&generated);
                output.push_str(line);
                output.push('\n');
            } else if channels.fan.enabled
                && current_layer == target_layer
                && (line.contains(FAN_DUTY_COMMAND) || line.contains(FAN_OFF_COMMAND))
            {
                tracing::trace!("Dropping fan command '{}' inside override", line);
            } else {
                output.push_str(line);
                output.push('\n');
            }
        }

        output
    }

    fn is_suppressed_stop(&self, line: &str) -> bool {
        self.options.legacy_execution
            && (line.contains(STOP_MOTORS_COMMAND) || line.contains(PAUSE_COMMAND))
    }

    fn override_block(&self, instance: u32, channels: &SpeedChannels) -> String {
        let layer_count = self.settings.layer_count();
        let mut block = format!(
            "{} V{} instance #{}: Starting at layer {} for a total of {} {}\n",
            TRANSFORM_TAG,
            TRANSFORM_VERSION,
            instance,
            self.settings.target_layer(),
            layer_count,
            if layer_count > 1 { "layers" } else { "layer" }
        );
        for channel in channels.enabled() {
            block.push_str(&channel.override_line());
        }
        block
    }

    fn restore_block(&self, tracker: &LayerTracker, channels: &SpeedChannels) -> String {
        let mut block = format!(
            "{} V{}: Reset layer {}\n",
            TRANSFORM_TAG,
            TRANSFORM_VERSION,
            tracker.current_layer() - 1
        );
        if tracker.should_recall() {
            block.push_str(&format!(
                "{} S{};recalls saved settings\n",
                RECALL_SETTINGS_COMMAND,
                tracker.instance().saturating_sub(1)
            ));
        } else {
            for channel in channels.enabled() {
                block.push_str(&channel.restore_line());
            }
        }
        block
    }
}

impl ChunkProcessor for SpeedChangeByLayer {
    fn name(&self) -> &str {
        "speed_change_by_layer"
    }

    fn description(&self) -> &str {
        "Overrides print and fan speed for a range of layers, then restores them"
    }

    fn process(&self, chunks: &mut [String]) -> Result<()> {
        let report = self.execute(chunks);

        if report.is_noop() {
            tracing::warn!(
                "Layer {} not found; no speed change inserted",
                self.settings.layer_number
            );
        } else {
            tracing::info!(
                "Instance #{}: {} override(s), {} restore(s) from layer {}",
                report.instance,
                report.overrides_inserted,
                report.restores_inserted,
                self.settings.layer_number
            );
        }

        Ok(())
    }
}
