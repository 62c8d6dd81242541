//! Speed channels
//!
//! One channel per quantity the transform can override. A channel knows the
//! command that sets it, the value it is overridden to and the value it is
//! restored to once the affected layers are done.

use layerspeed_settings::config::MAX_FAN_DUTY;
use layerspeed_settings::SpeedChangeSettings;
use serde::{Deserialize, Serialize};

use crate::markers::{FAN_DUTY_COMMAND, PRINT_SPEED_COMMAND};

/// Reference print speed factor, in percent
pub const REFERENCE_PRINT_SPEED: f64 = 100.0;

/// Quantity controlled by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Print and travel speed factor (`M220`)
    PrintSpeed,
    /// Part cooling fan duty (`M106`)
    FanSpeed,
}

impl ChannelKind {
    /// G-code command that sets this quantity
    pub fn command(&self) -> &'static str {
        match self {
            Self::PrintSpeed => PRINT_SPEED_COMMAND,
            Self::FanSpeed => FAN_DUTY_COMMAND,
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrintSpeed => write!(f, "print speed"),
            Self::FanSpeed => write!(f, "fan speed"),
        }
    }
}

/// One overridable quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedChannel {
    pub kind: ChannelKind,
    pub enabled: bool,
    /// Percentage as entered by the user
    pub user_percent: i64,
    /// Command argument applied while overriding
    pub target_value: f64,
    /// Command argument restored at the end layer
    pub prior_value: f64,
}

impl SpeedChannel {
    /// Print speed channel; always restores to the reference 100%
    pub fn print_speed(enabled: bool, percent: i64) -> Self {
        Self {
            kind: ChannelKind::PrintSpeed,
            enabled,
            user_percent: percent,
            target_value: percent as f64,
            prior_value: REFERENCE_PRINT_SPEED,
        }
    }

    /// Fan channel overriding to `duty`; the prior duty starts at 0 (fan off)
    pub fn fan_speed(enabled: bool, percent: i64, duty: f64) -> Self {
        Self {
            kind: ChannelKind::FanSpeed,
            enabled,
            user_percent: percent,
            target_value: duty,
            prior_value: 0.0,
        }
    }

    /// Command line applying the override, with its inline comment
    pub fn override_line(&self) -> String {
        match self.kind {
            ChannelKind::PrintSpeed => format!(
                "{} S{:.6} ;Print speed {}% of original speed\n",
                self.kind.command(),
                self.target_value,
                self.user_percent
            ),
            ChannelKind::FanSpeed => format!(
                "{} S{:.6} ;Fan speed {}% of 100% [% of 255]\n",
                self.kind.command(),
                self.target_value,
                self.user_percent
            ),
        }
    }

    /// Command line restoring the prior value, with its inline comment
    pub fn restore_line(&self) -> String {
        match self.kind {
            ChannelKind::PrintSpeed => format!(
                "{} S{:.6} ;Resetting print speed to {}%\n",
                self.kind.command(),
                self.prior_value,
                self.prior_value
            ),
            ChannelKind::FanSpeed => format!(
                "{} S{:.6} ;Resetting fan speed to {:.0}% [% of 255]\n",
                self.kind.command(),
                self.prior_value,
                self.prior_value * 100.0 / MAX_FAN_DUTY
            ),
        }
    }
}

/// The channels of one run, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedChannels {
    pub print: SpeedChannel,
    pub fan: SpeedChannel,
}

impl SpeedChannels {
    pub fn from_settings(settings: &SpeedChangeSettings) -> Self {
        Self {
            print: SpeedChannel::print_speed(settings.change_print_speed, settings.print_speed),
            fan: SpeedChannel::fan_speed(
                settings.change_fan_speed,
                settings.fan_speed,
                settings.fan_duty(),
            ),
        }
    }

    /// Enabled channels, print speed first
    pub fn enabled(&self) -> impl Iterator<Item = &SpeedChannel> {
        [&self.print, &self.fan].into_iter().filter(|c| c.enabled)
    }
}
