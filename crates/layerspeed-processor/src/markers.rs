//! Literal markers and commands recognized in the instruction stream

pub use layerspeed_core::LAYER_MARKER;

/// Comment start for slicer G-code
pub const COMMENT_START: char = ';';

/// Written once per slicer run at the top of the stream
pub const STREAM_START_MARKER: &str = ";Generated with Cura_SteamEngine";

/// Flavor line identifying firmware with speed save/recall support
pub const LEGACY_FLAVOR_MARKER: &str = "FLAVOR:UltiGCode";

/// Prefix shared by every comment line this transform writes
pub const TRANSFORM_TAG: &str = ";SpeedChangeByLayer";

/// Instance-count annotation left in the stream by each application
pub const INSTANCE_MARKER: &str = ";SpeedChangeByLayer instances:";

/// Print/travel speed factor override
pub const PRINT_SPEED_COMMAND: &str = "M220";

/// Recall saved print and fan speeds (legacy firmware only)
pub const RECALL_SETTINGS_COMMAND: &str = "M606";

/// Fan duty
pub const FAN_DUTY_COMMAND: &str = "M106";

/// Fan off
pub const FAN_OFF_COMMAND: &str = "M107";

/// Argument marker of a fan duty command
pub const FAN_DUTY_ARGUMENT: &str = "M106 S";

/// Disable steppers
pub const STOP_MOTORS_COMMAND: &str = "M84";

/// Pause SD print
pub const PAUSE_COMMAND: &str = "M25";
