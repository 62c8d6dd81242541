//! CLI argument definitions.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "layerspeed",
    version,
    about = "Override print and fan speed for a range of layers in sliced G-code"
)]
pub struct Cli {
    /// G-code file produced by the slicer
    #[arg(value_name = "INPUT", required_unless_present = "schema")]
    pub input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Settings file (JSON or TOML); repeat to stack several applications
    #[arg(short, long, value_name = "FILE", action = ArgAction::Append)]
    pub config: Vec<PathBuf>,

    /// First affected layer, 1-based as shown in the slicer
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub layer: Option<i64>,

    /// Number of affected layers
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub layers: Option<i64>,

    /// Print speed in percent of the original; enables the print speed change
    #[arg(long, value_name = "PERCENT")]
    pub print_speed: Option<i64>,

    /// Fan speed in percent of full duty; enables the fan speed change
    #[arg(long, value_name = "PERCENT")]
    pub fan_speed: Option<i64>,

    /// Drop stop-motors and pause commands from the stream
    #[arg(long, action = ArgAction::SetTrue)]
    pub legacy_execution: bool,

    /// Restore with the firmware recall command on legacy firmware
    #[arg(long, action = ArgAction::SetTrue)]
    pub prior_unknown: bool,

    /// Print the settings schema as JSON and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub schema: bool,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}
