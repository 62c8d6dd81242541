//! Marker value extraction
//!
//! Reads the number that immediately follows a marker on a single G-code
//! line. Anything after a `;` is a comment and is ignored, except for the
//! layer marker and this transform's own annotations, which live inside
//! comments to begin with.

use regex::Regex;
use std::sync::OnceLock;

use crate::markers::{COMMENT_START, LAYER_MARKER, TRANSFORM_TAG};

fn instance_regex() -> &'static Regex {
    static INSTANCE_REGEX: OnceLock<Regex> = OnceLock::new();
    INSTANCE_REGEX.get_or_init(|| Regex::new(r"^[0-4]").expect("invalid regex pattern"))
}

fn layer_regex() -> &'static Regex {
    static LAYER_REGEX: OnceLock<Regex> = OnceLock::new();
    LAYER_REGEX.get_or_init(|| Regex::new(r"^[+-]?[0-9]*").expect("invalid regex pattern"))
}

fn argument_regex() -> &'static Regex {
    // Leading minus allowed for delta printers
    static ARGUMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    ARGUMENT_REGEX.get_or_init(|| Regex::new(r"^-?[0-9]*\.?[0-9]*").expect("invalid regex pattern"))
}

/// Markers that may legitimately appear inside a comment
fn is_comment_marker(marker: &str) -> bool {
    marker.contains(TRANSFORM_TAG) || marker.contains(LAYER_MARKER)
}

/// Get the numeric value following `marker` in `line`, or `default`.
///
/// ```
/// use layerspeed_processor::value::get_value;
///
/// assert_eq!(get_value("M106 S127.5", "M106 S", 0.0), 127.5);
/// assert_eq!(get_value(";LAYER:12", ";LAYER:", -1.0), 12.0);
/// assert_eq!(get_value("G1 X1 ;M106 S255", "M106 S", 0.0), 0.0);
/// ```
pub fn get_value(line: &str, marker: &str, default: f64) -> f64 {
    let Some(position) = line.find(marker) else {
        return default;
    };

    if let Some(comment) = line.find(COMMENT_START) {
        if position > comment && !is_comment_marker(marker) {
            return default;
        }
    }

    let rest = &line[position + marker.len()..];
    let regex = if marker.contains(TRANSFORM_TAG) {
        instance_regex()
    } else if marker.contains(LAYER_MARKER) {
        layer_regex()
    } else {
        argument_regex()
    };

    regex
        .find(rest)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(default)
}

/// True when `command` occurs on the line ahead of any comment
pub fn has_command(line: &str, command: &str) -> bool {
    match (line.find(command), line.find(COMMENT_START)) {
        (Some(position), Some(comment)) => position < comment,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_marker_returns_default() {
        assert_eq!(get_value("G1 X10 Y10", "M220 S", 42.0), 42.0);
        assert_eq!(get_value("", ";LAYER:", -100000.0), -100000.0);
    }

    #[test]
    fn test_command_arguments() {
        assert_eq!(get_value("M220 S75", "M220 S", 100.0), 75.0);
        assert_eq!(get_value("M106 S127.500000 ;Fan speed", "M106 S", 0.0), 127.5);
        assert_eq!(get_value("G1 Z-0.25", "Z", 0.0), -0.25);
        assert_eq!(get_value("G1 Z.5", "Z", 0.0), 0.5);
        assert_eq!(get_value("G1 Z5.", "Z", 0.0), 5.0);
    }

    #[test]
    fn test_malformed_argument_returns_default() {
        assert_eq!(get_value("M106 S", "M106 S", 7.0), 7.0);
        assert_eq!(get_value("M106 S-", "M106 S", 7.0), 7.0);
        assert_eq!(get_value("M106 Sabc", "M106 S", 7.0), 7.0);
        assert_eq!(get_value("M106 S.", "M106 S", 7.0), 7.0);
    }

    #[test]
    fn test_match_is_anchored_after_marker() {
        assert_eq!(get_value("M106 S 255", "M106 S", 3.0), 3.0);
        assert_eq!(get_value("M220 Sx50", "M220 S", 100.0), 100.0);
    }

    #[test]
    fn test_commented_out_command_is_ignored() {
        assert_eq!(get_value(";M106 S255", "M106 S", 0.0), 0.0);
        assert_eq!(get_value("G1 X1 ; M220 S50", "M220 S", 100.0), 100.0);
    }

    #[test]
    fn test_has_command() {
        assert!(has_command("M107", "M107"));
        assert!(has_command("M107 ;fan off", "M107"));
        assert!(!has_command(";M107", "M107"));
        assert!(!has_command("G1 X1", "M107"));
    }

    #[test]
    fn test_layer_marker() {
        assert_eq!(get_value(";LAYER:0", ";LAYER:", -1.0), 0.0);
        assert_eq!(get_value(";LAYER:-3", ";LAYER:", 0.0), -3.0);
        assert_eq!(get_value(";LAYER:+4", ";LAYER:", 0.0), 4.0);
        // Integer only: the fraction is not part of the match
        assert_eq!(get_value(";LAYER:5.5", ";LAYER:", 0.0), 5.0);
        assert_eq!(get_value(";LAYER:", ";LAYER:", 9.0), 9.0);
        assert_eq!(get_value("G1 X1 ;LAYER:8", ";LAYER:", 0.0), 8.0);
    }

    #[test]
    fn test_instance_marker_reads_single_digit() {
        let marker = ";SpeedChangeByLayer instances: ";
        assert_eq!(get_value(";SpeedChangeByLayer instances: 3", marker, 0.0), 3.0);
        assert_eq!(get_value(";SpeedChangeByLayer instances: 47", marker, 0.0), 4.0);
        assert_eq!(get_value(";SpeedChangeByLayer instances: 9", marker, 1.0), 1.0);
    }
}
