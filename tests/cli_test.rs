use clap::Parser;
use layerspeed::{build_pipeline, process_text, resolve_settings, run, Cli, RewriteOptions};
use std::fs;
use tempfile::TempDir;

const SLICED: &str = ";FLAVOR:Marlin\n;Generated with Cura_SteamEngine 5.6.0\nG28\nM107\n\
;LAYER:0\nG1 X1 E1\n;LAYER:1\nM106 S255\nG1 X2 E2\n;LAYER:2\nG1 X3 E3\n;LAYER:3\nG1 X4 E4\nM84\n";

#[test]
fn test_cli_flags_enable_channels() {
    let cli = Cli::try_parse_from([
        "layerspeed",
        "in.gcode",
        "--layer",
        "2",
        "--layers",
        "2",
        "--fan-speed",
        "30",
    ])
    .unwrap();

    let settings = resolve_settings(&cli).unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0].layer_number, 2);
    assert_eq!(settings[0].number_of_layers, 2);
    assert!(settings[0].change_fan_speed);
    assert!(!settings[0].change_print_speed);
}

#[test]
fn test_cli_accepts_negative_layer_count() {
    let cli = Cli::try_parse_from(["layerspeed", "in.gcode", "--layers", "-3", "--layer", "-2"])
        .unwrap();
    assert_eq!(cli.layers, Some(-3));

    let settings = resolve_settings(&cli).unwrap();
    assert_eq!(settings[0].layer_number, -2);
    assert_eq!(settings[0].layer_count(), 1);
}

#[test]
fn test_cli_rejects_out_of_range_flag() {
    let cli = Cli::try_parse_from(["layerspeed", "in.gcode", "--fan-speed", "150"]).unwrap();
    assert!(resolve_settings(&cli).is_err());
}

#[test]
fn test_stacked_config_files() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.json");
    fs::write(&first, "layer_number = 2\nchange_print_speed = true\nprint_speed = 50\n").unwrap();
    fs::write(
        &second,
        r#"{"layer_number": 3, "change_fan_speed": true, "fan_speed": 20}"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "layerspeed",
        "in.gcode",
        "--config",
        first.to_str().unwrap(),
        "--config",
        second.to_str().unwrap(),
    ])
    .unwrap();

    let settings = resolve_settings(&cli).unwrap();
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[0].print_speed, 50);
    assert_eq!(settings[1].fan_speed, 20);

    let pipeline = build_pipeline(settings, RewriteOptions::default());
    let output = process_text(SLICED, &pipeline).unwrap();
    assert!(output.contains(";SpeedChangeByLayer instances: 2\n"));
    assert!(output.contains("M220 S50.000000"));
    assert!(output.contains("M106 S51.000000 ;Fan speed 20%"));
}

#[test]
fn test_run_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part.gcode");
    let output = dir.path().join("part_out.gcode");
    fs::write(&input, SLICED).unwrap();

    let cli = Cli::try_parse_from([
        "layerspeed",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--layer",
        "3",
        "--fan-speed",
        "50",
        "--legacy-execution",
    ])
    .unwrap();
    run(&cli).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    // Layer 1 set the fan to full before the override started at layer 2
    assert!(written.contains("M106 S127.500000 ;Fan speed 50%"));
    assert!(written.contains("M106 S255.000000 ;Resetting fan speed to 100%"));
    assert!(!written.contains("M84"));
}

#[test]
fn test_unlayered_input_is_an_error() {
    let pipeline = build_pipeline(vec![Default::default()], RewriteOptions::default());
    let err = process_text("G28\nG1 X1\n", &pipeline).unwrap_err();
    assert!(err.is_stream_error());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.gcode");
    let cli = Cli::try_parse_from(["layerspeed", missing.to_str().unwrap()]).unwrap();
    let err = run(&cli).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
