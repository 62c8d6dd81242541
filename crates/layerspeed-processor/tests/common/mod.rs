#![allow(dead_code)]

/// A small slicer-style stream: header chunk, start chunk, one chunk per
/// layer and fan/extrusion moves in each layer.
pub fn sample_stream(layers: i64) -> Vec<String> {
    let mut chunks = vec![
        ";FLAVOR:Marlin\n;TIME:1234\n;Generated with Cura_SteamEngine 5.6.0\n".to_string(),
        "G28 ;Home\nM107\n\n;LAYER_COUNT:".to_string() + &layers.to_string() + "\n",
    ];
    for layer in 0..layers {
        chunks.push(format!(
            ";LAYER:{layer}\nG0 F6000 X10 Y10 Z{z:.1}\nG1 F1500 X20 Y20 E{layer}.5\n",
            z = 0.2 * (layer + 1) as f64
        ));
    }
    chunks.push(";TIME_ELAPSED:1234\nM107\nM84\n".to_string());
    chunks
}

/// Flatten chunks into output lines
pub fn output_lines(chunks: &[String]) -> Vec<String> {
    chunks.concat().lines().map(str::to_string).collect()
}

/// Index of the first line equal to `needle`
pub fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|l| l == needle)
        .unwrap_or_else(|| panic!("line '{}' not found", needle))
}
