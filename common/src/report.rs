//! Human readable renderings of a [`Reading`].

use crate::reading::Reading;

/// Columns of the 128 pixel wide OLED with a 5x8 font.
pub const OLED_COLUMNS: usize = 25;

/// One line per known value for the console. NaN values are left out.
pub fn console_lines(reading: &Reading) -> Vec<String> {
    let entries = [
        ("MassConcentrationPm1p0", reading.pm1_0),
        ("MassConcentrationPm2p5", reading.pm2_5),
        ("MassConcentrationPm4p0", reading.pm4_0),
        ("MassConcentrationPm10p0", reading.pm10_0),
        ("AmbientHumidity", reading.humidity),
        ("AmbientTemperature", reading.temperature),
        ("VocIndex", reading.voc_index),
        ("NoxIndex", reading.nox_index),
    ];

    let mut lines: Vec<String> = entries
        .iter()
        .filter(|(_, value)| !value.is_nan())
        .map(|(name, value)| format!("{name}: {value:.2}"))
        .collect();

    if !reading.co2.is_nan() {
        lines.push(format!("CO2: {:.3} ppm", reading.co2));
    }

    lines
}

/// The screen contents, hard wrapped to `columns`.
pub fn screen_lines(reading: &Reading, title: &str, columns: usize) -> Vec<String> {
    let lines = [
        title.to_string(),
        format!("PM2.5: {:.2}ug/m3", reading.pm2_5),
        format!("Humidity: {:.2}%", reading.humidity),
        format!("Temperature: {:.2} C", reading.temperature),
        format!("VOC Index: {:.2}", reading.voc_index),
        format!("NOX Index: {:.2}", reading.nox_index),
        format!("CO2: {:.2}ppm", reading.co2),
    ];

    lines.iter().flat_map(|l| wrap(l, columns)).collect()
}

/// Splits `line` into chunks of at most `columns` characters.
pub fn wrap(line: &str, columns: usize) -> Vec<String> {
    if line.is_empty() || columns == 0 {
        return vec![line.to_string()];
    }

    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(columns)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
