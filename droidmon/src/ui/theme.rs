//! Shared UI theme constants.

use droidmon::sample::Metric;
use ratatui::style::Color;

pub fn metric_color(m: Metric) -> Color {
    match m {
        Metric::Fps => Color::Rgb(75, 192, 192),
        Metric::Cpu => Color::Rgb(255, 99, 132),
        Metric::Gpu => Color::Rgb(54, 162, 235),
        Metric::Power => Color::Rgb(255, 159, 64),
    }
}

// Load thresholds shared by per-core rows and the GPU gauge
pub fn load_color(pct: f64) -> Color {
    match pct {
        x if x < 25.0 => Color::Green,
        x if x < 60.0 => Color::Yellow,
        _ => Color::Red,
    }
}

pub const NOTICE_BORDER: Color = Color::Rgb(170, 170, 180);
