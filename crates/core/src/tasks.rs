//! Task name utilities and color management
//!
//! Consistent label colors for task targets in terminal output.

use colored::*;

/// Get a consistent color for a task target label
pub fn get_target_color(label: &str) -> Color {
    // Use a simple hash of the label bytes for consistent colors
    let hash = label
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Jewel tones that stay clear of the green/yellow/red used for ok/warn/fail lines
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        }, // Medium slate blue
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        }, // Turquoise
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        }, // Medium violet red
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        }, // Medium turquoise
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        }, // Blue violet
    ];

    colors[(hash % colors.len() as u64) as usize]
}

/// Split `task[:target]` into its parts
pub fn parse_target_spec(spec: &str) -> (String, Option<String>) {
    match spec.split_once(':') {
        Some((task, target)) if !target.is_empty() => (task.to_string(), Some(target.to_string())),
        Some((task, _)) => (task.to_string(), None),
        None => (spec.to_string(), None),
    }
}
