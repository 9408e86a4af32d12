//! Human-readable rendering of a [`Report`].
//!
//! Pure string formatting; printing and JSON output live in the CLI.

use std::fmt::Write;

use crate::analyzer::Report;

/// Format a duration in seconds as `HH:MM:SS`, or `DD:HH:MM:SS` once it
/// reaches a day.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let secs = total % 60;

    if days > 0 {
        format!("{days:02}:{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

/// Format a number with thousands separators, e.g. `1,234,567.8`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Render the analysis report as the CLI's text output.
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("=== G-code Analysis ===\n");
    let _ = writeln!(
        out,
        "File size:   {} bytes",
        format_grouped(report.file_size as f64, 0)
    );
    let _ = writeln!(
        out,
        "Lines:       {} total / {} commands",
        format_grouped(report.total_lines as f64, 0),
        format_grouped(report.command_lines as f64, 0)
    );
    let _ = writeln!(
        out,
        "Layers:      {} by height / {} by slicer ({:.2} mm layer height)",
        report.layer_count_height, report.layer_count_slicer, report.layer_height
    );
    let _ = writeln!(out, "Print time:  {}", format_duration(report.print_time));
    let _ = writeln!(
        out,
        "Filament:    {} mm ({:.1} m)",
        format_grouped(report.extrusion, 1),
        report.extrusion / 1000.0
    );
    let _ = writeln!(
        out,
        "Material:    {:.1} cm3 / {:.1} g",
        report.filament_volume, report.filament_weight
    );

    if !report.objects.is_empty() {
        let _ = writeln!(out, "Objects:     {}", report.objects.len());
        for object in &report.objects {
            let _ = writeln!(
                out,
                "  {:<20} {}",
                object.name,
                format_duration(object.print_time)
            );
        }
    }

    if !report.layer_times.is_empty() {
        out.push_str("Per-layer times:\n");
        for (index, duration) in &report.layer_times {
            let _ = writeln!(out, "  layer {index:<5} {}", format_duration(*duration));
        }
    }

    out
}
