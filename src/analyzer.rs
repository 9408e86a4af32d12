//! Run aggregator.
//!
//! Drives the strict left-to-right scan over a G-code stream: classify
//! each line, update the modal state, charge move and dwell durations,
//! and fold everything into an immutable [`Report`] at end of stream.
//! Malformed lines never abort an analysis.

use std::collections::BTreeMap;
use std::io::BufRead;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::PrinterConfig;
use crate::kinematics::{dwell_time, move_time};
use crate::layers::{LayerClock, ObjectTracker, ZHeights};
use crate::parser::{LineEvent, MoveArgs, parse_line};
use crate::state::MachineState;

/// Final analysis result for one G-code stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Input size in bytes, carried through from the I/O layer.
    pub file_size: u64,
    /// All lines seen, including blanks and comments.
    pub total_lines: u64,
    /// Lines classified as a recognized command or layer marker.
    pub command_lines: u64,
    /// Distinct Z heights visited by motion.
    pub layer_count_height: usize,
    /// Layers announced by slicer markers: max(index) + 1.
    pub layer_count_slicer: u32,
    /// Estimated layer height, mm (0.0 when indeterminate).
    pub layer_height: f64,
    /// Net filament length pushed, mm (signed; retractions subtract).
    pub extrusion: f64,
    /// Filament volume, cm^3.
    pub filament_volume: f64,
    /// Filament mass, g.
    pub filament_weight: f64,
    /// Total simulated print time, seconds.
    pub print_time: f64,
    /// Simulated seconds spent in each slicer-announced layer.
    pub layer_times: BTreeMap<u32, f64>,
    /// Per-object print times, in definition order.
    pub objects: Vec<ObjectReport>,
}

/// Simulated time attributed to one exclude-object region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectReport {
    pub name: String,
    pub print_time: f64,
}

/// Incremental single-pass analyzer. Feed lines in order, then call
/// [`Analyzer::finish`].
#[derive(Debug)]
pub struct Analyzer<'a> {
    config: &'a PrinterConfig,
    state: MachineState,
    z_heights: ZHeights,
    layers: LayerClock,
    objects: ObjectTracker,
    total_lines: u64,
    command_lines: u64,
    extrusion: f64,
    print_time: f64,
    file_size: u64,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a PrinterConfig) -> Self {
        Self {
            config,
            state: MachineState::new(config.default_feedrate),
            z_heights: ZHeights::new(),
            layers: LayerClock::new(),
            objects: ObjectTracker::new(),
            total_lines: 0,
            command_lines: 0,
            extrusion: 0.0,
            print_time: 0.0,
            file_size: 0,
        }
    }

    /// Record the input size to carry into the report.
    pub fn set_file_size(&mut self, bytes: u64) {
        self.file_size = bytes;
    }

    /// Interpret one line and fold its effects into the running state.
    pub fn process_line(&mut self, line: &str) {
        self.total_lines += 1;

        let event = parse_line(line);
        if event != LineEvent::Unrecognized {
            self.command_lines += 1;
        }

        match event {
            LineEvent::Move(args) => {
                let duration = self.apply_move(&args);
                self.add_time(duration);
            }
            LineEvent::Dwell { p, s } => self.add_time(dwell_time(p, s)),
            LineEvent::SetPositionMode(mode) => self.state.set_position_mode(mode),
            LineEvent::SetExtrusionMode(mode) => self.state.set_extrusion_mode(mode),
            LineEvent::SetPosition(args) => self.state.set_logical_position(&args),
            LineEvent::LayerMarker(index) => self.layers.on_marker(index, self.print_time),
            LineEvent::ObjectDefine(name) => self.objects.define(&name),
            LineEvent::ObjectStart(name) => self.objects.start(&name),
            LineEvent::ObjectEnd => self.objects.end(),
            LineEvent::Unrecognized => {}
        }
    }

    fn add_time(&mut self, duration: f64) {
        self.print_time += duration;
        self.objects.charge(duration);
    }

    fn apply_move(&mut self, args: &MoveArgs) -> f64 {
        self.state.update_feedrate(args.f);

        let (next_x, next_y, next_z) = self.state.target_position(args);
        let delta_e = self.state.extrusion_delta(args.e);

        let distance_xy = (next_x - self.state.x).hypot(next_y - self.state.y);
        let distance_z = (next_z - self.state.z).abs();

        // A line with no motion and no E word costs nothing
        let duration = if distance_xy > 0.0 || distance_z > 0.0 || args.e.is_some() {
            move_time(
                self.config,
                distance_xy,
                distance_z,
                delta_e.abs(),
                self.state.feedrate,
                delta_e > 0.0,
            )
        } else {
            0.0
        };

        self.state.x = next_x;
        self.state.y = next_y;
        if next_z != self.state.z {
            self.z_heights.record(next_z);
            self.state.z = next_z;
        }

        self.extrusion += delta_e;
        self.state.commit_extrusion(args.e);

        duration
    }

    /// Close the final layer and derive the material totals.
    pub fn finish(mut self) -> Report {
        self.layers.finish(self.print_time);

        let filament_radius = self.config.filament_diameter / 2.0;
        let filament_volume =
            std::f64::consts::PI * filament_radius * filament_radius * self.extrusion / 1000.0;

        Report {
            file_size: self.file_size,
            total_lines: self.total_lines,
            command_lines: self.command_lines,
            layer_count_height: self.z_heights.count(),
            layer_count_slicer: self.layers.count(),
            layer_height: self.z_heights.layer_height(),
            extrusion: self.extrusion,
            filament_volume,
            filament_weight: filament_volume * self.config.filament_density,
            print_time: self.print_time,
            layer_times: self.layers.into_times(),
            objects: self
                .objects
                .into_totals()
                .into_iter()
                .map(|(name, print_time)| ObjectReport { name, print_time })
                .collect(),
        }
    }
}

/// Analyze an in-memory sequence of lines.
pub fn analyze<I>(lines: I, config: &PrinterConfig) -> Report
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut analyzer = Analyzer::new(config);
    for line in lines {
        analyzer.process_line(line.as_ref());
    }
    analyzer.finish()
}

/// Analyze a stream line by line without loading it whole. `file_size`
/// comes from the caller owning the I/O (e.g. file metadata).
pub fn analyze_reader<R: BufRead>(
    mut reader: R,
    config: &PrinterConfig,
    file_size: u64,
) -> Result<Report> {
    let mut analyzer = Analyzer::new(config);
    analyzer.set_file_size(file_size);

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .context("failed to read G-code stream")?;
        if read == 0 {
            break;
        }
        analyzer.process_line(line.trim_end_matches(['\n', '\r']));
    }

    Ok(analyzer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn run(lines: &[&str]) -> Report {
        analyze(lines, &PrinterConfig::default())
    }

    #[test]
    fn test_empty_stream() {
        let report = run(&[]);
        assert_eq!(report.total_lines, 0);
        assert_eq!(report.print_time, 0.0);
        assert_eq!(report.extrusion, 0.0);
        assert_eq!(report.layer_count_height, 0);
        assert_eq!(report.layer_count_slicer, 0);
    }

    #[test]
    fn test_line_counting() {
        let report = run(&[
            "; generated by slicer",
            "G90",
            "",
            "M104 S200",
            "G1 X10 F600",
        ]);
        assert_eq!(report.total_lines, 5);
        // G90 and the move; the comment, blank, and M104 are skipped
        assert_eq!(report.command_lines, 2);
    }

    #[test]
    fn test_move_with_no_axis_words_is_free() {
        let report = run(&["G1 F1200", "G1"]);
        assert_eq!(report.print_time, 0.0);
        assert_eq!(report.extrusion, 0.0);
    }

    #[test]
    fn test_fixed_regression_scenario() {
        // G1 X10 F600: travel, 10 mm at 10 mm/s, a=500 -> 1.02 s
        // G1 X20 E5 F600: print, XY 1.02 s vs E 0.54 s -> 1.02 s
        // G4 P500: 0.5 s
        let report = run(&["G90", "G1 X10 F600", "G1 X20 E5 F600", "G4 P500"]);
        assert!((report.print_time - 2.54).abs() < EPS);
        assert!((report.extrusion - 5.0).abs() < EPS);
    }

    #[test]
    fn test_absolute_extrusion_dedupes() {
        let report = run(&["M82", "G1 X10 E5 F600", "G1 X20 E5 F600"]);
        assert!((report.extrusion - 5.0).abs() < EPS);
    }

    #[test]
    fn test_g90_reverts_extrusion_mode() {
        // G90 switches extrusion back to absolute, so a late M83 must
        // come after it to stick
        let report = run(&["M83", "G90", "G1 X10 E5 F600", "G1 X20 E5 F600"]);
        assert!((report.extrusion - 5.0).abs() < EPS);
    }

    #[test]
    fn test_relative_extrusion_accumulates() {
        let report = run(&["M83", "G1 X10 E5 F600", "G1 X20 E5 F600"]);
        assert!((report.extrusion - 10.0).abs() < EPS);
    }

    #[test]
    fn test_retraction_subtracts() {
        let report = run(&["M83", "G1 X10 E5 F600", "G1 E-2 F600"]);
        assert!((report.extrusion - 3.0).abs() < EPS);
    }

    #[test]
    fn test_g92_extruder_reset() {
        // Absolute mode: G92 E0 rebases the logical position, so the
        // following E2 is 2 mm of new filament, not -78
        let report = run(&["M82", "G1 X10 E80 F600", "G92 E0", "G1 X20 E2 F600"]);
        assert!((report.extrusion - 82.0).abs() < EPS);
    }

    #[test]
    fn test_height_based_layers() {
        let report = run(&[
            "G1 Z0.2 F600",
            "G1 X10 F600",
            "G1 Z0.4 F600",
            "G1 Z0.2 F600", // revisit
            "G1 Z0.4 F600", // revisit
        ]);
        assert_eq!(report.layer_count_height, 2);
    }

    #[test]
    fn test_relative_moves() {
        let report = run(&["G91", "G1 X3 F600", "G1 X4 Y-3 F600"]);
        // Ends at (7, -3); both deltas are pure XY travel
        assert_eq!(report.command_lines, 3);
        assert!(report.print_time > 0.0);
    }

    #[test]
    fn test_layer_times_sum_to_total() {
        let report = run(&[
            ";LAYER:0",
            "G1 X10 F600",
            "G1 X20 E5 F600",
            ";LAYER:1",
            "G1 X30 F600",
            "G4 P250",
        ]);
        assert_eq!(report.layer_count_slicer, 2);
        let sum: f64 = report.layer_times.values().sum();
        assert!((sum - report.print_time).abs() < EPS);
    }

    #[test]
    fn test_klipper_layer_marker() {
        let report = run(&[
            "SET_PRINT_STATS_INFO CURRENT_LAYER=0",
            "G1 X10 F600",
            "SET_PRINT_STATS_INFO CURRENT_LAYER=1",
        ]);
        assert_eq!(report.layer_count_slicer, 2);
    }

    #[test]
    fn test_move_with_trailing_layer_comment_still_moves() {
        let report = run(&["G1 Z0.4 F600 ;LAYER:3"]);
        assert!(report.print_time > 0.0);
        assert_eq!(report.layer_count_height, 1);
        // The comment does not double as a layer marker
        assert_eq!(report.layer_count_slicer, 0);
    }

    #[test]
    fn test_huge_layer_index_does_not_abort() {
        let report = run(&[";LAYER:4294967295", "G1 X10 F600"]);
        assert_eq!(report.layer_count_slicer, u32::MAX);
        assert!(report.print_time > 0.0);
    }

    #[test]
    fn test_object_time_split() {
        let report = run(&[
            "EXCLUDE_OBJECT_DEFINE NAME=cube",
            "EXCLUDE_OBJECT_DEFINE NAME=cylinder",
            "EXCLUDE_OBJECT_START NAME=cube",
            "G1 X10 F600",
            "EXCLUDE_OBJECT_END",
            "G1 X20 F600", // travel between objects, unattributed
            "EXCLUDE_OBJECT_START NAME=cylinder",
            "G4 S2",
            "EXCLUDE_OBJECT_END",
        ]);

        assert_eq!(report.objects.len(), 2);
        assert_eq!(report.objects[0].name, "cube");
        assert!((report.objects[0].print_time - 1.02).abs() < EPS);
        assert_eq!(report.objects[1].name, "cylinder");
        assert!((report.objects[1].print_time - 2.0).abs() < EPS);

        let attributed: f64 = report.objects.iter().map(|o| o.print_time).sum();
        assert!(attributed < report.print_time);
    }

    #[test]
    fn test_material_derivation() {
        let config = PrinterConfig::default();
        let report = analyze(["M83", "G1 X100 E90 F600"], &config);

        let radius = config.filament_diameter / 2.0;
        let expected_volume = std::f64::consts::PI * radius * radius * 90.0 / 1000.0;
        assert!((report.filament_volume - expected_volume).abs() < EPS);
        assert!(
            (report.filament_weight - expected_volume * config.filament_density).abs() < EPS
        );
    }

    #[test]
    fn test_mass_linear_in_density() {
        let lines = ["M83", "G1 X100 E90 F600"];
        let base = PrinterConfig::default();
        let dense = PrinterConfig {
            filament_density: base.filament_density * 2.0,
            ..base.clone()
        };

        let light = analyze(lines, &base);
        let heavy = analyze(lines, &dense);
        assert!((heavy.filament_weight - 2.0 * light.filament_weight).abs() < EPS);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let lines = [
            "G90",
            ";LAYER:0",
            "G1 X10 Y5 Z0.2 E1.5 F1500",
            "G4 S1",
            ";LAYER:1",
            "G1 X0 Y0 E3 F1500",
        ];
        let config = PrinterConfig::default();
        assert_eq!(analyze(lines, &config), analyze(lines, &config));
    }

    #[test]
    fn test_reader_matches_slices() {
        use std::io::Cursor;

        let text = "G90\nG1 X10 F600\nG1 X20 E5 F600\nG4 P500\n";
        let config = PrinterConfig::default();

        let from_reader =
            analyze_reader(Cursor::new(text), &config, text.len() as u64).expect("analyze");
        let mut from_slices = analyze(text.lines(), &config);
        from_slices.file_size = from_reader.file_size;

        assert_eq!(from_reader, from_slices);
        assert_eq!(from_reader.file_size, text.len() as u64);
    }

    #[test]
    fn test_crlf_lines() {
        use std::io::Cursor;

        let text = "G90\r\nG1 X10 F600\r\n";
        let report =
            analyze_reader(Cursor::new(text), &PrinterConfig::default(), 0).expect("analyze");
        assert_eq!(report.total_lines, 2);
        assert!(report.print_time > 0.0);
    }
}
