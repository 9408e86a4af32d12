//! Line classification.
//!
//! Maps a raw G-code line onto the small command vocabulary the
//! estimator interprets. Anything else is `Unrecognized` and only
//! contributes to the total line count.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::lexer::{LexedLine, lex_line};

/// Coordinate interpretation mode, for positions and for extrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordMode {
    Absolute,
    Relative,
}

/// Optional axis words of a `G0`/`G1`/`G92` line.
///
/// `None` means the axis was not on the line and carries forward;
/// present-but-zero is a real value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveArgs {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub f: Option<f64>,
}

/// One classified line of G-code.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    /// `G0`/`G1` linear move (a line with no axis words is a valid no-op)
    Move(MoveArgs),
    /// `G4` dwell; P in milliseconds, S in seconds
    Dwell { p: Option<f64>, s: Option<f64> },
    /// `G90`/`G91`
    SetPositionMode(CoordMode),
    /// `M82`/`M83`
    SetExtrusionMode(CoordMode),
    /// `G92`: set logical position without motion
    SetPosition(MoveArgs),
    /// Slicer layer-change marker carrying the new layer index
    LayerMarker(u32),
    /// `EXCLUDE_OBJECT_DEFINE`: register a printable object by name
    ObjectDefine(String),
    /// `EXCLUDE_OBJECT_START`: attribute following time to this object
    ObjectStart(String),
    /// `EXCLUDE_OBJECT_END`: stop attributing time to any object
    ObjectEnd,
    /// Comment, blank, or unsupported code; counted but skipped
    Unrecognized,
}

// Cura/Simplify3D/Marlin comment markers: ";LAYER:12"
static LAYER_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";\s*LAYER:\s*(\d+)").expect("layer comment pattern"));

// Klipper/PrusaSlicer macro: "SET_PRINT_STATS_INFO CURRENT_LAYER=12"
static PRINT_STATS_LAYER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SET_PRINT_STATS_INFO\s.*CURRENT_LAYER=(\d+)").expect("print stats pattern")
});

// Klipper exclude-object markers: "EXCLUDE_OBJECT_START NAME=part_1"
static OBJECT_DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"EXCLUDE_OBJECT_DEFINE\s.*NAME=(\S+)").expect("object define pattern")
});
static OBJECT_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"EXCLUDE_OBJECT_START\s.*NAME=(\S+)").expect("object start pattern")
});

/// Classify one line into a [`LineEvent`].
pub fn classify_line(line: &str) -> LineEvent {
    let lexed = lex_line(line);

    // A recognized command wins: a move keeps its motion even when a
    // marker-looking comment trails it.
    if let Some(command) = lexed.command.as_deref() {
        match command {
            "G0" | "G1" => return LineEvent::Move(move_args(&lexed)),
            "G4" => {
                return LineEvent::Dwell {
                    p: lexed.value('P'),
                    s: lexed.value('S'),
                };
            }
            "G90" => return LineEvent::SetPositionMode(CoordMode::Absolute),
            "G91" => return LineEvent::SetPositionMode(CoordMode::Relative),
            "G92" => return LineEvent::SetPosition(move_args(&lexed)),
            "M82" => return LineEvent::SetExtrusionMode(CoordMode::Absolute),
            "M83" => return LineEvent::SetExtrusionMode(CoordMode::Relative),
            _ => {}
        }
    }

    // Markers come in comment and macro form, so they match on the raw
    // line.
    if let Some(captures) = OBJECT_DEFINE.captures(line) {
        if let Some(name) = captures.get(1) {
            return LineEvent::ObjectDefine(name.as_str().to_string());
        }
    }
    if let Some(captures) = OBJECT_START.captures(line) {
        if let Some(name) = captures.get(1) {
            return LineEvent::ObjectStart(name.as_str().to_string());
        }
    }
    if line.contains("EXCLUDE_OBJECT_END") {
        return LineEvent::ObjectEnd;
    }
    if let Some(index) = layer_marker(line) {
        return LineEvent::LayerMarker(index);
    }

    LineEvent::Unrecognized
}

fn move_args(lexed: &LexedLine) -> MoveArgs {
    MoveArgs {
        x: lexed.value('X'),
        y: lexed.value('Y'),
        z: lexed.value('Z'),
        e: lexed.value('E'),
        f: lexed.value('F'),
    }
}

fn layer_marker(line: &str) -> Option<u32> {
    let captures = LAYER_COMMENT
        .captures(line)
        .or_else(|| PRINT_STATS_LAYER.captures(line))?;
    captures.get(1)?.as_str().parse().ok()
}
