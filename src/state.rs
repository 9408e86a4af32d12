//! Modal interpreter state.
//!
//! G-code is modal: coordinate modes, the current position, and the
//! feedrate persist across lines until explicitly changed. This module
//! owns that state and resolves the optional axis words of a move
//! against it.

use crate::parser::{CoordMode, MoveArgs};

/// Interpreter state carried across lines of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    /// Current position, mm, always absolute regardless of input mode.
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Logical extruder position, mm (the coordinate `E` words refer to
    /// in absolute mode; reset by `G92 E`).
    pub e: f64,
    pub position_mode: CoordMode,
    pub extrusion_mode: CoordMode,
    /// Current feedrate, mm/min.
    pub feedrate: f64,
}

impl MachineState {
    pub fn new(default_feedrate: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            e: 0.0,
            position_mode: CoordMode::Absolute,
            extrusion_mode: CoordMode::Absolute,
            feedrate: default_feedrate,
        }
    }

    /// Apply `G90`/`G91`. Firmware convention: these switch the
    /// extrusion mode along with the position mode.
    pub fn set_position_mode(&mut self, mode: CoordMode) {
        self.position_mode = mode;
        self.extrusion_mode = mode;
    }

    /// Apply `M82`/`M83`.
    pub fn set_extrusion_mode(&mut self, mode: CoordMode) {
        self.extrusion_mode = mode;
    }

    /// Latch the feedrate from an `F` word. Non-positive values are
    /// ignored, matching firmware behavior.
    pub fn update_feedrate(&mut self, f: Option<f64>) {
        if let Some(f) = f {
            if f > 0.0 {
                self.feedrate = f;
            }
        }
    }

    /// Resolve the absolute target of a move. Absent axes carry forward;
    /// in relative mode present axes add to the current position.
    pub fn target_position(&self, args: &MoveArgs) -> (f64, f64, f64) {
        match self.position_mode {
            CoordMode::Absolute => (
                args.x.unwrap_or(self.x),
                args.y.unwrap_or(self.y),
                args.z.unwrap_or(self.z),
            ),
            CoordMode::Relative => (
                self.x + args.x.unwrap_or(0.0),
                self.y + args.y.unwrap_or(0.0),
                self.z + args.z.unwrap_or(0.0),
            ),
        }
    }

    /// Incremental extrusion attributable to this move, mm.
    ///
    /// May be negative (retraction) in either mode; an absent `E` word
    /// is zero.
    pub fn extrusion_delta(&self, e: Option<f64>) -> f64 {
        match (self.extrusion_mode, e) {
            (_, None) => 0.0,
            (CoordMode::Relative, Some(e)) => e,
            (CoordMode::Absolute, Some(e)) => e - self.e,
        }
    }

    /// Advance the logical extruder position past a move's `E` word.
    pub fn commit_extrusion(&mut self, e: Option<f64>) {
        if let Some(e) = e {
            match self.extrusion_mode {
                CoordMode::Relative => self.e += e,
                CoordMode::Absolute => self.e = e,
            }
        }
    }

    /// Apply `G92`: set logical positions for the axes present, without
    /// motion or extrusion.
    pub fn set_logical_position(&mut self, args: &MoveArgs) {
        if let Some(x) = args.x {
            self.x = x;
        }
        if let Some(y) = args.y {
            self.y = y;
        }
        if let Some(z) = args.z {
            self.z = z;
        }
        if let Some(e) = args.e {
            self.e = e;
        }
    }
}
