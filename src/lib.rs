//! G-code print estimator
//!
//! A static, single-pass simulator of a motion planner: given feedrates,
//! axis limits, and acceleration constraints, it predicts how long a
//! G-code job takes and how much filament it consumes, without driving
//! any hardware.
//!
//! This library provides:
//! - Line-oriented G-code parsing and classification
//! - Trapezoidal/triangular move timing
//! - Layer and material accounting
//! - Printer profiles and report formatting for the `gcode-est` CLI

pub mod analyzer;
pub mod config;
pub mod kinematics;
pub mod layers;
pub mod parser;
pub mod report;
pub mod state;

// Re-exports for clean public API
pub use analyzer::{Analyzer, ObjectReport, Report, analyze, analyze_reader};
pub use config::PrinterConfig;
pub use parser::{LineEvent, parse_line};
