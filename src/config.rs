//! Configuration for the estimator CLI.
//!
//! Handles:
//! - Command-line argument parsing
//! - Printer profile TOML loading and discovery
//! - Per-flag overrides on top of the selected profile

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;

/// Command-line arguments for the G-code estimator
#[derive(Debug, Parser)]
#[command(name = "gcode-est")]
#[command(about = "Estimate print time and filament use for a G-code file")]
#[command(version)]
pub struct Args {
    /// G-code file to analyze
    pub file: PathBuf,

    /// Printer profile to use (a TOML file name in the profile directory)
    #[arg(long, help = "Printer profile name (e.g., 'mk4', 'voron-350')")]
    pub profile: Option<String>,

    /// Custom directory to search for profile files
    #[arg(long, help = "Directory containing printer profile TOML files")]
    pub profile_dir: Option<PathBuf>,

    /// Override: XY acceleration, mm/s^2
    #[arg(long)]
    pub acceleration: Option<f64>,

    /// Override: Z acceleration, mm/s^2
    #[arg(long)]
    pub z_acceleration: Option<f64>,

    /// Override: extruder acceleration, mm/s^2
    #[arg(long)]
    pub e_acceleration: Option<f64>,

    /// Override: max printing speed, mm/s
    #[arg(long)]
    pub max_speed_xy: Option<f64>,

    /// Override: max travel speed, mm/s
    #[arg(long)]
    pub max_speed_travel: Option<f64>,

    /// Override: max Z speed, mm/s
    #[arg(long)]
    pub max_speed_z: Option<f64>,

    /// Override: filament diameter, mm
    #[arg(long)]
    pub filament_diameter: Option<f64>,

    /// Override: filament density, g/cm^3
    #[arg(long)]
    pub filament_density: Option<f64>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Motion limits and filament geometry for one printer. Immutable for
/// the duration of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterConfig {
    /// XY acceleration, mm/s^2
    pub acceleration: f64,
    /// Z acceleration, mm/s^2
    pub z_acceleration: f64,
    /// Extruder acceleration, mm/s^2
    pub e_acceleration: f64,
    /// Max printing speed, mm/s
    pub max_speed_xy: f64,
    /// Max travel (non-printing) speed, mm/s
    pub max_speed_travel: f64,
    /// Max Z speed, mm/s
    pub max_speed_z: f64,
    /// Feedrate assumed before the first F word, mm/min
    pub default_feedrate: f64,
    /// Filament diameter, mm
    pub filament_diameter: f64,
    /// Filament density, g/cm^3
    pub filament_density: f64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            acceleration: 500.0,
            z_acceleration: 100.0,
            e_acceleration: 250.0,
            max_speed_xy: 100.0,
            max_speed_travel: 150.0,
            max_speed_z: 20.0,
            default_feedrate: 3000.0,
            filament_diameter: 1.75,
            filament_density: 1.24,
        }
    }
}

impl PrinterConfig {
    /// Build the effective config: profile (or defaults) plus flag
    /// overrides.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.profile {
            Some(name) => Self::load_profile(name, args.profile_dir.as_deref())?,
            None => Self::default(),
        };

        if let Some(v) = args.acceleration {
            config.acceleration = v;
        }
        if let Some(v) = args.z_acceleration {
            config.z_acceleration = v;
        }
        if let Some(v) = args.e_acceleration {
            config.e_acceleration = v;
        }
        if let Some(v) = args.max_speed_xy {
            config.max_speed_xy = v;
        }
        if let Some(v) = args.max_speed_travel {
            config.max_speed_travel = v;
        }
        if let Some(v) = args.max_speed_z {
            config.max_speed_z = v;
        }
        if let Some(v) = args.filament_diameter {
            config.filament_diameter = v;
        }
        if let Some(v) = args.filament_density {
            config.filament_density = v;
        }

        Ok(config)
    }

    /// Load a named profile, searching the explicit directory first and
    /// then the user config directory.
    pub fn load_profile(name: &str, explicit_dir: Option<&Path>) -> Result<Self> {
        let dirs = Self::profile_dirs(explicit_dir);

        for dir in &dirs {
            let candidate = dir.join(format!("{name}.toml"));
            if candidate.is_file() {
                log::debug!("loading printer profile from {}", candidate.display());
                return Self::from_toml_file(&candidate);
            }
        }

        bail!(
            "printer profile '{}' not found in {:?}",
            name,
            dirs.iter().map(|d| d.display().to_string()).collect::<Vec<_>>()
        )
    }

    /// Parse a profile TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid printer profile {}", path.display()))
    }

    fn profile_dirs(explicit_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if let Some(dir) = explicit_dir {
            dirs.push(dir.to_path_buf());
        }

        if let Some(config_dir) = dirs::config_dir() {
            dirs.push(config_dir.join("gcode-est").join("profiles"));
        }

        dirs
    }
}
