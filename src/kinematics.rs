//! Accelerated-motion time model.
//!
//! Each linear segment follows a trapezoidal velocity profile
//! (accelerate, cruise, decelerate) or, when the segment is too short to
//! reach cruise speed, a triangular one. XY and extruder motion run
//! concurrently within one move; Z is modeled as a serialized phase.

use crate::config::PrinterConfig;

/// Wall-clock duration of one accelerated segment, seconds.
///
/// Symmetric accel/decel, starting and ending at rest. Zero length is
/// exactly zero time; non-positive acceleration or velocity cannot move.
pub fn segment_time(length: f64, acceleration: f64, max_velocity: f64) -> f64 {
    if length <= 0.0 || acceleration <= 0.0 || max_velocity <= 0.0 {
        return 0.0;
    }

    let accel_distance = max_velocity * max_velocity / (2.0 * acceleration);

    if length <= 2.0 * accel_distance {
        // Triangular profile: never reaches max_velocity
        let peak_velocity = (acceleration * length).sqrt();
        2.0 * peak_velocity / acceleration
    } else {
        // Trapezoidal profile
        let accel_time = max_velocity / acceleration;
        let cruise_time = (length - 2.0 * accel_distance) / max_velocity;
        2.0 * accel_time + cruise_time
    }
}

/// Duration of one `G0`/`G1` move, seconds.
///
/// `distance_e` is the absolute extrusion delta; `extruding` selects the
/// printing XY ceiling over the travel ceiling. The feedrate is given in
/// mm/min and clamped against each axis ceiling, never an error.
pub fn move_time(
    config: &PrinterConfig,
    distance_xy: f64,
    distance_z: f64,
    distance_e: f64,
    feedrate_mm_min: f64,
    extruding: bool,
) -> f64 {
    let feed = feedrate_mm_min / 60.0;
    let xy_ceiling = if extruding {
        config.max_speed_xy
    } else {
        config.max_speed_travel
    };

    let time_xy = segment_time(distance_xy, config.acceleration, feed.min(xy_ceiling));
    let time_z = segment_time(distance_z, config.z_acceleration, feed.min(config.max_speed_z));
    let time_e = segment_time(
        distance_e,
        config.e_acceleration,
        feed.min(config.max_speed_xy),
    );

    // XY and E move concurrently, Z moves separately
    time_xy.max(time_e) + time_z
}

/// Duration of a `G4` dwell, seconds. P (milliseconds) wins over S
/// (seconds); non-positive values contribute nothing.
pub fn dwell_time(p: Option<f64>, s: Option<f64>) -> f64 {
    p.map(|p| p / 1000.0)
        .filter(|t| *t > 0.0)
        .or_else(|| s.filter(|t| *t > 0.0))
        .unwrap_or(0.0)
}
