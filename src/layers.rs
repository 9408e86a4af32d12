//! Layer and material accounting.
//!
//! Two independent layer notions: distinct Z heights visited by motion
//! (geometry) and explicit slicer layer-change markers (metadata). Both
//! grow dynamically; the G-code length is unbounded.

use std::collections::BTreeMap;

/// Two Z values closer than this are the same height.
pub const Z_TOLERANCE: f64 = 1e-6;

// Gaps below this are noise, not layer steps.
const MIN_LAYER_GAP: f64 = 0.001;

/// Distinct Z heights visited during motion.
#[derive(Debug, Clone, Default)]
pub struct ZHeights {
    values: Vec<f64>,
}

impl ZHeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a Z height, deduplicated within [`Z_TOLERANCE`].
    pub fn record(&mut self, z: f64) {
        if !self.values.iter().any(|v| (v - z).abs() < Z_TOLERANCE) {
            self.values.push(z);
        }
    }

    /// Height-based layer count.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Estimated layer height: the median of the gaps between sorted
    /// distinct Z values, ignoring sub-micron noise. 0.0 when fewer than
    /// two heights were seen.
    pub fn layer_height(&self) -> f64 {
        if self.values.len() < 2 {
            return 0.0;
        }

        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut gaps: Vec<f64> = sorted
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|gap| *gap > MIN_LAYER_GAP)
            .collect();

        if gaps.is_empty() {
            return 0.0;
        }
        gaps.sort_by(|a, b| a.total_cmp(b));
        gaps[gaps.len() / 2]
    }
}

/// Tracks slicer-announced layers and how much simulated time each one
/// took.
#[derive(Debug, Clone, Default)]
pub struct LayerClock {
    current: Option<u32>,
    layer_start: f64,
    times: BTreeMap<u32, f64>,
    count: u32,
}

impl LayerClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a layer-change marker at simulated time `now`: close the
    /// open layer and start timing the new one.
    pub fn on_marker(&mut self, index: u32, now: f64) {
        if let Some(open) = self.current {
            *self.times.entry(open).or_insert(0.0) += now - self.layer_start;
        }
        self.current = Some(index);
        self.layer_start = now;
        self.count = self.count.max(index.saturating_add(1));
    }

    /// Close the final open layer at end of stream.
    pub fn finish(&mut self, now: f64) {
        if let Some(open) = self.current.take() {
            *self.times.entry(open).or_insert(0.0) += now - self.layer_start;
        }
    }

    /// Slicer-based layer count: `max(index) + 1` observed, 0 when the
    /// stream had no markers.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Per-layer durations, seconds, keyed by slicer layer index.
    pub fn into_times(self) -> BTreeMap<u32, f64> {
        self.times
    }
}

/// Per-object time attribution driven by exclude-object markers.
///
/// Objects are registered by `EXCLUDE_OBJECT_DEFINE` and selected by
/// `EXCLUDE_OBJECT_START`/`END`; simulated time is charged to whichever
/// object is active when it elapses.
#[derive(Debug, Clone, Default)]
pub struct ObjectTracker {
    names: Vec<String>,
    times: Vec<f64>,
    current: Option<usize>,
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object. Redefinitions keep the original slot.
    pub fn define(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
            self.times.push(0.0);
        }
    }

    /// Make `name` the active object. An undefined name leaves the
    /// current attribution unchanged.
    pub fn start(&mut self, name: &str) {
        if let Some(index) = self.names.iter().position(|n| n == name) {
            self.current = Some(index);
        }
    }

    /// Stop attributing time to any object.
    pub fn end(&mut self) {
        self.current = None;
    }

    /// Charge `duration` seconds to the active object, if any.
    pub fn charge(&mut self, duration: f64) {
        if let Some(index) = self.current {
            self.times[index] += duration;
        }
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Per-object totals in definition order.
    pub fn into_totals(self) -> Vec<(String, f64)> {
        self.names.into_iter().zip(self.times).collect()
    }
}
