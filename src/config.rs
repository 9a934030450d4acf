//! Sensor configuration: the caller-supplied range/FoV/threshold knobs.
//!
//! This crate consumes a configuration value from its caller rather than
//! parsing one itself, so this is a plain constructed struct, not a loader
//! for any particular application config format.
use std::fmt;

use crate::filter::PointFilter;

/// Range, field-of-view, and dual-return configuration for one decoder
/// instance.
pub struct SensorConfiguration {
    pub min_range: f32,
    pub max_range: f32,
    pub cloud_min_angle: f32,
    pub cloud_max_angle: f32,
    pub cut_angle: f32,
    pub dual_return_distance_threshold: f32,
    pub point_filters: Vec<Box<dyn PointFilter>>,
}

impl SensorConfiguration {
    pub fn new(
        min_range: f32,
        max_range: f32,
        cloud_min_angle: f32,
        cloud_max_angle: f32,
        cut_angle: f32,
        dual_return_distance_threshold: f32,
    ) -> Self {
        Self {
            min_range,
            max_range,
            cloud_min_angle,
            cloud_max_angle,
            cut_angle,
            dual_return_distance_threshold,
            point_filters: Vec::new(),
        }
    }

    /// The asymmetric timestamp-rebase rule keys off whether the cut angle
    /// coincides with the far end of the configured cloud FoV.
    pub fn cut_equals_cloud_max(&self) -> bool {
        (self.cut_angle - self.cloud_max_angle).abs() < f32::EPSILON
    }
}

impl fmt::Display for SensorConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorConfiguration {{ range: [{}, {}] m, cloud angle: [{}, {}] deg, \
             cut_angle: {} deg, dual_return_distance_threshold: {} m, {} point filter(s) }}",
            self.min_range,
            self.max_range,
            self.cloud_min_angle,
            self.cloud_max_angle,
            self.cut_angle,
            self.dual_return_distance_threshold,
            self.point_filters.len()
        )
    }
}
