//! Per-channel calibration model.
//!
//! See `calibration::io` for the YAML document this is loaded from/saved to.
pub mod io;

use log::warn;

use crate::error::CalibrationError;

/// Geometric and intensity correction for one physical laser.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelCorrection {
    pub rot_correction: f32,
    pub vert_correction: f32,
    pub dist_correction: f32,
    pub two_pt_correction_available: bool,
    pub dist_correction_x: f32,
    pub dist_correction_y: f32,
    pub vert_offset_correction: f32,
    pub horiz_offset_correction: f32,
    pub focal_distance: f32,
    pub focal_slope: f32,
    pub max_intensity: u8,
    pub min_intensity: u8,

    // Derived, recomputed from the fields above whenever they change.
    pub cos_rot: f32,
    pub sin_rot: f32,
    pub cos_vert: f32,
    pub sin_vert: f32,
    pub laser_ring: u32,
}

impl ChannelCorrection {
    fn with_derived(mut self) -> Self {
        self.cos_rot = self.rot_correction.cos();
        self.sin_rot = self.rot_correction.sin();
        self.cos_vert = self.vert_correction.cos();
        self.sin_vert = self.vert_correction.sin();
        self
    }
}

/// Ordered, immutable calibration table shared by every decode call.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub num_lasers: u32,
    pub distance_resolution_m: f32,
    channels: Vec<ChannelCorrection>,
}

impl Calibration {
    /// Build a calibration directly from an ordered channel list, indexed by
    /// `laser_id`. Intended for programmatic construction (tests, synthetic
    /// sensors); `load` is the entry point for calibration documents.
    pub fn from_channels(
        num_lasers: u32,
        distance_resolution_m: f32,
        mut channels: Vec<ChannelCorrection>,
    ) -> Result<Self, CalibrationError> {
        if num_lasers == 0 {
            return Err(CalibrationError::InvalidNumLasers(num_lasers as i64));
        }
        if distance_resolution_m <= 0.0 {
            return Err(CalibrationError::InvalidDistanceResolution(distance_resolution_m as f64));
        }
        for c in channels.iter_mut() {
            *c = c.with_derived();
        }
        assign_rings(&mut channels, num_lasers as usize);
        Ok(Self { num_lasers, distance_resolution_m, channels })
    }

    /// Channel corrections indexed by `laser_id`.
    pub fn channels(&self) -> &[ChannelCorrection] {
        &self.channels
    }

    pub fn channel(&self, laser_id: usize) -> &ChannelCorrection {
        &self.channels[laser_id]
    }
}

/// Repeatedly pick the channel with the smallest `vert_correction` strictly
/// greater than the last assigned angle, assigning rings `0, 1, 2, ...` in
/// order. Ties go to the lowest `laser_id` because the inner scan is
/// ascending and only replaces the current best on a strictly smaller angle.
///
/// If fewer than `num_lasers` channels can be ranked this way (duplicate
/// vertical angles leaving some unreachable), the remaining channels keep
/// ring `0` and a warning is logged once.
fn assign_rings(channels: &mut [ChannelCorrection], num_lasers: usize) {
    let mut next_angle = f32::NEG_INFINITY;
    let mut unassigned = 0usize;
    for ring in 0..num_lasers {
        let mut min_seen = f32::INFINITY;
        let mut next_index: Option<usize> = None;
        for (j, c) in channels.iter().enumerate().take(num_lasers) {
            let angle = c.vert_correction;
            if next_angle < angle && angle < min_seen {
                min_seen = angle;
                next_index = Some(j);
            }
        }
        match next_index {
            Some(idx) => {
                channels[idx].laser_ring = ring as u32;
                next_angle = min_seen;
            }
            None => unassigned += 1,
        }
    }
    if unassigned > 0 {
        warn!(
            "ring assignment ambiguous: {} of {} channels could not be ranked \
             (duplicate vertical angles); they retain ring 0",
            unassigned, num_lasers
        );
    }
}
