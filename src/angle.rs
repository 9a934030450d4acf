//! Raw-azimuth correction and angle-crossing detection.
use std::f32::consts::PI;
use std::sync::Arc;

use crate::calibration::Calibration;

const TWO_PI: f32 = 2.0 * PI;
/// Raw azimuth units are hundredths of a degree; one full turn is 36000.
pub const RAW_AZIMUTH_MODULUS: u32 = 36_000;
const DEGREE_SUBDIVISIONS: u32 = 100;

fn deg_to_rad(deg: f32) -> f32 {
    deg * PI / 180.0
}

fn normalize_raw(az: u32) -> u32 {
    az % RAW_AZIMUTH_MODULUS
}

/// Corrected azimuth/elevation for one (raw azimuth, channel) pair, with the
/// sin/cos values the hot path needs already computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedAngleData {
    pub azimuth_rad: f32,
    pub elevation_rad: f32,
    pub sin_azimuth: f32,
    pub cos_azimuth: f32,
    pub sin_elevation: f32,
    pub cos_elevation: f32,
}

/// Maps `(raw_azimuth, channel)` to corrected Cartesian angles and detects
/// FoV/emit/overlap/timestamp-reset crossings, using a precomputed
/// raw-azimuth sin/cos table and per-channel rotation correction applied via
/// the angle-sum identities, folding each channel's `rot_correction` into the
/// raw azimuth without a second trig call per point.
pub struct AngleCorrector {
    calibration: Arc<Calibration>,
    sin_table: Vec<f32>,
    cos_table: Vec<f32>,
    fov_min_raw: u32,
    fov_max_raw: u32,
    /// `cloud_min_angle`/`cloud_max_angle` configured the whole circle (e.g.
    /// `[0, 360)`) — `fov_max_deg` reduces mod 360 to the same raw value as
    /// `fov_min_raw`, which would otherwise collapse the FoV to a single
    /// point instead of "no restriction".
    full_circle_fov: bool,
    cut_angle_raw: u32,
}

impl AngleCorrector {
    /// `fov_min_deg`/`fov_max_deg`/`cut_angle_deg` are in degrees, matching
    /// the sensor configuration's `cloud_min_angle`/`cloud_max_angle`/
    /// `cut_angle`.
    pub fn new(calibration: Arc<Calibration>, fov_min_deg: f32, fov_max_deg: f32, cut_angle_deg: f32) -> Self {
        let n = RAW_AZIMUTH_MODULUS as usize;
        let mut sin_table = Vec::with_capacity(n);
        let mut cos_table = Vec::with_capacity(n);
        for raw in 0..n {
            let rad = deg_to_rad(raw as f32 / DEGREE_SUBDIVISIONS as f32);
            sin_table.push(rad.sin());
            cos_table.push(rad.cos());
        }
        let fov_min_raw = to_raw_deg(fov_min_deg);
        let fov_max_raw = to_raw_deg(fov_max_deg);
        Self {
            calibration,
            sin_table,
            cos_table,
            fov_min_raw,
            fov_max_raw,
            full_circle_fov: fov_min_raw == fov_max_raw && (fov_max_deg - fov_min_deg).abs() >= 360.0,
            cut_angle_raw: to_raw_deg(cut_angle_deg),
        }
    }

    /// Corrected azimuth/elevation for `raw_az` at `channel` (a `laser_id`
    /// index into the calibration this corrector was built from).
    pub fn corrected(&self, raw_az: u32, channel: usize) -> CorrectedAngleData {
        let channel = self.calibration.channel(channel);
        let idx = normalize_raw(raw_az) as usize;
        let sin0 = self.sin_table[idx];
        let cos0 = self.cos_table[idx];

        // sin/cos(raw_azimuth + rot_correction) via angle-sum identities,
        // reusing the channel's precomputed rot trig.
        let sin_az = sin0 * channel.cos_rot + cos0 * channel.sin_rot;
        let cos_az = cos0 * channel.cos_rot - sin0 * channel.sin_rot;
        let azimuth_rad = sin_az.atan2(cos_az).rem_euclid(TWO_PI);

        CorrectedAngleData {
            azimuth_rad,
            elevation_rad: channel.vert_correction,
            sin_azimuth: sin_az,
            cos_azimuth: cos_az,
            sin_elevation: channel.sin_vert,
            cos_elevation: channel.cos_vert,
        }
    }

    /// True when the forward sweep from `prev` to `cur` overlaps the closed
    /// `[fov_min, fov_max]` interval (used to short-circuit blocks entirely
    /// outside the configured field of view).
    pub fn is_inside_fov(&self, prev_raw_az: u32, cur_raw_az: u32) -> bool {
        if self.full_circle_fov {
            return true;
        }
        let (lo, hi) = (self.fov_min_raw, self.fov_max_raw);
        raw_in_closed_range(cur_raw_az, lo, hi)
            || raw_in_closed_range(prev_raw_az, lo, hi)
            || crossed(prev_raw_az, cur_raw_az, lo)
            || crossed(prev_raw_az, cur_raw_az, hi)
    }

    /// True when the sweep crossed the cut angle within this block
    /// transition. Shares the same underlying check as
    /// [`Self::passed_timestamp_reset_angle`] and [`Self::passed_emit_angle`]
    /// — the timestamp-reset angle, the emit angle, and the overlap boundary
    /// are all the single configured cut angle, so all three crossing checks
    /// reduce to the same test.
    pub fn is_inside_overlap(&self, prev_raw_az: u32, cur_raw_az: u32) -> bool {
        self.crossed_cut_angle(prev_raw_az, cur_raw_az)
    }

    /// True when the sweep crossed the cut angle, used to rebase scan
    /// timestamps.
    pub fn passed_timestamp_reset_angle(&self, prev_raw_az: u32, cur_raw_az: u32) -> bool {
        self.crossed_cut_angle(prev_raw_az, cur_raw_az)
    }

    /// True when the sweep crossed the emit angle (the scan-cut boundary).
    pub fn passed_emit_angle(&self, prev_raw_az: u32, cur_raw_az: u32) -> bool {
        self.crossed_cut_angle(prev_raw_az, cur_raw_az)
    }

    /// The configured cut angle, in radians — used by the decoder to decide
    /// whether a point near the scan boundary belongs to the scan in
    /// progress or the next one.
    pub fn cut_angle_rad(&self) -> f32 {
        deg_to_rad(self.cut_angle_raw as f32 / DEGREE_SUBDIVISIONS as f32)
    }

    /// True when a corrected azimuth (radians) lies within the configured
    /// `[fov_min, fov_max]` window. Unlike [`Self::is_inside_fov`], this
    /// takes the already-corrected angle rather than a raw sweep.
    pub fn corrected_azimuth_in_fov(&self, azimuth_rad: f32) -> bool {
        if self.full_circle_fov {
            return true;
        }
        let raw = to_raw_deg(azimuth_rad.to_degrees());
        raw_in_closed_range(raw, self.fov_min_raw, self.fov_max_raw)
    }

    /// True when a corrected azimuth (radians) lies in
    /// `[cut_angle, cut_angle + window_deg]` — the trailing window used to
    /// decide whether a point just past an overlap crossing belongs to the
    /// scan about to start.
    pub fn in_window_from_cut(&self, azimuth_rad: f32, window_deg: f32) -> bool {
        let az_raw = to_raw_deg(azimuth_rad.to_degrees());
        let hi_raw = (self.cut_angle_raw + to_raw_deg(window_deg)) % RAW_AZIMUTH_MODULUS;
        raw_in_closed_range(az_raw, self.cut_angle_raw, hi_raw)
    }

    fn crossed_cut_angle(&self, prev_raw_az: u32, cur_raw_az: u32) -> bool {
        crossed(prev_raw_az, cur_raw_az, self.cut_angle_raw)
    }
}

fn to_raw_deg(deg: f32) -> u32 {
    let v = (deg * DEGREE_SUBDIVISIONS as f32).round();
    let v = v.rem_euclid(RAW_AZIMUTH_MODULUS as f32);
    v as u32
}

/// Does `angle` lie in the closed interval `[lo, hi]` on the azimuth circle,
/// accounting for wraparound when `lo > hi`?
fn raw_in_closed_range(angle: u32, lo: u32, hi: u32) -> bool {
    if lo <= hi {
        angle >= lo && angle <= hi
    } else {
        angle >= lo || angle <= hi
    }
}

/// True if sweeping forward from `prev` (exclusive) to `cur` (inclusive)
/// passes over `threshold`, on a circle of [`RAW_AZIMUTH_MODULUS`] raw
/// units, via a normalized forward delta and a crossing check against the
/// same delta computed for the threshold.
fn crossed(prev: u32, cur: u32, threshold: u32) -> bool {
    let modulus = RAW_AZIMUTH_MODULUS;
    let d_total = (cur + modulus - prev) % modulus;
    if d_total == 0 {
        return false;
    }
    let d_threshold = (threshold + modulus - prev) % modulus;
    d_threshold != 0 && d_threshold <= d_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{Calibration, ChannelCorrection};

    fn calib() -> Arc<Calibration> {
        Arc::new(Calibration::from_channels(1, 0.004, vec![ChannelCorrection::default()]).unwrap())
    }

    #[test]
    fn crossed_detects_forward_crossing_without_wrap() {
        assert!(crossed(10, 20, 15));
        assert!(!crossed(10, 20, 25));
    }

    #[test]
    fn crossed_handles_wraparound() {
        // sweep from 35900 to 100 passes through 0
        assert!(crossed(35_900, 100, 0));
        assert!(!crossed(100, 200, 35_900));
    }

    #[test]
    fn crossed_is_exclusive_of_prev_inclusive_of_cur() {
        assert!(!crossed(100, 200, 100));
        assert!(crossed(100, 200, 200));
    }

    #[test]
    fn corrected_with_zero_correction_matches_raw_azimuth() {
        let corrector = AngleCorrector::new(calib(), 0.0, 360.0, 0.0);
        let data = corrector.corrected(9_000, 0); // 90 degrees
        assert!((data.azimuth_rad - std::f32::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn is_inside_fov_true_for_full_circle() {
        let corrector = AngleCorrector::new(calib(), 0.0, 360.0, 0.0);
        assert!(corrector.is_inside_fov(100, 200));
    }

    #[test]
    fn is_inside_fov_false_when_sweep_is_outside_restricted_window() {
        let corrector = AngleCorrector::new(calib(), 90.0, 270.0, 0.0);
        // 40 -> 50 degrees, entirely outside [90, 270]
        assert!(!corrector.is_inside_fov(4_000, 5_000));
    }

    #[test]
    fn passed_emit_angle_triggers_exactly_on_crossing() {
        let corrector = AngleCorrector::new(calib(), 0.0, 360.0, 0.0);
        assert!(corrector.passed_emit_angle(35_900, 100));
        assert!(!corrector.passed_emit_angle(100, 200));
    }
}
