//! Calibration document (de)serialization.
//!
//! The wire format is a YAML mapping: `num_lasers`, `distance_resolution`,
//! and a `lasers` sequence of per-channel entries keyed by `laser_id`.
use log::warn;
use serde::{Deserialize, Serialize};

use super::{Calibration, ChannelCorrection};
use crate::error::CalibrationError;

fn default_max_intensity() -> u8 {
    255
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LaserDocument {
    laser_id: u32,
    rot_correction: f64,
    vert_correction: f64,
    dist_correction: f64,
    #[serde(default)]
    two_pt_correction_available: bool,
    dist_correction_x: f64,
    dist_correction_y: f64,
    vert_offset_correction: f64,
    #[serde(default)]
    horiz_offset_correction: f64,
    focal_distance: f64,
    focal_slope: f64,
    #[serde(default = "default_max_intensity")]
    max_intensity: u8,
    #[serde(default)]
    min_intensity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalibrationDocument {
    num_lasers: i64,
    distance_resolution: f64,
    lasers: Vec<LaserDocument>,
}

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["num_lasers", "distance_resolution", "lasers"];
const KNOWN_LASER_KEYS: &[&str] = &[
    "laser_id",
    "rot_correction",
    "vert_correction",
    "dist_correction",
    "two_pt_correction_available",
    "dist_correction_x",
    "dist_correction_y",
    "vert_offset_correction",
    "horiz_offset_correction",
    "focal_distance",
    "focal_slope",
    "max_intensity",
    "min_intensity",
];

fn warn_on_unknown_keys(value: &serde_yaml::Value, known: &[&str], context: &str) {
    if let serde_yaml::Value::Mapping(map) = value {
        for key in map.keys() {
            if let Some(key) = key.as_str() {
                if !known.contains(&key) {
                    warn!("ignoring unknown calibration field `{}` in {}", key, context);
                }
            }
        }
    }
}

impl Calibration {
    /// Parse a calibration document (YAML text) into a validated, immutable
    /// [`Calibration`].
    ///
    /// Absent optional fields (`two_pt_correction_available`,
    /// `horiz_offset_correction`, `max_intensity`, `min_intensity`) fall back
    /// to documented defaults. Unknown fields are ignored with a logged
    /// warning; a missing required
    /// field or an invalid `num_lasers`/`distance_resolution`/duplicate
    /// `laser_id` fails the load.
    pub fn load(document: &str) -> Result<Self, CalibrationError> {
        let raw: serde_yaml::Value = serde_yaml::from_str(document)
            .map_err(|e| CalibrationError::Malformed(e.to_string()))?;

        warn_on_unknown_keys(&raw, KNOWN_TOP_LEVEL_KEYS, "top-level document");
        if let Some(lasers) = raw.get("lasers").and_then(|v| v.as_sequence()) {
            for laser in lasers {
                warn_on_unknown_keys(laser, KNOWN_LASER_KEYS, "laser entry");
            }
        }

        let doc: CalibrationDocument = serde_yaml::from_value(raw).map_err(|e| {
            // serde's missing-field message names the field; surface it
            // through MissingField when we can, Malformed otherwise.
            missing_field_from_serde_error(&e).unwrap_or_else(|| CalibrationError::Malformed(e.to_string()))
        })?;

        if doc.num_lasers <= 0 {
            return Err(CalibrationError::InvalidNumLasers(doc.num_lasers));
        }
        if doc.distance_resolution <= 0.0 {
            return Err(CalibrationError::InvalidDistanceResolution(doc.distance_resolution));
        }
        let num_lasers = doc.num_lasers as u32;

        let mut channels = vec![ChannelCorrection::default(); num_lasers as usize];
        let mut seen = std::collections::HashSet::new();
        for laser in &doc.lasers {
            if !seen.insert(laser.laser_id) {
                return Err(CalibrationError::DuplicateLaserId(laser.laser_id));
            }
            let idx = laser.laser_id as usize;
            if idx >= channels.len() {
                channels.resize(idx + 1, ChannelCorrection::default());
            }
            channels[idx] = ChannelCorrection {
                rot_correction: laser.rot_correction as f32,
                vert_correction: laser.vert_correction as f32,
                dist_correction: laser.dist_correction as f32,
                two_pt_correction_available: laser.two_pt_correction_available,
                dist_correction_x: laser.dist_correction_x as f32,
                dist_correction_y: laser.dist_correction_y as f32,
                vert_offset_correction: laser.vert_offset_correction as f32,
                horiz_offset_correction: laser.horiz_offset_correction as f32,
                focal_distance: laser.focal_distance as f32,
                focal_slope: laser.focal_slope as f32,
                max_intensity: laser.max_intensity,
                min_intensity: laser.min_intensity,
                ..Default::default()
            };
        }

        Calibration::from_channels(num_lasers, doc.distance_resolution as f32, channels)
    }

    /// Emit this calibration back into the YAML text format, with entries
    /// sorted by `laser_id` ascending and derived fields omitted.
    pub fn save(&self) -> String {
        let lasers = self
            .channels()
            .iter()
            .enumerate()
            .map(|(laser_id, c)| LaserDocument {
                laser_id: laser_id as u32,
                rot_correction: c.rot_correction as f64,
                vert_correction: c.vert_correction as f64,
                dist_correction: c.dist_correction as f64,
                two_pt_correction_available: c.two_pt_correction_available,
                dist_correction_x: c.dist_correction_x as f64,
                dist_correction_y: c.dist_correction_y as f64,
                vert_offset_correction: c.vert_offset_correction as f64,
                horiz_offset_correction: c.horiz_offset_correction as f64,
                focal_distance: c.focal_distance as f64,
                focal_slope: c.focal_slope as f64,
                max_intensity: c.max_intensity,
                min_intensity: c.min_intensity,
            })
            .collect();
        let doc = CalibrationDocument {
            num_lasers: self.num_lasers as i64,
            distance_resolution: self.distance_resolution_m as f64,
            lasers,
        };
        serde_yaml::to_string(&doc).expect("calibration document is always serializable")
    }
}

fn missing_field_from_serde_error(err: &serde_yaml::Error) -> Option<CalibrationError> {
    let msg = err.to_string();
    for field in KNOWN_LASER_KEYS {
        if msg.contains(&format!("missing field `{}`", field)) {
            return Some(CalibrationError::MissingField(field));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> String {
        r#"
num_lasers: 2
distance_resolution: 0.004
lasers:
  - laser_id: 0
    rot_correction: 0.01
    vert_correction: -0.1
    dist_correction: 0.0
    dist_correction_x: 0.0
    dist_correction_y: 0.0
    vert_offset_correction: 0.0
    focal_distance: 0.0
    focal_slope: 0.0
  - laser_id: 1
    rot_correction: -0.01
    vert_correction: 0.1
    dist_correction: 0.0
    dist_correction_x: 0.0
    dist_correction_y: 0.0
    vert_offset_correction: 0.0
    focal_distance: 0.0
    focal_slope: 0.0
    max_intensity: 200
    min_intensity: 10
"#
        .to_string()
    }

    #[test]
    fn load_applies_documented_defaults() {
        let cal = Calibration::load(&sample_document()).unwrap();
        assert_eq!(cal.channel(0).max_intensity, 255);
        assert_eq!(cal.channel(0).min_intensity, 0);
        assert!(!cal.channel(0).two_pt_correction_available);
        assert_eq!(cal.channel(0).horiz_offset_correction, 0.0);
        assert_eq!(cal.channel(1).max_intensity, 200);
        assert_eq!(cal.channel(1).min_intensity, 10);
    }

    #[test]
    fn load_rejects_duplicate_laser_ids() {
        let doc = sample_document().replace("laser_id: 1", "laser_id: 0");
        let err = Calibration::load(&doc).unwrap_err();
        assert_eq!(err, CalibrationError::DuplicateLaserId(0));
    }

    #[test]
    fn load_reports_missing_required_field() {
        let doc = sample_document().replace("    focal_slope: 0.0\n", "");
        let err = Calibration::load(&doc).unwrap_err();
        assert_eq!(err, CalibrationError::MissingField("focal_slope"));
    }

    #[test]
    fn load_reports_malformed_yaml() {
        let err = Calibration::load("num_lasers: [this is not a mapping").unwrap_err();
        assert!(matches!(err, CalibrationError::Malformed(_)));
    }

    #[test]
    fn save_then_load_round_trips_required_fields() {
        let cal = Calibration::load(&sample_document()).unwrap();
        let text = cal.save();
        let reloaded = Calibration::load(&text).unwrap();
        assert_eq!(reloaded.num_lasers, cal.num_lasers);
        assert_eq!(reloaded.distance_resolution_m, cal.distance_resolution_m);
        for (a, b) in cal.channels().iter().zip(reloaded.channels().iter()) {
            assert_eq!(a.rot_correction, b.rot_correction);
            assert_eq!(a.vert_correction, b.vert_correction);
            assert_eq!(a.dist_correction, b.dist_correction);
            assert_eq!(a.max_intensity, b.max_intensity);
            assert_eq!(a.min_intensity, b.min_intensity);
        }
    }

    #[test]
    fn save_orders_entries_by_laser_id_ascending() {
        let cal = Calibration::load(&sample_document()).unwrap();
        let text = cal.save();
        let first = text.find("laser_id: 0").unwrap();
        let second = text.find("laser_id: 1").unwrap();
        assert!(first < second);
    }
}
