//! Orchestrates packet parsing, calibration, angle correction, return
//! classification, and scan segmentation per packet.
//!
//! One call decodes one packet; the caller drives the loop, feeding bytes in
//! and polling for completed scans in between.
use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, info};

use crate::angle::AngleCorrector;
use crate::calibration::Calibration;
use crate::config::SensorConfiguration;
use crate::model::SensorModel;
use crate::packet::PacketView;
use crate::returns::{self, ReturnMode};
use crate::scan::{Point, ScanBuffers};

/// The overlap window trailing the emit angle, in degrees: a corrected
/// azimuth landing in `[emit_angle, emit_angle + OVERLAP_WINDOW_DEG]` right
/// after an overlap crossing belongs to the scan that is about to start, not
/// the one just finishing. Left as a literal per Open Question (a) — its
/// relationship (if any) to rotation speed is undocumented upstream.
const OVERLAP_WINDOW_DEG: f32 = 20.0;

/// Decodes a stream of UDP payloads from one sensor into rotational scans.
///
/// `push_packet`/`poll_scan` are not reentrant and must be serialized by the
/// caller; `poll_scan` borrows `&self`, so the borrow checker enforces
/// that its result cannot be held across the next `push_packet`.
pub struct Decoder<S: SensorModel> {
    config: SensorConfiguration,
    calibration: Arc<Calibration>,
    angle: AngleCorrector,
    buffers: ScanBuffers,
    last_azimuth_raw: u32,
    decode_ts_initialized: bool,
    _model: PhantomData<S>,
}

impl<S: SensorModel> Decoder<S> {
    pub fn new(config: SensorConfiguration, calibration: Arc<Calibration>) -> Self {
        info!("initializing decoder: {}", config);
        let angle = AngleCorrector::new(
            calibration.clone(),
            config.cloud_min_angle,
            config.cloud_max_angle,
            config.cut_angle,
        );
        Self {
            config,
            calibration,
            angle,
            buffers: ScanBuffers::with_capacity(S::MAX_SCAN_BUFFER_POINTS),
            last_azimuth_raw: 0,
            decode_ts_initialized: false,
            _model: PhantomData,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        self.calibration.as_ref()
    }

    pub fn has_scanned(&self) -> bool {
        self.buffers.has_scanned()
    }

    /// Borrow the most recently completed scan and its start timestamp
    /// (seconds). Callers should gate on [`Self::has_scanned`].
    pub fn poll_scan(&self) -> (&[Point], f64) {
        self.buffers.take_output()
    }

    /// Decode one packet. Returns the last raw azimuth seen in this packet,
    /// or `-1` if the packet was rejected (too short, or an unrecognized
    /// return-mode code) — decoder state still reflects whatever lazy
    /// initialization and buffer housekeeping already ran before the
    /// rejection, and the next `push_packet` call proceeds normally; a
    /// rejected packet never aborts decoding of subsequent packets.
    pub fn push_packet(&mut self, bytes: &[u8]) -> i32 {
        let view = match PacketView::<S>::parse(bytes) {
            Ok(view) => view,
            Err(err) => {
                debug!("dropping packet: {}", err);
                return -1;
            }
        };

        let packet_ts_ns = view.timestamp_ns();

        if !self.decode_ts_initialized {
            self.buffers
                .init_decode_ts(packet_ts_ns, S::earliest_point_offset_ns(0));
            self.decode_ts_initialized = true;
        }

        if self.buffers.has_scanned() {
            self.buffers.clear_output();
        }

        let mode = match ReturnMode::from_code(view.return_mode()) {
            Ok(mode) => mode,
            Err(err) => {
                debug!("dropping packet: {}", err);
                return -1;
            }
        };
        let dis_unit_m = match view.dis_unit_m() {
            Ok(v) => v,
            Err(err) => {
                debug!("dropping packet: {}", err);
                return -1;
            }
        };
        let n_returns = mode.n_returns();

        let mut block_id = 0;
        while block_id + n_returns <= S::N_BLOCKS {
            let block_azimuth = view.block_azimuth(block_id) as u32;

            if self.angle.passed_timestamp_reset_angle(self.last_azimuth_raw, block_azimuth) {
                self.buffers.on_cut(
                    packet_ts_ns,
                    S::earliest_point_offset_ns(block_id),
                    self.config.cut_equals_cloud_max(),
                );
            }

            if !self.angle.is_inside_fov(self.last_azimuth_raw, block_azimuth) {
                self.last_azimuth_raw = block_azimuth;
                block_id += n_returns;
                continue;
            }

            self.convert_returns(&view, block_id, n_returns, mode, dis_unit_m, packet_ts_ns, block_azimuth);

            if self.angle.passed_emit_angle(self.last_azimuth_raw, block_azimuth) {
                self.buffers.on_emit_crossing();
            }

            self.last_azimuth_raw = block_azimuth;
            block_id += n_returns;
        }

        self.last_azimuth_raw as i32
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_returns(
        &mut self,
        view: &PacketView<'_, S>,
        block_id: usize,
        n_returns: usize,
        mode: ReturnMode,
        dis_unit_m: f32,
        packet_ts_ns: u64,
        raw_azimuth: u32,
    ) {
        let in_overlap = self.angle.is_inside_overlap(self.last_azimuth_raw, raw_azimuth);

        for channel in 0..S::N_CHANNELS {
            let units: Vec<_> = (0..n_returns).map(|o| view.unit(block_id + o, channel)).collect();
            let distances_m: Vec<f32> = units.iter().map(|u| u.distance as f32 * dis_unit_m).collect();

            for block_offset in 0..n_returns {
                let unit = units[block_offset];
                if unit.distance == 0 {
                    continue;
                }
                let distance = distances_m[block_offset];
                if distance < S::SENSOR_MIN_RANGE
                    || distance > S::SENSOR_MAX_RANGE
                    || distance < self.config.min_range
                    || distance > self.config.max_range
                {
                    continue;
                }

                let return_type = returns::classify(mode, block_offset, &units);
                let is_last_in_group = block_offset == n_returns - 1;
                if return_type == returns::ReturnType::Identical && !is_last_in_group {
                    continue;
                }
                if !is_last_in_group
                    && returns::is_suppressed_by_threshold(
                        block_offset,
                        &distances_m,
                        self.config.dual_return_distance_threshold,
                    )
                {
                    continue;
                }

                let corrected = self.angle.corrected(raw_azimuth, channel);
                if !self.angle.corrected_azimuth_in_fov(corrected.azimuth_rad) {
                    continue;
                }

                let in_current_scan = !(in_overlap
                    && self.angle.in_window_from_cut(corrected.azimuth_rad, OVERLAP_WINDOW_DEG));

                let scan_ts_ns = if in_current_scan {
                    self.buffers.decode_scan_ts_ns()
                } else {
                    self.buffers.output_scan_ts_ns()
                };
                let point_offset_ns = S::point_offset_ns(block_id + block_offset, channel);
                let time_stamp = packet_ts_ns
                    .wrapping_sub(scan_ts_ns)
                    .wrapping_add(point_offset_ns as u64) as u32;

                let xy_distance = distance * corrected.cos_elevation;
                let point = Point {
                    x: xy_distance * corrected.sin_azimuth,
                    y: xy_distance * corrected.cos_azimuth,
                    z: distance * corrected.sin_elevation,
                    intensity: unit.reflectivity,
                    time_stamp,
                    return_type,
                    channel: channel as u8,
                    azimuth: corrected.azimuth_rad,
                    elevation: corrected.elevation_rad,
                    distance,
                };

                if self.config.point_filters.iter().any(|f| f.excluded(&point)) {
                    continue;
                }

                self.buffers.append(point, in_current_scan);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{Calibration, ChannelCorrection};
    use crate::model::Model16;
    use byteorder::{ByteOrder, LE};

    fn test_calibration() -> Arc<Calibration> {
        let channels: Vec<ChannelCorrection> = (0..Model16::N_CHANNELS)
            .map(|i| ChannelCorrection {
                vert_correction: (i as f32 - 8.0) * 0.01,
                ..Default::default()
            })
            .collect();
        Arc::new(Calibration::from_channels(Model16::N_CHANNELS as u32, 0.004, channels).unwrap())
    }

    fn test_config() -> SensorConfiguration {
        SensorConfiguration::new(0.2, 150.0, 0.0, 360.0, 0.0, 0.01)
    }

    fn synth_packet(azimuth_deg: f32, distance_raw: u16, return_mode: u8) -> Vec<u8> {
        const HEADER_SIZE: usize = 8;
        const AZIMUTH_SIZE: usize = 2;
        const UNIT_SIZE: usize = 3;
        let block_size = AZIMUTH_SIZE + Model16::N_CHANNELS * UNIT_SIZE;
        let mut buf = vec![0u8; Model16::PACKET_SIZE];
        let raw_az = (azimuth_deg * 100.0) as u16;
        for block_id in 0..Model16::N_BLOCKS {
            let o = HEADER_SIZE + block_id * block_size;
            LE::write_u16(&mut buf[o..o + 2], raw_az);
            for ch in 0..Model16::N_CHANNELS {
                let u = o + AZIMUTH_SIZE + ch * UNIT_SIZE;
                LE::write_u16(&mut buf[u..u + 2], distance_raw);
                buf[u + 2] = 100;
            }
        }
        let tail = HEADER_SIZE + Model16::N_BLOCKS * block_size;
        LE::write_u32(&mut buf[tail..tail + 4], 1);
        LE::write_u32(&mut buf[tail + 4..tail + 8], 0);
        buf[tail + 8] = return_mode;
        buf[tail + 9] = 0x37;
        buf
    }

    #[test]
    fn single_return_in_full_fov_emits_points() {
        let mut decoder: Decoder<Model16> = Decoder::new(test_config(), test_calibration());
        let packet = synth_packet(10.0, 1000, 0x37);
        let last_az = decoder.push_packet(&packet);
        assert_eq!(last_az, 1000);
    }

    #[test]
    fn restricted_fov_skips_convert_returns_but_updates_last_azimuth() {
        let config = SensorConfiguration::new(0.2, 150.0, 90.0, 270.0, 0.0, 0.01);
        let mut decoder: Decoder<Model16> = Decoder::new(config, test_calibration());
        let packet = synth_packet(45.0, 1000, 0x37);
        let last_az = decoder.push_packet(&packet);
        assert_eq!(last_az, 4_500);
        assert!(!decoder.has_scanned());
    }

    #[test]
    fn emit_angle_crossing_sets_has_scanned() {
        let mut decoder: Decoder<Model16> = Decoder::new(test_config(), test_calibration());
        decoder.push_packet(&synth_packet(359.0, 1000, 0x37));
        assert!(!decoder.has_scanned());
        decoder.push_packet(&synth_packet(1.0, 1000, 0x37));
        assert!(decoder.has_scanned());
        let (points, _ts) = decoder.poll_scan();
        assert!(!points.is_empty());
    }

    #[test]
    fn short_packet_returns_sentinel_without_panicking() {
        let mut decoder: Decoder<Model16> = Decoder::new(test_config(), test_calibration());
        let short = vec![0u8; 10];
        assert_eq!(decoder.push_packet(&short), -1);
    }

    #[test]
    fn zero_distance_emits_no_point() {
        let mut decoder: Decoder<Model16> = Decoder::new(test_config(), test_calibration());
        let packet = synth_packet(10.0, 0, 0x37);
        decoder.push_packet(&packet);
        decoder.push_packet(&synth_packet(15.0, 0, 0x37));
        let (points, _) = decoder.poll_scan();
        assert!(points.is_empty());
    }
}
