//! Point record and the decode/output scan-buffer pair.
use crate::returns::ReturnType;

/// One emitted point, relative to the scan it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: u8,
    /// Nanoseconds relative to the owning scan's start.
    pub time_stamp: u32,
    pub return_type: ReturnType,
    pub channel: u8,
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
}

/// Decode/output point buffer pair plus their scan-start timestamps.
///
/// Points accumulate into `decode` while a scan is in progress; on an
/// emit-angle crossing the two buffers (and timestamps) swap, so the just-
/// completed scan becomes `output` without copying any points.
pub struct ScanBuffers {
    decode: Vec<Point>,
    output: Vec<Point>,
    decode_scan_ts_ns: u64,
    output_scan_ts_ns: u64,
    has_scanned: bool,
}

impl ScanBuffers {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            decode: Vec::with_capacity(capacity),
            output: Vec::with_capacity(capacity),
            decode_scan_ts_ns: 0,
            output_scan_ts_ns: 0,
            has_scanned: false,
        }
    }

    pub fn has_scanned(&self) -> bool {
        self.has_scanned
    }

    pub fn decode_scan_ts_ns(&self) -> u64 {
        self.decode_scan_ts_ns
    }

    pub fn output_scan_ts_ns(&self) -> u64 {
        self.output_scan_ts_ns
    }

    /// Initialize the decode scan timestamp once, on the first packet ever
    /// seen by the decoder.
    pub fn init_decode_ts(&mut self, packet_ts_ns: u64, earliest_block_offset_ns: u32) {
        self.decode_scan_ts_ns = packet_ts_ns + earliest_block_offset_ns as u64;
    }

    /// Append `point` to the decode buffer if `in_current_scan`, otherwise to
    /// the output buffer.
    pub fn append(&mut self, point: Point, in_current_scan: bool) {
        if in_current_scan {
            self.decode.push(point);
        } else {
            self.output.push(point);
        }
    }

    /// Rebase the timestamp-reset-angle-crossing scan. The rule is
    /// asymmetric: if `cut_angle == cloud_max_angle`, the newly starting scan
    /// is the decode scan, otherwise it's the just-completed output scan.
    pub fn on_cut(&mut self, packet_ts_ns: u64, block_offset_ns: u32, cut_equals_cloud_max: bool) {
        let ts = packet_ts_ns + block_offset_ns as u64;
        if cut_equals_cloud_max {
            self.decode_scan_ts_ns = ts;
        } else {
            self.output_scan_ts_ns = ts;
        }
    }

    /// Swap decode/output buffers and timestamps on an emit-angle crossing,
    /// marking a completed scan ready for [`Self::take_output`].
    pub fn on_emit_crossing(&mut self) {
        std::mem::swap(&mut self.decode, &mut self.output);
        std::mem::swap(&mut self.decode_scan_ts_ns, &mut self.output_scan_ts_ns);
        self.has_scanned = true;
    }

    /// Borrow the most recently completed scan and its start timestamp, in
    /// floating-point seconds.
    pub fn take_output(&self) -> (&[Point], f64) {
        (&self.output, self.output_scan_ts_ns as f64 * 1e-9)
    }

    /// Clear the output buffer (called once the caller has had the
    /// opportunity to poll it) and reset the flag.
    pub fn clear_output(&mut self) {
        self.output.clear();
        self.has_scanned = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point() -> Point {
        Point {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            intensity: 100,
            time_stamp: 42,
            return_type: ReturnType::First,
            channel: 0,
            azimuth: 0.0,
            elevation: 0.0,
            distance: 4.0,
        }
    }

    #[test]
    fn append_routes_to_decode_or_output() {
        let mut buffers = ScanBuffers::with_capacity(4);
        buffers.append(sample_point(), true);
        buffers.append(sample_point(), false);
        assert_eq!(buffers.decode.len(), 1);
        assert_eq!(buffers.output.len(), 1);
    }

    #[test]
    fn emit_crossing_swaps_buffers_and_sets_flag() {
        let mut buffers = ScanBuffers::with_capacity(4);
        buffers.append(sample_point(), true);
        buffers.on_emit_crossing();
        assert!(buffers.has_scanned());
        assert_eq!(buffers.take_output().0.len(), 1);
        assert!(buffers.decode.is_empty());
    }

    #[test]
    fn clear_output_resets_flag_and_empties_buffer() {
        let mut buffers = ScanBuffers::with_capacity(4);
        buffers.append(sample_point(), true);
        buffers.on_emit_crossing();
        buffers.clear_output();
        assert!(!buffers.has_scanned());
        assert!(buffers.take_output().0.is_empty());
    }

    #[test]
    fn on_cut_updates_decode_or_output_timestamp_per_asymmetry() {
        let mut buffers = ScanBuffers::with_capacity(4);
        buffers.on_cut(1_000_000, 500, true);
        assert_eq!(buffers.decode_scan_ts_ns(), 1_000_500);
        buffers.on_cut(2_000_000, 100, false);
        assert_eq!(buffers.output_scan_ts_ns(), 2_000_100);
    }
}
