//! Per-packet decoder for spinning multi-laser rangefinders: turns raw UDP
//! payloads into point clouds partitioned into rotational scans.
//!
//! This crate owns none of the surrounding system — no socket, no threads,
//! no downstream publication. A caller reads bytes off the wire (or a pcap
//! file, or anything else), feeds them to [`Decoder::push_packet`], and
//! polls [`Decoder::poll_scan`] once [`Decoder::has_scanned`] is true.
//!
//! ```no_run
//! use std::sync::Arc;
//! use spinscan::{Calibration, Decoder, Model16, SensorConfiguration};
//!
//! # fn run(calibration_yaml: &str, packet: &[u8]) -> Result<(), spinscan::CalibrationError> {
//! let calibration = Arc::new(Calibration::load(calibration_yaml)?);
//! let config = SensorConfiguration::new(0.2, 150.0, 0.0, 360.0, 0.0, 0.01);
//! let mut decoder: Decoder<Model16> = Decoder::new(config, calibration);
//!
//! decoder.push_packet(packet);
//! if decoder.has_scanned() {
//!     let (points, scan_ts_seconds) = decoder.poll_scan();
//!     println!("{} points at t={}", points.len(), scan_ts_seconds);
//! }
//! # Ok(())
//! # }
//! ```

pub mod angle;
pub mod calibration;
pub mod config;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod model;
pub mod packet;
pub mod returns;
pub mod scan;

pub use angle::{AngleCorrector, CorrectedAngleData};
pub use calibration::{Calibration, ChannelCorrection};
pub use config::SensorConfiguration;
pub use decoder::Decoder;
pub use error::{CalibrationError, DecodeError};
pub use filter::PointFilter;
pub use model::{Model16, Model32, SensorModel};
pub use packet::{PacketView, RawUnit};
pub use returns::{ReturnMode, ReturnType};
pub use scan::{Point, ScanBuffers};
