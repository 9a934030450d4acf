//! Zero-copy view over a raw UDP payload.
//!
//! Byte layout (little-endian throughout):
//!
//! ```text
//! [ header: service_id u16, method_id u16, length u32 ]  (8 bytes)
//! [ body:   N_BLOCKS * ( azimuth u16, N_CHANNELS * (distance u16, reflectivity u8) ) ]
//! [ tail:   seconds u32, nanoseconds u32, return_mode u8, dis_unit u8 ]             (10 bytes)
//! ```
use std::marker::PhantomData;

use byteorder::{ByteOrder, LE};

use crate::error::DecodeError;
use crate::model::SensorModel;

const HEADER_SIZE: usize = 8;
const AZIMUTH_SIZE: usize = 2;
const UNIT_SIZE: usize = 3; // u16 distance + u8 reflectivity
const TAIL_SIZE: usize = 4 + 4 + 1 + 1;

/// Total packet size for a sensor model with the given block/channel counts.
///
/// `const fn` so it can be used directly in a [`SensorModel::PACKET_SIZE`]
/// associated constant.
pub const fn packet_size(n_blocks: usize, n_channels: usize) -> usize {
    HEADER_SIZE + n_blocks * (AZIMUTH_SIZE + n_channels * UNIT_SIZE) + TAIL_SIZE
}

const fn block_size(n_channels: usize) -> usize {
    AZIMUTH_SIZE + n_channels * UNIT_SIZE
}

/// One measured echo within a block: raw distance count and reflectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawUnit {
    pub distance: u16,
    pub reflectivity: u8,
}

/// Meters-per-raw-count codes carried in the packet tail.
fn dis_unit_meters(code: u8) -> Result<f32, DecodeError> {
    match code {
        0x37 => Ok(0.004),
        0x38 => Ok(0.001),
        other => Err(DecodeError::UnknownDisUnit(other)),
    }
}

/// Read-only, borrowing view over one packet's bytes, typed by sensor model.
pub struct PacketView<'a, S: SensorModel> {
    data: &'a [u8],
    _model: PhantomData<S>,
}

impl<'a, S: SensorModel> PacketView<'a, S> {
    /// Parse `data` as one packet of sensor model `S`.
    ///
    /// Fails with [`DecodeError::PacketTooShort`] if `data` is shorter than
    /// `S::PACKET_SIZE`; no other validation (e.g. checksums) is performed
    /// at this layer.
    pub fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        if data.len() < S::PACKET_SIZE {
            return Err(DecodeError::PacketTooShort {
                got: data.len(),
                expected: S::PACKET_SIZE,
            });
        }
        Ok(Self { data, _model: PhantomData })
    }

    #[inline]
    fn block_offset(&self, block_id: usize) -> usize {
        HEADER_SIZE + block_id * block_size(S::N_CHANNELS)
    }

    /// Raw azimuth of `block_id`, in hundredths of a degree (`0..36000`).
    pub fn block_azimuth(&self, block_id: usize) -> u16 {
        let o = self.block_offset(block_id);
        LE::read_u16(&self.data[o..o + AZIMUTH_SIZE])
    }

    /// Raw unit (distance, reflectivity) for `(block_id, channel_id)`.
    pub fn unit(&self, block_id: usize, channel_id: usize) -> RawUnit {
        let o = self.block_offset(block_id) + AZIMUTH_SIZE + channel_id * UNIT_SIZE;
        let distance = LE::read_u16(&self.data[o..o + 2]);
        let reflectivity = self.data[o + 2];
        RawUnit { distance, reflectivity }
    }

    /// Packet timestamp in nanoseconds, composed from the tail's
    /// seconds/nanoseconds fields.
    pub fn timestamp_ns(&self) -> u64 {
        let o = HEADER_SIZE + S::N_BLOCKS * block_size(S::N_CHANNELS);
        let seconds = LE::read_u32(&self.data[o..o + 4]);
        let nanos = LE::read_u32(&self.data[o + 4..o + 8]);
        seconds as u64 * 1_000_000_000 + nanos as u64
    }

    /// Raw return-mode code from the tail.
    pub fn return_mode(&self) -> u8 {
        let o = HEADER_SIZE + S::N_BLOCKS * block_size(S::N_CHANNELS) + 8;
        self.data[o]
    }

    /// Distance unit for this packet, in meters per raw count.
    pub fn dis_unit_m(&self) -> Result<f32, DecodeError> {
        let o = HEADER_SIZE + S::N_BLOCKS * block_size(S::N_CHANNELS) + 9;
        dis_unit_meters(self.data[o])
    }
}
