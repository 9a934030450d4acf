use thiserror::Error;

/// Errors raised while decoding a single packet.
///
/// Every variant here is recovered from locally by [`crate::Decoder`]: the
/// offending packet is dropped and decoding continues with the next one.
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum DecodeError {
    /// `bytes.len()` was smaller than the sensor model's expected packet size.
    #[error("packet too short: got {got} bytes, expected at least {expected}")]
    PacketTooShort { got: usize, expected: usize },

    /// The tail's return-mode byte did not match any mode this sensor model
    /// recognizes.
    #[error("unknown return-mode code 0x{0:02x}")]
    UnknownReturnMode(u8),

    /// The tail's dis-unit byte did not match any known distance-unit code.
    #[error("unknown dis-unit code 0x{0:02x}")]
    UnknownDisUnit(u8),
}

/// Errors raised while loading a calibration document.
///
/// Unlike [`DecodeError`], these are fatal: they surface at
/// [`crate::Calibration::load`] time and construction of the decoder fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// The document could not be parsed as valid YAML at all.
    #[error("malformed calibration document: {0}")]
    Malformed(String),

    /// A required field was absent from a laser entry.
    #[error("malformed calibration: missing required field `{0}`")]
    MissingField(&'static str),

    /// `num_lasers <= 0`.
    #[error("invalid calibration: num_lasers must be positive, got {0}")]
    InvalidNumLasers(i64),

    /// `distance_resolution <= 0`.
    #[error("invalid calibration: distance_resolution must be positive, got {0}")]
    InvalidDistanceResolution(f64),

    /// Two laser entries declared the same `laser_id`.
    #[error("invalid calibration: duplicate laser_id {0}")]
    DuplicateLaserId(u32),
}
