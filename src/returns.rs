//! Return-mode classification and multi-return deduplication.
//!
//! A group of `n_returns` blocks sharing a channel and azimuth is classified
//! return-by-return, with a bit-exact duplicate check taking priority over
//! the mode's normal first/last/strongest labeling.
use crate::error::DecodeError;
use crate::packet::RawUnit;

/// Return-mode code carried in the packet tail, resolved from the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    /// One return per firing, always [`ReturnType::First`].
    Single,
    Strongest,
    Last,
    First,
    /// Two returns per firing: first is [`ReturnType::First`], second is
    /// [`ReturnType::Last`].
    DualFirstLast,
    /// Two returns per firing: first is [`ReturnType::Strongest`], second is
    /// [`ReturnType::SecondStrongest`].
    DualStrongestSecond,
}

impl ReturnMode {
    /// Number of blocks making up one return group for this mode.
    pub fn n_returns(self) -> usize {
        match self {
            ReturnMode::DualFirstLast | ReturnMode::DualStrongestSecond => 2,
            _ => 1,
        }
    }

    /// Resolve the tail's raw return-mode byte.
    pub fn from_code(code: u8) -> Result<Self, DecodeError> {
        match code {
            0x37 => Ok(ReturnMode::Single),
            0x38 => Ok(ReturnMode::Strongest),
            0x39 => Ok(ReturnMode::Last),
            0x3b => Ok(ReturnMode::First),
            0x3c => Ok(ReturnMode::DualFirstLast),
            0x3d => Ok(ReturnMode::DualStrongestSecond),
            other => Err(DecodeError::UnknownReturnMode(other)),
        }
    }
}

/// Classification assigned to one emitted (or dropped) return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    First,
    Last,
    Strongest,
    SecondStrongest,
    /// Bit-exact duplicate of another return in the same group.
    Identical,
}

/// Classify the return at `block_offset` within a group of `units` sharing a
/// channel and azimuth. `IDENTICAL` is checked first regardless of mode: any
/// two returns in the group with the same raw distance are `IDENTICAL`
/// (the Point Emitter keeps only the last such return).
pub fn classify(mode: ReturnMode, block_offset: usize, units: &[RawUnit]) -> ReturnType {
    let cur = units[block_offset];
    if units.len() > 1 {
        let has_duplicate = units
            .iter()
            .enumerate()
            .any(|(j, u)| j != block_offset && u.distance == cur.distance);
        if has_duplicate {
            return ReturnType::Identical;
        }
    }
    match mode {
        ReturnMode::Single | ReturnMode::First => ReturnType::First,
        ReturnMode::Strongest => ReturnType::Strongest,
        ReturnMode::Last => ReturnType::Last,
        ReturnMode::DualFirstLast => {
            if block_offset == 0 {
                ReturnType::First
            } else {
                ReturnType::Last
            }
        }
        ReturnMode::DualStrongestSecond => {
            if block_offset == 0 {
                ReturnType::Strongest
            } else {
                ReturnType::SecondStrongest
            }
        }
    }
}

/// True when `distance` at `block_offset` should be dropped because some
/// other return in the group lies within `threshold` meters of it and is not
/// the last in the group — the Point Emitter keeps only the last index of a
/// too-close cluster.
pub fn is_suppressed_by_threshold(
    block_offset: usize,
    distances_m: &[f32],
    threshold_m: f32,
) -> bool {
    let n = distances_m.len();
    if block_offset == n - 1 {
        return false;
    }
    let cur = distances_m[block_offset];
    distances_m
        .iter()
        .enumerate()
        .any(|(j, &d)| j != block_offset && (d - cur).abs() < threshold_m)
}
