use crate::config::RoundingMode;
use crate::float::CANONICAL_NAN;
use rustc_apfloat::ieee::{Double, Single};
use rustc_apfloat::{Float, FloatConvert, Round, Status, StatusAnd};

/// Outcome of one float32 rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rounded {
    pub bits: u32,
    /// Discarded bits were nonzero
    pub inexact: bool,
    /// The rounded magnitude exceeded the largest finite float32
    pub overflow: bool,
}

/// Software floating-point provider used for final rounding and for the
/// reference path. Never consulted while the approximation is computed.
///
/// Implementations must be deterministic: the same value and mode give the
/// same bits and status on every platform.
pub trait FloatOracle {
    /// Round an `f64` to float32 bits. NaN inputs give the canonical NaN.
    fn to_f32(&self, value: f64, mode: RoundingMode) -> Rounded;

    /// Widen float32 bits exactly.
    fn to_f64(&self, bits: u32) -> f64;
}

/// [`FloatOracle`] backed by `rustc_apfloat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftFloatOracle;

impl From<RoundingMode> for Round {
    fn from(mode: RoundingMode) -> Self {
        match mode {
            RoundingMode::NearestEven => Round::NearestTiesToEven,
            RoundingMode::TowardZero => Round::TowardZero,
            RoundingMode::TowardNegative => Round::TowardNegative,
            RoundingMode::TowardPositive => Round::TowardPositive,
            RoundingMode::NearestAway => Round::NearestTiesToAway,
        }
    }
}

impl FloatOracle for SoftFloatOracle {
    fn to_f32(&self, value: f64, mode: RoundingMode) -> Rounded {
        if value.is_nan() {
            return Rounded {
                bits: CANONICAL_NAN,
                ..Rounded::default()
            };
        }
        let mut loses_info = false;
        let StatusAnd::<Single> { status, value } =
            Double::from_bits(value.to_bits() as u128).convert_r(mode.into(), &mut loses_info);
        Rounded {
            bits: value.to_bits() as u32,
            inexact: status.contains(Status::INEXACT),
            overflow: status.contains(Status::OVERFLOW),
        }
    }

    fn to_f64(&self, bits: u32) -> f64 {
        let mut loses_info = false;
        let StatusAnd::<Double> { value, .. } =
            Single::from_bits(bits as u128).convert(&mut loses_info);
        f64::from_bits(value.to_bits() as u64)
    }
}
