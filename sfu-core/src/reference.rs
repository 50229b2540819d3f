//! Double-precision ground truth, for verification only.

use crate::config::RoundingMode;
use crate::float::POS_ZERO;
use crate::opcode::Opcode;
use crate::oracle::FloatOracle;
use sfu_math::pow2;

/// The exact function each opcode approximates, evaluated in `f64`.
pub fn reference(opcode: Opcode, x: f64) -> f64 {
    match opcode {
        Opcode::Exp2 => libm::exp2(x),
        Opcode::Rcp => 1.0 / x,
        Opcode::Tanh => libm::tanh(x),
        Opcode::Sigmoid => 1.0 / (1.0 + libm::exp(-x)),
    }
}

/// `data - reference` as float32 bits.
///
/// Matching results, NaN against NaN and equal infinities included,
/// report `+0`.
pub fn error_bits<O: FloatOracle>(oracle: &O, opcode: Opcode, input: u32, data: u32) -> u32 {
    let expected = reference(opcode, oracle.to_f64(input));
    let actual = oracle.to_f64(data);
    if (actual.is_nan() && expected.is_nan()) || actual == expected {
        return POS_ZERO;
    }
    oracle.to_f32(actual - expected, RoundingMode::NearestEven).bits
}

/// Distance from `expected` in units of its float32 ULP.
///
/// Matching specials give `0`; a NaN or infinity on only one side gives
/// infinity.
pub fn ulp_error(data: u32, expected: f64) -> f64 {
    let actual = f32::from_bits(data) as f64;
    if (actual.is_nan() && expected.is_nan()) || actual == expected {
        return 0.0;
    }
    if !actual.is_finite() || !expected.is_finite() {
        return f64::INFINITY;
    }
    (actual - expected).abs() / float32_ulp(expected)
}

/// Spacing of float32 values around `x`.
pub fn float32_ulp(x: f64) -> f64 {
    let magnitude = x.abs();
    if magnitude < f32::MIN_POSITIVE as f64 {
        return pow2(-149);
    }
    let exponent = ((magnitude.to_bits() >> 52) & 0x7ff) as i32 - 1023;
    pow2(exponent.min(127) - 23)
}
