//! Top-level dispatch: one parameterised pipeline for every opcode.

use crate::config::SfuConfig;
use crate::flags::ExceptionFlags;
use crate::float::{
    compose, is_denormal_bits, DecodedFloat, CANONICAL_NAN, EXPONENT_BIAS, HIDDEN_BIT,
};
use crate::opcode::Opcode;
use crate::oracle::{FloatOracle, SoftFloatOracle};
use crate::reduce::{approximate, Reduced};
use crate::reference::error_bits;
use crate::special::{classify, Outcome, Route};
use crate::table::tables;

/// Everything the unit reports for one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SfuOutput {
    /// Result as float32 bits
    pub data: u32,
    /// `data - reference` as float32 bits
    pub err: u32,
    pub exceptions: ExceptionFlags,
    /// Pre-rounding accumulator when debugging, `0` otherwise
    pub booth_trace: i64,
}

impl SfuOutput {
    pub fn data_f32(&self) -> f32 {
        f32::from_bits(self.data)
    }

    pub fn err_f32(&self) -> f32 {
        f32::from_bits(self.err)
    }
}

/// The unit: configuration plus the float oracle used for rounding.
#[derive(Debug, Clone, Default)]
pub struct Sfu<O: FloatOracle = SoftFloatOracle> {
    config: SfuConfig,
    oracle: O,
}

impl Sfu<SoftFloatOracle> {
    pub fn new(config: SfuConfig) -> Self {
        Self::with_oracle(config, SoftFloatOracle)
    }
}

/// Result of the approximation stage before the reference comparison
struct Stage {
    data: u32,
    flags: ExceptionFlags,
    trace: i64,
}

impl Stage {
    fn resolved(data: u32, flags: ExceptionFlags) -> Self {
        Self { data, flags, trace: 0 }
    }
}

impl<O: FloatOracle> Sfu<O> {
    pub fn with_oracle(config: SfuConfig, oracle: O) -> Self {
        Self { config, oracle }
    }

    pub fn config(&self) -> &SfuConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Evaluate `opcode` on a float32 bit pattern. Total over all inputs.
    pub fn evaluate(&self, input: u32, opcode: Opcode) -> SfuOutput {
        let x = DecodedFloat::decode(input);
        let stage = match classify(opcode, &x) {
            Outcome::Constant { bits, flags } => Stage::resolved(bits, flags),
            Outcome::PassThrough => Stage::resolved(input, ExceptionFlags::NONE),
            Outcome::SigmoidLinear => {
                let (data, inexact) = sigmoid_linear(&x);
                let mut flags = ExceptionFlags::NONE;
                flags.set_if(ExceptionFlags::NX, inexact);
                Stage::resolved(data, flags)
            }
            Outcome::ReciprocalPowerOfTwo => {
                Stage::resolved(reciprocal_power_of_two(&x), ExceptionFlags::NONE)
            }
            Outcome::Compute(route) => self.compute(route, &x, opcode),
        };

        // Any delivered denormal underflows, bypass results included
        let mut exceptions = stage.flags;
        exceptions.set_if(ExceptionFlags::UF, is_denormal_bits(stage.data));

        SfuOutput {
            data: stage.data,
            err: error_bits(&self.oracle, opcode, input, stage.data),
            exceptions,
            booth_trace: if self.config.debug { stage.trace } else { 0 },
        }
    }

    fn compute(&self, route: Route, x: &DecodedFloat, opcode: Opcode) -> Stage {
        let Some(reduced) = approximate(route, x, tables()) else {
            log::warn!("{opcode}: operand {:#010x} outside {route:?} domain", x.bits);
            return Stage::resolved(CANONICAL_NAN, ExceptionFlags::NV);
        };
        let approximation = match reduced {
            Reduced::Flushed(bits) => return Stage::resolved(bits, ExceptionFlags::NONE),
            Reduced::Approximated(approximation) => approximation,
        };

        let rounded = self.oracle.to_f32(approximation.value(), self.config.rounding);
        let data = if approximation.halve {
            (f32::from_bits(rounded.bits) / 2.0).to_bits()
        } else {
            rounded.bits
        };
        if self.config.debug {
            log::trace!(
                "{opcode} {:#010x} via {route:?}: trace {} scale {} -> {data:#010x}",
                x.bits,
                approximation.trace,
                approximation.scale
            );
        }
        Stage {
            data,
            flags: ExceptionFlags::from_rounding(&rounded, data),
            trace: approximation.trace,
        }
    }
}

/// `x/4 + 1/2` for `|x| < 2^-9`, built from the operand bits, and whether
/// it differs from the exact value.
///
/// Negative operands take the one's complement of the shifted magnitude,
/// one LSB below the exact difference, so they are never exact.
fn sigmoid_linear(x: &DecodedFloat) -> (u32, bool) {
    let significand = x.significand() as u64;
    let exponent = x.exponent;
    let (shifted, dropped) = if exponent > 96 {
        let shift = if x.negative { 127 - exponent } else { 128 - exponent };
        (significand >> shift, significand & ((1 << shift) - 1) != 0)
    } else {
        // Flushed: the operand is nonzero, so its bits are all lost
        (0, true)
    };
    let (numerator, denominator_log2) = if x.negative {
        ((1u64 << 24) - 1 - shifted, 25)
    } else {
        (shifted + (1 << 23), 24)
    };
    // Both numerators fit 24 bits, so the quotient is exact
    let bits = (numerator as f32 / (1u64 << denominator_log2) as f32).to_bits();
    (bits, dropped || x.negative)
}

/// Exact `1/x` for `x = ±2^e`.
fn reciprocal_power_of_two(x: &DecodedFloat) -> u32 {
    let exponent = -x.unbiased_exponent();
    if exponent >= 1 - EXPONENT_BIAS {
        compose(x.negative, exponent, HIDDEN_BIT)
    } else {
        let sign = if x.negative { 0x8000_0000 } else { 0 };
        sign | (HIDDEN_BIT >> (1 - EXPONENT_BIAS - exponent))
    }
}

/// Evaluate with the default configuration and rounding oracle.
pub fn evaluate(input: u32, opcode: Opcode, debug: bool) -> SfuOutput {
    Sfu::new(SfuConfig::default().with_debug(debug)).evaluate(input, opcode)
}

pub fn sfu_exp2(input: u32) -> SfuOutput {
    evaluate(input, Opcode::Exp2, false)
}

pub fn sfu_rcp(input: u32) -> SfuOutput {
    evaluate(input, Opcode::Rcp, false)
}

pub fn sfu_sigmoid(input: u32) -> SfuOutput {
    evaluate(input, Opcode::Sigmoid, false)
}

pub fn sfu_tanh(input: u32) -> SfuOutput {
    evaluate(input, Opcode::Tanh, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_linear_bits() {
        let x = DecodedFloat::from_f32(f32::powi(2.0, -12));
        assert_eq!(sigmoid_linear(&x), (0x3f00_0400, false));
        let x = DecodedFloat::from_f32(-f32::powi(2.0, -12));
        assert_eq!(sigmoid_linear(&x), (0x3eff_f7ff, true));
    }

    #[test]
    fn test_sigmoid_linear_dropped_bits_are_inexact() {
        // 2^-11 · (1 + 2^-23): the low significand bit is shifted out
        let x = DecodedFloat::decode(0x3a00_0001);
        assert_eq!(sigmoid_linear(&x), (0x3f00_0800, true));
        let x = DecodedFloat::decode(0x3a00_0000);
        assert_eq!(sigmoid_linear(&x), (0x3f00_0800, false));
    }

    #[test]
    fn test_sigmoid_linear_tiny() {
        let x = DecodedFloat::from_f32(f32::powi(2.0, -40));
        assert_eq!(sigmoid_linear(&x), (0x3f00_0000, true));
        let x = DecodedFloat::from_f32(-f32::powi(2.0, -40));
        // (2^24 - 1) / 2^25, just below one half
        assert_eq!(sigmoid_linear(&x), (0x3eff_ffff, true));
    }

    #[test]
    fn test_bypass_flags() {
        let out = evaluate(0x3a00_0001, Opcode::Sigmoid, false);
        assert_eq!(out.data, 0x3f00_0800);
        assert_eq!(out.exceptions, ExceptionFlags::NX);
        assert_eq!(evaluate(0x3a00_0000, Opcode::Sigmoid, false).exceptions, ExceptionFlags::NONE);
        assert_eq!(evaluate(0xba00_0001, Opcode::Sigmoid, false).exceptions, ExceptionFlags::NX);

        // Denormal operands pass through tanh and underflow
        for bits in [0x0000_0001, 0x0040_0000, 0x8000_0005] {
            let out = evaluate(bits, Opcode::Tanh, false);
            assert_eq!(out.data, bits);
            assert_eq!(out.exceptions, ExceptionFlags::UF);
        }
    }

    #[test]
    fn test_reciprocal_power_of_two() {
        assert_eq!(reciprocal_power_of_two(&DecodedFloat::from_f32(2.0)), 0x3f00_0000);
        assert_eq!(reciprocal_power_of_two(&DecodedFloat::from_f32(-0.25)), 0xc080_0000);
        let largest = DecodedFloat::from_f32(f32::powi(2.0, 127));
        assert_eq!(reciprocal_power_of_two(&largest), 0x0040_0000);
    }

    #[test]
    fn test_debug_trace_only_when_requested() {
        let quiet = evaluate(0x4040_0000, Opcode::Rcp, false);
        let traced = evaluate(0x4040_0000, Opcode::Rcp, true);
        assert_eq!(quiet.booth_trace, 0);
        assert_ne!(traced.booth_trace, 0);
        assert_eq!(quiet.data, traced.data);
    }
}
