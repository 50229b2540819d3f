//! Range reduction and accumulator reconstruction per [`Route`].

use crate::float::{compose, DecodedFloat, FloatClass, HIDDEN_BIT, POS_ZERO};
use crate::special::Route;
use crate::table::CoefficientTables;
use sfu_math::{pow2, FixedFormat, DEC_FP32, MAX_POS};

/// 1.0 on the accumulator grid
const ACC_ONE: i64 = 1 << MAX_POS;
/// Below this the sigmoid tail flushes to zero
const TAIL_LIMIT: f64 = -149.0;

/// Pre-rounding accumulator and its binary scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approximation {
    /// Signed accumulator with [`MAX_POS`] fractional bits
    pub trace: i64,
    /// Power of two applied on top of the accumulator
    pub scale: i32,
    /// The rounded result is halved afterwards
    pub halve: bool,
}

impl Approximation {
    fn scaled(trace: i64, scale: i32) -> Self {
        Self {
            trace,
            scale,
            halve: false,
        }
    }

    /// Exact value `trace · 2^(scale - MAX_POS)`.
    pub fn value(&self) -> f64 {
        FixedFormat::ACCUMULATOR.to_f64(self.trace) * pow2(self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduced {
    /// Resolved without the datapath
    Flushed(u32),
    Approximated(Approximation),
}

/// Run `route` on `x`. `None` means the operand does not belong to the
/// route's domain.
pub fn approximate(route: Route, x: &DecodedFloat, tables: &CoefficientTables) -> Option<Reduced> {
    let exponent = x.unbiased_exponent();
    let signed = |acc: i64| if x.negative { -acc } else { acc };
    let approximation = match route {
        Route::Exp2 => exp2(x, tables)?,
        Route::Rcp => {
            if x.class != FloatClass::Normal {
                return None;
            }
            Approximation::scaled(signed(tables.rcp.evaluate(x.mantissa)), -exponent)
        }
        Route::RcpPrescaled => {
            let (significand, exponent) = normalize(x)?;
            // 4·x is normal; the accumulator is rescaled by the same factor
            let acc = tables.rcp.evaluate(significand) << 2;
            Approximation::scaled(signed(acc), -(exponent + 2))
        }
        Route::Tanh => {
            let acc = tables.tanh(exponent)?.evaluate(x.mantissa);
            Approximation::scaled(signed(acc), 0)
        }
        Route::TanhViaSigmoid => {
            let acc = tables.sigmoid(exponent + 1)?.evaluate(x.mantissa);
            Approximation::scaled(signed(2 * acc - ACC_ONE), 0)
        }
        Route::Sigmoid => {
            let acc = tables.sigmoid(exponent)?.evaluate(x.mantissa);
            let acc = if x.negative { ACC_ONE - acc } else { acc };
            Approximation::scaled(acc, 0)
        }
        Route::SigmoidViaTanh => {
            let acc = tables.tanh(exponent - 1)?.evaluate(x.mantissa);
            let acc = if x.negative { ACC_ONE - acc } else { ACC_ONE + acc };
            Approximation {
                trace: acc,
                scale: 0,
                halve: true,
            }
        }
        Route::SigmoidTail => match sigmoid_tail_argument(x)? {
            Some(argument) => exp2(&argument, tables)?,
            None => return Some(Reduced::Flushed(POS_ZERO)),
        },
    };
    Some(Reduced::Approximated(approximation))
}

fn exp2(x: &DecodedFloat, tables: &CoefficientTables) -> Option<Approximation> {
    let (fraction, exponent) = exp2_split(x)?;
    Some(Approximation::scaled(tables.exp2.evaluate(fraction), exponent))
}

/// Split `x` into a 23-bit fraction `t` and an exponent `n` with
/// `2^x ≈ 2^t · 2^n`.
///
/// Fraction bits below 2^-23 are dropped toward the smaller `t` for
/// positive operands. For negative operands `t` is `1 - frac(|x|)` with
/// the dropped bits rounding `t` up.
pub fn exp2_split(x: &DecodedFloat) -> Option<(u32, i32)> {
    if x.class != FloatClass::Normal {
        return None;
    }
    let fraction_bits = DEC_FP32 as i32 - x.unbiased_exponent();
    if !(1..64).contains(&fraction_bits) {
        return None;
    }
    let significand = x.significand() as u64;
    let integer = (significand >> fraction_bits) as i32;
    let fraction = significand & ((1u64 << fraction_bits) - 1);
    let t = if fraction_bits >= DEC_FP32 as i32 {
        fraction >> (fraction_bits - DEC_FP32 as i32)
    } else {
        fraction << (DEC_FP32 as i32 - fraction_bits)
    };
    let t = t as u32;

    if !x.negative {
        return Some((t, integer));
    }
    if fraction == 0 || t == 0 {
        return Some((0, -integer));
    }
    Some((HIDDEN_BIT - t, -integer - 1))
}

/// Significand (without hidden bit) and exponent of a finite nonzero
/// operand, normalising denormals.
fn normalize(x: &DecodedFloat) -> Option<(u32, i32)> {
    match x.class {
        FloatClass::Normal => Some((x.mantissa, x.unbiased_exponent())),
        FloatClass::Denormal => {
            let shift = x.mantissa.leading_zeros() - 8;
            let significand = x.mantissa << shift;
            Some((significand & (HIDDEN_BIT - 1), x.unbiased_exponent() - shift as i32))
        }
        _ => None,
    }
}

/// `23/16 · x` rounded toward positive infinity, or `None` once it is
/// below the smallest denormal exponent.
fn sigmoid_tail_argument(x: &DecodedFloat) -> Option<Option<DecodedFloat>> {
    if x.class != FloatClass::Normal || !x.negative {
        return None;
    }
    let product = 23 * x.significand() as u64;
    let width = 64 - product.leading_zeros() as i32;
    let dropped = width - 24;
    // Truncating a negative magnitude rounds toward positive infinity
    let significand = (product >> dropped) as u32;
    let exponent = x.unbiased_exponent() - 4 + dropped;
    let value = -(significand as f64) * pow2(exponent - DEC_FP32 as i32);
    if value < TAIL_LIMIT {
        return Some(None);
    }
    Some(Some(DecodedFloat::decode(compose(true, exponent, significand))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tables;

    fn split(value: f32) -> (u32, i32) {
        exp2_split(&DecodedFloat::from_f32(value)).unwrap()
    }

    #[test]
    fn test_exp2_split_positive() {
        assert_eq!(split(1.0), (0, 1));
        assert_eq!(split(2.5), (0x40_0000, 2));
        assert_eq!(split(0.75), (0x60_0000, 0));
    }

    #[test]
    fn test_exp2_split_negative() {
        assert_eq!(split(-1.0), (0, -1));
        assert_eq!(split(-3.0), (0, -3));
        // 2^-2.25 = 2^0.75 · 2^-3
        assert_eq!(split(-2.25), (0x60_0000, -3));
        assert_eq!(split(-0.5), (0x40_0000, -1));
    }

    #[test]
    fn test_exp2_split_rounds_small_fractions() {
        let x = f32::from_bits(0x3e80_0001); // 0.25 + 2^-25
        assert_eq!(split(x), (0x20_0000, 0));
        assert_eq!(split(-x), (0x60_0000, -1));
    }

    #[test]
    fn test_sigmoid_tail_argument() {
        let arg = sigmoid_tail_argument(&DecodedFloat::from_f32(-16.0)).unwrap().unwrap();
        assert_eq!(arg.to_f32(), -23.0);

        let flushed = sigmoid_tail_argument(&DecodedFloat::from_f32(-104.0)).unwrap();
        assert!(flushed.is_none());

        let kept = sigmoid_tail_argument(&DecodedFloat::from_f32(-103.5)).unwrap();
        assert!(kept.is_some());
    }

    #[test]
    fn test_normalize_denormal() {
        let x = DecodedFloat::decode(0x0030_0000); // 1.5 · 2^-128
        assert_eq!(normalize(&x), Some((0x40_0000, -128)));
    }

    #[test]
    fn test_rcp_prescaled_matches_direct_scale() {
        let x = DecodedFloat::decode(0x0030_0000);
        let Some(Reduced::Approximated(a)) = approximate(Route::RcpPrescaled, &x, tables()) else {
            panic!("expected an approximation");
        };
        let expected = 1.0 / x.to_f64();
        assert!((a.value() - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_sigmoid_via_tanh_halves() {
        let x = DecodedFloat::from_f32(0.5);
        let Some(Reduced::Approximated(a)) = approximate(Route::SigmoidViaTanh, &x, tables()) else {
            panic!("expected an approximation");
        };
        assert!(a.halve);
        let sigmoid = 1.0 / (1.0 + (-0.5f64).exp());
        assert!((a.value() / 2.0 - sigmoid).abs() < 1e-6);
    }

    #[test]
    fn test_route_domain_mismatch() {
        let denormal = DecodedFloat::decode(0x0000_0001);
        assert!(approximate(Route::Rcp, &denormal, tables()).is_none());
        assert!(approximate(Route::Tanh, &DecodedFloat::from_f32(3.0), tables()).is_none());
    }
}
