//! IEEE-754 single-precision decoding by exact bit inspection.

use sfu_math::pow2;

pub const POS_INF: u32 = 0x7f80_0000;
pub const NEG_INF: u32 = 0xff80_0000;
pub const POS_ZERO: u32 = 0x0000_0000;
pub const NEG_ZERO: u32 = 0x8000_0000;
/// Canonical quiet NaN
pub const CANONICAL_NAN: u32 = 0x7fc0_0000;
/// Most negative finite value
pub const NEG_MAX: u32 = 0xff7f_ffff;
pub const ONE: u32 = 0x3f80_0000;
pub const NEG_ONE: u32 = 0xbf80_0000;
pub const HALF: u32 = 0x3f00_0000;

const SIGN_MASK: u32 = 0x8000_0000;
const EXPONENT_MASK: u32 = 0x7f80_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;
pub const EXPONENT_BIAS: i32 = 127;
pub const HIDDEN_BIT: u32 = 1 << 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatClass {
    Zero,
    Infinity,
    Nan,
    Denormal,
    Normal,
}

/// A 32-bit pattern split into its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFloat {
    pub bits: u32,
    pub negative: bool,
    /// Biased exponent field
    pub exponent: u32,
    /// Stored mantissa without the hidden bit
    pub mantissa: u32,
    pub class: FloatClass,
}

impl DecodedFloat {
    pub fn decode(bits: u32) -> Self {
        let exponent = (bits & EXPONENT_MASK) >> 23;
        let mantissa = bits & MANTISSA_MASK;
        let class = match (exponent, mantissa) {
            (0, 0) => FloatClass::Zero,
            (0, _) => FloatClass::Denormal,
            (0xff, 0) => FloatClass::Infinity,
            (0xff, _) => FloatClass::Nan,
            _ => FloatClass::Normal,
        };
        Self {
            bits,
            negative: bits & SIGN_MASK != 0,
            exponent,
            mantissa,
            class,
        }
    }

    pub fn from_f32(value: f32) -> Self {
        Self::decode(value.to_bits())
    }

    pub fn is_nan(&self) -> bool {
        self.class == FloatClass::Nan
    }

    /// Unbiased exponent of a normal number; denormals report -126.
    pub fn unbiased_exponent(&self) -> i32 {
        match self.class {
            FloatClass::Denormal => 1 - EXPONENT_BIAS,
            _ => self.exponent as i32 - EXPONENT_BIAS,
        }
    }

    /// 24-bit significand with the hidden bit for normals
    pub fn significand(&self) -> u32 {
        match self.class {
            FloatClass::Normal => self.mantissa | HIDDEN_BIT,
            _ => self.mantissa,
        }
    }

    /// Exact value as `f64`.
    pub fn to_f64(&self) -> f64 {
        match self.class {
            FloatClass::Nan => f64::NAN,
            FloatClass::Infinity if self.negative => f64::NEG_INFINITY,
            FloatClass::Infinity => f64::INFINITY,
            _ => {
                let magnitude = self.significand() as f64 * pow2(self.unbiased_exponent() - 23);
                if self.negative {
                    -magnitude
                } else {
                    magnitude
                }
            }
        }
    }

    pub fn to_f32(&self) -> f32 {
        f32::from_bits(self.bits)
    }
}

/// Bit pattern of a finite value with the given significand and unbiased
/// exponent of its leading bit. The significand must be normalised to 24 bits.
pub fn compose(negative: bool, exponent: i32, significand: u32) -> u32 {
    let sign = if negative { SIGN_MASK } else { 0 };
    let biased = (exponent + EXPONENT_BIAS) as u32;
    sign | (biased << 23) | (significand & MANTISSA_MASK)
}

pub fn is_denormal_bits(bits: u32) -> bool {
    bits & EXPONENT_MASK == 0 && bits & MANTISSA_MASK != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_classes() {
        assert_eq!(DecodedFloat::decode(POS_ZERO).class, FloatClass::Zero);
        assert_eq!(DecodedFloat::decode(NEG_ZERO).class, FloatClass::Zero);
        assert!(DecodedFloat::decode(NEG_ZERO).negative);
        assert_eq!(DecodedFloat::decode(POS_INF).class, FloatClass::Infinity);
        assert_eq!(DecodedFloat::decode(NEG_INF).class, FloatClass::Infinity);
        assert_eq!(DecodedFloat::decode(CANONICAL_NAN).class, FloatClass::Nan);
        assert_eq!(DecodedFloat::decode(0x0000_0001).class, FloatClass::Denormal);
        assert_eq!(DecodedFloat::decode(0x0080_0000).class, FloatClass::Normal);
        assert_eq!(DecodedFloat::decode(ONE).class, FloatClass::Normal);
    }

    #[test]
    fn test_exact_values() {
        assert_eq!(DecodedFloat::decode(ONE).to_f64(), 1.0);
        assert_eq!(DecodedFloat::decode(NEG_ONE).to_f64(), -1.0);
        assert_eq!(DecodedFloat::decode(0x0000_0001).to_f64(), pow2(-149));
        assert_eq!(DecodedFloat::from_f32(-3.75).to_f64(), -3.75);
        assert_eq!(DecodedFloat::decode(NEG_MAX).to_f64(), -(f32::MAX as f64));
    }

    #[test]
    fn test_compose() {
        assert_eq!(compose(false, 0, HIDDEN_BIT), ONE);
        assert_eq!(compose(true, -1, HIDDEN_BIT), 0xbf00_0000);
        assert_eq!(compose(false, 1, HIDDEN_BIT | 0x40_0000), 3.0f32.to_bits());
    }

    #[test]
    fn test_denormal_bits() {
        assert!(is_denormal_bits(0x0000_0001));
        assert!(!is_denormal_bits(POS_ZERO));
        assert!(!is_denormal_bits(0x0080_0000));
    }
}
