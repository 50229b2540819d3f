use thiserror::Error;

/// Total width of the c0 coefficient field.
pub const T_D: u32 = 31;
/// Total width of the c1 coefficient field.
pub const P_D: u32 = 22;
/// Total width of the c2 coefficient field.
pub const Q_D: u32 = 15;
/// Integer bits of the c0 field.
pub const T_N_D: u32 = 2;
/// Integer bits of the c1 field.
pub const P_N_D: u32 = 2;
/// Integer bits of the c2 field.
pub const Q_N_D: u32 = 1;
/// Mantissa width of an IEEE-754 single.
pub const DEC_FP32: u32 = 23;
/// Binary point of the datapath accumulator.
pub const MAX_POS: u32 = 40;
/// Width of the squared multiplier operand before guard-bit truncation.
pub const X2_2: u32 = 40;
/// Digit-index span of the c1 Booth product.
pub const BOOTH_X2: u32 = 10;
/// Digit-index span of the c2 Booth product.
pub const BOOTH_X2X2: u32 = 17;

/// Guard bits dropped by [`square_cut_6_bit`].
const SQUARE_GUARD_BITS: u32 = 6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixedPointError {
    #[error("value {value} does not fit a {width}-bit field with {frac_bits} fractional bits")]
    OutOfRange {
        value: f64,
        width: u32,
        frac_bits: u32,
    },
}

/// A signed two's-complement field of `width` bits whose low `frac_bits`
/// bits sit below the binary point.
///
/// The format carries no storage of its own; raw values are plain `i64`s
/// and the format says how to read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFormat {
    pub width: u32,
    pub frac_bits: u32,
}

impl FixedFormat {
    /// Format of the c0 (constant) coefficient.
    pub const C0: Self = Self::new(T_D, T_D - T_N_D);
    /// Format of the c1 (linear) coefficient.
    pub const C1: Self = Self::new(P_D, P_D - P_N_D);
    /// Format of the c2 (quadratic) coefficient.
    pub const C2: Self = Self::new(Q_D, Q_D - Q_N_D);
    /// Format of the datapath accumulator.
    pub const ACCUMULATOR: Self = Self::new(64, MAX_POS);

    pub const fn new(width: u32, frac_bits: u32) -> Self {
        Self { width, frac_bits }
    }

    /// Largest raw value the field can hold
    pub const fn max_raw(self) -> i64 {
        (1i64 << (self.width - 1)) - 1
    }

    /// Smallest raw value the field can hold
    pub const fn min_raw(self) -> i64 {
        -(1i64 << (self.width - 1))
    }

    pub fn contains(self, raw: i64) -> bool {
        raw >= self.min_raw() && raw <= self.max_raw()
    }

    /// Quantize with round-to-nearest (ties away from zero), rejecting
    /// values outside the field.
    pub fn try_from_f64(self, value: f64) -> Result<i64, FixedPointError> {
        let scaled = (value * pow2(self.frac_bits as i32)).round();
        if !scaled.is_finite() || scaled < self.min_raw() as f64 || scaled > self.max_raw() as f64 {
            return Err(FixedPointError::OutOfRange {
                value,
                width: self.width,
                frac_bits: self.frac_bits,
            });
        }
        Ok(scaled as i64)
    }

    /// Quantize with round-to-nearest, clamping to the field bounds.
    pub fn from_f64_saturating(self, value: f64) -> i64 {
        let scaled = (value * pow2(self.frac_bits as i32)).round();
        if scaled.is_nan() {
            0
        } else if scaled >= self.max_raw() as f64 {
            self.max_raw()
        } else if scaled <= self.min_raw() as f64 {
            self.min_raw()
        } else {
            scaled as i64
        }
    }

    /// Exact for any raw value below 2^53 in magnitude
    pub fn to_f64(self, raw: i64) -> f64 {
        raw as f64 * pow2(-(self.frac_bits as i32))
    }
}

/// Exact power of two for exponents within the normal `f64` range.
///
/// Out-of-range exponents saturate to zero or infinity.
pub fn pow2(exp: i32) -> f64 {
    if exp < -1022 {
        0.0
    } else if exp > 1023 {
        f64::INFINITY
    } else {
        f64::from_bits(((exp + 1023) as u64) << 52)
    }
}

/// Clear the `n` low-order bits of `x`.
///
/// This is two's-complement truncation toward negative infinity while the
/// value keeps its scale; the sign is preserved and the operation is
/// idempotent. `n <= 0` leaves `x` untouched and `n >= 64` clears it.
pub fn cut_bit(x: i64, n: i32) -> i64 {
    if n <= 0 {
        return x;
    }
    match (!0i64).checked_shl(n as u32) {
        Some(mask) => x & mask,
        None => 0,
    }
}

/// Square a 20-bit multiplier and keep [`X2_2`] - 6 bits of the product.
///
/// The six guard bits below the c2 product's reach are dropped before the
/// square enters the Booth recoder.
pub fn square_cut_6_bit(x: u64) -> u64 {
    let square = x.wrapping_mul(x) & ((1u64 << X2_2) - 1);
    (cut_bit(square as i64, SQUARE_GUARD_BITS as i32) >> SQUARE_GUARD_BITS) as u64
}

/// Arithmetic shift that accepts either direction.
pub fn shift_right(x: i64, n: i32) -> i64 {
    if n >= 0 {
        x >> n.min(63)
    } else {
        x << (-n).min(63)
    }
}
