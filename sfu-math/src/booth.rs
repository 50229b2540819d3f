use crate::fixed_point::{
    cut_bit, shift_right, BOOTH_X2, BOOTH_X2X2, MAX_POS, P_D, P_N_D, Q_D, Q_N_D,
};

/// Storage reserved for class C1 recodings.
pub const C1_CAPACITY: usize = 100;
/// Storage reserved for class C2 recodings.
pub const C2_CAPACITY: usize = 170;

/// A radix-4 Booth digit: a multiple in {0, 1, 2} plus the negate line.
///
/// The window `0b111` selects zero with the negate line asserted, so two
/// digits with the same value can differ in [`BoothDigit::is_negative`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoothDigit {
    magnitude: u8,
    negative: bool,
}

impl BoothDigit {
    pub const ZERO: Self = Self {
        magnitude: 0,
        negative: false,
    };

    pub const fn new(magnitude: u8, negative: bool) -> Self {
        Self { magnitude, negative }
    }

    pub fn is_negative(self) -> bool {
        self.negative
    }

    /// Signed value in {-2, -1, 0, 1, 2}
    pub fn value(self) -> i64 {
        let magnitude = self.magnitude as i64;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Partial product this digit selects from `multiplicand`.
    ///
    /// Negative rows are formed the way the adder tree forms them: the
    /// positive multiple is inverted and a one is injected at the row LSB.
    pub fn select(self, multiplicand: i64) -> i64 {
        let multiple = match self.magnitude {
            0 => 0,
            1 => multiplicand,
            _ => multiplicand << 1,
        };
        if self.negative {
            (!multiple).wrapping_add(1)
        } else {
            multiple
        }
    }
}

/// Booth selection for one 3-bit window (`b[2i+1] b[2i] b[2i-1]`).
///
/// Only the low three bits of `window` are read.
pub fn pp(window: u8) -> BoothDigit {
    match window & 0b111 {
        0b000 => BoothDigit::new(0, false),
        0b001 | 0b010 => BoothDigit::new(1, false),
        0b011 => BoothDigit::new(2, false),
        0b100 => BoothDigit::new(2, true),
        0b101 | 0b110 => BoothDigit::new(1, true),
        _ => BoothDigit::new(0, true),
    }
}

/// The two multiplier families of the datapath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoothClass {
    /// 20-bit reduced argument feeding the linear term
    C1,
    /// 34-bit truncated square feeding the quadratic term
    C2,
}

impl BoothClass {
    pub const fn capacity(self) -> usize {
        match self {
            BoothClass::C1 => C1_CAPACITY,
            BoothClass::C2 => C2_CAPACITY,
        }
    }

    /// Windows produced by the recoder
    pub const fn windows(self) -> usize {
        self.terms() + 1
    }

    /// Digits summed by the multiplier
    pub const fn terms(self) -> usize {
        match self {
            BoothClass::C1 => BOOTH_X2 as usize + 1,
            BoothClass::C2 => BOOTH_X2X2 as usize + 1,
        }
    }

    /// Accumulator bit below which a lane product with segment weight
    /// `weight` is truncated.
    pub const fn lane_lsb(self, weight: i32) -> i32 {
        match self {
            BoothClass::C1 => {
                -(weight - 2 * BOOTH_X2 as i32) + P_D as i32 - P_N_D as i32 - MAX_POS as i32
            }
            BoothClass::C2 => {
                -(weight - 2 * BOOTH_X2X2 as i32) + Q_D as i32 - Q_N_D as i32 - MAX_POS as i32
            }
        }
    }
}

/// A fixed-size Booth recoding of one multiplier.
///
/// The array length is fixed by the class; entries past
/// [`BoothClass::windows`] stay zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialProducts<const N: usize> {
    class: BoothClass,
    digits: [BoothDigit; N],
}

pub type C1Products = PartialProducts<C1_CAPACITY>;
pub type C2Products = PartialProducts<C2_CAPACITY>;

impl<const N: usize> PartialProducts<N> {
    fn recode(class: BoothClass, multiplier: u64) -> Self {
        let mut digits = [BoothDigit::ZERO; N];
        digits[0] = pp(((multiplier & 0b11) << 1) as u8);
        for (i, digit) in digits.iter_mut().enumerate().take(class.windows()).skip(1) {
            let shift = 2 * (i as u32 - 1) + 1;
            let window = multiplier.checked_shr(shift).unwrap_or(0) & 0b111;
            *digit = pp(window as u8);
        }
        Self { class, digits }
    }

    pub fn class(&self) -> BoothClass {
        self.class
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn digit(&self, index: usize) -> BoothDigit {
        self.digits.get(index).copied().unwrap_or_default()
    }

    pub fn digits(&self) -> &[BoothDigit; N] {
        &self.digits
    }

    /// Digits consumed by [`booth_product`]
    pub fn active(&self) -> &[BoothDigit] {
        &self.digits[..self.class.terms().min(N)]
    }

    /// `Σ dᵢ·4ⁱ` over the active digits
    pub fn value(&self) -> i64 {
        self.active()
            .iter()
            .enumerate()
            .map(|(i, d)| d.value() << (2 * i))
            .sum()
    }
}

/// Recode a reduced argument (class C1).
pub fn booth_transform_c1(multiplier: u64) -> C1Products {
    PartialProducts::recode(BoothClass::C1, multiplier)
}

/// Recode a truncated square (class C2).
pub fn booth_transform_c2(multiplier: u64) -> C2Products {
    PartialProducts::recode(BoothClass::C2, multiplier)
}

/// Add partial product `index`, shifted left by `weight`, into `acc`.
pub fn booth_mul<const N: usize>(
    acc: i64,
    multiplicand: i64,
    products: &PartialProducts<N>,
    index: usize,
    weight: u32,
) -> i64 {
    let row = products.digit(index).select(multiplicand);
    acc.wrapping_add(row.wrapping_shl(weight))
}

/// Full product `multiplicand · multiplier` summed from the recoded rows.
pub fn booth_product<const N: usize>(multiplicand: i64, products: &PartialProducts<N>) -> i64 {
    (0..products.active().len()).fold(0, |acc, i| {
        booth_mul(acc, multiplicand, products, i, 2 * i as u32)
    })
}

/// Lane product aligned to the accumulator grid.
///
/// The rows are summed at full width and truncated once at the lane LSB
/// implied by the segment `weight`.
pub fn lane_product<const N: usize>(
    multiplicand: i64,
    products: &PartialProducts<N>,
    weight: i32,
) -> i64 {
    let lsb = products.class().lane_lsb(weight);
    let sum = booth_product(multiplicand, products);
    shift_right(cut_bit(sum, lsb), lsb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pp_table() {
        let values: Vec<i64> = (0..8).map(|w| pp(w).value()).collect();
        assert_eq!(values, vec![0, 1, 1, 2, -2, -1, -1, 0]);

        let negate: Vec<bool> = (0..8).map(|w| pp(w).is_negative()).collect();
        assert_eq!(negate, vec![false, false, false, false, true, true, true, true]);
    }

    #[test]
    fn test_pp_masks_window() {
        assert_eq!(pp(0b1011), pp(0b011));
    }

    #[test]
    fn test_negative_zero_row_is_zero() {
        let digit = pp(0b111);
        assert_eq!(digit.select(12345), 0);
        assert_eq!(digit.select(-7), 0);
    }

    #[test]
    fn test_class_sizes() {
        assert_eq!(booth_transform_c1(0).len(), 100);
        assert_eq!(booth_transform_c2(0).len(), 170);
        assert_eq!(BoothClass::C1.terms(), 11);
        assert_eq!(BoothClass::C2.terms(), 18);
        assert_eq!(BoothClass::C1.windows(), 12);
        assert_eq!(BoothClass::C2.windows(), 19);
    }

    #[test]
    fn test_recoding_value() {
        for x in [0u64, 1, 2, 3, 0x5_5555, 0xF_FFFF, 0x8_0001] {
            assert_eq!(booth_transform_c1(x).value(), x as i64, "x = {x:#x}");
        }
        let square = ((1u64 << 20) - 1).pow(2) >> 6;
        assert_eq!(booth_transform_c2(square).value(), square as i64);
    }

    #[test]
    fn test_unused_slots_stay_zero() {
        let products = booth_transform_c1(0xF_FFFF);
        assert!(products.digits()[12..].iter().all(|d| *d == BoothDigit::ZERO));
    }

    #[test]
    fn test_booth_product_matches_multiplication() {
        let products = booth_transform_c1(0xA_BCDE);
        assert_eq!(booth_product(-123_456, &products), -123_456 * 0xA_BCDE);
        assert_eq!(booth_product(2_000_001, &products), 2_000_001 * 0xA_BCDE);
    }

    #[test]
    fn test_booth_mul_single_row() {
        let products = booth_transform_c1(0b11);
        // 3 = -1 + 1·4
        assert_eq!(products.digit(0).value(), -1);
        assert_eq!(booth_mul(0, 10, &products, 0, 0), -10);
        assert_eq!(booth_mul(-10, 10, &products, 1, 2), 30);
    }

    #[test]
    fn test_lane_lsb() {
        assert_eq!(BoothClass::C1.lane_lsb(-5), 5);
        assert_eq!(BoothClass::C2.lane_lsb(-10), 18);
    }

    #[test]
    fn test_lane_product_floors() {
        let products = booth_transform_c1(3);
        // -7 · 3 = -21, truncated at bit 2 -> floor(-21 / 4) = -6
        assert_eq!(lane_product(-7, &products, -2), -6);
        assert_eq!(lane_product(7, &products, -2), 5);
    }
}
