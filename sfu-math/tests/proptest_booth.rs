use proptest::prelude::*;
use sfu_math::{
    booth_product, booth_transform_c1, booth_transform_c2, cut_bit, lane_product, pp,
    square_cut_6_bit, BoothClass,
};

// Property 1: truncation is idempotent and never raises the value
proptest! {
    #[test]
    fn prop_cut_bit_idempotent(x in any::<i64>(), n in 0i32..64) {
        let once = cut_bit(x, n);
        prop_assert_eq!(cut_bit(once, n), once);
        prop_assert!(once <= x);
    }
}

// Property 2: truncation only touches the low n bits
proptest! {
    #[test]
    fn prop_cut_bit_keeps_high_bits(x in any::<i64>(), n in 1i32..63) {
        let once = cut_bit(x, n);
        prop_assert_eq!(once >> n, x >> n);
        prop_assert_eq!(once & ((1i64 << n) - 1), 0);
    }
}

// Property 3: PP is total and its digits stay in {-2..2}
proptest! {
    #[test]
    fn prop_pp_total(window in any::<u8>()) {
        let digit = pp(window);
        prop_assert!((-2..=2).contains(&digit.value()));
        prop_assert_eq!(digit, pp(window & 0b111));
    }
}

// Property 4: the recodings reproduce their multipliers
proptest! {
    #[test]
    fn prop_c1_recoding_exact(x in 0u64..(1 << 20)) {
        let products = booth_transform_c1(x);
        prop_assert_eq!(products.len(), BoothClass::C1.capacity());
        prop_assert_eq!(products.value(), x as i64);
    }

    #[test]
    fn prop_c2_recoding_exact(x in 0u64..(1 << 20)) {
        let square = square_cut_6_bit(x);
        let products = booth_transform_c2(square);
        prop_assert_eq!(products.len(), BoothClass::C2.capacity());
        prop_assert_eq!(products.value(), square as i64);
    }
}

// Property 5: summing the rows is exact multiplication
proptest! {
    #[test]
    fn prop_booth_product_exact(y in -(1i64 << 21)..(1i64 << 21), x in 0u64..(1 << 20)) {
        let products = booth_transform_c1(x);
        prop_assert_eq!(booth_product(y, &products), y * x as i64);
    }
}

// Property 6: a lane product is the floor of the exact product on its grid
proptest! {
    #[test]
    fn prop_lane_product_floor(
        y in -(1i64 << 21)..(1i64 << 21),
        x in 0u64..(1 << 20),
        weight in -13i32..-1,
    ) {
        let products = booth_transform_c1(x);
        let lsb = BoothClass::C1.lane_lsb(weight);
        let exact = y * x as i64;
        prop_assert_eq!(lane_product(y, &products, weight), exact.div_euclid(1i64 << lsb));
    }
}
