use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use sfu_core::float::{DecodedFloat, FloatClass, POS_ZERO};
use sfu_core::{evaluate, reference, ulp_error, ExceptionFlags, Opcode};

fn normal_bits() -> impl Strategy<Value = u32> {
    (any::<bool>(), 1u32..255, 0u32..(1 << 23)).prop_map(|(negative, exponent, mantissa)| {
        ((negative as u32) << 31) | (exponent << 23) | mantissa
    })
}

fn opcode() -> impl Strategy<Value = Opcode> {
    prop::sample::select(Opcode::ALL.to_vec())
}

fn expected(opcode: Opcode, input: u32) -> f64 {
    reference(opcode, f32::from_bits(input) as f64)
}

// Property 1: Reciprocal stays within 2 ULP over every normal operand
proptest! {
    #[test]
    fn prop_rcp_within_two_ulp(bits in normal_bits()) {
        let out = evaluate(bits, Opcode::Rcp, false);
        let error = ulp_error(out.data, expected(Opcode::Rcp, bits));
        prop_assert!(error <= 2.0, "rcp({:#010x}) = {:#010x}, {} ulp", bits, out.data, error);
    }
}

// Property 2: exp2 within 2 ULP for |x| >= 1, 3 ULP below where the fraction is truncated
proptest! {
    #[test]
    fn prop_exp2_ulp_bound(x in -140.0f32..127.0f32) {
        let bits = x.to_bits();
        let out = evaluate(bits, Opcode::Exp2, false);
        let error = ulp_error(out.data, expected(Opcode::Exp2, bits));
        let bound = if x.abs() >= 1.0 { 2.0 } else { 3.0 };
        prop_assert!(error <= bound, "exp2({}) = {:#010x}, {} ulp", x, out.data, error);
    }
}

// Property 3: tanh and sigmoid track the exact functions closely in absolute terms
proptest! {
    #[test]
    fn prop_tanh_absolute_error(x in -10.0f32..10.0f32) {
        let out = evaluate(x.to_bits(), Opcode::Tanh, false);
        let exact = expected(Opcode::Tanh, x.to_bits());
        assert_abs_diff_eq!(out.data_f32() as f64, exact, epsilon = 1e-5);
    }

    #[test]
    fn prop_sigmoid_absolute_error(x in -30.0f32..30.0f32) {
        let out = evaluate(x.to_bits(), Opcode::Sigmoid, false);
        let data = out.data_f32();
        prop_assert!((0.0..=1.0).contains(&data));
        assert_abs_diff_eq!(data as f64, expected(Opcode::Sigmoid, x.to_bits()), epsilon = 1e-5);
    }
}

// Property 4: NV exactly for NaN operands, DZ exactly for reciprocal of zero
proptest! {
    #[test]
    fn prop_flag_conditions(bits in any::<u32>(), op in opcode()) {
        let x = DecodedFloat::decode(bits);
        let out = evaluate(bits, op, false);
        prop_assert_eq!(out.exceptions.contains(ExceptionFlags::NV), x.class == FloatClass::Nan);
        prop_assert_eq!(
            out.exceptions.contains(ExceptionFlags::DZ),
            op == Opcode::Rcp && x.class == FloatClass::Zero
        );
        if x.class == FloatClass::Nan {
            prop_assert_eq!(out.err, POS_ZERO);
        }
    }
}

// Property 5: Evaluation is total and deterministic; the trace only appears on request
proptest! {
    #[test]
    fn prop_deterministic(bits in any::<u32>(), op in opcode()) {
        let first = evaluate(bits, op, true);
        let second = evaluate(bits, op, true);
        prop_assert_eq!(first, second);

        let quiet = evaluate(bits, op, false);
        prop_assert_eq!(quiet.data, first.data);
        prop_assert_eq!(quiet.exceptions, first.exceptions);
        prop_assert_eq!(quiet.booth_trace, 0);
    }
}

// Property 6: UF is raised exactly when the result is a nonzero denormal
proptest! {
    #[test]
    fn prop_underflow_follows_result(bits in any::<u32>(), op in opcode()) {
        let out = evaluate(bits, op, false);
        let result = DecodedFloat::decode(out.data);
        prop_assert_eq!(
            out.exceptions.contains(ExceptionFlags::UF),
            result.class == FloatClass::Denormal
        );
    }
}
