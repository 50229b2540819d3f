//! Per-opcode special-case tables.
//!
//! Every operand is first looked up here. Zeros, infinities and NaN are
//! resolved by class; finite operands by the first interval containing
//! them. Only operands that land on a [`Outcome::Compute`] entry reach the
//! Booth datapath.

use crate::flags::ExceptionFlags;
use crate::float::{
    DecodedFloat, FloatClass, CANONICAL_NAN, HALF, NEG_INF, NEG_MAX, NEG_ONE, NEG_ZERO, ONE,
    POS_INF, POS_ZERO,
};
use crate::opcode::Opcode;

const TWO_POW_M9: f64 = 1.0 / 512.0;
const TWO_POW_M10: f64 = 1.0 / 1024.0;
const TWO_POW_M23: f64 = 1.0 / 8_388_608.0;
const TWO_POW_M126: f64 = f32::MIN_POSITIVE as f64;
const TWO_POW_M128: f64 = TWO_POW_M126 / 4.0;

/// Datapath variant selected for an operand range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Exp2,
    Rcp,
    /// Reciprocal of a denormal, computed on `4·x`
    RcpPrescaled,
    Tanh,
    /// `tanh(x) = 2·sigmoid(2|x|) - 1`
    TanhViaSigmoid,
    Sigmoid,
    /// `sigmoid(x) = (1 ± tanh(|x|/2)) / 2`
    SigmoidViaTanh,
    /// `sigmoid(x) ≈ 2^(23x/16)` far below zero
    SigmoidTail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Constant { bits: u32, flags: ExceptionFlags },
    /// The operand itself is the result
    PassThrough,
    /// `x/4 + 1/2` assembled from the operand's bits
    SigmoidLinear,
    /// Exact `2^-e` for an operand with significand 1.0
    ReciprocalPowerOfTwo,
    Compute(Route),
}

impl Outcome {
    const fn constant(bits: u32) -> Self {
        Outcome::Constant {
            bits,
            flags: ExceptionFlags::NONE,
        }
    }

    const fn flagged(bits: u32, flags: ExceptionFlags) -> Self {
        Outcome::Constant { bits, flags }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Unbounded,
    Open(f64),
    Closed(f64),
}

/// An interval of operand values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub low: Bound,
    pub high: Bound,
}

impl Interval {
    pub fn contains(&self, x: f64) -> bool {
        let above = match self.low {
            Bound::Unbounded => true,
            Bound::Open(low) => x > low,
            Bound::Closed(low) => x >= low,
        };
        let below = match self.high {
            Bound::Unbounded => true,
            Bound::Open(high) => x < high,
            Bound::Closed(high) => x <= high,
        };
        above && below
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRule {
    pub interval: Interval,
    pub outcome: Outcome,
}

const fn rule(low: Bound, high: Bound, outcome: Outcome) -> RangeRule {
    RangeRule {
        interval: Interval { low, high },
        outcome,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialCaseTable {
    pub pos_zero: Outcome,
    pub neg_zero: Outcome,
    pub pos_inf: Outcome,
    pub neg_inf: Outcome,
    /// Applies to normal operands whose stored mantissa is zero
    pub unit_significand: Option<Outcome>,
    /// Finite nonzero operands, denormals included
    pub ranges: &'static [RangeRule],
}

use Bound::{Closed, Open, Unbounded};

const NAN_OUTCOME: Outcome = Outcome::flagged(CANONICAL_NAN, ExceptionFlags::NV);

pub static EXP2_TABLE: SpecialCaseTable = SpecialCaseTable {
    pos_zero: Outcome::constant(ONE),
    neg_zero: Outcome::constant(ONE),
    pos_inf: Outcome::constant(POS_INF),
    neg_inf: Outcome::constant(POS_ZERO),
    unit_significand: None,
    ranges: &[
        rule(Unbounded, Open(-149.0), Outcome::constant(POS_ZERO)),
        rule(Closed(-149.0), Closed(-TWO_POW_M23), Outcome::Compute(Route::Exp2)),
        rule(Open(-TWO_POW_M23), Open(TWO_POW_M23), Outcome::constant(ONE)),
        rule(Closed(TWO_POW_M23), Open(128.0), Outcome::Compute(Route::Exp2)),
        rule(Closed(128.0), Unbounded, Outcome::flagged(POS_INF, ExceptionFlags::OF)),
    ],
};

pub static RCP_TABLE: SpecialCaseTable = SpecialCaseTable {
    pos_zero: Outcome::flagged(POS_INF, ExceptionFlags::DZ),
    neg_zero: Outcome::flagged(NEG_INF, ExceptionFlags::DZ),
    pos_inf: Outcome::constant(POS_ZERO),
    neg_inf: Outcome::constant(NEG_ZERO),
    unit_significand: Some(Outcome::ReciprocalPowerOfTwo),
    ranges: &[
        rule(Unbounded, Closed(-TWO_POW_M126), Outcome::Compute(Route::Rcp)),
        rule(Open(-TWO_POW_M126), Open(-TWO_POW_M128), Outcome::Compute(Route::RcpPrescaled)),
        rule(Closed(-TWO_POW_M128), Open(0.0), Outcome::flagged(NEG_MAX, ExceptionFlags::OF)),
        rule(Open(0.0), Closed(TWO_POW_M128), Outcome::flagged(POS_INF, ExceptionFlags::OF)),
        rule(Open(TWO_POW_M128), Open(TWO_POW_M126), Outcome::Compute(Route::RcpPrescaled)),
        rule(Closed(TWO_POW_M126), Unbounded, Outcome::Compute(Route::Rcp)),
    ],
};

pub static TANH_TABLE: SpecialCaseTable = SpecialCaseTable {
    pos_zero: Outcome::PassThrough,
    neg_zero: Outcome::PassThrough,
    pos_inf: Outcome::constant(ONE),
    neg_inf: Outcome::constant(NEG_ONE),
    unit_significand: None,
    ranges: &[
        rule(Unbounded, Closed(-8.0), Outcome::constant(NEG_ONE)),
        rule(Open(-8.0), Closed(-0.5), Outcome::Compute(Route::TanhViaSigmoid)),
        rule(Open(-0.5), Closed(-TWO_POW_M10), Outcome::Compute(Route::Tanh)),
        rule(Open(-TWO_POW_M10), Open(TWO_POW_M10), Outcome::PassThrough),
        rule(Closed(TWO_POW_M10), Open(0.5), Outcome::Compute(Route::Tanh)),
        rule(Closed(0.5), Open(8.0), Outcome::Compute(Route::TanhViaSigmoid)),
        rule(Closed(8.0), Unbounded, Outcome::constant(ONE)),
    ],
};

pub static SIGMOID_TABLE: SpecialCaseTable = SpecialCaseTable {
    pos_zero: Outcome::constant(HALF),
    neg_zero: Outcome::constant(HALF),
    pos_inf: Outcome::constant(ONE),
    neg_inf: Outcome::constant(POS_ZERO),
    unit_significand: None,
    ranges: &[
        rule(Unbounded, Closed(-16.0), Outcome::Compute(Route::SigmoidTail)),
        rule(Open(-16.0), Closed(-1.0), Outcome::Compute(Route::Sigmoid)),
        rule(Open(-1.0), Closed(-TWO_POW_M9), Outcome::Compute(Route::SigmoidViaTanh)),
        rule(Open(-TWO_POW_M9), Open(TWO_POW_M9), Outcome::SigmoidLinear),
        rule(Closed(TWO_POW_M9), Open(1.0), Outcome::Compute(Route::SigmoidViaTanh)),
        rule(Closed(1.0), Open(16.0), Outcome::Compute(Route::Sigmoid)),
        rule(Closed(16.0), Unbounded, Outcome::constant(ONE)),
    ],
};

pub fn table_for(opcode: Opcode) -> &'static SpecialCaseTable {
    match opcode {
        Opcode::Exp2 => &EXP2_TABLE,
        Opcode::Rcp => &RCP_TABLE,
        Opcode::Tanh => &TANH_TABLE,
        Opcode::Sigmoid => &SIGMOID_TABLE,
    }
}

/// Resolve an operand against its opcode's table.
pub fn classify(opcode: Opcode, x: &DecodedFloat) -> Outcome {
    let table = table_for(opcode);
    match x.class {
        FloatClass::Nan => NAN_OUTCOME,
        FloatClass::Zero if x.negative => table.neg_zero,
        FloatClass::Zero => table.pos_zero,
        FloatClass::Infinity if x.negative => table.neg_inf,
        FloatClass::Infinity => table.pos_inf,
        FloatClass::Normal | FloatClass::Denormal => {
            if x.class == FloatClass::Normal && x.mantissa == 0 {
                if let Some(outcome) = table.unit_significand {
                    return outcome;
                }
            }
            let value = x.to_f64();
            table
                .ranges
                .iter()
                .find(|rule| rule.interval.contains(value))
                .map(|rule| rule.outcome)
                .unwrap_or(NAN_OUTCOME)
        }
    }
}
