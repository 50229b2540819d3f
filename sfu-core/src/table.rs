//! Piecewise-quadratic coefficient tables.
//!
//! Each [`SegmentTable`] covers one octave of a reduced argument. The top
//! `index_bits` of the mantissa select a segment; the remaining bits,
//! shifted left by the table's slide, form the 20-bit multiplier `x2`:
//!
//! ```text
//! acc = (c0 << 11) + lane_c1(c1, x2) + lane_c2(c2, square_cut_6_bit(x2))
//! ```
//!
//! `acc` carries [`MAX_POS`] fractional bits. Coefficients are derived from
//! the function once per process and never change afterwards.

use lazy_static::lazy_static;
use sfu_math::{
    booth_transform_c1, booth_transform_c2, lane_product, pow2, square_cut_6_bit, FixedFormat,
    DEC_FP32, MAX_POS, T_D, T_N_D,
};

/// Shift aligning c0 to the accumulator binary point
const C0_ALIGN: u32 = MAX_POS - T_D + T_N_D;
/// Width of the multiplier operand fed to the C1 recoder
const X2_BITS: u32 = 20;

pub const TANH_OCTAVES: std::ops::RangeInclusive<i32> = -10..=-2;
pub const SIGMOID_OCTAVES: std::ops::RangeInclusive<i32> = 0..=3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFunction {
    /// `2^t` for `t` in `[0, 1)`
    Exp2,
    /// `1/m` for `m` in `[1, 2)`
    Reciprocal,
    Tanh,
    Sigmoid,
}

impl TableFunction {
    pub fn eval(self, x: f64) -> f64 {
        match self {
            TableFunction::Exp2 => libm::exp2(x),
            TableFunction::Reciprocal => 1.0 / x,
            TableFunction::Tanh => libm::tanh(x),
            TableFunction::Sigmoid => 1.0 / (1.0 + libm::exp(-x)),
        }
    }

    /// Argument at the start of the table covering `octave`
    fn origin(self, octave: i32) -> f64 {
        match self {
            TableFunction::Exp2 => 0.0,
            _ => pow2(octave),
        }
    }
}

/// One segment's coefficients as raw fixed-point fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segment {
    /// Constant term, [`FixedFormat::C0`]
    pub c0: i64,
    /// Linear term, [`FixedFormat::C1`]
    pub c1: i64,
    /// Quadratic term, [`FixedFormat::C2`]
    pub c2: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTable {
    function: TableFunction,
    octave: i32,
    index_bits: u32,
    segments: Vec<Segment>,
}

impl SegmentTable {
    pub fn build(function: TableFunction, octave: i32, index_bits: u32) -> Self {
        let mut table = Self {
            function,
            octave,
            index_bits,
            segments: Vec::with_capacity(1 << index_bits),
        };
        let width = table.width();
        for index in 0..(1usize << index_bits) {
            let segment = fit_segment(function, table.base(index), width);
            table.segments.push(segment);
        }
        log::debug!(
            "built {:?} table for octave {}: {} segments",
            function,
            octave,
            table.segments.len()
        );
        table
    }

    pub fn function(&self) -> TableFunction {
        self.function
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Left shift applied to the mantissa remainder to fill 20 bits
    pub fn slide(&self) -> u32 {
        self.index_bits + X2_BITS - DEC_FP32
    }

    /// Lane weight of the linear term
    pub fn c1_weight(&self) -> i32 {
        self.octave - self.slide() as i32 - 3
    }

    /// Lane weight of the quadratic term
    pub fn c2_weight(&self) -> i32 {
        2 * self.c1_weight()
    }

    /// Argument covered by one segment
    pub fn width(&self) -> f64 {
        pow2(self.octave - self.index_bits as i32)
    }

    /// Argument at the start of segment `index`
    pub fn base(&self, index: usize) -> f64 {
        self.function.origin(self.octave) + index as f64 * self.width()
    }

    /// Segment index and multiplier for a 23-bit mantissa
    pub fn split(&self, mantissa: u32) -> (usize, u64) {
        let mantissa = mantissa & ((1 << DEC_FP32) - 1);
        let rest_bits = DEC_FP32 - self.index_bits;
        let index = (mantissa >> rest_bits) as usize;
        let rest = (mantissa & ((1 << rest_bits) - 1)) as u64;
        (index, rest << self.slide())
    }

    /// Accumulator value for a mantissa, through the Booth datapath.
    pub fn evaluate(&self, mantissa: u32) -> i64 {
        let (index, x2) = self.split(mantissa);
        let segment = self.segments[index];
        let constant = segment.c0 << C0_ALIGN;
        let linear = lane_product(segment.c1, &booth_transform_c1(x2), self.c1_weight());
        let square = square_cut_6_bit(x2);
        let quadratic = lane_product(segment.c2, &booth_transform_c2(square), self.c2_weight());
        constant + linear + quadratic
    }
}

/// Quadratic through three points, as monomial coefficients in `dx`.
fn quadratic_through(nodes: [f64; 3], values: [f64; 3]) -> [f64; 3] {
    let [a, b, c] = nodes;
    let [fa, fb, fc] = values;
    let f_ab = (fb - fa) / (b - a);
    let f_bc = (fc - fb) / (c - b);
    let f_abc = (f_bc - f_ab) / (c - a);
    [
        fa - f_ab * a + f_abc * a * b,
        f_ab - f_abc * (a + b),
        f_abc,
    ]
}

fn fit_segment(function: TableFunction, base: f64, width: f64) -> Segment {
    let f = |dx: f64| function.eval(base + dx);
    let half_sqrt3 = libm::sqrt(3.0) / 2.0;
    let v0 = f(0.0);

    // A representable base value is kept exactly
    if let Ok(c0) = FixedFormat::C0.try_from_f64(v0) {
        if FixedFormat::C0.to_f64(c0) == v0 {
            let stretch = width / (1.0 + half_sqrt3);
            let nodes = [0.0, half_sqrt3 * stretch, 2.0 * half_sqrt3 * stretch];
            let [_, p1, p2] = quadratic_through(nodes, [v0, f(nodes[1]), f(nodes[2])]);

            let c2 = FixedFormat::C2.from_f64_saturating(p2);
            // Through the origin dx² is closest to 2(√2 - 1)·h·dx
            let slope = 2.0 * (libm::sqrt(2.0) - 1.0) * width;
            let p1 = p1 - (FixedFormat::C2.to_f64(c2) - p2) * slope;
            let c1 = FixedFormat::C1.from_f64_saturating(p1);
            return Segment { c0, c1, c2 };
        }
    }

    let nodes = [
        0.5 * width * (1.0 - half_sqrt3),
        0.5 * width,
        0.5 * width * (1.0 + half_sqrt3),
    ];
    let [p0, p1, p2] = quadratic_through(nodes, nodes.map(f));

    // dx² ≈ h·dx - h²/8 on [0, h]
    let c2 = FixedFormat::C2.from_f64_saturating(p2);
    let d2 = FixedFormat::C2.to_f64(c2) - p2;
    let p1 = p1 - d2 * width;
    let p0 = p0 + d2 * width * width / 8.0;

    // dx ≈ h/2 on [0, h]
    let c1 = FixedFormat::C1.from_f64_saturating(p1);
    let d1 = FixedFormat::C1.to_f64(c1) - p1;
    let p0 = p0 - d1 * width / 2.0;

    Segment {
        c0: FixedFormat::C0.from_f64_saturating(p0),
        c1,
        c2,
    }
}

/// Every table the datapath reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTables {
    pub exp2: SegmentTable,
    pub rcp: SegmentTable,
    tanh: Vec<SegmentTable>,
    sigmoid: Vec<SegmentTable>,
}

impl CoefficientTables {
    pub fn build() -> Self {
        let tables = Self {
            exp2: SegmentTable::build(TableFunction::Exp2, 0, 5),
            rcp: SegmentTable::build(TableFunction::Reciprocal, 0, 7),
            tanh: TANH_OCTAVES
                .map(|octave| SegmentTable::build(TableFunction::Tanh, octave, 3))
                .collect(),
            sigmoid: SIGMOID_OCTAVES
                .map(|octave| {
                    SegmentTable::build(TableFunction::Sigmoid, octave, sigmoid_index_bits(octave))
                })
                .collect(),
        };
        log::debug!(
            "coefficient tables ready: {} segments",
            tables.iter().map(|t| t.segments().len()).sum::<usize>()
        );
        tables
    }

    /// Table for `|x|` in `[2^octave, 2^(octave+1))`
    pub fn tanh(&self, octave: i32) -> Option<&SegmentTable> {
        let offset = octave.checked_sub(*TANH_OCTAVES.start())?;
        self.tanh.get(usize::try_from(offset).ok()?)
    }

    /// Table for `|x|` in `[2^octave, 2^(octave+1))`
    pub fn sigmoid(&self, octave: i32) -> Option<&SegmentTable> {
        let offset = octave.checked_sub(*SIGMOID_OCTAVES.start())?;
        self.sigmoid.get(usize::try_from(offset).ok()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentTable> {
        [&self.exp2, &self.rcp]
            .into_iter()
            .chain(self.tanh.iter())
            .chain(self.sigmoid.iter())
    }
}

fn sigmoid_index_bits(octave: i32) -> u32 {
    match octave {
        0 => 3,
        1 | 2 => 4,
        _ => 5,
    }
}

lazy_static! {
    static ref TABLES: CoefficientTables = CoefficientTables::build();
}

/// The process-wide tables, built on first use.
pub fn tables() -> &'static CoefficientTables {
    &TABLES
}
