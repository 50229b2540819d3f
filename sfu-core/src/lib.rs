//! # sfu-core
//!
//! Bit-accurate golden model of a Special Function Unit computing EXP2,
//! RCP, SIGMOID and TANH on IEEE-754 single-precision operands.
//!
//! Pipeline, per call:
//! - [`DecodedFloat`] classifies the operand by exact bit inspection
//! - [`special`] resolves it against the opcode's special-case table
//! - [`reduce`] maps remaining operands onto a [`table`] segment and runs
//!   the Booth datapath from `sfu-math`
//! - a [`FloatOracle`] rounds the accumulator under the configured
//!   [`RoundingMode`], and [`ExceptionFlags`] records what happened
//! - [`reference`] compares the result against the exact function
//!
//! Entry points are [`evaluate`] and the [`Sfu`] engine. Coefficient tables
//! are process-wide and immutable; no other state outlives a call.

pub mod config;
pub mod error;
pub mod flags;
pub mod float;
pub mod opcode;
pub mod oracle;
pub mod reduce;
pub mod reference;
pub mod sfu;
pub mod special;
pub mod table;

pub use config::{RoundingMode, SfuConfig};
pub use error::SfuError;
pub use flags::ExceptionFlags;
pub use float::{DecodedFloat, FloatClass};
pub use opcode::Opcode;
pub use oracle::{FloatOracle, Rounded, SoftFloatOracle};
pub use reference::{reference, ulp_error};
pub use sfu::{evaluate, sfu_exp2, sfu_rcp, sfu_sigmoid, sfu_tanh, Sfu, SfuOutput};
pub use table::{tables, CoefficientTables, Segment, SegmentTable, TableFunction};

/// Parse an operand given as hex bits (`0x3f800000`) or as a decimal float.
pub fn parse_operand(text: &str) -> Result<u32, SfuError> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u32::from_str_radix(&hex.replace('_', ""), 16)
            .map_err(|_| SfuError::ParseInput(text.to_string()));
    }
    trimmed
        .parse::<f32>()
        .map(f32::to_bits)
        .map_err(|_| SfuError::ParseInput(text.to_string()))
}
