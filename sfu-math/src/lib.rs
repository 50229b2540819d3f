//! # sfu-math
//!
//! Bit-exact fixed-point building blocks for the SFU golden model.
//!
//! - [`fixed_point`]: hardware field widths, [`FixedFormat`] quantisation,
//!   [`cut_bit`] truncation and the guard-bit square [`square_cut_6_bit`].
//! - [`booth`]: radix-4 Booth recoding ([`pp`], [`booth_transform_c1`],
//!   [`booth_transform_c2`]) and partial-product accumulation ([`booth_mul`]).
//!
//! Every routine here is pure integer arithmetic; recodings are returned by
//! value so concurrent evaluations never share scratch storage.

pub mod booth;
pub mod fixed_point;

pub use booth::{
    booth_mul, booth_product, booth_transform_c1, booth_transform_c2, lane_product, pp,
    BoothClass, BoothDigit, C1Products, C2Products, PartialProducts, C1_CAPACITY, C2_CAPACITY,
};
pub use fixed_point::{
    cut_bit, pow2, shift_right, square_cut_6_bit, FixedFormat, FixedPointError, BOOTH_X2,
    BOOTH_X2X2, DEC_FP32, MAX_POS, P_D, P_N_D, Q_D, Q_N_D, T_D, T_N_D, X2_2,
};
