use crate::float::is_denormal_bits;
use crate::oracle::Rounded;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The 5-bit exception status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExceptionFlags(u8);

impl ExceptionFlags {
    pub const NONE: Self = Self(0);
    /// Invalid operation
    pub const NV: Self = Self(16);
    /// Divide by zero
    pub const DZ: Self = Self(8);
    /// Overflow
    pub const OF: Self = Self(4);
    /// Underflow
    pub const UF: Self = Self(2);
    /// Inexact
    pub const NX: Self = Self(1);

    const ALL_BITS: u8 = 0b1_1111;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn set_if(&mut self, flag: Self, condition: bool) {
        if condition {
            self.0 |= flag.0;
        }
    }

    /// Flags raised by rounding the accumulator to `data`.
    ///
    /// UF follows the result: set whenever `data` is a nonzero denormal,
    /// exact or not.
    pub fn from_rounding(rounded: &Rounded, data: u32) -> Self {
        let mut flags = Self::NONE;
        flags.set_if(Self::OF, rounded.overflow);
        flags.set_if(Self::UF, is_denormal_bits(data));
        flags.set_if(Self::NX, rounded.inexact);
        flags
    }
}

impl BitOr for ExceptionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExceptionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ExceptionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names = [
            (Self::NV, "NV"),
            (Self::DZ, "DZ"),
            (Self::OF, "OF"),
            (Self::UF, "UF"),
            (Self::NX, "NX"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&set.join("|"))
    }
}
