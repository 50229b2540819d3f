use crate::error::SfuError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Function selected on the unit, with its hardware encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opcode {
    Exp2 = 1,
    Tanh = 2,
    Sigmoid = 4,
    Rcp = 8,
}

impl Opcode {
    pub const ALL: [Opcode; 4] = [Opcode::Exp2, Opcode::Rcp, Opcode::Tanh, Opcode::Sigmoid];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Exp2 => "exp2",
            Opcode::Tanh => "tanh",
            Opcode::Sigmoid => "sigmoid",
            Opcode::Rcp => "rcp",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = SfuError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Opcode::Exp2),
            2 => Ok(Opcode::Tanh),
            4 => Ok(Opcode::Sigmoid),
            8 => Ok(Opcode::Rcp),
            other => Err(SfuError::UnknownOpcode(other)),
        }
    }
}

impl FromStr for Opcode {
    type Err = SfuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SfuError::UnknownOpcodeName(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
