use thiserror::Error;

#[derive(Error, Debug)]
pub enum SfuError {
    #[error("Unknown opcode code {0}")]
    UnknownOpcode(u8),
    #[error("Unknown opcode name '{0}'")]
    UnknownOpcodeName(String),
    #[error("Unknown rounding mode '{0}'")]
    UnknownRoundingMode(String),
    #[error("Cannot parse input pattern '{0}'")]
    ParseInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
