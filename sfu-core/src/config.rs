use crate::error::SfuError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IEEE-754 rounding direction applied by the result converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    NearestEven,
    TowardZero,
    TowardNegative,
    /// The direction the ASIC's final stage uses
    TowardPositive,
    NearestAway,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 5] = [
        RoundingMode::NearestEven,
        RoundingMode::TowardZero,
        RoundingMode::TowardNegative,
        RoundingMode::TowardPositive,
        RoundingMode::NearestAway,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RoundingMode::NearestEven => "nearest_even",
            RoundingMode::TowardZero => "toward_zero",
            RoundingMode::TowardNegative => "toward_negative",
            RoundingMode::TowardPositive => "toward_positive",
            RoundingMode::NearestAway => "nearest_away",
        }
    }
}

impl FromStr for RoundingMode {
    type Err = SfuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_ascii_lowercase().as_str() {
            "rne" | "nearest_even" => RoundingMode::NearestEven,
            "rtz" | "toward_zero" => RoundingMode::TowardZero,
            "rdn" | "toward_negative" => RoundingMode::TowardNegative,
            "rup" | "toward_positive" => RoundingMode::TowardPositive,
            "rmm" | "nearest_away" => RoundingMode::NearestAway,
            _ => return Err(SfuError::UnknownRoundingMode(s.to_string())),
        };
        Ok(mode)
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluation settings shared by every call on an [`Sfu`](crate::Sfu).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SfuConfig {
    /// Rounding applied to the final accumulator
    pub rounding: RoundingMode,
    /// Export the pre-rounding accumulator as `booth_trace`
    pub debug: bool,
}

impl SfuConfig {
    pub fn from_json(json: &str) -> Result<Self, SfuError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }
}
