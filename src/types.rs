// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Output grid format requested from the simulator.
///
/// The value is passed through to the executable as its integer code; the
/// orchestrator does not interpret it further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum OutputsType {
    /// `0`: both ASCII and binary grids.
    Both,
    /// `1`: ASCII grid.
    AsciiGrid,
    /// `2`: FlamMap binary grid.
    FlamMapBinary,
}

impl OutputsType {
    pub fn code(self) -> u8 {
        match self {
            OutputsType::Both => 0,
            OutputsType::AsciiGrid => 1,
            OutputsType::FlamMapBinary => 2,
        }
    }
}

impl Default for OutputsType {
    fn default() -> Self {
        OutputsType::AsciiGrid
    }
}

impl TryFrom<i64> for OutputsType {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(OutputsType::Both),
            1 => Ok(OutputsType::AsciiGrid),
            2 => Ok(OutputsType::FlamMapBinary),
            other => Err(format!(
                "invalid outputs_type: {other} (expected 0, 1 or 2)"
            )),
        }
    }
}

impl FromStr for OutputsType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid outputs_type: {s} (expected 0, 1 or 2)"))?;
        OutputsType::try_from(code)
    }
}

impl fmt::Display for OutputsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!("0".parse::<OutputsType>().unwrap(), OutputsType::Both);
        assert_eq!(" 1 ".parse::<OutputsType>().unwrap(), OutputsType::AsciiGrid);
        assert_eq!("2".parse::<OutputsType>().unwrap(), OutputsType::FlamMapBinary);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!("3".parse::<OutputsType>().is_err());
        assert!("ascii".parse::<OutputsType>().is_err());
        assert!(OutputsType::try_from(-1).is_err());
    }

    #[test]
    fn displays_as_integer_code() {
        assert_eq!(OutputsType::default().to_string(), "1");
    }
}
