//! Strong types for the provider's request parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sampling interval for a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// The provider's query-parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            other => Err(format!("unknown interval: {}", other)),
        }
    }
}

/// Lookback window for a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lookback {
    OneDay,
    FiveDays,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    FiveYears,
    Max,
}

impl Lookback {
    /// The provider's `range` query-parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lookback::OneDay => "1d",
            Lookback::FiveDays => "5d",
            Lookback::OneMonth => "1mo",
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
            Lookback::FiveYears => "5y",
            Lookback::Max => "max",
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Lookback::OneDay),
            "5d" => Ok(Lookback::FiveDays),
            "1mo" => Ok(Lookback::OneMonth),
            "3mo" => Ok(Lookback::ThreeMonths),
            "6mo" => Ok(Lookback::SixMonths),
            "1y" => Ok(Lookback::OneYear),
            "5y" => Ok(Lookback::FiveYears),
            "max" => Ok(Lookback::Max),
            other => Err(format!("unknown lookback range: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_round_trip() {
        for interval in [Interval::Daily, Interval::Weekly, Interval::Monthly] {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), interval);
        }
        assert!("2h".parse::<Interval>().is_err());
    }

    #[test]
    fn test_lookback_round_trip() {
        for lookback in [
            Lookback::OneDay,
            Lookback::FiveDays,
            Lookback::OneMonth,
            Lookback::ThreeMonths,
            Lookback::SixMonths,
            Lookback::OneYear,
            Lookback::FiveYears,
            Lookback::Max,
        ] {
            assert_eq!(lookback.as_str().parse::<Lookback>().unwrap(), lookback);
        }
        assert!("2wk".parse::<Lookback>().is_err());
    }
}
