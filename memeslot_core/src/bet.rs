use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_BET: f64 = 0.1;
pub const DEFAULT_MAX_BET: f64 = 1.0;
pub const DEFAULT_BET_STEP: f64 = 0.1;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BetError {
    #[error("bet amount is not a number: {0:?}")]
    NotANumber(String),
    #[error("bet amount must be positive")]
    NotPositive,
    #[error("unsupported token: {0}")]
    UnsupportedToken(String),
    #[error("invalid bet limits: min {min} max {max}")]
    InvalidLimits { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BetLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl BetLimits {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, BetError> {
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(BetError::InvalidLimits { min, max });
        }
        Ok(Self { min, max, step })
    }

    pub fn clamp(&self, amount: f64) -> f64 {
        amount.clamp(self.min, self.max)
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_BET,
            max: DEFAULT_MAX_BET,
            step: DEFAULT_BET_STEP,
        }
    }
}

/// A wager in whole-token units, already clamped into the table limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct BetAmount(f64);

impl BetAmount {
    pub fn parse(input: &str, limits: &BetLimits) -> Result<Self, BetError> {
        let raw: f64 = input
            .trim()
            .parse()
            .map_err(|_| BetError::NotANumber(input.to_string()))?;
        Self::new(raw, limits)
    }

    pub fn new(raw: f64, limits: &BetLimits) -> Result<Self, BetError> {
        if !raw.is_finite() {
            return Err(BetError::NotANumber(raw.to_string()));
        }
        if raw <= 0.0 {
            return Err(BetError::NotPositive);
        }
        Ok(Self(limits.clamp(raw)))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for BetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Token {
    #[default]
    #[serde(rename = "SOL")]
    Sol,
}

impl Token {
    pub const ALL: [Token; 1] = [Token::Sol];

    pub fn symbol(self) -> &'static str {
        match self {
            Token::Sol => "SOL",
        }
    }

    pub fn decimals(self) -> u8 {
        match self {
            Token::Sol => 9,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Token {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BetError::UnsupportedToken(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_within_limits() {
        let limits = BetLimits::default();
        assert_eq!(BetAmount::parse("0.5", &limits).unwrap().value(), 0.5);
        assert_eq!(BetAmount::parse(" 0.1 ", &limits).unwrap().value(), 0.1);
    }

    #[test]
    fn parse_clamps_out_of_range() {
        let limits = BetLimits::default();
        assert_eq!(BetAmount::parse("0.01", &limits).unwrap().value(), 0.1);
        assert_eq!(BetAmount::parse("25", &limits).unwrap().value(), 1.0);
    }

    #[test]
    fn parse_rejects_garbage() {
        let limits = BetLimits::default();
        assert!(matches!(
            BetAmount::parse("lots", &limits),
            Err(BetError::NotANumber(_))
        ));
        assert!(matches!(
            BetAmount::parse("NaN", &limits),
            Err(BetError::NotANumber(_))
        ));
        assert_eq!(BetAmount::parse("0", &limits), Err(BetError::NotPositive));
        assert_eq!(BetAmount::parse("-1", &limits), Err(BetError::NotPositive));
    }

    #[test]
    fn limits_validate() {
        assert!(BetLimits::new(1.0, 0.5, 0.1).is_err());
        assert!(BetLimits::new(0.0, 1.0, 0.1).is_err());
        assert!(BetLimits::new(0.05, 2.0, 0.05).is_ok());
    }

    #[test]
    fn token_parsing() {
        assert_eq!("sol".parse::<Token>(), Ok(Token::Sol));
        assert_eq!(
            "BONK".parse::<Token>(),
            Err(BetError::UnsupportedToken("BONK".into()))
        );
        assert_eq!(serde_json::to_string(&Token::Sol).unwrap(), "\"SOL\"");
    }
}
