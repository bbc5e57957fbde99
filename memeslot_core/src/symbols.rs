use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Doge,
    Shib,
    Pepe,
    Moon,
    Rocket,
    Diamond,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Doge,
        Symbol::Shib,
        Symbol::Pepe,
        Symbol::Moon,
        Symbol::Rocket,
        Symbol::Diamond,
    ];

    pub fn from_index(i: u8) -> Self {
        Self::ALL[(i % Self::ALL.len() as u8) as usize]
    }

    pub fn to_index(self) -> u8 {
        match self {
            Symbol::Doge => 0,
            Symbol::Shib => 1,
            Symbol::Pepe => 2,
            Symbol::Moon => 3,
            Symbol::Rocket => 4,
            Symbol::Diamond => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Doge => "doge",
            Symbol::Shib => "shib",
            Symbol::Pepe => "pepe",
            Symbol::Moon => "moon",
            Symbol::Rocket => "rocket",
            Symbol::Diamond => "diamond",
        }
    }

    /// Glyph shown on the reel face.
    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Doge => "🐕",
            Symbol::Shib => "🐶",
            Symbol::Pepe => "🐸",
            Symbol::Moon => "🌙",
            Symbol::Rocket => "🚀",
            Symbol::Diamond => "💎",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown symbol: {0}")]
pub struct UnknownSymbol(pub String);

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sym| sym.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSymbol(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReelsConfig {
    pub reels: Vec<Vec<Symbol>>, // each reel strip
    pub rows: usize,             // visible rows
}

impl ReelsConfig {
    /// Three reels, one payline. Every strip carries each symbol once, so the
    /// landing symbol is uniform over the set.
    pub fn default_3x1() -> Self {
        let reel = Symbol::ALL.to_vec();
        Self {
            reels: vec![reel.clone(), reel.clone(), reel],
            rows: 1,
        }
    }

    pub fn cols(&self) -> usize {
        self.reels.len()
    }
}

impl Default for ReelsConfig {
    fn default() -> Self {
        Self::default_3x1()
    }
}

/// What the board shows before the first spin.
pub const INITIAL_REELS: [Symbol; 3] = [Symbol::Doge, Symbol::Shib, Symbol::Pepe];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip_wraps() {
        for sym in Symbol::ALL {
            assert_eq!(Symbol::from_index(sym.to_index()), sym);
        }
        assert_eq!(Symbol::from_index(6), Symbol::Doge);
        assert_eq!(Symbol::from_index(11), Symbol::Diamond);
    }

    #[test]
    fn parse_names() {
        assert_eq!("PEPE".parse::<Symbol>(), Ok(Symbol::Pepe));
        assert_eq!(" rocket ".parse::<Symbol>(), Ok(Symbol::Rocket));
        assert!("bonk".parse::<Symbol>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Symbol::Diamond).unwrap();
        assert_eq!(json, "\"diamond\"");
    }
}
