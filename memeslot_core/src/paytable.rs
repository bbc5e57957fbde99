use crate::symbols::Symbol;
use serde::{Deserialize, Serialize};

/// Win multiplier applied to any three of a kind.
pub const THREE_OF_A_KIND_MULTIPLIER: f64 = 3.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaytableEntry {
    pub symbol: u8, // Symbol index
    pub count: u8,
    pub payout_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paytable(pub Vec<PaytableEntry>);

impl Paytable {
    /// Every symbol pays the same for three identical on the line.
    pub fn three_of_a_kind() -> Self {
        Self(
            Symbol::ALL
                .iter()
                .map(|sym| PaytableEntry {
                    symbol: sym.to_index(),
                    count: 3,
                    payout_multiplier: THREE_OF_A_KIND_MULTIPLIER,
                })
                .collect(),
        )
    }

    pub fn multiplier(&self, symbol: Symbol, count: usize) -> Option<f64> {
        self.0
            .iter()
            .find(|e| e.symbol == symbol.to_index() && usize::from(e.count) == count)
            .map(|e| e.payout_multiplier)
    }

    pub fn max_multiplier(&self) -> f64 {
        self.0
            .iter()
            .map(|e| e.payout_multiplier)
            .fold(0.0, f64::max)
    }
}

impl Default for Paytable {
    fn default() -> Self {
        Self::three_of_a_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pays_triple_for_every_symbol() {
        let table = Paytable::default();
        for sym in Symbol::ALL {
            assert_eq!(table.multiplier(sym, 3), Some(3.0));
            assert_eq!(table.multiplier(sym, 2), None);
        }
        assert_eq!(table.max_multiplier(), 3.0);
    }
}
