//! Product rule configuration.
//!
//! Each wagering product carries a display name, a house commission rate,
//! an optional dividend-basis override, and a policy describing which
//! selections win once a race result is known. The per-product event
//! listeners of older designs become a typed registry injected into the
//! ledger at construction.

use rust_decimal::Decimal;
use std::collections::HashMap;

/// Maps a pool's post-commission total stake to the dividend numerator.
///
/// Absent, the basis is the pool total itself. Place pools conventionally
/// divide the total across the number of paid placings.
pub type DividendBasis = fn(Decimal) -> Decimal;

/// Which selections of a race result a product pays out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinningSelections {
    /// Only the first placegetter (Win)
    FirstPlace,

    /// First, second and third, each paid separately (Place)
    AllPlacings,

    /// The ordered pair "first,second" as a single selection (Exacta)
    FirstTwoOrdered,
}

/// Configuration for one wagering product.
#[derive(Debug, Clone)]
pub struct ProductRule {
    /// Human-readable product name used in settlement output
    pub name: String,

    /// House commission rate in `[0, 1]`, applied to the pool total
    pub commission: Decimal,

    /// Optional dividend-basis override; `None` means the pool total
    pub dividend_basis: Option<DividendBasis>,

    /// Which selections win for this product
    pub winners: WinningSelections,
}

/// Registry of product rules keyed by product code.
///
/// Codes are matched exactly and case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct ProductRules {
    rules: HashMap<String, ProductRule>,
}

impl ProductRules {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under a product code, replacing any existing one.
    pub fn insert(&mut self, code: &str, rule: ProductRule) {
        self.rules.insert(code.to_string(), rule);
    }

    /// Looks up the rule for a product code.
    pub fn get(&self, code: &str) -> Option<&ProductRule> {
        self.rules.get(code)
    }

    /// Returns the display name for a product code, if configured.
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.rules.get(code).map(|rule| rule.name.as_str())
    }

    /// The standard race card: Win, Place and Exacta.
    ///
    /// Win pays the first placegetter at 15% commission; Place pays all
    /// three placings at 12% with the pool split three ways; Exacta pays
    /// the ordered first-second pair at 18%.
    pub fn standard_race() -> Self {
        let mut rules = ProductRules::new();
        rules.insert(
            "W",
            ProductRule {
                name: "Win".to_string(),
                commission: Decimal::new(15, 2),
                dividend_basis: None,
                winners: WinningSelections::FirstPlace,
            },
        );
        rules.insert(
            "P",
            ProductRule {
                name: "Place".to_string(),
                commission: Decimal::new(12, 2),
                dividend_basis: Some(|total| total / Decimal::from(3)),
                winners: WinningSelections::AllPlacings,
            },
        );
        rules.insert(
            "E",
            ProductRule {
                name: "Exacta".to_string(),
                commission: Decimal::new(18, 2),
                dividend_basis: None,
                winners: WinningSelections::FirstTwoOrdered,
            },
        );
        rules
    }
}
