//! Pari-mutuel pool ledger.
//!
//! Accumulates `Bet` records into per-product pools and, on a `Result`
//! record, runs a two-phase settlement: house commission is deducted from
//! each pool first, then dividends are computed against the reduced totals.
//! Pools are cleared after every settlement, returning the ledger to an
//! empty state for the next betting cycle.

use crate::error::LedgerError;
use crate::money::Money;
use crate::parser::Record;
use crate::rules::{ProductRules, WinningSelections};
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// A single accepted bet.
///
/// The selection is opaque text compared by exact equality; `"1,2"` and
/// `"2,1"` are distinct selections.
#[derive(Debug, Clone)]
pub struct Bet {
    /// Product code the bet was placed on
    pub product: String,

    /// Selection label, exactly as parsed
    pub selection: String,

    /// Stake amount
    pub stake: Decimal,
}

/// The pool of stakes for one product within a betting cycle.
#[derive(Debug, Clone)]
pub struct Pool {
    /// Display name resolved from the rule table, or the product code when
    /// no rule is configured
    pub display_name: String,

    /// Sum of all stakes in the pool; reduced in place when commission is
    /// deducted at settlement
    pub total_stake: Money,

    /// Every bet accepted since the last settlement, in arrival order
    pub bets: Vec<Bet>,
}

/// The placings carried by a `Result` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    pub first: String,
    pub second: String,
    pub third: String,
}

impl RaceResult {
    /// Extracts the placings from a parsed `Result` record.
    pub fn from_record(record: &Record) -> Result<Self, LedgerError> {
        Ok(RaceResult {
            first: required_field(record, "first")?.to_string(),
            second: required_field(record, "second")?.to_string(),
            third: required_field(record, "third")?.to_string(),
        })
    }

    /// The selections each payout policy settles on.
    fn winning_selections(&self, winners: WinningSelections) -> Vec<String> {
        match winners {
            WinningSelections::FirstPlace => vec![self.first.clone()],
            WinningSelections::AllPlacings => vec![
                self.first.clone(),
                self.second.clone(),
                self.third.clone(),
            ],
            WinningSelections::FirstTwoOrdered => {
                vec![format!("{},{}", self.first, self.second)]
            }
        }
    }
}

/// One computed dividend, ready for display.
#[derive(Debug, Clone)]
pub struct DividendEvent {
    /// Product code
    pub product: String,

    /// Display name from the product rule
    pub display_name: String,

    /// Winning selection the dividend applies to
    pub selection: String,

    /// Dividend per unit stake, or `None` when nobody backed the selection
    pub dividend: Option<Money>,
}

/// The outcome of settling one `Result` record.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Commission deducted per product, keyed by product code
    pub commissions: BTreeMap<String, Money>,

    /// Dividends in product-code order, one per (product, winning selection)
    pub events: Vec<DividendEvent>,
}

/// The pool ledger.
///
/// Routes parsed records by kind: bets accumulate, a result settles. Product
/// rules are injected at construction and never change for the ledger's
/// lifetime.
#[derive(Debug)]
pub struct PoolLedger {
    /// Active pools indexed by product code
    pools: HashMap<String, Pool>,

    /// Commission rates, dividend bases and payout policies per product
    rules: ProductRules,
}

impl PoolLedger {
    /// Record kind routed to [`PoolLedger::add_bet`].
    pub const BET_KIND: &'static str = "Bet";

    /// Record kind routed to [`PoolLedger::settle`].
    pub const RESULT_KIND: &'static str = "Result";

    /// Creates an empty ledger over the given product rules.
    pub fn new(rules: ProductRules) -> Self {
        PoolLedger {
            pools: HashMap::new(),
            rules,
        }
    }

    /// Routes a parsed record to the matching handler.
    ///
    /// Bets mutate a pool and return `Ok(None)`; a result runs a full
    /// settlement and returns `Ok(Some(settlement))`.
    pub fn process(&mut self, record: &Record) -> Result<Option<Settlement>, LedgerError> {
        match record.kind.as_str() {
            Self::BET_KIND => {
                self.add_bet(record)?;
                Ok(None)
            }
            Self::RESULT_KIND => {
                let result = RaceResult::from_record(record)?;
                self.settle(&result).map(Some)
            }
            other => Err(LedgerError::UnhandledKind {
                kind: other.to_string(),
            }),
        }
    }

    /// Accepts a bet into its product's pool, creating the pool lazily.
    ///
    /// The stake arrives as text and is coerced to a number here; schema
    /// validation upstream is responsible for its shape. A bet for a product
    /// with no configured rule is still accepted; the missing rule surfaces
    /// at settlement as [`LedgerError::MissingProductRule`].
    pub fn add_bet(&mut self, record: &Record) -> Result<(), LedgerError> {
        let product = required_field(record, "product")?;
        let selection = required_field(record, "selections")?;
        let stake_text = required_field(record, "stake")?;

        let stake =
            Decimal::from_str(stake_text).map_err(|source| LedgerError::InvalidStake {
                stake: stake_text.to_string(),
                source,
            })?;

        let display_name = self
            .rules
            .display_name(product)
            .unwrap_or(product)
            .to_string();

        let pool = self
            .pools
            .entry(product.to_string())
            .or_insert_with(|| Pool {
                display_name,
                total_stake: Money::ZERO,
                bets: Vec::new(),
            });

        pool.total_stake += Money::new(stake);
        pool.bets.push(Bet {
            product: product.to_string(),
            selection: selection.to_string(),
            stake,
        });

        debug!(
            "accepted {} bet on {} for {}, pool total now {}",
            product, selection, stake, pool.total_stake
        );
        Ok(())
    }

    /// Deducts house commission from a pool, in place.
    ///
    /// Commission is the rule's rate times the pool total, rounded to
    /// 2 decimal places; the pool total is reduced by exactly that amount.
    /// Must run before [`PoolLedger::dividends_for`] for the same pool so
    /// dividends divide the post-commission total.
    pub fn deduct_commission(&mut self, product: &str) -> Result<Money, LedgerError> {
        let rate = self
            .rules
            .get(product)
            .ok_or_else(|| LedgerError::MissingProductRule {
                product: product.to_string(),
            })?
            .commission;

        let pool = self
            .pools
            .get_mut(product)
            .ok_or_else(|| LedgerError::UnknownProduct {
                product: product.to_string(),
            })?;

        let commission = Money::new(rate * pool.total_stake.as_decimal());
        pool.total_stake -= commission;

        debug!(
            "deducted {} commission from {}, pool total now {}",
            commission, product, pool.total_stake
        );
        Ok(commission)
    }

    /// Computes the dividend for one selection of a product's pool.
    ///
    /// The basis is the rule's dividend-basis override applied to the pool
    /// total (already commission-reduced when called after
    /// [`PoolLedger::deduct_commission`]), or the pool total itself. The
    /// dividend is basis divided by the stakes on the selection, rounded to
    /// 2 decimal places. `Ok(None)` means nobody backed the selection and no
    /// dividend is payable, which is an outcome, not an error.
    pub fn dividends_for(
        &self,
        product: &str,
        selection: &str,
    ) -> Result<Option<Money>, LedgerError> {
        let pool = self
            .pools
            .get(product)
            .ok_or_else(|| LedgerError::UnknownProduct {
                product: product.to_string(),
            })?;

        let rule = self
            .rules
            .get(product)
            .ok_or_else(|| LedgerError::MissingProductRule {
                product: product.to_string(),
            })?;

        let stakes_on_selection: Decimal = pool
            .bets
            .iter()
            .filter(|bet| bet.selection == selection)
            .map(|bet| bet.stake)
            .sum();

        let total = pool.total_stake.as_decimal();
        let basis = match rule.dividend_basis {
            Some(basis) => basis(total),
            None => total,
        };

        // division by zero stakes is the no-winner outcome
        Ok(basis.checked_div(stakes_on_selection).map(Money::new))
    }

    /// Settles every active pool against a race result.
    ///
    /// Verifies that each pool has a configured rule before mutating
    /// anything, then per pool (in product-code order, for deterministic
    /// output): deducts commission, derives the winning selections from the
    /// rule's payout policy, and computes each dividend. Pools are cleared
    /// afterwards; the next bet starts a fresh cycle.
    pub fn settle(&mut self, result: &RaceResult) -> Result<Settlement, LedgerError> {
        let mut codes: Vec<String> = self.pools.keys().cloned().collect();
        codes.sort();

        // fail loud on configuration defects before any pool is touched
        for code in &codes {
            if self.rules.get(code).is_none() {
                return Err(LedgerError::MissingProductRule {
                    product: code.clone(),
                });
            }
        }

        let mut commissions = BTreeMap::new();
        let mut events = Vec::new();

        for code in &codes {
            let rule = self
                .rules
                .get(code)
                .expect("rule presence checked above")
                .clone();

            let commission = self.deduct_commission(code)?;
            commissions.insert(code.clone(), commission);

            for selection in result.winning_selections(rule.winners) {
                let dividend = self.dividends_for(code, &selection)?;
                events.push(DividendEvent {
                    product: code.clone(),
                    display_name: rule.name.clone(),
                    selection,
                    dividend,
                });
            }
        }

        self.clear_pools();
        Ok(Settlement {
            commissions,
            events,
        })
    }

    /// Discards every pool, returning the ledger to its empty state.
    pub fn clear_pools(&mut self) {
        self.pools.clear();
    }

    /// Returns the active pool for a product, if any.
    pub fn pool(&self, product: &str) -> Option<&Pool> {
        self.pools.get(product)
    }
}

fn required_field<'a>(record: &'a Record, field: &str) -> Result<&'a str, LedgerError> {
    record.get(field).ok_or_else(|| LedgerError::MissingField {
        field: field.to_string(),
    })
}
