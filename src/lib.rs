//! # Tote Engine
//!
//! A line-oriented pari-mutuel wagering engine: a schema-driven record
//! parser feeding a pool ledger that accumulates stakes per product,
//! deducts house commission, and computes dividends per winning selection.
//!
//! ## Design Principles
//!
//! - **Declarative schemas**: record grammars are data, compiled once into
//!   anchored regex matchers; later fields may depend on earlier fields
//! - **Fixed-point arithmetic**: 2 decimal places via `rust_decimal`,
//!   no floats in financial math
//! - **Rejection is total**: a line either yields a complete record or
//!   nothing; malformed input is diagnosed and skipped, never fatal
//! - **Two-phase settlement**: commission is deducted before dividends are
//!   computed, structurally, not by caller convention
//!
//! ## Example
//!
//! ```
//! use tote_engine::{PoolLedger, ProductRules, RaceResult, Record, SchemaParser};
//! # use tote_engine::{FieldSpec, Schema, SchemaConfig};
//! # use std::collections::BTreeMap;
//!
//! # let config = SchemaConfig {
//! #     delimiter: ':',
//! #     records: BTreeMap::from([(
//! #         "Bet".to_string(),
//! #         vec![
//! #             FieldSpec::literal("product", "[WPE]{1}"),
//! #             FieldSpec::conditional(
//! #                 "selections",
//! #                 "product",
//! #                 &[("W", r"\d+"), ("P", r"\d+"), ("E", r"\d+,\d+")],
//! #             ),
//! #             FieldSpec::literal("stake", r"\d+"),
//! #         ],
//! #     )]),
//! # };
//! let parser = SchemaParser::new(Schema::compile(&config).unwrap());
//! let mut ledger = PoolLedger::new(ProductRules::standard_race());
//!
//! let record = parser.parse("Bet:W:2:50").unwrap();
//! ledger.process(&record).unwrap();
//!
//! let result = RaceResult {
//!     first: "2".to_string(),
//!     second: "3".to_string(),
//!     third: "1".to_string(),
//! };
//! let settlement = ledger.settle(&result).unwrap();
//! assert_eq!(settlement.commissions["W"].to_string(), "7.50");
//! ```

pub mod error;
pub mod ledger;
pub mod money;
pub mod parser;
pub mod rules;
pub mod schema;

pub use error::{EngineError, LedgerError, ParseError, Result, SchemaError};
pub use ledger::{Bet, DividendEvent, Pool, PoolLedger, RaceResult, Settlement};
pub use money::Money;
pub use parser::{Record, SchemaParser};
pub use rules::{DividendBasis, ProductRule, ProductRules, WinningSelections};
pub use schema::{FieldPattern, FieldSpec, Schema, SchemaConfig};
