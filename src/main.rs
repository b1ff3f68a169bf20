//! Tote Engine CLI
//!
//! Reads delimited betting lines from stdin, one record per line, and
//! prints dividends whenever a race result arrives.
//!
//! # Usage
//!
//! ```bash
//! tote-engine <<'EOF'
//! Bet:W:2:50
//! Result:2:3:1
//! x
//! EOF
//! ```
//!
//! A line consisting solely of `x` terminates input. Malformed lines are
//! diagnosed and skipped.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use log::{debug, warn};
use std::io::{self, BufRead};
use std::process;
use tote_engine::{
    FieldSpec, LedgerError, PoolLedger, ProductRules, Result, Schema, SchemaConfig, SchemaParser,
    Settlement,
};

/// Input token that terminates the read loop.
const EXIT_SENTINEL: &str = "x";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let parser = SchemaParser::new(Schema::compile(&race_schema())?);
    let mut ledger = PoolLedger::new(ProductRules::standard_race());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == EXIT_SENTINEL {
            break;
        }

        // rejected lines have already been diagnosed at warn level
        let Some(record) = parser.parse(&line) else {
            continue;
        };

        match ledger.process(&record) {
            Ok(Some(settlement)) => display(&settlement),
            Ok(None) => {}
            // input-shaped defects reject the line; configuration defects
            // (missing rule, unhandled kind) remain fatal
            Err(err @ (LedgerError::InvalidStake { .. } | LedgerError::MissingField { .. })) => {
                warn!("rejected record {:?}: {}", line.trim(), err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Prints one line per computed dividend:
/// `<DisplayName>:<selection>:<"$"+dividend | "NONE">`.
fn display(settlement: &Settlement) {
    for (product, commission) in &settlement.commissions {
        debug!("commission for {}: {}", product, commission);
    }

    for event in &settlement.events {
        let payout = match event.dividend {
            Some(dividend) => format!("${}", dividend),
            None => "NONE".to_string(),
        };
        println!("{}:{}:{}", event.display_name, event.selection, payout);
    }
}

/// The configured line grammar: `Bet` and `Result` records, `:`-delimited.
///
/// The selections pattern depends on the product: a bare runner number for
/// Win and Place, an ordered comma pair for Exacta.
fn race_schema() -> SchemaConfig {
    SchemaConfig {
        delimiter: ':',
        records: [
            (
                "Bet".to_string(),
                vec![
                    FieldSpec::literal("product", "[WPE]{1}"),
                    FieldSpec::conditional(
                        "selections",
                        "product",
                        &[("W", r"\d+"), ("P", r"\d+"), ("E", r"\d+,\d+")],
                    ),
                    FieldSpec::literal("stake", r"\d+"),
                ],
            ),
            (
                "Result".to_string(),
                vec![
                    FieldSpec::literal("first", r"\d+"),
                    FieldSpec::literal("second", r"\d+"),
                    FieldSpec::literal("third", r"\d+"),
                ],
            ),
        ]
        .into_iter()
        .collect(),
    }
}
