//! Settlement regression tests against the acceptance fixture: 24 Win/Place
//! bets and 12 Exacta bets, settled on a race finishing 2, 3, 1.

use tote_engine::{PoolLedger, ProductRules, RaceResult, Schema, SchemaConfig, SchemaParser};

fn race_parser() -> SchemaParser {
    let config: SchemaConfig = serde_json::from_str(
        r#"{
            "delimiter": ":",
            "records": {
                "Bet": [
                    { "name": "product", "pattern": "[WPE]{1}" },
                    { "name": "selections", "pattern": {
                        "field": "product",
                        "arms": { "W": "\\d+", "P": "\\d+", "E": "\\d+,\\d+" }
                    } },
                    { "name": "stake", "pattern": "\\d+" }
                ],
                "Result": [
                    { "name": "first", "pattern": "\\d+" },
                    { "name": "second", "pattern": "\\d+" },
                    { "name": "third", "pattern": "\\d+" }
                ]
            }
        }"#,
    )
    .unwrap();
    SchemaParser::new(Schema::compile(&config).unwrap())
}

const FIXTURE_BETS: &[&str] = &[
    "Bet:W:1:3",
    "Bet:W:2:4",
    "Bet:W:3:5",
    "Bet:W:4:5",
    "Bet:W:1:16",
    "Bet:W:2:8",
    "Bet:W:3:22",
    "Bet:W:4:57",
    "Bet:W:1:42",
    "Bet:W:2:98",
    "Bet:W:3:63",
    "Bet:W:4:15",
    "Bet:P:1:31",
    "Bet:P:2:89",
    "Bet:P:3:28",
    "Bet:P:4:72",
    "Bet:P:1:40",
    "Bet:P:2:16",
    "Bet:P:3:82",
    "Bet:P:4:52",
    "Bet:P:1:18",
    "Bet:P:2:74",
    "Bet:P:3:39",
    "Bet:P:4:105",
    "Bet:E:1,2:13",
    "Bet:E:2,3:98",
    "Bet:E:1,3:82",
    "Bet:E:3,2:27",
    "Bet:E:1,2:5",
    "Bet:E:2,3:61",
    "Bet:E:1,3:28",
    "Bet:E:3,2:25",
    "Bet:E:1,2:81",
    "Bet:E:2,3:47",
    "Bet:E:1,3:93",
    "Bet:E:3,2:51",
];

fn fixture_ledger() -> PoolLedger {
    let parser = race_parser();
    let mut ledger = PoolLedger::new(ProductRules::standard_race());
    for line in FIXTURE_BETS {
        let record = parser.parse(line).expect("fixture bet parses");
        ledger.process(&record).expect("fixture bet accepted");
    }
    ledger
}

fn fixture_result() -> RaceResult {
    RaceResult {
        first: "2".to_string(),
        second: "3".to_string(),
        third: "1".to_string(),
    }
}

#[test]
fn pools_accumulate_fixture_totals() {
    let ledger = fixture_ledger();
    assert_eq!(ledger.pool("W").unwrap().total_stake.to_string(), "338.00");
    assert_eq!(ledger.pool("P").unwrap().total_stake.to_string(), "646.00");
    assert_eq!(ledger.pool("E").unwrap().total_stake.to_string(), "611.00");
}

#[test]
fn commission_per_product() {
    let mut ledger = fixture_ledger();

    assert_eq!(ledger.deduct_commission("W").unwrap().to_string(), "50.70");
    assert_eq!(ledger.deduct_commission("P").unwrap().to_string(), "77.52");
    assert_eq!(ledger.deduct_commission("E").unwrap().to_string(), "109.98");

    // pool totals reduced by exactly the commission amounts
    assert_eq!(ledger.pool("W").unwrap().total_stake.to_string(), "287.30");
    assert_eq!(ledger.pool("P").unwrap().total_stake.to_string(), "568.48");
    assert_eq!(ledger.pool("E").unwrap().total_stake.to_string(), "501.02");
}

#[test]
fn dividends_after_commission() {
    let mut ledger = fixture_ledger();
    for product in ["W", "P", "E"] {
        ledger.deduct_commission(product).unwrap();
    }

    let win = ledger.dividends_for("W", "2").unwrap().unwrap();
    let place_first = ledger.dividends_for("P", "2").unwrap().unwrap();
    let place_second = ledger.dividends_for("P", "3").unwrap().unwrap();
    let place_third = ledger.dividends_for("P", "1").unwrap().unwrap();
    let exacta = ledger.dividends_for("E", "2,3").unwrap().unwrap();

    assert_eq!(win.to_string(), "2.61");
    assert_eq!(place_first.to_string(), "1.06");
    assert_eq!(place_second.to_string(), "1.27");
    assert_eq!(place_third.to_string(), "2.13");
    assert_eq!(exacta.to_string(), "2.43");
}

#[test]
fn settle_computes_everything_in_one_pass() {
    let mut ledger = fixture_ledger();
    let settlement = ledger.settle(&fixture_result()).unwrap();

    assert_eq!(settlement.commissions["W"].to_string(), "50.70");
    assert_eq!(settlement.commissions["P"].to_string(), "77.52");
    assert_eq!(settlement.commissions["E"].to_string(), "109.98");

    let rendered: Vec<String> = settlement
        .events
        .iter()
        .map(|event| {
            format!(
                "{}:{}:{}",
                event.display_name,
                event.selection,
                event
                    .dividend
                    .map(|d| format!("${}", d))
                    .unwrap_or_else(|| "NONE".to_string())
            )
        })
        .collect();

    assert_eq!(
        rendered,
        vec![
            "Exacta:2,3:$2.43",
            "Place:2:$1.06",
            "Place:3:$1.27",
            "Place:1:$2.13",
            "Win:2:$2.61",
        ]
    );
}

#[test]
fn no_winning_bets_yields_no_dividend() {
    let parser = race_parser();
    let mut ledger = PoolLedger::new(ProductRules::standard_race());
    ledger
        .process(&parser.parse("Bet:E:3,2:51").unwrap())
        .unwrap();

    // the race finished 2,3 but only 3,2 was backed
    let settlement = ledger.settle(&fixture_result()).unwrap();
    assert_eq!(settlement.events.len(), 1);
    assert_eq!(settlement.events[0].selection, "2,3");
    assert_eq!(settlement.events[0].dividend, None);
}

#[test]
fn settlement_discards_prior_cycle_stakes() {
    let mut ledger = fixture_ledger();
    ledger.settle(&fixture_result()).unwrap();

    let parser = race_parser();
    ledger
        .process(&parser.parse("Bet:W:4:7").unwrap())
        .unwrap();

    let pool = ledger.pool("W").unwrap();
    assert_eq!(pool.total_stake.to_string(), "7.00");
    assert_eq!(pool.bets.len(), 1);
}

#[test]
fn back_to_back_cycles_are_independent() {
    let parser = race_parser();
    let mut ledger = PoolLedger::new(ProductRules::standard_race());

    for cycle in 0..2 {
        ledger
            .process(&parser.parse("Bet:W:2:100").unwrap())
            .unwrap();
        let settlement = ledger.settle(&fixture_result()).unwrap();

        // 100 - 15% commission, all on the winner
        assert_eq!(
            settlement.events.last().unwrap().dividend.unwrap().to_string(),
            "0.85",
            "cycle {cycle}"
        );
    }
}
