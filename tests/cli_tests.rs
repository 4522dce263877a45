// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use budgetflow::commands::{allocations, doctor, exporter, goals, settings, transactions, transfers};
use budgetflow::models::TransactionKind;
use budgetflow::{cli, store::Store};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["budgetflow"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    m.subcommand().unwrap().1.clone()
}

fn open(path: &Path) -> Store {
    Store::open_at(path, today()).unwrap()
}

#[test]
fn tx_add_persists_through_the_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.json");
    let mut store = open(&path);

    let m = sub_matches(&[
        "tx", "add", "--kind", "expense", "--amount", "12.50", "--category", "Food",
        "--date", "2025-03-02",
    ]);
    transactions::handle(&mut store, &m, today()).unwrap();
    let m = sub_matches(&["tx", "add", "--kind", "income", "--amount", "100", "--category", "Gift"]);
    transactions::handle(&mut store, &m, today()).unwrap();

    let reopened = open(&path);
    let doc = reopened.document();
    assert_eq!(doc.expenses.len(), 1);
    assert_eq!(doc.expenses[0].amount, dec!(12.50));
    assert_eq!(doc.incomes[0].date, today());

    let m = sub_matches(&["tx", "add", "--kind", "expense", "--amount", "abc", "--category", "Food"]);
    assert!(transactions::handle(&mut store, &m, today()).is_err());
    assert_eq!(store.document().expenses.len(), 1);
}

#[test]
fn alloc_set_requires_a_full_hundred() {
    let dir = tempdir().unwrap();
    let mut store = open(&dir.path().join("data.json"));
    store
        .mutate(|doc| {
            doc.categories.expense = vec!["Food".into(), "Fun".into(), "Other".into()];
            Ok(())
        })
        .unwrap();

    let m = sub_matches(&["alloc", "set", "--share", "Food=50", "--share", "Fun=30"]);
    assert!(allocations::handle(&mut store, &m, today()).is_err());
    assert!(store.document().budget_settings.category_budgets.expense.is_empty());

    let m = sub_matches(&[
        "alloc", "set", "--share", "Food=50", "--share", "Fun=30", "--share", "Other=20",
    ]);
    allocations::handle(&mut store, &m, today()).unwrap();

    let m = sub_matches(&["alloc", "adjust", "--category", "Food", "--pct", "70"]);
    allocations::handle(&mut store, &m, today()).unwrap();
    let saved = &store.document().budget_settings.category_budgets.expense;
    assert_eq!(saved["Food"], dec!(70));
    let total: Decimal = saved.values().copied().sum();
    assert!((total - dec!(100)).abs() <= dec!(0.01));

    let m = sub_matches(&["alloc", "set", "--share", "Nope=100"]);
    assert!(allocations::handle(&mut store, &m, today()).is_err());
}

#[test]
fn goal_allocation_respects_savings() {
    let dir = tempdir().unwrap();
    let mut store = open(&dir.path().join("data.json"));

    let m = sub_matches(&["settings", "balance", "--account", "savings", "--amount", "400"]);
    settings::handle(&mut store, &m, today()).unwrap();

    let m = sub_matches(&["goal", "add", "--name", "Bike", "--target", "300", "--priority", "high"]);
    goals::handle(&mut store, &m, today()).unwrap();
    let m = sub_matches(&["goal", "add", "--name", "Trip", "--target", "500"]);
    goals::handle(&mut store, &m, today()).unwrap();

    let m = sub_matches(&["goal", "distribute"]);
    goals::handle(&mut store, &m, today()).unwrap();
    let goals_now = &store.document().budget_settings.savings_goals;
    assert_eq!(goals_now[0].allocated_amount, dec!(300));
    assert_eq!(goals_now[0].completion_date, Some(today()));
    assert_eq!(goals_now[1].allocated_amount, dec!(100));

    let trip = goals_now[1].id.clone();
    let m = sub_matches(&["goal", "allocate", "--id", trip.as_str(), "--amount", "200"]);
    assert!(goals::handle(&mut store, &m, today()).is_err());

    let m = sub_matches(&["transfer", "--from", "savings", "--to", "bank", "--amount", "1"]);
    assert!(transfers::handle(&mut store, &m).is_err());
    assert_eq!(store.document().budget_settings.savings_balance, dec!(400));
}

#[test]
fn export_writes_json_and_csv() {
    let dir = tempdir().unwrap();
    let mut store = open(&dir.path().join("data.json"));
    for (kind, date, amount) in [
        ("expense", "2025-03-05", "9.99"),
        ("income", "2025-03-01", "50"),
        ("expense", "2025-03-01", "3"),
    ] {
        let m = sub_matches(&[
            "tx", "add", "--kind", kind, "--amount", amount, "--category", "Other", "--date", date,
        ]);
        transactions::handle(&mut store, &m, today()).unwrap();
    }

    let json_out = dir.path().join("tx.json");
    let m = sub_matches(&[
        "export", "transactions", "--format", "json", "--out", json_out.to_str().unwrap(),
    ]);
    exporter::handle(&store, &m).unwrap();
    let body: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["kind"], "Income");
    assert_eq!(items[1]["kind"], "Expense");
    assert_eq!(items[2]["date"], "2025-03-05");

    let csv_out = dir.path().join("tx.csv");
    let m = sub_matches(&[
        "export", "transactions", "--format", "csv", "--out", csv_out.to_str().unwrap(),
    ]);
    exporter::handle(&store, &m).unwrap();
    let mut rdr = csv::Reader::from_path(&csv_out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["date", "kind", "category", "amount", "description", "id"]
    );
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[2][3], "9.99");
    assert_eq!(&records[0][1], TransactionKind::Income.as_str());

    let bad_out = dir.path().join("tx.xml");
    let m = sub_matches(&[
        "export", "transactions", "--format", "xml", "--out", bad_out.to_str().unwrap(),
    ]);
    assert!(exporter::handle(&store, &m).is_err());
    assert!(!bad_out.exists());
}

#[test]
fn doctor_flags_unbalanced_budgets() {
    let dir = tempdir().unwrap();
    let mut store = open(&dir.path().join("data.json"));
    assert!(doctor::diagnose(store.document()).is_empty());

    store
        .mutate(|doc| {
            doc.budget_settings
                .category_budgets
                .expense
                .insert("Food".into(), dec!(40));
            Ok(())
        })
        .unwrap();
    let issues = doctor::diagnose(store.document());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].0, "budget_not_100");
    doctor::handle(&store).unwrap();
}
