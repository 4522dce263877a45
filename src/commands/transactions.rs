// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;

use crate::ledger::{self, NewTransaction, TransactionPatch};
use crate::models::TransactionKind;
use crate::store::Store;
use crate::utils::{
    date_arg_or, decimal_arg, fmt_money, kind_arg, maybe_print_json, month_arg_or, parse_date,
    parse_decimal, pretty_table,
};

pub fn handle(store: &mut Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub, today)?,
        Some(("list", sub)) => list(store, sub, today)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("delete", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let (kind, tx) = store.mutate(|doc| ledger::delete(doc, id.trim()))?;
            println!("Deleted {} {} on {}", kind, fmt_money(&tx.amount), tx.date);
        }
        Some(("totals", sub)) => totals(store, sub, today)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &mut Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let new = NewTransaction {
        kind: kind_arg(sub)?,
        date: date_arg_or(sub, "date", today)?,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        category: sub.get_one::<String>("category").unwrap().to_string(),
        description: sub
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_default(),
    };
    let kind = new.kind;
    let tx = store.mutate(|doc| ledger::add(doc, new))?;
    println!(
        "Recorded {} {} on {} in '{}' (id: {})",
        kind,
        fmt_money(&tx.amount),
        tx.date,
        tx.category,
        tx.id
    );
    Ok(())
}

fn edit(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim().to_string();
    let patch = TransactionPatch {
        kind: sub
            .get_one::<String>("kind")
            .map(|k| k.parse::<TransactionKind>())
            .transpose()?,
        date: sub
            .get_one::<String>("date")
            .map(|d| parse_date(d))
            .transpose()?,
        amount: decimal_arg(sub, "amount")?,
        category: sub.get_one::<String>("category").cloned(),
        description: sub.get_one::<String>("description").cloned(),
    };
    let tx = store.mutate(|doc| ledger::update(doc, &id, patch))?;
    println!("Updated {}: {} on {} in '{}'", tx.id, fmt_money(&tx.amount), tx.date, tx.category);
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let month = month_arg_or(sub, today)?;
    let data = ledger::by_month(store.document(), &month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No data for {}", month);
            return Ok(());
        }
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.tx.date.to_string(),
                    r.kind.to_string(),
                    r.tx.category.clone(),
                    fmt_money(&r.tx.amount),
                    r.tx.description.clone(),
                    r.tx.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Kind", "Category", "Amount", "Description", "Id"],
                rows
            )
        );
    }
    Ok(())
}

fn totals(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let month = month_arg_or(sub, today)?;
    let t = ledger::monthly_totals(store.document(), &month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        let rows = vec![
            vec!["Income".into(), fmt_money(&t.income_total)],
            vec!["Flexible expenses".into(), fmt_money(&t.flexible_expenses)],
            vec!["Fixed costs".into(), fmt_money(&t.fixed_cost_total)],
            vec!["Total expenses".into(), fmt_money(&t.expense_total)],
            vec!["Net".into(), fmt_money(&t.net)],
        ];
        println!("{}", pretty_table(&[t.month.as_str(), "Amount"], rows));
    }
    Ok(())
}
