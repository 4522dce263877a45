// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::reports::{category_totals, month_range_summary, monthly_history};
use crate::store::Store;
use crate::utils::{fmt_money, fmt_pct, kind_arg, maybe_print_json, month_arg_or, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("categories", sub)) => categories(store, sub, today)?,
        Some(("history", sub)) => history(store, sub, today)?,
        Some(("summary", sub)) => summary(store, sub, today)?,
        _ => {}
    }
    Ok(())
}

fn categories(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let kind = kind_arg(sub)?;
    let month = month_arg_or(sub, today)?;
    let data = category_totals(
        store.document(),
        kind,
        &month,
        sub.get_flag("include-recurring"),
    )?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No data for {} {}", kind, month);
        return Ok(());
    }
    let total: Decimal = data.iter().map(|(_, v)| *v).sum();
    let rows = data
        .iter()
        .map(|(cat, v)| {
            vec![
                cat.clone(),
                fmt_money(v),
                if total.is_zero() {
                    fmt_pct(&Decimal::ZERO)
                } else {
                    fmt_pct(&(*v / total * Decimal::ONE_HUNDRED))
                },
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Total", "Share"], rows));
    println!("{} {} total: {}", kind, month, fmt_money(&total));
    Ok(())
}

fn history(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let kind = kind_arg(sub)?;
    let months = *sub.get_one::<u32>("months").unwrap_or(&6);
    let data = monthly_history(
        store.document(),
        kind,
        months,
        today,
        sub.get_flag("include-recurring"),
    )?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| vec![r.month.clone(), fmt_money(&r.total)])
            .collect();
        println!("{}", pretty_table(&["Month", "Total"], rows));
    }
    Ok(())
}

fn summary(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let month = month_arg_or(sub, today)?;
    let back = *sub.get_one::<u32>("months-back").unwrap_or(&3);
    let s = month_range_summary(store.document(), &month, back)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    println!(
        "{} to {}: income {}, expenses {}, net {} ({} expenses, {} incomes)",
        s.months.first().map(String::as_str).unwrap_or(""),
        s.months.last().map(String::as_str).unwrap_or(""),
        fmt_money(&s.totals.income),
        fmt_money(&s.totals.expenses),
        fmt_money(&s.totals.net),
        s.transaction_counts.expenses,
        s.transaction_counts.incomes
    );
    let rows = s
        .expense_categories
        .iter()
        .map(|(c, v)| vec!["Expense".to_string(), c.clone(), fmt_money(v)])
        .chain(
            s.income_categories
                .iter()
                .map(|(c, v)| vec!["Income".to_string(), c.clone(), fmt_money(v)]),
        )
        .collect();
    println!("{}", pretty_table(&["Kind", "Category", "Total"], rows));
    Ok(())
}
