// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::allocation::{AutoAssign, CategoryAllocation, auto_assign, save_allocation};
use crate::budget::net_available_for_spending;
use crate::models::TransactionKind;
use crate::store::Store;
use crate::utils::{
    fmt_money, fmt_pct, kind_arg, maybe_print_json, month_arg_or, parse_decimal, pretty_table,
};

pub fn handle(store: &mut Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub, today)?,
        Some(("adjust", sub)) => {
            let kind = kind_arg(sub)?;
            let category = sub.get_one::<String>("category").unwrap().trim();
            let pct = parse_decimal(sub.get_one::<String>("pct").unwrap())?;
            let mut alloc = CategoryAllocation::from_document(store.document(), kind);
            alloc.adjust(category, pct)?;
            if sub.get_flag("normalize") {
                alloc.normalize();
            }
            persist(store, &alloc)?;
        }
        Some(("normalize", sub)) => {
            let kind = kind_arg(sub)?;
            let mut alloc = CategoryAllocation::from_document(store.document(), kind);
            alloc.normalize();
            persist(store, &alloc)?;
        }
        Some(("set", sub)) => {
            let kind = kind_arg(sub)?;
            let mut shares = BTreeMap::new();
            for raw in sub.get_many::<String>("share").into_iter().flatten() {
                let (cat, pct) = raw
                    .split_once('=')
                    .with_context(|| format!("Share '{}' must look like CATEGORY=PCT", raw))?;
                shares.insert(cat.trim().to_string(), parse_decimal(pct)?);
            }
            let mut alloc = CategoryAllocation::from_document(store.document(), kind);
            for cat in shares.keys() {
                if alloc.get(cat).is_none() {
                    bail!("Unknown {} category '{}'", kind, cat);
                }
            }
            alloc.apply(&shares);
            persist(store, &alloc)?;
        }
        Some(("auto", sub)) => auto(store, sub, today)?,
        _ => {}
    }
    Ok(())
}

fn persist(store: &mut Store, alloc: &CategoryAllocation) -> Result<()> {
    print_shares(alloc, None);
    if !alloc.is_balanced() {
        println!(
            "Total is {}; shares must add up to 100% before they are saved",
            fmt_pct(&alloc.total())
        );
    }
    store.mutate(|doc| save_allocation(doc, alloc))?;
    println!("Saved {} budget", alloc.kind);
    Ok(())
}

fn print_shares(alloc: &CategoryAllocation, nafs: Option<Decimal>) {
    let rows = alloc
        .amounts(nafs.unwrap_or(Decimal::ZERO))
        .into_iter()
        .map(|(cat, pct, amount)| {
            let mut row = vec![cat, fmt_pct(&pct)];
            if nafs.is_some() {
                row.push(fmt_money(&amount));
            }
            row
        })
        .collect();
    let headers: &[&str] = if nafs.is_some() {
        &["Category", "Share", "Amount"]
    } else {
        &["Category", "Share"]
    };
    println!("{}", pretty_table(headers, rows));
}

#[derive(Serialize)]
struct AllocationView {
    kind: TransactionKind,
    month: String,
    nafs: Decimal,
    total_pct: Decimal,
    shares: Vec<(String, Decimal, Decimal)>,
}

fn show(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let kind = kind_arg(sub)?;
    let month = month_arg_or(sub, today)?;
    let doc = store.document();
    let alloc = CategoryAllocation::from_document(doc, kind);
    let nafs = net_available_for_spending(doc, &month);
    let view = AllocationView {
        kind,
        month: month.clone(),
        nafs,
        total_pct: alloc.total(),
        shares: alloc.amounts(nafs),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        print_shares(&alloc, Some(nafs));
        println!(
            "Total {} of {} available in {}",
            fmt_pct(&view.total_pct),
            fmt_money(&nafs),
            month
        );
    }
    Ok(())
}

fn auto(store: &mut Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let month = month_arg_or(sub, today)?;
    let kind = TransactionKind::Expense;
    let categories = store.document().categories(kind).to_vec();
    let outcome = auto_assign(store.document(), &month, &categories)?;
    let mut alloc = CategoryAllocation::from_document(store.document(), kind);
    match outcome {
        AutoAssign::NothingToAssign => {
            println!("No expenses in {}: nothing to auto-assign", month);
            return Ok(());
        }
        AutoAssign::NoFlexibleBudget => {
            println!("No flexible budget in {}: nothing to auto-assign", month);
            return Ok(());
        }
        AutoAssign::UnderBudget {
            percentages,
            total_spent,
            nafs,
            unallocated_pct,
            unallocated_amount,
        } => {
            alloc.apply(&percentages);
            println!(
                "Spent {} of {}; unallocated: {} ({})",
                fmt_money(&total_spent),
                fmt_money(&nafs),
                fmt_pct(&unallocated_pct),
                fmt_money(&unallocated_amount)
            );
            if let Some(rest) = sub.get_one::<String>("assign-rest") {
                let rest = rest.trim();
                let current = alloc
                    .get(rest)
                    .with_context(|| format!("Unknown expense category '{}'", rest))?;
                let mut top_up = BTreeMap::new();
                top_up.insert(rest.to_string(), current + unallocated_pct);
                alloc.apply(&top_up);
            }
        }
        AutoAssign::Overspent {
            percentages,
            total_spent,
            nafs,
            over_amount,
        } => {
            alloc.apply(&percentages);
            println!(
                "Spent {} against {}: over by {}; shares follow actual spend",
                fmt_money(&total_spent),
                fmt_money(&nafs),
                fmt_money(&over_amount)
            );
        }
    }
    if sub.get_flag("apply") {
        persist(store, &alloc)?;
    } else {
        print_shares(&alloc, None);
        println!("Total {} (pass --apply to save)", fmt_pct(&alloc.total()));
    }
    Ok(())
}
