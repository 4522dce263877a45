// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;
use serde::Serialize;

use crate::assets::{self, LoanPatch};
use crate::ledger::{self, IncomeKey};
use crate::models::{AccountKind, FixedCost, IncomeEntry};
use crate::resolver::fixed_cost_active_in;
use crate::store::Store;
use crate::utils::{
    date_arg_or, decimal_arg, fmt_money, maybe_print_json, month_arg_or, month_span, parse_date,
    parse_decimal, parse_optional_date, pretty_table,
};

pub fn handle(store: &mut Store, m: &ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub)?,
        Some(("income", sub)) => income(store, sub, today)?,
        Some(("fixed", sub)) => fixed(store, sub, today)?,
        Some(("balance", sub)) => {
            let account: AccountKind = sub.get_one::<String>("account").unwrap().parse()?;
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            store.mutate(|doc| assets::set_balance(doc, account, amount))?;
            println!("{} balance set to {}", account, fmt_money(&amount));
        }
        Some(("daily-savings", sub)) => {
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            store.mutate(|doc| assets::set_daily_savings_goal(doc, amount))?;
            println!("Daily savings goal set to {}", fmt_money(&amount));
        }
        Some(("loan", sub)) => loan(store, sub, today)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct SettingsView {
    balances: Vec<(AccountKind, rust_decimal::Decimal)>,
    daily_savings_goal: rust_decimal::Decimal,
    income_entries: usize,
    fixed_costs: usize,
    loans: usize,
}

fn show(store: &Store, sub: &ArgMatches) -> Result<()> {
    let s = &store.document().budget_settings;
    let view = SettingsView {
        balances: AccountKind::ALL.iter().map(|k| (*k, s.balance(*k))).collect(),
        daily_savings_goal: s.daily_savings_goal,
        income_entries: s.monthly_income.len(),
        fixed_costs: s.fixed_costs.len(),
        loans: s.loans.len(),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        let mut rows: Vec<Vec<String>> = view
            .balances
            .iter()
            .map(|(k, v)| vec![k.to_string(), fmt_money(v)])
            .collect();
        rows.push(vec!["Daily savings goal".into(), fmt_money(&view.daily_savings_goal)]);
        rows.push(vec!["Income entries".into(), view.income_entries.to_string()]);
        rows.push(vec!["Fixed costs".into(), view.fixed_costs.to_string()]);
        rows.push(vec!["Open loans".into(), view.loans.to_string()]);
        println!("{}", pretty_table(&["Setting", "Value"], rows));
        println!("Data file: {}", store.path().display());
    }
    Ok(())
}

fn income_key(sub: &ArgMatches) -> Result<IncomeKey> {
    Ok(IncomeKey {
        description: sub.get_one::<String>("description").unwrap().trim().to_string(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
    })
}

fn income(store: &mut Store, m: &ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let entry = IncomeEntry {
                description: sub.get_one::<String>("description").unwrap().to_string(),
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
                end_date: parse_optional_date(sub.get_one::<String>("end").map(String::as_str))?,
            };
            let e = store.mutate(|doc| ledger::add_income_entry(doc, entry))?;
            println!(
                "Income '{}' of {} from {}",
                e.description,
                fmt_money(&e.amount),
                e.start_date
            );
        }
        Some(("list", sub)) => {
            let month = month_arg_or(sub, today)?;
            let data = ledger::income_entries_for(store.document(), &month)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|(e, active)| {
                        vec![
                            e.description.clone(),
                            fmt_money(&e.amount),
                            e.start_date.to_string(),
                            e.end_date.map(|d| d.to_string()).unwrap_or_default(),
                            if *active { "yes".into() } else { "no".into() },
                        ]
                    })
                    .collect();
                let active = format!("Active {}", month);
                println!(
                    "{}",
                    pretty_table(
                        &["Description", "Amount", "Start", "End", active.as_str()],
                        rows
                    )
                );
            }
        }
        Some(("update", sub)) => {
            let key = income_key(sub)?;
            let end_date = match sub.get_one::<String>("end") {
                Some(raw) => parse_optional_date(Some(raw.as_str()))?,
                None => store
                    .document()
                    .budget_settings
                    .monthly_income
                    .iter()
                    .find(|e| key.matches(e))
                    .and_then(|e| e.end_date),
            };
            let entry = IncomeEntry {
                description: sub
                    .get_one::<String>("new-description")
                    .cloned()
                    .unwrap_or_else(|| key.description.clone()),
                amount: decimal_arg(sub, "new-amount")?.unwrap_or(key.amount),
                start_date: match sub.get_one::<String>("new-start") {
                    Some(s) => parse_date(s)?,
                    None => key.start_date,
                },
                end_date,
            };
            let e = store.mutate(|doc| ledger::update_income_entry(doc, &key, entry))?;
            println!("Updated income '{}' ({})", e.description, fmt_money(&e.amount));
        }
        Some(("remove", sub)) => {
            let key = income_key(sub)?;
            let e = store.mutate(|doc| ledger::remove_income_entry(doc, &key))?;
            println!("Removed income '{}'", e.description);
        }
        _ => {}
    }
    Ok(())
}

fn fixed(store: &mut Store, m: &ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let cost = FixedCost {
                desc: sub.get_one::<String>("desc").unwrap().to_string(),
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                start_date: parse_optional_date(sub.get_one::<String>("start").map(String::as_str))?,
                end_date: parse_optional_date(sub.get_one::<String>("end").map(String::as_str))?,
            };
            let c = store.mutate(|doc| ledger::add_fixed_cost(doc, cost))?;
            println!("Fixed cost '{}' of {}", c.desc, fmt_money(&c.amount));
        }
        Some(("list", sub)) => {
            let month = month_arg_or(sub, today)?;
            let span = month_span(&month)?;
            let costs = &store.document().budget_settings.fixed_costs;
            let data: Vec<(&FixedCost, bool)> = costs
                .iter()
                .map(|c| (c, fixed_cost_active_in(c, &span)))
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|(c, active)| {
                        vec![
                            c.desc.clone(),
                            fmt_money(&c.amount),
                            c.start_date.map(|d| d.to_string()).unwrap_or_default(),
                            c.end_date.map(|d| d.to_string()).unwrap_or_default(),
                            if *active { "yes".into() } else { "no".into() },
                        ]
                    })
                    .collect();
                let active = format!("Active {}", month);
                println!(
                    "{}",
                    pretty_table(
                        &["Description", "Amount", "Start", "End", active.as_str()],
                        rows
                    )
                );
            }
        }
        Some(("update", sub)) => {
            let desc = sub.get_one::<String>("desc").unwrap().trim().to_string();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let current = store
                .document()
                .budget_settings
                .fixed_costs
                .iter()
                .find(|c| c.desc == desc && c.amount == amount)
                .cloned()
                .with_context(|| format!("Fixed cost '{}' {} not found", desc, amount))?;
            let cost = FixedCost {
                desc: sub
                    .get_one::<String>("new-desc")
                    .cloned()
                    .unwrap_or_else(|| current.desc.clone()),
                amount: decimal_arg(sub, "new-amount")?.unwrap_or(current.amount),
                start_date: match sub.get_one::<String>("start") {
                    Some(raw) => parse_optional_date(Some(raw.as_str()))?,
                    None => current.start_date,
                },
                end_date: match sub.get_one::<String>("end") {
                    Some(raw) => parse_optional_date(Some(raw.as_str()))?,
                    None => current.end_date,
                },
            };
            let c = store.mutate(|doc| ledger::update_fixed_cost(doc, &desc, amount, cost))?;
            println!("Updated fixed cost '{}' ({})", c.desc, fmt_money(&c.amount));
        }
        Some(("remove", sub)) => {
            let desc = sub.get_one::<String>("desc").unwrap().trim().to_string();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let c = store.mutate(|doc| ledger::remove_fixed_cost(doc, &desc, amount))?;
            println!("Removed fixed cost '{}'", c.desc);
        }
        _ => {}
    }
    Ok(())
}

fn loan(store: &mut Store, m: &ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("lend", sub)) => {
            let borrower = sub.get_one::<String>("borrower").unwrap();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let description = sub
                .get_one::<String>("description")
                .map(String::as_str)
                .unwrap_or("");
            let date = date_arg_or(sub, "date", today)?;
            let l = store.mutate(|doc| assets::lend(doc, borrower, amount, description, date))?;
            println!("Lent {} to {} (id: {})", fmt_money(&l.amount), l.borrower, l.id);
        }
        Some(("list", sub)) => {
            let loans = &store.document().budget_settings.loans;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), loans)? {
                let rows = loans
                    .iter()
                    .map(|l| {
                        vec![
                            l.date.to_string(),
                            l.borrower.clone(),
                            fmt_money(&l.amount),
                            l.description.clone(),
                            l.id.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Date", "Borrower", "Amount", "Description", "Id"], rows)
                );
            }
        }
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let patch = LoanPatch {
                borrower: sub.get_one::<String>("borrower").cloned(),
                amount: decimal_arg(sub, "amount")?,
                description: sub.get_one::<String>("description").cloned(),
                date: sub
                    .get_one::<String>("date")
                    .map(|d| parse_date(d))
                    .transpose()?,
            };
            let l = store.mutate(|doc| assets::update_loan(doc, &id, patch))?;
            println!("Updated loan to {}: {}", l.borrower, fmt_money(&l.amount));
        }
        Some(("returned", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let l = store.mutate(|doc| assets::mark_returned(doc, &id))?;
            println!("{} returned {}", l.borrower, fmt_money(&l.amount));
        }
        _ => {}
    }
    Ok(())
}
