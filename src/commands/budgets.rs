// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;

use crate::budget::{Outlook, daily_trace, month_budget};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, month_of, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, sub, today)?,
        Some(("daily", sub)) => daily(store, sub, today)?,
        _ => {}
    }
    Ok(())
}

fn requested_month(sub: &clap::ArgMatches, today: NaiveDate) -> String {
    sub.get_one::<String>("month")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| month_of(today))
}

fn summary(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let month = requested_month(sub, today);
    let b = match month_budget(store.document(), &month) {
        Ok(b) => b,
        Err(e) => {
            println!("No data: {}", e);
            return Ok(());
        }
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &b)? {
        let rows = vec![
            vec!["Base income".into(), fmt_money(&b.base_income)],
            vec!["Flexible income".into(), fmt_money(&b.flex_income)],
            vec!["Fixed costs".into(), fmt_money(&b.fixed_costs)],
            vec![
                format!("Savings goal ({} days)", b.days),
                fmt_money(&b.monthly_savings_goal),
            ],
            vec!["Flexible budget".into(), fmt_money(&b.monthly_flexible_budget)],
            vec!["Available for spending".into(), fmt_money(&b.nafs)],
            vec!["Daily target".into(), fmt_money(&b.initial_daily_target)],
        ];
        println!("{}", pretty_table(&[b.month.as_str(), "Amount"], rows));
    }
    Ok(())
}

fn daily(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let month = requested_month(sub, today);
    let trace = match daily_trace(store.document(), &month, today, sub.get_flag("carryover")) {
        Ok(t) => t,
        Err(e) => {
            println!("No data: {}", e);
            return Ok(());
        }
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &trace)? {
        return Ok(());
    }
    let b = &trace.budget;
    println!(
        "{}: flexible budget {} over {} days, {} per day",
        b.month,
        fmt_money(&b.monthly_flexible_budget),
        b.days,
        fmt_money(&b.initial_daily_target)
    );
    if b.carryover < rust_decimal::Decimal::ZERO {
        println!("Carried over from last month: {}", fmt_money(&b.carryover));
    }
    if trace.rows.is_empty() {
        println!("No data: {} has not started", b.month);
        return Ok(());
    }
    let rows = trace
        .rows
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                fmt_money(&r.income),
                fmt_money(&r.target),
                fmt_money(&r.spent),
                fmt_money(&r.plus_minus),
                fmt_money(&r.cumulative),
                r.status.label().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Date", "Income", "Target", "Spent", "+/-", "Balance", "Status"],
            rows
        )
    );
    if let Some(outlook) = &trace.outlook {
        println!("{}", describe(outlook));
    }
    Ok(())
}

fn describe(outlook: &Outlook) -> String {
    match outlook {
        Outlook::Depleted {
            overspend,
            remaining_days,
        } => format!(
            "Budget depleted: {} over with {} days left",
            fmt_money(overspend),
            remaining_days
        ),
        Outlook::Caution {
            daily_target,
            remaining_days,
            balance,
        } => format!(
            "Caution: {} per day for {} days ({} left)",
            fmt_money(daily_target),
            remaining_days,
            fmt_money(balance)
        ),
        Outlook::Excellent {
            daily_target,
            remaining_days,
            balance,
        } => format!(
            "Ahead of plan: {} per day for {} days ({} left)",
            fmt_money(daily_target),
            remaining_days,
            fmt_money(balance)
        ),
        Outlook::OnTrack {
            daily_target,
            remaining_days,
            balance,
        } => format!(
            "On track: {} per day for {} days ({} left)",
            fmt_money(daily_target),
            remaining_days,
            fmt_money(balance)
        ),
        Outlook::MonthComplete { balance } => {
            format!("Month complete, ended at {}", fmt_money(balance))
        }
    }
}
