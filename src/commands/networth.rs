// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::assets::{
    self, CHANGE_PERIODS, NetWorthChange, allocation_percentages, current_net_worth,
    net_worth_change, snapshots_in_range,
};
use crate::models::AccountKind;
use crate::store::Store;
use crate::utils::{
    date_arg_or, fmt_money, fmt_pct, maybe_print_json, parse_date, parse_optional_date,
    pretty_table,
};

pub fn handle(store: &mut Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub, today)?,
        Some(("snapshot", sub)) => {
            let date = date_arg_or(sub, "date", today)?;
            let note = sub.get_one::<String>("note").map(String::as_str).unwrap_or("");
            let snap = store.mutate(|doc| Ok(assets::record_snapshot(doc, date, note)))?;
            println!(
                "Snapshot {}: net worth {}",
                snap.date,
                fmt_money(&snap.net_worth)
            );
        }
        Some(("list", sub)) => {
            let from = parse_optional_date(sub.get_one::<String>("from").map(String::as_str))?;
            let to = parse_optional_date(sub.get_one::<String>("to").map(String::as_str))?;
            let data = snapshots_in_range(store.document(), from, to);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                if data.is_empty() {
                    println!("No data");
                    return Ok(());
                }
                let rows = data
                    .iter()
                    .map(|s| {
                        vec![
                            s.date.to_string(),
                            fmt_money(&s.bank_balance),
                            fmt_money(&s.wallet_balance),
                            fmt_money(&s.savings_balance),
                            fmt_money(&s.investment_balance),
                            fmt_money(&s.money_lent_balance),
                            fmt_money(&s.net_worth),
                            s.note.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &[
                            "Date",
                            "Bank",
                            "Wallet",
                            "Savings",
                            "Investments",
                            "Money Lent",
                            "Net Worth",
                            "Note"
                        ],
                        rows
                    )
                );
            }
        }
        Some(("delete", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            store.mutate(|doc| assets::delete_snapshot(doc, date))?;
            println!("Deleted snapshot for {}", date);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct NetWorthView {
    net_worth: Decimal,
    balances: Vec<(AccountKind, Decimal, Decimal)>,
    changes: Vec<NetWorthChange>,
}

fn show(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let doc = store.document();
    let settings = &doc.budget_settings;
    let view = NetWorthView {
        net_worth: current_net_worth(settings),
        balances: allocation_percentages(settings),
        changes: CHANGE_PERIODS
            .iter()
            .filter_map(|k| net_worth_change(doc, *k, today))
            .collect(),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    let rows = AccountKind::ALL
        .iter()
        .map(|k| {
            let share = view
                .balances
                .iter()
                .find(|(b, _, _)| b == k)
                .map(|(_, _, pct)| fmt_pct(pct))
                .unwrap_or_default();
            vec![k.to_string(), fmt_money(&settings.balance(*k)), share]
        })
        .collect();
    println!("{}", pretty_table(&["Account", "Balance", "Share"], rows));
    println!("Net worth: {}", fmt_money(&view.net_worth));

    let rows: Vec<Vec<String>> = CHANGE_PERIODS
        .iter()
        .map(|k| match view.changes.iter().find(|c| c.months_back == *k) {
            Some(c) => vec![
                format!("{} mo", k),
                c.past_date.to_string(),
                fmt_money(&c.past),
                fmt_money(&c.change),
                fmt_pct(&c.change_pct),
            ],
            None => vec![
                format!("{} mo", k),
                "No data".into(),
                String::new(),
                String::new(),
                String::new(),
            ],
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Period", "Snapshot", "Then", "Change", "%"], rows)
    );
    Ok(())
}
