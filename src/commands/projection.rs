// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;

use crate::assets::current_net_worth;
use crate::projection::project;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn handle(store: &Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let months = *m.get_one::<u32>("months").unwrap_or(&12);
    let doc = store.document();
    let steps = project(doc, months, today);
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &steps)? {
        return Ok(());
    }
    println!(
        "Starting net worth {} saving {} per day",
        fmt_money(&current_net_worth(&doc.budget_settings)),
        fmt_money(&doc.budget_settings.daily_savings_goal)
    );
    let rows = steps
        .iter()
        .map(|s| {
            vec![
                s.month.clone(),
                s.days.to_string(),
                fmt_money(&s.monthly_delta),
                fmt_money(&s.running_total),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Days", "Saved", "Net Worth"], rows)
    );
    Ok(())
}
