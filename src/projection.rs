// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::assets::current_net_worth;
use crate::models::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionStep {
    pub month: String,
    pub days: i64,
    pub monthly_delta: Decimal,
    pub running_total: Decimal,
}

/// Net worth for each of the next `n_months`, growing by the daily savings goal
/// over the actual length of each step (today to the same day next month).
/// The projection stops early once a total no longer fits in a `Decimal`.
pub fn project(doc: &Document, n_months: u32, today: NaiveDate) -> Vec<ProjectionStep> {
    let daily = doc.budget_settings.daily_savings_goal;
    let mut running_total = current_net_worth(&doc.budget_settings);
    let mut current = today;
    let mut steps = Vec::with_capacity(n_months as usize);
    for _ in 0..n_months {
        let Some(next) = current.checked_add_months(Months::new(1)) else {
            break;
        };
        let days = (next - current).num_days();
        let Some(monthly_delta) = daily.checked_mul(Decimal::from(days)) else {
            break;
        };
        let Some(total) = running_total.checked_add(monthly_delta) else {
            break;
        };
        running_total = total;
        steps.push(ProjectionStep {
            month: current.format("%Y-%m").to_string(),
            days,
            monthly_delta,
            running_total,
        });
        current = next;
    }
    steps
}
