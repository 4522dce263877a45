// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Which income entries and fixed costs are in force for a given month.
//!
//! Every function here is total: a malformed month yields zero or an empty set.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Document, FixedCost, IncomeEntry};
use crate::utils::{MonthSpan, month_span};

/// `[start, end]` overlaps the month; a missing bound is open.
fn overlaps(span: &MonthSpan, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|s| s <= span.last) && end.is_none_or(|e| e >= span.first)
}

pub fn income_active_in(entry: &IncomeEntry, span: &MonthSpan) -> bool {
    overlaps(span, Some(entry.start_date), entry.end_date)
}

pub fn fixed_cost_active_in(cost: &FixedCost, span: &MonthSpan) -> bool {
    overlaps(span, cost.start_date, cost.end_date)
}

pub fn active_income_entries<'a>(doc: &'a Document, month: &str) -> Vec<&'a IncomeEntry> {
    let Ok(span) = month_span(month) else {
        return Vec::new();
    };
    doc.budget_settings
        .monthly_income
        .iter()
        .filter(|e| income_active_in(e, &span))
        .collect()
}

pub fn active_income(doc: &Document, month: &str) -> Decimal {
    active_income_entries(doc, month)
        .iter()
        .map(|e| e.amount)
        .sum()
}

pub fn active_fixed_costs<'a>(doc: &'a Document, month: &str) -> Vec<&'a FixedCost> {
    let Ok(span) = month_span(month) else {
        return Vec::new();
    };
    doc.budget_settings
        .fixed_costs
        .iter()
        .filter(|c| fixed_cost_active_in(c, &span))
        .collect()
}

pub fn active_fixed_total(doc: &Document, month: &str) -> Decimal {
    active_fixed_costs(doc, month).iter().map(|c| c.amount).sum()
}
