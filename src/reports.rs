// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregations behind the category and history charts, and the month-range
//! summary handed to the insights collaborator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::Result;
use crate::models::{Document, TransactionKind};
use crate::resolver::{active_fixed_total, active_income};
use crate::utils::{month_of, month_range, month_span};

pub const FIXED_COSTS_BUCKET: &str = "Fixed Costs";
pub const BASE_INCOME_BUCKET: &str = "Base Income";

fn recurring(doc: &Document, kind: TransactionKind, month: &str) -> (&'static str, Decimal) {
    match kind {
        TransactionKind::Expense => (FIXED_COSTS_BUCKET, active_fixed_total(doc, month)),
        TransactionKind::Income => (BASE_INCOME_BUCKET, active_income(doc, month)),
    }
}

/// Per-category totals for `month`, largest first. Categories no longer in the
/// list still get their own bucket. With `include_recurring`, the month's fixed
/// costs (expenses) or base income (incomes) are added as one extra bucket.
pub fn category_totals(
    doc: &Document,
    kind: TransactionKind,
    month: &str,
    include_recurring: bool,
) -> Result<Vec<(String, Decimal)>> {
    let month = month_span(month)?.label();
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    if include_recurring {
        let (bucket, amount) = recurring(doc, kind, &month);
        if amount > Decimal::ZERO {
            totals.insert(bucket.to_string(), amount);
        }
    }
    for t in doc.in_month(kind, &month) {
        *totals.entry(t.category.clone()).or_insert(Decimal::ZERO) += t.amount;
    }
    let mut out: Vec<(String, Decimal)> = totals.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: String,
    pub total: Decimal,
}

/// Totals for the `num_months` months ending with the month of `today`, oldest first.
pub fn monthly_history(
    doc: &Document,
    kind: TransactionKind,
    num_months: u32,
    today: NaiveDate,
    include_recurring: bool,
) -> Result<Vec<MonthTotal>> {
    month_range(&month_of(today), num_months)?
        .into_iter()
        .map(|month| {
            let mut total: Decimal = doc.in_month(kind, &month).map(|t| t.amount).sum();
            if include_recurring {
                total += recurring(doc, kind, &month).1;
            }
            Ok(MonthTotal { month, total })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionCounts {
    pub expenses: usize,
    pub incomes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub months: Vec<String>,
    pub totals: RangeTotals,
    pub expense_categories: BTreeMap<String, Decimal>,
    pub income_categories: BTreeMap<String, Decimal>,
    pub transaction_counts: TransactionCounts,
}

/// Flexible transactions over `months_back` months ending at `end_month`.
pub fn month_range_summary(
    doc: &Document,
    end_month: &str,
    months_back: u32,
) -> Result<RangeSummary> {
    let months = month_range(end_month, months_back)?;
    let mut expense_categories = BTreeMap::new();
    let mut income_categories = BTreeMap::new();
    let mut counts = TransactionCounts::default();
    for month in &months {
        for t in doc.in_month(TransactionKind::Expense, month) {
            *expense_categories
                .entry(t.category.clone())
                .or_insert(Decimal::ZERO) += t.amount;
            counts.expenses += 1;
        }
        for t in doc.in_month(TransactionKind::Income, month) {
            *income_categories
                .entry(t.category.clone())
                .or_insert(Decimal::ZERO) += t.amount;
            counts.incomes += 1;
        }
    }
    let income: Decimal = income_categories.values().copied().sum();
    let expenses: Decimal = expense_categories.values().copied().sum();
    Ok(RangeSummary {
        months,
        totals: RangeTotals {
            income,
            expenses,
            net: income - expenses,
        },
        expense_categories,
        income_categories,
        transaction_counts: counts,
    })
}
