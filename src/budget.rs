// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly flexible budget and the day-by-day depletion trace.
//!
//! The trace opens at `base income - fixed costs - savings goal` (plus an
//! optional deficit carried from the previous month). Flexible income is not
//! part of the opening balance: it is credited at the start of the day it is
//! dated, which is what gives the balance curve its upward spikes.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::models::{Document, TransactionKind};
use crate::resolver::{active_fixed_total, active_income};
use crate::utils::{MonthSpan, month_span, previous_month};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBudget {
    pub month: String,
    pub days: u32,
    pub base_income: Decimal,
    pub flex_income: Decimal,
    pub total_income: Decimal,
    pub fixed_costs: Decimal,
    pub daily_savings_goal: Decimal,
    pub monthly_savings_goal: Decimal,
    /// `total_income - fixed_costs - monthly_savings_goal`; negative means planned overspend.
    pub monthly_flexible_budget: Decimal,
    /// Net available for spending: the flexible budget floored at zero.
    pub nafs: Decimal,
    pub initial_daily_target: Decimal,
    /// Previous-month deficit folded into the opening balance (zero unless requested).
    pub carryover: Decimal,
    pub opening_balance: Decimal,
}

fn flex_total(doc: &Document, kind: TransactionKind, month: &str) -> Decimal {
    doc.in_month(kind, month).map(|t| t.amount).sum()
}

fn daily_totals(doc: &Document, kind: TransactionKind, month: &str) -> BTreeMap<u32, Decimal> {
    let mut out = BTreeMap::new();
    for t in doc.in_month(kind, month) {
        *out.entry(t.date.day()).or_insert(Decimal::ZERO) += t.amount;
    }
    out
}

fn overflow(what: &str) -> Error {
    Error::validation(format!("{} is too large to compute", what))
}

fn build(doc: &Document, span: &MonthSpan, carryover: Decimal) -> Result<MonthBudget> {
    let month = span.label();
    let days = Decimal::from(span.days);
    let base_income = active_income(doc, &month);
    let flex_income = flex_total(doc, TransactionKind::Income, &month);
    let fixed_costs = active_fixed_total(doc, &month);
    let daily_savings_goal = doc.budget_settings.daily_savings_goal;
    let monthly_savings_goal = daily_savings_goal
        .checked_mul(days)
        .ok_or_else(|| overflow("Monthly savings goal"))?;
    let total_income = base_income
        .checked_add(flex_income)
        .ok_or_else(|| overflow("Total income"))?;
    let monthly_flexible_budget = total_income
        .checked_sub(fixed_costs)
        .and_then(|v| v.checked_sub(monthly_savings_goal))
        .ok_or_else(|| overflow("Monthly flexible budget"))?;
    let opening_balance = base_income
        .checked_sub(fixed_costs)
        .and_then(|v| v.checked_sub(monthly_savings_goal))
        .and_then(|v| v.checked_add(carryover))
        .ok_or_else(|| overflow("Opening balance"))?;
    Ok(MonthBudget {
        month,
        days: span.days,
        base_income,
        flex_income,
        total_income,
        fixed_costs,
        daily_savings_goal,
        monthly_savings_goal,
        monthly_flexible_budget,
        nafs: monthly_flexible_budget.max(Decimal::ZERO),
        initial_daily_target: monthly_flexible_budget / days,
        carryover,
        opening_balance,
    })
}

pub fn month_budget(doc: &Document, month: &str) -> Result<MonthBudget> {
    let span = month_span(month)?;
    build(doc, &span, Decimal::ZERO)
}

/// NAFS for `month`; zero for a malformed month.
pub fn net_available_for_spending(doc: &Document, month: &str) -> Decimal {
    month_budget(doc, month)
        .map(|b| b.nafs)
        .unwrap_or(Decimal::ZERO)
}

/// Balance left at the end of `month` once every flexible transaction is counted.
pub fn month_end_flexible_balance(doc: &Document, month: &str) -> Decimal {
    let Ok(b) = month_budget(doc, month) else {
        return Decimal::ZERO;
    };
    let spent = flex_total(doc, TransactionKind::Expense, &b.month);
    b.opening_balance + b.flex_income - spent
}

/// The previous month's deficit (never a surplus), as a value `<= 0`.
pub fn negative_carryover(doc: &Document, month: &str) -> Decimal {
    match previous_month(month) {
        Ok(prev) => month_end_flexible_balance(doc, &prev).min(Decimal::ZERO),
        Err(_) => Decimal::ZERO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayStatus {
    OnTrack,
    Overspent,
    NoSpending,
}

impl DayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::OnTrack => "On Track",
            DayStatus::Overspent => "Overspent",
            DayStatus::NoSpending => "No spending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub day: u32,
    pub date: NaiveDate,
    pub income: Decimal,
    /// Adaptive target: balance after the day's income spread over the days left.
    pub target: Decimal,
    pub spent: Decimal,
    pub plus_minus: Decimal,
    /// Balance after the day's spending.
    pub cumulative: Decimal,
    pub status: DayStatus,
}

/// Advice for the rest of the month, based on the balance after the last traced day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outlook {
    Depleted {
        overspend: Decimal,
        remaining_days: u32,
    },
    Caution {
        daily_target: Decimal,
        remaining_days: u32,
        balance: Decimal,
    },
    Excellent {
        daily_target: Decimal,
        remaining_days: u32,
        balance: Decimal,
    },
    OnTrack {
        daily_target: Decimal,
        remaining_days: u32,
        balance: Decimal,
    },
    MonthComplete {
        balance: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrace {
    pub budget: MonthBudget,
    pub rows: Vec<DayRow>,
    pub outlook: Option<Outlook>,
}

impl DailyTrace {
    pub fn final_balance(&self) -> Decimal {
        self.rows
            .last()
            .map(|r| r.cumulative)
            .unwrap_or(self.budget.opening_balance)
    }
}

/// Runs the month day by day up to `today` (all days for past months, none for future ones).
pub fn daily_trace(
    doc: &Document,
    month: &str,
    today: NaiveDate,
    include_carryover: bool,
) -> Result<DailyTrace> {
    let span = month_span(month)?;
    let carryover = if include_carryover {
        negative_carryover(doc, &span.label())
    } else {
        Decimal::ZERO
    };
    let budget = build(doc, &span, carryover)?;
    let incomes = daily_totals(doc, TransactionKind::Income, &budget.month);
    let expenses = daily_totals(doc, TransactionKind::Expense, &budget.month);

    let last_day = if today < span.first {
        0
    } else if span.contains(today) {
        today.day()
    } else {
        span.days
    };

    let mut balance = budget.opening_balance;
    let mut rows = Vec::with_capacity(last_day as usize);
    for day in 1..=last_day {
        let Some(date) = span.day(day) else { break };
        let income = incomes.get(&day).copied().unwrap_or(Decimal::ZERO);
        balance += income;

        let remaining_days = Decimal::from(span.days - day + 1);
        let target = if balance > Decimal::ZERO {
            balance / remaining_days
        } else {
            Decimal::ZERO
        };

        let spent = expenses.get(&day).copied().unwrap_or(Decimal::ZERO);
        balance -= spent;
        let plus_minus = target - spent;
        let status = if spent.is_zero() {
            DayStatus::NoSpending
        } else if plus_minus >= Decimal::ZERO {
            DayStatus::OnTrack
        } else {
            DayStatus::Overspent
        };
        rows.push(DayRow {
            day,
            date,
            income,
            target,
            spent,
            plus_minus,
            cumulative: balance,
            status,
        });
    }

    let outlook = outlook_for(&budget, &span, today, balance);
    debug!(month = %budget.month, days = rows.len(), %balance, "daily trace computed");
    Ok(DailyTrace {
        budget,
        rows,
        outlook,
    })
}

fn outlook_for(
    budget: &MonthBudget,
    span: &MonthSpan,
    today: NaiveDate,
    balance: Decimal,
) -> Option<Outlook> {
    if today < span.first {
        return None;
    }
    if today >= span.last {
        return Some(Outlook::MonthComplete { balance });
    }
    let remaining_days = span.days - today.day() + 1;
    if balance <= Decimal::ZERO {
        return Some(Outlook::Depleted {
            overspend: balance.abs(),
            remaining_days,
        });
    }
    let daily_target = balance / Decimal::from(remaining_days);
    let initial = budget.initial_daily_target;
    let outlook = if daily_target <= initial * Decimal::new(7, 1) {
        Outlook::Caution {
            daily_target,
            remaining_days,
            balance,
        }
    } else if daily_target >= initial * Decimal::new(13, 1) {
        Outlook::Excellent {
            daily_target,
            remaining_days,
            balance,
        }
    } else {
        Outlook::OnTrack {
            daily_target,
            remaining_days,
            balance,
        }
    };
    Some(outlook)
}
