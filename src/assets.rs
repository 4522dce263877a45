// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Account balances, dated net-worth snapshots and the money-lent register.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{AccountKind, AssetSnapshot, BudgetSettings, Document, Loan};

pub fn current_net_worth(settings: &BudgetSettings) -> Decimal {
    AccountKind::ALL.iter().map(|k| settings.balance(*k)).sum()
}

/// Sets one account balance. Savings may not drop below what goals already hold.
pub fn set_balance(doc: &mut Document, kind: AccountKind, amount: Decimal) -> Result<()> {
    let settings = &mut doc.budget_settings;
    if kind == AccountKind::Savings && amount < settings.total_allocated() {
        warn!(%amount, allocated = %settings.total_allocated(), "savings balance below goal allocations refused");
        return Err(Error::constraint(format!(
            "Savings balance {:.2} is below the {:.2} allocated to goals",
            amount,
            settings.total_allocated()
        )));
    }
    *settings.balance_mut(kind) = amount;
    info!(account = %kind, %amount, "balance set");
    Ok(())
}

pub fn set_daily_savings_goal(doc: &mut Document, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::validation("Daily savings goal cannot be negative"));
    }
    doc.budget_settings.daily_savings_goal = amount;
    info!(%amount, "daily savings goal set");
    Ok(())
}

/// Captures every balance on `date`, replacing any snapshot already taken that day.
pub fn record_snapshot(doc: &mut Document, date: NaiveDate, note: &str) -> AssetSnapshot {
    let s = &doc.budget_settings;
    let snap = AssetSnapshot {
        date,
        bank_balance: s.bank_account_balance,
        wallet_balance: s.wallet_balance,
        savings_balance: s.savings_balance,
        investment_balance: s.investment_balance,
        money_lent_balance: s.money_lent_balance,
        net_worth: current_net_worth(s),
        note: note.trim().to_string(),
    };
    let snapshots = &mut doc.budget_settings.asset_snapshots;
    match snapshots.binary_search_by_key(&date, |s| s.date) {
        Ok(idx) => {
            snapshots[idx] = snap.clone();
            info!(%date, net_worth = %snap.net_worth, "snapshot overwritten");
        }
        Err(idx) => {
            snapshots.insert(idx, snap.clone());
            info!(%date, net_worth = %snap.net_worth, "snapshot recorded");
        }
    }
    snap
}

/// Snapshots within `[from, to]`, either bound open.
pub fn snapshots_in_range(
    doc: &Document,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&AssetSnapshot> {
    doc.budget_settings
        .asset_snapshots
        .iter()
        .filter(|s| from.is_none_or(|f| s.date >= f) && to.is_none_or(|t| s.date <= t))
        .collect()
}

pub fn delete_snapshot(doc: &mut Document, date: NaiveDate) -> Result<AssetSnapshot> {
    let snapshots = &mut doc.budget_settings.asset_snapshots;
    let idx = snapshots
        .iter()
        .position(|s| s.date == date)
        .ok_or_else(|| Error::not_found(format!("Snapshot for {}", date)))?;
    info!(%date, "snapshot deleted");
    Ok(snapshots.remove(idx))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorthChange {
    pub months_back: u32,
    pub past_date: NaiveDate,
    pub current: Decimal,
    pub past: Decimal,
    pub change: Decimal,
    pub change_pct: Decimal,
}

/// Current net worth against the latest snapshot taken on or before `today - months_back`.
/// `None` when no snapshot is old enough.
pub fn net_worth_change(doc: &Document, months_back: u32, today: NaiveDate) -> Option<NetWorthChange> {
    let target = today.checked_sub_months(Months::new(months_back))?;
    let past = doc
        .budget_settings
        .asset_snapshots
        .iter()
        .filter(|s| s.date <= target)
        .max_by_key(|s| s.date)?;
    let current = current_net_worth(&doc.budget_settings);
    let change = current - past.net_worth;
    let change_pct = if past.net_worth.is_zero() {
        Decimal::ZERO
    } else {
        change / past.net_worth.abs() * Decimal::ONE_HUNDRED
    };
    debug!(months_back, past = %past.net_worth, %current, "net worth change");
    Some(NetWorthChange {
        months_back,
        past_date: past.date,
        current,
        past: past.net_worth,
        change,
        change_pct,
    })
}

pub const CHANGE_PERIODS: [u32; 4] = [1, 3, 6, 12];

/// Share of each positive balance in the sum of positive balances.
pub fn allocation_percentages(settings: &BudgetSettings) -> Vec<(AccountKind, Decimal, Decimal)> {
    let positive: Vec<(AccountKind, Decimal)> = AccountKind::ALL
        .iter()
        .map(|k| (*k, settings.balance(*k)))
        .filter(|(_, v)| *v > Decimal::ZERO)
        .collect();
    let total: Decimal = positive.iter().map(|(_, v)| *v).sum();
    if total.is_zero() {
        return Vec::new();
    }
    positive
        .into_iter()
        .map(|(k, v)| (k, v, v / total * Decimal::ONE_HUNDRED))
        .collect()
}

pub fn lend(
    doc: &mut Document,
    borrower: &str,
    amount: Decimal,
    description: &str,
    date: NaiveDate,
) -> Result<Loan> {
    let borrower = borrower.trim();
    if borrower.is_empty() {
        return Err(Error::validation("Borrower cannot be empty"));
    }
    if amount.is_zero() {
        return Err(Error::validation("Loan amount cannot be zero"));
    }
    let loan = Loan {
        id: Uuid::new_v4().to_string(),
        borrower: borrower.to_string(),
        amount,
        description: description.trim().to_string(),
        date,
    };
    doc.budget_settings.money_lent_balance += amount;
    doc.budget_settings.loans.push(loan.clone());
    info!(borrower = %loan.borrower, %amount, "loan recorded");
    Ok(loan)
}

fn loan_index(doc: &Document, id: &str) -> Result<usize> {
    doc.budget_settings
        .loans
        .iter()
        .position(|l| l.id == id)
        .ok_or_else(|| Error::not_found(format!("Loan '{}'", id)))
}

#[derive(Debug, Clone, Default)]
pub struct LoanPatch {
    pub borrower: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Edits a loan; a changed amount moves the Money Lent balance by the difference.
pub fn update_loan(doc: &mut Document, id: &str, patch: LoanPatch) -> Result<Loan> {
    let idx = loan_index(doc, id)?;
    if patch.borrower.as_deref().is_some_and(|b| b.trim().is_empty()) {
        return Err(Error::validation("Borrower cannot be empty"));
    }
    if patch.amount.is_some_and(|a| a.is_zero()) {
        return Err(Error::validation("Loan amount cannot be zero"));
    }
    let settings = &mut doc.budget_settings;
    let loan = &mut settings.loans[idx];
    if let Some(amount) = patch.amount {
        settings.money_lent_balance += amount - loan.amount;
        loan.amount = amount;
    }
    if let Some(borrower) = patch.borrower {
        loan.borrower = borrower.trim().to_string();
    }
    if let Some(description) = patch.description {
        loan.description = description.trim().to_string();
    }
    if let Some(date) = patch.date {
        loan.date = date;
    }
    info!(id, "loan updated");
    Ok(loan.clone())
}

pub fn mark_returned(doc: &mut Document, id: &str) -> Result<Loan> {
    let idx = loan_index(doc, id)?;
    let loan = doc.budget_settings.loans.remove(idx);
    doc.budget_settings.money_lent_balance -= loan.amount;
    info!(borrower = %loan.borrower, amount = %loan.amount, "loan returned");
    Ok(loan)
}
