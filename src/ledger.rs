// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dated income and expense records, the category lists they point at, and
//! the time-ranged base income and fixed cost settings.
//!
//! Every operation validates its whole input before touching the document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::allocation::CategoryAllocation;
use crate::budget::month_budget;
use crate::errors::{Error, Result};
use crate::models::{
    Document, FixedCost, IncomeEntry, PROTECTED_CATEGORY, Transaction, TransactionKind,
};
use crate::resolver::income_active_in;
use crate::utils::month_span;

fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation("Amount must be positive"));
    }
    Ok(())
}

fn check_category(category: &str) -> Result<String> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::validation("Category cannot be empty"));
    }
    Ok(category.to_string())
}

fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            return Err(Error::validation(format!(
                "End date {} is before start date {}",
                e, s
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
}

pub fn add(doc: &mut Document, new: NewTransaction) -> Result<Transaction> {
    check_amount(new.amount)?;
    let category = check_category(&new.category)?;
    let tx = Transaction {
        id: Uuid::new_v4().to_string(),
        date: new.date,
        amount: new.amount,
        category,
        description: new.description.trim().to_string(),
    };
    doc.transactions_mut(new.kind).push(tx.clone());
    info!(kind = %new.kind, id = %tx.id, amount = %tx.amount, "transaction added");
    Ok(tx)
}

/// Where a transaction id lives.
pub fn locate(doc: &Document, id: &str) -> Result<(TransactionKind, usize)> {
    TransactionKind::ALL
        .iter()
        .find_map(|k| {
            doc.transactions(*k)
                .iter()
                .position(|t| t.id == id)
                .map(|i| (*k, i))
        })
        .ok_or_else(|| Error::not_found(format!("Transaction '{}'", id)))
}

#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Edits a transaction in place, keeping its id. Changing the kind moves it to the other list.
pub fn update(doc: &mut Document, id: &str, patch: TransactionPatch) -> Result<Transaction> {
    let (kind, idx) = locate(doc, id)?;
    if let Some(amount) = patch.amount {
        check_amount(amount)?;
    }
    let category = patch.category.as_deref().map(check_category).transpose()?;

    let mut tx = doc.transactions_mut(kind).remove(idx);
    if let Some(date) = patch.date {
        tx.date = date;
    }
    if let Some(amount) = patch.amount {
        tx.amount = amount;
    }
    if let Some(category) = category {
        tx.category = category;
    }
    if let Some(description) = patch.description {
        tx.description = description.trim().to_string();
    }
    let target = patch.kind.unwrap_or(kind);
    if target == kind {
        doc.transactions_mut(kind).insert(idx, tx.clone());
    } else {
        doc.transactions_mut(target).push(tx.clone());
    }
    info!(id, kind = %target, "transaction updated");
    Ok(tx)
}

pub fn delete(doc: &mut Document, id: &str) -> Result<(TransactionKind, Transaction)> {
    let (kind, idx) = locate(doc, id)?;
    let tx = doc.transactions_mut(kind).remove(idx);
    info!(id, %kind, "transaction deleted");
    Ok((kind, tx))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub kind: TransactionKind,
    #[serde(flatten)]
    pub tx: Transaction,
}

/// Both kinds for `month`, sorted by date (income before expense on the same day).
pub fn by_month(doc: &Document, month: &str) -> Result<Vec<LedgerRow>> {
    let month = month_span(month)?.label();
    let mut rows: Vec<LedgerRow> = TransactionKind::ALL
        .iter()
        .flat_map(|&kind| {
            doc.in_month(kind, &month).map(move |t| LedgerRow {
                kind,
                tx: t.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.tx.date.cmp(&b.tx.date).then(b.kind.cmp(&a.kind)));
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: String,
    /// Base income plus flexible income.
    pub income_total: Decimal,
    /// Flexible expenses plus fixed costs.
    pub expense_total: Decimal,
    pub flexible_expenses: Decimal,
    pub fixed_cost_total: Decimal,
    pub net: Decimal,
}

pub fn monthly_totals(doc: &Document, month: &str) -> Result<MonthlyTotals> {
    let b = month_budget(doc, month)?;
    let flexible_expenses: Decimal = doc
        .in_month(TransactionKind::Expense, &b.month)
        .map(|t| t.amount)
        .sum();
    let expense_total = flexible_expenses + b.fixed_costs;
    Ok(MonthlyTotals {
        income_total: b.total_income,
        expense_total,
        flexible_expenses,
        fixed_cost_total: b.fixed_costs,
        net: b.total_income - expense_total,
        month: b.month,
    })
}

/// Adds a category to `kind`'s list, kept sorted; names are unique ignoring case.
pub fn add_category(doc: &mut Document, kind: TransactionKind, name: &str) -> Result<String> {
    let name = check_category(name)?;
    let list = doc.categories.get_mut(kind);
    if list.iter().any(|c| c.eq_ignore_ascii_case(&name)) {
        return Err(Error::constraint(format!(
            "{} category '{}' already exists",
            kind, name
        )));
    }
    list.push(name.clone());
    list.sort();
    info!(%kind, category = %name, "category added");
    Ok(name)
}

/// Removes a category and its budget share, rescaling the other saved shares
/// back to 100%. Transactions keep the old name.
pub fn remove_category(doc: &mut Document, kind: TransactionKind, name: &str) -> Result<()> {
    let name = name.trim();
    if name == PROTECTED_CATEGORY {
        return Err(Error::constraint(format!(
            "The '{}' category cannot be removed",
            PROTECTED_CATEGORY
        )));
    }
    let list = doc.categories.get_mut(kind);
    let idx = list
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| Error::not_found(format!("{} category '{}'", kind, name)))?;
    list.remove(idx);
    let saved = doc.budget_settings.category_budgets.get_mut(kind);
    saved.remove(name);
    if !saved.is_empty() {
        // Remaining shares are rescaled so the saved budget still totals 100%.
        let mut alloc = CategoryAllocation::from_document(doc, kind);
        if alloc.total().is_zero() {
            alloc = CategoryAllocation::initialize(kind, doc.categories(kind), &Default::default());
        }
        alloc.normalize();
        *doc.budget_settings.category_budgets.get_mut(kind) = alloc.to_map();
    }
    info!(%kind, category = name, "category removed");
    Ok(())
}

/// Income entries are addressed by the tuple they were created with.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeKey {
    pub description: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
}

impl IncomeKey {
    pub fn matches(&self, e: &IncomeEntry) -> bool {
        e.description == self.description
            && e.amount == self.amount
            && e.start_date == self.start_date
    }
}

fn income_index(doc: &Document, key: &IncomeKey) -> Result<usize> {
    doc.budget_settings
        .monthly_income
        .iter()
        .position(|e| key.matches(e))
        .ok_or_else(|| {
            Error::not_found(format!(
                "Income entry '{}' {} from {}",
                key.description, key.amount, key.start_date
            ))
        })
}

fn check_income(entry: &IncomeEntry) -> Result<()> {
    check_amount(entry.amount)?;
    check_range(Some(entry.start_date), entry.end_date)
}

pub fn add_income_entry(doc: &mut Document, entry: IncomeEntry) -> Result<IncomeEntry> {
    check_income(&entry)?;
    let entry = IncomeEntry {
        description: entry.description.trim().to_string(),
        ..entry
    };
    doc.budget_settings.monthly_income.push(entry.clone());
    info!(description = %entry.description, amount = %entry.amount, start = %entry.start_date, "income entry added");
    Ok(entry)
}

pub fn update_income_entry(
    doc: &mut Document,
    key: &IncomeKey,
    entry: IncomeEntry,
) -> Result<IncomeEntry> {
    let idx = income_index(doc, key)?;
    check_income(&entry)?;
    let entry = IncomeEntry {
        description: entry.description.trim().to_string(),
        ..entry
    };
    doc.budget_settings.monthly_income[idx] = entry.clone();
    info!(description = %entry.description, "income entry updated");
    Ok(entry)
}

pub fn remove_income_entry(doc: &mut Document, key: &IncomeKey) -> Result<IncomeEntry> {
    let idx = income_index(doc, key)?;
    let removed = doc.budget_settings.monthly_income.remove(idx);
    info!(description = %removed.description, "income entry removed");
    Ok(removed)
}

/// Every income entry with whether it counts toward `month`.
pub fn income_entries_for(doc: &Document, month: &str) -> Result<Vec<(IncomeEntry, bool)>> {
    let span = month_span(month)?;
    Ok(doc
        .budget_settings
        .monthly_income
        .iter()
        .map(|e| (e.clone(), income_active_in(e, &span)))
        .collect())
}

fn fixed_index(doc: &Document, desc: &str, amount: Decimal) -> Result<usize> {
    doc.budget_settings
        .fixed_costs
        .iter()
        .position(|c| c.desc == desc && c.amount == amount)
        .ok_or_else(|| Error::not_found(format!("Fixed cost '{}' {}", desc, amount)))
}

fn check_fixed(cost: &FixedCost) -> Result<()> {
    if cost.desc.trim().is_empty() {
        return Err(Error::validation("Fixed cost description cannot be empty"));
    }
    check_amount(cost.amount)?;
    check_range(cost.start_date, cost.end_date)
}

pub fn add_fixed_cost(doc: &mut Document, cost: FixedCost) -> Result<FixedCost> {
    check_fixed(&cost)?;
    let cost = FixedCost {
        desc: cost.desc.trim().to_string(),
        ..cost
    };
    doc.budget_settings.fixed_costs.push(cost.clone());
    info!(desc = %cost.desc, amount = %cost.amount, "fixed cost added");
    Ok(cost)
}

pub fn update_fixed_cost(
    doc: &mut Document,
    desc: &str,
    amount: Decimal,
    cost: FixedCost,
) -> Result<FixedCost> {
    let idx = fixed_index(doc, desc, amount)?;
    check_fixed(&cost)?;
    let cost = FixedCost {
        desc: cost.desc.trim().to_string(),
        ..cost
    };
    doc.budget_settings.fixed_costs[idx] = cost.clone();
    info!(desc = %cost.desc, "fixed cost updated");
    Ok(cost)
}

pub fn remove_fixed_cost(doc: &mut Document, desc: &str, amount: Decimal) -> Result<FixedCost> {
    let idx = fixed_index(doc, desc, amount)?;
    let removed = doc.budget_settings.fixed_costs.remove(idx);
    info!(desc = %removed.desc, "fixed cost removed");
    Ok(removed)
}
