// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Percentage budgets per category.
//!
//! An allocation is edited as a session: load it from the document, move
//! shares around with [`CategoryAllocation::adjust`], then persist it with
//! [`save_allocation`], which only accepts a total of 100% (within 0.01).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::budget::net_available_for_spending;
use crate::errors::{Error, Result};
use crate::models::{Document, TransactionKind};
use crate::utils::month_span;

pub const PCT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn clamp_pct(v: Decimal) -> Decimal {
    v.max(Decimal::ZERO).min(HUNDRED)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAllocation {
    pub kind: TransactionKind,
    shares: Vec<(String, Decimal)>,
}

impl CategoryAllocation {
    /// Nothing saved: 100 split evenly. Otherwise saved values are kept as-is and
    /// categories added since enter at 0; no normalization happens here.
    pub fn initialize(
        kind: TransactionKind,
        categories: &[String],
        saved: &BTreeMap<String, Decimal>,
    ) -> Self {
        let shares = if saved.is_empty() {
            if categories.is_empty() {
                Vec::new()
            } else {
                let even = HUNDRED / Decimal::from(categories.len());
                categories.iter().map(|c| (c.clone(), even)).collect()
            }
        } else {
            categories
                .iter()
                .map(|c| (c.clone(), saved.get(c).copied().unwrap_or(Decimal::ZERO)))
                .collect()
        };
        CategoryAllocation { kind, shares }
    }

    pub fn from_document(doc: &Document, kind: TransactionKind) -> Self {
        Self::initialize(
            kind,
            doc.categories(kind),
            doc.budget_settings.category_budgets.get(kind),
        )
    }

    pub fn shares(&self) -> &[(String, Decimal)] {
        &self.shares
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.shares
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, v)| *v)
    }

    pub fn total(&self) -> Decimal {
        self.shares.iter().map(|(_, v)| *v).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.shares.is_empty() || (self.total() - HUNDRED).abs() <= PCT_TOLERANCE
    }

    /// Moves `category` to `new_value` and hands the difference to the others:
    /// proportionally to their current shares, or evenly when they are all zero.
    /// Every share stays within [0, 100], so the total can drift from 100 until
    /// [`normalize`](Self::normalize) runs.
    ///
    /// Compensation writes the other shares directly; it never re-enters
    /// `adjust`, so only the outermost change drives a redistribution.
    pub fn adjust(&mut self, category: &str, new_value: Decimal) -> Result<()> {
        let idx = self
            .shares
            .iter()
            .position(|(c, _)| c == category)
            .ok_or_else(|| Error::not_found(format!("Category '{}' has no budget share", category)))?;
        let new_value = clamp_pct(new_value);
        let old_value = self.shares[idx].1;
        let delta = new_value - old_value;
        self.shares[idx].1 = new_value;

        let others = self.shares.len() - 1;
        if others == 0 || delta.is_zero() {
            return Ok(());
        }
        let other_total: Decimal = self
            .shares
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, (_, v))| *v)
            .sum();

        for (i, (_, v)) in self.shares.iter_mut().enumerate() {
            if i == idx {
                continue;
            }
            let adj = if other_total > Decimal::ZERO {
                delta * (*v / other_total)
            } else {
                delta / Decimal::from(others)
            };
            *v = clamp_pct(*v - adj);
        }
        debug!(kind = %self.kind, category, %old_value, %new_value, total = %self.total(), "share adjusted");
        Ok(())
    }

    /// Rescales every share by `100 / total` when the total is off by more than 0.01.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total.is_zero() || (total - HUNDRED).abs() <= PCT_TOLERANCE {
            return;
        }
        for (_, v) in self.shares.iter_mut() {
            *v = *v / total * HUNDRED;
        }
    }

    /// Overwrites shares with `percentages`; categories not listed keep their value.
    pub fn apply(&mut self, percentages: &BTreeMap<String, Decimal>) {
        for (c, v) in self.shares.iter_mut() {
            if let Some(p) = percentages.get(c) {
                *v = clamp_pct(*p);
            }
        }
    }

    /// Monetary value of each share against the month's NAFS.
    pub fn amounts(&self, nafs: Decimal) -> Vec<(String, Decimal, Decimal)> {
        self.shares
            .iter()
            .map(|(c, v)| (c.clone(), *v, *v / HUNDRED * nafs))
            .collect()
    }

    pub fn to_map(&self) -> BTreeMap<String, Decimal> {
        self.shares.iter().cloned().collect()
    }
}

/// Persists `alloc` for its kind. Refused unless the shares sum to 100 (within 0.01).
pub fn save_allocation(doc: &mut Document, alloc: &CategoryAllocation) -> Result<()> {
    if !alloc.is_balanced() {
        warn!(kind = %alloc.kind, total = %alloc.total(), "refusing unbalanced budget save");
        return Err(Error::constraint(format!(
            "{} budget totals {:.2}%, it must total 100% before saving",
            alloc.kind,
            alloc.total()
        )));
    }
    *doc.budget_settings.category_budgets.get_mut(alloc.kind) = alloc.to_map();
    info!(kind = %alloc.kind, categories = alloc.shares.len(), "category budgets saved");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AutoAssign {
    /// No expenses in the month for the listed categories.
    NothingToAssign,
    /// NAFS is zero for the month.
    NoFlexibleBudget,
    /// Spend fits the budget; shares are spend / NAFS and the rest is left unallocated.
    UnderBudget {
        percentages: BTreeMap<String, Decimal>,
        total_spent: Decimal,
        nafs: Decimal,
        unallocated_pct: Decimal,
        unallocated_amount: Decimal,
    },
    /// Spend exceeds the budget; shares follow actual spend and fill 100%.
    Overspent {
        percentages: BTreeMap<String, Decimal>,
        total_spent: Decimal,
        nafs: Decimal,
        over_amount: Decimal,
    },
}

/// Expense shares derived from what was actually spent in `month`.
pub fn auto_assign(doc: &Document, month: &str, categories: &[String]) -> Result<AutoAssign> {
    let span = month_span(month)?;
    let month = span.label();
    let mut spend: BTreeMap<String, Decimal> =
        categories.iter().map(|c| (c.clone(), Decimal::ZERO)).collect();
    for e in doc.in_month(TransactionKind::Expense, &month) {
        if let Some(total) = spend.get_mut(&e.category) {
            *total += e.amount;
        }
    }
    let total_spent: Decimal = spend.values().copied().sum();
    if total_spent.is_zero() {
        return Ok(AutoAssign::NothingToAssign);
    }
    let nafs = net_available_for_spending(doc, &month);
    if nafs <= Decimal::ZERO {
        return Ok(AutoAssign::NoFlexibleBudget);
    }

    if total_spent <= nafs {
        let percentages: BTreeMap<String, Decimal> = spend
            .iter()
            .map(|(c, s)| (c.clone(), *s / nafs * HUNDRED))
            .collect();
        let assigned: Decimal = percentages.values().copied().sum();
        Ok(AutoAssign::UnderBudget {
            percentages,
            total_spent,
            nafs,
            unallocated_pct: HUNDRED - assigned,
            unallocated_amount: nafs - total_spent,
        })
    } else {
        let percentages = spend
            .iter()
            .map(|(c, s)| (c.clone(), *s / total_spent * HUNDRED))
            .collect();
        Ok(AutoAssign::Overspent {
            percentages,
            total_spent,
            nafs,
            over_amount: total_spent - nafs,
        })
    }
}
