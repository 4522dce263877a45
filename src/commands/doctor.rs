// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::allocation::PCT_TOLERANCE;
use crate::models::{Document, TransactionKind};
use crate::store::Store;
use crate::utils::pretty_table;

/// `(issue, detail)` pairs for every broken invariant in `doc`.
pub fn diagnose(doc: &Document) -> Vec<(String, String)> {
    let mut issues = Vec::new();

    // 1) Duplicate transaction ids
    let mut seen = HashSet::new();
    for t in doc.expenses.iter().chain(doc.incomes.iter()) {
        if !seen.insert(t.id.as_str()) {
            issues.push(("duplicate_txn_id".into(), t.id.clone()));
        }
    }

    // 2) Saved category budgets that do not total 100
    for kind in TransactionKind::ALL {
        let saved = doc.budget_settings.category_budgets.get(kind);
        if saved.is_empty() {
            continue;
        }
        let total: Decimal = saved.values().copied().sum();
        if (total - Decimal::ONE_HUNDRED).abs() > PCT_TOLERANCE {
            issues.push(("budget_not_100".into(), format!("{} totals {}", kind, total)));
        }
    }

    // 3) Goals holding more than the Savings balance
    let s = &doc.budget_settings;
    if s.total_allocated() > s.savings_balance {
        issues.push((
            "goals_overdraw_savings".into(),
            format!("{} allocated of {}", s.total_allocated(), s.savings_balance),
        ));
    }

    // 4) Completion dates out of step with allocations
    for g in &s.savings_goals {
        if g.is_complete() != g.completion_date.is_some() {
            issues.push(("goal_completion_mismatch".into(), g.name.clone()));
        }
    }

    // 5) Snapshot dates and net worth sums
    for pair in s.asset_snapshots.windows(2) {
        if pair[0].date >= pair[1].date {
            issues.push(("snapshot_order".into(), pair[1].date.to_string()));
        }
    }
    for snap in &s.asset_snapshots {
        let sum = snap.bank_balance
            + snap.wallet_balance
            + snap.savings_balance
            + snap.investment_balance
            + snap.money_lent_balance;
        if sum != snap.net_worth {
            issues.push((
                "snapshot_net_worth".into(),
                format!("{}: {} != {}", snap.date, snap.net_worth, sum),
            ));
        }
    }
    issues
}

pub fn handle(store: &Store) -> Result<()> {
    let rows: Vec<Vec<String>> = diagnose(store.document())
        .into_iter()
        .map(|(issue, detail)| vec![issue, detail])
        .collect();
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
