// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use budgetflow::allocation::{AutoAssign, CategoryAllocation, auto_assign, save_allocation};
use budgetflow::errors::Error;
use budgetflow::models::{Document, IncomeEntry, Transaction, TransactionKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.0001)
}

fn expense(id: &str, date: &str, amount: Decimal, category: &str) -> Transaction {
    Transaction {
        id: id.into(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        amount,
        category: category.into(),
        description: String::new(),
    }
}

/// Food / Fun / Other with 1000 to spend in every month.
fn doc_with_nafs_1000() -> Document {
    let mut doc = Document::default();
    doc.categories.expense = names(&["Food", "Fun", "Other"]);
    doc.budget_settings.monthly_income.push(IncomeEntry {
        description: "Salary".into(),
        amount: dec!(1000),
        start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        end_date: None,
    });
    doc
}

#[test]
fn fresh_allocation_splits_evenly() {
    let alloc = CategoryAllocation::initialize(
        TransactionKind::Expense,
        &names(&["A", "B", "C", "D"]),
        &BTreeMap::new(),
    );
    assert!(alloc.shares().iter().all(|(_, v)| *v == dec!(25)));
    assert!(alloc.is_balanced());
}

#[test]
fn new_categories_enter_at_zero_without_normalizing() {
    let mut saved = BTreeMap::new();
    saved.insert("A".to_string(), dec!(60));
    saved.insert("B".to_string(), dec!(30));
    let alloc = CategoryAllocation::initialize(
        TransactionKind::Expense,
        &names(&["A", "B", "C"]),
        &saved,
    );
    assert_eq!(alloc.get("A"), Some(dec!(60)));
    assert_eq!(alloc.get("C"), Some(Decimal::ZERO));
    assert_eq!(alloc.total(), dec!(90));
    assert!(!alloc.is_balanced());
}

#[test]
fn adjust_compensates_proportionally() {
    let mut saved = BTreeMap::new();
    saved.insert("A".to_string(), dec!(25));
    saved.insert("B".to_string(), dec!(50));
    saved.insert("C".to_string(), dec!(25));
    let mut alloc =
        CategoryAllocation::initialize(TransactionKind::Expense, &names(&["A", "B", "C"]), &saved);

    alloc.adjust("A", dec!(40)).unwrap();
    assert_eq!(alloc.get("A"), Some(dec!(40)));
    // B held twice C's share, so it gives up twice as much of the 15
    assert!(close(alloc.get("B").unwrap(), dec!(40)));
    assert!(close(alloc.get("C").unwrap(), dec!(20)));
    assert!(alloc.is_balanced());
}

#[test]
fn adjust_spreads_evenly_when_others_are_empty() {
    let mut saved = BTreeMap::new();
    saved.insert("A".to_string(), dec!(100));
    let mut alloc =
        CategoryAllocation::initialize(TransactionKind::Expense, &names(&["A", "B", "C", "D"]), &saved);

    alloc.adjust("A", dec!(70)).unwrap();
    for cat in ["B", "C", "D"] {
        assert_eq!(alloc.get(cat), Some(dec!(10)));
    }
    assert!(alloc.is_balanced());
}

#[test]
fn adjust_clamps_to_percent_range() {
    let mut alloc = CategoryAllocation::initialize(
        TransactionKind::Expense,
        &names(&["A", "B"]),
        &BTreeMap::new(),
    );
    alloc.adjust("A", dec!(150)).unwrap();
    assert_eq!(alloc.get("A"), Some(dec!(100)));
    assert_eq!(alloc.get("B"), Some(Decimal::ZERO));

    alloc.adjust("A", dec!(-5)).unwrap();
    assert_eq!(alloc.get("A"), Some(Decimal::ZERO));
    assert_eq!(alloc.get("B"), Some(dec!(100)));
}

#[test]
fn adjust_unknown_category_is_not_found() {
    let mut alloc = CategoryAllocation::initialize(
        TransactionKind::Expense,
        &names(&["A"]),
        &BTreeMap::new(),
    );
    let err = alloc.adjust("Missing", dec!(10)).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn normalize_rescales_to_hundred() {
    let mut alloc = CategoryAllocation::initialize(
        TransactionKind::Income,
        &names(&["A", "B", "C"]),
        &BTreeMap::new(),
    );
    let mut shares = BTreeMap::new();
    shares.insert("A".to_string(), dec!(50));
    shares.insert("B".to_string(), dec!(30));
    shares.insert("C".to_string(), dec!(40));
    alloc.apply(&shares);
    assert_eq!(alloc.total(), dec!(120));

    alloc.normalize();
    assert!(alloc.is_balanced());
    assert_eq!(alloc.get("B"), Some(dec!(25)));
}

#[test]
fn unbalanced_save_is_refused_and_balanced_save_persists() {
    let mut doc = doc_with_nafs_1000();
    let mut alloc = CategoryAllocation::from_document(&doc, TransactionKind::Expense);
    let mut shares = BTreeMap::new();
    shares.insert("Food".to_string(), dec!(90));
    alloc.apply(&shares);

    let err = save_allocation(&mut doc, &alloc).unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));
    assert!(doc.budget_settings.category_budgets.expense.is_empty());

    alloc.normalize();
    save_allocation(&mut doc, &alloc).unwrap();
    let saved = &doc.budget_settings.category_budgets.expense;
    assert_eq!(saved.len(), 3);
    let total: Decimal = saved.values().copied().sum();
    assert!((total - dec!(100)).abs() <= dec!(0.01));
}

#[test]
fn monetary_share_follows_nafs() {
    let doc = doc_with_nafs_1000();
    let mut alloc = CategoryAllocation::from_document(&doc, TransactionKind::Expense);
    let mut shares = BTreeMap::new();
    shares.insert("Food".to_string(), dec!(50));
    shares.insert("Fun".to_string(), dec!(30));
    shares.insert("Other".to_string(), dec!(20));
    alloc.apply(&shares);

    let amounts = alloc.amounts(dec!(1000));
    let food = amounts.iter().find(|(c, _, _)| c == "Food").unwrap();
    assert_eq!(food.2, dec!(500));
}

#[test]
fn auto_assign_under_budget_leaves_rest_unallocated() {
    let mut doc = doc_with_nafs_1000();
    doc.expenses.push(expense("e1", "2025-03-04", dec!(100), "Food"));
    doc.expenses.push(expense("e2", "2025-03-09", dec!(100), "Fun"));
    let categories = doc.categories.expense.clone();

    let (percentages, total_spent, nafs, unallocated_pct, unallocated_amount) =
        match auto_assign(&doc, "2025-03", &categories).unwrap() {
            AutoAssign::UnderBudget {
                percentages,
                total_spent,
                nafs,
                unallocated_pct,
                unallocated_amount,
            } => (percentages, total_spent, nafs, unallocated_pct, unallocated_amount),
            other => panic!("expected under-budget outcome, got {:?}", other),
        };
    assert_eq!(percentages["Food"], dec!(10));
    assert_eq!(percentages["Fun"], dec!(10));
    assert_eq!(percentages["Other"], Decimal::ZERO);
    assert_eq!(total_spent, dec!(200));
    assert_eq!(nafs, dec!(1000));
    assert_eq!(unallocated_pct, dec!(80));
    assert_eq!(unallocated_amount, dec!(800));

    let mut alloc = CategoryAllocation::from_document(&doc, TransactionKind::Expense);
    alloc.apply(&percentages);
    assert!(save_allocation(&mut doc, &alloc).is_err());
}

#[test]
fn auto_assign_overspent_fills_hundred() {
    let mut doc = doc_with_nafs_1000();
    doc.expenses.push(expense("e1", "2025-03-04", dec!(900), "Food"));
    doc.expenses.push(expense("e2", "2025-03-09", dec!(300), "Fun"));
    let categories = doc.categories.expense.clone();

    match auto_assign(&doc, "2025-03", &categories).unwrap() {
        AutoAssign::Overspent {
            percentages,
            over_amount,
            ..
        } => {
            assert_eq!(percentages["Food"], dec!(75));
            assert_eq!(percentages["Fun"], dec!(25));
            assert_eq!(over_amount, dec!(200));
        }
        other => panic!("expected overspent outcome, got {:?}", other),
    }
}

#[test]
fn auto_assign_refuses_without_spend_or_budget() {
    let mut doc = doc_with_nafs_1000();
    let categories = doc.categories.expense.clone();
    assert_eq!(
        auto_assign(&doc, "2025-03", &categories).unwrap(),
        AutoAssign::NothingToAssign
    );

    doc.expenses.push(expense("e1", "2025-03-04", dec!(50), "Food"));
    doc.budget_settings.daily_savings_goal = dec!(100);
    assert_eq!(
        auto_assign(&doc, "2025-03", &categories).unwrap(),
        AutoAssign::NoFlexibleBudget
    );
}
