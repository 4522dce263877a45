// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetflow::allocation::{CategoryAllocation, save_allocation};
use budgetflow::commands::doctor;
use budgetflow::errors::Error;
use budgetflow::ledger::{
    IncomeKey, NewTransaction, TransactionPatch, add, add_category, add_fixed_cost,
    add_income_entry, by_month, delete, income_entries_for, locate, monthly_totals,
    remove_category, remove_fixed_cost, remove_income_entry, update, update_fixed_cost,
    update_income_entry,
};
use budgetflow::models::{Document, FixedCost, IncomeEntry, TransactionKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_tx(kind: TransactionKind, date: &str, amount: Decimal, category: &str) -> NewTransaction {
    NewTransaction {
        kind,
        date: d(date),
        amount,
        category: category.into(),
        description: String::new(),
    }
}

#[test]
fn add_validates_before_writing() {
    let mut doc = Document::default();
    let err = add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-01", dec!(0), "Food")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-01", dec!(5), "  ")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(doc.expenses.is_empty());

    let tx = add(&mut doc, new_tx(TransactionKind::Income, "2025-03-01", dec!(5), " Gift ")).unwrap();
    assert_eq!(tx.category, "Gift");
    assert_eq!(locate(&doc, &tx.id).unwrap(), (TransactionKind::Income, 0));
}

#[test]
fn ids_are_unique_across_kinds() {
    let mut doc = Document::default();
    let mut ids = std::collections::HashSet::new();
    for i in 0..20 {
        let kind = if i % 2 == 0 { TransactionKind::Expense } else { TransactionKind::Income };
        let tx = add(&mut doc, new_tx(kind, "2025-03-01", dec!(1), "Other")).unwrap();
        assert!(ids.insert(tx.id));
    }
}

#[test]
fn update_keeps_id_and_position() {
    let mut doc = Document::default();
    let a = add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-01", dec!(5), "Food")).unwrap();
    let b = add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-02", dec!(6), "Food")).unwrap();

    let edited = update(
        &mut doc,
        &a.id,
        TransactionPatch {
            amount: Some(dec!(7.5)),
            description: Some("lunch".into()),
            ..TransactionPatch::default()
        },
    )
    .unwrap();
    assert_eq!(edited.id, a.id);
    assert_eq!(doc.expenses[0].amount, dec!(7.5));
    assert_eq!(doc.expenses[1].id, b.id);

    let err = update(
        &mut doc,
        &a.id,
        TransactionPatch {
            amount: Some(dec!(-1)),
            ..TransactionPatch::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(doc.expenses.len(), 2);
}

#[test]
fn kind_change_moves_the_transaction() {
    let mut doc = Document::default();
    let a = add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-01", dec!(5), "Other")).unwrap();
    update(
        &mut doc,
        &a.id,
        TransactionPatch {
            kind: Some(TransactionKind::Income),
            ..TransactionPatch::default()
        },
    )
    .unwrap();
    assert!(doc.expenses.is_empty());
    assert_eq!(doc.incomes.len(), 1);
    assert_eq!(locate(&doc, &a.id).unwrap().0, TransactionKind::Income);

    let (kind, removed) = delete(&mut doc, &a.id).unwrap();
    assert_eq!(kind, TransactionKind::Income);
    assert_eq!(removed.id, a.id);
    assert!(matches!(delete(&mut doc, &a.id), Err(Error::NotFound(_))));
}

#[test]
fn month_listing_is_date_ordered_income_first() {
    let mut doc = Document::default();
    add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-09", dec!(1), "Food")).unwrap();
    add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-02", dec!(2), "Food")).unwrap();
    add(&mut doc, new_tx(TransactionKind::Income, "2025-03-02", dec!(3), "Gift")).unwrap();
    add(&mut doc, new_tx(TransactionKind::Expense, "2025-04-01", dec!(4), "Food")).unwrap();

    let rows = by_month(&doc, "2025-03").unwrap();
    let seen: Vec<(TransactionKind, Decimal)> = rows.iter().map(|r| (r.kind, r.tx.amount)).collect();
    assert_eq!(
        seen,
        vec![
            (TransactionKind::Income, dec!(3)),
            (TransactionKind::Expense, dec!(2)),
            (TransactionKind::Expense, dec!(1)),
        ]
    );
    assert!(matches!(by_month(&doc, "2025-3"), Err(Error::Validation(_))));
}

#[test]
fn monthly_totals_combine_recurring_and_flexible() {
    let mut doc = Document::default();
    add_income_entry(
        &mut doc,
        IncomeEntry {
            description: "Salary".into(),
            amount: dec!(2000),
            start_date: d("2025-01-01"),
            end_date: None,
        },
    )
    .unwrap();
    add_fixed_cost(
        &mut doc,
        FixedCost {
            desc: "Rent".into(),
            amount: dec!(700),
            start_date: None,
            end_date: None,
        },
    )
    .unwrap();
    add(&mut doc, new_tx(TransactionKind::Income, "2025-03-05", dec!(100), "Gift")).unwrap();
    add(&mut doc, new_tx(TransactionKind::Expense, "2025-03-06", dec!(250), "Food")).unwrap();

    let t = monthly_totals(&doc, "2025-03").unwrap();
    assert_eq!(t.income_total, dec!(2100));
    assert_eq!(t.flexible_expenses, dec!(250));
    assert_eq!(t.fixed_cost_total, dec!(700));
    assert_eq!(t.expense_total, dec!(950));
    assert_eq!(t.net, dec!(1150));
}

#[test]
fn categories_are_unique_and_other_is_protected() {
    let mut doc = Document::default();
    let err = add_category(&mut doc, TransactionKind::Expense, "food").unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));

    add_category(&mut doc, TransactionKind::Expense, "Books").unwrap();
    let list = &doc.categories.expense;
    let mut sorted = list.clone();
    sorted.sort();
    assert_eq!(*list, sorted);

    doc.budget_settings
        .category_budgets
        .expense
        .insert("Books".into(), dec!(10));
    remove_category(&mut doc, TransactionKind::Expense, "Books").unwrap();
    assert!(!doc.categories.expense.iter().any(|c| c == "Books"));
    assert!(!doc.budget_settings.category_budgets.expense.contains_key("Books"));

    let err = remove_category(&mut doc, TransactionKind::Income, "Other").unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));
    let err = remove_category(&mut doc, TransactionKind::Income, "Lottery").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn removing_a_category_keeps_the_budget_at_hundred() {
    let mut doc = Document::default();
    let even = CategoryAllocation::from_document(&doc, TransactionKind::Expense);
    save_allocation(&mut doc, &even).unwrap();

    remove_category(&mut doc, TransactionKind::Expense, "Food").unwrap();
    let saved = &doc.budget_settings.category_budgets.expense;
    assert_eq!(saved.len(), 7);
    assert!(!saved.contains_key("Food"));
    let total: Decimal = saved.values().copied().sum();
    assert!((total - dec!(100)).abs() <= dec!(0.01));
    assert!((saved["Other"] - saved["Utilities"]).abs() <= dec!(0.0001));
    assert!(doctor::diagnose(&doc).is_empty());

    // the only funded category goes away, so the rest split evenly
    for (category, pct) in doc.budget_settings.category_budgets.expense.iter_mut() {
        *pct = if category == "Utilities" { dec!(100) } else { Decimal::ZERO };
    }
    remove_category(&mut doc, TransactionKind::Expense, "Utilities").unwrap();
    let saved = &doc.budget_settings.category_budgets.expense;
    assert_eq!(saved.len(), 6);
    let total: Decimal = saved.values().copied().sum();
    assert!((total - dec!(100)).abs() <= dec!(0.01));
    assert!(saved.values().all(|v| *v > Decimal::ZERO));
}

#[test]
fn income_entries_edit_by_key() {
    let mut doc = Document::default();
    let salary = IncomeEntry {
        description: "Salary".into(),
        amount: dec!(3000),
        start_date: d("2024-01-01"),
        end_date: None,
    };
    add_income_entry(&mut doc, salary.clone()).unwrap();

    let err = add_income_entry(
        &mut doc,
        IncomeEntry {
            end_date: Some(d("2023-12-31")),
            ..salary.clone()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let key = IncomeKey {
        description: "Salary".into(),
        amount: dec!(3000),
        start_date: d("2024-01-01"),
    };
    update_income_entry(
        &mut doc,
        &key,
        IncomeEntry {
            end_date: Some(d("2024-12-31")),
            ..salary.clone()
        },
    )
    .unwrap();

    let march = income_entries_for(&doc, "2025-03").unwrap();
    assert_eq!(march.len(), 1);
    assert!(!march[0].1);
    let june = income_entries_for(&doc, "2024-06").unwrap();
    assert!(june[0].1);

    remove_income_entry(&mut doc, &key).unwrap();
    assert!(doc.budget_settings.monthly_income.is_empty());
    assert!(matches!(
        remove_income_entry(&mut doc, &key),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn fixed_costs_edit_by_description_and_amount() {
    let mut doc = Document::default();
    let rent = FixedCost {
        desc: "Rent".into(),
        amount: dec!(800),
        start_date: None,
        end_date: None,
    };
    add_fixed_cost(&mut doc, rent.clone()).unwrap();
    assert!(matches!(
        add_fixed_cost(
            &mut doc,
            FixedCost {
                desc: " ".into(),
                ..rent.clone()
            }
        ),
        Err(Error::Validation(_))
    ));

    update_fixed_cost(
        &mut doc,
        "Rent",
        dec!(800),
        FixedCost {
            amount: dec!(850),
            start_date: Some(d("2025-01-01")),
            ..rent.clone()
        },
    )
    .unwrap();
    assert_eq!(doc.budget_settings.fixed_costs[0].amount, dec!(850));
    assert!(matches!(
        remove_fixed_cost(&mut doc, "Rent", dec!(800)),
        Err(Error::NotFound(_))
    ));
    remove_fixed_cost(&mut doc, "Rent", dec!(850)).unwrap();
    assert!(doc.budget_settings.fixed_costs.is_empty());
}
