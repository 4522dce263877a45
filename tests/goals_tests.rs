// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetflow::errors::Error;
use budgetflow::goals::{
    self, CompletionEstimate, GoalPatch, NewGoal, add_savings, allocate, auto_distribute,
    create_goal, delete_goal, estimate_completion, find_goal, unallocated, update_goal,
};
use budgetflow::models::{Document, GoalPriority};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn goal(name: &str, target: Decimal, allocated: Decimal, priority: GoalPriority) -> NewGoal {
    NewGoal {
        name: name.into(),
        target_amount: target,
        allocated_amount: allocated,
        priority,
        ..NewGoal::default()
    }
}

#[test]
fn distribute_serves_priority_then_closest() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(1500);
    let a = create_goal(&mut doc, goal("A", dec!(500), dec!(0), GoalPriority::High), today).unwrap();
    let b = create_goal(&mut doc, goal("B", dec!(700), dec!(200), GoalPriority::Medium), today).unwrap();
    let c = create_goal(&mut doc, goal("C", dec!(300), dec!(0), GoalPriority::Low), today).unwrap();
    assert_eq!(unallocated(&doc), dec!(1300));

    let result = auto_distribute(&mut doc, today).unwrap();
    assert_eq!(result.distributed, dec!(1300));
    assert_eq!(result.remaining_unallocated, Decimal::ZERO);
    assert_eq!(
        result.added,
        vec![
            (a.id.clone(), dec!(500)),
            (b.id.clone(), dec!(500)),
            (c.id.clone(), dec!(300)),
        ]
    );

    let a = find_goal(&doc, &a.id).unwrap();
    let b = find_goal(&doc, &b.id).unwrap();
    let c = find_goal(&doc, &c.id).unwrap();
    assert_eq!(a.allocated_amount, dec!(500));
    assert_eq!(a.completion_date, Some(today));
    assert_eq!(b.allocated_amount, dec!(700));
    assert_eq!(b.completion_date, Some(today));
    // 1300 covers every shortfall (500 + 500 + 300), so C fills up too
    assert_eq!(c.allocated_amount, dec!(300));
    assert_eq!(unallocated(&doc), Decimal::ZERO);
}

#[test]
fn distribute_stops_when_pool_runs_dry() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(600);
    let far = create_goal(&mut doc, goal("Far", dec!(1000), dec!(0), GoalPriority::Medium), today).unwrap();
    let near = create_goal(&mut doc, goal("Near", dec!(300), dec!(100), GoalPriority::Medium), today).unwrap();
    let low = create_goal(&mut doc, goal("Low", dec!(50), dec!(0), GoalPriority::Low), today).unwrap();

    let result = auto_distribute(&mut doc, today).unwrap();
    assert_eq!(result.distributed, dec!(500));
    assert_eq!(find_goal(&doc, &near.id).unwrap().allocated_amount, dec!(300));
    assert_eq!(find_goal(&doc, &far.id).unwrap().allocated_amount, dec!(300));
    assert_eq!(find_goal(&doc, &low.id).unwrap().allocated_amount, Decimal::ZERO);
}

#[test]
fn distribute_with_nothing_unallocated_is_a_no_op() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(100);
    create_goal(&mut doc, goal("A", dec!(500), dec!(100), GoalPriority::High), today).unwrap();
    let before = doc.clone();
    let result = auto_distribute(&mut doc, today).unwrap();
    assert!(result.added.is_empty());
    assert_eq!(doc, before);
}

#[test]
fn allocate_refuses_overdraw_and_negative() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(1000);
    let g1 = create_goal(&mut doc, goal("Trip", dec!(800), dec!(0), GoalPriority::High), today).unwrap();
    let g2 = create_goal(&mut doc, goal("Car", dec!(5000), dec!(0), GoalPriority::Low), today).unwrap();

    allocate(&mut doc, &g1.id, dec!(400), today).unwrap();
    let err = allocate(&mut doc, &g2.id, dec!(700), today).unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));
    assert_eq!(find_goal(&doc, &g2.id).unwrap().allocated_amount, Decimal::ZERO);

    allocate(&mut doc, &g2.id, dec!(600), today).unwrap();
    assert_eq!(unallocated(&doc), Decimal::ZERO);

    let err = allocate(&mut doc, &g1.id, dec!(-1), today).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // lowering one goal frees room for the other
    allocate(&mut doc, &g1.id, dec!(100), today).unwrap();
    allocate(&mut doc, &g2.id, dec!(900), today).unwrap();
    assert!(doc.budget_settings.total_allocated() <= doc.budget_settings.savings_balance);
}

#[test]
fn completion_date_follows_the_target() {
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(1000);
    let g = create_goal(
        &mut doc,
        goal("Laptop", dec!(500), dec!(0), GoalPriority::Medium),
        d("2025-01-01"),
    )
    .unwrap();
    assert!(g.completion_date.is_none());

    let g = allocate(&mut doc, &g.id, dec!(500), d("2025-02-01")).unwrap();
    assert_eq!(g.completion_date, Some(d("2025-02-01")));

    // a later top-up keeps the first completion date
    let g = add_savings(&mut doc, &g.id, dec!(50), d("2025-02-10")).unwrap();
    assert_eq!(g.completion_date, Some(d("2025-02-01")));

    let g = allocate(&mut doc, &g.id, dec!(200), d("2025-03-01")).unwrap();
    assert!(g.completion_date.is_none());

    let g = update_goal(
        &mut doc,
        &g.id,
        GoalPatch {
            target_amount: Some(dec!(150)),
            ..GoalPatch::default()
        },
        d("2025-03-05"),
    )
    .unwrap();
    assert_eq!(g.completion_date, Some(d("2025-03-05")));
}

#[test]
fn create_validates_input() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(100);

    let err = create_goal(&mut doc, goal("  ", dec!(10), dec!(0), GoalPriority::Low), today).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = create_goal(&mut doc, goal("X", dec!(0), dec!(0), GoalPriority::Low), today).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = create_goal(&mut doc, goal("X", dec!(500), dec!(200), GoalPriority::Low), today).unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));
    assert!(doc.budget_settings.savings_goals.is_empty());

    let g = create_goal(&mut doc, goal("X", dec!(500), dec!(0), GoalPriority::Low), today).unwrap();
    assert_eq!(g.category, "General");
    assert_eq!(g.created_date, today);
    assert_eq!(g.monthly_contribution, Decimal::ZERO);

    let mut planned = goal("Y", dec!(600), dec!(0), GoalPriority::Low);
    planned.monthly_contribution = dec!(-5);
    let err = create_goal(&mut doc, planned.clone(), today).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    planned.monthly_contribution = dec!(50);
    let y = create_goal(&mut doc, planned, today).unwrap();
    assert_eq!(y.monthly_contribution, dec!(50));
    let y = update_goal(
        &mut doc,
        &y.id,
        GoalPatch {
            monthly_contribution: Some(dec!(75)),
            ..GoalPatch::default()
        },
        today,
    )
    .unwrap();
    assert_eq!(y.monthly_contribution, dec!(75));
}

#[test]
fn delete_releases_allocation() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(1000);
    let g = create_goal(&mut doc, goal("X", dec!(500), dec!(400), GoalPriority::Low), today).unwrap();
    assert_eq!(unallocated(&doc), dec!(600));
    delete_goal(&mut doc, &g.id).unwrap();
    assert_eq!(unallocated(&doc), dec!(1000));
    assert!(matches!(delete_goal(&mut doc, &g.id), Err(Error::NotFound(_))));
}

#[test]
fn estimate_uses_thirty_day_months() {
    let today = d("2025-01-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(1000);
    let g = create_goal(&mut doc, goal("X", dec!(1000), dec!(100), GoalPriority::Low), today).unwrap();

    // 900 left at 300 a month
    assert_eq!(
        estimate_completion(&g, dec!(10), today),
        CompletionEstimate::On(d("2025-04-15"))
    );
    // 900 left at 600 a month: one month and fifteen days
    assert_eq!(
        estimate_completion(&g, dec!(20), today),
        CompletionEstimate::On(d("2025-03-02"))
    );
    assert_eq!(
        estimate_completion(&g, Decimal::ZERO, today),
        CompletionEstimate::NoSavingsRate
    );
    assert_eq!(
        estimate_completion(&g, Decimal::MAX, today),
        CompletionEstimate::NoSavingsRate
    );

    let done = allocate(&mut doc, &g.id, dec!(1000), today).unwrap();
    assert_eq!(
        estimate_completion(&done, dec!(10), today),
        CompletionEstimate::Achieved
    );
}

#[test]
fn summary_counts_and_progress() {
    let today = d("2025-03-15");
    let mut doc = Document::default();
    doc.budget_settings.savings_balance = dec!(1000);
    create_goal(&mut doc, goal("A", dec!(200), dec!(200), GoalPriority::High), today).unwrap();
    create_goal(&mut doc, goal("B", dec!(800), dec!(300), GoalPriority::Low), today).unwrap();

    let s = goals::summary(&doc);
    assert_eq!(s.total_goals, 2);
    assert_eq!(s.completed_goals, 1);
    assert_eq!(s.active_goals, 1);
    assert_eq!(s.total_target, dec!(1000));
    assert_eq!(s.total_allocated, dec!(500));
    assert_eq!(s.overall_progress, dec!(50));
    assert_eq!(s.unallocated, dec!(500));

    let p = goals::progress(find_goal(&doc, &doc.budget_settings.savings_goals[1].id).unwrap());
    assert_eq!(p.remaining, dec!(500));
    assert!(!p.is_complete);
}
