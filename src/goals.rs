// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Savings goals share the Savings account balance.
//!
//! The sum of all allocations never exceeds the Savings balance: every path
//! that raises an allocation checks the increase against what is still
//! unallocated, and nothing here lowers the balance itself.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{Document, GoalPriority, SavingsGoal};

/// Savings balance minus everything allocated. Negative only if the balance was
/// lowered outside the allocator.
pub fn unallocated(doc: &Document) -> Decimal {
    doc.budget_settings.savings_balance - doc.budget_settings.total_allocated()
}

fn settle_completion(goal: &mut SavingsGoal, today: NaiveDate) {
    if goal.is_complete() {
        if goal.completion_date.is_none() {
            goal.completion_date = Some(today);
            info!(goal = %goal.name, "goal completed");
        }
    } else if goal.completion_date.take().is_some() {
        info!(goal = %goal.name, "goal active again");
    }
}

fn goal_index(doc: &Document, id: &str) -> Result<usize> {
    doc.budget_settings
        .savings_goals
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| Error::not_found(format!("Goal '{}'", id)))
}

pub fn find_goal<'a>(doc: &'a Document, id: &str) -> Result<&'a SavingsGoal> {
    let idx = goal_index(doc, id)?;
    Ok(&doc.budget_settings.savings_goals[idx])
}

#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub name: String,
    pub description: String,
    pub target_amount: Decimal,
    pub allocated_amount: Decimal,
    pub priority: GoalPriority,
    pub category: String,
    pub monthly_contribution: Decimal,
}

pub fn create_goal(doc: &mut Document, new: NewGoal, today: NaiveDate) -> Result<SavingsGoal> {
    let name = new.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Goal name cannot be empty"));
    }
    if new.target_amount <= Decimal::ZERO {
        return Err(Error::validation("Target amount must be positive"));
    }
    if new.allocated_amount < Decimal::ZERO {
        return Err(Error::validation("Allocation cannot be negative"));
    }
    if new.monthly_contribution < Decimal::ZERO {
        return Err(Error::validation("Monthly contribution cannot be negative"));
    }
    let available = unallocated(doc);
    if new.allocated_amount > available {
        return Err(Error::constraint(format!(
            "Insufficient savings. Available: {:.2}",
            available.max(Decimal::ZERO)
        )));
    }
    let category = match new.category.trim() {
        "" => "General".to_string(),
        c => c.to_string(),
    };
    let mut goal = SavingsGoal {
        id: Uuid::new_v4().to_string(),
        name,
        description: new.description.trim().to_string(),
        target_amount: new.target_amount,
        allocated_amount: new.allocated_amount,
        priority: new.priority,
        category,
        created_date: today,
        completion_date: None,
        monthly_contribution: new.monthly_contribution,
    };
    settle_completion(&mut goal, today);
    doc.budget_settings.savings_goals.push(goal.clone());
    info!(goal = %goal.name, target = %goal.target_amount, "goal created");
    Ok(goal)
}

#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Decimal>,
    pub priority: Option<GoalPriority>,
    pub category: Option<String>,
    pub monthly_contribution: Option<Decimal>,
}

/// Edits descriptive fields and the target; completion is re-evaluated against the new target.
pub fn update_goal(
    doc: &mut Document,
    id: &str,
    patch: GoalPatch,
    today: NaiveDate,
) -> Result<SavingsGoal> {
    let idx = goal_index(doc, id)?;
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Goal name cannot be empty"));
        }
    }
    if let Some(target) = patch.target_amount {
        if target <= Decimal::ZERO {
            return Err(Error::validation("Target amount must be positive"));
        }
    }
    if patch.monthly_contribution.is_some_and(|c| c < Decimal::ZERO) {
        return Err(Error::validation("Monthly contribution cannot be negative"));
    }
    let goal = &mut doc.budget_settings.savings_goals[idx];
    if let Some(name) = patch.name {
        goal.name = name.trim().to_string();
    }
    if let Some(description) = patch.description {
        goal.description = description.trim().to_string();
    }
    if let Some(target) = patch.target_amount {
        goal.target_amount = target;
    }
    if let Some(priority) = patch.priority {
        goal.priority = priority;
    }
    if let Some(category) = patch.category {
        goal.category = category.trim().to_string();
    }
    if let Some(contribution) = patch.monthly_contribution {
        goal.monthly_contribution = contribution;
    }
    settle_completion(goal, today);
    Ok(goal.clone())
}

/// Removes a goal; its allocation returns to the unallocated pool.
pub fn delete_goal(doc: &mut Document, id: &str) -> Result<SavingsGoal> {
    let idx = goal_index(doc, id)?;
    let goal = doc.budget_settings.savings_goals.remove(idx);
    info!(goal = %goal.name, released = %goal.allocated_amount, "goal deleted");
    Ok(goal)
}

/// Sets one goal's allocation, refusing anything that would overdraw savings.
pub fn allocate(
    doc: &mut Document,
    id: &str,
    new_alloc: Decimal,
    today: NaiveDate,
) -> Result<SavingsGoal> {
    let idx = goal_index(doc, id)?;
    if new_alloc < Decimal::ZERO {
        return Err(Error::validation("Allocation cannot be negative"));
    }
    let available = unallocated(doc);
    let goal = &mut doc.budget_settings.savings_goals[idx];
    let delta = new_alloc - goal.allocated_amount;
    if delta > available {
        warn!(goal = %goal.name, %delta, %available, "allocation refused");
        return Err(Error::constraint(format!(
            "Insufficient savings. Available: {:.2}",
            (goal.allocated_amount + available).max(Decimal::ZERO)
        )));
    }
    goal.allocated_amount = new_alloc;
    settle_completion(goal, today);
    info!(goal = %goal.name, allocated = %new_alloc, "allocation set");
    Ok(goal.clone())
}

pub fn add_savings(
    doc: &mut Document,
    id: &str,
    amount: Decimal,
    today: NaiveDate,
) -> Result<SavingsGoal> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation("Amount to add must be positive"));
    }
    let current = find_goal(doc, id)?.allocated_amount;
    allocate(doc, id, current + amount, today)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub distributed: Decimal,
    pub remaining_unallocated: Decimal,
    /// `(goal id, amount added)` in the order goals were served.
    pub added: Vec<(String, Decimal)>,
}

/// Hands the unallocated savings to incomplete goals: highest priority first,
/// then the goal closest to its target, each topped up as far as the pool allows.
pub fn auto_distribute(doc: &mut Document, today: NaiveDate) -> Result<Distribution> {
    let mut pool = unallocated(doc).max(Decimal::ZERO);
    let start = pool;

    let mut order: Vec<usize> = doc
        .budget_settings
        .savings_goals
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.is_complete())
        .map(|(i, _)| i)
        .collect();
    let goals = &mut doc.budget_settings.savings_goals;
    order.sort_by(|&a, &b| {
        goals[b]
            .priority
            .rank()
            .cmp(&goals[a].priority.rank())
            .then_with(|| goals[a].remaining().cmp(&goals[b].remaining()))
    });

    let mut added = Vec::new();
    for idx in order {
        if pool <= Decimal::ZERO {
            break;
        }
        let goal = &mut goals[idx];
        let take = goal.remaining().min(pool);
        if take <= Decimal::ZERO {
            continue;
        }
        goal.allocated_amount += take;
        pool -= take;
        settle_completion(goal, today);
        added.push((goal.id.clone(), take));
    }

    let distributed = start - pool;
    info!(%distributed, remaining = %pool, goals = added.len(), "savings auto-distributed");
    Ok(Distribution {
        distributed,
        remaining_unallocated: pool,
        added,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub progress_pct: Decimal,
    pub remaining: Decimal,
    pub is_complete: bool,
}

pub fn progress(goal: &SavingsGoal) -> GoalProgress {
    let progress_pct = if goal.target_amount > Decimal::ZERO {
        goal.allocated_amount / goal.target_amount * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    GoalProgress {
        progress_pct,
        remaining: goal.remaining(),
        is_complete: goal.is_complete(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CompletionEstimate {
    Achieved,
    NoSavingsRate,
    On(NaiveDate),
}

/// When the goal fills up if the daily savings goal (at 30 days a month) all went to it.
pub fn estimate_completion(
    goal: &SavingsGoal,
    daily_savings_goal: Decimal,
    today: NaiveDate,
) -> CompletionEstimate {
    let remaining = goal.target_amount - goal.allocated_amount;
    if remaining <= Decimal::ZERO {
        return CompletionEstimate::Achieved;
    }
    let monthly = match daily_savings_goal.checked_mul(Decimal::from(30)) {
        Some(m) if m > Decimal::ZERO => m,
        _ => return CompletionEstimate::NoSavingsRate,
    };
    let months_needed = remaining / monthly;
    let whole = months_needed.trunc();
    let extra_days = ((months_needed - whole) * Decimal::from(30)).trunc();
    let date = whole
        .to_u32()
        .and_then(|m| today.checked_add_months(Months::new(m)))
        .and_then(|d| extra_days.to_u64().and_then(|x| d.checked_add_days(Days::new(x))));
    match date {
        Some(d) => CompletionEstimate::On(d),
        None => CompletionEstimate::NoSavingsRate,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalsSummary {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_target: Decimal,
    pub total_allocated: Decimal,
    pub overall_progress: Decimal,
    pub total_savings: Decimal,
    pub unallocated: Decimal,
}

pub fn summary(doc: &Document) -> GoalsSummary {
    let goals = &doc.budget_settings.savings_goals;
    let total_target: Decimal = goals.iter().map(|g| g.target_amount).sum();
    let total_allocated = doc.budget_settings.total_allocated();
    let completed_goals = goals.iter().filter(|g| g.is_complete()).count();
    GoalsSummary {
        total_goals: goals.len(),
        active_goals: goals.len() - completed_goals,
        completed_goals,
        total_target,
        total_allocated,
        overall_progress: if total_target > Decimal::ZERO {
            total_allocated / total_target * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        },
        total_savings: doc.budget_settings.savings_balance,
        unallocated: unallocated(doc).max(Decimal::ZERO),
    }
}
