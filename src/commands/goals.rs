// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::goals::{self, CompletionEstimate, GoalPatch, GoalProgress, NewGoal};
use crate::models::{GoalPriority, SavingsGoal};
use crate::store::Store;
use crate::utils::{decimal_arg, fmt_money, fmt_pct, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(store: &mut Store, m: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewGoal {
                name: sub.get_one::<String>("name").unwrap().to_string(),
                description: sub
                    .get_one::<String>("description")
                    .cloned()
                    .unwrap_or_default(),
                target_amount: parse_decimal(sub.get_one::<String>("target").unwrap())?,
                allocated_amount: decimal_arg(sub, "allocated")?.unwrap_or_default(),
                priority: sub
                    .get_one::<String>("priority")
                    .map(|p| p.parse::<GoalPriority>())
                    .transpose()?
                    .unwrap_or_default(),
                category: sub
                    .get_one::<String>("category")
                    .cloned()
                    .unwrap_or_default(),
                monthly_contribution: decimal_arg(sub, "monthly")?.unwrap_or_default(),
            };
            let g = store.mutate(|doc| goals::create_goal(doc, new, today))?;
            println!(
                "Goal '{}' for {} created (id: {})",
                g.name,
                fmt_money(&g.target_amount),
                g.id
            );
        }
        Some(("list", sub)) => list(store, sub, today)?,
        Some(("edit", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let patch = GoalPatch {
                name: sub.get_one::<String>("name").cloned(),
                description: sub.get_one::<String>("description").cloned(),
                target_amount: decimal_arg(sub, "target")?,
                priority: sub
                    .get_one::<String>("priority")
                    .map(|p| p.parse::<GoalPriority>())
                    .transpose()?,
                category: sub.get_one::<String>("category").cloned(),
                monthly_contribution: decimal_arg(sub, "monthly")?,
            };
            let g = store.mutate(|doc| goals::update_goal(doc, &id, patch, today))?;
            println!("Updated goal '{}'", g.name);
        }
        Some(("delete", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let g = store.mutate(|doc| goals::delete_goal(doc, &id))?;
            println!(
                "Deleted goal '{}'; {} returned to unallocated savings",
                g.name,
                fmt_money(&g.allocated_amount)
            );
        }
        Some(("allocate", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let g = store.mutate(|doc| goals::allocate(doc, &id, amount, today))?;
            report_allocation(&g);
        }
        Some(("add-savings", sub)) => {
            let id = sub.get_one::<String>("id").unwrap().trim().to_string();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let g = store.mutate(|doc| goals::add_savings(doc, &id, amount, today))?;
            report_allocation(&g);
        }
        Some(("distribute", _)) => {
            let d = store.mutate(|doc| goals::auto_distribute(doc, today))?;
            if d.added.is_empty() {
                println!("Nothing to distribute");
            } else {
                let doc = store.document();
                let rows = d
                    .added
                    .iter()
                    .map(|(id, amount)| {
                        let name = goals::find_goal(doc, id)
                            .map(|g| g.name.clone())
                            .unwrap_or_else(|_| id.clone());
                        vec![name, fmt_money(amount)]
                    })
                    .collect();
                println!("{}", pretty_table(&["Goal", "Added"], rows));
                println!(
                    "Distributed {}, {} still unallocated",
                    fmt_money(&d.distributed),
                    fmt_money(&d.remaining_unallocated)
                );
            }
        }
        Some(("summary", sub)) => {
            let s = goals::summary(store.document());
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                let rows = vec![
                    vec!["Goals".into(), s.total_goals.to_string()],
                    vec!["Active".into(), s.active_goals.to_string()],
                    vec!["Completed".into(), s.completed_goals.to_string()],
                    vec!["Total target".into(), fmt_money(&s.total_target)],
                    vec!["Total allocated".into(), fmt_money(&s.total_allocated)],
                    vec!["Overall progress".into(), fmt_pct(&s.overall_progress)],
                    vec!["Savings balance".into(), fmt_money(&s.total_savings)],
                    vec!["Unallocated".into(), fmt_money(&s.unallocated)],
                ];
                println!("{}", pretty_table(&["Goals", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn report_allocation(g: &SavingsGoal) {
    if let Some(done) = g.completion_date {
        println!(
            "'{}' fully funded at {} (completed {})",
            g.name,
            fmt_money(&g.allocated_amount),
            done
        );
    } else {
        println!(
            "'{}' now holds {} of {}",
            g.name,
            fmt_money(&g.allocated_amount),
            fmt_money(&g.target_amount)
        );
    }
}

#[derive(Serialize)]
struct GoalRow<'a> {
    #[serde(flatten)]
    goal: &'a SavingsGoal,
    progress: GoalProgress,
    estimate: CompletionEstimate,
}

fn list(store: &Store, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let doc = store.document();
    let daily = doc.budget_settings.daily_savings_goal;
    let mut data: Vec<GoalRow> = doc
        .budget_settings
        .savings_goals
        .iter()
        .map(|g| GoalRow {
            goal: g,
            progress: goals::progress(g),
            estimate: goals::estimate_completion(g, daily, today),
        })
        .collect();
    data.sort_by(|a, b| {
        a.progress
            .is_complete
            .cmp(&b.progress.is_complete)
            .then(b.goal.priority.rank().cmp(&a.goal.priority.rank()))
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No goals yet");
            return Ok(());
        }
        let rows = data
            .iter()
            .map(|r| {
                let eta = match &r.estimate {
                    CompletionEstimate::Achieved => r
                        .goal
                        .completion_date
                        .map(|d| format!("done {}", d))
                        .unwrap_or_else(|| "done".into()),
                    CompletionEstimate::NoSavingsRate => "no savings rate".into(),
                    CompletionEstimate::On(d) => d.to_string(),
                };
                vec![
                    r.goal.name.clone(),
                    r.goal.priority.to_string(),
                    r.goal.category.clone(),
                    fmt_money(&r.goal.allocated_amount),
                    fmt_money(&r.goal.target_amount),
                    fmt_money(&r.goal.monthly_contribution),
                    fmt_pct(&r.progress.progress_pct),
                    eta,
                    r.goal.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Goal", "Priority", "Category", "Saved", "Target", "Monthly", "Progress", "ETA",
                    "Id",
                ],
                rows
            )
        );
    }
    Ok(())
}
