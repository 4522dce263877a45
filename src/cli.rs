// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    ]
}

fn kind_arg(required: bool) -> Arg {
    Arg::new("kind")
        .long("kind")
        .required(required)
        .value_parser(["expense", "income"])
        .help("expense|income")
}

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn req(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn month_arg() -> Arg {
    opt("month").help("YYYY-MM, defaults to the current month")
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add an income or expense")
                .arg(kind_arg(true))
                .arg(opt("date").help("YYYY-MM-DD, defaults to today"))
                .arg(req("amount"))
                .arg(req("category"))
                .arg(opt("description")),
        )
        .subcommand(
            Command::new("list")
                .about("List both kinds for a month, by date")
                .arg(month_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit a transaction; its id is kept")
                .arg(req("id"))
                .arg(kind_arg(false))
                .arg(opt("date"))
                .arg(opt("amount"))
                .arg(opt("category"))
                .arg(opt("description")),
        )
        .subcommand(Command::new("delete").about("Delete a transaction").arg(req("id")))
        .subcommand(
            Command::new("totals")
                .about("Income, expense and fixed-cost totals for a month")
                .arg(month_arg())
                .args(json_flags()),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Maintain category lists")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .arg(kind_arg(false))
                .args(json_flags()),
        )
        .subcommand(Command::new("add").arg(kind_arg(true)).arg(req("name")))
        .subcommand(Command::new("remove").arg(kind_arg(true)).arg(req("name")))
}

fn settings_cmd() -> Command {
    let income = Command::new("income")
        .about("Base income entries with effective dates")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("amount"))
                .arg(req("start"))
                .arg(opt("end"))
                .arg(opt("description").default_value("Base Income")),
        )
        .subcommand(
            Command::new("list")
                .arg(month_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("update")
                .arg(req("description"))
                .arg(req("amount"))
                .arg(req("start"))
                .arg(opt("new-description"))
                .arg(opt("new-amount"))
                .arg(opt("new-start"))
                .arg(opt("end").help("New end date; empty string clears it")),
        )
        .subcommand(
            Command::new("remove")
                .arg(req("description"))
                .arg(req("amount"))
                .arg(req("start")),
        );

    let fixed = Command::new("fixed")
        .about("Fixed monthly costs")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("desc"))
                .arg(req("amount"))
                .arg(opt("start"))
                .arg(opt("end")),
        )
        .subcommand(
            Command::new("list")
                .arg(month_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("update")
                .arg(req("desc"))
                .arg(req("amount"))
                .arg(opt("new-desc"))
                .arg(opt("new-amount"))
                .arg(opt("start").help("New start date; empty string clears it"))
                .arg(opt("end").help("New end date; empty string clears it")),
        )
        .subcommand(Command::new("remove").arg(req("desc")).arg(req("amount")));

    let loan = Command::new("loan")
        .about("Money lent to others")
        .subcommand_required(true)
        .subcommand(
            Command::new("lend")
                .arg(req("borrower"))
                .arg(req("amount"))
                .arg(opt("description"))
                .arg(opt("date")),
        )
        .subcommand(Command::new("list").args(json_flags()))
        .subcommand(
            Command::new("update")
                .arg(req("id"))
                .arg(opt("borrower"))
                .arg(opt("amount"))
                .arg(opt("description"))
                .arg(opt("date")),
        )
        .subcommand(Command::new("returned").arg(req("id")));

    Command::new("settings")
        .about("Income, fixed costs, balances and the daily savings goal")
        .subcommand_required(true)
        .subcommand(Command::new("show").args(json_flags()))
        .subcommand(income)
        .subcommand(fixed)
        .subcommand(
            Command::new("balance")
                .about("Set an account balance")
                .arg(
                    req("account")
                        .help("bank|wallet|savings|investments|money-lent"),
                )
                .arg(req("amount")),
        )
        .subcommand(
            Command::new("daily-savings")
                .about("Set the daily savings goal")
                .arg(req("amount")),
        )
        .subcommand(loan)
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly flexible budget and daily trace")
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .arg(month_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("daily")
                .about("Day-by-day depletion trace with adaptive targets")
                .arg(month_arg())
                .arg(
                    Arg::new("carryover")
                        .long("carryover")
                        .action(ArgAction::SetTrue)
                        .help("Open with last month's deficit"),
                )
                .args(json_flags()),
        )
}

fn alloc_cmd() -> Command {
    Command::new("alloc")
        .about("Percentage budgets per category")
        .subcommand_required(true)
        .subcommand(
            Command::new("show")
                .arg(kind_arg(false).default_value("expense"))
                .arg(month_arg())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("adjust")
                .about("Move one share; the others compensate proportionally")
                .arg(kind_arg(false).default_value("expense"))
                .arg(req("category"))
                .arg(req("pct"))
                .arg(
                    Arg::new("normalize")
                        .long("normalize")
                        .action(ArgAction::SetTrue)
                        .help("Rescale to 100% before saving"),
                ),
        )
        .subcommand(Command::new("normalize").arg(kind_arg(false).default_value("expense")))
        .subcommand(
            Command::new("set")
                .about("Set shares explicitly; must total 100%")
                .arg(kind_arg(false).default_value("expense"))
                .arg(
                    Arg::new("share")
                        .long("share")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("CATEGORY=PCT, repeatable"),
                ),
        )
        .subcommand(
            Command::new("auto")
                .about("Derive expense shares from the month's actual spend")
                .arg(month_arg())
                .arg(
                    opt("assign-rest")
                        .help("Category that receives the unallocated share when under budget"),
                )
                .arg(
                    Arg::new("apply")
                        .long("apply")
                        .action(ArgAction::SetTrue)
                        .help("Save the result"),
                ),
        )
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals funded from the Savings balance")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("name"))
                .arg(req("target"))
                .arg(opt("allocated").default_value("0"))
                .arg(
                    opt("priority")
                        .value_parser(["high", "medium", "low"])
                        .default_value("medium"),
                )
                .arg(opt("category").default_value("General"))
                .arg(opt("monthly").help("Planned monthly contribution"))
                .arg(opt("description")),
        )
        .subcommand(Command::new("list").args(json_flags()))
        .subcommand(
            Command::new("edit")
                .arg(req("id"))
                .arg(opt("name"))
                .arg(opt("target"))
                .arg(opt("priority").value_parser(["high", "medium", "low"]))
                .arg(opt("category"))
                .arg(opt("monthly"))
                .arg(opt("description")),
        )
        .subcommand(Command::new("delete").arg(req("id")))
        .subcommand(
            Command::new("allocate")
                .about("Set a goal's allocation")
                .arg(req("id"))
                .arg(req("amount")),
        )
        .subcommand(
            Command::new("add-savings")
                .arg(req("id"))
                .arg(req("amount")),
        )
        .subcommand(Command::new("distribute").about("Spread unallocated savings by priority"))
        .subcommand(Command::new("summary").args(json_flags()))
}

fn networth_cmd() -> Command {
    Command::new("networth")
        .about("Balances, snapshots and net worth change")
        .subcommand_required(true)
        .subcommand(Command::new("show").args(json_flags()))
        .subcommand(
            Command::new("snapshot")
                .about("Record today's balances (overwrites the same date)")
                .arg(opt("date"))
                .arg(opt("note").default_value("")),
        )
        .subcommand(
            Command::new("list")
                .arg(opt("from"))
                .arg(opt("to"))
                .args(json_flags()),
        )
        .subcommand(Command::new("delete").arg(req("date")))
}

fn report_cmd() -> Command {
    let recurring = Arg::new("include-recurring")
        .long("include-recurring")
        .action(ArgAction::SetTrue)
        .help("Add fixed costs or base income as a bucket");
    Command::new("report")
        .about("Category and history aggregates")
        .subcommand_required(true)
        .subcommand(
            Command::new("categories")
                .arg(kind_arg(false).default_value("expense"))
                .arg(month_arg())
                .arg(recurring.clone())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("history")
                .arg(kind_arg(false).default_value("expense"))
                .arg(
                    opt("months")
                        .value_parser(value_parser!(u32))
                        .default_value("6"),
                )
                .arg(recurring)
                .args(json_flags()),
        )
        .subcommand(
            Command::new("summary")
                .about("Month-range totals in the shape the insights service reads")
                .arg(month_arg())
                .arg(
                    opt("months-back")
                        .value_parser(value_parser!(u32).range(1..))
                        .default_value("3"),
                )
                .args(json_flags()),
        )
}

pub fn build_cli() -> Command {
    Command::new("budgetflow")
        .version(crate_version!())
        .about("Personal budgeting: daily targets, category shares, goals and net worth")
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .env("BUDGETFLOW_DATA")
                .global(true)
                .help("Path of the JSON document"),
        )
        .subcommand(Command::new("init").about("Create the document if missing and print its path"))
        .subcommand(tx_cmd())
        .subcommand(category_cmd())
        .subcommand(settings_cmd())
        .subcommand(budget_cmd())
        .subcommand(alloc_cmd())
        .subcommand(goal_cmd())
        .subcommand(networth_cmd())
        .subcommand(
            Command::new("transfer")
                .about("Move money between two accounts")
                .arg(req("from"))
                .arg(req("to"))
                .arg(req("amount")),
        )
        .subcommand(
            Command::new("project")
                .about("Net worth over the coming months at the daily savings goal")
                .arg(
                    opt("months")
                        .value_parser(value_parser!(u32))
                        .default_value("12"),
                )
                .args(json_flags()),
        )
        .subcommand(report_cmd())
        .subcommand(
            Command::new("export")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(req("format").help("csv|json"))
                        .arg(req("out")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the document for broken invariants"))
}
