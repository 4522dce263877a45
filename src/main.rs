// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use budgetflow::{cli, commands, store};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let path = match matches.get_one::<String>("data-file") {
        Some(p) => p.into(),
        None => store::data_path()?,
    };
    let today = chrono::Local::now().date_naive();
    let mut store = store::Store::open_at(path, today)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            if !store.path().exists() {
                store.save()?;
            }
            println!("Data file at {}", store.path().display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&mut store, sub, today)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&mut store, sub, today)?,
        Some(("budget", sub)) => commands::budgets::handle(&store, sub, today)?,
        Some(("alloc", sub)) => commands::allocations::handle(&mut store, sub, today)?,
        Some(("goal", sub)) => commands::goals::handle(&mut store, sub, today)?,
        Some(("networth", sub)) => commands::networth::handle(&mut store, sub, today)?,
        Some(("transfer", sub)) => commands::transfers::handle(&mut store, sub)?,
        Some(("project", sub)) => commands::projection::handle(&store, sub, today)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub, today)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
