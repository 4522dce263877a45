// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use serde_json::json;

use crate::models::{Document, Transaction, TransactionKind};
use crate::store::Store;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store.document(), sub),
        _ => Ok(()),
    }
}

/// Both kinds in date order, income first within a day.
fn ordered(doc: &Document) -> Vec<(TransactionKind, &Transaction)> {
    let mut rows: Vec<(TransactionKind, &Transaction)> = TransactionKind::ALL
        .iter()
        .flat_map(|&k| doc.transactions(k).iter().map(move |t| (k, t)))
        .collect();
    rows.sort_by(|a, b| a.1.date.cmp(&b.1.date).then(b.0.cmp(&a.0)));
    rows
}

fn export_transactions(doc: &Document, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let rows = ordered(doc);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "kind", "category", "amount", "description", "id"])?;
            for (kind, t) in &rows {
                wtr.write_record([
                    t.date.to_string(),
                    kind.to_string(),
                    t.category.clone(),
                    t.amount.to_string(),
                    t.description.clone(),
                    t.id.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|(kind, t)| {
                    json!({
                        "date": t.date, "kind": kind, "category": t.category,
                        "amount": t.amount, "description": t.description, "id": t.id
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
