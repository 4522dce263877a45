// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use crate::ledger;
use crate::models::TransactionKind;
use crate::store::Store;
use crate::utils::{kind_arg, maybe_print_json, pretty_table};

#[derive(Serialize)]
struct CategoryRow<'a> {
    kind: TransactionKind,
    name: &'a str,
}

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let kinds: Vec<TransactionKind> = match sub.get_one::<String>("kind") {
                Some(_) => vec![kind_arg(sub)?],
                None => TransactionKind::ALL.to_vec(),
            };
            let doc = store.document();
            let data: Vec<CategoryRow> = kinds
                .iter()
                .flat_map(|k| {
                    doc.categories(*k)
                        .iter()
                        .map(move |name| CategoryRow { kind: *k, name })
                })
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| vec![r.kind.to_string(), r.name.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Kind", "Name"], rows));
            }
        }
        Some(("add", sub)) => {
            let kind = kind_arg(sub)?;
            let name = sub.get_one::<String>("name").unwrap();
            let name = store.mutate(|doc| ledger::add_category(doc, kind, name))?;
            println!("Added {} category '{}'", kind, name);
        }
        Some(("remove", sub)) => {
            let kind = kind_arg(sub)?;
            let name = sub.get_one::<String>("name").unwrap();
            store.mutate(|doc| ledger::remove_category(doc, kind, name))?;
            println!("Removed {} category '{}'", kind, name.trim());
        }
        _ => {}
    }
    Ok(())
}
