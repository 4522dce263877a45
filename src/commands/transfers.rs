// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::AccountKind;
use crate::store::Store;
use crate::transfer::transfer;
use crate::utils::{fmt_money, parse_decimal};

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    let from: AccountKind = m.get_one::<String>("from").unwrap().parse()?;
    let to: AccountKind = m.get_one::<String>("to").unwrap().parse()?;
    let amount = parse_decimal(m.get_one::<String>("amount").unwrap())?;
    let r = store.mutate(|doc| transfer(doc, from, to, amount))?;
    println!(
        "Moved {} from {} to {} ({}: {}, {}: {})",
        fmt_money(&r.amount),
        r.from,
        r.to,
        r.from,
        fmt_money(&r.from_balance),
        r.to,
        fmt_money(&r.to_balance)
    );
    Ok(())
}
