// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::models::{AccountKind, Document};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    pub from: AccountKind,
    pub to: AccountKind,
    pub amount: Decimal,
    pub from_balance: Decimal,
    pub to_balance: Decimal,
}

/// Moves `amount` between two accounts. Balances may go negative, except that
/// Savings cannot fall below what goals have allocated.
pub fn transfer(
    doc: &mut Document,
    from: AccountKind,
    to: AccountKind,
    amount: Decimal,
) -> Result<TransferReceipt> {
    if from == to {
        return Err(Error::constraint("Cannot transfer to the same account"));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::constraint("Transfer amount must be positive"));
    }
    let settings = &mut doc.budget_settings;
    if from == AccountKind::Savings {
        let allocated = settings.total_allocated();
        if settings.savings_balance - amount < allocated {
            warn!(%amount, %allocated, "transfer would overdraw goal allocations");
            return Err(Error::constraint(format!(
                "Savings would fall below the {:.2} allocated to goals",
                allocated
            )));
        }
    }
    *settings.balance_mut(from) -= amount;
    *settings.balance_mut(to) += amount;
    let receipt = TransferReceipt {
        from,
        to,
        amount,
        from_balance: settings.balance(from),
        to_balance: settings.balance(to),
    };
    info!(%from, %to, %amount, "transfer applied");
    Ok(receipt)
}
