// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod transactions;
pub mod categories;
pub mod settings;
pub mod budgets;
pub mod allocations;
pub mod goals;
pub mod networth;
pub mod transfers;
pub mod projection;
pub mod reports;
pub mod exporter;
pub mod doctor;
