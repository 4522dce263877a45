// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod errors;
pub mod store;
pub mod models;
pub mod utils;
pub mod resolver;
pub mod budget;
pub mod allocation;
pub mod goals;
pub mod assets;
pub mod transfer;
pub mod projection;
pub mod ledger;
pub mod reports;
pub mod commands;
