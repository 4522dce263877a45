// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result as AnyResult;
use chrono::{Datelike, Months, NaiveDate};
use clap::ArgMatches;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::errors::{Error, Result};
use crate::models::TransactionKind;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    month_span(s)?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| Error::validation(format!("Invalid decimal '{}'", s)))
}

pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some),
    }
}

/// `--month` if given, else the month containing `today`.
pub fn month_arg_or(m: &ArgMatches, today: NaiveDate) -> Result<String> {
    match m.get_one::<String>("month") {
        Some(s) => parse_month(s),
        None => Ok(month_of(today)),
    }
}

pub fn date_arg_or(m: &ArgMatches, name: &str, today: NaiveDate) -> Result<NaiveDate> {
    match m.get_one::<String>(name) {
        Some(s) => parse_date(s),
        None => Ok(today),
    }
}

pub fn decimal_arg(m: &ArgMatches, name: &str) -> Result<Option<Decimal>> {
    m.get_one::<String>(name)
        .map(|s| parse_decimal(s))
        .transpose()
}

pub fn kind_arg(m: &ArgMatches) -> Result<TransactionKind> {
    m.get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or("expense")
        .parse()
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("€{:.2}", d.round_dp(2))
}

pub fn fmt_pct(d: &Decimal) -> String {
    format!("{:.1}%", d.round_dp(1))
}

/// First day, last day and length of a "YYYY-MM" month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub days: u32,
}

impl MonthSpan {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    pub fn label(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }

    pub fn day(&self, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.first.year(), self.first.month(), d)
    }
}

pub fn month_span(month: &str) -> Result<MonthSpan> {
    let invalid = || Error::validation(format!("Invalid month '{}', expected YYYY-MM", month));
    let (y, m) = month.trim().split_once('-').ok_or_else(invalid)?;
    if y.len() != 4 || m.len() != 2 {
        return Err(invalid());
    }
    let y: i32 = y.parse().map_err(|_| invalid())?;
    let m: u32 = m.parse().map_err(|_| invalid())?;
    let first = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(invalid)?;
    let next = first.checked_add_months(Months::new(1)).ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok(MonthSpan {
        first,
        last,
        days: last.day(),
    })
}

pub fn month_end(month: &str) -> Result<NaiveDate> {
    Ok(month_span(month)?.last)
}

pub fn days_in_month(month: &str) -> Result<u32> {
    Ok(month_span(month)?.days)
}

pub fn month_of(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// The month `offset` months away from `month` (negative goes back).
pub fn shift_month(month: &str, offset: i32) -> Result<String> {
    let first = month_span(month)?.first;
    let shifted = if offset >= 0 {
        first.checked_add_months(Months::new(offset as u32))
    } else {
        first.checked_sub_months(Months::new(offset.unsigned_abs()))
    };
    shifted
        .map(month_of)
        .ok_or_else(|| Error::validation(format!("Month '{}' shifted by {} is out of range", month, offset)))
}

pub fn previous_month(month: &str) -> Result<String> {
    shift_month(month, -1)
}

/// `months_back` consecutive months ending at `end_month`, oldest first.
pub fn month_range(end_month: &str, months_back: u32) -> Result<Vec<String>> {
    (0..months_back as i32)
        .rev()
        .map(|offset| shift_month(end_month, -offset))
        .collect()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> AnyResult<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
