// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The single JSON document that holds all tracker state.
//!
//! Loading goes through `serde_json::Value` first so older documents can be
//! upgraded in place (scalar income, `current_amount` goals, missing keys)
//! before they are read into typed structs. Saving always writes the complete
//! schema, so a migrated document is rewritten in its new form on the first
//! successful mutation.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value, json};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{
    AssetSnapshot, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES, Document,
    PROTECTED_CATEGORY, TransactionKind,
};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Budgetflow", "budgetflow"));

pub const DATA_FILE_NAME: &str = "finance_data.json";
const LEGACY_INCOME_START: &str = "2000-01-01";

/// Default location of the document in the platform data dir.
pub fn data_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
        Error::Persistence("Could not determine platform-specific data dir".into())
    })?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join(DATA_FILE_NAME))
}

pub type Listener = Box<dyn FnMut(&Document)>;

pub struct Store {
    path: PathBuf,
    doc: Document,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_at(path, chrono::Local::now().date_naive())
    }

    /// Opens the document at `path`; `today` stamps goals that are missing a creation date.
    pub fn open_at(path: impl Into<PathBuf>, today: NaiveDate) -> Result<Self> {
        let path = path.into();
        let doc = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| Error::Persistence(format!("Open {}: {}", path.display(), e)))?;
            let doc = from_json_str(&raw, today)?;
            info!(path = %path.display(), "loaded document");
            doc
        } else {
            info!(path = %path.display(), "no document yet, starting empty");
            Document::default()
        };
        Ok(Store {
            path,
            doc,
            listeners: Vec::new(),
        })
    }

    pub fn open_or_init() -> Result<Self> {
        Self::open(data_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Registers a callback fired once after every persisted mutation.
    pub fn on_data_changed(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Applies `f` to a staged copy of the document.
    ///
    /// When `f` fails nothing changes. When it succeeds the staged copy becomes
    /// current and is written to disk; a failed write is reported as
    /// `Error::Persistence` with the new state kept in memory for `save()` to retry.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut staged = self.doc.clone();
        let out = f(&mut staged)?;
        self.doc = staged;
        self.save()?;
        for listener in self.listeners.iter_mut() {
            listener(&self.doc);
        }
        Ok(out)
    }

    /// Writes the current document atomically (temp file, then rename).
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = to_json_string(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .map_err(|e| Error::Persistence(format!("Write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Persistence(format!("Replace {}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "document saved");
        Ok(())
    }
}

pub fn to_json_string(doc: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Parses, migrates and reconciles a document body.
pub fn from_json_str(raw: &str, today: NaiveDate) -> Result<Document> {
    let mut value: Value = if raw.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(raw)?
    };
    migrate_value(&mut value, today)?;
    let mut doc: Document = serde_json::from_value(value)?;
    reconcile(&mut doc, today);
    Ok(doc)
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    let s = n.to_string();
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&s).ok())
}

/// Upgrades legacy shapes that typed deserialization cannot read directly.
pub fn migrate_value(value: &mut Value, today: NaiveDate) -> Result<()> {
    let root = value
        .as_object_mut()
        .ok_or_else(|| Error::Persistence("Document root must be an object".into()))?;
    let settings = root
        .entry("budget_settings")
        .or_insert_with(|| Value::Object(Map::new()));
    if settings.is_null() {
        *settings = Value::Object(Map::new());
    }
    let settings = settings
        .as_object_mut()
        .ok_or_else(|| Error::Persistence("budget_settings must be an object".into()))?;

    match settings.get("monthly_income").cloned() {
        Some(Value::Number(n)) => {
            let amount = number_to_decimal(&n).unwrap_or(Decimal::ZERO);
            let migrated = if amount > Decimal::ZERO {
                json!([{
                    "description": "Base Income",
                    "amount": Value::Number(n),
                    "start_date": LEGACY_INCOME_START,
                    "end_date": Value::Null,
                }])
            } else {
                json!([])
            };
            warn!(%amount, "migrated scalar monthly_income to income entries");
            settings.insert("monthly_income".into(), migrated);
        }
        Some(Value::Null) => {
            settings.insert("monthly_income".into(), json!([]));
        }
        _ => {}
    }

    if let Some(Value::Array(goals)) = settings.get_mut("savings_goals") {
        for goal in goals.iter_mut().filter_map(Value::as_object_mut) {
            if !goal.contains_key("allocated_amount") {
                if let Some(current) = goal.remove("current_amount") {
                    goal.insert("allocated_amount".into(), current);
                    debug!("renamed goal current_amount to allocated_amount");
                }
            } else {
                goal.remove("current_amount");
            }
            if !goal.contains_key("id") {
                goal.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
            }
            if !goal.contains_key("created_date") {
                goal.insert("created_date".into(), Value::String(today.to_string()));
            }
        }
    }
    Ok(())
}

/// Restores the invariants a hand-edited or legacy document may have lost.
pub fn reconcile(doc: &mut Document, today: NaiveDate) {
    for kind in TransactionKind::ALL {
        let defaults: &[&str] = match kind {
            TransactionKind::Expense => &DEFAULT_EXPENSE_CATEGORIES,
            TransactionKind::Income => &DEFAULT_INCOME_CATEGORIES,
        };
        let list = doc.categories.get_mut(kind);
        if list.is_empty() {
            *list = defaults.iter().map(|s| s.to_string()).collect();
        } else if !list.iter().any(|c| c == PROTECTED_CATEGORY) {
            list.push(PROTECTED_CATEGORY.to_string());
        }
    }

    let mut seen = HashSet::new();
    for tx in doc.expenses.iter_mut().chain(doc.incomes.iter_mut()) {
        if !seen.insert(tx.id.clone()) {
            let fresh = Uuid::new_v4().to_string();
            warn!(old = %tx.id, new = %fresh, "duplicate transaction id reassigned");
            tx.id = fresh.clone();
            seen.insert(fresh);
        }
    }

    let snapshots = &mut doc.budget_settings.asset_snapshots;
    // Stable sort keeps file order within a date, so the last one written wins.
    snapshots.sort_by_key(|s| s.date);
    let mut deduped: Vec<AssetSnapshot> = Vec::with_capacity(snapshots.len());
    for snap in snapshots.drain(..) {
        match deduped.last_mut() {
            Some(last) if last.date == snap.date => *last = snap,
            _ => deduped.push(snap),
        }
    }
    *snapshots = deduped;

    for goal in doc.budget_settings.savings_goals.iter_mut() {
        match (goal.is_complete(), goal.completion_date) {
            (true, None) => goal.completion_date = Some(today),
            (false, Some(_)) => goal.completion_date = None,
            _ => {}
        }
    }
}
