// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub const PROTECTED_CATEGORY: &str = "Other";

pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Entertainment",
    "Utilities",
    "Shopping",
    "Healthcare",
    "Money Lent",
    "Other",
];

pub const DEFAULT_INCOME_CATEGORIES: [&str; 6] =
    ["Salary", "Side Gig", "Bonus", "Gift", "Investment", "Other"];

/// Start date given to income entries that predate effective ranges.
pub fn legacy_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Expense, TransactionKind::Income];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Ok(TransactionKind::Expense),
            "income" | "incomes" => Ok(TransactionKind::Income),
            other => Err(Error::validation(format!(
                "Unknown transaction kind '{}', expected expense|income",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// A base income source valid from `start_date` until `end_date` (inclusive, open if absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeEntry {
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default = "legacy_start_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCost {
    pub desc: String,
    pub amount: Decimal,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountKind {
    Bank,
    Wallet,
    Savings,
    Investments,
    MoneyLent,
}

impl AccountKind {
    pub const ALL: [AccountKind; 5] = [
        AccountKind::Bank,
        AccountKind::Wallet,
        AccountKind::Savings,
        AccountKind::Investments,
        AccountKind::MoneyLent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Bank => "Bank",
            AccountKind::Wallet => "Wallet",
            AccountKind::Savings => "Savings",
            AccountKind::Investments => "Investments",
            AccountKind::MoneyLent => "Money Lent",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccountKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "bank" | "bankaccount" => Ok(AccountKind::Bank),
            "wallet" => Ok(AccountKind::Wallet),
            "savings" => Ok(AccountKind::Savings),
            "investments" | "investment" => Ok(AccountKind::Investments),
            "moneylent" | "lent" => Ok(AccountKind::MoneyLent),
            _ => Err(Error::validation(format!(
                "Unknown account '{}', expected bank|wallet|savings|investments|money-lent",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl GoalPriority {
    /// Higher rank is served first.
    pub fn rank(&self) -> u8 {
        match self {
            GoalPriority::High => 3,
            GoalPriority::Medium => 2,
            GoalPriority::Low => 1,
        }
    }
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalPriority::High => "High",
            GoalPriority::Medium => "Medium",
            GoalPriority::Low => "Low",
        };
        f.write_str(s)
    }
}

impl FromStr for GoalPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(GoalPriority::High),
            "medium" => Ok(GoalPriority::Medium),
            "low" => Ok(GoalPriority::Low),
            other => Err(Error::validation(format!(
                "Unknown priority '{}', expected high|medium|low",
                other
            ))),
        }
    }
}

fn default_goal_category() -> String {
    "General".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub allocated_amount: Decimal,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default = "default_goal_category")]
    pub category: String,
    pub created_date: NaiveDate,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    /// Planned monthly top-up. Informational only; nothing moves money on its own.
    #[serde(default)]
    pub monthly_contribution: Decimal,
}

impl SavingsGoal {
    pub fn is_complete(&self) -> bool {
        self.allocated_amount >= self.target_amount
    }

    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.allocated_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub date: NaiveDate,
    pub bank_balance: Decimal,
    pub wallet_balance: Decimal,
    pub savings_balance: Decimal,
    pub investment_balance: Decimal,
    pub money_lent_balance: Decimal,
    pub net_worth: Decimal,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub borrower: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

/// A pair of values keyed the way the document keys them: `{"Expense": .., "Income": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByKind<T> {
    #[serde(rename = "Expense", default)]
    pub expense: T,
    #[serde(rename = "Income", default)]
    pub income: T,
}

impl<T> ByKind<T> {
    pub fn get(&self, kind: TransactionKind) -> &T {
        match kind {
            TransactionKind::Expense => &self.expense,
            TransactionKind::Income => &self.income,
        }
    }

    pub fn get_mut(&mut self, kind: TransactionKind) -> &mut T {
        match kind {
            TransactionKind::Expense => &mut self.expense,
            TransactionKind::Income => &mut self.income,
        }
    }
}

pub type CategoryLists = ByKind<Vec<String>>;
pub type CategoryBudgets = ByKind<BTreeMap<String, Decimal>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSettings {
    #[serde(default)]
    pub monthly_income: Vec<IncomeEntry>,
    #[serde(default)]
    pub fixed_costs: Vec<FixedCost>,
    #[serde(default)]
    pub bank_account_balance: Decimal,
    #[serde(default)]
    pub wallet_balance: Decimal,
    #[serde(default)]
    pub savings_balance: Decimal,
    #[serde(default)]
    pub investment_balance: Decimal,
    #[serde(default)]
    pub money_lent_balance: Decimal,
    #[serde(default)]
    pub daily_savings_goal: Decimal,
    #[serde(default)]
    pub category_budgets: CategoryBudgets,
    #[serde(default)]
    pub savings_goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub asset_snapshots: Vec<AssetSnapshot>,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

impl BudgetSettings {
    pub fn balance(&self, kind: AccountKind) -> Decimal {
        match kind {
            AccountKind::Bank => self.bank_account_balance,
            AccountKind::Wallet => self.wallet_balance,
            AccountKind::Savings => self.savings_balance,
            AccountKind::Investments => self.investment_balance,
            AccountKind::MoneyLent => self.money_lent_balance,
        }
    }

    pub fn balance_mut(&mut self, kind: AccountKind) -> &mut Decimal {
        match kind {
            AccountKind::Bank => &mut self.bank_account_balance,
            AccountKind::Wallet => &mut self.wallet_balance,
            AccountKind::Savings => &mut self.savings_balance,
            AccountKind::Investments => &mut self.investment_balance,
            AccountKind::MoneyLent => &mut self.money_lent_balance,
        }
    }

    pub fn total_allocated(&self) -> Decimal {
        self.savings_goals.iter().map(|g| g.allocated_amount).sum()
    }
}

/// The whole persisted state. One of these lives in the store for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub expenses: Vec<Transaction>,
    #[serde(default)]
    pub incomes: Vec<Transaction>,
    #[serde(default)]
    pub budget_settings: BudgetSettings,
    #[serde(default)]
    pub categories: CategoryLists,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            expenses: Vec::new(),
            incomes: Vec::new(),
            budget_settings: BudgetSettings::default(),
            categories: ByKind {
                expense: DEFAULT_EXPENSE_CATEGORIES.iter().map(|s| s.to_string()).collect(),
                income: DEFAULT_INCOME_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            },
        }
    }
}

impl Document {
    pub fn transactions(&self, kind: TransactionKind) -> &Vec<Transaction> {
        match kind {
            TransactionKind::Expense => &self.expenses,
            TransactionKind::Income => &self.incomes,
        }
    }

    pub fn transactions_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Expense => &mut self.expenses,
            TransactionKind::Income => &mut self.incomes,
        }
    }

    pub fn categories(&self, kind: TransactionKind) -> &[String] {
        self.categories.get(kind)
    }

    /// Transactions of `kind` dated inside `month` ("YYYY-MM").
    pub fn in_month<'a>(
        &'a self,
        kind: TransactionKind,
        month: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions(kind)
            .iter()
            .filter(move |t| t.date.format("%Y-%m").to_string() == month)
    }
}
