//! Domain models for Aom

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wallet flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Single-member wallet created with every user
    Personal,
    /// Shared wallet joined through an invite code
    Family,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Family => "family",
        }
    }
}

impl std::str::FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "family" => Ok(Self::Family),
            _ => Err(format!("Unknown group kind: {}", s)),
        }
    }
}

/// Transaction source - how it was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Typed into the chat channel
    #[default]
    Chat,
    /// Entered through the web app
    Web,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Web => "web",
        }
    }
}

impl std::str::FromStr for TransactionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "web" => Ok(Self::Web),
            _ => Err(format!("Unknown transaction source: {}", s)),
        }
    }
}

/// One-time badges a user can unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// First transaction ever recorded
    FirstRecord,
    /// Streak reached 7 days
    WeekStreak,
    /// Streak reached 30 days
    MonthStreak,
    /// First savings goal created
    FirstGoal,
    /// A savings goal reached its target
    GoalReached,
    /// Saved 10,000 or more into goals
    Saver10k,
}

impl Achievement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstRecord => "first_record",
            Self::WeekStreak => "week_streak",
            Self::MonthStreak => "month_streak",
            Self::FirstGoal => "first_goal",
            Self::GoalReached => "goal_reached",
            Self::Saver10k => "saver_10k",
        }
    }

    pub fn all() -> &'static [Achievement] {
        &[
            Self::FirstRecord,
            Self::WeekStreak,
            Self::MonthStreak,
            Self::FirstGoal,
            Self::GoalReached,
            Self::Saver10k,
        ]
    }
}

impl std::str::FromStr for Achievement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown achievement: {}", s))
    }
}

impl std::fmt::Display for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque id assigned by the messaging platform
    pub id: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    /// Wallet new transactions are written to
    pub current_group_id: i64,
    pub personal_group_id: i64,
    pub streak: i64,
    /// Local calendar day of the last recorded transaction
    pub last_record_day: Option<NaiveDate>,
    /// Cumulative amount added to savings goals
    pub total_saved: f64,
    /// Unlocked achievements in unlock order
    pub achievements: Vec<Achievement>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }
}

/// A wallet that owns categories and transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub kind: GroupKind,
    /// Only family wallets carry an invite code
    pub invite_code: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// A member of a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

/// A transaction category belonging to one wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub icon: String,
    pub kind: TransactionKind,
    /// Monthly spending limit
    pub budget_limit: Option<f64>,
    /// Percentage of the limit that triggers a warning
    pub alert_percent: Option<f64>,
}

/// Category creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub kind: TransactionKind,
    pub budget_limit: Option<f64>,
    pub alert_percent: Option<f64>,
}

fn default_icon() -> String {
    "📦".to_string()
}

/// A recorded transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub group_id: i64,
    /// Who entered it
    pub user_id: String,
    /// May point at a deleted category
    pub category_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
    /// "YYYY-MM" in the configured local offset, used as the query partition
    pub month: String,
    pub note: String,
    pub tags: Vec<String>,
    pub source: TransactionSource,
}

/// Transaction insert payload
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub group_id: i64,
    pub user_id: String,
    pub category_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
    pub month: String,
    pub note: String,
    pub tags: Vec<String>,
    pub source: TransactionSource,
}

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: i64,
    pub group_id: i64,
    pub user_id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    /// Progress towards the target, 0-100
    pub fn percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 100.0;
        }
        (self.current_amount / self.target_amount * 100.0).min(100.0)
    }
}

/// One mood journal entry per user per local day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyJournal {
    pub id: i64,
    pub user_id: String,
    pub day: NaiveDate,
    /// 1 (bad) to 5 (great)
    pub mood: Option<u8>,
    pub note: String,
    pub income_total: f64,
    pub expense_total: f64,
}

/// Income/expense totals for one wallet and month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub transaction_count: i64,
}

impl MonthSummary {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Spending or earning total for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_id: Option<i64>,
    pub name: String,
    pub icon: String,
    pub kind: TransactionKind,
    pub total: f64,
    pub count: i64,
}

/// Totals for one local day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub transactions: Vec<Transaction>,
    pub mood: Option<u8>,
}

/// Budget usage for one expense category this month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category_id: i64,
    pub name: String,
    pub icon: String,
    pub limit: f64,
    pub spent: f64,
    pub alert_percent: f64,
}

impl BudgetStatus {
    pub fn percent(&self) -> f64 {
        if self.limit <= 0.0 {
            return 0.0;
        }
        self.spent / self.limit * 100.0
    }

    pub fn is_exceeded(&self) -> bool {
        self.spent > self.limit
    }

    pub fn is_alerting(&self) -> bool {
        self.percent() >= self.alert_percent
    }
}

/// Lifetime counters for the stats command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub streak: i64,
    pub transaction_count: i64,
    pub days_recorded: i64,
    pub total_saved: f64,
    pub achievement_count: usize,
}

/// An expense that repeats across months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringBill {
    pub category_name: String,
    pub note: String,
    pub amount: f64,
    pub months_seen: usize,
    pub last_seen: String,
}
