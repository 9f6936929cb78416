//! Response intents
//!
//! Everything the chat engine decides is expressed as a [`ResponseIntent`].
//! Intents carry the data needed to reply; turning them into a transport
//! payload is the job of a rendering adapter outside this crate.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::*;

/// Warning attached to an expense that pushed a category near or over budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub category_name: String,
    pub spent: f64,
    pub limit: f64,
    pub percent: f64,
    pub exceeded: bool,
}

/// A transaction recorded from Smart Input, with the bookkeeping it caused
#[derive(Debug, Clone, Serialize)]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub category_name: String,
    pub category_icon: String,
    pub streak: i64,
    pub new_achievements: Vec<Achievement>,
    pub budget_alert: Option<BudgetAlert>,
    pub month_income: f64,
    pub month_expense: f64,
}

/// Closed set of replies the engine can ask for
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ResponseIntent {
    Welcome {
        display_name: String,
    },
    RenderHelp,
    RenderTodaySummary {
        summary: DaySummary,
    },
    RenderMonthlySummary {
        summary: MonthSummary,
        top_expenses: Vec<CategoryTotal>,
    },
    RenderTopCategories {
        month: String,
        categories: Vec<CategoryTotal>,
    },
    RenderBudgets {
        month: String,
        budgets: Vec<BudgetStatus>,
    },
    RenderGoals {
        goals: Vec<SavingsGoal>,
    },
    RenderAchievements {
        unlocked: Vec<Achievement>,
    },
    RenderStats {
        stats: UserStats,
    },
    RenderRecurringBills {
        bills: Vec<RecurringBill>,
    },
    /// `switched` is set when the command moved the user into this wallet
    RenderFamily {
        group: Group,
        members: Vec<GroupMember>,
        switched: bool,
    },
    NotInFamily,
    SwitchedWallet {
        group: Group,
    },
    UndoDone {
        transaction: Transaction,
    },
    NothingToUndo,
    BudgetSet {
        category: Category,
    },
    GoalCreated {
        goal: SavingsGoal,
        new_achievements: Vec<Achievement>,
    },
    GoalUpdated {
        goal: SavingsGoal,
        added: f64,
        new_achievements: Vec<Achievement>,
    },
    GoalNotFound {
        name: String,
    },
    MoodSet {
        day: NaiveDate,
        mood: u8,
    },
    InvalidMood,
    NoteSet {
        day: NaiveDate,
        note: String,
    },
    FamilyCreated {
        group: Group,
    },
    FamilyJoined {
        group: Group,
        already_member: bool,
    },
    InviteCodeNotFound {
        code: String,
    },
    InvalidAmount {
        input: String,
    },
    CategoryNotFound {
        label: String,
        kind: TransactionKind,
        suggestions: Vec<String>,
    },
    TransactionRecorded(Box<RecordedTransaction>),
    /// Generic "something went wrong" reply after a caught failure
    Failure,
}

impl ResponseIntent {
    /// Short stable name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::RenderHelp => "render_help",
            Self::RenderTodaySummary { .. } => "render_today_summary",
            Self::RenderMonthlySummary { .. } => "render_monthly_summary",
            Self::RenderTopCategories { .. } => "render_top_categories",
            Self::RenderBudgets { .. } => "render_budgets",
            Self::RenderGoals { .. } => "render_goals",
            Self::RenderAchievements { .. } => "render_achievements",
            Self::RenderStats { .. } => "render_stats",
            Self::RenderRecurringBills { .. } => "render_recurring_bills",
            Self::RenderFamily { .. } => "render_family",
            Self::NotInFamily => "not_in_family",
            Self::SwitchedWallet { .. } => "switched_wallet",
            Self::UndoDone { .. } => "undo_done",
            Self::NothingToUndo => "nothing_to_undo",
            Self::BudgetSet { .. } => "budget_set",
            Self::GoalCreated { .. } => "goal_created",
            Self::GoalUpdated { .. } => "goal_updated",
            Self::GoalNotFound { .. } => "goal_not_found",
            Self::MoodSet { .. } => "mood_set",
            Self::InvalidMood => "invalid_mood",
            Self::NoteSet { .. } => "note_set",
            Self::FamilyCreated { .. } => "family_created",
            Self::FamilyJoined { .. } => "family_joined",
            Self::InviteCodeNotFound { .. } => "invite_code_not_found",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::CategoryNotFound { .. } => "category_not_found",
            Self::TransactionRecorded(_) => "transaction_recorded",
            Self::Failure => "failure",
        }
    }
}
