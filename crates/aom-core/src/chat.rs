//! Chat engine: message classifier and ledger updater
//!
//! One inbound text message becomes at most one [`ResponseIntent`]. Commands
//! are checked first; anything else goes through Smart Input. A classified
//! transaction is exactly one transaction insert followed by a separate
//! user update for streaks. The two writes are not atomic: two deliveries
//! for the same user racing each other can lose a streak increment.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::calendar::LocalCalendar;
use crate::commands::{parse_command, Command};
use crate::config::AppConfig;
use crate::db::{Database, JournalUpdate};
use crate::error::{Error, Result};
use crate::gamification::Gamification;
use crate::intent::{BudgetAlert, RecordedTransaction, ResponseIntent};
use crate::models::*;
use crate::recurring::RecurringDetector;
use crate::smart_input;

/// Turns chat text into ledger writes and response intents
#[derive(Clone)]
pub struct ChatEngine {
    db: Database,
    config: AppConfig,
    calendar: LocalCalendar,
}

impl ChatEngine {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let calendar = LocalCalendar::new(config.offset());
        Self {
            db,
            config,
            calendar,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn calendar(&self) -> &LocalCalendar {
        &self.calendar
    }

    /// First contact from the messaging platform: create or refresh the user
    pub fn welcome(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        picture_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResponseIntent> {
        let (user, _) = self.db.get_or_create_user(user_id, display_name, now)?;
        let display_name = display_name
            .map(str::to_string)
            .unwrap_or(user.display_name);
        self.db.update_user_profile(
            user_id,
            &display_name,
            picture_url.or(user.picture_url.as_deref()),
        )?;
        Ok(ResponseIntent::Welcome { display_name })
    }

    /// Classify one message; `None` means no reply should be sent
    pub fn handle_text(
        &self,
        user_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResponseIntent>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let (user, _) = self.db.get_or_create_user(user_id, None, now)?;

        let intent = match parse_command(text) {
            Some(command) => {
                debug!(user_id = %user.id, ?command, "Dispatching command");
                Some(self.execute(&user, command, now)?)
            }
            None => self.record(&user, text, now)?,
        };

        if let Some(ref intent) = intent {
            debug!(user_id = %user.id, intent = intent.name(), "Classified message");
        }
        Ok(intent)
    }

    fn execute(&self, user: &User, command: Command, now: DateTime<Utc>) -> Result<ResponseIntent> {
        let group_id = user.current_group_id;
        let today = self.calendar.day(now);
        let month = self.calendar.month_key(now);

        let intent = match command {
            Command::Help => ResponseIntent::RenderHelp,
            Command::TodaySummary => ResponseIntent::RenderTodaySummary {
                summary: self
                    .db
                    .day_summary(group_id, &user.id, today, &self.calendar)?,
            },
            Command::MonthlySummary => {
                let summary = self.db.month_summary(group_id, &month)?;
                let mut top_expenses =
                    self.db
                        .category_totals(group_id, &month, TransactionKind::Expense)?;
                top_expenses.truncate(self.config.top_categories_limit);
                ResponseIntent::RenderMonthlySummary {
                    summary,
                    top_expenses,
                }
            }
            Command::TopCategories => {
                let mut categories =
                    self.db
                        .category_totals(group_id, &month, TransactionKind::Expense)?;
                categories.truncate(self.config.top_categories_limit);
                ResponseIntent::RenderTopCategories { month, categories }
            }
            Command::Budgets => ResponseIntent::RenderBudgets {
                budgets: self.db.budget_statuses(
                    group_id,
                    &month,
                    self.config.default_alert_percent,
                )?,
                month,
            },
            Command::Goals => ResponseIntent::RenderGoals {
                goals: self.db.list_goals(group_id)?,
            },
            Command::Achievements => ResponseIntent::RenderAchievements {
                unlocked: user.achievements.clone(),
            },
            Command::Stats => ResponseIntent::RenderStats {
                stats: self.db.user_stats(user, self.config.utc_offset_hours)?,
            },
            Command::RecurringBills => ResponseIntent::RenderRecurringBills {
                bills: RecurringDetector::new(&self.db).detect(group_id, &month)?,
            },
            Command::Family => {
                let current = self.current_group(user)?;
                if current.kind == GroupKind::Family {
                    let members = self.db.list_group_members(current.id)?;
                    ResponseIntent::RenderFamily {
                        group: current,
                        members,
                        switched: false,
                    }
                } else {
                    // From the personal wallet, go back to the newest family the user is in
                    let family = self
                        .db
                        .list_user_groups(&user.id)?
                        .into_iter()
                        .rev()
                        .find(|g| g.kind == GroupKind::Family);
                    match family {
                        Some(group) => {
                            self.db.set_current_group(&user.id, group.id)?;
                            info!(user_id = %user.id, group_id = group.id, "Switched to family wallet");
                            let members = self.db.list_group_members(group.id)?;
                            ResponseIntent::RenderFamily {
                                group,
                                members,
                                switched: true,
                            }
                        }
                        None => ResponseIntent::NotInFamily,
                    }
                }
            }
            Command::PersonalWallet => {
                self.db.set_current_group(&user.id, user.personal_group_id)?;
                let group = self
                    .db
                    .get_group(user.personal_group_id)?
                    .ok_or_else(|| Error::NotFound(format!("wallet {}", user.personal_group_id)))?;
                ResponseIntent::SwitchedWallet { group }
            }
            Command::Undo => match self.db.last_transaction_by_user(group_id, &user.id)? {
                Some(transaction) => {
                    self.db.delete_transaction(transaction.id)?;
                    info!(user_id = %user.id, id = transaction.id, "Undid last transaction");
                    ResponseIntent::UndoDone { transaction }
                }
                None => ResponseIntent::NothingToUndo,
            },
            Command::SetBudget { name, amount } => match amount {
                Err(input) => ResponseIntent::InvalidAmount { input },
                Ok(amount) => match self.db.find_category_by_name(group_id, &name)? {
                    Some(category) => ResponseIntent::BudgetSet {
                        category: self.db.set_category_budget(category.id, Some(amount), None)?,
                    },
                    None => {
                        let categories = self.db.list_categories(group_id, None)?;
                        ResponseIntent::CategoryNotFound {
                            label: name,
                            kind: TransactionKind::Expense,
                            suggestions: smart_input::suggestions(
                                &categories,
                                TransactionKind::Expense,
                                self.config.suggestion_limit,
                            ),
                        }
                    }
                },
            },
            Command::CreateGoal { name, amount } => match amount {
                Err(input) => ResponseIntent::InvalidAmount { input },
                Ok(amount) => {
                    let goal = self.db.create_goal(group_id, &user.id, &name, amount, now)?;
                    let new_achievements = Gamification::new(&self.db).goal_created(user, now)?;
                    ResponseIntent::GoalCreated {
                        goal,
                        new_achievements,
                    }
                }
            },
            Command::AddToGoal { name, amount } => match amount {
                Err(input) => ResponseIntent::InvalidAmount { input },
                Ok(amount) => match self.db.find_goal_by_name(group_id, &name)? {
                    Some(goal) => {
                        let goal = self.db.add_to_goal(goal.id, amount)?;
                        let total_saved = self.db.add_total_saved(&user.id, amount)?;
                        let new_achievements = Gamification::new(&self.db).goal_deposit(
                            user,
                            goal.completed,
                            total_saved,
                            now,
                        )?;
                        ResponseIntent::GoalUpdated {
                            goal,
                            added: amount,
                            new_achievements,
                        }
                    }
                    None => ResponseIntent::GoalNotFound { name },
                },
            },
            Command::SetMood(None) => ResponseIntent::InvalidMood,
            Command::SetMood(Some(mood)) => {
                self.write_journal(user, now, Some(mood), None)?;
                ResponseIntent::MoodSet { day: today, mood }
            }
            Command::SetNote(note) => {
                self.write_journal(user, now, None, Some(&note))?;
                ResponseIntent::NoteSet { day: today, note }
            }
            Command::CreateFamily(name) => ResponseIntent::FamilyCreated {
                group: self.db.create_family_group(&user.id, &name, now)?,
            },
            Command::JoinFamily(code) => match self.db.find_group_by_invite_code(&code)? {
                Some(group) => {
                    let joined = self.db.join_group(group.id, &user.id, now)?;
                    ResponseIntent::FamilyJoined {
                        group,
                        already_member: !joined,
                    }
                }
                None => ResponseIntent::InviteCodeNotFound { code },
            },
        };
        Ok(intent)
    }

    /// Smart Input path
    fn record(&self, user: &User, text: &str, now: DateTime<Utc>) -> Result<Option<ResponseIntent>> {
        let Some(parsed) = smart_input::parse(text) else {
            return Ok(None);
        };

        let group_id = user.current_group_id;
        let categories = self.db.list_categories(group_id, None)?;
        let Some(category) = smart_input::resolve_category(&categories, &parsed) else {
            return Ok(Some(ResponseIntent::CategoryNotFound {
                suggestions: smart_input::suggestions(
                    &categories,
                    parsed.kind,
                    self.config.suggestion_limit,
                ),
                label: parsed.label,
                kind: parsed.kind,
            }));
        };

        let month = self.calendar.month_key(now);
        let transaction = self.db.insert_transaction(&NewTransaction {
            group_id,
            user_id: user.id.clone(),
            category_id: Some(category.id),
            kind: category.kind,
            amount: parsed.amount,
            occurred_at: now,
            month: month.clone(),
            note: parsed.note,
            tags: parsed.tags,
            source: TransactionSource::Chat,
        })?;
        info!(
            user_id = %user.id,
            group_id,
            category = %category.name,
            kind = %category.kind,
            amount = transaction.amount,
            "Recorded transaction"
        );

        let activity =
            Gamification::new(&self.db).record_activity(user, self.calendar.day(now), now)?;
        let budget_alert = self.budget_alert(category, &month)?;
        let summary = self.db.month_summary(group_id, &month)?;

        Ok(Some(ResponseIntent::TransactionRecorded(Box::new(
            RecordedTransaction {
                transaction,
                category_name: category.name.clone(),
                category_icon: category.icon.clone(),
                streak: activity.streak,
                new_achievements: activity.new_achievements,
                budget_alert,
                month_income: summary.income,
                month_expense: summary.expense,
            },
        ))))
    }

    fn budget_alert(&self, category: &Category, month: &str) -> Result<Option<BudgetAlert>> {
        let limit = match (category.kind, category.budget_limit) {
            (TransactionKind::Expense, Some(limit)) if limit > 0.0 => limit,
            _ => return Ok(None),
        };

        let spent = self.db.category_spent(category.id, month)?;
        let percent = spent / limit * 100.0;
        let threshold = category
            .alert_percent
            .unwrap_or(self.config.default_alert_percent);
        if percent < threshold {
            return Ok(None);
        }

        Ok(Some(BudgetAlert {
            category_name: category.name.clone(),
            spent,
            limit,
            percent,
            exceeded: spent > limit,
        }))
    }

    /// Write mood or note into today's journal, refreshing the day's totals
    fn write_journal(
        &self,
        user: &User,
        now: DateTime<Utc>,
        mood: Option<u8>,
        note: Option<&str>,
    ) -> Result<DailyJournal> {
        let today = self.calendar.day(now);
        let (from, to) = self.calendar.day_bounds(today);
        let (income_total, expense_total) = self.db.user_totals_between(&user.id, from, to)?;

        self.db.upsert_journal(
            &user.id,
            today,
            &JournalUpdate {
                mood,
                note,
                income_total,
                expense_total,
            },
        )
    }

    fn current_group(&self, user: &User) -> Result<Group> {
        self.db
            .get_group(user.current_group_id)?
            .ok_or_else(|| Error::NotFound(format!("wallet {}", user.current_group_id)))
    }
}
