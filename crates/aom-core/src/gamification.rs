//! Streak and achievement bookkeeping
//!
//! Streaks count consecutive local days with at least one recorded
//! transaction. Achievements are one-time: unlocking is a membership-checked
//! insert, so crossing a threshold again after a reset is a silent no-op.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Achievement, User};

/// Streak length that unlocks [`Achievement::WeekStreak`]
pub const WEEK_STREAK: i64 = 7;

/// Streak length that unlocks [`Achievement::MonthStreak`]
pub const MONTH_STREAK: i64 = 30;

/// Cumulative savings that unlock [`Achievement::Saver10k`]
pub const SAVER_THRESHOLD: f64 = 10_000.0;

/// New streak value after recording on `today`, or `None` if already recorded today
pub fn next_streak(current: i64, last_record_day: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    match last_record_day {
        Some(last) if last == today => None,
        Some(last) if last + Duration::days(1) == today => Some(current + 1),
        _ => Some(1),
    }
}

/// Achievements a record with this streak qualifies for
pub fn streak_achievements(streak: i64) -> Vec<Achievement> {
    let mut earned = vec![Achievement::FirstRecord];
    if streak == WEEK_STREAK {
        earned.push(Achievement::WeekStreak);
    }
    if streak == MONTH_STREAK {
        earned.push(Achievement::MonthStreak);
    }
    earned
}

/// Result of recording activity for a user
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOutcome {
    pub streak: i64,
    pub new_achievements: Vec<Achievement>,
}

/// Applies streak and achievement rules against the database
pub struct Gamification<'a> {
    db: &'a Database,
}

impl<'a> Gamification<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Update streak fields and unlock streak achievements after a recorded transaction
    ///
    /// A second record on the same day writes nothing to the user row.
    pub fn record_activity(
        &self,
        user: &User,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome> {
        let streak = match next_streak(user.streak, user.last_record_day, today) {
            Some(streak) => {
                self.db.update_streak(&user.id, streak, today)?;
                streak
            }
            None => user.streak,
        };

        let mut new_achievements = Vec::new();
        for achievement in streak_achievements(streak) {
            if self.unlock(user, achievement, now)? {
                new_achievements.push(achievement);
            }
        }

        Ok(ActivityOutcome {
            streak,
            new_achievements,
        })
    }

    /// Unlock `first_goal` after a user creates a goal
    pub fn goal_created(&self, user: &User, now: DateTime<Utc>) -> Result<Vec<Achievement>> {
        let mut unlocked = Vec::new();
        if self.unlock(user, Achievement::FirstGoal, now)? {
            unlocked.push(Achievement::FirstGoal);
        }
        Ok(unlocked)
    }

    /// Unlock savings achievements after money is added to a goal
    pub fn goal_deposit(
        &self,
        user: &User,
        goal_completed: bool,
        total_saved: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Achievement>> {
        let mut candidates = Vec::new();
        if goal_completed {
            candidates.push(Achievement::GoalReached);
        }
        if total_saved >= SAVER_THRESHOLD {
            candidates.push(Achievement::Saver10k);
        }

        let mut unlocked = Vec::new();
        for achievement in candidates {
            if self.unlock(user, achievement, now)? {
                unlocked.push(achievement);
            }
        }
        Ok(unlocked)
    }

    /// Returns true only when the achievement was not held before
    fn unlock(&self, user: &User, achievement: Achievement, now: DateTime<Utc>) -> Result<bool> {
        if user.has_achievement(achievement) {
            return Ok(false);
        }
        let inserted = self.db.unlock_achievement(&user.id, achievement, now)?;
        if inserted {
            info!(user_id = %user.id, achievement = %achievement, "Achievement unlocked");
        }
        Ok(inserted)
    }
}
