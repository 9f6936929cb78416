//! Integration tests for aom-core
//!
//! These tests drive the chat engine end to end: text in, intent out,
//! ledger and gamification state checked through the database.

use aom_core::{
    config::AppConfig,
    db::Database,
    models::{Achievement, GroupKind, TransactionKind},
    ChatEngine, Gamification, ResponseIntent,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// 2024-05-10 12:00 in Bangkok
fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 5, 0, 0).unwrap()
}

fn engine() -> ChatEngine {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    ChatEngine::new(db, AppConfig::default())
}

fn say(engine: &ChatEngine, user: &str, text: &str, at: DateTime<Utc>) -> Option<ResponseIntent> {
    engine.handle_text(user, text, at).expect("handle_text failed")
}

fn recorded(intent: Option<ResponseIntent>) -> aom_core::RecordedTransaction {
    match intent {
        Some(ResponseIntent::TransactionRecorded(recorded)) => *recorded,
        other => panic!("expected TransactionRecorded, got {:?}", other),
    }
}

fn transaction_count(engine: &ChatEngine, user: &str) -> usize {
    let user = engine.db().get_user(user).unwrap().unwrap();
    engine
        .db()
        .list_transactions(user.current_group_id, None, 1000, 0)
        .unwrap()
        .len()
}

// =============================================================================
// Smart Input scenarios
// =============================================================================

#[test]
fn test_exact_category_expense() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "อาหาร 150", noon()));

    assert_eq!(rec.transaction.amount, 150.0);
    assert_eq!(rec.transaction.kind, TransactionKind::Expense);
    assert_eq!(rec.transaction.note, "");
    assert_eq!(rec.transaction.month, "2024-05");
    assert_eq!(rec.category_name, "อาหาร");
    assert_eq!(rec.month_expense, 150.0);
}

#[test]
fn test_label_amount_note() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "เดินทาง 50 ค่าแท็กซี่", noon()));

    assert_eq!(rec.transaction.amount, 50.0);
    assert_eq!(rec.transaction.kind, TransactionKind::Expense);
    assert_eq!(rec.transaction.note, "ค่าแท็กซี่");
    assert_eq!(rec.category_name, "เดินทาง");
}

#[test]
fn test_income_keyword_that_is_also_a_category() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "เงินเดือน 25000", noon()));

    assert_eq!(rec.transaction.kind, TransactionKind::Income);
    assert_eq!(rec.transaction.amount, 25000.0);
    assert_eq!(rec.category_name, "เงินเดือน");
    assert_eq!(rec.month_income, 25000.0);
}

#[test]
fn test_unknown_label_without_fallback_is_category_not_found() {
    let engine = engine();
    let (user, _) = engine.db().get_or_create_user("U1", None, noon()).unwrap();
    let others = engine
        .db()
        .find_category_by_name(user.current_group_id, "อื่นๆ")
        .unwrap()
        .unwrap();
    engine.db().delete_category(others.id).unwrap();

    match say(&engine, "U1", "ซื้อของแปลกๆ 99", noon()) {
        Some(ResponseIntent::CategoryNotFound {
            label,
            kind,
            suggestions,
        }) => {
            assert_eq!(label, "ซื้อของแปลกๆ");
            assert_eq!(kind, TransactionKind::Expense);
            assert_eq!(suggestions.len(), 5);
            assert_eq!(suggestions[0], "อาหาร");
        }
        other => panic!("expected CategoryNotFound, got {:?}", other),
    }
    assert_eq!(transaction_count(&engine, "U1"), 0);
}

#[test]
fn test_unknown_label_uses_others_fallback() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "ข้าวมันไก่ 45", noon()));
    assert_eq!(rec.category_name, "อื่นๆ");
}

#[test]
fn test_exact_name_overrides_income_keyword() {
    // Pins current behaviour: the exact category match decides the kind,
    // even when the text also carries an income keyword.
    let engine = engine();
    let (user, _) = engine.db().get_or_create_user("U1", None, noon()).unwrap();
    engine
        .db()
        .create_category(
            user.current_group_id,
            &aom_core::models::NewCategory {
                name: "รับส่งลูก".to_string(),
                icon: "🚸".to_string(),
                kind: TransactionKind::Expense,
                budget_limit: None,
                alert_percent: None,
            },
        )
        .unwrap();

    let rec = recorded(say(&engine, "U1", "รับส่งลูก 80", noon()));
    assert_eq!(rec.transaction.kind, TransactionKind::Expense);
    assert_eq!(rec.category_name, "รับส่งลูก");
}

#[test]
fn test_income_keyword_falls_back_to_income_category() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "ได้เงินจากแม่ 500", noon()));
    assert_eq!(rec.transaction.kind, TransactionKind::Income);
    assert_eq!(rec.category_name, "รายได้อื่นๆ");
}

#[test]
fn test_conversation_without_number_is_ignored() {
    let engine = engine();
    assert!(say(&engine, "U1", "สวัสดีครับ", noon()).is_none());
    assert!(say(&engine, "U1", "   ", noon()).is_none());
    assert!(say(&engine, "U1", "อาหาร 0", noon()).is_none());
    assert_eq!(transaction_count(&engine, "U1"), 0);
}

#[test]
fn test_overflowing_amount_is_not_recorded() {
    let engine = engine();
    let text = format!("อาหาร {}", "9".repeat(400));
    assert!(say(&engine, "U1", &text, noon()).is_none());
    assert_eq!(transaction_count(&engine, "U1"), 0);

    let budget = format!("ตั้งงบ อาหาร {}", "9".repeat(400));
    assert!(matches!(
        say(&engine, "U1", &budget, noon()),
        Some(ResponseIntent::InvalidAmount { .. })
    ));
}

#[test]
fn test_hashtags_become_tags() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "อาหาร 120 ข้าวเที่ยง #Work", noon()));
    assert_eq!(rec.transaction.tags, vec!["work"]);
    assert_eq!(rec.transaction.note, "ข้าวเที่ยง #Work");
}

// =============================================================================
// Streaks and achievements
// =============================================================================

#[test]
fn test_first_record_for_new_user() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "อาหาร 150", noon()));
    assert_eq!(rec.streak, 1);
    assert_eq!(rec.new_achievements, vec![Achievement::FirstRecord]);

    let user = engine.db().get_user("U1").unwrap().unwrap();
    assert_eq!(user.streak, 1);
    assert_eq!(
        user.last_record_day,
        Some(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
    );
    assert_eq!(user.achievements, vec![Achievement::FirstRecord]);
}

#[test]
fn test_second_record_same_day_keeps_streak() {
    let engine = engine();
    say(&engine, "U1", "อาหาร 150", noon());
    let rec = recorded(say(&engine, "U1", "อาหาร 60", noon() + Duration::hours(3)));
    assert_eq!(rec.streak, 1);
    assert!(rec.new_achievements.is_empty());
    assert_eq!(transaction_count(&engine, "U1"), 2);
}

#[test]
fn test_streak_uses_local_days() {
    let engine = engine();
    // 16:00 UTC on the 10th is 23:00 local; 18:00 UTC is already the 11th locally
    let late = Utc.with_ymd_and_hms(2024, 5, 10, 16, 0, 0).unwrap();
    say(&engine, "U1", "อาหาร 10", late);
    let rec = recorded(say(&engine, "U1", "อาหาร 10", late + Duration::hours(2)));
    assert_eq!(rec.streak, 2);
}

#[test]
fn test_week_streak_unlocks_exactly_once() {
    let engine = engine();
    let mut unlocked_week = 0;
    for day in 0..7 {
        let rec = recorded(say(&engine, "U1", "อาหาร 10", noon() + Duration::days(day)));
        assert_eq!(rec.streak, day + 1);
        if rec.new_achievements.contains(&Achievement::WeekStreak) {
            unlocked_week += 1;
            assert_eq!(rec.streak, 7);
        }
    }
    assert_eq!(unlocked_week, 1);

    // Day 8 keeps growing without another week badge
    let rec = recorded(say(&engine, "U1", "อาหาร 10", noon() + Duration::days(7)));
    assert_eq!(rec.streak, 8);
    assert!(rec.new_achievements.is_empty());
}

#[test]
fn test_recrossing_week_after_reset_is_a_no_op() {
    let engine = engine();
    for day in 0..7 {
        say(&engine, "U1", "อาหาร 10", noon() + Duration::days(day));
    }

    // Skip two days, then build another 7-day run
    let restart = noon() + Duration::days(9);
    let first = recorded(say(&engine, "U1", "อาหาร 10", restart));
    assert_eq!(first.streak, 1);

    for day in 1..7 {
        let rec = recorded(say(&engine, "U1", "อาหาร 10", restart + Duration::days(day)));
        assert_eq!(rec.streak, day + 1);
        assert!(!rec.new_achievements.contains(&Achievement::WeekStreak));
    }

    let user = engine.db().get_user("U1").unwrap().unwrap();
    let weeks = user
        .achievements
        .iter()
        .filter(|a| **a == Achievement::WeekStreak)
        .count();
    assert_eq!(weeks, 1);
}

#[test]
fn test_month_streak_at_thirty() {
    let engine = engine();
    let mut last = None;
    for day in 0..30 {
        last = Some(recorded(say(&engine, "U1", "อาหาร 1", noon() + Duration::days(day))));
    }
    let last = last.unwrap();
    assert_eq!(last.streak, 30);
    assert_eq!(last.new_achievements, vec![Achievement::MonthStreak]);
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_stale_user_copies_lose_streak_update() {
    let engine = engine();
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
    for d in 7..=9 {
        say(&engine, "U1", "อาหาร 10", noon() - Duration::days(i64::from(10 - d)));
    }
    let loaded = engine.db().get_user("U1").unwrap().unwrap();
    assert_eq!(loaded.streak, 3);

    // Two deliveries read the user before either writes
    let first = loaded.clone();
    let second = loaded;
    let gamification = Gamification::new(engine.db());

    let outcome = gamification.record_activity(&first, day(10), noon()).unwrap();
    assert_eq!(outcome.streak, 4);
    let outcome = gamification
        .record_activity(&second, day(11), noon() + Duration::days(1))
        .unwrap();
    // The stale copy still sees the 9th as the last record, so it resets
    assert_eq!(outcome.streak, 1);

    let user = engine.db().get_user("U1").unwrap().unwrap();
    assert_eq!(user.streak, 1);
    assert_eq!(user.last_record_day, Some(day(11)));
}

#[test]
fn test_literal_command_beats_smart_input() {
    let engine = engine();
    say(&engine, "U1", "อาหาร 150", noon());
    say(&engine, "U1", "เงินเดือน 30000", noon());

    match say(&engine, "U1", "สรุป", noon()) {
        Some(ResponseIntent::RenderMonthlySummary {
            summary,
            top_expenses,
        }) => {
            assert_eq!(summary.month, "2024-05");
            assert_eq!(summary.income, 30000.0);
            assert_eq!(summary.expense, 150.0);
            assert_eq!(top_expenses.len(), 1);
        }
        other => panic!("expected monthly summary, got {:?}", other),
    }
    assert!(matches!(
        say(&engine, "U1", "SUMMARY", noon()),
        Some(ResponseIntent::RenderMonthlySummary { .. })
    ));
}

#[test]
fn test_today_summary_includes_mood() {
    let engine = engine();
    say(&engine, "U1", "อาหาร 150", noon());
    say(&engine, "U1", "mood 4", noon());

    match say(&engine, "U1", "วันนี้", noon()) {
        Some(ResponseIntent::RenderTodaySummary { summary }) => {
            assert_eq!(summary.expense, 150.0);
            assert_eq!(summary.transactions.len(), 1);
            assert_eq!(summary.mood, Some(4));
        }
        other => panic!("expected today summary, got {:?}", other),
    }

    let journal = engine
        .db()
        .get_journal("U1", NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(journal.expense_total, 150.0);
}

#[test]
fn test_invalid_mood() {
    let engine = engine();
    assert!(matches!(
        say(&engine, "U1", "mood 7", noon()),
        Some(ResponseIntent::InvalidMood)
    ));
}

#[test]
fn test_set_mood_and_set_note_write_no_transaction() {
    let engine = engine();
    assert!(matches!(
        say(&engine, "U1", "set mood 4", noon()),
        Some(ResponseIntent::MoodSet { mood: 4, .. })
    ));
    match say(&engine, "U1", "set note paid 3 bills", noon()) {
        Some(ResponseIntent::NoteSet { note, .. }) => assert_eq!(note, "paid 3 bills"),
        other => panic!("expected NoteSet, got {:?}", other),
    }
    assert_eq!(transaction_count(&engine, "U1"), 0);

    let journal = engine
        .db()
        .get_journal("U1", NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(journal.mood, Some(4));
    assert_eq!(journal.note, "paid 3 bills");
}

#[test]
fn test_note_verb_joined_to_label_is_a_transaction() {
    let engine = engine();
    let rec = recorded(say(&engine, "U1", "บันทึกค่าข้าว 50", noon()));
    assert_eq!(rec.transaction.amount, 50.0);
    assert_eq!(rec.transaction.kind, TransactionKind::Expense);
    assert_eq!(transaction_count(&engine, "U1"), 1);
}

#[test]
fn test_set_budget_and_alert() {
    let engine = engine();
    match say(&engine, "U1", "ตั้งงบ อาหาร 1,000", noon()) {
        Some(ResponseIntent::BudgetSet { category }) => {
            assert_eq!(category.name, "อาหาร");
            assert_eq!(category.budget_limit, Some(1000.0));
        }
        other => panic!("expected BudgetSet, got {:?}", other),
    }

    let rec = recorded(say(&engine, "U1", "อาหาร 500", noon()));
    assert!(rec.budget_alert.is_none());

    let rec = recorded(say(&engine, "U1", "อาหาร 400", noon()));
    let alert = rec.budget_alert.expect("90% of budget should alert");
    assert_eq!(alert.spent, 900.0);
    assert!(!alert.exceeded);

    let rec = recorded(say(&engine, "U1", "อาหาร 200", noon()));
    assert!(rec.budget_alert.unwrap().exceeded);
}

#[test]
fn test_set_budget_unknown_category_and_bad_amount() {
    let engine = engine();
    assert!(matches!(
        say(&engine, "U1", "set budget yachts 5000", noon()),
        Some(ResponseIntent::CategoryNotFound { .. })
    ));
    assert!(matches!(
        say(&engine, "U1", "set budget อาหาร abc", noon()),
        Some(ResponseIntent::InvalidAmount { .. })
    ));
}

#[test]
fn test_goal_flow_unlocks_achievements() {
    let engine = engine();
    match say(&engine, "U1", "ตั้งเป้า เที่ยวญี่ปุ่น 10000", noon()) {
        Some(ResponseIntent::GoalCreated {
            goal,
            new_achievements,
        }) => {
            assert_eq!(goal.target_amount, 10000.0);
            assert_eq!(new_achievements, vec![Achievement::FirstGoal]);
        }
        other => panic!("expected GoalCreated, got {:?}", other),
    }

    match say(&engine, "U1", "ออมเงิน ญี่ปุ่น 10000", noon()) {
        Some(ResponseIntent::GoalUpdated {
            goal,
            added,
            new_achievements,
        }) => {
            assert!(goal.completed);
            assert_eq!(added, 10000.0);
            assert_eq!(
                new_achievements,
                vec![Achievement::GoalReached, Achievement::Saver10k]
            );
        }
        other => panic!("expected GoalUpdated, got {:?}", other),
    }

    let user = engine.db().get_user("U1").unwrap().unwrap();
    assert_eq!(user.total_saved, 10000.0);

    assert!(matches!(
        say(&engine, "U1", "ออมเงิน รถ 100", noon()),
        Some(ResponseIntent::GoalNotFound { .. })
    ));
}

#[test]
fn test_undo_last() {
    let engine = engine();
    assert!(matches!(
        say(&engine, "U1", "undo", noon()),
        Some(ResponseIntent::NothingToUndo)
    ));

    say(&engine, "U1", "อาหาร 150", noon());
    say(&engine, "U1", "เดินทาง 40", noon() + Duration::minutes(1));
    match say(&engine, "U1", "ยกเลิก", noon()) {
        Some(ResponseIntent::UndoDone { transaction }) => assert_eq!(transaction.amount, 40.0),
        other => panic!("expected UndoDone, got {:?}", other),
    }
    assert_eq!(transaction_count(&engine, "U1"), 1);
}

#[test]
fn test_family_wallet_flow() {
    let engine = engine();
    assert!(matches!(
        say(&engine, "U1", "family", noon()),
        Some(ResponseIntent::NotInFamily)
    ));

    let code = match say(&engine, "U1", "create family บ้านเรา", noon()) {
        Some(ResponseIntent::FamilyCreated { group }) => {
            assert_eq!(group.kind, GroupKind::Family);
            group.invite_code.unwrap()
        }
        other => panic!("expected FamilyCreated, got {:?}", other),
    };

    match say(&engine, "U2", &format!("join {}", code.to_lowercase()), noon()) {
        Some(ResponseIntent::FamilyJoined {
            group,
            already_member,
        }) => {
            assert_eq!(group.invite_code.as_deref(), Some(code.as_str()));
            assert!(!already_member);
        }
        other => panic!("expected FamilyJoined, got {:?}", other),
    }

    // Both members record into the shared wallet
    say(&engine, "U1", "อาหาร 100", noon());
    say(&engine, "U2", "อาหาร 50", noon());
    match say(&engine, "U2", "สรุป", noon()) {
        Some(ResponseIntent::RenderMonthlySummary { summary, .. }) => {
            assert_eq!(summary.expense, 150.0)
        }
        other => panic!("expected monthly summary, got {:?}", other),
    }
    match say(&engine, "U2", "ครอบครัว", noon()) {
        Some(ResponseIntent::RenderFamily { members, .. }) => assert_eq!(members.len(), 2),
        other => panic!("expected RenderFamily, got {:?}", other),
    }

    // Switching back to the personal wallet isolates the ledger again
    assert!(matches!(
        say(&engine, "U2", "personal", noon()),
        Some(ResponseIntent::SwitchedWallet { .. })
    ));
    match say(&engine, "U2", "สรุป", noon()) {
        Some(ResponseIntent::RenderMonthlySummary { summary, .. }) => {
            assert_eq!(summary.expense, 0.0)
        }
        other => panic!("expected monthly summary, got {:?}", other),
    }

    // The family command takes the user back to the shared wallet
    match say(&engine, "U2", "ครอบครัว", noon()) {
        Some(ResponseIntent::RenderFamily {
            group,
            members,
            switched,
        }) => {
            assert!(switched);
            assert_eq!(group.invite_code.as_deref(), Some(code.as_str()));
            assert_eq!(members.len(), 2);
        }
        other => panic!("expected RenderFamily, got {:?}", other),
    }
    match say(&engine, "U2", "สรุป", noon()) {
        Some(ResponseIntent::RenderMonthlySummary { summary, .. }) => {
            assert_eq!(summary.expense, 150.0)
        }
        other => panic!("expected monthly summary, got {:?}", other),
    }
    assert!(matches!(
        say(&engine, "U2", "family", noon()),
        Some(ResponseIntent::RenderFamily { switched: false, .. })
    ));

    assert!(matches!(
        say(&engine, "U3", "join ZZZZZZ", noon()),
        Some(ResponseIntent::InviteCodeNotFound { .. })
    ));
}

#[test]
fn test_recurring_bills_across_months() {
    let engine = engine();
    let march = Utc.with_ymd_and_hms(2024, 3, 5, 5, 0, 0).unwrap();
    let april = Utc.with_ymd_and_hms(2024, 4, 5, 5, 0, 0).unwrap();

    say(&engine, "U1", "ค่าน้ำค่าไฟ 599 ค่าเน็ต", march);
    say(&engine, "U1", "ค่าน้ำค่าไฟ 599 ค่าเน็ต", april);
    say(&engine, "U1", "อาหาร 80 ข้าว", april);

    match say(&engine, "U1", "bills", noon()) {
        Some(ResponseIntent::RenderRecurringBills { bills }) => {
            assert_eq!(bills.len(), 1);
            assert_eq!(bills[0].category_name, "ค่าน้ำค่าไฟ");
            assert_eq!(bills[0].amount, 599.0);
            assert_eq!(bills[0].months_seen, 2);
        }
        other => panic!("expected recurring bills, got {:?}", other),
    }
}

#[test]
fn test_stats_and_achievements_commands() {
    let engine = engine();
    say(&engine, "U1", "อาหาร 10", noon());
    say(&engine, "U1", "อาหาร 10", noon() + Duration::days(1));

    match say(&engine, "U1", "stats", noon() + Duration::days(1)) {
        Some(ResponseIntent::RenderStats { stats }) => {
            assert_eq!(stats.streak, 2);
            assert_eq!(stats.transaction_count, 2);
            assert_eq!(stats.days_recorded, 2);
            assert_eq!(stats.achievement_count, 1);
        }
        other => panic!("expected stats, got {:?}", other),
    }
    match say(&engine, "U1", "badges", noon()) {
        Some(ResponseIntent::RenderAchievements { unlocked }) => {
            assert_eq!(unlocked, vec![Achievement::FirstRecord])
        }
        other => panic!("expected achievements, got {:?}", other),
    }
}

#[test]
fn test_welcome_refreshes_profile() {
    let engine = engine();
    let intent = engine
        .welcome("U1", Some("Nok"), Some("https://example.com/nok.png"), noon())
        .unwrap();
    assert!(matches!(intent, ResponseIntent::Welcome { ref display_name } if display_name == "Nok"));

    engine.welcome("U1", Some("Nok K."), None, noon()).unwrap();
    let user = engine.db().get_user("U1").unwrap().unwrap();
    assert_eq!(user.display_name, "Nok K.");
    assert_eq!(user.picture_url.as_deref(), Some("https://example.com/nok.png"));
}
