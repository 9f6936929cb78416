//! Reply rendering: [`ResponseIntent`] to transport messages
//!
//! The only place that knows the card schema. Every text field is cut on
//! character boundaries so Thai text never splits inside a code point.

use aom_core::models::{Achievement, Group, TransactionKind};
use aom_core::ResponseIntent;
use serde_json::{json, Value};

use super::OutgoingMessage;

/// Upper bound on messages in one reply
pub const MAX_MESSAGES: usize = 5;
pub const MAX_ALT_TEXT_CHARS: usize = 400;
pub const MAX_TEXT_CHARS: usize = 5000;
pub const MAX_LABEL_CHARS: usize = 40;

/// Sent whenever processing an event failed
pub const FAILURE_TEXT: &str = "เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้ง";

const HELP_TEXT: &str = "📖 วิธีใช้อ้อม
• บันทึกรายการ: พิมพ์ \"อาหาร 150\" หรือ \"เดินทาง 50 ค่าแท็กซี่\"
• รายรับ: \"เงินเดือน 25000\" หรือ \"ได้เงิน 500\"
• วันนี้ / สรุป / หมวด: ดูสรุปยอด
• งบ / ตั้งงบ อาหาร 5000: ดูและตั้งงบประมาณ
• เป้าหมาย / ตั้งเป้า เที่ยวญี่ปุ่น 30000 / ออมเงิน เที่ยวญี่ปุ่น 1000
• อารมณ์ 1-5 / บันทึก ข้อความ: บันทึกประจำวัน
• ความสำเร็จ / สถิติ / บิล
• สร้างครอบครัว ชื่อ / เข้าร่วม รหัส / ครอบครัว / ส่วนตัว
• ยกเลิก: ลบรายการล่าสุด";

const INCOME_COLOR: &str = "#1DB446";
const EXPENSE_COLOR: &str = "#E8505B";
const NEUTRAL_COLOR: &str = "#4A6CF7";

/// Map one intent to at most [`MAX_MESSAGES`] outgoing messages
pub fn render(intent: &ResponseIntent) -> Vec<OutgoingMessage> {
    let messages = match intent {
        ResponseIntent::Welcome { display_name } => vec![text(format!(
            "สวัสดีคุณ{} 👋\nอ้อมช่วยจดรายรับรายจ่ายให้ได้เลย\nพิมพ์ \"อาหาร 150\" เพื่อบันทึกรายจ่าย หรือ \"help\" เพื่อดูคำสั่งทั้งหมด",
            display_name
        ))],
        ResponseIntent::RenderHelp => vec![text(HELP_TEXT)],
        ResponseIntent::RenderTodaySummary { summary } => {
            let mut card = Card::new(format!("สรุปวันนี้ {}", summary.day), NEUTRAL_COLOR)
                .row("รายรับ", baht(summary.income))
                .row("รายจ่าย", baht(summary.expense))
                .row("จำนวนรายการ", summary.transactions.len().to_string());
            if let Some(mood) = summary.mood {
                card = card.row("อารมณ์", mood_emoji(mood).to_string());
            }
            vec![card.into_message()]
        }
        ResponseIntent::RenderMonthlySummary {
            summary,
            top_expenses,
        } => {
            let mut card = Card::new(format!("สรุปเดือน {}", summary.month), NEUTRAL_COLOR)
                .row("รายรับ", baht(summary.income))
                .row("รายจ่าย", baht(summary.expense))
                .row("คงเหลือ", baht(summary.balance()));
            for total in top_expenses {
                card = card.row(format!("{} {}", total.icon, total.name), baht(total.total));
            }
            vec![card
                .footer(format!("{} รายการ", summary.transaction_count))
                .into_message()]
        }
        ResponseIntent::RenderTopCategories { month, categories } => {
            if categories.is_empty() {
                vec![text(format!("ยังไม่มีรายจ่ายในเดือน {}", month))]
            } else {
                let card = categories.iter().fold(
                    Card::new(format!("หมวดที่ใช้จ่ายมากสุด {}", month), EXPENSE_COLOR),
                    |card, total| {
                        card.row(
                            format!("{} {}", total.icon, total.name),
                            format!("{} ({})", baht(total.total), total.count),
                        )
                    },
                );
                vec![card.into_message()]
            }
        }
        ResponseIntent::RenderBudgets { month, budgets } => {
            if budgets.is_empty() {
                vec![text("ยังไม่ได้ตั้งงบประมาณ\nลองพิมพ์ \"ตั้งงบ อาหาร 5000\"")]
            } else {
                let card = budgets.iter().fold(
                    Card::new(format!("งบประมาณ {}", month), NEUTRAL_COLOR),
                    |card, budget| {
                        let marker = if budget.is_exceeded() {
                            "🔴 "
                        } else if budget.is_alerting() {
                            "⚠️ "
                        } else {
                            ""
                        };
                        card.row(
                            format!("{}{} {}", marker, budget.icon, budget.name),
                            format!(
                                "{}/{} ({:.0}%)",
                                amount(budget.spent),
                                amount(budget.limit),
                                budget.percent()
                            ),
                        )
                    },
                );
                vec![card.into_message()]
            }
        }
        ResponseIntent::RenderGoals { goals } => {
            if goals.is_empty() {
                vec![text("ยังไม่มีเป้าหมายการออม\nลองพิมพ์ \"ตั้งเป้า เที่ยวญี่ปุ่น 30000\"")]
            } else {
                let card = goals.iter().fold(
                    Card::new("เป้าหมายการออม", INCOME_COLOR),
                    |card, goal| {
                        let done = if goal.completed { "✅ " } else { "🎯 " };
                        card.row(
                            format!("{}{}", done, goal.name),
                            format!(
                                "{}/{} ({:.0}%)",
                                amount(goal.current_amount),
                                amount(goal.target_amount),
                                goal.percent()
                            ),
                        )
                    },
                );
                vec![card.into_message()]
            }
        }
        ResponseIntent::RenderAchievements { unlocked } => {
            let lines: Vec<String> = Achievement::all()
                .iter()
                .map(|a| {
                    let mark = if unlocked.contains(a) { "✅" } else { "🔒" };
                    format!("{} {}", mark, achievement_label(*a))
                })
                .collect();
            vec![text(format!(
                "🏅 ความสำเร็จ {}/{}\n{}",
                unlocked.len(),
                Achievement::all().len(),
                lines.join("\n")
            ))]
        }
        ResponseIntent::RenderStats { stats } => vec![text(format!(
            "📊 สถิติของคุณ\n🔥 ต่อเนื่อง {} วัน\n📝 บันทึกแล้ว {} รายการ ใน {} วัน\n💰 ออมแล้ว {}\n🏅 ความสำเร็จ {} รายการ",
            stats.streak,
            stats.transaction_count,
            stats.days_recorded,
            baht(stats.total_saved),
            stats.achievement_count
        ))],
        ResponseIntent::RenderRecurringBills { bills } => {
            if bills.is_empty() {
                vec![text("ยังไม่พบรายจ่ายที่เกิดซ้ำทุกเดือน")]
            } else {
                let card = bills.iter().fold(
                    Card::new("บิลประจำเดือน", EXPENSE_COLOR),
                    |card, bill| {
                        let label = if bill.note.is_empty() {
                            bill.category_name.clone()
                        } else {
                            format!("{} ({})", bill.category_name, bill.note)
                        };
                        card.row(label, format!("{} x{}", baht(bill.amount), bill.months_seen))
                    },
                );
                vec![card.into_message()]
            }
        }
        ResponseIntent::RenderFamily {
            group,
            members,
            switched,
        } => {
            let names: Vec<String> = members
                .iter()
                .map(|m| format!("• {}", m.display_name))
                .collect();
            let mut messages = Vec::new();
            if *switched {
                messages.push(switched_text(group));
            }
            messages.push(text(format!(
                "👨‍👩‍👧 {}\nรหัสเชิญ: {}\nสมาชิก {} คน\n{}",
                group.name,
                group.invite_code.as_deref().unwrap_or("-"),
                members.len(),
                names.join("\n")
            )));
            messages
        }
        ResponseIntent::NotInFamily => vec![text(
            "ตอนนี้ใช้กระเป๋าส่วนตัวอยู่\nพิมพ์ \"สร้างครอบครัว ชื่อ\" หรือ \"เข้าร่วม รหัส\" เพื่อใช้กระเป๋าครอบครัว",
        )],
        ResponseIntent::SwitchedWallet { group } => vec![switched_text(group)],
        ResponseIntent::UndoDone { transaction } => vec![text(format!(
            "🗑️ ลบรายการ{} {} เรียบร้อย",
            kind_label(transaction.kind),
            baht(transaction.amount)
        ))],
        ResponseIntent::NothingToUndo => vec![text("ไม่มีรายการให้ยกเลิก")],
        ResponseIntent::BudgetSet { category } => vec![text(format!(
            "✅ ตั้งงบ {} {} เป็น {} ต่อเดือน",
            category.icon,
            category.name,
            baht(category.budget_limit.unwrap_or_default())
        ))],
        ResponseIntent::GoalCreated {
            goal,
            new_achievements,
        } => with_achievements(
            text(format!(
                "🎯 ตั้งเป้า \"{}\" {} แล้ว",
                goal.name,
                baht(goal.target_amount)
            )),
            new_achievements,
        ),
        ResponseIntent::GoalUpdated {
            goal,
            added,
            new_achievements,
        } => {
            let mut line = format!(
                "💰 ออมเพิ่ม {} ใน \"{}\"\nตอนนี้ {}/{} ({:.0}%)",
                baht(*added),
                goal.name,
                amount(goal.current_amount),
                amount(goal.target_amount),
                goal.percent()
            );
            if goal.completed {
                line.push_str("\n🥳 ถึงเป้าหมายแล้ว!");
            }
            with_achievements(text(line), new_achievements)
        }
        ResponseIntent::GoalNotFound { name } => {
            vec![text(format!("ไม่พบเป้าหมาย \"{}\"\nพิมพ์ \"เป้าหมาย\" เพื่อดูรายการ", name))]
        }
        ResponseIntent::MoodSet { day, mood } => vec![text(format!(
            "บันทึกอารมณ์วันที่ {} {} แล้ว",
            day,
            mood_emoji(*mood)
        ))],
        ResponseIntent::InvalidMood => vec![text("ระดับอารมณ์ต้องเป็นตัวเลข 1-5 เช่น \"อารมณ์ 4\"")],
        ResponseIntent::NoteSet { day, note } => {
            vec![text(format!("📝 บันทึกวันที่ {}: {}", day, note))]
        }
        ResponseIntent::FamilyCreated { group } => vec![text(format!(
            "👨‍👩‍👧 สร้างกระเป๋าครอบครัว \"{}\" แล้ว\nส่งรหัสนี้ให้สมาชิก: {}\n(พิมพ์ \"เข้าร่วม {}\")",
            group.name,
            group.invite_code.as_deref().unwrap_or("-"),
            group.invite_code.as_deref().unwrap_or("-")
        ))],
        ResponseIntent::FamilyJoined {
            group,
            already_member,
        } => {
            if *already_member {
                vec![text(format!("คุณเป็นสมาชิก \"{}\" อยู่แล้ว", group.name))]
            } else {
                vec![text(format!("🎉 เข้าร่วม \"{}\" แล้ว", group.name))]
            }
        }
        ResponseIntent::InviteCodeNotFound { code } => {
            vec![text(format!("ไม่พบรหัสเชิญ \"{}\"", code))]
        }
        ResponseIntent::InvalidAmount { input } => vec![text(format!(
            "\"{}\" ไม่ใช่จำนวนเงินที่ถูกต้อง",
            input
        ))],
        ResponseIntent::CategoryNotFound {
            label,
            kind,
            suggestions,
        } => {
            let mut line = format!("ไม่พบหมวด{} \"{}\"", kind_label(*kind), label);
            if !suggestions.is_empty() {
                line.push_str("\nลองใช้: ");
                line.push_str(&suggestions.join(", "));
            }
            vec![text(line)]
        }
        ResponseIntent::TransactionRecorded(recorded) => {
            let tx = &recorded.transaction;
            let color = match tx.kind {
                TransactionKind::Income => INCOME_COLOR,
                TransactionKind::Expense => EXPENSE_COLOR,
            };
            let mut card = Card::new(format!("บันทึก{}แล้ว", kind_label(tx.kind)), color)
                .row(
                    format!("{} {}", recorded.category_icon, recorded.category_name),
                    baht(tx.amount),
                );
            if !tx.note.is_empty() {
                card = card.row("โน้ต", tx.note.clone());
            }
            card = card
                .row("รายรับเดือนนี้", baht(recorded.month_income))
                .row("รายจ่ายเดือนนี้", baht(recorded.month_expense))
                .footer(format!("🔥 ต่อเนื่อง {} วัน", recorded.streak));

            let mut messages = vec![card.into_message()];
            if let Some(alert) = &recorded.budget_alert {
                messages.push(text(if alert.exceeded {
                    format!(
                        "🔴 หมวด {} เกินงบแล้ว ({}/{})",
                        alert.category_name,
                        amount(alert.spent),
                        amount(alert.limit)
                    )
                } else {
                    format!(
                        "⚠️ หมวด {} ใช้ไป {:.0}% ของงบ ({}/{})",
                        alert.category_name,
                        alert.percent,
                        amount(alert.spent),
                        amount(alert.limit)
                    )
                }));
            }
            if let Some(unlocked) = achievements_text(&recorded.new_achievements) {
                messages.push(text(unlocked));
            }
            messages
        }
        ResponseIntent::Failure => vec![text(FAILURE_TEXT)],
    };
    cap(messages)
}

/// Flatten messages for terminals and logs: texts as-is, cards as their alt text
pub fn to_plain_text(messages: &[OutgoingMessage]) -> String {
    messages
        .iter()
        .map(|m| match m {
            OutgoingMessage::Text { text } => text.as_str(),
            OutgoingMessage::Flex { alt_text, .. } => alt_text.as_str(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn cap(mut messages: Vec<OutgoingMessage>) -> Vec<OutgoingMessage> {
    messages.truncate(MAX_MESSAGES);
    messages
}

fn text(s: impl AsRef<str>) -> OutgoingMessage {
    OutgoingMessage::Text {
        text: truncate_chars(s.as_ref(), MAX_TEXT_CHARS),
    }
}

fn switched_text(group: &Group) -> OutgoingMessage {
    text(format!("เปลี่ยนไปใช้กระเป๋า \"{}\" แล้ว", group.name))
}

fn with_achievements(first: OutgoingMessage, achievements: &[Achievement]) -> Vec<OutgoingMessage> {
    let mut messages = vec![first];
    if let Some(unlocked) = achievements_text(achievements) {
        messages.push(text(unlocked));
    }
    messages
}

fn achievements_text(achievements: &[Achievement]) -> Option<String> {
    if achievements.is_empty() {
        return None;
    }
    let labels: Vec<&str> = achievements.iter().map(|a| achievement_label(*a)).collect();
    Some(format!("🏅 ปลดล็อกความสำเร็จใหม่!\n{}", labels.join("\n")))
}

/// Cut to at most `max` characters, marking the cut with an ellipsis
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Two decimals with thousands separators; whole amounts drop the decimals
pub fn amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, fraction)
    }
}

fn baht(value: f64) -> String {
    format!("{} บาท", amount(value))
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "รายรับ",
        TransactionKind::Expense => "รายจ่าย",
    }
}

fn achievement_label(achievement: Achievement) -> &'static str {
    match achievement {
        Achievement::FirstRecord => "🎉 บันทึกครั้งแรก",
        Achievement::WeekStreak => "🔥 บันทึกต่อเนื่อง 7 วัน",
        Achievement::MonthStreak => "🏆 บันทึกต่อเนื่อง 30 วัน",
        Achievement::FirstGoal => "🎯 ตั้งเป้าหมายแรก",
        Achievement::GoalReached => "🥳 ออมถึงเป้าหมาย",
        Achievement::Saver10k => "💎 ออมครบ 10,000 บาท",
    }
}

fn mood_emoji(mood: u8) -> &'static str {
    match mood {
        1 => "😢",
        2 => "😕",
        3 => "😐",
        4 => "🙂",
        _ => "😄",
    }
}

/// A titled key/value card; the alt text repeats every row so text-only
/// clients lose nothing
struct Card {
    title: String,
    color: &'static str,
    rows: Vec<(String, String)>,
    footer: Option<String>,
}

impl Card {
    fn new(title: impl Into<String>, color: &'static str) -> Self {
        Self {
            title: title.into(),
            color,
            rows: Vec::new(),
            footer: None,
        }
    }

    fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    fn alt_text(&self) -> String {
        let mut alt = self.title.clone();
        for (label, value) in &self.rows {
            alt.push_str(&format!("\n{}: {}", label, value));
        }
        if let Some(footer) = &self.footer {
            alt.push('\n');
            alt.push_str(footer);
        }
        truncate_chars(&alt, MAX_ALT_TEXT_CHARS)
    }

    fn into_message(self) -> OutgoingMessage {
        let alt_text = self.alt_text();

        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|(label, value)| {
                json!({
                    "type": "box",
                    "layout": "horizontal",
                    "contents": [
                        {
                            "type": "text",
                            "text": truncate_chars(label, MAX_LABEL_CHARS),
                            "size": "sm",
                            "color": "#555555",
                            "flex": 3,
                            "wrap": true
                        },
                        {
                            "type": "text",
                            "text": truncate_chars(value, MAX_LABEL_CHARS),
                            "size": "sm",
                            "align": "end",
                            "flex": 2
                        }
                    ]
                })
            })
            .collect();

        let mut contents = json!({
            "type": "bubble",
            "header": {
                "type": "box",
                "layout": "vertical",
                "backgroundColor": self.color,
                "contents": [{
                    "type": "text",
                    "text": truncate_chars(&self.title, MAX_LABEL_CHARS),
                    "weight": "bold",
                    "size": "lg",
                    "color": "#FFFFFF"
                }]
            },
            "body": {
                "type": "box",
                "layout": "vertical",
                "spacing": "sm",
                "contents": rows
            }
        });
        if let Some(footer) = &self.footer {
            contents["footer"] = json!({
                "type": "box",
                "layout": "vertical",
                "contents": [{
                    "type": "text",
                    "text": truncate_chars(footer, MAX_LABEL_CHARS),
                    "size": "xs",
                    "color": "#888888",
                    "align": "center"
                }]
            });
        }

        OutgoingMessage::Flex { alt_text, contents }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aom_core::models::*;
    use aom_core::{BudgetAlert, RecordedTransaction};
    use chrono::{TimeZone, Utc};

    fn recorded(budget_alert: Option<BudgetAlert>, new_achievements: Vec<Achievement>) -> ResponseIntent {
        ResponseIntent::TransactionRecorded(Box::new(RecordedTransaction {
            transaction: Transaction {
                id: 1,
                group_id: 1,
                user_id: "U1".to_string(),
                category_id: Some(1),
                kind: TransactionKind::Expense,
                amount: 1500.0,
                occurred_at: Utc.with_ymd_and_hms(2024, 5, 10, 5, 0, 0).unwrap(),
                month: "2024-05".to_string(),
                note: "ข้าวมันไก่".to_string(),
                tags: vec![],
                source: TransactionSource::Chat,
            },
            category_name: "อาหาร".to_string(),
            category_icon: "🍜".to_string(),
            streak: 3,
            new_achievements,
            budget_alert,
            month_income: 0.0,
            month_expense: 1500.0,
        }))
    }

    #[test]
    fn test_amount_format() {
        assert_eq!(amount(150.0), "150");
        assert_eq!(amount(25000.0), "25,000");
        assert_eq!(amount(1234567.5), "1,234,567.50");
        assert_eq!(amount(0.0), "0");
        assert_eq!(amount(-1200.0), "-1,200");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let thai = "ค่าน้ำค่าไฟ".repeat(10);
        let cut = truncate_chars(&thai, MAX_LABEL_CHARS);
        assert_eq!(cut.chars().count(), MAX_LABEL_CHARS);
        assert!(cut.ends_with('…'));

        assert_eq!(truncate_chars("อาหาร", MAX_LABEL_CHARS), "อาหาร");
    }

    #[test]
    fn test_transaction_recorded_card() {
        let messages = render(&recorded(None, vec![]));
        assert_eq!(messages.len(), 1);

        match &messages[0] {
            OutgoingMessage::Flex { alt_text, contents } => {
                assert!(alt_text.contains("บันทึกรายจ่ายแล้ว"));
                assert!(alt_text.contains("🍜 อาหาร: 1,500 บาท"));
                assert!(alt_text.contains("ข้าวมันไก่"));
                assert_eq!(contents["type"], "bubble");
                assert_eq!(contents["header"]["backgroundColor"], EXPENSE_COLOR);
                assert!(contents["footer"].is_object());
            }
            other => panic!("expected flex, got {:?}", other),
        }
    }

    #[test]
    fn test_transaction_recorded_with_alert_and_achievements() {
        let alert = BudgetAlert {
            category_name: "อาหาร".to_string(),
            spent: 4500.0,
            limit: 5000.0,
            percent: 90.0,
            exceeded: false,
        };
        let messages = render(&recorded(Some(alert), vec![Achievement::FirstRecord]));
        assert_eq!(messages.len(), 3);

        let plain = to_plain_text(&messages);
        assert!(plain.contains("⚠️ หมวด อาหาร ใช้ไป 90% ของงบ (4,500/5,000)"));
        assert!(plain.contains("บันทึกครั้งแรก"));
    }

    #[test]
    fn test_alt_text_is_bounded() {
        let categories = (0..100)
            .map(|i| CategoryTotal {
                category_id: Some(i),
                name: format!("หมวดที่ยาวมากเป็นพิเศษ {}", i),
                icon: "📦".to_string(),
                kind: TransactionKind::Expense,
                total: 100.0,
                count: 1,
            })
            .collect();
        let messages = render(&ResponseIntent::RenderTopCategories {
            month: "2024-05".to_string(),
            categories,
        });
        match &messages[0] {
            OutgoingMessage::Flex { alt_text, .. } => {
                assert_eq!(alt_text.chars().count(), MAX_ALT_TEXT_CHARS);
            }
            other => panic!("expected flex, got {:?}", other),
        }
    }

    #[test]
    fn test_cap_limits_message_count() {
        let many = (0..8).map(|i| text(i.to_string())).collect();
        assert_eq!(cap(many).len(), MAX_MESSAGES);
    }

    #[test]
    fn test_category_not_found_lists_suggestions() {
        let messages = render(&ResponseIntent::CategoryNotFound {
            label: "ซื้อของแปลกๆ".to_string(),
            kind: TransactionKind::Expense,
            suggestions: vec!["อาหาร".to_string(), "เดินทาง".to_string()],
        });
        assert_eq!(
            messages,
            vec![OutgoingMessage::Text {
                text: "ไม่พบหมวดรายจ่าย \"ซื้อของแปลกๆ\"\nลองใช้: อาหาร, เดินทาง".to_string()
            }]
        );
    }

    #[test]
    fn test_failure_and_empty_views_are_text() {
        assert_eq!(
            render(&ResponseIntent::Failure),
            vec![OutgoingMessage::Text {
                text: FAILURE_TEXT.to_string()
            }]
        );
        assert!(matches!(
            render(&ResponseIntent::RenderGoals { goals: vec![] }).as_slice(),
            [OutgoingMessage::Text { .. }]
        ));
        assert!(matches!(
            render(&ResponseIntent::RenderBudgets {
                month: "2024-05".to_string(),
                budgets: vec![]
            })
            .as_slice(),
            [OutgoingMessage::Text { .. }]
        ));
    }

    #[test]
    fn test_achievements_view_lists_all() {
        let messages = render(&ResponseIntent::RenderAchievements {
            unlocked: vec![Achievement::FirstRecord],
        });
        let plain = to_plain_text(&messages);
        assert!(plain.starts_with("🏅 ความสำเร็จ 1/6"));
        assert_eq!(plain.matches("🔒").count(), 5);
    }

    #[test]
    fn test_family_switch_announces_wallet_before_card() {
        let group = Group {
            id: 2,
            name: "บ้านเรา".to_string(),
            kind: GroupKind::Family,
            invite_code: Some("AB12CD".to_string()),
            owner_id: "U1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        };
        let members = vec![GroupMember {
            user_id: "U1".to_string(),
            display_name: "แม่".to_string(),
            joined_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }];

        let switched = render(&ResponseIntent::RenderFamily {
            group: group.clone(),
            members: members.clone(),
            switched: true,
        });
        assert_eq!(switched.len(), 2);
        let plain = to_plain_text(&switched);
        assert!(plain.starts_with("เปลี่ยนไปใช้กระเป๋า \"บ้านเรา\" แล้ว"));
        assert!(plain.contains("รหัสเชิญ: AB12CD"));

        let viewed = render(&ResponseIntent::RenderFamily {
            group,
            members,
            switched: false,
        });
        assert_eq!(viewed.len(), 1);
    }
}
