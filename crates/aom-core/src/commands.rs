//! Command Dispatcher vocabulary
//!
//! Literal commands are matched exactly after trimming, lower-casing, and
//! collapsing whitespace, in table order. Pattern commands are tried next.
//! Anything else is left to Smart Input.

use std::sync::LazyLock;

use regex::Regex;

use crate::smart_input::parse_amount;

/// A recognized chat command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    TodaySummary,
    MonthlySummary,
    TopCategories,
    Budgets,
    Goals,
    Achievements,
    Stats,
    RecurringBills,
    Family,
    PersonalWallet,
    Undo,
    /// `Err` holds the amount token that failed to parse
    SetBudget {
        name: String,
        amount: Result<f64, String>,
    },
    CreateGoal {
        name: String,
        amount: Result<f64, String>,
    },
    AddToGoal {
        name: String,
        amount: Result<f64, String>,
    },
    /// `None` when the value is not a mood from 1 to 5
    SetMood(Option<u8>),
    SetNote(String),
    CreateFamily(String),
    JoinFamily(String),
}

/// Literal phrases in priority order; the first matching row wins
const LITERAL_COMMANDS: &[(&[&str], Command)] = &[
    (&["help", "ช่วยเหลือ", "วิธีใช้", "?"], Command::Help),
    (&["วันนี้", "สรุปวันนี้", "today"], Command::TodaySummary),
    (
        &["สรุป", "สรุปเดือนนี้", "ยอดเดือนนี้", "summary"],
        Command::MonthlySummary,
    ),
    (
        &["หมวดหมู่", "หมวด", "categories", "top"],
        Command::TopCategories,
    ),
    (&["งบ", "งบประมาณ", "budget", "budgets"], Command::Budgets),
    (&["เป้าหมาย", "เป้าออม", "goals"], Command::Goals),
    (
        &["ความสำเร็จ", "เหรียญ", "achievements", "badges"],
        Command::Achievements,
    ),
    (&["สถิติ", "stats", "streak"], Command::Stats),
    (
        &["บิล", "บิลประจำ", "bills", "recurring"],
        Command::RecurringBills,
    ),
    (&["ครอบครัว", "family"], Command::Family),
    (&["ส่วนตัว", "personal"], Command::PersonalWallet),
    (&["ยกเลิก", "ลบล่าสุด", "undo"], Command::Undo),
];

#[derive(Clone, Copy)]
enum PatternKind {
    SetBudget,
    CreateGoal,
    AddToGoal,
    Mood,
    Note,
    CreateFamily,
    Join,
}

/// Most Thai verbs may run straight into the argument; Latin verbs need a space
static PATTERN_COMMANDS: LazyLock<Vec<(PatternKind, Regex)>> = LazyLock::new(|| {
    let patterns: &[(PatternKind, &str)] = &[
        (
            PatternKind::SetBudget,
            r"(?i)^(?:ตั้งงบ\s*|set\s+budget\s+)(.+)\s+(\S+)$",
        ),
        (
            PatternKind::CreateGoal,
            r"(?i)^(?:ตั้งเป้า\s*|create\s+goal\s+)(.+)\s+(\S+)$",
        ),
        (
            PatternKind::AddToGoal,
            r"(?i)^(?:ออมเงิน\s*|เติมเป้า\s*|add\s+to\s+goal\s+)(.+)\s+(\S+)$",
        ),
        (
            PatternKind::Mood,
            r"(?i)^(?:set\s+mood\s+|mood\s+|อารมณ์\s*)(\S+)$",
        ),
        // บันทึก needs a space: "บันทึกค่าข้าว 50" is a transaction
        (
            PatternKind::Note,
            r"(?i)^(?:set\s+note\s+|note\s+|บันทึก\s+)(.+)$",
        ),
        (
            PatternKind::CreateFamily,
            r"(?i)^(?:create\s+family\s+|สร้างครอบครัว\s*)(.+)$",
        ),
        (PatternKind::Join, r"(?i)^(?:join\s+|เข้าร่วม\s*)([a-z0-9]+)$"),
    ];
    patterns
        .iter()
        .map(|(kind, p)| (*kind, Regex::new(p).expect("valid regex")))
        .collect()
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Trim, collapse internal whitespace, and lower-case
pub fn normalize(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

/// Match text against the literal table, then the pattern commands
pub fn parse_command(text: &str) -> Option<Command> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }

    for (phrases, command) in LITERAL_COMMANDS {
        if phrases.contains(&normalized.as_str()) {
            return Some(command.clone());
        }
    }

    // Patterns run on the collapsed but case-preserved text so names keep their case
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    for (kind, re) in PATTERN_COMMANDS.iter() {
        if let Some(caps) = re.captures(&collapsed) {
            let first = caps[1].trim().to_string();
            let second = caps.get(2).map(|m| m.as_str().to_string());
            return Some(build_pattern_command(*kind, first, second));
        }
    }

    None
}

fn build_pattern_command(kind: PatternKind, first: String, second: Option<String>) -> Command {
    let amount = || {
        let token = second.clone().unwrap_or_default();
        parse_amount(&token).ok_or(token)
    };

    match kind {
        PatternKind::SetBudget => Command::SetBudget {
            amount: amount(),
            name: first,
        },
        PatternKind::CreateGoal => Command::CreateGoal {
            amount: amount(),
            name: first,
        },
        PatternKind::AddToGoal => Command::AddToGoal {
            amount: amount(),
            name: first,
        },
        PatternKind::Mood => Command::SetMood(
            first
                .parse::<u8>()
                .ok()
                .filter(|m| (1..=5).contains(m)),
        ),
        PatternKind::Note => Command::SetNote(first),
        PatternKind::CreateFamily => Command::CreateFamily(first),
        PatternKind::Join => Command::JoinFamily(first.to_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_synonyms() {
        assert_eq!(parse_command("สรุป"), Some(Command::MonthlySummary));
        assert_eq!(parse_command("summary"), Some(Command::MonthlySummary));
        assert_eq!(parse_command("  SUMMARY  "), Some(Command::MonthlySummary));
        assert_eq!(parse_command("สรุปวันนี้"), Some(Command::TodaySummary));
        assert_eq!(parse_command("?"), Some(Command::Help));
        assert_eq!(parse_command("ยกเลิก"), Some(Command::Undo));
    }

    #[test]
    fn test_literal_requires_exact_match() {
        assert_eq!(parse_command("summary please"), None);
        assert_eq!(parse_command("สรุป 5"), None);
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Set   Budget \t Food "), "set budget food");
    }

    #[test]
    fn test_set_budget_captures_name_greedily() {
        assert_eq!(
            parse_command("set budget eating out 3,000"),
            Some(Command::SetBudget {
                name: "eating out".to_string(),
                amount: Ok(3000.0),
            })
        );
        assert_eq!(
            parse_command("ตั้งงบ อาหาร 5000"),
            Some(Command::SetBudget {
                name: "อาหาร".to_string(),
                amount: Ok(5000.0),
            })
        );
        assert_eq!(
            parse_command("ตั้งงบอาหาร 5000"),
            Some(Command::SetBudget {
                name: "อาหาร".to_string(),
                amount: Ok(5000.0),
            })
        );
    }

    #[test]
    fn test_pattern_with_bad_amount() {
        assert_eq!(
            parse_command("create goal Japan lots"),
            Some(Command::CreateGoal {
                name: "Japan".to_string(),
                amount: Err("lots".to_string()),
            })
        );
    }

    #[test]
    fn test_pattern_missing_parts_falls_through() {
        assert_eq!(parse_command("set budget"), None);
        assert_eq!(parse_command("set budget 3000"), None);
    }

    #[test]
    fn test_add_to_goal() {
        assert_eq!(
            parse_command("ออมเงิน เที่ยวญี่ปุ่น 1000"),
            Some(Command::AddToGoal {
                name: "เที่ยวญี่ปุ่น".to_string(),
                amount: Ok(1000.0),
            })
        );
        assert_eq!(
            parse_command("Add to goal New Phone 2500.50"),
            Some(Command::AddToGoal {
                name: "New Phone".to_string(),
                amount: Ok(2500.5),
            })
        );
    }

    #[test]
    fn test_mood() {
        assert_eq!(parse_command("mood 4"), Some(Command::SetMood(Some(4))));
        assert_eq!(parse_command("อารมณ์ 5"), Some(Command::SetMood(Some(5))));
        assert_eq!(parse_command("mood 9"), Some(Command::SetMood(None)));
        assert_eq!(parse_command("mood great"), Some(Command::SetMood(None)));
        assert_eq!(parse_command("set mood 4"), Some(Command::SetMood(Some(4))));
        assert_eq!(parse_command("Set Mood 9"), Some(Command::SetMood(None)));
    }

    #[test]
    fn test_set_note() {
        assert_eq!(
            parse_command("set note paid 3 bills"),
            Some(Command::SetNote("paid 3 bills".to_string()))
        );
        assert_eq!(
            parse_command("บันทึก วันนี้เหนื่อย"),
            Some(Command::SetNote("วันนี้เหนื่อย".to_string()))
        );
    }

    #[test]
    fn test_note_verb_needs_space_before_argument() {
        assert_eq!(parse_command("บันทึกค่าข้าว 50"), None);
    }

    #[test]
    fn test_note_and_family() {
        assert_eq!(
            parse_command("note tired today"),
            Some(Command::SetNote("tired today".to_string()))
        );
        assert_eq!(
            parse_command("สร้างครอบครัว บ้านเรา"),
            Some(Command::CreateFamily("บ้านเรา".to_string()))
        );
        assert_eq!(
            parse_command("join ab12cd"),
            Some(Command::JoinFamily("AB12CD".to_string()))
        );
    }

    #[test]
    fn test_plain_transaction_is_not_a_command() {
        assert_eq!(parse_command("อาหาร 150"), None);
        assert_eq!(parse_command("เดินทาง 50 ค่าแท็กซี่"), None);
    }
}
