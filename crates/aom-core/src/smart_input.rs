//! Smart Input: free text to a categorized transaction
//!
//! The grammar is informal: `LABEL AMOUNT [NOTE]`. The first number in the
//! text is the amount; the text before it is the label and the text after it
//! is the note. Income keywords anywhere in the text flip the inferred kind
//! and are stripped from the label before category containment matching.
//!
//! Category resolution, first hit wins:
//! 1. exact, case-insensitive name across all categories (its kind wins)
//! 2. first category of the inferred kind whose name contains the label
//! 3. the "others" category of the inferred kind

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Category, TransactionKind};

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?").expect("valid regex")
});

static AMOUNT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?)$")
        .expect("valid regex")
});

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^\s#]+)").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Income keywords in match order, longest first within each script
pub const INCOME_KEYWORDS: &[&str] = &[
    "เงินเดือน",
    "ได้เงิน",
    "รายได้",
    "โบนัส",
    "ขาย",
    "รับ",
    "ได้",
    "salary",
    "bonus",
    "income",
    "received",
    "receive",
    "sold",
    "sell",
    "got",
    "get",
    "+",
];

/// Names that act as the catch-all category of a kind
pub const FALLBACK_CATEGORY_NAMES: &[&str] = &["อื่นๆ", "รายได้อื่นๆ", "others", "other"];

/// Thai is written without spaces, so Thai keywords (and "+") match as
/// substrings; Latin keywords only match whole words.
static KEYWORD_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    INCOME_KEYWORDS
        .iter()
        .map(|kw| {
            let pattern = if kw.chars().all(|c| c.is_ascii_alphabetic()) {
                format!(r"(?i)\b{}\b", regex::escape(kw))
            } else {
                regex::escape(kw)
            };
            (*kw, Regex::new(&pattern).expect("valid regex"))
        })
        .collect()
});

/// A message split into its Smart Input parts
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    /// Label as typed
    pub label: String,
    /// Label with the matched income keyword removed
    pub search_label: String,
    pub amount: f64,
    pub note: String,
    pub tags: Vec<String>,
    /// Kind inferred from keywords alone
    pub kind: TransactionKind,
    pub keyword: Option<&'static str>,
}

/// Parse an amount like "1,500" or "99.50"; rejects zero and overflow
pub fn parse_amount(token: &str) -> Option<f64> {
    let token = token.trim();
    if !AMOUNT_TOKEN_RE.is_match(token) {
        return None;
    }
    let amount: f64 = token.replace(',', "").parse().ok()?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// Split free text into label, amount, and note
///
/// Returns `None` when there is no number, or the number is zero or overflows.
pub fn parse(text: &str) -> Option<ParsedInput> {
    let text = text.trim();
    let found = AMOUNT_RE.find(text)?;
    let amount: f64 = found.as_str().replace(',', "").parse().ok()?;
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }

    let mut label = collapse_whitespace(&text[..found.start()]);
    let mut note = text[found.end()..].trim().to_string();
    if label.is_empty() && !note.is_empty() {
        label = collapse_whitespace(&note);
        note.clear();
    }

    let (kind, keyword) = match detect_income_keyword(text) {
        Some(kw) => (TransactionKind::Income, Some(kw)),
        None => (TransactionKind::Expense, None),
    };
    let search_label = match keyword {
        Some(kw) => strip_keyword(&label, kw),
        None => label.clone(),
    };

    Some(ParsedInput {
        tags: extract_tags(&note),
        label,
        search_label,
        amount,
        note,
        kind,
        keyword,
    })
}

/// First income keyword present in the text, in keyword-list order
pub fn detect_income_keyword(text: &str) -> Option<&'static str> {
    KEYWORD_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kw, _)| *kw)
}

/// Remove every occurrence of `keyword` from `label`
pub fn strip_keyword(label: &str, keyword: &str) -> String {
    match KEYWORD_PATTERNS.iter().find(|(kw, _)| *kw == keyword) {
        Some((_, re)) => collapse_whitespace(&re.replace_all(label, " ")),
        None => label.to_string(),
    }
}

/// Lower-cased, de-duplicated hashtags in order of appearance
pub fn extract_tags(note: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in HASHTAG_RE.captures_iter(note) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Resolve a category for parsed input; `categories` must be in storage order
pub fn resolve_category<'a>(
    categories: &'a [Category],
    input: &ParsedInput,
) -> Option<&'a Category> {
    let label = input.label.to_lowercase();
    if !label.is_empty() {
        if let Some(exact) = categories.iter().find(|c| c.name.to_lowercase() == label) {
            return Some(exact);
        }
    }

    let search = input.search_label.to_lowercase();
    if !search.is_empty() {
        if let Some(contained) = categories
            .iter()
            .filter(|c| c.kind == input.kind)
            .find(|c| c.name.to_lowercase().contains(&search))
        {
            return Some(contained);
        }
    }

    categories.iter().filter(|c| c.kind == input.kind).find(|c| {
        let name = c.name.to_lowercase();
        FALLBACK_CATEGORY_NAMES.contains(&name.as_str())
    })
}

/// Names of the first `limit` categories of a kind
pub fn suggestions(categories: &[Category], kind: TransactionKind, limit: usize) -> Vec<String> {
    categories
        .iter()
        .filter(|c| c.kind == kind)
        .take(limit)
        .map(|c| c.name.clone())
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s.trim(), " ").trim().to_string()
}
