//! Recurring bill detection
//!
//! An expense is treated as a recurring bill when the same (category, note,
//! amount) shows up in at least two distinct months of the lookback window.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::calendar::months_back;
use crate::db::Database;
use crate::error::Result;
use crate::models::RecurringBill;

/// One expense row as seen by the detector
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseObservation {
    pub month: String,
    pub category_name: String,
    pub note: String,
    pub amount: f64,
}

/// Detection configuration
#[derive(Debug, Clone)]
pub struct RecurringConfig {
    /// Calendar months to scan, including the current one
    pub lookback_months: u32,
    /// Distinct months a charge must appear in
    pub min_months: usize,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            lookback_months: 3,
            min_months: 2,
        }
    }
}

/// Finds recurring bills in a wallet's recent expenses
pub struct RecurringDetector<'a> {
    db: &'a Database,
    config: RecurringConfig,
}

impl<'a> RecurringDetector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: RecurringConfig::default(),
        }
    }

    /// Recurring bills for a wallet, looking back from `current_month`
    pub fn detect(&self, group_id: i64, current_month: &str) -> Result<Vec<RecurringBill>> {
        let months: Vec<String> = (0..self.config.lookback_months)
            .filter_map(|n| months_back(current_month, n))
            .collect();
        let observations = self.db.expense_observations(group_id, &months)?;
        let bills = find_recurring(&observations, self.config.min_months);

        debug!(
            group_id,
            scanned = observations.len(),
            found = bills.len(),
            "Recurring bill detection"
        );
        Ok(bills)
    }
}

/// Group observations and keep those seen in at least `min_months` months
///
/// Sorted by amount, largest first.
pub fn find_recurring(observations: &[ExpenseObservation], min_months: usize) -> Vec<RecurringBill> {
    struct Seen<'o> {
        latest: &'o ExpenseObservation,
        months: BTreeSet<&'o str>,
    }

    let mut groups: HashMap<(String, String, i64), Seen<'_>> = HashMap::new();
    for obs in observations {
        let key = (
            obs.category_name.clone(),
            obs.note.trim().to_lowercase(),
            to_cents(obs.amount),
        );
        let seen = groups.entry(key).or_insert_with(|| Seen {
            latest: obs,
            months: BTreeSet::new(),
        });
        if obs.month.as_str() >= seen.latest.month.as_str() {
            seen.latest = obs;
        }
        seen.months.insert(obs.month.as_str());
    }

    let mut bills: Vec<RecurringBill> = groups
        .into_values()
        .filter(|seen| seen.months.len() >= min_months)
        .map(|seen| RecurringBill {
            category_name: seen.latest.category_name.clone(),
            note: seen.latest.note.trim().to_string(),
            amount: seen.latest.amount,
            months_seen: seen.months.len(),
            last_seen: seen.latest.month.clone(),
        })
        .collect();

    bills.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
            .then_with(|| a.note.cmp(&b.note))
    });
    bills
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(month: &str, category: &str, note: &str, amount: f64) -> ExpenseObservation {
        ExpenseObservation {
            month: month.to_string(),
            category_name: category.to_string(),
            note: note.to_string(),
            amount,
        }
    }

    #[test]
    fn test_find_recurring_requires_two_months() {
        let observations = vec![
            obs("2024-03", "ค่าน้ำค่าไฟ", "ค่าเน็ต", 599.0),
            obs("2024-04", "ค่าน้ำค่าไฟ", "ค่าเน็ต", 599.0),
            obs("2024-04", "อาหาร", "ข้าว", 50.0),
            obs("2024-04", "อาหาร", "ข้าว", 50.0),
        ];
        let bills = find_recurring(&observations, 2);
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].note, "ค่าเน็ต");
        assert_eq!(bills[0].months_seen, 2);
        assert_eq!(bills[0].last_seen, "2024-04");
    }

    #[test]
    fn test_find_recurring_note_is_case_insensitive() {
        let observations = vec![
            obs("2024-02", "บันเทิง", "Netflix", 419.0),
            obs("2024-03", "บันเทิง", "netflix", 419.0),
            obs("2024-04", "บันเทิง", "NETFLIX ", 419.0),
        ];
        let bills = find_recurring(&observations, 2);
        assert_eq!(bills.len(), 1);
        assert_eq!(bills[0].months_seen, 3);
        assert_eq!(bills[0].note, "NETFLIX");
    }

    #[test]
    fn test_find_recurring_amount_must_match() {
        let observations = vec![
            obs("2024-03", "ที่พัก", "ค่าห้อง", 4500.0),
            obs("2024-04", "ที่พัก", "ค่าห้อง", 4800.0),
        ];
        assert!(find_recurring(&observations, 2).is_empty());
    }

    #[test]
    fn test_find_recurring_sorted_by_amount() {
        let observations = vec![
            obs("2024-03", "บันเทิง", "spotify", 129.0),
            obs("2024-04", "บันเทิง", "spotify", 129.0),
            obs("2024-03", "ที่พัก", "rent", 4500.0),
            obs("2024-04", "ที่พัก", "rent", 4500.0),
        ];
        let bills = find_recurring(&observations, 2);
        let amounts: Vec<f64> = bills.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![4500.0, 129.0]);
    }
}
