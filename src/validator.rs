use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{
    ImportStats, MatchAction, ParsedTransaction, ReconciliationDecision, ValidationReport,
};
use crate::normalize::normalize_key;

const DATE_SHAPE: &str = r"^\d{4}-\d{2}-\d{2}$";
const MIN_DESCRIPTION_LEN: usize = 2;

fn is_valid_date(shape: Option<&Regex>, date: &str) -> bool {
    let shaped = shape.map(|re| re.is_match(date)).unwrap_or(false);
    shaped && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Re-walk every parsed row and the reconciliation decisions and build
/// the full report. Blocking errors: bad date, short description,
/// non-positive amount. Warnings (non-blocking): categories the matcher
/// decided to create rather than map. The mapped/unmapped statistics are
/// read off the decisions so report and matcher can never disagree.
pub fn validate(
    transactions: &mut [ParsedTransaction],
    category_decisions: &[ReconciliationDecision],
    tag_decisions: &[ReconciliationDecision],
) -> ValidationReport {
    let shape = Regex::new(DATE_SHAPE).ok();
    let unmapped: HashSet<&str> = category_decisions
        .iter()
        .filter(|d| d.action != MatchAction::Map)
        .map(|d| d.key.as_str())
        .collect();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut valid = 0usize;
    let mut invalid = 0usize;

    for txn in transactions.iter_mut() {
        txn.validation_errors.clear();
        if !is_valid_date(shape.as_ref(), &txn.date) {
            txn.validation_errors
                .push(format!("invalid date '{}'", txn.date));
        }
        if txn.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            txn.validation_errors
                .push("description must be at least 2 characters".to_string());
        }
        if txn.amount <= Decimal::ZERO {
            txn.validation_errors
                .push("amount must be greater than zero".to_string());
        }

        if txn.validation_errors.is_empty() {
            valid += 1;
        } else {
            invalid += 1;
            for e in &txn.validation_errors {
                errors.push(format!("Row {}: {}", txn.row, e));
            }
        }

        if let Some(category) = &txn.category {
            if unmapped.contains(normalize_key(category).as_str()) {
                warnings.push(format!(
                    "Row {}: category '{}' is not in the catalog yet",
                    txn.row, category
                ));
            }
        }
    }

    let mapped_categories = category_decisions
        .iter()
        .filter(|d| d.action == MatchAction::Map)
        .count();
    let mapped_tags = tag_decisions
        .iter()
        .filter(|d| d.action == MatchAction::Map)
        .count();
    let stats = ImportStats {
        total_transactions: transactions.len(),
        valid_transactions: valid,
        invalid_transactions: invalid,
        total_categories: category_decisions.len(),
        mapped_categories,
        unmapped_categories: category_decisions.len() - mapped_categories,
        total_tags: tag_decisions.len(),
        mapped_tags,
        unmapped_tags: tag_decisions.len() - mapped_tags,
    };

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        stats,
    }
}
