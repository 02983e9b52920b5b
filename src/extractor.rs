use std::collections::{HashMap, HashSet};

use crate::models::{DetectedCategory, DetectedTag, ParsedTransaction, RawGrid, TransactionType};
use crate::normalize::{normalize_key, normalize_type};

/// Distinct categories and tags referenced by the parsed transactions,
/// in first-seen order, with usage counts. A category's polarity comes
/// from the first transaction that references it; any later reference
/// with the opposite polarity flips it to expense, the tie-break for
/// ambiguous categories.
pub fn extract_entities(
    transactions: &[ParsedTransaction],
) -> (Vec<DetectedCategory>, Vec<DetectedTag>) {
    let mut categories: Vec<DetectedCategory> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();
    let mut tags: Vec<DetectedTag> = Vec::new();
    let mut tag_index: HashMap<String, usize> = HashMap::new();

    for txn in transactions {
        if let Some(name) = &txn.category {
            let key = normalize_key(name);
            if !key.is_empty() {
                match category_index.get(&key) {
                    Some(&i) => {
                        let existing = &mut categories[i];
                        existing.count += 1;
                        if existing.kind != txn.kind {
                            existing.kind = TransactionType::Expense;
                        }
                    }
                    None => {
                        category_index.insert(key.clone(), categories.len());
                        categories.push(DetectedCategory {
                            name: name.clone(),
                            key,
                            kind: txn.kind,
                            count: 1,
                        });
                    }
                }
            }
        }

        for tag in &txn.tags {
            let key = normalize_key(tag);
            if key.is_empty() {
                continue;
            }
            match tag_index.get(&key) {
                Some(&i) => tags[i].count += 1,
                None => {
                    tag_index.insert(key.clone(), tags.len());
                    tags.push(DetectedTag {
                        name: tag.clone(),
                        key,
                        count: 1,
                    });
                }
            }
        }
    }

    (categories, tags)
}

/// Merge a dedicated categories sheet with the transaction-derived set.
/// Sheet rows come first (their declared type wins); anything referenced
/// by a transaction but absent from the sheet is appended. Counts always
/// reflect transaction usage.
pub fn categories_with_sheet(
    sheet: &RawGrid,
    extracted: Vec<DetectedCategory>,
    transactions: &[ParsedTransaction],
) -> Vec<DetectedCategory> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for txn in transactions {
        if let Some(name) = &txn.category {
            let key = normalize_key(name);
            if !key.is_empty() {
                *counts.entry(key).or_default() += 1;
            }
        }
    }

    let mut merged: Vec<DetectedCategory> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (i, row) in sheet.rows.iter().enumerate() {
        let name = row.first().map(|s| s.trim()).unwrap_or("");
        if name.is_empty() {
            continue;
        }
        let key = normalize_key(name);
        if i == 0 && (key == "nome" || key == "name") {
            continue;
        }
        if !seen.insert(key.clone()) {
            continue;
        }
        let declared = row.get(1).and_then(|t| normalize_type(t));
        let count = counts.get(&key).copied().unwrap_or(0);
        merged.push(DetectedCategory {
            name: name.to_string(),
            key,
            kind: declared.unwrap_or(TransactionType::Expense),
            count,
        });
    }
    for category in extracted {
        if seen.insert(category.key.clone()) {
            merged.push(category);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn txn(kind: TransactionType, category: Option<&str>, tags: &[&str]) -> ParsedTransaction {
        ParsedTransaction {
            row: 1,
            reference: "T-1".into(),
            date: "2025-01-15".into(),
            description: "test".into(),
            amount: Decimal::ONE,
            kind,
            category: category.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            validation_errors: Vec::new(),
        }
    }

    #[test]
    fn test_extract_counts_and_order() {
        let txns = vec![
            txn(TransactionType::Expense, Some("Alimentação"), &["mercado"]),
            txn(TransactionType::Expense, Some("Transporte"), &[]),
            txn(TransactionType::Expense, Some("alimentacao"), &["mercado", "extra"]),
        ];
        let (categories, tags) = extract_entities(&txns);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Alimentação");
        assert_eq!(categories[0].count, 2);
        assert_eq!(categories[1].name, "Transporte");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].key, "mercado");
        assert_eq!(tags[0].count, 2);
    }

    #[test]
    fn test_same_key_same_entity() {
        // "Saúde" and "saude" normalize identically and must not split.
        let txns = vec![
            txn(TransactionType::Expense, Some("Saúde"), &[]),
            txn(TransactionType::Expense, Some("saude"), &[]),
        ];
        let (categories, _) = extract_entities(&txns);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].count, 2);
    }

    #[test]
    fn test_polarity_from_first_reference() {
        let txns = vec![txn(TransactionType::Income, Some("Freelance"), &[])];
        let (categories, _) = extract_entities(&txns);
        assert_eq!(categories[0].kind, TransactionType::Income);
    }

    #[test]
    fn test_conflicting_polarity_falls_back_to_expense() {
        let txns = vec![
            txn(TransactionType::Income, Some("Ajustes"), &[]),
            txn(TransactionType::Expense, Some("Ajustes"), &[]),
        ];
        let (categories, _) = extract_entities(&txns);
        assert_eq!(categories[0].kind, TransactionType::Expense);
        assert_eq!(categories[0].count, 2);
    }

    #[test]
    fn test_transactions_without_category_extract_nothing() {
        let txns = vec![txn(TransactionType::Expense, None, &[])];
        let (categories, tags) = extract_entities(&txns);
        assert!(categories.is_empty());
        assert!(tags.is_empty());
    }

    #[test]
    fn test_categories_with_sheet_merges() {
        let sheet = RawGrid {
            name: "Categorias".into(),
            rows: vec![
                vec!["Nome".into(), "Tipo".into()],
                vec!["Alimentação".into(), "Despesa".into()],
                vec!["Salário".into(), "Receita".into()],
            ],
        };
        let txns = vec![
            txn(TransactionType::Expense, Some("Alimentação"), &[]),
            txn(TransactionType::Expense, Some("Farmácia"), &[]),
        ];
        let (extracted, _) = extract_entities(&txns);
        let merged = categories_with_sheet(&sheet, extracted, &txns);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].name, "Alimentação");
        assert_eq!(merged[0].count, 1);
        assert_eq!(merged[1].name, "Salário");
        assert_eq!(merged[1].kind, TransactionType::Income);
        assert_eq!(merged[1].count, 0);
        assert_eq!(merged[2].name, "Farmácia");
    }

    #[test]
    fn test_sheet_declared_type_wins() {
        let sheet = RawGrid {
            name: "Categorias".into(),
            rows: vec![vec!["Reembolsos".into(), "Receita".into()]],
        };
        // Transaction usage says expense, sheet says income.
        let txns = vec![txn(TransactionType::Expense, Some("Reembolsos"), &[])];
        let (extracted, _) = extract_entities(&txns);
        let merged = categories_with_sheet(&sheet, extracted, &txns);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, TransactionType::Income);
        assert_eq!(merged[0].count, 1);
    }
}
