use std::collections::BTreeSet;

use crate::decoder::CsvOptions;
use crate::mapper::ColumnMapping;
use crate::models::{FieldTag, ParsedTransaction, RawGrid, TransactionType};
use crate::normalize::{format_date, normalize_type, parse_amount};

/// Parsed rows plus the rows that were dropped, so callers can see the
/// gap without diffing counts themselves.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub transactions: Vec<ParsedTransaction>,
    pub skipped_rows: BTreeSet<usize>,
}

/// Turn grid rows into transactions. Parsing is total: a malformed row
/// lands in `skipped_rows`, it never aborts the file. Rows are skipped
/// when date, description or amount is missing, or when the amount is
/// unparseable or zero.
pub fn parse_rows(
    grid: &RawGrid,
    mapping: &ColumnMapping,
    options: &CsvOptions,
    source: &str,
) -> ParseOutcome {
    let mut transactions = Vec::new();
    let mut skipped_rows = BTreeSet::new();

    let data_rows: &[Vec<String>] = if options.has_header && !grid.rows.is_empty() {
        &grid.rows[1..]
    } else {
        &grid.rows[..]
    };
    let first_row_number = if options.has_header { 2 } else { 1 };

    for (i, row) in data_rows.iter().enumerate() {
        let row_number = first_row_number + i;
        let cell = |tag: FieldTag| {
            mapping
                .column_for(tag)
                .and_then(|c| row.get(c))
                .map(|s| s.trim())
                .unwrap_or("")
        };

        let date_raw = cell(FieldTag::Date);
        let description = cell(FieldTag::Description);
        let amount_raw = cell(FieldTag::Amount);
        if date_raw.is_empty() || description.is_empty() || amount_raw.is_empty() {
            skipped_rows.insert(row_number);
            continue;
        }

        let Some(amount) = parse_amount(amount_raw, options.decimal_separator) else {
            skipped_rows.insert(row_number);
            continue;
        };
        if amount.is_zero() {
            skipped_rows.insert(row_number);
            continue;
        }

        // Explicit type column wins; otherwise the raw sign decides.
        let kind = normalize_type(cell(FieldTag::Type)).unwrap_or(if amount.is_sign_negative() {
            TransactionType::Expense
        } else {
            TransactionType::Income
        });

        let category = {
            let c = cell(FieldTag::Category);
            (!c.is_empty()).then(|| c.to_string())
        };
        let tags: Vec<String> = cell(FieldTag::Tags)
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        transactions.push(ParsedTransaction {
            row: row_number,
            reference: format!("{source}-{row_number}"),
            date: format_date(date_raw),
            description: description.to_string(),
            amount: amount.abs(),
            kind,
            category,
            tags,
            validation_errors: Vec::new(),
        });
    }

    ParseOutcome {
        transactions,
        skipped_rows,
    }
}
