use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::decoder::{CsvOptions, FileFormat};
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::mapper::ColumnMapping;
use crate::models::{Catalog, FieldTag, MatchAction, ReconciliationDecision, ValidationReport};
use crate::pipeline::{self, ImportConfig, ImportOutcome};
use crate::settings::{get_data_dir, load_settings};
use crate::store;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: &str,
    account: Option<&str>,
    format: Option<&str>,
    delimiter: Option<&str>,
    no_header: bool,
    decimal_separator: Option<&str>,
    map: &[String],
    preview: bool,
    valid_only: bool,
    json: bool,
) -> Result<()> {
    let settings = load_settings();
    let path = PathBuf::from(file);

    let format = match format {
        Some(f) => Some(FileFormat::parse(f)?),
        None => None,
    };
    let delimiter = parse_delimiter(delimiter.unwrap_or(&settings.csv_delimiter))?;
    let decimal_separator =
        parse_decimal_separator(decimal_separator.unwrap_or(&settings.decimal_separator))?;
    let csv = CsvOptions {
        delimiter,
        has_header: !no_header,
        decimal_separator,
    };
    let overrides = parse_overrides(map)?;

    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = store::get_connection(&data_dir.join("tally.db"))?;
    store::init_db(&conn)?;

    let checksum = store::compute_checksum(&path)?;
    if !preview && store::file_already_imported(&conn, &checksum)? {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    let catalog = store::load_catalog(&conn)?;
    let config = ImportConfig {
        format,
        csv,
        overrides,
    };
    let mut outcome = pipeline::run_import(&path, &config, &catalog)?;

    if json {
        print_json(&outcome)?;
    } else {
        print_outcome(&outcome, &csv, &catalog);
    }

    if preview {
        println!("Preview only; nothing was committed.");
        return Ok(());
    }
    if !outcome.report.is_valid && !valid_only {
        println!(
            "{}",
            "Import blocked: the report has errors. Fix the file or re-run with --valid-only."
                .red()
        );
        return Ok(());
    }

    let valid: Vec<_> = outcome
        .transactions
        .iter()
        .filter(|t| t.is_valid())
        .cloned()
        .collect();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("import");
    let account = account.unwrap_or(&settings.default_account);
    let result = store::commit_import(
        &conn,
        account,
        filename,
        &checksum,
        &valid,
        &mut outcome.category_decisions,
        &mut outcome.tag_decisions,
    )?;

    let net = money(valid.iter().map(|t| t.signed_amount()).sum());
    println!(
        "{} imported into '{}' ({net}), {} skipped (duplicates), {} categories created, {} tags created",
        result.imported, account, result.skipped, result.created_categories, result.created_tags
    );
    Ok(())
}

fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "," => Ok(b','),
        ";" => Ok(b';'),
        "tab" | "\t" | "\\t" => Ok(b'\t'),
        other => Err(TallyError::Other(format!(
            "Unsupported delimiter '{other}' (use ',', ';' or 'tab')"
        ))),
    }
}

fn parse_decimal_separator(s: &str) -> Result<char> {
    match s {
        "." => Ok('.'),
        "," => Ok(','),
        other => Err(TallyError::Other(format!(
            "Unsupported decimal separator '{other}' (use '.' or ',')"
        ))),
    }
}

/// "3=amount" -> (2, FieldTag::Amount); columns are 1-based on the CLI.
fn parse_overrides(map: &[String]) -> Result<Vec<(usize, FieldTag)>> {
    let mut overrides = Vec::new();
    for entry in map {
        let Some((column, field)) = entry.split_once('=') else {
            return Err(TallyError::BadMapping(format!(
                "'{entry}' (expected COLUMN=FIELD)"
            )));
        };
        let column: usize = column
            .trim()
            .parse()
            .map_err(|_| TallyError::BadMapping(format!("'{entry}' has no column number")))?;
        if column == 0 {
            return Err(TallyError::BadMapping(format!(
                "'{entry}': columns are numbered from 1"
            )));
        }
        let tag = FieldTag::parse(field).ok_or_else(|| {
            TallyError::BadMapping(format!("'{entry}' names an unknown field '{field}'"))
        })?;
        overrides.push((column - 1, tag));
    }
    Ok(overrides)
}

fn print_outcome(outcome: &ImportOutcome, csv: &CsvOptions, catalog: &Catalog) {
    let grid = &outcome.book.transactions;
    println!(
        "Decoded '{}': {} rows, {} parsed, {} skipped",
        grid.name,
        grid.rows.len(),
        outcome.transactions.len(),
        outcome.skipped_rows.len()
    );
    if !outcome.skipped_rows.is_empty() {
        let rows: Vec<String> = outcome.skipped_rows.iter().map(|r| r.to_string()).collect();
        println!("Skipped rows: {}", rows.join(", "));
    }

    print_mapping(&outcome.mapping, csv, grid.rows.first());
    print_decisions("Categories", &outcome.category_decisions, catalog, true);
    print_decisions("Tags", &outcome.tag_decisions, catalog, false);
    print_report(&outcome.report);
}

fn print_mapping(mapping: &ColumnMapping, csv: &CsvOptions, header: Option<&Vec<String>>) {
    let mut table = Table::new();
    table.set_header(vec!["Column", "Header", "Field"]);
    for column in 0..mapping.len() {
        let header_text = if csv.has_header {
            header
                .and_then(|h| h.get(column))
                .cloned()
                .unwrap_or_default()
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(column + 1),
            Cell::new(header_text),
            Cell::new(mapping.field_at(column).as_str()),
        ]);
    }
    println!("Column mapping\n{table}");
    for warning in &mapping.warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }
}

fn print_decisions(
    title: &str,
    decisions: &[ReconciliationDecision],
    catalog: &Catalog,
    categories: bool,
) {
    if decisions.is_empty() {
        return;
    }
    let existing = if categories {
        &catalog.categories
    } else {
        &catalog.tags
    };
    let mut table = Table::new();
    table.set_header(vec!["Name", "Uses", "Action", "Match", "Confidence"]);
    for decision in decisions {
        let action = match decision.action {
            MatchAction::Map => decision.action.as_str().green(),
            MatchAction::Create => decision.action.as_str().yellow(),
            MatchAction::Ignore => decision.action.as_str().dimmed(),
        };
        let matched = decision
            .target
            .and_then(|id| existing.iter().find(|e| e.id == id))
            .map(|e| e.name.clone())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&decision.name),
            Cell::new(decision.count),
            Cell::new(action),
            Cell::new(matched),
            Cell::new(format!("{:.2}", decision.confidence)),
        ]);
    }
    println!("{title}\n{table}");
}

fn print_report(report: &ValidationReport) {
    let stats = &report.stats;
    let mut table = Table::new();
    table.set_header(vec!["", "Total", "Ok", "Pending"]);
    table.add_row(vec![
        Cell::new("Transactions"),
        Cell::new(stats.total_transactions),
        Cell::new(stats.valid_transactions),
        Cell::new(stats.invalid_transactions),
    ]);
    table.add_row(vec![
        Cell::new("Categories"),
        Cell::new(stats.total_categories),
        Cell::new(stats.mapped_categories),
        Cell::new(stats.unmapped_categories),
    ]);
    table.add_row(vec![
        Cell::new("Tags"),
        Cell::new(stats.total_tags),
        Cell::new(stats.mapped_tags),
        Cell::new(stats.unmapped_tags),
    ]);
    println!("Validation\n{table}");

    for error in &report.errors {
        println!("{} {}", "error:".red(), error);
    }
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }
    if report.is_valid {
        println!("{}", "Report: valid".green());
    } else {
        println!("{}", "Report: invalid".red().bold());
    }
}

fn print_json(outcome: &ImportOutcome) -> Result<()> {
    let payload = serde_json::json!({
        "transactions": outcome.transactions,
        "skipped_rows": outcome.skipped_rows,
        "category_decisions": outcome.category_decisions,
        "tag_decisions": outcome.tag_decisions,
        "report": outcome.report,
    });
    let rendered = serde_json::to_string_pretty(&payload)
        .map_err(|e| TallyError::Other(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_delimiter("|").is_err());
    }

    #[test]
    fn test_parse_overrides() {
        let overrides =
            parse_overrides(&["1=date".to_string(), "3=amount".to_string()]).unwrap();
        assert_eq!(overrides, vec![(0, FieldTag::Date), (2, FieldTag::Amount)]);
    }

    #[test]
    fn test_parse_overrides_rejects_bad_input() {
        assert!(parse_overrides(&["amount".to_string()]).is_err());
        assert!(parse_overrides(&["x=amount".to_string()]).is_err());
        assert!(parse_overrides(&["0=amount".to_string()]).is_err());
        assert!(parse_overrides(&["2=balance".to_string()]).is_err());
    }
}
