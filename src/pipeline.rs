use std::collections::BTreeSet;
use std::path::Path;

use crate::decoder::{self, CsvOptions, FileFormat, ImportBook};
use crate::error::Result;
use crate::extractor;
use crate::mapper::{self, ColumnMapping};
use crate::matcher;
use crate::models::{
    Catalog, DetectedCategory, DetectedTag, FieldTag, ParsedTransaction, ReconciliationDecision,
    ValidationReport,
};
use crate::rowparse;
use crate::validator;

/// Everything needed to run one import job.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// None means: decide by file extension.
    pub format: Option<FileFormat>,
    pub csv: CsvOptions,
    /// Manual column overrides applied after auto-mapping (0-based).
    pub overrides: Vec<(usize, FieldTag)>,
}

/// The artifacts of every stage, threaded through explicitly so each
/// stage stays independently testable and there is no shared processor
/// state to call out of order.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub book: ImportBook,
    pub mapping: ColumnMapping,
    pub transactions: Vec<ParsedTransaction>,
    pub skipped_rows: BTreeSet<usize>,
    pub categories: Vec<DetectedCategory>,
    pub tags: Vec<DetectedTag>,
    pub category_decisions: Vec<ReconciliationDecision>,
    pub tag_decisions: Vec<ReconciliationDecision>,
    pub report: ValidationReport,
}

/// Run the whole pipeline: decode -> map -> parse -> extract ->
/// reconcile -> validate. Only decoding can fail; everything after
/// degrades row by row and always yields a report.
pub fn run_import(path: &Path, config: &ImportConfig, catalog: &Catalog) -> Result<ImportOutcome> {
    let format = config.format.unwrap_or_else(|| FileFormat::from_path(path));
    let book = decoder::decode_file(path, format, &config.csv)?;

    let grid = &book.transactions;
    let width = grid.rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let header = if config.csv.has_header {
        grid.rows.first().map(|r| r.as_slice())
    } else {
        None
    };
    let mut mapping = mapper::auto_map(header, width);
    for (column, tag) in &config.overrides {
        mapping.assign(*column, *tag);
    }

    let source = source_label(path);
    let outcome = rowparse::parse_rows(grid, &mapping, &config.csv, &source);
    let mut transactions = outcome.transactions;

    let (extracted, tags) = extractor::extract_entities(&transactions);
    let categories = match &book.categories {
        Some(sheet) => extractor::categories_with_sheet(sheet, extracted, &transactions),
        None => extracted,
    };

    let category_decisions = matcher::reconcile_categories(&categories, &catalog.categories);
    let tag_decisions = matcher::reconcile_tags(&tags, &catalog.tags);
    let report = validator::validate(&mut transactions, &category_decisions, &tag_decisions);

    Ok(ImportOutcome {
        book,
        mapping,
        transactions,
        skipped_rows: outcome.skipped_rows,
        categories,
        tags,
        category_decisions,
        tag_decisions,
        report,
    })
}

/// Uppercased file stem, used in per-row reference tags.
fn source_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("import")
        .to_uppercase()
}
