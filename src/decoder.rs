use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{Result, TallyError};
use crate::models::RawGrid;

/// Sheet-name keywords used to classify XLSX sheets.
const TRANSACTION_SHEET_KEYWORDS: &[&str] = &["transa", "transaction", "dados"];
const CATEGORY_SHEET_KEYWORDS: &[&str] = &["categor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Xlsx),
            other => Err(TallyError::UnknownFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xls"));
        if by_ext == Some(true) {
            Self::Xlsx
        } else {
            Self::Csv
        }
    }
}

/// Input-side configuration for one import job.
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
    pub decimal_separator: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            decimal_separator: '.',
        }
    }
}

/// The decoded file: one transactions grid, and optionally a dedicated
/// categories grid (XLSX only). When `categories` is None the extractor
/// derives categories from the transaction rows instead.
#[derive(Debug, Clone)]
pub struct ImportBook {
    pub transactions: RawGrid,
    pub categories: Option<RawGrid>,
}

pub fn decode_file(path: &Path, format: FileFormat, options: &CsvOptions) -> Result<ImportBook> {
    match format {
        FileFormat::Csv => decode_csv(path, options),
        FileFormat::Xlsx => decode_xlsx(path),
    }
}

fn decode_csv(path: &Path, options: &CsvOptions) -> Result<ImportBook> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.byte_records() {
        let Ok(record) = result else { continue };
        rows.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
                .collect(),
        );
    }

    if rows.is_empty() {
        return Err(TallyError::EmptyFile(path.display().to_string()));
    }
    if rows.iter().all(|r| r.len() < 2) {
        return Err(TallyError::Delimiter(
            path.display().to_string(),
            options.delimiter as char,
        ));
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("import")
        .to_string();
    Ok(ImportBook {
        transactions: RawGrid { name, rows },
        categories: None,
    })
}

fn decode_xlsx(path: &Path) -> Result<ImportBook> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| TallyError::Decode(format!("failed to open workbook: {e}")))?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut transactions: Option<RawGrid> = None;
    let mut categories: Option<RawGrid> = None;
    for name in &sheet_names {
        let lower = name.to_lowercase();
        let is_transactions = TRANSACTION_SHEET_KEYWORDS.iter().any(|k| lower.contains(k));
        let is_categories = CATEGORY_SHEET_KEYWORDS.iter().any(|k| lower.contains(k));
        if !is_transactions && !is_categories {
            continue;
        }
        let Ok(range) = workbook.worksheet_range(name) else {
            continue;
        };
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        let grid = RawGrid {
            name: name.clone(),
            rows,
        };
        if is_transactions && transactions.is_none() {
            transactions = Some(grid);
        } else if is_categories && categories.is_none() {
            categories = Some(grid);
        }
    }

    let transactions = transactions.ok_or_else(|| {
        TallyError::Decode(format!(
            "no transactions sheet in {} (sheets: {})",
            path.display(),
            sheet_names.join(", ")
        ))
    })?;
    if transactions.rows.is_empty() {
        return Err(TallyError::EmptyFile(path.display().to_string()));
    }
    Ok(ImportBook {
        transactions,
        categories,
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn excel_serial_to_date(serial: f64) -> String {
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = base + chrono::Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}
