use std::path::{Path, PathBuf};

use crate::error::Result;

/// Column shapes of the downloadable import template. The transactions
/// sheet is what the column mapper expects to see; the categories sheet
/// feeds the catalog side of reconciliation.
pub const TRANSACTION_HEADERS: &[&str] = &["Data", "Descrição", "Valor", "Tipo", "Categoria", "Tags"];
pub const CATEGORY_HEADERS: &[&str] = &["Nome", "Tipo", "Cor", "Ordem"];

const SAMPLE_TRANSACTIONS: &[&[&str]] = &[
    &["05/01/2025", "Supermercado Bom Preço", "350.75", "Despesa", "Alimentação", "mercado"],
    &["07/01/2025", "Salário Janeiro", "4500.00", "Receita", "Salário", ""],
    &["12/01/2025", "Uber para o aeroporto", "48.90", "Despesa", "Transporte", "viagem, trabalho"],
    &["15/01/2025", "Cinema com a família", "82.00", "Despesa", "Lazer", "família"],
];

const SAMPLE_CATEGORIES: &[&[&str]] = &[
    &["Alimentação", "Despesa", "#c62828", "1"],
    &["Transporte", "Despesa", "#6a1b9a", "2"],
    &["Lazer", "Despesa", "#1565c0", "3"],
    &["Salário", "Receita", "#2e7d32", "4"],
];

/// Write the two example files into `dir` and return their paths.
/// Pure generation: same bytes every time, no inputs.
pub fn write_template(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let transactions_path = dir.join("tally-transacoes.csv");
    let categories_path = dir.join("tally-categorias.csv");
    write_sheet(&transactions_path, TRANSACTION_HEADERS, SAMPLE_TRANSACTIONS)?;
    write_sheet(&categories_path, CATEGORY_HEADERS, SAMPLE_CATEGORIES)?;
    Ok((transactions_path, categories_path))
}

fn write_sheet(path: &Path, headers: &[&str], rows: &[&[&str]]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(*row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{decode_file, CsvOptions, FileFormat};
    use crate::mapper::auto_map;
    use crate::models::FieldTag;

    #[test]
    fn test_template_files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let (txns, cats) = write_template(dir.path()).unwrap();
        assert!(txns.exists());
        assert!(cats.exists());
        let content = std::fs::read_to_string(&txns).unwrap();
        assert!(content.starts_with("Data,"));
        assert!(content.contains("Supermercado"));
    }

    #[test]
    fn test_template_generation_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = write_template(dir.path()).unwrap();
        let bytes_a = std::fs::read(&first).unwrap();
        let (second, _) = write_template(dir.path()).unwrap();
        let bytes_b = std::fs::read(&second).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn test_template_round_trips_through_the_mapper() {
        // The template's own headers must auto-map cleanly.
        let dir = tempfile::tempdir().unwrap();
        let (txns, _) = write_template(dir.path()).unwrap();
        let book = decode_file(&txns, FileFormat::Csv, &CsvOptions::default()).unwrap();
        let header = book.transactions.rows[0].clone();
        let mapping = auto_map(Some(header.as_slice()), header.len());
        assert_eq!(mapping.column_for(FieldTag::Date), Some(0));
        assert_eq!(mapping.column_for(FieldTag::Description), Some(1));
        assert_eq!(mapping.column_for(FieldTag::Amount), Some(2));
        assert_eq!(mapping.column_for(FieldTag::Type), Some(3));
        assert_eq!(mapping.column_for(FieldTag::Category), Some(4));
        assert_eq!(mapping.column_for(FieldTag::Tags), Some(5));
        assert!(mapping.warnings.is_empty());
    }
}
