use crate::models::FieldTag;
use crate::normalize::normalize_key;

// Header keyword -> canonical field lookup, kept as data so new locales
// are a table edit. Keywords are matched as substrings of the normalized
// header text; table order decides which field a header is tested
// against first.
const FIELD_KEYWORDS: &[(FieldTag, &[&str])] = &[
    (FieldTag::Date, &["data", "date"]),
    (FieldTag::Description, &["desc", "memo", "obs"]),
    (FieldTag::Amount, &["valor", "amount", "montante"]),
    (FieldTag::Type, &["tipo", "type"]),
    (FieldTag::Category, &["categoria", "category"]),
    (FieldTag::Tags, &["tag", "etiqueta"]),
];

/// Positional fallback when a file has no header row; mirrors the
/// template's column order.
const POSITIONAL_FIELDS: &[FieldTag] = &[
    FieldTag::Date,
    FieldTag::Description,
    FieldTag::Amount,
    FieldTag::Type,
    FieldTag::Category,
    FieldTag::Tags,
];

/// Column -> canonical field assignment for one import. Advisory until
/// the caller parses: any entry may be overridden via `assign`. At most
/// one column holds each non-ignore field; reassignments are recorded in
/// `warnings` rather than happening silently.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    fields: Vec<FieldTag>,
    pub warnings: Vec<String>,
}

impl ColumnMapping {
    pub fn new(column_count: usize) -> Self {
        Self {
            fields: vec![FieldTag::Ignore; column_count],
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_at(&self, column: usize) -> FieldTag {
        self.fields.get(column).copied().unwrap_or(FieldTag::Ignore)
    }

    pub fn column_for(&self, tag: FieldTag) -> Option<usize> {
        if tag == FieldTag::Ignore {
            return None;
        }
        self.fields.iter().position(|f| *f == tag)
    }

    /// Assign a field to a column. If another column already holds the
    /// field, that column is demoted to `ignore` and a warning is
    /// recorded (columns are reported 1-based).
    pub fn assign(&mut self, column: usize, tag: FieldTag) {
        if column >= self.fields.len() {
            self.fields.resize(column + 1, FieldTag::Ignore);
        }
        if tag != FieldTag::Ignore {
            if let Some(previous) = self.column_for(tag) {
                if previous != column {
                    self.fields[previous] = FieldTag::Ignore;
                    self.warnings.push(format!(
                        "column {} replaces column {} for field '{}'",
                        column + 1,
                        previous + 1,
                        tag.as_str()
                    ));
                }
            }
        }
        self.fields[column] = tag;
    }
}

/// Propose an initial mapping from header text. First keyword match wins
/// per column; a later column matching an already-taken field overwrites
/// it (with a warning). Without a header the proposal is positional.
pub fn auto_map(header: Option<&[String]>, column_count: usize) -> ColumnMapping {
    let mut mapping = ColumnMapping::new(column_count);
    match header {
        Some(cells) => {
            for (column, cell) in cells.iter().enumerate().take(column_count) {
                let key = normalize_key(cell);
                if key.is_empty() {
                    continue;
                }
                for (tag, keywords) in FIELD_KEYWORDS {
                    if keywords.iter().any(|k| key.contains(k)) {
                        mapping.assign(column, *tag);
                        break;
                    }
                }
            }
        }
        None => {
            for (column, tag) in POSITIONAL_FIELDS.iter().enumerate().take(column_count) {
                mapping.assign(column, *tag);
            }
        }
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_auto_map_portuguese_headers() {
        let h = headers(&["Data", "Descrição", "Valor", "Tipo", "Categoria", "Tags"]);
        let mapping = auto_map(Some(h.as_slice()), h.len());
        assert_eq!(mapping.field_at(0), FieldTag::Date);
        assert_eq!(mapping.field_at(1), FieldTag::Description);
        assert_eq!(mapping.field_at(2), FieldTag::Amount);
        assert_eq!(mapping.field_at(3), FieldTag::Type);
        assert_eq!(mapping.field_at(4), FieldTag::Category);
        assert_eq!(mapping.field_at(5), FieldTag::Tags);
        assert!(mapping.warnings.is_empty());
    }

    #[test]
    fn test_auto_map_english_headers() {
        let h = headers(&["Date", "Memo", "Amount", "Type", "Category"]);
        let mapping = auto_map(Some(h.as_slice()), h.len());
        assert_eq!(mapping.field_at(0), FieldTag::Date);
        assert_eq!(mapping.field_at(1), FieldTag::Description);
        assert_eq!(mapping.field_at(2), FieldTag::Amount);
        assert_eq!(mapping.field_at(3), FieldTag::Type);
        assert_eq!(mapping.field_at(4), FieldTag::Category);
    }

    #[test]
    fn test_auto_map_unknown_headers_ignored() {
        let h = headers(&["Saldo", "Data", "Observação", "Valor"]);
        let mapping = auto_map(Some(h.as_slice()), h.len());
        assert_eq!(mapping.field_at(0), FieldTag::Ignore);
        assert_eq!(mapping.field_at(1), FieldTag::Date);
        assert_eq!(mapping.field_at(2), FieldTag::Description);
        assert_eq!(mapping.field_at(3), FieldTag::Amount);
    }

    #[test]
    fn test_auto_map_duplicate_header_last_wins_with_warning() {
        let h = headers(&["Data", "Valor", "Data de Pagamento"]);
        let mapping = auto_map(Some(h.as_slice()), h.len());
        assert_eq!(mapping.field_at(0), FieldTag::Ignore);
        assert_eq!(mapping.field_at(2), FieldTag::Date);
        assert_eq!(mapping.warnings.len(), 1);
        assert!(mapping.warnings[0].contains("'date'"));
    }

    #[test]
    fn test_auto_map_headerless_is_positional() {
        let mapping = auto_map(None, 4);
        assert_eq!(mapping.field_at(0), FieldTag::Date);
        assert_eq!(mapping.field_at(1), FieldTag::Description);
        assert_eq!(mapping.field_at(2), FieldTag::Amount);
        assert_eq!(mapping.field_at(3), FieldTag::Type);
    }

    #[test]
    fn test_manual_assign_overrides_auto() {
        let h = headers(&["Data", "Valor", "Histórico"]);
        let mut mapping = auto_map(Some(h.as_slice()), h.len());
        assert_eq!(mapping.field_at(2), FieldTag::Ignore);
        mapping.assign(2, FieldTag::Description);
        assert_eq!(mapping.field_at(2), FieldTag::Description);
        assert_eq!(mapping.column_for(FieldTag::Description), Some(2));
    }

    #[test]
    fn test_assign_steals_field_from_other_column() {
        let mut mapping = ColumnMapping::new(3);
        mapping.assign(0, FieldTag::Amount);
        mapping.assign(2, FieldTag::Amount);
        assert_eq!(mapping.field_at(0), FieldTag::Ignore);
        assert_eq!(mapping.column_for(FieldTag::Amount), Some(2));
        assert_eq!(mapping.warnings.len(), 1);
    }

    #[test]
    fn test_no_field_maps_to_two_columns() {
        let h = headers(&["Valor Pago", "Valor Total", "Data"]);
        let mapping = auto_map(Some(h.as_slice()), h.len());
        let amount_columns = (0..mapping.len())
            .filter(|c| mapping.field_at(*c) == FieldTag::Amount)
            .count();
        assert_eq!(amount_columns, 1);
    }
}
