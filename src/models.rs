use rust_decimal::Decimal;
use serde::Serialize;

/// Polarity of a transaction. After parsing, polarity lives here and
/// never in the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// A decoded sheet/section: ordered rows of untyped cell text.
/// Immutable once produced by the decoder.
#[derive(Debug, Clone)]
pub struct RawGrid {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Canonical transaction fields a spreadsheet column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTag {
    Date,
    Description,
    Amount,
    Type,
    Category,
    Tags,
    Ignore,
}

impl FieldTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Type => "type",
            Self::Category => "category",
            Self::Tags => "tags",
            Self::Ignore => "ignore",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "description" => Some(Self::Description),
            "amount" => Some(Self::Amount),
            "type" => Some(Self::Type),
            "category" => Some(Self::Category),
            "tags" => Some(Self::Tags),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// One structured row out of the Row Parser. `amount` is always positive;
/// `kind` carries the polarity. `validation_errors` is filled in by the
/// validator, nothing else mutates a parsed transaction.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTransaction {
    pub row: usize,
    pub reference: String,
    pub date: String,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub validation_errors: Vec<String>,
}

impl ParsedTransaction {
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    /// Amount with the polarity folded back in, for handing to the store.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A distinct category referenced by the import, with usage count and
/// inferred polarity.
#[derive(Debug, Clone)]
pub struct DetectedCategory {
    pub name: String,
    pub key: String,
    pub kind: TransactionType,
    pub count: usize,
}

/// A distinct tag referenced by the import, with usage count.
#[derive(Debug, Clone)]
pub struct DetectedTag {
    pub name: String,
    pub key: String,
    pub count: usize,
}

/// An existing catalog entity, as fetched once per import job.
/// `kind` is None for tags.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub kind: Option<TransactionType>,
}

/// Read-only catalog snapshot passed into the matcher and validator.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<CatalogEntry>,
    pub tags: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchAction {
    Map,
    Create,
    Ignore,
}

impl MatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Create => "create",
            Self::Ignore => "ignore",
        }
    }
}

/// Outcome of reconciling one detected category/tag against the catalog.
/// `target` is the existing entity id for `map`, and is filled in for
/// `create` decisions once the commit materializes the new entity.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationDecision {
    pub name: String,
    pub key: String,
    pub action: MatchAction,
    pub target: Option<i64>,
    pub confidence: f64,
    pub kind: Option<TransactionType>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    pub total_transactions: usize,
    pub valid_transactions: usize,
    pub invalid_transactions: usize,
    pub total_categories: usize,
    pub mapped_categories: usize,
    pub unmapped_categories: usize,
    pub total_tags: usize,
    pub mapped_tags: usize,
    pub unmapped_tags: usize,
}

/// Full validation pass over the parsed rows. Recomputed whole on every
/// pass, never patched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ImportStats,
}
