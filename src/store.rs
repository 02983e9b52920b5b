use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{
    Catalog, CatalogEntry, MatchAction, ParsedTransaction, ReconciliationDecision,
    TransactionType,
};
use crate::normalize::{normalize_key, normalize_type};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    color TEXT,
    sort_order INTEGER DEFAULT 0,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    account TEXT NOT NULL,
    record_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    checksum TEXT,
    import_date TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    account TEXT NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount TEXT NOT NULL,
    kind TEXT NOT NULL,
    category_id INTEGER,
    reference TEXT,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE TABLE IF NOT EXISTS transaction_tags (
    transaction_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (transaction_id, tag_id),
    FOREIGN KEY (transaction_id) REFERENCES transactions(id),
    FOREIGN KEY (tag_id) REFERENCES tags(id)
);
";

// (name, kind, color, sort_order)
const DEFAULT_CATEGORIES: &[(&str, &str, &str, i64)] = &[
    ("Salário", "income", "#2e7d32", 1),
    ("Rendimentos", "income", "#388e3c", 2),
    ("Outras Receitas", "income", "#43a047", 3),
    ("Alimentação", "expense", "#c62828", 4),
    ("Moradia", "expense", "#ad1457", 5),
    ("Transporte", "expense", "#6a1b9a", 6),
    ("Saúde", "expense", "#4527a0", 7),
    ("Educação", "expense", "#283593", 8),
    ("Lazer", "expense", "#1565c0", 9),
    ("Outros", "expense", "#546e7a", 10),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Create the schema and seed the default categories on first run.
/// Idempotent, safe to call on every invocation.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0))?;
    if count == 0 {
        for (name, kind, color, order) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, kind, color, sort_order) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, kind, color, order],
            )?;
        }
    }
    Ok(())
}

/// Fetch the catalog snapshot for one import job. Stable ordering so the
/// matcher's first-wins tie-break is reproducible.
pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind FROM categories WHERE is_active = 1 ORDER BY sort_order, id",
    )?;
    let categories = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|(id, name, kind)| CatalogEntry {
            id,
            name,
            kind: normalize_type(&kind),
        })
        .collect();

    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY id")?;
    let tags = stmt
        .query_map([], |row| {
            Ok(CatalogEntry {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: None,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Catalog { categories, tags })
}

pub fn create_category(conn: &Connection, name: &str, kind: TransactionType) -> Result<i64> {
    let order: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM categories",
        [],
        |r| r.get(0),
    )?;
    conn.execute(
        "INSERT INTO categories (name, kind, sort_order) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, kind.as_str(), order],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create_tag(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO tags (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

pub fn file_already_imported(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

fn is_duplicate_row(conn: &Connection, account: &str, txn: &ParsedTransaction) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions WHERE account = ?1 AND date = ?2 AND amount = ?3 AND description = ?4",
    )?;
    Ok(stmt.exists(rusqlite::params![
        account,
        txn.date,
        txn.signed_amount().to_string(),
        txn.description
    ])?)
}

pub struct CommitResult {
    pub imported: usize,
    pub skipped: usize,
    pub created_categories: usize,
    pub created_tags: usize,
}

/// Materialize a confirmed import: create the entities behind `create`
/// decisions (filling their `target` ids in place), then insert the
/// transactions with resolved category/tag ids, skipping row-level
/// duplicates, and record the import batch.
pub fn commit_import(
    conn: &Connection,
    account: &str,
    filename: &str,
    checksum: &str,
    transactions: &[ParsedTransaction],
    category_decisions: &mut [ReconciliationDecision],
    tag_decisions: &mut [ReconciliationDecision],
) -> Result<CommitResult> {
    let mut created_categories = 0usize;
    for decision in category_decisions.iter_mut() {
        if decision.action == MatchAction::Create && decision.target.is_none() {
            let kind = decision.kind.unwrap_or(TransactionType::Expense);
            decision.target = Some(create_category(conn, &decision.name, kind)?);
            created_categories += 1;
        }
    }
    let mut created_tags = 0usize;
    for decision in tag_decisions.iter_mut() {
        if decision.action == MatchAction::Create && decision.target.is_none() {
            decision.target = Some(create_tag(conn, &decision.name)?);
            created_tags += 1;
        }
    }

    let category_ids: HashMap<&str, i64> = category_decisions
        .iter()
        .filter(|d| d.action != MatchAction::Ignore)
        .filter_map(|d| d.target.map(|id| (d.key.as_str(), id)))
        .collect();
    let tag_ids: HashMap<&str, i64> = tag_decisions
        .iter()
        .filter(|d| d.action != MatchAction::Ignore)
        .filter_map(|d| d.target.map(|id| (d.key.as_str(), id)))
        .collect();

    let dates: Vec<&str> = transactions.iter().map(|t| t.date.as_str()).collect();
    conn.execute(
        "INSERT INTO imports (filename, account, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            filename,
            account,
            transactions.len() as i64,
            dates.iter().min().copied(),
            dates.iter().max().copied(),
            checksum,
        ],
    )?;
    let import_id = conn.last_insert_rowid();

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for txn in transactions {
        if is_duplicate_row(conn, account, txn)? {
            skipped += 1;
            continue;
        }
        let category_id = txn
            .category
            .as_ref()
            .and_then(|c| category_ids.get(normalize_key(c).as_str()).copied());
        conn.execute(
            "INSERT INTO transactions (account, date, description, amount, kind, category_id, reference, import_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                account,
                txn.date,
                txn.description,
                txn.signed_amount().to_string(),
                txn.kind.as_str(),
                category_id,
                txn.reference,
                import_id,
            ],
        )?;
        let txn_id = conn.last_insert_rowid();
        for tag in &txn.tags {
            if let Some(tag_id) = tag_ids.get(normalize_key(tag).as_str()) {
                conn.execute(
                    "INSERT OR IGNORE INTO transaction_tags (transaction_id, tag_id) VALUES (?1, ?2)",
                    rusqlite::params![txn_id, tag_id],
                )?;
            }
        }
        imported += 1;
    }

    Ok(CommitResult {
        imported,
        skipped,
        created_categories,
        created_tags,
    })
}
