use rust_decimal::Decimal;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::TransactionType;

// Keyword tables are data so locales can be extended without touching the
// matching logic. Entries must already be in normalized-key form.
const INCOME_KEYWORDS: &[&str] = &["receita", "income", "entrada", "ganho"];
const EXPENSE_KEYWORDS: &[&str] = &["despesa", "expense", "saida", "gasto"];

const CURRENCY_SYMBOLS: &[&str] = &["R$", "$", "€"];

/// Canonical comparison key for category and tag names: lowercase,
/// accents stripped, runs of non-alphanumeric characters collapsed to a
/// single space, trimmed. Idempotent.
pub fn normalize_key(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lower = stripped.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut pending_space = false;
    for c in lower.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            out.push(c);
            pending_space = false;
        } else {
            pending_space = true;
        }
    }
    out
}

/// Map free-text type labels onto a polarity. Matching is case- and
/// accent-insensitive substring lookup; None means the caller should
/// infer polarity from the amount sign instead.
pub fn normalize_type(text: &str) -> Option<TransactionType> {
    let key = normalize_key(text);
    if key.is_empty() {
        return None;
    }
    if INCOME_KEYWORDS.iter().any(|k| key.contains(k)) {
        return Some(TransactionType::Income);
    }
    if EXPENSE_KEYWORDS.iter().any(|k| key.contains(k)) {
        return Some(TransactionType::Expense);
    }
    None
}

/// Parse a currency cell into a signed decimal. With `decimal_separator`
/// set to ',' a `.` is a thousands separator ("R$ 1.234,56" -> 1234.56);
/// otherwise `,` is ("1,234.56" -> 1234.56). Parenthesized values are
/// negative, the usual bank-statement convention. Returns None on
/// anything non-numeric.
pub fn parse_amount(raw: &str, decimal_separator: char) -> Option<Decimal> {
    let mut s = raw.trim().to_string();
    for sym in CURRENCY_SYMBOLS {
        s = s.replace(sym, "");
    }
    s.retain(|c| !c.is_whitespace());
    let negative = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        s = inner.to_string();
        true
    } else {
        false
    };
    if s.is_empty() {
        return None;
    }
    let s = if decimal_separator == ',' {
        s.replace('.', "").replace(',', ".")
    } else {
        s.replace(',', "")
    };
    let amount: Decimal = s.parse().ok()?;
    Some(if negative { -amount } else { amount })
}

/// Rewrite DD/MM/YYYY, DD-MM-YYYY and YYYY/MM/DD into YYYY-MM-DD,
/// zero-padding as needed. Anything else comes back unchanged; the
/// validator is the one that flags unparseable dates.
pub fn format_date(raw: &str) -> String {
    let s = raw.trim();
    let sep = if s.contains('/') {
        '/'
    } else if s.contains('-') {
        '-'
    } else {
        return raw.to_string();
    };
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return raw.to_string();
    }
    let (y, m, d) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else if parts[2].len() == 4 {
        (parts[2], parts[1], parts[0])
    } else {
        return raw.to_string();
    };
    let (Ok(y), Ok(m), Ok(d)) = (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) else {
        return raw.to_string();
    };
    format!("{y:04}-{m:02}-{d:02}")
}
