use crate::models::{
    CatalogEntry, DetectedCategory, DetectedTag, MatchAction, ReconciliationDecision,
    TransactionType,
};
use crate::normalize::normalize_key;

/// Acceptance thresholds are exclusive lower bounds: a best score has to
/// beat the threshold, equality is not enough. Tags are shorter and more
/// collision-prone than categories, hence the stricter bar.
pub const CATEGORY_THRESHOLD: f64 = 0.7;
pub const TAG_THRESHOLD: f64 = 0.8;

/// Classic single-cost Levenshtein distance (insert/delete/substitute
/// all cost 1), computed over chars with a two-row table.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Similarity of two normalized keys in [0, 1]: exact match 1.0,
/// substring containment either direction 0.9, otherwise the edit
/// distance scaled by the longer length.
pub fn confidence(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(b) || b.contains(a) {
        return 0.9;
    }
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Best-scoring catalog entry for a key. Ties keep the first entry seen,
/// so catalog iteration order is the tie-break.
fn best_match(key: &str, catalog: &[CatalogEntry]) -> Option<(i64, f64)> {
    let mut best: Option<(i64, f64)> = None;
    for entry in catalog {
        let score = confidence(key, &normalize_key(&entry.name));
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((entry.id, score));
        }
    }
    best
}

fn decide(
    name: String,
    key: String,
    kind: Option<TransactionType>,
    count: usize,
    best: Option<(i64, f64)>,
    threshold: f64,
) -> ReconciliationDecision {
    match best {
        Some((id, score)) if score > threshold => ReconciliationDecision {
            name,
            key,
            action: MatchAction::Map,
            target: Some(id),
            confidence: score,
            kind,
            count,
        },
        other => ReconciliationDecision {
            name,
            key,
            action: MatchAction::Create,
            target: None,
            confidence: other.map(|(_, score)| score).unwrap_or(0.0),
            kind,
            count,
        },
    }
}

/// One decision per detected category against the category catalog.
/// Pure: no I/O, no mutation of either input.
pub fn reconcile_categories(
    detected: &[DetectedCategory],
    catalog: &[CatalogEntry],
) -> Vec<ReconciliationDecision> {
    detected
        .iter()
        .map(|c| {
            decide(
                c.name.clone(),
                c.key.clone(),
                Some(c.kind),
                c.count,
                best_match(&c.key, catalog),
                CATEGORY_THRESHOLD,
            )
        })
        .collect()
}

/// One decision per detected tag against the tag catalog.
pub fn reconcile_tags(
    detected: &[DetectedTag],
    catalog: &[CatalogEntry],
) -> Vec<ReconciliationDecision> {
    detected
        .iter()
        .map(|t| {
            decide(
                t.name.clone(),
                t.key.clone(),
                None,
                t.count,
                best_match(&t.key, catalog),
                TAG_THRESHOLD,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[(i64, &str)]) -> Vec<CatalogEntry> {
        names
            .iter()
            .map(|(id, name)| CatalogEntry {
                id: *id,
                name: name.to_string(),
                kind: Some(TransactionType::Expense),
            })
            .collect()
    }

    fn detected(name: &str, count: usize) -> DetectedCategory {
        DetectedCategory {
            name: name.to_string(),
            key: normalize_key(name),
            kind: TransactionType::Expense,
            count,
        }
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("mercado", "mercearia"), 4);
    }

    #[test]
    fn test_levenshtein_is_symmetric() {
        assert_eq!(
            levenshtein("alimentacao", "alimentos"),
            levenshtein("alimentos", "alimentacao")
        );
    }

    #[test]
    fn test_confidence_tiers_are_ordered() {
        // exact >= containment >= edit-distance score
        let exact = confidence("mercado", "mercado");
        let contained = confidence("mercado", "mercado central");
        let distant = confidence("mercado", "padaria");
        assert_eq!(exact, 1.0);
        assert_eq!(contained, 0.9);
        assert!(distant < contained);
        assert!((0.0..=1.0).contains(&distant));
    }

    #[test]
    fn test_confidence_empty_keys_never_contain() {
        assert_eq!(confidence("", ""), 1.0);
        assert_eq!(confidence("", "mercado"), 0.0);
        assert_eq!(confidence("mercado", ""), 0.0);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        // A best score of exactly 0.70 must not map a category, 0.71
        // must; same shape at 0.80/0.81 for tags.
        assert!(!(0.70 > CATEGORY_THRESHOLD));
        assert!(0.71 > CATEGORY_THRESHOLD);
        assert!(!(0.80 > TAG_THRESHOLD));
        assert!(0.81 > TAG_THRESHOLD);
    }

    #[test]
    fn test_exact_match_maps_with_full_confidence() {
        let catalog = catalog(&[(1, "Alimentação"), (2, "Transporte")]);
        let decisions = reconcile_categories(&[detected("alimentacao", 3)], &catalog);
        assert_eq!(decisions[0].action, MatchAction::Map);
        assert_eq!(decisions[0].target, Some(1));
        assert_eq!(decisions[0].confidence, 1.0);
        assert_eq!(decisions[0].count, 3);
    }

    #[test]
    fn test_close_match_maps() {
        // "transportes" contains "transporte", so this lands on the 0.9 tier
        let catalog = catalog(&[(7, "Transporte")]);
        let decisions = reconcile_categories(&[detected("Transportes", 1)], &catalog);
        assert_eq!(decisions[0].action, MatchAction::Map);
        assert_eq!(decisions[0].target, Some(7));
        assert!(decisions[0].confidence > CATEGORY_THRESHOLD);
    }

    #[test]
    fn test_unrelated_name_creates() {
        let catalog = catalog(&[(1, "Alimentação")]);
        let decisions = reconcile_categories(&[detected("Categoria Completamente Nova", 2)], &catalog);
        assert_eq!(decisions[0].action, MatchAction::Create);
        assert_eq!(decisions[0].target, None);
        assert!(decisions[0].confidence <= CATEGORY_THRESHOLD);
    }

    #[test]
    fn test_empty_catalog_creates_with_zero_confidence() {
        let decisions = reconcile_categories(&[detected("Qualquer", 1)], &[]);
        assert_eq!(decisions[0].action, MatchAction::Create);
        assert_eq!(decisions[0].confidence, 0.0);
        assert_eq!(decisions[0].target, None);
    }

    #[test]
    fn test_first_entry_wins_ties() {
        let catalog = catalog(&[(1, "Lazer"), (2, "lazer")]);
        let decisions = reconcile_categories(&[detected("Lazer", 1)], &catalog);
        assert_eq!(decisions[0].target, Some(1));
    }

    #[test]
    fn test_tags_use_stricter_threshold() {
        // "viagens" vs "viagem": distance 2 over 7 chars ≈ 0.714 —
        // enough for a category, not for a tag.
        let entry = vec![CatalogEntry {
            id: 9,
            name: "viagem".into(),
            kind: None,
        }];
        let tag = DetectedTag {
            name: "viagens".into(),
            key: "viagens".into(),
            count: 1,
        };
        let decisions = reconcile_tags(&[tag], &entry);
        assert_eq!(decisions[0].action, MatchAction::Create);

        let cat = detected("viagens", 1);
        let cat_decisions = reconcile_categories(
            &[cat],
            &catalog(&[(9, "viagem")]),
        );
        assert_eq!(cat_decisions[0].action, MatchAction::Map);
    }

    #[test]
    fn test_substring_containment_maps_tags() {
        let entry = vec![CatalogEntry {
            id: 4,
            name: "trabalho".into(),
            kind: None,
        }];
        let tag = DetectedTag {
            name: "trabalho remoto".into(),
            key: "trabalho remoto".into(),
            count: 1,
        };
        let decisions = reconcile_tags(&[tag], &entry);
        assert_eq!(decisions[0].action, MatchAction::Map);
        assert_eq!(decisions[0].confidence, 0.9);
    }
}
