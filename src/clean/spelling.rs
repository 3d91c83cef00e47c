use rusqlite::{params, Connection};

use crate::error::Result;
use crate::schema::EntityKind;

/// Lowest similarity at which a reference spelling replaces a stored name
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Normalized edit-distance similarity in `[0, 1]`, ignoring case
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

/// Closest reference name scoring at least `threshold`.
/// Ties go to the earlier entry in `references`.
pub fn best_match<'r>(name: &str, references: &'r [String], threshold: f64) -> Option<&'r str> {
    let needle = name.trim().to_lowercase();
    let mut best: Option<(&'r str, f64)> = None;

    for candidate in references {
        let score = strsim::normalized_levenshtein(&needle, &candidate.trim().to_lowercase());
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate.as_str(), score));
            if score >= 1.0 {
                break;
            }
        }
    }

    best.filter(|(_, score)| *score >= threshold)
        .map(|(candidate, _)| candidate)
}

/// Rewrite names of `kind` to their closest reference spelling.
///
/// Rows already matching a reference (ignoring case) are left for the case
/// normalizer; returns the number of rows whose spelling changed.
pub fn correct_spelling(
    conn: &Connection,
    kind: EntityKind,
    references: &[String],
    threshold: f64,
) -> Result<usize> {
    if references.is_empty() {
        tracing::warn!(kind = %kind, "empty reference list, skipping spelling correction");
        return Ok(0);
    }

    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare_cached(kind.select_rows_sql())?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut update = conn.prepare_cached(kind.rename_sql())?;
    let mut corrected = 0;

    for (id, name) in rows {
        let Some(matched) = best_match(&name, references, threshold) else {
            continue;
        };
        if matched.trim().to_lowercase() == name.trim().to_lowercase() {
            continue;
        }
        tracing::debug!(kind = %kind, id, from = %name, to = %matched, "corrected spelling");
        corrected += update.execute(params![matched, id])?;
    }

    Ok(corrected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::{memory_db, names};

    fn refs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_best_match_ignores_case() {
        let list = refs(&["bulbasaur", "pikachu", "raichu"]);
        assert_eq!(best_match("Pikuchu", &list, 0.6), Some("pikachu"));
        assert_eq!(best_match("PIKACHU", &list, 0.6), Some("pikachu"));
        assert_eq!(best_match("Bulbasuar", &list, 0.6), Some("bulbasaur"));
    }

    #[test]
    fn test_best_match_respects_threshold() {
        let list = refs(&["grass", "poison"]);
        assert_eq!(best_match("gras", &list, 0.6), Some("grass"));
        assert_eq!(best_match("Dragon", &list, 0.6), None);
        assert_eq!(best_match("gras", &list, 0.95), None);
        assert_eq!(best_match("gras", &[], 0.0), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Two edits over five characters scores exactly 0.6
        assert_eq!(similarity("abcde", "abcyz"), 0.6);

        let list = refs(&["abcyz"]);
        assert_eq!(best_match("abcde", &list, 0.6), Some("abcyz"));
        assert_eq!(best_match("abcde", &list, 0.61), None);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("Fire", "fire"), 1.0);
        assert!(similarity("Poision", "poison") > 0.8);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_correct_spelling_rewrites_misspellings_only() {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO types (name) VALUES ('Grass'), ('gras'), ('Poision'), ('Cosmic');",
        )
        .unwrap();

        let list = refs(&["grass", "poison", "fire"]);
        let corrected = correct_spelling(&conn, EntityKind::Type, &list, 0.6).unwrap();

        assert_eq!(corrected, 2);
        assert_eq!(
            names(&conn, "types"),
            vec!["Grass", "grass", "poison", "Cosmic"]
        );
    }

    #[test]
    fn test_empty_reference_list_changes_nothing() {
        let conn = memory_db();
        conn.execute_batch("INSERT INTO pokemon (name) VALUES ('Pikuchu');")
            .unwrap();
        assert_eq!(
            correct_spelling(&conn, EntityKind::Pokemon, &[], 0.6).unwrap(),
            0
        );
        assert_eq!(names(&conn, "pokemon"), vec!["Pikuchu"]);
    }
}
