use rusqlite::Connection;

use crate::error::Result;
use crate::schema::EntityKind;

/// Names that stand in for "no value"
pub const PLACEHOLDER_NAMES: &[&str] = &["", "---", "???"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    pub removed: usize,
    /// References to removed rows that were nulled out or dropped
    pub detached: usize,
}

/// True for empty/placeholder names and names carrying a disqualifying marker.
/// Markers match case-sensitively.
pub fn is_garbage_name(name: &str, markers: &[String]) -> bool {
    let trimmed = name.trim();
    PLACEHOLDER_NAMES.iter().any(|p| *p == trimmed)
        || markers
            .iter()
            .any(|marker| !marker.is_empty() && name.contains(marker.as_str()))
}

/// Delete garbage rows of `kind`, detaching anything that still points at them first
pub fn remove_redundant(
    conn: &Connection,
    kind: EntityKind,
    markers: &[String],
) -> Result<FilterOutcome> {
    let garbage: Vec<(i64, String)> = {
        let mut stmt = conn.prepare_cached(kind.select_rows_sql())?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<Vec<(i64, String)>>>()?
            .into_iter()
            .filter(|(_, name)| is_garbage_name(name, markers))
            .collect()
    };

    let mut outcome = FilterOutcome::default();

    for (id, name) in &garbage {
        let mut detached = 0;
        for sql in kind.detach_sql() {
            detached += conn.prepare_cached(sql)?.execute([id])?;
        }
        if detached > 0 {
            tracing::warn!(
                kind = %kind,
                id,
                name = %name,
                detached,
                "garbage row was still referenced; references detached"
            );
        }

        outcome.removed += conn.prepare_cached(kind.delete_sql())?.execute([id])?;
        outcome.detached += detached;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::{memory_db, names};

    fn markers() -> Vec<String> {
        vec!["Remove this".to_string()]
    }

    #[test]
    fn test_garbage_detection() {
        let m = markers();
        assert!(is_garbage_name("", &m));
        assert!(is_garbage_name("   ", &m));
        assert!(is_garbage_name(" --- ", &m));
        assert!(is_garbage_name("???", &m));
        assert!(is_garbage_name("Remove this ability", &m));
        assert!(!is_garbage_name("remove this ability", &m));
        assert!(!is_garbage_name("Normal", &m));
        assert!(!is_garbage_name("Normal", &[String::new()]));
    }

    #[test]
    fn test_removes_only_garbage() {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO abilities (name) VALUES ('Overgrow'), (''), ('Remove this ability'), ('???');",
        )
        .unwrap();

        let outcome = remove_redundant(&conn, EntityKind::Ability, &markers()).unwrap();
        assert_eq!(outcome.removed, 3);
        assert_eq!(outcome.detached, 0);
        assert_eq!(names(&conn, "abilities"), vec!["Overgrow"]);
    }

    #[test]
    fn test_referenced_garbage_is_detached_first() {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO types (id, name) VALUES (1, 'Grass'), (2, '---');
             INSERT INTO pokemon (id, name, type1_id, type2_id) VALUES (1, 'Bulbasaur', 1, 2);",
        )
        .unwrap();

        let outcome = remove_redundant(&conn, EntityKind::Type, &markers()).unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.detached, 1);

        let type2: Option<i64> = conn
            .query_row("SELECT type2_id FROM pokemon WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(type2, None);
    }
}
