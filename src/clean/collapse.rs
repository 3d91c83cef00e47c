use rusqlite::{params, Connection};
use std::collections::HashMap;

use crate::error::Result;
use crate::schema::EntityKind;

/// Rows sharing a case-insensitive name; the lowest id survives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub survivor: i64,
    pub duplicates: Vec<i64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Duplicate rows deleted
    pub deleted: usize,
    /// Foreign-key values re-pointed at survivors
    pub remapped: usize,
}

/// Group rows by trimmed, lower-cased name. Only groups with duplicates are
/// returned, ordered by survivor id.
pub fn duplicate_groups(rows: &[(i64, String)]) -> Vec<DuplicateGroup> {
    let mut sorted: Vec<&(i64, String)> = rows.iter().collect();
    sorted.sort_by_key(|(id, _)| *id);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (id, name) in sorted {
        let key = name.trim().to_lowercase();
        match index.get(&key) {
            Some(&i) => groups[i].duplicates.push(*id),
            None => {
                index.insert(key, groups.len());
                groups.push(DuplicateGroup {
                    survivor: *id,
                    duplicates: Vec::new(),
                });
            }
        }
    }

    groups.retain(|g| !g.duplicates.is_empty());
    groups
}

/// Collapse duplicate rows of `kind` into their survivors.
///
/// Every reference to a duplicate is re-pointed at the survivor before the
/// duplicate is deleted.
pub fn collapse_duplicates(conn: &Connection, kind: EntityKind) -> Result<CollapseOutcome> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare_cached(kind.select_rows_sql())?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut outcome = CollapseOutcome::default();

    for group in duplicate_groups(&rows) {
        for duplicate in &group.duplicates {
            for sql in kind.remap_sql() {
                outcome.remapped += conn
                    .prepare_cached(sql)?
                    .execute(params![group.survivor, duplicate])?;
            }
        }

        for duplicate in &group.duplicates {
            outcome.deleted += conn.prepare_cached(kind.delete_sql())?.execute([duplicate])?;
        }

        tracing::debug!(
            kind = %kind,
            survivor = group.survivor,
            duplicates = ?group.duplicates,
            "collapsed duplicate group"
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::{memory_db, names};

    #[test]
    fn test_duplicate_groups_pick_lowest_id() {
        let rows = vec![
            (7, "Normal".to_string()),
            (2, "normal".to_string()),
            (3, "Fire".to_string()),
            (9, " NORMAL ".to_string()),
        ];
        assert_eq!(
            duplicate_groups(&rows),
            vec![DuplicateGroup {
                survivor: 2,
                duplicates: vec![7, 9],
            }]
        );
    }

    #[test]
    fn test_secondary_type_reference_follows_survivor() {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO types (id, name) VALUES (1, 'Normal'), (2, 'Flying'), (3, 'flying');
             INSERT INTO pokemon (id, name, type1_id, type2_id) VALUES (1, 'Pidgey', 1, 3);",
        )
        .unwrap();

        let outcome = collapse_duplicates(&conn, EntityKind::Type).unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.remapped, 1);

        let type2: i64 = conn
            .query_row("SELECT type2_id FROM pokemon WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(type2, 2);
        assert_eq!(names(&conn, "types"), vec!["Normal", "Flying"]);
    }

    #[test]
    fn test_assignments_follow_surviving_trainer() {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO trainers (id, name) VALUES (1, 'Ash Ketchum'), (2, 'Brock'), (5, 'Ash Ketchum');
             INSERT INTO abilities (id, name) VALUES (1, 'Static');
             INSERT INTO pokemon (id, name) VALUES (1, 'Pikachu');
             INSERT INTO trainer_pokemon_abilities (pokemon_id, trainer_id, ability_id)
                 VALUES (1, 5, 1), (1, 2, 1);",
        )
        .unwrap();

        let outcome = collapse_duplicates(&conn, EntityKind::Trainer).unwrap();
        assert_eq!(outcome, CollapseOutcome { deleted: 1, remapped: 1 });

        let trainer_ids: Vec<i64> = conn
            .prepare("SELECT trainer_id FROM trainer_pokemon_abilities ORDER BY id")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(trainer_ids, vec![1, 2]);
    }

    #[test]
    fn test_no_duplicates_is_a_no_op() {
        let conn = memory_db();
        conn.execute_batch("INSERT INTO abilities (name) VALUES ('Blaze'), ('Torrent');")
            .unwrap();
        assert_eq!(
            collapse_duplicates(&conn, EntityKind::Ability).unwrap(),
            CollapseOutcome::default()
        );
    }
}
