use rusqlite::Connection;

use crate::error::{Error, Result};

const POKEMON_BY_ABILITY: &str = "\
    SELECT DISTINCT p.name FROM pokemon p
    JOIN trainer_pokemon_abilities tpa ON tpa.pokemon_id = p.id
    JOIN abilities a ON a.id = tpa.ability_id
    WHERE a.name = ?1 COLLATE NOCASE
    ORDER BY p.name";

const POKEMON_BY_TYPE: &str = "\
    SELECT DISTINCT p.name FROM pokemon p
    JOIN types t ON t.id = p.type1_id OR t.id = p.type2_id
    WHERE t.name = ?1 COLLATE NOCASE
    ORDER BY p.name";

const TRAINERS_BY_POKEMON: &str = "\
    SELECT DISTINCT t.name FROM trainers t
    JOIN trainer_pokemon_abilities tpa ON tpa.trainer_id = t.id
    JOIN pokemon p ON p.id = tpa.pokemon_id
    WHERE p.name = ?1 COLLATE NOCASE
    ORDER BY t.name";

const ABILITIES_BY_POKEMON: &str = "\
    SELECT DISTINCT a.name FROM abilities a
    JOIN trainer_pokemon_abilities tpa ON tpa.ability_id = a.id
    JOIN pokemon p ON p.id = tpa.pokemon_id
    WHERE p.name = ?1 COLLATE NOCASE
    ORDER BY a.name";

/// Names of pokemon linked to `ability`
pub fn pokemon_by_ability(conn: &Connection, ability: &str) -> Result<Vec<String>> {
    names_or_not_found(conn, POKEMON_BY_ABILITY, ability, || {
        format!("no pokemon found with ability '{}'", ability)
    })
}

/// Names of pokemon whose primary or secondary type is `type_name`
pub fn pokemon_by_type(conn: &Connection, type_name: &str) -> Result<Vec<String>> {
    names_or_not_found(conn, POKEMON_BY_TYPE, type_name, || {
        format!("no pokemon found with type '{}'", type_name)
    })
}

/// Names of trainers holding `pokemon`
pub fn trainers_by_pokemon(conn: &Connection, pokemon: &str) -> Result<Vec<String>> {
    names_or_not_found(conn, TRAINERS_BY_POKEMON, pokemon, || {
        format!("no trainers found for pokemon '{}'", pokemon)
    })
}

/// Names of abilities linked to `pokemon`
pub fn abilities_by_pokemon(conn: &Connection, pokemon: &str) -> Result<Vec<String>> {
    names_or_not_found(conn, ABILITIES_BY_POKEMON, pokemon, || {
        format!("no abilities found for pokemon '{}'", pokemon)
    })
}

fn names_or_not_found(
    conn: &Connection,
    sql: &str,
    name: &str,
    not_found: impl FnOnce() -> String,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let names = stmt
        .query_map([name], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    if names.is_empty() {
        return Err(Error::NotFound(not_found()));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::memory_db;

    fn dex() -> Connection {
        let conn = memory_db();
        conn.execute_batch(
            "INSERT INTO types (id, name) VALUES (1, 'Rock'), (2, 'Ground'), (3, 'Flying');
             INSERT INTO abilities (id, name) VALUES (1, 'Sturdy'), (2, 'Rock Head'), (3, 'Blaze');
             INSERT INTO trainers (id, name) VALUES (1, 'Brock'), (2, 'Misty');
             INSERT INTO pokemon (id, name, type1_id, type2_id) VALUES
                 (1, 'Geodude', 1, 2), (2, 'Onix', 1, 2), (3, 'Pidgey', 3, NULL);
             INSERT INTO trainer_pokemon_abilities (pokemon_id, trainer_id, ability_id) VALUES
                 (1, 1, 2), (1, 1, 1), (1, 2, 1), (2, 1, 1);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_pokemon_by_ability_is_distinct_and_sorted() {
        let conn = dex();
        assert_eq!(
            pokemon_by_ability(&conn, "sturdy").unwrap(),
            vec!["Geodude", "Onix"]
        );
    }

    #[test]
    fn test_pokemon_by_type_checks_both_slots() {
        let conn = dex();
        assert_eq!(
            pokemon_by_type(&conn, "Ground").unwrap(),
            vec!["Geodude", "Onix"]
        );
        assert_eq!(pokemon_by_type(&conn, "FLYING").unwrap(), vec!["Pidgey"]);
    }

    #[test]
    fn test_trainers_and_abilities_by_pokemon() {
        let conn = dex();
        assert_eq!(
            trainers_by_pokemon(&conn, "Geodude").unwrap(),
            vec!["Brock", "Misty"]
        );
        assert_eq!(
            abilities_by_pokemon(&conn, "geodude").unwrap(),
            vec!["Rock Head", "Sturdy"]
        );
    }

    #[test]
    fn test_existing_but_unlinked_ability_is_not_found() {
        let conn = dex();
        assert!(matches!(
            pokemon_by_ability(&conn, "Blaze"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            trainers_by_pokemon(&conn, "Pidgey"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            pokemon_by_type(&conn, "Fairy"),
            Err(Error::NotFound(_))
        ));
    }
}
