use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::Serialize;

use super::normalize_name;
use crate::clean::title_case;
use crate::download::SpeciesSource;
use crate::error::{Error, Result};
use crate::parser::SpeciesAbility;
use crate::schema::EntityKind;

/// What a successful registration wrote
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub pokemon: String,
    pub trainer: String,
    pub types: Vec<String>,
    pub abilities: Vec<SpeciesAbility>,
    pub trainer_created: bool,
}

/// Register a new pokemon for a trainer, one assignment per ability.
///
/// Types, abilities and the trainer are created when missing. Every insert
/// happens in a single transaction. The duplicate check runs once before the
/// species lookup and again inside the transaction, which takes the write lock
/// up front so a concurrent registration of the same name waits and then
/// fails with `Conflict`.
pub fn register_pokemon<S: SpeciesSource + ?Sized>(
    conn: &mut Connection,
    species: &S,
    pokemon: &str,
    trainer: &str,
) -> Result<Registration> {
    let pokemon = normalize_name(pokemon)?;
    let trainer = normalize_name(trainer)?;

    if find_id(conn, EntityKind::Pokemon, &pokemon)?.is_some() {
        return Err(Error::Conflict(format!("pokemon '{}' already exists", pokemon)));
    }

    let data = species.fetch_species(&pokemon)?;
    let types: Vec<String> = data.types.iter().take(2).map(|t| title_case(t)).collect();
    let abilities: Vec<SpeciesAbility> = data
        .abilities
        .iter()
        .map(|a| SpeciesAbility {
            name: title_case(&a.name),
            is_hidden: a.is_hidden,
        })
        .collect();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if find_id(&tx, EntityKind::Pokemon, &pokemon)?.is_some() {
        return Err(Error::Conflict(format!("pokemon '{}' already exists", pokemon)));
    }

    let mut type_ids = Vec::with_capacity(types.len());
    for name in &types {
        type_ids.push(find_or_insert(&tx, EntityKind::Type, name)?.0);
    }

    let mut ability_ids = Vec::with_capacity(abilities.len());
    for ability in &abilities {
        let (id, _) = find_or_insert(&tx, EntityKind::Ability, &ability.name)?;
        if !ability_ids.contains(&id) {
            ability_ids.push(id);
        }
    }

    tx.execute(
        "INSERT INTO pokemon (name, type1_id, type2_id) VALUES (?1, ?2, ?3)",
        params![pokemon, type_ids.first(), type_ids.get(1)],
    )?;
    let pokemon_id = tx.last_insert_rowid();

    let (trainer_id, trainer_created) = find_or_insert(&tx, EntityKind::Trainer, &trainer)?;

    {
        let mut insert = tx.prepare_cached(
            "INSERT INTO trainer_pokemon_abilities (pokemon_id, trainer_id, ability_id) \
             VALUES (?1, ?2, ?3)",
        )?;
        for ability_id in &ability_ids {
            insert.execute(params![pokemon_id, trainer_id, ability_id])?;
        }
    }

    tx.commit()?;
    tracing::info!(
        pokemon = %pokemon,
        trainer = %trainer,
        abilities = ability_ids.len(),
        trainer_created,
        "registered pokemon"
    );

    Ok(Registration {
        pokemon,
        trainer,
        types,
        abilities,
        trainer_created,
    })
}

fn find_id(conn: &Connection, kind: EntityKind, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .prepare_cached(kind.find_id_sql())?
        .query_row([name], |row| row.get(0))
        .optional()?)
}

/// Existing id for `name`, or the id of a freshly inserted row (flagged `true`)
fn find_or_insert(tx: &Transaction, kind: EntityKind, name: &str) -> Result<(i64, bool)> {
    if let Some(id) = find_id(tx, kind, name)? {
        return Ok((id, false));
    }

    let sql = kind
        .insert_name_sql()
        .ok_or_else(|| Error::Validation(format!("{} rows cannot be inserted by name", kind)))?;
    tx.execute(sql, [name])?;
    Ok((tx.last_insert_rowid(), true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::test_support::{memory_db, names};
    use crate::parser::SpeciesData;
    use crate::schema::ALL_TABLES;
    use crate::writer::{open_read_write, SqliteWriter};
    use std::sync::Barrier;
    use tempfile::TempDir;

    struct FakeSpecies;

    impl SpeciesSource for FakeSpecies {
        fn fetch_species(&self, name: &str) -> Result<SpeciesData> {
            match name.to_lowercase().as_str() {
                "charmander" => Ok(SpeciesData {
                    name: "charmander".into(),
                    types: vec!["fire".into()],
                    abilities: vec![
                        SpeciesAbility {
                            name: "blaze".into(),
                            is_hidden: false,
                        },
                        SpeciesAbility {
                            name: "solar power".into(),
                            is_hidden: true,
                        },
                    ],
                }),
                "mr mime" => Ok(SpeciesData {
                    name: "mr mime".into(),
                    types: vec!["psychic".into(), "fairy".into()],
                    abilities: vec![SpeciesAbility {
                        name: "soundproof".into(),
                        is_hidden: false,
                    }],
                }),
                "offline" => Err(Error::Connectivity("connection refused".into())),
                other => Err(Error::NotFound(other.to_string())),
            }
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_register_reuses_existing_rows() {
        let mut conn = memory_db();
        conn.execute_batch(
            "INSERT INTO types (name) VALUES ('Fire');
             INSERT INTO abilities (name) VALUES ('Blaze');
             INSERT INTO trainers (name) VALUES ('Ash Ketchum');",
        )
        .unwrap();

        let reg = register_pokemon(&mut conn, &FakeSpecies, "charmander", "ash-ketchum").unwrap();

        assert_eq!(reg.pokemon, "Charmander");
        assert_eq!(reg.types, vec!["Fire"]);
        assert!(!reg.trainer_created);
        assert!(reg.abilities[1].is_hidden);
        assert_eq!(names(&conn, "types"), vec!["Fire"]);
        assert_eq!(names(&conn, "abilities"), vec!["Blaze", "Solar Power"]);
        assert_eq!(names(&conn, "trainers"), vec!["Ash Ketchum"]);
        assert_eq!(count(&conn, "trainer_pokemon_abilities"), 2);
    }

    #[test]
    fn test_register_creates_trainer_and_both_types() {
        let mut conn = memory_db();
        let reg = register_pokemon(&mut conn, &FakeSpecies, "mr-mime", "sabrina").unwrap();

        assert!(reg.trainer_created);
        let (type1, type2): (String, String) = conn
            .query_row(
                "SELECT t1.name, t2.name FROM pokemon p
                 JOIN types t1 ON t1.id = p.type1_id
                 JOIN types t2 ON t2.id = p.type2_id
                 WHERE p.name = 'Mr Mime'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((type1.as_str(), type2.as_str()), ("Psychic", "Fairy"));
    }

    #[test]
    fn test_existing_pokemon_conflicts_without_writes() {
        let mut conn = memory_db();
        conn.execute_batch("INSERT INTO pokemon (name) VALUES ('Charmander');")
            .unwrap();

        let err = register_pokemon(&mut conn, &FakeSpecies, "CHARMANDER", "brock").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(count(&conn, "pokemon"), 1);
        assert_eq!(count(&conn, "trainers"), 0);
        assert_eq!(count(&conn, "types"), 0);
        assert_eq!(count(&conn, "abilities"), 0);
        assert_eq!(count(&conn, "trainer_pokemon_abilities"), 0);
    }

    #[test]
    fn test_provider_failures_leave_no_rows() {
        let mut conn = memory_db();
        assert!(matches!(
            register_pokemon(&mut conn, &FakeSpecies, "missingno", "brock"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            register_pokemon(&mut conn, &FakeSpecies, "offline", "brock"),
            Err(Error::Connectivity(_))
        ));
        assert!(matches!(
            register_pokemon(&mut conn, &FakeSpecies, "pika chu", "brock"),
            Err(Error::Validation(_))
        ));
        assert_eq!(count(&conn, "trainers"), 0);
        assert_eq!(count(&conn, "pokemon"), 0);
    }

    /// Holds every caller until all of them have passed the first duplicate check
    struct Lockstep(Barrier);

    impl SpeciesSource for Lockstep {
        fn fetch_species(&self, name: &str) -> Result<SpeciesData> {
            self.0.wait();
            FakeSpecies.fetch_species(name)
        }
    }

    #[test]
    fn test_concurrent_registration_conflicts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pokedex.db");
        SqliteWriter::create(&path)
            .unwrap()
            .create_tables(ALL_TABLES)
            .unwrap();

        let species = Lockstep(Barrier::new(2));
        let results: Vec<Result<Registration>> = std::thread::scope(|s| {
            let handles: Vec<_> = ["ash-ketchum", "brock"]
                .into_iter()
                .map(|trainer| {
                    let (path, species) = (&path, &species);
                    s.spawn(move || {
                        let mut conn = open_read_write(path).unwrap();
                        register_pokemon(&mut conn, species, "charmander", trainer)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(Error::Conflict(_)))));

        let conn = open_read_write(&path).unwrap();
        assert_eq!(count(&conn, "pokemon"), 1);
        assert_eq!(count(&conn, "trainers"), 1);
        assert_eq!(count(&conn, "trainer_pokemon_abilities"), 2);
    }
}
