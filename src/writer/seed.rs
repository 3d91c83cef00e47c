//! The canonical dirty dataset: duplicates, odd casing, misspellings and
//! placeholder rows, wired together the way the original loader did it.

use anyhow::{Context, Result};
use rusqlite::{params, Transaction};
use std::collections::HashMap;
use std::path::Path;

use super::sqlite::SqliteWriter;
use crate::schema::ALL_TABLES;

pub const DIRTY_TYPES: &[&str] = &[
    "Normal", "Grass", "Electric", "Ice", "Fighting", "Poison", "Ground", "Flying", "Psychic",
    "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel", "Fairy",
    // Duplicates and misspellings
    "???", "fire", "WATER", "---", "", "gras", "Poision", "Normal",
];

pub const DIRTY_ABILITIES: &[&str] = &[
    "Overgrow", "Blaze", "Chlorophyll", "Intimidate", "Keen Eye", "Run Away", "Guts",
    "Rock Head", "Sturdy", "Tangled Feet",
    // Duplicates and misspellings
    "static", "overgrow", "Torrent", "Remove this ability",
];

pub const DIRTY_TRAINERS: &[&str] = &[
    "Ash Ketchum", "Brock", "Gary Oak", "Professor Oak",
    // Duplicates and misspellings
    "Ash Ketchum", "misty",
];

/// (name, primary type, secondary type)
pub const DIRTY_POKEMON: &[(&str, &str, Option<&str>)] = &[
    ("Bulbasaur", "Grass", Some("Poison")),
    ("Ivysaur", "Grass", Some("Poison")),
    ("Venusaur", "Grass", Some("Poison")),
    ("Charmeleon", "Fire", None),
    ("Charizard", "Fire", Some("Flying")),
    ("Squirtle", "Water", None),
    ("Wartortle", "Water", None),
    ("Blastoise", "Water", None),
    ("Pikachu", "Electric", None),
    ("Raichu", "Electric", None),
    ("Geodude", "Rock", Some("Ground")),
    ("Graveler", "Rock", Some("Ground")),
    ("Golem", "Rock", Some("Ground")),
    ("Pidgey", "Normal", Some("Flying")),
    ("Pidgeotto", "Normal", Some("Flying")),
    ("Pidgeot", "Normal", Some("Flying")),
    // Duplicates and misspellings
    ("Pikachu", "Electric", None),
    ("Pikuchu", "Electric", None),
    ("Charmanderr", "Fire", None),
    ("Bulbasuar", "Grass", Some("Poison")),
    ("Geodude", "Rock", Some("Ground")),
    ("RATtata", "Normal", None),
];

/// (pokemon, trainer, ability)
pub const DIRTY_ASSIGNMENTS: &[(&str, &str, &str)] = &[
    ("Bulbasaur", "Ash Ketchum", "Overgrow"),
    ("Raichu", "Ash Ketchum", "Run Away"),
    ("Squirtle", "Ash Ketchum", "Torrent"),
    ("Pikachu", "Ash Ketchum", "Static"),
    ("Geodude", "Brock", "Rock Head"),
    ("Geodude", "Brock", "Sturdy"),
    ("Rattata", "Brock", "Guts"),
    ("Pidgey", "Gary Oak", "Keen Eye"),
    ("Pidgeotto", "Gary Oak", "Tangled Feet"),
    ("Rattata", "Misty", "Run Away"),
    ("Geodude", "Misty", "Sturdy"),
    ("Wartortle", "Misty", "Intimidate"),
    ("Pidgey", "Misty", "Intimidate"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub types: usize,
    pub abilities: usize,
    pub trainers: usize,
    pub pokemon: usize,
    pub assignments: usize,
}

/// Recreate `db_path` and fill it with the dirty dataset
pub fn seed_dirty_dataset(db_path: &Path) -> Result<SeedSummary> {
    let mut writer = SqliteWriter::create(db_path)?;
    writer.create_tables(ALL_TABLES)?;

    let conn = writer.connection_mut();
    let tx = conn.transaction()?;

    insert_names(&tx, "INSERT INTO types (name) VALUES (?1)", DIRTY_TYPES)?;
    let type_map = name_map(&tx, "SELECT id, name FROM types ORDER BY id")?;

    insert_names(&tx, "INSERT INTO abilities (name) VALUES (?1)", DIRTY_ABILITIES)?;
    let ability_map = name_map(&tx, "SELECT id, name FROM abilities ORDER BY id")?;

    insert_names(&tx, "INSERT INTO trainers (name) VALUES (?1)", DIRTY_TRAINERS)?;
    let trainer_map = name_map(&tx, "SELECT id, name FROM trainers ORDER BY id")?;

    {
        let mut stmt =
            tx.prepare("INSERT INTO pokemon (name, type1_id, type2_id) VALUES (?1, ?2, ?3)")?;
        for (name, primary, secondary) in DIRTY_POKEMON {
            let type1 = type_map.get(&primary.to_lowercase());
            let type2 = secondary.and_then(|t| type_map.get(&t.to_lowercase()));
            stmt.execute(params![name, type1, type2])
                .with_context(|| format!("Failed to insert pokemon: {}", name))?;
        }
    }
    let pokemon_map = name_map(&tx, "SELECT id, name FROM pokemon ORDER BY id")?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO trainer_pokemon_abilities (pokemon_id, trainer_id, ability_id) \
             VALUES (?1, ?2, ?3)",
        )?;
        for (pokemon, trainer, ability) in DIRTY_ASSIGNMENTS {
            let ids = (
                pokemon_map.get(&pokemon.to_lowercase()),
                trainer_map.get(&trainer.to_lowercase()),
                ability_map.get(&ability.to_lowercase()),
            );
            let (Some(p), Some(t), Some(a)) = ids else {
                anyhow::bail!(
                    "Unresolvable assignment: {} / {} / {}",
                    pokemon,
                    trainer,
                    ability
                );
            };
            stmt.execute(params![p, t, a])?;
        }
    }

    tx.commit()?;
    tracing::info!(path = ?db_path, "seeded dirty dataset");

    Ok(SeedSummary {
        types: DIRTY_TYPES.len(),
        abilities: DIRTY_ABILITIES.len(),
        trainers: DIRTY_TRAINERS.len(),
        pokemon: DIRTY_POKEMON.len(),
        assignments: DIRTY_ASSIGNMENTS.len(),
    })
}

fn insert_names(tx: &Transaction, sql: &str, names: &[&str]) -> Result<()> {
    let mut stmt = tx.prepare(sql)?;
    for name in names {
        stmt.execute([name])?;
    }
    Ok(())
}

/// Lower-cased name -> id, later rows overwriting earlier ones
fn name_map(tx: &Transaction, sql: &str) -> Result<HashMap<String, i64>> {
    let mut stmt = tx.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

    let mut map = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        map.insert(name.to_lowercase(), id);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::TempDir;

    #[test]
    fn test_seed_points_assignments_at_last_duplicate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dirty.db");
        let summary = seed_dirty_dataset(&path).unwrap();
        assert_eq!(summary.pokemon, 22);
        assert_eq!(summary.assignments, 13);

        let conn = Connection::open(&path).unwrap();
        // "Pikachu" resolves to the later of the two rows named Pikachu
        let pikachu_ref: i64 = conn
            .query_row(
                "SELECT a.pokemon_id FROM trainer_pokemon_abilities a \
                 JOIN abilities ab ON ab.id = a.ability_id WHERE ab.name = 'static'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(pikachu_ref, 17);

        let ash_refs: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM trainer_pokemon_abilities WHERE trainer_id = 5",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(ash_refs, 4);
    }
}
