//! The four cleanable entity kinds and the fixed SQL each one is allowed to run.
//!
//! Table names never come from user input: every statement below is a literal
//! chosen by matching on [`EntityKind`].

use std::fmt;
use std::str::FromStr;

use super::dependencies::DependencyResolver;
use super::tables::{ABILITIES, POKEMON, TRAINERS, TYPES};
use super::types::TableSchema;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Type,
    Ability,
    Pokemon,
    Trainer,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Type,
        EntityKind::Ability,
        EntityKind::Pokemon,
        EntityKind::Trainer,
    ];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            EntityKind::Type => &TYPES,
            EntityKind::Ability => &ABILITIES,
            EntityKind::Pokemon => &POKEMON,
            EntityKind::Trainer => &TRAINERS,
        }
    }

    pub fn table(self) -> &'static str {
        self.schema().name
    }

    pub fn from_table(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.table() == name)
    }

    /// Kinds in the order the cleaner must visit them: every kind comes
    /// before the kinds whose rows reference it.
    pub fn cleaning_order() -> Result<Vec<EntityKind>> {
        let tables = DependencyResolver::new().all_tables_ordered()?;
        Ok(tables
            .iter()
            .filter_map(|t| EntityKind::from_table(t.name))
            .collect())
    }

    pub(crate) fn select_rows_sql(self) -> &'static str {
        match self {
            EntityKind::Type => "SELECT id, name FROM types ORDER BY id",
            EntityKind::Ability => "SELECT id, name FROM abilities ORDER BY id",
            EntityKind::Pokemon => "SELECT id, name FROM pokemon ORDER BY id",
            EntityKind::Trainer => "SELECT id, name FROM trainers ORDER BY id",
        }
    }

    pub(crate) fn rename_sql(self) -> &'static str {
        match self {
            EntityKind::Type => "UPDATE types SET name = ?1 WHERE id = ?2",
            EntityKind::Ability => "UPDATE abilities SET name = ?1 WHERE id = ?2",
            EntityKind::Pokemon => "UPDATE pokemon SET name = ?1 WHERE id = ?2",
            EntityKind::Trainer => "UPDATE trainers SET name = ?1 WHERE id = ?2",
        }
    }

    pub(crate) fn delete_sql(self) -> &'static str {
        match self {
            EntityKind::Type => "DELETE FROM types WHERE id = ?1",
            EntityKind::Ability => "DELETE FROM abilities WHERE id = ?1",
            EntityKind::Pokemon => "DELETE FROM pokemon WHERE id = ?1",
            EntityKind::Trainer => "DELETE FROM trainers WHERE id = ?1",
        }
    }

    /// Statements re-pointing references from a duplicate (`?2`) to its survivor (`?1`)
    pub(crate) fn remap_sql(self) -> &'static [&'static str] {
        match self {
            EntityKind::Type => &[
                "UPDATE pokemon SET type1_id = ?1 WHERE type1_id = ?2",
                "UPDATE pokemon SET type2_id = ?1 WHERE type2_id = ?2",
            ],
            EntityKind::Ability => {
                &["UPDATE trainer_pokemon_abilities SET ability_id = ?1 WHERE ability_id = ?2"]
            }
            EntityKind::Pokemon => {
                &["UPDATE trainer_pokemon_abilities SET pokemon_id = ?1 WHERE pokemon_id = ?2"]
            }
            EntityKind::Trainer => {
                &["UPDATE trainer_pokemon_abilities SET trainer_id = ?1 WHERE trainer_id = ?2"]
            }
        }
    }

    /// Statements detaching every reference to the row `?1` ahead of its deletion.
    /// Nullable references are set to NULL, assignment rows are dropped.
    pub(crate) fn detach_sql(self) -> &'static [&'static str] {
        match self {
            EntityKind::Type => &[
                "UPDATE pokemon SET type1_id = NULL WHERE type1_id = ?1",
                "UPDATE pokemon SET type2_id = NULL WHERE type2_id = ?1",
            ],
            EntityKind::Ability => {
                &["DELETE FROM trainer_pokemon_abilities WHERE ability_id = ?1"]
            }
            EntityKind::Pokemon => {
                &["DELETE FROM trainer_pokemon_abilities WHERE pokemon_id = ?1"]
            }
            EntityKind::Trainer => {
                &["DELETE FROM trainer_pokemon_abilities WHERE trainer_id = ?1"]
            }
        }
    }

    /// Insert a row by name. Pokemon rows also carry types and are inserted by the
    /// registration code directly.
    pub(crate) fn insert_name_sql(self) -> Option<&'static str> {
        match self {
            EntityKind::Type => Some("INSERT INTO types (name) VALUES (?1)"),
            EntityKind::Ability => Some("INSERT INTO abilities (name) VALUES (?1)"),
            EntityKind::Trainer => Some("INSERT INTO trainers (name) VALUES (?1)"),
            EntityKind::Pokemon => None,
        }
    }

    /// Lowest id whose name matches `?1` case-insensitively
    pub(crate) fn find_id_sql(self) -> &'static str {
        match self {
            EntityKind::Type => {
                "SELECT id FROM types WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
            }
            EntityKind::Ability => {
                "SELECT id FROM abilities WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
            }
            EntityKind::Pokemon => {
                "SELECT id FROM pokemon WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
            }
            EntityKind::Trainer => {
                "SELECT id FROM trainers WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
            }
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type" | "types" => Ok(EntityKind::Type),
            "ability" | "abilities" => Ok(EntityKind::Ability),
            "pokemon" => Ok(EntityKind::Pokemon),
            "trainer" | "trainers" => Ok(EntityKind::Trainer),
            other => Err(Error::Validation(format!("Unknown entity kind: {}", other))),
        }
    }
}
