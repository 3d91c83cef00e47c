//! Table schema definitions for the Pokemon dataset

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static TYPES: TableSchema = TableSchema {
    name: "types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).nocase(),
    ],
    foreign_keys: &[],
};

pub static ABILITIES: TableSchema = TableSchema {
    name: "abilities",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).nocase(),
    ],
    foreign_keys: &[],
};

pub static TRAINERS: TableSchema = TableSchema {
    name: "trainers",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).nocase(),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Dependent Tables
// =============================================================================

pub static POKEMON: TableSchema = TableSchema {
    name: "pokemon",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).nocase(),
        Column::new("type1_id", ColumnType::Integer),
        Column::new("type2_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("type1_id", "types"),
        ForeignKey::new("type2_id", "types"),
    ],
};

pub static TRAINER_POKEMON_ABILITIES: TableSchema = TableSchema {
    name: "trainer_pokemon_abilities",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("trainer_id", ColumnType::Integer),
        Column::required("ability_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("pokemon_id", "pokemon"),
        ForeignKey::new("trainer_id", "trainers"),
        ForeignKey::new("ability_id", "abilities"),
    ],
};

/// All tables, parents listed before the tables that reference them
pub static ALL_TABLES: &[&TableSchema] = &[
    &TYPES,
    &ABILITIES,
    &POKEMON,
    &TRAINERS,
    &TRAINER_POKEMON_ABILITIES,
];

/// Look up a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().copied().find(|t| t.name == name)
}
