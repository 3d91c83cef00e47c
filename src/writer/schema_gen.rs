use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        if col.name == "id" {
            columns.push(format!(
                "    {} {} PRIMARY KEY AUTOINCREMENT",
                col.name,
                col.col_type.sql()
            ));
            continue;
        }

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let collation = if col.nocase { " COLLATE NOCASE" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql(),
            null_constraint,
            collation
        ));
    }

    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{POKEMON, TRAINERS};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&POKEMON);
        assert!(sql.contains("CREATE TABLE pokemon"));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("name TEXT NOT NULL COLLATE NOCASE"));
        assert!(sql.contains("    type2_id INTEGER,"));
        assert!(sql.contains("FOREIGN KEY (type1_id) REFERENCES types(id)"));
    }

    #[test]
    fn test_trainer_names_are_case_insensitive() {
        assert!(generate_create_table(&TRAINERS).contains("COLLATE NOCASE"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&POKEMON);
        assert_eq!(indexes.len(), 2);
        assert!(indexes.iter().any(|i| i.contains("idx_pokemon_type2_id")));
        assert!(generate_indexes(&TRAINERS).is_empty());
    }
}
