use rusqlite::{params, Connection};

use crate::error::Result;
use crate::schema::EntityKind;

/// Capitalize the first letter of every whitespace-delimited word and
/// lower-case the rest. Surrounding whitespace is dropped.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Rewrite every name of `kind` to title case; returns the number of rows changed
pub fn normalize_case(conn: &Connection, kind: EntityKind) -> Result<usize> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare_cached(kind.select_rows_sql())?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    let mut update = conn.prepare_cached(kind.rename_sql())?;
    let mut changed = 0;

    for (id, name) in rows {
        let titled = title_case(&name);
        if titled != name {
            changed += update.execute(params![titled, id])?;
        }
    }

    Ok(changed)
}
