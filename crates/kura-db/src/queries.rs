mod admins;
mod chat;
mod content;
mod fixtures;
mod logs;

use kura_types::models::Role;
use rusqlite::Row;
use rusqlite::types::Type;

/// Read a role column, surfacing unknown values as a conversion error.
fn role_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Role> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
