use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

use crate::Database;
use crate::models::{ChatRow, NewChatMessage};

const CHAT_COLUMNS: &str = "id, admin_id, username, role, message, timestamp";

impl Database {
    pub fn insert_chat_message(&self, msg: &NewChatMessage<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO admin_chat (admin_id, username, role, message, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![msg.admin_id, msg.username, msg.role_label, msg.message, msg.timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Oldest first, the order the console renders the log in.
    pub fn list_chat_messages(&self) -> Result<Vec<ChatRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {CHAT_COLUMNS} FROM admin_chat ORDER BY timestamp ASC, id ASC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_chat)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_chat_message(&self, id: i64) -> Result<Option<ChatRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {CHAT_COLUMNS} FROM admin_chat WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], map_chat).optional()?)
        })
    }

    pub fn delete_chat_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM admin_chat WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn delete_all_chat_messages(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM admin_chat", [])?))
    }
}

fn map_chat(row: &Row<'_>) -> rusqlite::Result<ChatRow> {
    Ok(ChatRow {
        id: row.get(0)?,
        admin_id: row.get(1)?,
        username: row.get(2)?,
        role: row.get(3)?,
        message: row.get(4)?,
        timestamp: row.get(5)?,
    })
}
