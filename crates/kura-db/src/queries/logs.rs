use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::Database;
use crate::models::LoginAttemptRow;

impl Database {
    pub fn insert_login_attempt(
        &self,
        username: &str,
        success: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO login_attempts (username, success, timestamp) VALUES (?1, ?2, ?3)",
                params![username, success, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first.
    pub fn list_login_attempts(&self) -> Result<Vec<LoginAttemptRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, success, timestamp FROM login_attempts
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(LoginAttemptRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        success: row.get(2)?,
                        timestamp: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_login_attempt(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM login_attempts WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn delete_all_login_attempts(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM login_attempts", [])?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn attempts_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();
        db.insert_login_attempt("marxe", true, t0).unwrap();
        db.insert_login_attempt("ghost", false, t0 + Duration::seconds(5)).unwrap();

        let rows = db.list_login_attempts().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].username, "ghost");
        assert!(!rows[0].success);
        assert_eq!(rows[1].username, "marxe");
        assert!(rows[1].success);
    }

    #[test]
    fn delete_one_and_all() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_login_attempt("a", true, Utc::now()).unwrap();
        db.insert_login_attempt("b", false, Utc::now()).unwrap();

        assert!(db.delete_login_attempt(id).unwrap());
        assert!(!db.delete_login_attempt(id).unwrap());
        assert_eq!(db.delete_all_login_attempts().unwrap(), 1);
        assert!(db.list_login_attempts().unwrap().is_empty());
    }
}
