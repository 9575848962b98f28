use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::models::{AboutRow, AnnouncementRow, PhotoRow};

impl Database {
    // -- Announcements --

    pub fn insert_announcement(&self, text: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO announcements (text) VALUES (?1)", [text])?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first.
    pub fn list_announcements(&self) -> Result<Vec<AnnouncementRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, text FROM announcements ORDER BY id DESC")?;
            let rows = stmt
                .query_map([], |row| Ok(AnnouncementRow { id: row.get(0)?, text: row.get(1)? }))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_announcement(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM announcements WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn delete_all_announcements(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM announcements", [])?))
    }

    // -- Photos --

    /// Inserts one row per url in a single transaction, in input order.
    pub fn insert_photos(&self, urls: &[String]) -> Result<Vec<PhotoRow>> {
        self.with_tx(|tx| {
            let mut rows = Vec::with_capacity(urls.len());
            for url in urls {
                tx.execute("INSERT INTO photos (url) VALUES (?1)", [url])?;
                rows.push(PhotoRow { id: tx.last_insert_rowid(), url: url.clone() });
            }
            Ok(rows)
        })
    }

    pub fn count_photos(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM photos", [], |r| r.get(0))?))
    }

    /// Rows still pointing at `url`. Uploaded files are only unlinked once
    /// this reaches zero.
    pub fn count_photos_with_url(&self, url: &str) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM photos WHERE url = ?1", [url], |r| r.get(0))?)
        })
    }

    /// One page of photos, newest first.
    pub fn list_photos_page(&self, limit: i64, offset: i64) -> Result<Vec<PhotoRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, url FROM photos ORDER BY id DESC LIMIT ?1 OFFSET ?2")?;
            let rows = stmt
                .query_map(params![limit, offset], |row| {
                    Ok(PhotoRow { id: row.get(0)?, url: row.get(1)? })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns the removed row so the caller can clean up its file.
    pub fn delete_photo(&self, id: i64) -> Result<Option<PhotoRow>> {
        self.with_tx(|tx| {
            let row = tx
                .query_row("SELECT id, url FROM photos WHERE id = ?1", [id], |row| {
                    Ok(PhotoRow { id: row.get(0)?, url: row.get(1)? })
                })
                .optional()?;
            if row.is_some() {
                tx.execute("DELETE FROM photos WHERE id = ?1", [id])?;
            }
            Ok(row)
        })
    }

    /// Removes every photo row and returns them.
    pub fn delete_all_photos(&self) -> Result<Vec<PhotoRow>> {
        self.with_tx(|tx| {
            let rows = {
                let mut stmt = tx.prepare("SELECT id, url FROM photos ORDER BY id")?;
                let rows = stmt
                    .query_map([], |row| Ok(PhotoRow { id: row.get(0)?, url: row.get(1)? }))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            };
            tx.execute("DELETE FROM photos", [])?;
            Ok(rows)
        })
    }

    // -- About box --

    /// The first row is "the" about box.
    pub fn get_about(&self) -> Result<Option<AboutRow>> {
        self.with_conn(query_about)
    }

    /// Updates the first row, or creates it when the table is empty.
    pub fn upsert_about(&self, title: Option<&str>, content: Option<&str>) -> Result<AboutRow> {
        self.with_tx(|tx| {
            let id = match query_about(tx)? {
                Some(existing) => {
                    tx.execute(
                        "UPDATE about_box SET title = ?1, content = ?2 WHERE id = ?3",
                        params![title, content, existing.id],
                    )?;
                    existing.id
                }
                None => {
                    tx.execute(
                        "INSERT INTO about_box (title, content) VALUES (?1, ?2)",
                        params![title, content],
                    )?;
                    tx.last_insert_rowid()
                }
            };
            Ok(AboutRow {
                id,
                title: title.map(str::to_string),
                content: content.map(str::to_string),
            })
        })
    }
}

fn query_about(conn: &Connection) -> Result<Option<AboutRow>> {
    let row = conn
        .query_row("SELECT id, title, content FROM about_box ORDER BY id LIMIT 1", [], |row| {
            Ok(AboutRow {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
            })
        })
        .optional()?;
    Ok(row)
}
