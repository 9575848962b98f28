use anyhow::Result;
use kura_types::models::Role;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use super::role_column;
use crate::Database;
use crate::models::{AdminRow, BootstrapReport, ContactUpdate, NewAdmin};

const ADMIN_COLUMNS: &str = "id, username, password_hash, role, name, email, phone";

impl Database {
    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin_by_username(conn, username))
    }

    pub fn get_admin_by_id(&self, id: i64) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin_by_id(conn, id))
    }

    /// All accounts in id order; the founder row is left out unless asked for.
    pub fn list_admins(&self, include_founder: bool) -> Result<Vec<AdminRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ADMIN_COLUMNS} FROM admins WHERE (?1 OR role != 'founder') ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([include_founder], map_admin)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_admin(&self, admin: &NewAdmin) -> Result<i64> {
        self.with_conn(|conn| insert_admin(conn, admin))
    }

    /// Deletes a non-founder account. Returns false when nothing was removed.
    pub fn delete_admin(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM admins WHERE id = ?1 AND role != 'founder'", [id])?;
            Ok(n > 0)
        })
    }

    /// Overwrites the contact fields and, when given, the password hash.
    pub fn update_admin_contact(
        &self,
        id: i64,
        contact: &ContactUpdate,
        password_hash: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE admins
                 SET name = ?1, email = ?2, phone = ?3,
                     password_hash = COALESCE(?4, password_hash)
                 WHERE id = ?5",
                params![contact.name, contact.email, contact.phone, password_hash, id],
            )?;
            Ok(n > 0)
        })
    }

    /// Sets an account's role. Promoting to founder demotes every other
    /// founder to super-admin in the same transaction.
    pub fn set_role(&self, id: i64, role: Role) -> Result<bool> {
        self.with_tx(|tx| {
            if query_admin_by_id(tx, id)?.is_none() {
                return Ok(false);
            }

            if role == Role::Founder {
                let demoted = tx.execute(
                    "UPDATE admins SET role = ?1 WHERE role = ?2 AND id != ?3",
                    params![Role::SuperAdmin.as_str(), Role::Founder.as_str(), id],
                )?;
                if demoted > 0 {
                    info!("Demoted {} previous founder(s) to super-admin", demoted);
                }
            }

            tx.execute("UPDATE admins SET role = ?1 WHERE id = ?2", params![role.as_str(), id])?;
            Ok(true)
        })
    }

    pub fn count_founders(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM admins WHERE role = ?1",
                [Role::Founder.as_str()],
                |r| r.get(0),
            )?;
            Ok(n)
        })
    }

    /// Creates the account unless its username is already taken.
    pub fn ensure_admin(&self, admin: &NewAdmin) -> Result<bool> {
        self.with_tx(|tx| {
            if query_admin_by_username(tx, &admin.username)?.is_some() {
                return Ok(false);
            }
            insert_admin(tx, admin)?;
            Ok(true)
        })
    }

    /// Idempotent startup provisioning: a founder when none exists, and the
    /// bootstrap super-admin when its username is free.
    pub fn ensure_bootstrap_accounts(
        &self,
        founder: &NewAdmin,
        super_admin: &NewAdmin,
    ) -> Result<BootstrapReport> {
        self.with_tx(|tx| {
            let mut report = BootstrapReport::default();

            let founders: i64 = tx.query_row(
                "SELECT COUNT(*) FROM admins WHERE role = ?1",
                [Role::Founder.as_str()],
                |r| r.get(0),
            )?;
            if founders == 0 {
                if query_admin_by_username(tx, &founder.username)?.is_some() {
                    report.founder_username_taken = true;
                } else {
                    insert_admin(tx, founder)?;
                    report.founder_created = true;
                }
            }

            if query_admin_by_username(tx, &super_admin.username)?.is_none() {
                insert_admin(tx, super_admin)?;
                report.super_admin_created = true;
            }

            Ok(report)
        })
    }
}

fn map_admin(row: &Row<'_>) -> rusqlite::Result<AdminRow> {
    Ok(AdminRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: role_column(row, 3)?,
        name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
    })
}

fn insert_admin(conn: &Connection, admin: &NewAdmin) -> Result<i64> {
    conn.execute(
        "INSERT INTO admins (username, password_hash, role, name, email, phone)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            admin.username,
            admin.password_hash,
            admin.role.as_str(),
            admin.name,
            admin.email,
            admin.phone,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_admin_by_username(conn: &Connection, username: &str) -> Result<Option<AdminRow>> {
    let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE username = ?1");
    let row = conn.query_row(&sql, [username], map_admin).optional()?;
    Ok(row)
}

fn query_admin_by_id(conn: &Connection, id: i64) -> Result<Option<AdminRow>> {
    let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ?1");
    let row = conn.query_row(&sql, [id], map_admin).optional()?;
    Ok(row)
}
