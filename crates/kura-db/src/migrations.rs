use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE admins (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                role            TEXT NOT NULL DEFAULT 'admin'
                                CHECK (role IN ('admin', 'super', 'founder')),
                name            TEXT,
                email           TEXT,
                phone           TEXT
            );

            -- At most one founder, whatever the application code does.
            CREATE UNIQUE INDEX idx_admins_single_founder
                ON admins(role) WHERE role = 'founder';

            CREATE TABLE login_attempts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL,
                success     INTEGER NOT NULL,
                timestamp   TEXT NOT NULL
            );

            CREATE INDEX idx_login_attempts_timestamp
                ON login_attempts(timestamp);

            CREATE TABLE matches (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                team1   TEXT NOT NULL,
                team2   TEXT NOT NULL,
                date    TEXT NOT NULL,
                time    TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE players (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                match_id    INTEGER NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
                team_name   TEXT
            );

            CREATE INDEX idx_players_match
                ON players(match_id);

            CREATE TABLE announcements (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                text    TEXT NOT NULL
            );

            CREATE TABLE photos (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                url     TEXT NOT NULL
            );

            CREATE TABLE admin_chat (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                admin_id    INTEGER REFERENCES admins(id) ON DELETE SET NULL,
                username    TEXT NOT NULL,
                role        TEXT NOT NULL,
                message     TEXT NOT NULL,
                timestamp   TEXT NOT NULL
            );

            CREATE TABLE about_box (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT,
                content     TEXT
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
