use anyhow::Result;
use rusqlite::{Connection, params};

use crate::Database;
use crate::models::{MatchRow, NewFixture, PlayerRow};

impl Database {
    // -- Matches --

    /// Writes every fixture and its rosters in one transaction. Returns the
    /// new match ids in input order.
    pub fn create_fixtures(&self, fixtures: &[NewFixture]) -> Result<Vec<i64>> {
        self.with_tx(|tx| {
            let mut ids = Vec::with_capacity(fixtures.len());
            for fixture in fixtures {
                tx.execute(
                    "INSERT INTO matches (team1, team2, date, time) VALUES (?1, ?2, ?3, ?4)",
                    params![fixture.team1, fixture.team2, fixture.date, fixture.time],
                )?;
                let match_id = tx.last_insert_rowid();
                insert_rosters(tx, match_id, fixture)?;
                ids.push(match_id);
            }
            Ok(ids)
        })
    }

    /// Replaces a match's fields and both rosters. Returns false when the
    /// match does not exist.
    pub fn replace_fixture(&self, match_id: i64, fixture: &NewFixture) -> Result<bool> {
        self.with_tx(|tx| {
            let n = tx.execute(
                "UPDATE matches SET team1 = ?1, team2 = ?2, date = ?3, time = ?4 WHERE id = ?5",
                params![fixture.team1, fixture.team2, fixture.date, fixture.time, match_id],
            )?;
            if n == 0 {
                return Ok(false);
            }
            tx.execute("DELETE FROM players WHERE match_id = ?1", [match_id])?;
            insert_rosters(tx, match_id, fixture)?;
            Ok(true)
        })
    }

    /// Removes a match together with its players.
    pub fn delete_fixture(&self, match_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM players WHERE match_id = ?1", [match_id])?;
            let n = tx.execute("DELETE FROM matches WHERE id = ?1", [match_id])?;
            Ok(n > 0)
        })
    }

    pub fn list_matches(&self) -> Result<Vec<MatchRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, team1, team2, date, time FROM matches ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MatchRow {
                        id: row.get(0)?,
                        team1: row.get(1)?,
                        team2: row.get(2)?,
                        date: row.get(3)?,
                        time: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Players --

    /// Batch-fetch players for a set of matches, in insertion order.
    pub fn get_players_for_matches(&self, match_ids: &[i64]) -> Result<Vec<PlayerRow>> {
        if match_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=match_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, name, match_id, team_name FROM players WHERE match_id IN ({}) ORDER BY id",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(match_ids.iter()), |row| {
                    Ok(PlayerRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        match_id: row.get(2)?,
                        team_name: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn insert_rosters(conn: &Connection, match_id: i64, fixture: &NewFixture) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO players (name, match_id, team_name) VALUES (?1, ?2, ?3)")?;
    for name in &fixture.t1_players {
        stmt.execute(params![name, match_id, fixture.team1])?;
    }
    for name in &fixture.t2_players {
        stmt.execute(params![name, match_id, fixture.team2])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(team1: &str, team2: &str, t1: &[&str], t2: &[&str]) -> NewFixture {
        NewFixture {
            date: "2024-05-01".into(),
            time: "20:00".into(),
            team1: team1.into(),
            team2: team2.into(),
            t1_players: t1.iter().map(|s| s.to_string()).collect(),
            t2_players: t2.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn create_tags_players_with_their_team() {
        let db = Database::open_in_memory().unwrap();
        let ids = db
            .create_fixtures(&[fixture("Kartallar", "Aslanlar", &["Ali", "Can"], &["Veli"])])
            .unwrap();
        assert_eq!(ids.len(), 1);

        let players = db.get_players_for_matches(&ids).unwrap();
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].team_name.as_deref(), Some("Kartallar"));
        assert_eq!(players[2].name, "Veli");
        assert_eq!(players[2].team_name.as_deref(), Some("Aslanlar"));
    }

    #[test]
    fn delete_removes_players_too() {
        let db = Database::open_in_memory().unwrap();
        let ids = db.create_fixtures(&[fixture("A", "B", &["x"], &["y"])]).unwrap();

        assert!(db.delete_fixture(ids[0]).unwrap());
        assert!(db.get_players_for_matches(&ids).unwrap().is_empty());
        assert!(!db.delete_fixture(ids[0]).unwrap());
    }

    #[test]
    fn foreign_key_cascade_covers_raw_deletes() {
        let db = Database::open_in_memory().unwrap();
        let ids = db.create_fixtures(&[fixture("A", "B", &["x"], &["y"])]).unwrap();

        db.with_conn(|conn| {
            conn.execute("DELETE FROM matches WHERE id = ?1", [ids[0]])?;
            Ok(())
        })
        .unwrap();
        assert!(db.get_players_for_matches(&ids).unwrap().is_empty());
    }

    #[test]
    fn replace_swaps_rosters() {
        let db = Database::open_in_memory().unwrap();
        let ids = db.create_fixtures(&[fixture("A", "B", &["x", "z"], &["y"])]).unwrap();

        let replaced = db
            .replace_fixture(ids[0], &fixture("C", "D", &["p"], &["q", "r"]))
            .unwrap();
        assert!(replaced);

        let matches = db.list_matches().unwrap();
        assert_eq!(matches[0].team1, "C");
        let players = db.get_players_for_matches(&ids).unwrap();
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p", "q", "r"]);
    }

    #[test]
    fn replace_missing_match_is_a_miss() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.replace_fixture(9, &fixture("A", "B", &[], &[])).unwrap());
        assert!(db.get_players_for_matches(&[9]).unwrap().is_empty());
    }
}
