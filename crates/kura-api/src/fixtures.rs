//! Fixture manager: matches between two teams and their rosters.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use tracing::info;

use kura_db::Database;
use kura_db::models::{MatchRow, NewFixture, PlayerRow};
use kura_types::api::{
    AddFixturesRequest, AddFixturesResponse, Notice, TeamSpec, UpdateFixtureRequest,
};
use kura_types::models::{FixtureGroup, RosterSource};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::policy::{self, Action, Caller};

/// Players assigned to team1 by the positional fallback when the UI does
/// not say otherwise.
pub const DEFAULT_PLAYER_COUNT: usize = 1;

/// Trimmed, non-blank names in input order.
fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pair teams consecutively (0&1, 2&3, ...). Unnamed teams are skipped
/// first; an odd team left at the end has no opponent and is dropped.
pub fn pair_teams(date: &str, time: &str, teams: &[TeamSpec]) -> Vec<NewFixture> {
    let named: Vec<&TeamSpec> = teams.iter().filter(|t| !t.name.trim().is_empty()).collect();

    named
        .chunks_exact(2)
        .map(|pair| NewFixture {
            date: date.to_string(),
            time: time.to_string(),
            team1: pair[0].name.trim().to_string(),
            team2: pair[1].name.trim().to_string(),
            t1_players: clean_names(&pair[0].players),
            t2_players: clean_names(&pair[1].players),
        })
        .collect()
}

pub fn add(db: &Database, caller: &Caller, req: &AddFixturesRequest) -> ApiResult<Vec<i64>> {
    policy::authorize(caller, Action::ManageFixtures)?;

    let date = req.date.trim();
    let fixtures = pair_teams(date, req.time.trim(), &req.teams);
    if date.is_empty() || fixtures.is_empty() {
        return Err(ApiError::validation("At least two teams and a date are required."));
    }

    let ids = db.create_fixtures(&fixtures)?;
    info!("{} created {} fixture(s) for {}", caller.username, ids.len(), date);
    Ok(ids)
}

pub fn update(
    db: &Database,
    caller: &Caller,
    match_id: i64,
    req: &UpdateFixtureRequest,
) -> ApiResult<()> {
    policy::authorize(caller, Action::ManageFixtures)?;

    let fixture = NewFixture {
        date: req.date.clone(),
        time: req.time.clone(),
        team1: req.team1.clone(),
        team2: req.team2.clone(),
        t1_players: clean_names(&req.t1_players),
        t2_players: clean_names(&req.t2_players),
    };
    if !db.replace_fixture(match_id, &fixture)? {
        return Err(ApiError::not_found("Match not found."));
    }
    info!("{} updated match {}", caller.username, match_id);
    Ok(())
}

pub fn delete(db: &Database, caller: &Caller, match_id: i64) -> ApiResult<()> {
    policy::authorize(caller, Action::ManageFixtures)?;

    if !db.delete_fixture(match_id)? {
        return Err(ApiError::not_found("Match not found."));
    }
    info!("{} deleted match {}", caller.username, match_id);
    Ok(())
}

/// Rebuild a match's two rosters.
///
/// Players are matched to a side by their stored team name. When either
/// side comes out empty (legacy rows without a team name, or a name that no
/// longer matches) the players are split by position instead: the first
/// `player_count` go to team1 and the rest to team2. The positional result
/// is a guess and is reported as such.
pub fn split_rosters(
    m: &MatchRow,
    players: &[&PlayerRow],
    player_count: usize,
) -> (Vec<String>, Vec<String>, RosterSource) {
    let on_team = |team: &str| -> Vec<String> {
        players
            .iter()
            .filter(|p| p.team_name.as_deref() == Some(team))
            .map(|p| p.name.clone())
            .collect()
    };
    let t1 = on_team(&m.team1);
    let t2 = on_team(&m.team2);

    if players.is_empty() || (!t1.is_empty() && !t2.is_empty()) {
        return (t1, t2, RosterSource::Tagged);
    }

    let split = player_count.min(players.len());
    let t1 = players[..split].iter().map(|p| p.name.clone()).collect();
    let t2 = players[split..].iter().map(|p| p.name.clone()).collect();
    (t1, t2, RosterSource::Positional)
}

/// Every fixture with its rosters, numbered from 1 in match order.
pub fn groups(db: &Database, player_count: usize) -> ApiResult<Vec<FixtureGroup>> {
    let matches = db.list_matches()?;
    let ids: Vec<i64> = matches.iter().map(|m| m.id).collect();
    let players = db.get_players_for_matches(&ids)?;

    let groups = matches
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let own: Vec<&PlayerRow> = players.iter().filter(|p| p.match_id == m.id).collect();
            let (t1_players, t2_players, roster_source) = split_rosters(m, &own, player_count);
            FixtureGroup {
                group_no: idx + 1,
                match_id: m.id,
                date: m.date.clone(),
                time: m.time.clone(),
                team1: m.team1.clone(),
                team2: m.team2.clone(),
                t1_players,
                t2_players,
                roster_source,
            }
        })
        .collect();

    Ok(groups)
}

// -- Handlers --

/// POST /admin
pub async fn add_fixtures(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<AddFixturesRequest>,
) -> ApiResult<(StatusCode, Json<AddFixturesResponse>)> {
    let match_ids = blocking(&state, move |s| add(&s.db, &caller, &req)).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddFixturesResponse {
            notice: "Teams and players added.".into(),
            match_ids,
        }),
    ))
}

/// POST /admin/update_match/{id}
pub async fn update_match(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(match_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateFixtureRequest>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| update(&s.db, &caller, match_id, &req)).await?;
    Ok(Json(Notice::new("Match updated.")))
}

/// GET /delete/{id}
pub async fn delete_match(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(match_id): ApiPath<i64>,
) -> ApiResult<Json<Notice>> {
    blocking(&state, move |s| delete(&s.db, &caller, match_id)).await?;
    Ok(Json(Notice::new("Match deleted.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{admin_caller, seeded_db};

    fn team(name: &str, players: &[&str]) -> TeamSpec {
        TeamSpec {
            name: name.into(),
            players: players.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn request(date: &str, teams: Vec<TeamSpec>) -> AddFixturesRequest {
        AddFixturesRequest { date: date.into(), time: "20:00".into(), teams }
    }

    #[test]
    fn odd_team_count_drops_the_last_team() {
        let (db, callers) = seeded_db();
        let teams = vec![
            team("A", &["a1"]),
            team("B", &["b1"]),
            team("C", &["c1"]),
            team("D", &["d1"]),
            team("E", &["e1"]),
        ];

        let ids = add(&db, &callers.admin, &request("2024-05-01", teams)).unwrap();
        assert_eq!(ids.len(), 2);

        let matches = db.list_matches().unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.team1 != "E" && m.team2 != "E"));
    }

    #[test]
    fn fewer_than_two_teams_or_no_date_is_rejected() {
        let (db, callers) = seeded_db();

        let one_team = add(&db, &callers.admin, &request("2024-05-01", vec![team("A", &["a"])]));
        assert!(matches!(one_team, Err(ApiError::Validation(_))));

        let no_date = add(&db, &callers.admin, &request("  ", vec![team("A", &[]), team("B", &[])]));
        assert!(matches!(no_date, Err(ApiError::Validation(_))));

        assert!(db.list_matches().unwrap().is_empty());
    }

    #[test]
    fn unnamed_teams_and_blank_players_are_skipped() {
        let (db, callers) = seeded_db();
        let teams = vec![team("A", &["Ali", ""]), team(" ", &["x"]), team("B", &["  Veli "])];

        let ids = add(&db, &callers.admin, &request("2024-05-01", teams)).unwrap();
        assert_eq!(ids.len(), 1);

        let players = db.get_players_for_matches(&ids).unwrap();
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ali", "Veli"]);
    }

    #[test]
    fn update_drops_blank_names_and_retags() {
        let (db, callers) = seeded_db();
        for i in 0..5 {
            let teams = vec![team(&format!("T{i}"), &["p"]), team(&format!("U{i}"), &["q"])];
            add(&db, &callers.admin, &request("2024-05-01", teams)).unwrap();
        }

        let req = UpdateFixtureRequest {
            date: "2024-06-01".into(),
            time: "19:00".into(),
            team1: "Kartallar".into(),
            team2: "Aslanlar".into(),
            t1_players: vec!["Ali".into(), "  ".into()],
            t2_players: vec!["Veli".into()],
        };
        update(&db, &callers.admin, 5, &req).unwrap();

        let players = db.get_players_for_matches(&[5]).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Ali");
        assert_eq!(players[0].team_name.as_deref(), Some("Kartallar"));
        assert_eq!(players[1].name, "Veli");
        assert_eq!(players[1].team_name.as_deref(), Some("Aslanlar"));
    }

    #[test]
    fn update_and_delete_of_missing_match_are_not_found() {
        let (db, callers) = seeded_db();
        let req = UpdateFixtureRequest::default();
        assert!(matches!(update(&db, &callers.admin, 77, &req), Err(ApiError::NotFound(_))));
        assert!(matches!(delete(&db, &callers.admin, 77), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn delete_leaves_no_orphans() {
        let (db, callers) = seeded_db();
        let ids = add(
            &db,
            &callers.admin,
            &request("2024-05-01", vec![team("A", &["a"]), team("B", &["b"])]),
        )
        .unwrap();

        delete(&db, &callers.admin, ids[0]).unwrap();
        assert!(db.get_players_for_matches(&ids).unwrap().is_empty());
    }

    fn legacy_match() -> MatchRow {
        MatchRow {
            id: 1,
            team1: "A".into(),
            team2: "B".into(),
            date: "2024-05-01".into(),
            time: String::new(),
        }
    }

    fn player(id: i64, name: &str, team: Option<&str>) -> PlayerRow {
        PlayerRow { id, name: name.into(), match_id: 1, team_name: team.map(str::to_string) }
    }

    #[test]
    fn rosters_split_by_team_name() {
        let rows = [player(1, "x", Some("B")), player(2, "y", Some("A")), player(3, "z", Some("B"))];
        let refs: Vec<&PlayerRow> = rows.iter().collect();

        let (t1, t2, source) = split_rosters(&legacy_match(), &refs, 1);
        assert_eq!(t1, vec!["y"]);
        assert_eq!(t2, vec!["x", "z"]);
        assert_eq!(source, RosterSource::Tagged);
    }

    #[test]
    fn untagged_rosters_fall_back_to_position() {
        let rows = [player(1, "x", None), player(2, "y", None), player(3, "z", None)];
        let refs: Vec<&PlayerRow> = rows.iter().collect();

        let (t1, t2, source) = split_rosters(&legacy_match(), &refs, 2);
        assert_eq!(t1, vec!["x", "y"]);
        assert_eq!(t2, vec!["z"]);
        assert_eq!(source, RosterSource::Positional);

        let (t1, t2, _) = split_rosters(&legacy_match(), &refs, 10);
        assert_eq!(t1.len(), 3);
        assert!(t2.is_empty());
    }

    #[test]
    fn one_sided_tagging_also_falls_back() {
        let rows = [player(1, "x", Some("A")), player(2, "y", Some("renamed"))];
        let refs: Vec<&PlayerRow> = rows.iter().collect();

        let (t1, t2, source) = split_rosters(&legacy_match(), &refs, 1);
        assert_eq!(t1, vec!["x"]);
        assert_eq!(t2, vec!["y"]);
        assert_eq!(source, RosterSource::Positional);
    }

    #[test]
    fn groups_are_numbered_in_match_order() {
        let (db, callers) = seeded_db();
        let teams = vec![team("A", &["a"]), team("B", &["b"]), team("C", &["c"]), team("D", &["d"])];
        add(&db, &callers.admin, &request("2024-05-01", teams)).unwrap();

        let groups = groups(&db, DEFAULT_PLAYER_COUNT).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_no, 1);
        assert_eq!(groups[0].team1, "A");
        assert_eq!(groups[1].group_no, 2);
        assert_eq!(groups[1].t2_players, vec!["d"]);
        assert_eq!(groups[1].roster_source, RosterSource::Tagged);
    }

    #[test]
    fn any_admin_manages_fixtures() {
        let (db, _) = seeded_db();
        let caller = admin_caller(&db, "yeni");
        let ids = add(&db, &caller, &request("2024-05-01", vec![team("A", &[]), team("B", &[])]));
        assert!(ids.is_ok());
    }
}
