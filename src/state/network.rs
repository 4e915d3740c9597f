use crate::state::app_settings::AppSettings;
use crate::state::enrichment::{AiClient, EnrichmentError};
use crate::state::messages::{PageRequest, PageResponse, PlacedPlayer, Premium};
use crate::state::plan::{Plan, PlanError, PlanStore};
use chrono::NaiveDate;
use log::{debug, error, warn};
use pitchiq_api::client::{ApiError, ApiResult, SportsApi, top_leagues};
use pitchiq_api::news::NewsClient;
use pitchiq_api::pitch::{grid_position, synthetic_heatmap};
use pitchiq_api::stats::{compare_standings, compare_statistics};
use pitchiq_api::{Match, Season, Team};
use tokio::sync::mpsc;

/// Builds one page's view model per request. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct PageLoader {
    sports: SportsApi,
    news: NewsClient,
    ai: AiClient,
    plans: PlanStore,
}

impl PageLoader {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            sports: SportsApi::new(settings.sportsdb_key.clone())
                .with_base_url(settings.sportsdb_url.as_str()),
            news: NewsClient::new().with_base_url(settings.news_url.as_str()),
            ai: AiClient::new(
                settings.ai_url.clone(),
                settings.ai_model.as_str(),
                settings.ai_key.clone(),
            ),
            plans: PlanStore::new(&settings.data_dir),
        }
    }

    /// Serve requests until either channel closes.
    pub async fn run(
        self,
        mut requests: mpsc::Receiver<PageRequest>,
        responses: mpsc::Sender<PageResponse>,
    ) {
        while let Some(request) = requests.recv().await {
            let response = self.handle(request).await;
            debug!("page request complete");

            if let Err(e) = responses.send(response).await {
                error!("Failed to send page response: {e}");
                break;
            }
        }
    }

    pub async fn handle(&self, request: PageRequest) -> PageResponse {
        let result = match request {
            PageRequest::Leagues => Ok(PageResponse::Leagues { leagues: top_leagues() }),
            PageRequest::Seasons => Ok(PageResponse::Seasons { seasons: Season::recent() }),
            PageRequest::League { id } => self.handle_league(&id).await,
            PageRequest::Standings { league, season, previous } => {
                self.handle_standings(&league, &season, previous).await
            }
            PageRequest::Team { id } => self.handle_team(&id).await,
            PageRequest::TeamByName { name } => self.handle_team_by_name(&name).await,
            PageRequest::Player { id, user } => self.handle_player(&id, user.as_deref()).await,
            PageRequest::PlayerSearch { query } => self.handle_player_search(&query).await,
            PageRequest::Match { id, user } => self.handle_match(&id, user.as_deref()).await,
            PageRequest::FixturesByDate { date, league } => {
                self.handle_fixtures_by_date(date, league.as_deref()).await
            }
            PageRequest::FixturesByRound { league, season, round } => {
                self.handle_fixtures_by_round(&league, &season, &round).await
            }
            PageRequest::News { league } => self.handle_news(&league).await,
            PageRequest::Plan { user } => return self.handle_plan(&user).await,
            PageRequest::SetPlan { user, plan } => return self.handle_set_plan(&user, plan).await,
        };

        result.unwrap_or_else(|err| match err {
            ApiError::NotFound(what) => PageResponse::NotFound { what },
            err => {
                error!("page load failed: {err}");
                PageResponse::Upstream { message: err.to_string() }
            }
        })
    }

    async fn handle_league(&self, id: &str) -> ApiResult<PageResponse> {
        debug!("loading league {id}");
        let league = self
            .sports
            .fetch_league(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("league {id}")))?;
        let teams = secondary(self.sports.fetch_teams_in_league(id).await, "league teams");
        Ok(PageResponse::League { league, teams })
    }

    async fn handle_standings(
        &self,
        league: &str,
        season: &str,
        with_previous: bool,
    ) -> ApiResult<PageResponse> {
        debug!("loading standings for league {league}, season {season}");
        let previous_season = with_previous
            .then(|| Season { label: season.to_owned() }.previous())
            .flatten();

        let (groups, previous) = tokio::join!(self.sports.fetch_standings(league, season), async {
            match &previous_season {
                Some(prev) => Some(self.sports.fetch_standings(league, &prev.label).await),
                None => None,
            }
        });
        let groups = groups?;
        let previous = previous.map(|r| secondary(r, "previous season standings"));

        let comparison = match (groups.first(), previous.as_ref().and_then(|p| p.first())) {
            (Some(now), Some(before)) => compare_standings(&now.rows, &before.rows),
            _ => Vec::new(),
        };
        Ok(PageResponse::Standings { groups, previous, comparison })
    }

    async fn handle_team(&self, id: &str) -> ApiResult<PageResponse> {
        debug!("loading team {id}");
        let team = self
            .sports
            .fetch_team(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("team {id}")))?;
        Ok(self.team_page(team).await)
    }

    async fn handle_team_by_name(&self, name: &str) -> ApiResult<PageResponse> {
        debug!("searching team {name:?}");
        let team = self
            .sports
            .search_team(name)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("team named {name:?}")))?;
        Ok(self.team_page(team).await)
    }

    async fn team_page(&self, team: Team) -> PageResponse {
        let (players, fixtures) = tokio::join!(
            self.sports.fetch_team_players(&team.id),
            self.sports.fetch_team_fixtures(&team.id),
        );
        PageResponse::Team {
            players: secondary(players, "squad"),
            fixtures: secondary(fixtures, "fixtures"),
            team,
        }
    }

    async fn handle_player(&self, id: &str, user: Option<&str>) -> ApiResult<PageResponse> {
        debug!("loading player {id}");
        let mut player = self
            .sports
            .fetch_player(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("player {id}")))?;

        let team_id = player.team_id.clone().filter(|t| !t.is_empty());
        let league_id = player
            .statistics
            .first()
            .map(|s| s.league.id.clone())
            .filter(|l| !l.is_empty());

        let (team, league, former, plan) = tokio::join!(
            async {
                match &team_id {
                    Some(team_id) => secondary(self.sports.fetch_team(team_id).await, "player team"),
                    None => None,
                }
            },
            async {
                match &league_id {
                    Some(league_id) => secondary(self.sports.fetch_league(league_id).await, "player league"),
                    None => None,
                }
            },
            self.sports.fetch_former_teams(id),
            self.plans.plan_or_free(user),
        );

        if let Some(team) = &team {
            for stats in player.statistics.iter_mut().filter(|s| s.team.id == team.id) {
                stats.team.logo = team.logo.clone();
            }
            for entry in player.career.iter_mut().filter(|c| c.team.id == team.id) {
                entry.team.logo = team.logo.clone();
            }
        }
        if let Some(league) = &league {
            for stats in player.statistics.iter_mut().filter(|s| s.league.id == league.id) {
                stats.league = league.to_ref();
            }
        }
        player.career.extend(secondary(former, "former teams"));

        let heatmap = if plan.is_pro() {
            Premium::Loaded {
                data: synthetic_heatmap(&mut rand::thread_rng()),
                retry_available: false,
            }
        } else {
            Premium::Locked
        };
        Ok(PageResponse::Player { player, team, heatmap })
    }

    async fn handle_player_search(&self, query: &str) -> ApiResult<PageResponse> {
        debug!("searching players {query:?}");
        let players = self.sports.search_players(query).await?;
        Ok(PageResponse::PlayerSearch { players })
    }

    async fn handle_match(&self, id: &str, user: Option<&str>) -> ApiResult<PageResponse> {
        debug!("loading match {id}");
        let (detail, plan) = tokio::join!(self.sports.fetch_match(id), self.plans.plan_or_free(user));
        let detail = detail?.ok_or_else(|| ApiError::NotFound(format!("match {id}")))?;

        let fixture = &detail.fixture;
        let comparison = compare_statistics(
            detail.statistics_for(&fixture.home.id),
            detail.statistics_for(&fixture.away.id),
        );
        let positions = place_lineups(&detail);

        let (insights, shots) = if plan.is_pro() {
            let (insights, shots) =
                tokio::join!(self.ai.suggest_insights(&detail), self.ai.suggest_shots(&detail));
            (
                enriched(insights, "insights"),
                enriched(shots.map(|parsed| parsed.shots), "shot map"),
            )
        } else {
            (Premium::Locked, Premium::Locked)
        };

        Ok(PageResponse::Match {
            detail: Box::new(detail),
            comparison,
            positions,
            insights,
            shots,
        })
    }

    async fn handle_fixtures_by_date(
        &self,
        date: NaiveDate,
        league: Option<&str>,
    ) -> ApiResult<PageResponse> {
        debug!("loading fixtures on {date}");
        let fixtures = self.sports.fetch_fixtures_by_date(date, league).await?;
        Ok(PageResponse::Fixtures { fixtures })
    }

    async fn handle_fixtures_by_round(
        &self,
        league: &str,
        season: &str,
        round: &str,
    ) -> ApiResult<PageResponse> {
        debug!("loading round {round:?} of league {league}, season {season}");
        let fixtures = self.sports.fetch_fixtures_by_round(league, season, round).await?;
        Ok(PageResponse::Fixtures { fixtures })
    }

    async fn handle_news(&self, league: &str) -> ApiResult<PageResponse> {
        debug!("loading news for {league}");
        let articles = self.news.fetch_news(league).await?;
        Ok(PageResponse::News { articles })
    }

    async fn handle_plan(&self, user: &str) -> PageResponse {
        match self.plans.plan(user).await {
            Ok(plan) => PageResponse::Plan { user: user.to_owned(), plan },
            Err(e) => plan_failure(e),
        }
    }

    async fn handle_set_plan(&self, user: &str, plan: Plan) -> PageResponse {
        match self.plans.set_plan(user, plan).await {
            Ok(previous) => PageResponse::PlanChanged {
                user: user.to_owned(),
                previous,
                plan,
            },
            Err(e) => plan_failure(e),
        }
    }
}

/// Starting players with a usable grid cell, placed on the lineup diagram.
fn place_lineups(m: &Match) -> Vec<PlacedPlayer> {
    m.lineups
        .iter()
        .flat_map(|lineup| {
            let is_home = lineup.team.id == m.fixture.home.id;
            lineup.start_xi.iter().filter_map(move |p| {
                Some(PlacedPlayer {
                    team_id: lineup.team.id.clone(),
                    player_id: p.id.clone(),
                    name: p.name.clone(),
                    position: grid_position(p.grid?, &lineup.formation, is_home),
                })
            })
        })
        .collect()
}

/// Secondary page sections degrade to empty on failure.
fn secondary<T: Default>(result: ApiResult<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!("{what} unavailable: {e}");
        T::default()
    })
}

fn enriched<T: Default>(result: Result<T, EnrichmentError>, what: &str) -> Premium<T> {
    match result {
        Ok(data) => Premium::Loaded { data, retry_available: false },
        Err(EnrichmentError::NotConfigured) => {
            debug!("{what} skipped: AI service not configured");
            Premium::Loaded { data: T::default(), retry_available: false }
        }
        Err(e) => {
            warn!("{what} unavailable: {e}");
            Premium::Loaded { data: T::default(), retry_available: true }
        }
    }
}

fn plan_failure(e: PlanError) -> PageResponse {
    match e {
        PlanError::InvalidUser(_) | PlanError::UnknownPlan(_) => {
            PageResponse::Invalid { message: e.to_string() }
        }
        e => {
            error!("plan store failed: {e}");
            PageResponse::Upstream { message: e.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use std::path::Path;

    const EVENT: &str = r#"{"events": [
        {"idEvent": "7", "strStatus": "FT",
         "idHomeTeam": "1", "strHomeTeam": "Home", "strHomeTeamBadge": "https://x/h.png",
         "idAwayTeam": "2", "strAwayTeam": "Away", "strAwayTeamBadge": "https://x/a.png",
         "intHomeScore": "2", "intAwayScore": "0",
         "strHomeFormation": "4-4-2", "strAwayFormation": "4-3-3",
         "intHomeShots": "12", "intAwayShots": "4"}
    ]}"#;

    const LINEUP: &str = r#"{"lineup": [
        {"idPlayer": "10", "strPlayer": "Keeper", "idTeam": "1", "strHome": "Yes", "strSubstitute": "No", "strGrid": "1:1"},
        {"idPlayer": "20", "strPlayer": "Striker", "idTeam": "2", "strHome": "No", "strSubstitute": "No", "strGrid": "4:2"},
        {"idPlayer": "30", "strPlayer": "Bench", "idTeam": "2", "strHome": "No", "strSubstitute": "Yes"}
    ]}"#;

    fn loader(server: &ServerGuard, data_dir: &Path, ai: bool) -> PageLoader {
        let settings = AppSettings {
            sportsdb_key: Some("k".into()),
            sportsdb_url: server.url(),
            news_url: server.url(),
            ai_url: ai.then(|| server.url()),
            data_dir: data_dir.to_owned(),
            ..AppSettings::default()
        };
        PageLoader::new(&settings)
    }

    async fn mock_match(server: &mut ServerGuard) -> Vec<mockito::Mock> {
        vec![
            server
                .mock("GET", "/k/lookupevent.php")
                .match_query(Matcher::UrlEncoded("id".into(), "7".into()))
                .with_status(200)
                .with_body(EVENT)
                .create_async()
                .await,
            server
                .mock("GET", "/k/lookuplineup.php")
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(LINEUP)
                .create_async()
                .await,
        ]
    }

    #[tokio::test]
    async fn static_pages_need_no_network() {
        let server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&server, dir.path(), false);

        match loader.handle(PageRequest::Leagues).await {
            PageResponse::Leagues { leagues } => assert_eq!(leagues.len(), 7),
            other => panic!("unexpected {other:?}"),
        }
        match loader.handle(PageRequest::Seasons).await {
            PageResponse::Seasons { seasons } => assert_eq!(seasons[0].label, "2024-2025"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn free_users_see_locked_enrichment() {
        let mut server = Server::new_async().await;
        let _mocks = mock_match(&mut server).await;
        let ai = server
            .mock("POST", "/api/generate")
            .expect(0)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let response = loader(&server, dir.path(), true)
            .handle(PageRequest::Match { id: "7".into(), user: None })
            .await;
        let PageResponse::Match { detail, comparison, positions, insights, shots } = response else {
            panic!("expected a match page");
        };
        assert_eq!(detail.fixture.goals.home, Some(2));
        assert!(insights.is_locked());
        assert!(shots.is_locked());
        assert!(comparison.iter().any(|row| row.kind == "Total Shots" && row.home == "12"));

        assert_eq!(positions.len(), 2);
        let striker = positions.iter().find(|p| p.player_id == "20").unwrap();
        assert!((striker.position.y - 30.0).abs() < 1e-9);
        assert!((striker.position.x - 50.0).abs() < 1e-9);
        ai.assert_async().await;
    }

    #[tokio::test]
    async fn failed_enrichment_offers_retry_for_pro_users() {
        let mut server = Server::new_async().await;
        let _mocks = mock_match(&mut server).await;
        let _ai = server
            .mock("POST", "/api/generate")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&server, dir.path(), true);
        loader
            .handle(PageRequest::SetPlan { user: "alice".into(), plan: Plan::Pro })
            .await;

        let response = loader
            .handle(PageRequest::Match { id: "7".into(), user: Some("alice".into()) })
            .await;
        let PageResponse::Match { insights, shots, .. } = response else {
            panic!("expected a match page");
        };
        assert_eq!(insights, Premium::Loaded { data: vec![], retry_available: true });
        assert_eq!(shots, Premium::Loaded { data: vec![], retry_available: true });
    }

    #[tokio::test]
    async fn pro_users_get_enrichment() {
        let mut server = Server::new_async().await;
        let _mocks = mock_match(&mut server).await;
        let reply = serde_json::json!({
            "response": r#"{"insights": ["Home controlled the game."], "shots": ["90,30,1,Goal,10,Keeper"]}"#
        });
        let _ai = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(reply.to_string())
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&server, dir.path(), true);
        loader
            .handle(PageRequest::SetPlan { user: "bob".into(), plan: Plan::Pro })
            .await;

        let response = loader
            .handle(PageRequest::Match { id: "7".into(), user: Some("bob".into()) })
            .await;
        let PageResponse::Match { insights, shots, .. } = response else {
            panic!("expected a match page");
        };
        assert_eq!(
            insights,
            Premium::Loaded { data: vec!["Home controlled the game.".to_owned()], retry_available: false }
        );
        match shots {
            Premium::Loaded { data, .. } => assert_eq!(data.len(), 1),
            Premium::Locked => panic!("shots should be unlocked"),
        }
    }

    #[tokio::test]
    async fn missing_and_failing_entities_are_distinct() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/k/lookupevent.php")
            .match_query(Matcher::UrlEncoded("id".into(), "0".into()))
            .with_status(200)
            .with_body(r#"{"events": null}"#)
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/k/lookupteam.php")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&server, dir.path(), false);

        assert!(matches!(
            loader.handle(PageRequest::Match { id: "0".into(), user: None }).await,
            PageResponse::NotFound { .. }
        ));
        assert!(matches!(
            loader.handle(PageRequest::Team { id: "1".into() }).await,
            PageResponse::Upstream { .. }
        ));
    }

    #[tokio::test]
    async fn player_heatmap_is_premium() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/k/lookupplayer.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"players": [{"idPlayer": "34145937", "strPlayer": "Bukayo Saka",
                    "idTeam": "133604", "strTeam": "Arsenal", "idLeague": "4328",
                    "strLeague": "English Premier League", "dateSigned": "2018-07-01"}]}"#,
            )
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/k/lookupteam.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"teams": [{"idTeam": "133604", "strTeam": "Arsenal", "strBadge": "https://x/ars.png"}]}"#)
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/k/lookupformerteams.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"formerteams": [{"idFormerTeam": "1", "strFormerTeam": "Hale End", "strJoined": "2008", "strDeparted": "2018"}]}"#)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&server, dir.path(), false);

        let PageResponse::Player { player, team, heatmap } = loader
            .handle(PageRequest::Player { id: "34145937".into(), user: None })
            .await
        else {
            panic!("expected a player page");
        };
        assert!(heatmap.is_locked());
        assert_eq!(team.map(|t| t.name), Some("Arsenal".to_owned()));
        assert_eq!(player.statistics[0].team.logo, "https://x/ars.png");
        assert_eq!(player.career.len(), 2);
        assert_eq!(player.career[0].team.logo, "https://x/ars.png");
        assert_eq!(player.career[1].team.name, "Hale End");

        loader
            .handle(PageRequest::SetPlan { user: "carol".into(), plan: Plan::Pro })
            .await;
        let PageResponse::Player { heatmap, .. } = loader
            .handle(PageRequest::Player { id: "34145937".into(), user: Some("carol".into()) })
            .await
        else {
            panic!("expected a player page");
        };
        match heatmap {
            Premium::Loaded { data, .. } => assert_eq!(data.len(), 50),
            Premium::Locked => panic!("heatmap should be unlocked"),
        }
    }

    async fn mock_table(server: &mut ServerGuard, season: &str, status: usize, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/k/lookuptable.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("l".into(), "4328".into()),
                Matcher::UrlEncoded("s".into(), season.into()),
            ]))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    fn standings(previous: bool) -> PageRequest {
        PageRequest::Standings {
            league: "4328".into(),
            season: "2023-2024".into(),
            previous,
        }
    }

    const CURRENT_TABLE: &str = r#"{"table": [
        {"idTeam": "133613", "strTeam": "Man City", "intRank": "1", "intPoints": "91"},
        {"idTeam": "133604", "strTeam": "Arsenal", "intRank": "2", "intPoints": "89"},
        {"idTeam": "133602", "strTeam": "Liverpool", "intRank": "3", "intPoints": "82"}
    ]}"#;

    #[tokio::test]
    async fn standings_compare_with_the_previous_season() {
        let mut server = Server::new_async().await;
        let _now = mock_table(&mut server, "2023-2024", 200, CURRENT_TABLE).await;
        let before = mock_table(
            &mut server,
            "2022-2023",
            200,
            r#"{"table": [
                {"idTeam": "133604", "strTeam": "Arsenal", "intRank": "2", "intPoints": "84"},
                {"idTeam": "133613", "strTeam": "Man City", "intRank": "1", "intPoints": "89"}
            ]}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let PageResponse::Standings { groups, previous, comparison } =
            loader(&server, dir.path(), false).handle(standings(true)).await
        else {
            panic!("expected a standings page");
        };
        assert_eq!(groups[0].rows.len(), 3);
        assert_eq!(previous.map(|p| p[0].rows.len()), Some(2));

        assert_eq!(comparison.len(), 3);
        assert_eq!(comparison[0].team.name, "Man City");
        assert_eq!(comparison[0].difference, Some(2));
        assert_eq!(comparison[1].previous_points, Some(84));
        assert_eq!(comparison[1].difference, Some(5));
        assert_eq!(comparison[2].previous_points, None);
        before.assert_async().await;
    }

    #[tokio::test]
    async fn failed_previous_season_leaves_current_table() {
        let mut server = Server::new_async().await;
        let _now = mock_table(&mut server, "2023-2024", 200, CURRENT_TABLE).await;
        let _before = mock_table(&mut server, "2022-2023", 500, "").await;
        let dir = tempfile::tempdir().unwrap();

        let PageResponse::Standings { groups, previous, comparison } =
            loader(&server, dir.path(), false).handle(standings(true)).await
        else {
            panic!("expected a standings page");
        };
        assert_eq!(groups[0].rows.len(), 3);
        assert_eq!(previous, Some(Vec::new()));
        assert!(comparison.is_empty());
    }

    #[tokio::test]
    async fn previous_season_is_only_fetched_on_request() {
        let mut server = Server::new_async().await;
        let _now = mock_table(&mut server, "2023-2024", 200, CURRENT_TABLE).await;
        let before = server
            .mock("GET", "/k/lookuptable.php")
            .match_query(Matcher::UrlEncoded("s".into(), "2022-2023".into()))
            .expect(0)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        let PageResponse::Standings { previous, comparison, .. } =
            loader(&server, dir.path(), false).handle(standings(false)).await
        else {
            panic!("expected a standings page");
        };
        assert_eq!(previous, None);
        assert!(comparison.is_empty());
        before.assert_async().await;
    }

    #[tokio::test]
    async fn plan_changes_report_previous_plan() {
        let server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&server, dir.path(), false);

        assert_eq!(
            loader.handle(PageRequest::SetPlan { user: "dave".into(), plan: Plan::Pro }).await,
            PageResponse::PlanChanged { user: "dave".into(), previous: Plan::Free, plan: Plan::Pro }
        );
        assert_eq!(
            loader.handle(PageRequest::Plan { user: "dave".into() }).await,
            PageResponse::Plan { user: "dave".into(), plan: Plan::Pro }
        );
        assert!(matches!(
            loader.handle(PageRequest::Plan { user: "../dave".into() }).await,
            PageResponse::Invalid { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_news_league_is_not_found() {
        let server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let response = loader(&server, dir.path(), false)
            .handle(PageRequest::News { league: "mls".into() })
            .await;
        assert!(matches!(response, PageResponse::NotFound { .. }));
    }

    #[tokio::test]
    async fn run_answers_each_request() {
        let server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(4);
        let task = tokio::spawn(loader(&server, dir.path(), false).run(req_rx, resp_tx));

        req_tx.send(PageRequest::Seasons).await.unwrap();
        assert!(matches!(resp_rx.recv().await, Some(PageResponse::Seasons { .. })));
        drop(req_tx);
        task.await.unwrap();
    }
}
