use crate::images::PLACEHOLDER_TEAM_IMAGE;
use crate::mapping::{
    first_number, is_soccer, map_career, map_fixture, map_league, map_match, map_player,
    map_standings, map_team, team_history,
};
use crate::sportsdb::{
    EventStatsResponse, EventsResponse, FormerTeamsResponse, LeaguesResponse, LineupResponse,
    Loose, PlayersResponse, TableResponse, TeamsResponse, TimelineResponse,
};
use crate::{CareerEntry, Fixture, League, LeagueRef, Match, Player, StandingGroup, Team};
use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const SPORTSDB_V1: &str = "https://www.thesportsdb.com/api/v1/json";
pub const API_KEY_VAR: &str = "THESPORTSDB_API_KEY";
/// League used by the fixtures-by-date page when none is given.
pub const DEFAULT_FIXTURE_LEAGUE: &str = "English Premier League";

/// Leagues offered on the league index, in display order.
pub const TOP_LEAGUES: &[(&str, &str)] = &[
    ("4328", "English Premier League"),
    ("4335", "Spanish La Liga"),
    ("4332", "Italian Serie A"),
    ("4331", "German Bundesliga"),
    ("4334", "French Ligue 1"),
    ("4480", "UEFA Champions League"),
    ("4481", "UEFA Europa League"),
];

pub fn top_leagues() -> Vec<LeagueRef> {
    TOP_LEAGUES
        .iter()
        .map(|(id, name)| LeagueRef {
            id: (*id).to_owned(),
            name: (*name).to_owned(),
            logo: None,
        })
        .collect()
}

/// TheSportsDB v1 client. The API key travels in the path, so it is never
/// included in logged URLs.
#[derive(Debug, Clone)]
pub struct SportsApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl Default for SportsApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("pitchiq/0.1 (soccer stats)")
                .build()
                .unwrap_or_default(),
            base_url: SPORTSDB_V1.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(StatusCode, String),
    Parsing(serde_json::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(status, url) => write!(f, "API error for {url}: HTTP {status}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl SportsApi {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    // -----------------------------------------------------------------------
    // Leagues and teams
    // -----------------------------------------------------------------------

    pub async fn fetch_league(&self, id: &str) -> ApiResult<Option<League>> {
        let raw: Option<LeaguesResponse> = self.get("lookupleague.php", &[("id", id)]).await?;
        Ok(raw.and_then(|r| r.leagues.iter().find_map(map_league)))
    }

    pub async fn fetch_teams_in_league(&self, league_id: &str) -> ApiResult<Vec<Team>> {
        let raw: Option<TeamsResponse> =
            self.get("lookup_all_teams.php", &[("id", league_id)]).await?;
        Ok(raw
            .map(|r| r.teams.iter().filter_map(map_team).collect())
            .unwrap_or_default())
    }

    pub async fn fetch_standings(&self, league_id: &str, season: &str) -> ApiResult<Vec<StandingGroup>> {
        let raw: Option<TableResponse> = self
            .get("lookuptable.php", &[("l", league_id), ("s", season)])
            .await?;
        Ok(raw.map(|r| map_standings(&r.table)).unwrap_or_default())
    }

    pub async fn fetch_team(&self, id: &str) -> ApiResult<Option<Team>> {
        let raw: Option<TeamsResponse> = self.get("lookupteam.php", &[("id", id)]).await?;
        Ok(raw.and_then(|r| r.teams.iter().find_map(map_team)))
    }

    /// First soccer team matching `name`.
    pub async fn search_team(&self, name: &str) -> ApiResult<Option<Team>> {
        let raw: Option<TeamsResponse> = self.get("searchteams.php", &[("t", name)]).await?;
        Ok(raw.and_then(|r| {
            r.teams
                .iter()
                .filter(|t| t.sport.get().is_none_or(|s| s.eq_ignore_ascii_case("soccer")))
                .find_map(map_team)
        }))
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    pub async fn fetch_team_players(&self, team_id: &str) -> ApiResult<Vec<Player>> {
        let raw: Option<PlayersResponse> =
            self.get("lookup_all_players.php", &[("id", team_id)]).await?;
        let today = Utc::now().date_naive();
        Ok(raw
            .map(|r| {
                r.into_players()
                    .iter()
                    .filter_map(|p| map_player(p, today))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn fetch_player(&self, id: &str) -> ApiResult<Option<Player>> {
        let raw: Option<PlayersResponse> = self.get("lookupplayer.php", &[("id", id)]).await?;
        let today = Utc::now().date_naive();
        Ok(raw.and_then(|r| r.into_players().iter().find_map(|p| map_player(p, today))))
    }

    /// Former clubs, most recent first.
    pub async fn fetch_former_teams(&self, player_id: &str) -> ApiResult<Vec<CareerEntry>> {
        let raw: Option<FormerTeamsResponse> = self
            .get("lookupformerteams.php", &[("id", player_id)])
            .await?;
        Ok(raw
            .map(|r| map_career(None, &Loose::default(), &r.formerteams))
            .unwrap_or_default())
    }

    /// Player search, soccer only.
    pub async fn search_players(&self, query: &str) -> ApiResult<Vec<Player>> {
        let raw: Option<PlayersResponse> = self.get("searchplayers.php", &[("p", query)]).await?;
        let today = Utc::now().date_naive();
        Ok(raw
            .map(|r| {
                r.into_players()
                    .iter()
                    .filter(|p| is_soccer(p))
                    .filter_map(|p| map_player(p, today))
                    .collect()
            })
            .unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Fixtures and matches
    // -----------------------------------------------------------------------

    /// Recent results and upcoming fixtures for a team, each summarized from
    /// the team's point of view. One failed half leaves only that half empty;
    /// the call fails only when both do.
    pub async fn fetch_team_fixtures(&self, team_id: &str) -> ApiResult<Vec<Fixture>> {
        let by_id = [("id", team_id)];
        let (past, next) = futures_util::join!(
            self.fetch_events("eventslast.php", &by_id),
            self.fetch_events("eventsnext.php", &by_id),
        );
        let (past, next) = match (past, next) {
            (Err(e), Err(_)) => return Err(e),
            (past, next) => (
                detail_or_default(past.map(Some), "recent results", team_id),
                detail_or_default(next.map(Some), "upcoming fixtures", team_id),
            ),
        };
        let mut fixtures = team_history(past, next, team_id);
        self.resolve_crests(&mut fixtures).await;
        Ok(fixtures)
    }

    /// Full match: the event first, then lineup, timeline and statistics
    /// concurrently. A failed detail call leaves that section empty.
    pub async fn fetch_match(&self, id: &str) -> ApiResult<Option<Match>> {
        let raw: Option<EventsResponse> = self.get("lookupevent.php", &[("id", id)]).await?;
        let Some(event) = raw.and_then(|r| r.into_events().into_iter().next()) else {
            return Ok(None);
        };

        let by_id = [("id", id)];
        let (lineup, timeline, stats) = futures_util::join!(
            self.get::<LineupResponse>("lookuplineup.php", &by_id),
            self.get::<TimelineResponse>("lookuptimeline.php", &by_id),
            self.get::<EventStatsResponse>("lookupeventstats.php", &by_id),
        );
        let lineup = detail_or_default(lineup, "lineup", id);
        let timeline = detail_or_default(timeline, "timeline", id);
        let stats = detail_or_default(stats, "statistics", id);

        let Some(mut m) = map_match(&event, &lineup.lineup, &timeline.timeline, &stats.eventstats)
        else {
            return Ok(None);
        };

        self.resolve_crests(std::slice::from_mut(&mut m.fixture)).await;
        for lineup in &mut m.lineups {
            if lineup.team.id == m.fixture.home.id {
                lineup.team.logo = m.fixture.home.logo.clone();
            } else if lineup.team.id == m.fixture.away.id {
                lineup.team.logo = m.fixture.away.logo.clone();
            }
        }
        Ok(Some(m))
    }

    /// Fixtures in a numbered round. `round` may be a label such as "Round 5";
    /// its first number is used.
    pub async fn fetch_fixtures_by_round(
        &self,
        league_id: &str,
        season: &str,
        round: &str,
    ) -> ApiResult<Vec<Fixture>> {
        let number = first_number(round)
            .ok_or_else(|| ApiError::NotFound(format!("round {round:?} has no number")))?
            .to_string();
        let mut fixtures = self
            .fetch_events("eventsround.php", &[("id", league_id), ("r", &number), ("s", season)])
            .await?;
        fixtures.sort_by(|a, b| a.date.cmp(&b.date));
        self.resolve_crests(&mut fixtures).await;
        Ok(fixtures)
    }

    pub async fn fetch_fixtures_by_date(
        &self,
        date: NaiveDate,
        league: Option<&str>,
    ) -> ApiResult<Vec<Fixture>> {
        let day = date.format("%Y-%m-%d").to_string();
        let league = league.unwrap_or(DEFAULT_FIXTURE_LEAGUE);
        let mut fixtures = self
            .fetch_events("eventsday.php", &[("d", &day), ("l", league)])
            .await?;
        fixtures.sort_by(|a, b| a.date.cmp(&b.date));
        self.resolve_crests(&mut fixtures).await;
        Ok(fixtures)
    }

    async fn fetch_events(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<Vec<Fixture>> {
        let raw: Option<EventsResponse> = self.get(endpoint, params).await?;
        Ok(raw
            .map(|r| r.into_events().iter().filter_map(map_fixture).collect())
            .unwrap_or_default())
    }

    /// Fill placeholder crests by looking up each distinct team once,
    /// concurrently. Failed lookups keep the placeholder.
    pub async fn resolve_crests(&self, fixtures: &mut [Fixture]) {
        let mut missing: Vec<String> = Vec::new();
        for f in fixtures.iter() {
            for team in [&f.home, &f.away] {
                if team.logo == PLACEHOLDER_TEAM_IMAGE && !missing.contains(&team.id) {
                    missing.push(team.id.clone());
                }
            }
        }
        if missing.is_empty() {
            return;
        }
        debug!("resolving {} team crests", missing.len());

        let lookups = join_all(missing.iter().map(|id| self.fetch_team(id))).await;
        let crests: HashMap<&str, String> = missing
            .iter()
            .zip(lookups)
            .filter_map(|(id, result)| match result {
                Ok(team) => team.map(|t| (id.as_str(), t.logo)),
                Err(e) => {
                    warn!("crest lookup for team {id} failed: {e}");
                    None
                }
            })
            .collect();

        for f in fixtures.iter_mut() {
            for team in [&mut f.home, &mut f.away] {
                if let Some(logo) = crests.get(team.id.as_str()) {
                    team.logo = logo.clone();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Fetch wrapper
    // -----------------------------------------------------------------------

    /// GET `{base}/{key}/{endpoint}?{params}`.
    ///
    /// `Ok(None)` is "no data": no key configured, a 4xx status, or an empty
    /// or `null` body. Transport failures, 5xx statuses and malformed JSON
    /// are errors.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> ApiResult<Option<T>> {
        let Some(key) = self.api_key.as_deref() else {
            error!("{API_KEY_VAR} is not set; {endpoint} returns no data");
            return Ok(None);
        };

        let mut url = Url::parse(&format!("{}/{key}/{endpoint}", self.base_url))
            .map_err(|e| ApiError::Other(format!("bad provider URL for {endpoint}: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        let shown = match url.query() {
            Some(query) => format!("{}/***/{endpoint}?{query}", self.base_url),
            None => format!("{}/***/{endpoint}", self.base_url),
        };
        debug!("GET {shown}");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("request to {shown} failed: {e}");
                ApiError::Network(e, shown.clone())
            })?;

        let status = response.status();
        if status.is_client_error() {
            debug!("{shown} returned {status}; treating as no data");
            return Ok(None);
        }
        if !status.is_success() {
            error!("{shown} returned {status}");
            return Err(ApiError::Api(status, shown));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.without_url(), shown.clone()))?;
        if body.trim().is_empty() {
            debug!("{shown} returned an empty body");
            return Ok(None);
        }

        serde_json::from_str::<Option<T>>(&body).map_err(|e| {
            error!("malformed JSON from {shown}: {e}");
            ApiError::Parsing(e, shown)
        })
    }
}

fn detail_or_default<T: Default>(result: ApiResult<Option<T>>, what: &str, owner_id: &str) -> T {
    match result {
        Ok(detail) => detail.unwrap_or_default(),
        Err(e) => {
            warn!("{what} for {owner_id} unavailable: {e}");
            T::default()
        }
    }
}
