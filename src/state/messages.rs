use crate::state::plan::Plan;
use chrono::NaiveDate;
use pitchiq_api::pitch::PitchPosition;
use pitchiq_api::stats::{StandingComparison, StatComparison};
use pitchiq_api::{
    Fixture, HeatmapPoint, League, LeagueRef, Match, NewsArticle, Player, Season, Shot,
    StandingGroup, Team,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    Leagues,
    Seasons,
    League { id: String },
    Standings { league: String, season: String, previous: bool },
    Team { id: String },
    TeamByName { name: String },
    Player { id: String, user: Option<String> },
    PlayerSearch { query: String },
    Match { id: String, user: Option<String> },
    FixturesByDate { date: NaiveDate, league: Option<String> },
    FixturesByRound { league: String, season: String, round: String },
    News { league: String },
    Plan { user: String },
    SetPlan { user: String, plan: Plan },
}

/// A widget only pro users see. Free users get `Locked`; a failed AI call
/// leaves empty data with `retry_available` set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Premium<T> {
    Locked,
    Loaded { data: T, retry_available: bool },
}

impl<T> Premium<T> {
    pub fn is_locked(&self) -> bool {
        matches!(self, Premium::Locked)
    }
}

/// Lineup player placed on the diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPlayer {
    pub team_id: String,
    pub player_id: String,
    pub name: String,
    pub position: PitchPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageResponse {
    Leagues {
        leagues: Vec<LeagueRef>,
    },
    Seasons {
        seasons: Vec<Season>,
    },
    League {
        league: League,
        teams: Vec<Team>,
    },
    Standings {
        groups: Vec<StandingGroup>,
        previous: Option<Vec<StandingGroup>>,
        comparison: Vec<StandingComparison>,
    },
    Team {
        team: Team,
        players: Vec<Player>,
        fixtures: Vec<Fixture>,
    },
    Player {
        player: Player,
        team: Option<Team>,
        heatmap: Premium<Vec<HeatmapPoint>>,
    },
    PlayerSearch {
        players: Vec<Player>,
    },
    Match {
        detail: Box<Match>,
        comparison: Vec<StatComparison>,
        positions: Vec<PlacedPlayer>,
        insights: Premium<Vec<String>>,
        shots: Premium<Vec<Shot>>,
    },
    Fixtures {
        fixtures: Vec<Fixture>,
    },
    News {
        articles: Vec<NewsArticle>,
    },
    Plan {
        user: String,
        plan: Plan,
    },
    PlanChanged {
        user: String,
        previous: Plan,
        plan: Plan,
    },
    NotFound {
        what: String,
    },
    Upstream {
        message: String,
    },
    Invalid {
        message: String,
    },
}

impl PageResponse {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            PageResponse::NotFound { .. } | PageResponse::Upstream { .. } | PageResponse::Invalid { .. }
        )
    }
}
