pub mod client;
pub mod espn;
pub mod images;
pub mod mapping;
pub mod news;
pub mod pitch;
pub mod shots;
pub mod sportsdb;
pub mod stats;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

/// Pitch length in meters (x axis of shot coordinates).
pub const PITCH_LENGTH: f64 = 105.0;
/// Pitch width in meters (y axis of shot coordinates).
pub const PITCH_WIDTH: f64 = 68.0;

// ---------------------------------------------------------------------------
// View model: clean types, independent of provider wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct League {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub banner: Option<String>,
    pub trophy: Option<String>,
}

impl League {
    pub fn to_ref(&self) -> LeagueRef {
        LeagueRef {
            id: self.id.clone(),
            name: self.name.clone(),
            logo: self.logo.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeagueRef {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Season {
    pub label: String, // "2023-2024"
}

impl Season {
    /// Most recent seasons offered by the league pages, newest first.
    pub fn recent() -> Vec<Season> {
        ["2024-2025", "2023-2024", "2022-2023", "2021-2022"]
            .into_iter()
            .map(|label| Season { label: label.to_owned() })
            .collect()
    }

    /// The season before this one: "2023-2024" -> "2022-2023", "2024" -> "2023".
    pub fn previous(&self) -> Option<Season> {
        let label = match self.label.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start.trim().parse().ok()?;
                let end: i32 = end.trim().parse().ok()?;
                format!("{}-{}", start - 1, end - 1)
            }
            None => (self.label.trim().parse::<i32>().ok()? - 1).to_string(),
        };
        Some(Season { label })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub stadium: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
}

impl Team {
    pub fn to_ref(&self) -> TeamRef {
        TeamRef {
            id: self.id.clone(),
            name: self.name.clone(),
            logo: self.logo.clone(),
        }
    }
}

/// Lightweight team reference embedded in fixtures, standings and lineups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
    pub logo: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(FormResult::Win),
            'D' => Some(FormResult::Draw),
            'L' => Some(FormResult::Loss),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormResult::Win => "Win",
            FormResult::Draw => "Draw",
            FormResult::Loss => "Loss",
        }
    }
}

fn serialize_form<S: Serializer>(form: &[FormResult], s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&form.iter().map(FormResult::as_char).collect::<String>())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Standing {
    pub rank: u16,
    pub team: TeamRef,
    pub points: i32,
    pub goals_diff: i32,
    #[serde(serialize_with = "serialize_form")]
    pub form: Vec<FormResult>,
    pub group: String,
    pub all: StandingRecord,
}

impl Standing {
    /// `played == win + draw + lose` and `goals_diff == for - against`.
    pub fn is_consistent(&self) -> bool {
        let record = &self.all;
        u32::from(record.played)
            == u32::from(record.win) + u32::from(record.draw) + u32::from(record.lose)
            && self.goals_diff == i32::from(record.goals.scored) - i32::from(record.goals.conceded)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandingRecord {
    pub played: u16,
    pub win: u16,
    pub draw: u16,
    pub lose: u16,
    pub goals: GoalCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalCounts {
    #[serde(rename = "for")]
    pub scored: u16,
    #[serde(rename = "against")]
    pub conceded: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandingGroup {
    pub name: String,
    pub rows: Vec<Standing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub age: Option<u32>, // recomputed on every request
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub photo: String,
    pub number: Option<String>,
    pub position: Option<String>,
    pub team_id: Option<String>,
    pub statistics: Vec<PlayerStats>,
    pub career: Vec<CareerEntry>,
    pub biography: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerStats {
    pub team: TeamRef,
    pub league: LeagueRef,
    pub games: GamesPlayed,
    pub goals: GoalTally,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GamesPlayed {
    pub appearances: Option<u32>,
    pub minutes: Option<u32>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalTally {
    pub total: Option<u32>,
    pub assists: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CareerEntry {
    pub team: TeamRef,
    pub start: Option<String>,
    pub end: Option<String>, // None = current club
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    #[default]
    NotStarted,
    InPlay,
    Finished,
    Postponed,
    Cancelled,
    Unknown,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "Not Started",
            MatchStatus::InPlay => "Live",
            MatchStatus::Finished => "Finished",
            MatchStatus::Postponed => "Postponed",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Unknown => "N/A",
        }
    }
}

/// Goal tally per side; `None` before kickoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Goals {
    pub home: Option<u16>,
    pub away: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fixture {
    pub id: String,
    pub date: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub home: TeamRef,
    pub away: TeamRef,
    pub goals: Goals,
    pub venue: Option<String>,
    pub league: Option<String>,
    pub round: Option<String>,
    pub summary: Option<FixtureSummary>,
}

impl Fixture {
    pub fn winner(&self) -> Option<&TeamRef> {
        let (home, away) = (self.goals.home?, self.goals.away?);
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(&self.home),
            std::cmp::Ordering::Less => Some(&self.away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixtureKind {
    Result,
    Upcoming,
}

/// Fixture seen from one team's point of view (team page history).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSummary {
    pub kind: FixtureKind,
    pub opponent: TeamRef,
    pub is_home: bool,
    pub competition: Option<String>,
    pub score: Option<String>, // "2-1", home first
    pub result: Option<FormResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Match {
    pub fixture: Fixture,
    pub lineups: Vec<Lineup>,
    pub events: Vec<MatchEvent>,
    pub statistics: Vec<TeamStatistics>,
}

impl Match {
    pub fn home_lineup(&self) -> Option<&Lineup> {
        self.lineups.iter().find(|l| l.team.id == self.fixture.home.id)
    }

    pub fn away_lineup(&self) -> Option<&Lineup> {
        self.lineups.iter().find(|l| l.team.id == self.fixture.away.id)
    }

    pub fn statistics_for(&self, team_id: &str) -> &[StatLine] {
        self.statistics
            .iter()
            .find(|s| s.team.id == team_id)
            .map(|s| s.lines.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lineup {
    pub team: TeamRef,
    pub formation: String,
    pub start_xi: Vec<LineupPlayer>,
    pub substitutes: Vec<LineupPlayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineupPlayer {
    pub id: String,
    pub name: String,
    pub number: Option<u16>,
    pub position: Option<String>,
    pub grid: Option<Grid>,
}

/// Provider "row:col" lineup cell. Row 1 is the goalkeeper line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub row: u8,
    pub col: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Goal,
    Card,
    Substitution,
    #[default]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchEvent {
    pub elapsed: u16,
    pub team: TeamRef,
    pub player: PlayerRef,
    pub assist: Option<PlayerRef>,
    pub kind: EventKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamStatistics {
    pub team: TeamRef,
    pub lines: Vec<StatLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatLine {
    pub kind: String,  // "Ball Possession"
    pub value: String, // "60%", "12"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShotOutcome {
    Goal,
    Saved,
    Miss,
}

impl ShotOutcome {
    /// Exact, case-sensitive match on the outcome name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Goal" => Some(ShotOutcome::Goal),
            "Saved" => Some(ShotOutcome::Saved),
            "Miss" => Some(ShotOutcome::Miss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotPlayer {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shot {
    pub x: f64, // 0..=105
    pub y: f64, // 0..=68
    pub team_id: u64,
    pub outcome: ShotOutcome,
    pub player: ShotPlayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsArticle {
    pub id: String,
    pub headline: String,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub link: Option<String>,
    pub images: Vec<NewsImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsImage {
    pub url: String,
    pub caption: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
