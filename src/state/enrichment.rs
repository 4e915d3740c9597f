use log::debug;
use pitchiq_api::shots::{ShotParse, parse_shots};
use pitchiq_api::stats::{StatComparison, compare_statistics};
use pitchiq_api::{LineupPlayer, Match, MatchEvent, PITCH_LENGTH, PITCH_WIDTH, TeamRef};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum EnrichmentError {
    NotConfigured,
    Network(reqwest::Error),
    Api(StatusCode),
    Parsing(serde_json::Error),
}

impl fmt::Display for EnrichmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentError::NotConfigured => write!(f, "AI service is not configured (PITCHIQ_AI_URL)"),
            EnrichmentError::Network(e) => write!(f, "AI request failed: {e}"),
            EnrichmentError::Api(status) => write!(f, "AI service returned HTTP {status}"),
            EnrichmentError::Parsing(e) => write!(f, "AI reply is not the expected JSON: {e}"),
        }
    }
}

impl std::error::Error for EnrichmentError {}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct InsightsReply {
    insights: Vec<Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ShotsReply {
    shots: Vec<Value>,
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    base_url: Option<String>,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl AiClient {
    pub fn new(base_url: Option<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("pitchiq/0.1 (soccer stats)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_owned()),
            model: model.into(),
            api_key,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Short highlights drawn from the match statistics.
    pub async fn suggest_insights(&self, m: &Match) -> Result<Vec<String>, EnrichmentError> {
        let prompt = insights_prompt(m)?;
        let reply: InsightsReply = parse_reply(&self.generate(&prompt).await?)?;
        Ok(strings(reply.insights))
    }

    /// A plausible shot map, validated line by line.
    pub async fn suggest_shots(&self, m: &Match) -> Result<ShotParse, EnrichmentError> {
        let prompt = shots_prompt(m)?;
        let reply: ShotsReply = parse_reply(&self.generate(&prompt).await?)?;
        Ok(parse_shots(strings(reply.shots)))
    }

    async fn generate(&self, prompt: &str) -> Result<String, EnrichmentError> {
        let Some(base) = self.base_url.as_deref() else {
            return Err(EnrichmentError::NotConfigured);
        };
        let url = format!("{base}/api/generate");
        debug!("POST {url} ({} prompt chars)", prompt.len());

        let mut request = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                format: "json",
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(EnrichmentError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Api(status));
        }
        let body: GenerateResponse = response.json().await.map_err(EnrichmentError::Network)?;
        Ok(body.response)
    }
}

fn strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_owned()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Models sometimes wrap JSON in a markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, EnrichmentError> {
    serde_json::from_str(strip_code_fence(text)).map_err(EnrichmentError::Parsing)
}

#[derive(Serialize)]
struct SideBrief<'a> {
    id: &'a str,
    name: &'a str,
    goals: Option<u16>,
    players: Vec<&'a LineupPlayer>,
}

#[derive(Serialize)]
struct MatchBrief<'a> {
    status: &'static str,
    home: SideBrief<'a>,
    away: SideBrief<'a>,
    statistics: Vec<StatComparison>,
    events: &'a [MatchEvent],
}

fn side<'a>(m: &'a Match, team: &'a TeamRef, goals: Option<u16>) -> SideBrief<'a> {
    let players = m
        .lineups
        .iter()
        .filter(|l| l.team.id == team.id)
        .flat_map(|l| l.start_xi.iter().chain(&l.substitutes))
        .collect();
    SideBrief {
        id: &team.id,
        name: &team.name,
        goals,
        players,
    }
}

/// The match as the JSON blob embedded in prompts.
pub fn match_brief(m: &Match) -> Result<String, EnrichmentError> {
    let f = &m.fixture;
    let brief = MatchBrief {
        status: f.status.label(),
        home: side(m, &f.home, f.goals.home),
        away: side(m, &f.away, f.goals.away),
        statistics: compare_statistics(m.statistics_for(&f.home.id), m.statistics_for(&f.away.id)),
        events: &m.events,
    };
    serde_json::to_string(&brief).map_err(EnrichmentError::Parsing)
}

pub fn insights_prompt(m: &Match) -> Result<String, EnrichmentError> {
    Ok(format!(
        "You are a soccer analyst. Given the match statistics below, write 3 to 5 short, \
         specific insights about how the match was played.\n\
         Reply with JSON only: {{\"insights\": [\"...\", \"...\"]}}\n\n\
         Match statistics:\n{}",
        match_brief(m)?
    ))
}

pub fn shots_prompt(m: &Match) -> Result<String, EnrichmentError> {
    let f = &m.fixture;
    Ok(format!(
        "You create plausible shot map data for a soccer match from its statistics.\n\
         Rules:\n\
         - Each shot is a string \"x,y,teamId,type,playerId,playerName\".\n\
         - type is one of: Goal, Saved, Miss.\n\
         - The number of Goal shots for each team equals its final score ({home}: {home_goals}, {away}: {away_goals}).\n\
         - Each team's shot count should be close to its \"Total Shots\" statistic.\n\
         - Spread shots over the listed players of each team, using their ids.\n\
         - Coordinates stay on the pitch: 0 <= x <= {length}, 0 <= y <= {width}.\n\
         - {home} (teamId {home_id}) shoots in one half, {away} (teamId {away_id}) in the other.\n\
         Reply with JSON only: {{\"shots\": [\"...\"]}}\n\n\
         Match statistics:\n{brief}",
        home = f.home.name,
        away = f.away.name,
        home_id = f.home.id,
        away_id = f.away.id,
        home_goals = f.goals.home.unwrap_or_default(),
        away_goals = f.goals.away.unwrap_or_default(),
        length = PITCH_LENGTH,
        width = PITCH_WIDTH,
        brief = match_brief(m)?,
    ))
}
