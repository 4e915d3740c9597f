/// TheSportsDB v1 raw wire types: serde shapes for deserializing provider responses.
/// These map to the view model via the functions in mapping.rs.
///
/// The provider is loose with scalar types: the same field arrives as a string,
/// a number or null depending on endpoint and record age, and list keys are
/// `null` (or occasionally a string) when there is no data. Every scalar is
/// therefore a [`Loose`] and every list goes through [`list`].
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Lenient scalars
// ---------------------------------------------------------------------------

/// A provider scalar: string, number or bool, trimmed; blank and null are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loose(Option<String>);

impl Loose {
    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn owned(&self) -> Option<String> {
        self.0.clone()
    }

    pub fn or(&self, fallback: &str) -> String {
        self.0.clone().unwrap_or_else(|| fallback.to_owned())
    }

    /// Numeric parse; tolerates "3.0" style values for integer targets.
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        let raw = self.get()?;
        raw.parse::<T>().ok().or_else(|| {
            raw.strip_suffix(".0")
                .and_then(|whole| whole.parse::<T>().ok())
        })
    }

    /// Provider yes/no flags ("Yes", "No", "1", true).
    pub fn is_yes(&self) -> bool {
        matches!(
            self.get().map(|s| s.to_ascii_lowercase()).as_deref(),
            Some("yes" | "y" | "true" | "1")
        )
    }
}

impl From<&str> for Loose {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        Loose((!trimmed.is_empty()).then(|| trimmed.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Loose {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => Loose::from(s.as_str()),
            Some(Value::Number(n)) => Loose(Some(n.to_string())),
            Some(Value::Bool(b)) => Loose(Some(b.to_string())),
            _ => Loose(None),
        })
    }
}

/// A provider list: anything that is not an array is empty, and elements that
/// do not have the expected shape are skipped.
pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Leagues  (lookupleague.php)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LeaguesResponse {
    #[serde(deserialize_with = "list")]
    pub leagues: Vec<SdbLeague>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbLeague {
    #[serde(rename = "idLeague")]
    pub id: Loose,
    #[serde(rename = "strLeague")]
    pub name: Loose,
    #[serde(rename = "strBadge")]
    pub badge: Loose,
    #[serde(rename = "strLogo")]
    pub logo: Loose,
    #[serde(rename = "strCountry")]
    pub country: Loose,
    #[serde(rename = "strDescriptionEN")]
    pub description: Loose,
    #[serde(rename = "strBanner")]
    pub banner: Loose,
    #[serde(rename = "strTrophy")]
    pub trophy: Loose,
}

// ---------------------------------------------------------------------------
// Teams  (lookupteam.php, searchteams.php, lookup_all_teams.php)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TeamsResponse {
    #[serde(deserialize_with = "list")]
    pub teams: Vec<SdbTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbTeam {
    #[serde(rename = "idTeam")]
    pub id: Loose,
    #[serde(rename = "strTeam")]
    pub name: Loose,
    #[serde(rename = "strBadge")]
    pub badge: Loose,
    /// Older records carry the crest here instead of `strBadge`.
    #[serde(rename = "strTeamBadge")]
    pub team_badge: Loose,
    #[serde(rename = "strStadium")]
    pub stadium: Loose,
    #[serde(rename = "strCountry")]
    pub country: Loose,
    #[serde(rename = "strDescriptionEN")]
    pub description: Loose,
    #[serde(rename = "strSport")]
    pub sport: Loose,
}

// ---------------------------------------------------------------------------
// League table  (lookuptable.php)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TableResponse {
    #[serde(deserialize_with = "list")]
    pub table: Vec<SdbTableRow>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbTableRow {
    #[serde(rename = "intRank")]
    pub rank: Loose,
    #[serde(rename = "idTeam")]
    pub team_id: Loose,
    #[serde(rename = "strTeam")]
    pub team_name: Loose,
    #[serde(rename = "strBadge")]
    pub badge: Loose,
    #[serde(rename = "strTeamBadge")]
    pub team_badge: Loose,
    #[serde(rename = "intPoints")]
    pub points: Loose,
    #[serde(rename = "intGoalDifference")]
    pub goal_difference: Loose,
    #[serde(rename = "strForm")]
    pub form: Loose, // "WW-DL" style; separators vary
    #[serde(rename = "intPlayed")]
    pub played: Loose,
    #[serde(rename = "intWin")]
    pub win: Loose,
    #[serde(rename = "intDraw")]
    pub draw: Loose,
    #[serde(rename = "intLoss")]
    pub loss: Loose,
    #[serde(rename = "intGoalsFor")]
    pub goals_for: Loose,
    #[serde(rename = "intGoalsAgainst")]
    pub goals_against: Loose,
    #[serde(rename = "strGroup")]
    pub group: Loose,
}

// ---------------------------------------------------------------------------
// Players  (lookup_all_players.php, searchplayers.php → "player";
//           lookupplayer.php → "players")
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PlayersResponse {
    #[serde(deserialize_with = "list")]
    pub player: Vec<SdbPlayer>,
    #[serde(deserialize_with = "list")]
    pub players: Vec<SdbPlayer>,
}

impl PlayersResponse {
    pub fn into_players(self) -> Vec<SdbPlayer> {
        let mut all = self.player;
        all.extend(self.players);
        all
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbPlayer {
    #[serde(rename = "idPlayer")]
    pub id: Loose,
    #[serde(rename = "strPlayer")]
    pub name: Loose,
    #[serde(rename = "dateBorn")]
    pub born: Loose, // "1999-06-11"
    #[serde(rename = "strNationality")]
    pub nationality: Loose,
    #[serde(rename = "strHeight")]
    pub height: Loose,
    #[serde(rename = "strWeight")]
    pub weight: Loose,
    #[serde(rename = "strCutout")]
    pub cutout: Loose,
    #[serde(rename = "strThumb")]
    pub thumb: Loose,
    #[serde(rename = "strNumber")]
    pub number: Loose,
    #[serde(rename = "strPosition")]
    pub position: Loose,
    #[serde(rename = "idTeam")]
    pub team_id: Loose,
    #[serde(rename = "strTeam")]
    pub team_name: Loose,
    #[serde(rename = "idLeague")]
    pub league_id: Loose,
    #[serde(rename = "strLeague")]
    pub league_name: Loose,
    /// Some records list a domestic league here and a cup in `idLeague`.
    #[serde(rename = "idLeague2")]
    pub league2_id: Loose,
    #[serde(rename = "strLeague2")]
    pub league2_name: Loose,
    #[serde(rename = "intGoals")]
    pub goals: Loose,
    #[serde(rename = "intAssists")]
    pub assists: Loose,
    #[serde(rename = "intAppearances")]
    pub appearances: Loose,
    #[serde(rename = "dateSigned")]
    pub signed: Loose,
    #[serde(rename = "strSport")]
    pub sport: Loose,
    #[serde(rename = "strDescriptionEN")]
    pub description: Loose,
    #[serde(rename = "idTransferMkt")]
    pub transfermarkt_id: Loose,
}

// ---------------------------------------------------------------------------
// Former teams  (lookupformerteams.php)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FormerTeamsResponse {
    #[serde(deserialize_with = "list")]
    pub formerteams: Vec<SdbFormerTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbFormerTeam {
    #[serde(rename = "idFormerTeam")]
    pub team_id: Loose,
    #[serde(rename = "strFormerTeam")]
    pub team_name: Loose,
    #[serde(rename = "strBadge")]
    pub badge: Loose,
    #[serde(rename = "strJoined")]
    pub joined: Loose,
    #[serde(rename = "strDeparted")]
    pub departed: Loose,
    #[serde(rename = "strMoveType")]
    pub move_type: Loose, // "Permanent", "Loan"
}

// ---------------------------------------------------------------------------
// Events  (lookupevent.php, eventsround.php, eventsday.php, eventsnext.php →
//          "events"; eventslast.php → "results")
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EventsResponse {
    #[serde(deserialize_with = "list")]
    pub events: Vec<SdbEvent>,
    #[serde(deserialize_with = "list")]
    pub results: Vec<SdbEvent>,
}

impl EventsResponse {
    pub fn into_events(self) -> Vec<SdbEvent> {
        let mut all = self.events;
        all.extend(self.results);
        all
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbEvent {
    #[serde(rename = "idEvent")]
    pub id: Loose,
    #[serde(rename = "strEvent")]
    pub name: Loose,
    #[serde(rename = "dateEvent")]
    pub date: Loose, // "2024-05-19"
    #[serde(rename = "strTime")]
    pub time: Loose, // "15:00:00"
    #[serde(rename = "strTimestamp")]
    pub timestamp: Loose, // "2024-05-19T15:00:00", no zone, UTC
    #[serde(rename = "strStatus")]
    pub status: Loose,
    #[serde(rename = "idHomeTeam")]
    pub home_id: Loose,
    #[serde(rename = "idAwayTeam")]
    pub away_id: Loose,
    #[serde(rename = "strHomeTeam")]
    pub home_name: Loose,
    #[serde(rename = "strAwayTeam")]
    pub away_name: Loose,
    #[serde(rename = "strHomeTeamBadge")]
    pub home_badge: Loose,
    #[serde(rename = "strAwayTeamBadge")]
    pub away_badge: Loose,
    #[serde(rename = "intHomeScore")]
    pub home_score: Loose,
    #[serde(rename = "intAwayScore")]
    pub away_score: Loose,
    #[serde(rename = "strVenue")]
    pub venue: Loose,
    #[serde(rename = "idLeague")]
    pub league_id: Loose,
    #[serde(rename = "strLeague")]
    pub league_name: Loose,
    #[serde(rename = "intRound")]
    pub round: Loose,
    #[serde(rename = "strHomeFormation")]
    pub home_formation: Loose,
    #[serde(rename = "strAwayFormation")]
    pub away_formation: Loose,
    #[serde(rename = "strHomeGoalDetails")]
    pub home_goal_details: Loose, // "12':Saka;67':Havertz;"
    #[serde(rename = "strAwayGoalDetails")]
    pub away_goal_details: Loose,
    #[serde(rename = "intHomeShots")]
    pub home_shots: Loose,
    #[serde(rename = "intAwayShots")]
    pub away_shots: Loose,
    #[serde(rename = "intHomePossession")]
    pub home_possession: Loose,
    #[serde(rename = "intAwayPossession")]
    pub away_possession: Loose,
}

// ---------------------------------------------------------------------------
// Match detail  (lookuplineup.php, lookuptimeline.php, lookupeventstats.php)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LineupResponse {
    #[serde(deserialize_with = "list")]
    pub lineup: Vec<SdbLineupEntry>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbLineupEntry {
    #[serde(rename = "idPlayer")]
    pub player_id: Loose,
    #[serde(rename = "strPlayer")]
    pub player_name: Loose,
    #[serde(rename = "idTeam")]
    pub team_id: Loose,
    #[serde(rename = "strTeam")]
    pub team_name: Loose,
    #[serde(rename = "strPosition")]
    pub position: Loose,
    #[serde(rename = "strPositionShort")]
    pub position_short: Loose,
    #[serde(rename = "intSquadNumber")]
    pub squad_number: Loose,
    #[serde(rename = "strSubstitute")]
    pub substitute: Loose, // "Yes" | "No"
    #[serde(rename = "strHome")]
    pub home: Loose, // "Yes" | "No"
    #[serde(rename = "strGrid")]
    pub grid: Loose, // "row:col", rarely populated
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TimelineResponse {
    #[serde(deserialize_with = "list")]
    pub timeline: Vec<SdbTimelineEntry>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbTimelineEntry {
    #[serde(rename = "strTimeline")]
    pub kind: Loose, // "Goal", "Card", "subst"
    #[serde(rename = "strTimelineDetail")]
    pub detail: Loose, // "Normal Goal", "Yellow Card"
    #[serde(rename = "strHome")]
    pub home: Loose,
    #[serde(rename = "intTime")]
    pub minute: Loose,
    #[serde(rename = "idPlayer")]
    pub player_id: Loose,
    #[serde(rename = "strPlayer")]
    pub player_name: Loose,
    #[serde(rename = "idAssist")]
    pub assist_id: Loose,
    #[serde(rename = "strAssist")]
    pub assist_name: Loose,
    #[serde(rename = "idTeam")]
    pub team_id: Loose,
    #[serde(rename = "strTeam")]
    pub team_name: Loose,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EventStatsResponse {
    #[serde(deserialize_with = "list")]
    pub eventstats: Vec<SdbEventStat>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SdbEventStat {
    #[serde(rename = "strStat")]
    pub kind: Loose,
    #[serde(rename = "intHome")]
    pub home: Loose,
    #[serde(rename = "intAway")]
    pub away: Loose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_accepts_strings_numbers_and_null() {
        let row: SdbTableRow = serde_json::from_str(
            r#"{"intRank": "1", "intPoints": 89, "strForm": null, "strGroup": "  "}"#,
        )
        .unwrap();
        assert_eq!(row.rank.parse::<u16>(), Some(1));
        assert_eq!(row.points.parse::<i32>(), Some(89));
        assert_eq!(row.form.get(), None);
        assert_eq!(row.group.get(), None);
        assert_eq!(row.team_id.get(), None);
    }

    #[test]
    fn loose_parses_float_formatted_integers() {
        assert_eq!(Loose::from("3.0").parse::<u16>(), Some(3));
        assert_eq!(Loose::from("3.5").parse::<u16>(), None);
    }

    #[test]
    fn null_and_string_lists_are_empty() {
        let null: TeamsResponse = serde_json::from_str(r#"{"teams": null}"#).unwrap();
        assert!(null.teams.is_empty());
        let text: PlayersResponse = serde_json::from_str(r#"{"player": "no data"}"#).unwrap();
        assert!(text.into_players().is_empty());
    }

    #[test]
    fn malformed_list_elements_are_skipped() {
        let raw: TeamsResponse =
            serde_json::from_str(r#"{"teams": [{"idTeam": "133604", "strTeam": "Arsenal"}, 7]}"#)
                .unwrap();
        assert_eq!(raw.teams.len(), 1);
        assert_eq!(raw.teams[0].name.get(), Some("Arsenal"));
    }

    #[test]
    fn yes_flags() {
        assert!(Loose::from("Yes").is_yes());
        assert!(!Loose::from("No").is_yes());
        assert!(!Loose::default().is_yes());
    }
}
