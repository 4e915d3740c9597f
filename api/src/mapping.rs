//! Mapping: TheSportsDB wire types → clean view-model types.
//!
//! Every mapper is pure. Records missing an identity field (id or name) map to
//! `None` and are dropped from collections; optional fields fall back to
//! `None` or a placeholder image.

use crate::images::{clean_image_url, player_photo, team_logo};
use crate::pitch::parse_grid;
use crate::sportsdb::{
    Loose, SdbEvent, SdbEventStat, SdbFormerTeam, SdbLeague, SdbLineupEntry, SdbPlayer,
    SdbTableRow, SdbTeam, SdbTimelineEntry,
};
use crate::{
    CareerEntry, EventKind, Fixture, FixtureKind, FixtureSummary, FormResult, GamesPlayed,
    GoalCounts, GoalTally, Goals, League, LeagueRef, Lineup, LineupPlayer, Match, MatchEvent,
    MatchStatus, Player, PlayerRef, PlayerStats, Standing, StandingGroup, StandingRecord,
    StatLine, Team, TeamRef, TeamStatistics,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::warn;

/// Group label for standings rows the provider does not tag.
pub const DEFAULT_GROUP: &str = "League Table";
/// Formation shown when the provider has none.
pub const UNKNOWN_FORMATION: &str = "N/A";
/// Fixture history length on team pages.
pub const HISTORY_LEN: usize = 10;

fn identity(id: &Loose, name: &Loose) -> Option<(String, String)> {
    Some((id.owned()?, name.owned()?))
}

/// First run of ASCII digits in `s`: "Round 5" -> 5, "45+2" -> 45.
pub fn first_number(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// Leagues and teams
// ---------------------------------------------------------------------------

pub fn map_league(raw: &SdbLeague) -> Option<League> {
    let (id, name) = identity(&raw.id, &raw.name)?;
    Some(League {
        id,
        name,
        logo: clean_image_url(raw.badge.get()).or_else(|| clean_image_url(raw.logo.get())),
        country: raw.country.owned(),
        description: raw.description.owned(),
        banner: clean_image_url(raw.banner.get()),
        trophy: clean_image_url(raw.trophy.get()),
    })
}

pub fn map_team(raw: &SdbTeam) -> Option<Team> {
    let (id, name) = identity(&raw.id, &raw.name)?;
    Some(Team {
        id,
        name,
        logo: team_logo(&[raw.badge.get(), raw.team_badge.get()]),
        stadium: raw.stadium.owned(),
        country: raw.country.owned(),
        description: raw.description.owned(),
    })
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

/// Keep only W/D/L results; the provider separates them inconsistently.
pub fn parse_form(raw: &str) -> Vec<FormResult> {
    raw.chars().filter_map(FormResult::from_char).collect()
}

pub fn map_standing(raw: &SdbTableRow) -> Option<Standing> {
    let (id, name) = identity(&raw.team_id, &raw.team_name)?;
    let standing = Standing {
        rank: raw.rank.parse().unwrap_or_default(),
        team: TeamRef {
            id,
            name,
            logo: team_logo(&[raw.badge.get(), raw.team_badge.get()]),
        },
        points: raw.points.parse().unwrap_or_default(),
        goals_diff: raw.goal_difference.parse().unwrap_or_default(),
        form: raw.form.get().map(parse_form).unwrap_or_default(),
        group: raw.group.or(DEFAULT_GROUP),
        all: StandingRecord {
            played: raw.played.parse().unwrap_or_default(),
            win: raw.win.parse().unwrap_or_default(),
            draw: raw.draw.parse().unwrap_or_default(),
            lose: raw.loss.parse().unwrap_or_default(),
            goals: GoalCounts {
                scored: raw.goals_for.parse().unwrap_or_default(),
                conceded: raw.goals_against.parse().unwrap_or_default(),
            },
        },
    };
    if !standing.is_consistent() {
        warn!(
            "standing row for {} is inconsistent: played {} (W{} D{} L{}), goal difference {} ({}-{})",
            standing.team.name,
            standing.all.played,
            standing.all.win,
            standing.all.draw,
            standing.all.lose,
            standing.goals_diff,
            standing.all.goals.scored,
            standing.all.goals.conceded,
        );
    }
    Some(standing)
}

/// Group rows by their group label, groups in order of first appearance and
/// rows sorted by rank within each group.
pub fn group_standings(rows: Vec<Standing>) -> Vec<StandingGroup> {
    let mut groups: Vec<StandingGroup> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|g| g.name == row.group) {
            Some(group) => group.rows.push(row),
            None => groups.push(StandingGroup {
                name: row.group.clone(),
                rows: vec![row],
            }),
        }
    }
    for group in &mut groups {
        group.rows.sort_by_key(|r| r.rank);
    }
    groups
}

pub fn map_standings(raw: &[SdbTableRow]) -> Vec<StandingGroup> {
    group_standings(raw.iter().filter_map(map_standing).collect())
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Whole years between `birth` and `today`, birthday aware.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

pub fn map_player(raw: &SdbPlayer, today: NaiveDate) -> Option<Player> {
    let (id, name) = identity(&raw.id, &raw.name)?;
    let birth_date = raw.born.get().and_then(parse_date);
    let statistics: Vec<PlayerStats> = map_player_stats(raw).into_iter().collect();
    let current_club = statistics.first().map(|s| &s.team);
    let career = map_career(current_club, &raw.signed, &[]);

    Some(Player {
        id,
        name,
        age: birth_date.and_then(|b| age_on(b, today)),
        birth_date,
        nationality: raw.nationality.owned(),
        height: raw.height.owned(),
        weight: raw.weight.owned(),
        photo: player_photo(&[raw.cutout.get(), raw.thumb.get()]),
        number: raw.number.owned(),
        position: raw.position.owned(),
        team_id: raw.team_id.owned(),
        statistics,
        career,
        biography: raw.description.owned(),
        external_id: raw.transfermarkt_id.owned(),
    })
}

/// The provider carries one aggregate block per player for the current club.
fn map_player_stats(raw: &SdbPlayer) -> Option<PlayerStats> {
    let (team_id, team_name) = identity(&raw.team_id, &raw.team_name)?;
    let (league_id, league_name) = identity(&raw.league_id, &raw.league_name)
        .or_else(|| identity(&raw.league2_id, &raw.league2_name))
        .unwrap_or_default();

    Some(PlayerStats {
        team: TeamRef {
            id: team_id,
            name: team_name,
            logo: team_logo(&[]),
        },
        league: LeagueRef {
            id: league_id,
            name: league_name,
            logo: None,
        },
        games: GamesPlayed {
            appearances: raw.appearances.parse(),
            minutes: None,
            position: raw.position.owned(),
        },
        goals: GoalTally {
            total: raw.goals.parse(),
            assists: raw.assists.parse(),
        },
    })
}

/// Soccer players only; records without a sport are kept.
pub fn is_soccer(raw: &SdbPlayer) -> bool {
    raw.sport
        .get()
        .is_none_or(|s| s.eq_ignore_ascii_case("soccer"))
}

/// Career, most recent first: the current club (open-ended) then former clubs.
pub fn map_career(current: Option<&TeamRef>, signed: &Loose, former: &[SdbFormerTeam]) -> Vec<CareerEntry> {
    let current = current.map(|team| CareerEntry {
        team: team.clone(),
        start: signed.get().map(|s| s.get(..4).unwrap_or(s).to_owned()),
        end: None,
    });

    let former = former.iter().rev().filter_map(|f| {
        let (id, name) = identity(&f.team_id, &f.team_name)?;
        Some(CareerEntry {
            team: TeamRef {
                id,
                name,
                logo: team_logo(&[f.badge.get()]),
            },
            start: f.joined.owned(),
            end: f.departed.owned(),
        })
    });

    current.into_iter().chain(former).collect()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn parse_status(raw: Option<&str>, goals: Goals) -> MatchStatus {
    match raw.map(str::trim) {
        Some("Match Finished" | "FT" | "AET" | "PEN" | "AP") => MatchStatus::Finished,
        Some("Not Started" | "NS" | "TBD") => MatchStatus::NotStarted,
        Some("1H" | "2H" | "HT" | "ET" | "BT" | "P" | "Live" | "In Progress") => {
            MatchStatus::InPlay
        }
        Some("Postponed" | "PST" | "Match Postponed") => MatchStatus::Postponed,
        Some("Cancelled" | "CANC" | "Abandoned" | "ABD" | "Match Cancelled") => {
            MatchStatus::Cancelled
        }
        None if goals.home.is_some() && goals.away.is_some() => MatchStatus::Finished,
        None => MatchStatus::NotStarted,
        Some(_) => MatchStatus::Unknown,
    }
}

/// Kickoff in UTC: `strTimestamp` first, then `dateEvent` + `strTime`.
/// A date without a usable time is taken as midnight.
pub fn parse_kickoff(raw: &SdbEvent) -> Option<DateTime<Utc>> {
    if let Some(ts) = raw.timestamp.get() {
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
                return Some(dt.and_utc());
            }
        }
    }

    let date = raw.date.get().and_then(parse_date)?;
    let time = raw
        .time
        .get()
        .and_then(|t| {
            let t = t.get(..8).unwrap_or(t);
            NaiveTime::parse_from_str(t, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()
        })
        .unwrap_or_default();
    Some(date.and_time(time).and_utc())
}

pub fn map_fixture(raw: &SdbEvent) -> Option<Fixture> {
    let id = raw.id.owned()?;
    let (home_id, home_name) = identity(&raw.home_id, &raw.home_name)?;
    let (away_id, away_name) = identity(&raw.away_id, &raw.away_name)?;

    let goals = Goals {
        home: raw.home_score.parse(),
        away: raw.away_score.parse(),
    };

    Some(Fixture {
        id,
        date: parse_kickoff(raw),
        status: parse_status(raw.status.get(), goals),
        home: TeamRef {
            id: home_id,
            name: home_name,
            logo: team_logo(&[raw.home_badge.get()]),
        },
        away: TeamRef {
            id: away_id,
            name: away_name,
            logo: team_logo(&[raw.away_badge.get()]),
        },
        goals,
        venue: raw.venue.owned(),
        league: raw.league_name.owned(),
        round: raw.round.owned(),
        summary: None,
    })
}

/// The fixture as seen by `team_id`; `None` when the team did not play in it.
pub fn summarize_for(fixture: &Fixture, team_id: &str, kind: FixtureKind) -> Option<FixtureSummary> {
    let is_home = if fixture.home.id == team_id {
        true
    } else if fixture.away.id == team_id {
        false
    } else {
        return None;
    };
    let opponent = if is_home { &fixture.away } else { &fixture.home };

    let (score, result) = match (kind, fixture.goals.home, fixture.goals.away) {
        (FixtureKind::Result, Some(home), Some(away)) => {
            let (ours, theirs) = if is_home { (home, away) } else { (away, home) };
            let result = match ours.cmp(&theirs) {
                std::cmp::Ordering::Greater => FormResult::Win,
                std::cmp::Ordering::Equal => FormResult::Draw,
                std::cmp::Ordering::Less => FormResult::Loss,
            };
            (Some(format!("{home}-{away}")), Some(result))
        }
        _ => (None, None),
    };

    Some(FixtureSummary {
        kind,
        opponent: opponent.clone(),
        is_home,
        competition: fixture.league.clone(),
        score,
        result,
    })
}

/// Team page history: the most recent results (newest first, at most
/// [`HISTORY_LEN`]) followed by upcoming fixtures (soonest first), each with
/// a summary from the team's point of view.
pub fn team_history(past: Vec<Fixture>, upcoming: Vec<Fixture>, team_id: &str) -> Vec<Fixture> {
    let with_summary = |mut f: Fixture, kind| {
        f.summary = Some(summarize_for(&f, team_id, kind)?);
        Some(f)
    };

    let mut results: Vec<Fixture> = past
        .into_iter()
        .filter_map(|f| with_summary(f, FixtureKind::Result))
        .collect();
    results.sort_by(|a, b| b.date.cmp(&a.date));
    results.truncate(HISTORY_LEN);

    let mut next: Vec<Fixture> = upcoming
        .into_iter()
        .filter_map(|f| with_summary(f, FixtureKind::Upcoming))
        .collect();
    next.sort_by(|a, b| a.date.cmp(&b.date));

    results.extend(next);
    results
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

fn side_is_home(home_flag: &Loose, team_id: &Loose, fixture: &Fixture) -> bool {
    match home_flag.get() {
        Some(_) => home_flag.is_yes(),
        None => team_id.get() == Some(fixture.home.id.as_str()),
    }
}

fn map_lineup_player(raw: &SdbLineupEntry) -> Option<LineupPlayer> {
    let (id, name) = identity(&raw.player_id, &raw.player_name)?;
    Some(LineupPlayer {
        id,
        name,
        number: raw.squad_number.parse(),
        position: raw.position.owned().or_else(|| raw.position_short.owned()),
        grid: raw.grid.get().and_then(parse_grid),
    })
}

/// Home and away lineups, or nothing when the provider has no lineup.
pub fn map_lineups(entries: &[SdbLineupEntry], fixture: &Fixture, event: &SdbEvent) -> Vec<Lineup> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut home = Lineup {
        team: fixture.home.clone(),
        formation: event.home_formation.or(UNKNOWN_FORMATION),
        ..Default::default()
    };
    let mut away = Lineup {
        team: fixture.away.clone(),
        formation: event.away_formation.or(UNKNOWN_FORMATION),
        ..Default::default()
    };

    for entry in entries {
        let Some(player) = map_lineup_player(entry) else {
            continue;
        };
        let side = if side_is_home(&entry.home, &entry.team_id, fixture) {
            &mut home
        } else {
            &mut away
        };
        if entry.substitute.is_yes() {
            side.substitutes.push(player);
        } else {
            side.start_xi.push(player);
        }
    }

    vec![home, away]
}

fn event_kind(raw: &str) -> EventKind {
    match raw.to_ascii_lowercase().as_str() {
        "goal" => EventKind::Goal,
        "card" => EventKind::Card,
        "subst" | "substitution" => EventKind::Substitution,
        _ => EventKind::Other,
    }
}

fn player_ref(id: &Loose, name: &Loose) -> Option<PlayerRef> {
    Some(PlayerRef {
        id: id.owned().unwrap_or_default(),
        name: name.owned()?,
    })
}

pub fn map_timeline_event(raw: &SdbTimelineEntry, fixture: &Fixture) -> Option<MatchEvent> {
    let player = player_ref(&raw.player_id, &raw.player_name)?;
    let team = if side_is_home(&raw.home, &raw.team_id, fixture) {
        fixture.home.clone()
    } else {
        fixture.away.clone()
    };
    let kind = raw.kind.get().map(event_kind).unwrap_or_default();

    Some(MatchEvent {
        elapsed: raw
            .minute
            .get()
            .and_then(first_number)
            .and_then(|m| u16::try_from(m).ok())
            .unwrap_or_default(),
        team,
        player,
        assist: player_ref(&raw.assist_id, &raw.assist_name),
        kind,
        detail: raw.detail.or(match kind {
            EventKind::Goal => "Goal",
            EventKind::Card => "Card",
            EventKind::Substitution => "Substitution",
            EventKind::Other => "",
        }),
    })
}

/// Goal events from a `"12':Saka;67':Havertz;"` details string.
pub fn goals_from_details(details: &str, team: &TeamRef) -> Vec<MatchEvent> {
    details
        .split(';')
        .filter_map(|entry| {
            let (minute, name) = entry.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(MatchEvent {
                elapsed: first_number(minute).and_then(|m| u16::try_from(m).ok())?,
                team: team.clone(),
                player: PlayerRef {
                    id: String::new(),
                    name: name.to_owned(),
                },
                assist: None,
                kind: EventKind::Goal,
                detail: "Goal".to_owned(),
            })
        })
        .collect()
}

/// Timeline events, falling back to the event's goal details when the
/// provider timeline is empty. Sorted by elapsed minute.
pub fn map_events(timeline: &[SdbTimelineEntry], fixture: &Fixture, event: &SdbEvent) -> Vec<MatchEvent> {
    let mut events: Vec<MatchEvent> = timeline
        .iter()
        .filter_map(|t| map_timeline_event(t, fixture))
        .collect();

    if events.is_empty() {
        let home = event.home_goal_details.get().unwrap_or_default();
        let away = event.away_goal_details.get().unwrap_or_default();
        events.extend(goals_from_details(home, &fixture.home));
        events.extend(goals_from_details(away, &fixture.away));
    }

    events.sort_by_key(|e| e.elapsed);
    events
}

fn split_sides(rows: Vec<(String, String, String)>, fixture: &Fixture) -> Vec<TeamStatistics> {
    if rows.is_empty() {
        return Vec::new();
    }
    let (home, away): (Vec<StatLine>, Vec<StatLine>) = rows
        .into_iter()
        .map(|(kind, home, away)| {
            (
                StatLine { kind: kind.clone(), value: home },
                StatLine { kind, value: away },
            )
        })
        .unzip();
    vec![
        TeamStatistics { team: fixture.home.clone(), lines: home },
        TeamStatistics { team: fixture.away.clone(), lines: away },
    ]
}

pub fn map_event_stats(stats: &[SdbEventStat], fixture: &Fixture) -> Vec<TeamStatistics> {
    let rows = stats
        .iter()
        .filter_map(|s| Some((s.kind.owned()?, s.home.or("0"), s.away.or("0"))))
        .collect();
    split_sides(rows, fixture)
}

fn as_percent(value: String) -> String {
    if value.ends_with('%') { value } else { format!("{value}%") }
}

/// Shots and possession from the event record itself.
pub fn stats_from_event(event: &SdbEvent, fixture: &Fixture) -> Vec<TeamStatistics> {
    let mut rows = Vec::new();
    if event.home_shots.get().is_some() || event.away_shots.get().is_some() {
        rows.push((
            "Total Shots".to_owned(),
            event.home_shots.or("0"),
            event.away_shots.or("0"),
        ));
    }
    if event.home_possession.get().is_some() || event.away_possession.get().is_some() {
        rows.push((
            "Ball Possession".to_owned(),
            as_percent(event.home_possession.or("0")),
            as_percent(event.away_possession.or("0")),
        ));
    }
    split_sides(rows, fixture)
}

/// Assemble a match from its event and detail responses.
pub fn map_match(
    event: &SdbEvent,
    lineup: &[SdbLineupEntry],
    timeline: &[SdbTimelineEntry],
    stats: &[SdbEventStat],
) -> Option<Match> {
    let fixture = map_fixture(event)?;
    let mut statistics = map_event_stats(stats, &fixture);
    if statistics.is_empty() {
        statistics = stats_from_event(event, &fixture);
    }

    Some(Match {
        lineups: map_lineups(lineup, &fixture, event),
        events: map_events(timeline, &fixture, event),
        statistics,
        fixture,
    })
}
