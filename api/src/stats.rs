//! Match statistic comparison and standings helpers.

use crate::{Standing, StatLine, TeamRef};
use serde::Serialize;
use std::collections::HashMap;

/// Parse a statistic value for bar rendering: "60%" -> 60, "12" -> 12,
/// anything unparseable -> 0.
pub fn stat_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Two-sided proportional bar, in percent. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatBar {
    pub home: f64,
    pub away: f64,
}

impl StatBar {
    pub fn split(home: f64, away: f64) -> Self {
        let total = home + away;
        if total <= 0.0 {
            return StatBar { home: 50.0, away: 50.0 };
        }
        let home_pct = home / total * 100.0;
        StatBar { home: home_pct, away: 100.0 - home_pct }
    }

    pub fn from_values(home: &str, away: &str) -> Self {
        Self::split(stat_value(home), stat_value(away))
    }
}

/// One row of the match statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatComparison {
    pub kind: String,
    pub home: String,
    pub away: String,
    pub bar: StatBar,
}

/// Rows for the union of statistic types, in first-seen order (home first).
/// A side missing a statistic shows "0".
pub fn compare_statistics(home: &[StatLine], away: &[StatLine]) -> Vec<StatComparison> {
    let mut kinds: Vec<&str> = Vec::new();
    for line in home.iter().chain(away) {
        if !kinds.contains(&line.kind.as_str()) {
            kinds.push(&line.kind);
        }
    }

    let value_of = |lines: &[StatLine], kind: &str| -> String {
        lines
            .iter()
            .find(|l| l.kind == kind)
            .map(|l| l.value.clone())
            .unwrap_or_else(|| "0".to_owned())
    };

    kinds
        .into_iter()
        .map(|kind| {
            let home_value = value_of(home, kind);
            let away_value = value_of(away, kind);
            StatComparison {
                kind: kind.to_owned(),
                bar: StatBar::from_values(&home_value, &away_value),
                home: home_value,
                away: away_value,
            }
        })
        .collect()
}

/// Season-over-season points comparison for a team near the top of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingComparison {
    pub team: TeamRef,
    pub current_points: i32,
    pub previous_points: Option<i32>,
    pub difference: Option<i32>,
}

/// Compare the top three of `current` against the same teams in `previous`.
/// Empty when either table is empty.
pub fn compare_standings(current: &[Standing], previous: &[Standing]) -> Vec<StandingComparison> {
    if current.is_empty() || previous.is_empty() {
        return Vec::new();
    }

    let previous_points: HashMap<&str, i32> = previous
        .iter()
        .map(|s| (s.team.id.as_str(), s.points))
        .collect();

    let mut top: Vec<&Standing> = current.iter().filter(|s| (1..=3).contains(&s.rank)).collect();
    top.sort_by_key(|s| s.rank);

    top.into_iter()
        .map(|s| {
            let previous = previous_points.get(s.team.id.as_str()).copied();
            StandingComparison {
                team: s.team.clone(),
                current_points: s.points,
                previous_points: previous,
                difference: previous.map(|p| s.points - p),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kind: &str, value: &str) -> StatLine {
        StatLine { kind: kind.into(), value: value.into() }
    }

    fn row(id: &str, rank: u16, points: i32) -> Standing {
        Standing {
            rank,
            points,
            team: TeamRef { id: id.into(), name: id.into(), logo: String::new() },
            ..Default::default()
        }
    }

    #[test]
    fn percentage_pair_splits_proportionally() {
        let bar = StatBar::from_values("60%", "40%");
        assert_eq!(bar, StatBar { home: 60.0, away: 40.0 });
    }

    #[test]
    fn zero_pair_splits_evenly() {
        let bar = StatBar::from_values("0", "0");
        assert_eq!(bar, StatBar { home: 50.0, away: 50.0 });
        assert!(!bar.home.is_nan());
    }

    #[test]
    fn unparseable_values_count_as_zero() {
        assert_eq!(stat_value("N/A"), 0.0);
        assert_eq!(stat_value(""), 0.0);
        assert_eq!(stat_value(" 55 % "), 55.0);
        assert_eq!(StatBar::from_values("abc", "3"), StatBar { home: 0.0, away: 100.0 });
    }

    #[test]
    fn comparison_covers_union_of_types() {
        let home = vec![line("Ball Possession", "58%"), line("Total Shots", "14")];
        let away = vec![line("Ball Possession", "42%"), line("Corner Kicks", "5")];
        let rows = compare_statistics(&home, &away);

        let kinds: Vec<&str> = rows.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Ball Possession", "Total Shots", "Corner Kicks"]);
        assert_eq!(rows[1].away, "0");
        assert_eq!(rows[1].bar, StatBar { home: 100.0, away: 0.0 });
        assert_eq!(rows[2].home, "0");
    }

    #[test]
    fn standings_comparison_uses_top_three() {
        let current = vec![row("a", 1, 80), row("b", 2, 75), row("c", 3, 70), row("d", 4, 60)];
        let previous = vec![row("a", 2, 70), row("b", 1, 82)];
        let cmp = compare_standings(&current, &previous);

        assert_eq!(cmp.len(), 3);
        assert_eq!(cmp[0].difference, Some(10));
        assert_eq!(cmp[1].difference, Some(-7));
        assert_eq!(cmp[2].previous_points, None);
        assert_eq!(cmp[2].difference, None);
    }

    #[test]
    fn standings_comparison_needs_both_tables() {
        assert!(compare_standings(&[row("a", 1, 10)], &[]).is_empty());
    }
}
