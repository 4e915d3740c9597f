//! Shot-text parser for AI-generated shot maps.
//!
//! Each line is nominally `"x,y,teamId,type,playerId,playerName"`. The source
//! is a language model, so every line is validated on its own and bad lines
//! are dropped without affecting the rest.

use crate::{PITCH_LENGTH, PITCH_WIDTH, Shot, ShotOutcome, ShotPlayer};
use log::warn;
use std::fmt;

const MIN_FIELDS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotParse {
    pub shots: Vec<Shot>,
    pub discarded: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShotLineError {
    TooFewFields(usize),
    BadCoordinate(String),
    OutOfBounds { x: f64, y: f64 },
    BadId(String),
    UnknownOutcome(String),
    EmptyName,
}

impl fmt::Display for ShotLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotLineError::TooFewFields(n) => write!(f, "expected {MIN_FIELDS} fields, got {n}"),
            ShotLineError::BadCoordinate(raw) => write!(f, "coordinate is not a number: {raw:?}"),
            ShotLineError::OutOfBounds { x, y } => write!(f, "({x}, {y}) is off the pitch"),
            ShotLineError::BadId(raw) => write!(f, "id is not an integer: {raw:?}"),
            ShotLineError::UnknownOutcome(raw) => write!(f, "unknown shot type: {raw:?}"),
            ShotLineError::EmptyName => write!(f, "player name is empty"),
        }
    }
}

/// Parse one line. Fields past the fifth form the player name, so names
/// containing commas survive.
pub fn parse_shot_line(line: &str) -> Result<Shot, ShotLineError> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < MIN_FIELDS {
        return Err(ShotLineError::TooFewFields(parts.len()));
    }

    let x = parse_coordinate(parts[0])?;
    let y = parse_coordinate(parts[1])?;
    if !(0.0..=PITCH_LENGTH).contains(&x) || !(0.0..=PITCH_WIDTH).contains(&y) {
        return Err(ShotLineError::OutOfBounds { x, y });
    }

    let team_id = parse_id(parts[2])?;
    // Shot type must match exactly, whitespace included.
    let outcome = ShotOutcome::parse(parts[3])
        .ok_or_else(|| ShotLineError::UnknownOutcome(parts[3].to_owned()))?;
    let player_id = parse_id(parts[4])?;

    let name = parts[5..].join(",");
    let name = name.trim();
    if name.is_empty() {
        return Err(ShotLineError::EmptyName);
    }

    Ok(Shot {
        x,
        y,
        team_id,
        outcome,
        player: ShotPlayer { id: player_id, name: name.to_owned() },
    })
}

/// Best-effort parse of every line. Never fails; rejected lines are logged
/// and counted.
pub fn parse_shots<I, S>(lines: I) -> ShotParse
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().fold(ShotParse::default(), |mut acc, line| {
        let line = line.as_ref();
        match parse_shot_line(line) {
            Ok(shot) => acc.shots.push(shot),
            Err(e) => {
                warn!("discarding shot line {line:?}: {e}");
                acc.discarded += 1;
            }
        }
        acc
    })
}

fn parse_coordinate(raw: &str) -> Result<f64, ShotLineError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ShotLineError::BadCoordinate(raw.trim().to_owned()))
}

fn parse_id(raw: &str) -> Result<u64, ShotLineError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ShotLineError::BadId(raw.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_line_produces_one_shot() {
        let parsed = parse_shots(["85,34,42,Goal,278,K. Havertz"]);
        assert_eq!(parsed.discarded, 0);
        assert_eq!(
            parsed.shots,
            vec![Shot {
                x: 85.0,
                y: 34.0,
                team_id: 42,
                outcome: ShotOutcome::Goal,
                player: ShotPlayer { id: 278, name: "K. Havertz".into() },
            }]
        );
    }

    #[test]
    fn out_of_range_x_is_discarded() {
        let parsed = parse_shots(["200,34,42,Goal,278,K. Havertz"]);
        assert!(parsed.shots.is_empty());
        assert_eq!(parsed.discarded, 1);
    }

    #[test]
    fn pitch_edges_are_inclusive() {
        assert!(parse_shot_line("0,0,1,Miss,2,A").is_ok());
        assert!(parse_shot_line("105,68,1,Saved,2,A").is_ok());
        assert!(matches!(
            parse_shot_line("105,68.1,1,Saved,2,A"),
            Err(ShotLineError::OutOfBounds { .. })
        ));
        assert!(matches!(
            parse_shot_line("-0.5,10,1,Saved,2,A"),
            Err(ShotLineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn each_rejection_reason() {
        assert_eq!(parse_shot_line("1,2,3,Goal,5"), Err(ShotLineError::TooFewFields(5)));
        assert!(matches!(parse_shot_line("x,2,3,Goal,5,A"), Err(ShotLineError::BadCoordinate(_))));
        assert!(matches!(parse_shot_line("NaN,2,3,Goal,5,A"), Err(ShotLineError::BadCoordinate(_))));
        assert!(matches!(parse_shot_line("1,2,abc,Goal,5,A"), Err(ShotLineError::BadId(_))));
        assert!(matches!(parse_shot_line("1,2,3,Goal,5.5,A"), Err(ShotLineError::BadId(_))));
        assert!(matches!(parse_shot_line("1,2,3,goal,5,A"), Err(ShotLineError::UnknownOutcome(_))));
        assert!(matches!(parse_shot_line("1,2,3,Post,5,A"), Err(ShotLineError::UnknownOutcome(_))));
        assert_eq!(parse_shot_line("1,2,3,Goal,5,   "), Err(ShotLineError::EmptyName));
    }

    #[test]
    fn commas_in_names_are_rejoined() {
        let shot = parse_shot_line("50,30,7,Saved,11,Silva, Bernardo").unwrap();
        assert_eq!(shot.player.name, "Silva, Bernardo");
    }

    #[test]
    fn whitespace_around_numbers_and_names_is_tolerated() {
        let shot = parse_shot_line(" 90.5 , 30 , 42 ,Miss, 278 , Saka ").unwrap();
        assert_eq!(shot.x, 90.5);
        assert_eq!(shot.outcome, ShotOutcome::Miss);
        assert_eq!(shot.player.name, "Saka");
    }

    #[test]
    fn shot_type_must_match_exactly() {
        assert_eq!(
            parse_shot_line("90,30,42, Goal,278,Saka"),
            Err(ShotLineError::UnknownOutcome(" Goal".into()))
        );
        assert!(matches!(
            parse_shot_line("90,30,42,Goal ,278,Saka"),
            Err(ShotLineError::UnknownOutcome(_))
        ));
    }

    #[test]
    fn bad_lines_do_not_affect_good_ones() {
        let parsed = parse_shots(vec![
            "".to_owned(),
            "garbage".to_owned(),
            "85,34,42,Goal,278,K. Havertz".to_owned(),
            "10,10,43,Unknown,1,X".to_owned(),
            "20,60,43,Miss,9,Y".to_owned(),
        ]);
        assert_eq!(parsed.shots.len(), 2);
        assert_eq!(parsed.discarded, 3);
    }

    #[test]
    fn empty_input_is_empty_result() {
        let parsed = parse_shots(Vec::<String>::new());
        assert_eq!(parsed, ShotParse::default());
    }
}
