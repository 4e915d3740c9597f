//! Pitch geometry: lineup grid placement and heatmap points.

use crate::{Grid, HeatmapPoint};
use rand::Rng;
use serde::Serialize;

/// Vertical offset (percent of pitch height) per grid row:
/// goalkeeper, defenders, midfielders, forwards, extra forwards.
const ROW_OFFSETS: [f64; 5] = [5.0, 20.0, 45.0, 70.0, 90.0];
const UNKNOWN_ROW_OFFSET: f64 = 50.0;

const HEATMAP_POINTS: usize = 50;

/// Position on the lineup diagram, both axes in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchPosition {
    pub x: f64,
    pub y: f64,
}

/// Parse a provider "row:col" cell. Both parts must be positive integers.
pub fn parse_grid(raw: &str) -> Option<Grid> {
    let (row, col) = raw.trim().split_once(':')?;
    let row: u8 = row.trim().parse().ok()?;
    let col: u8 = col.trim().parse().ok()?;
    (row > 0 && col > 0).then_some(Grid { row, col })
}

/// Players per line for a formation such as "4-3-3". Unparseable parts are skipped.
pub fn formation_lines(formation: &str) -> Vec<u8> {
    formation
        .split('-')
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .filter(|n| *n > 0)
        .collect()
}

/// Place a grid cell on the diagram. Row 1 is the goalkeeper; row `r` holds
/// `formation[r - 2]` players, spread evenly across the width. The away side
/// is mirrored vertically.
pub fn grid_position(grid: Grid, formation: &str, is_home: bool) -> PitchPosition {
    let row = usize::from(grid.row);
    let lines = formation_lines(formation);

    let mut y = row
        .checked_sub(1)
        .and_then(|i| ROW_OFFSETS.get(i).copied())
        .unwrap_or(UNKNOWN_ROW_OFFSET);

    let players_in_line = if row <= 1 {
        1
    } else {
        lines.get(row - 2).copied().unwrap_or(1)
    };
    let x = f64::from(grid.col) * 100.0 / (f64::from(players_in_line) + 1.0);

    if !is_home {
        y = 100.0 - y;
    }
    PitchPosition { x, y }
}

/// Synthetic heatmap. The provider has no positional data, so points are
/// scattered over the central area of the pitch.
pub fn synthetic_heatmap<R: Rng + ?Sized>(rng: &mut R) -> Vec<HeatmapPoint> {
    (0..HEATMAP_POINTS)
        .map(|_| HeatmapPoint {
            x: rng.gen_range(20.0..80.0),
            y: rng.gen_range(4.0..64.0),
        })
        .collect()
}
