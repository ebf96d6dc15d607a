use serde::Serialize;

use crate::model::Coords;

pub const GRID_COLUMNS: i32 = 30;
pub const GRID_ROWS: i32 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Direction {
    N,
    NE,
    SE,
    S,
    SW,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::N,
        Direction::NE,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::NW,
    ];

    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str() == text)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::NW => "NW",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::N => 0,
            Self::NE => 1,
            Self::SE => 2,
            Self::S => 3,
            Self::SW => 4,
            Self::NW => 5,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Edge {
    Canal,
    Ford,
    Pass,
    River,
    StonyRoad,
}

// (column, row) deltas, indexed by [column parity][direction]; row 0 is even columns.
const VECTORS: [[(i32, i32); 6]; 2] = [
    [(0, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0)],
    [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 0), (-1, -1)],
];

pub fn vector(column: i32, direction: Direction) -> (i32, i32) {
    VECTORS[column.rem_euclid(2) as usize][direction.index()]
}

/// A hex addressed on the whole map rather than within one grid. Both
/// axes are 1-based; grid `AA` holds columns 1..=30 and rows 1..=21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalHex {
    pub column: i32,
    pub row: i32,
}

impl GlobalHex {
    pub fn from_coords(coords: &Coords) -> Option<Self> {
        let (Some(grid), Some(column), Some(row)) = (coords.grid(), coords.column(), coords.row())
        else {
            return None;
        };
        // obscured hexes report `##`, which fails the letter check
        let letters = grid.as_bytes();
        if letters.len() != 2 || !letters.iter().all(u8::is_ascii_uppercase) {
            return None;
        }
        let (column, row) = (i32::from(column), i32::from(row));
        if !(1..=GRID_COLUMNS).contains(&column) || !(1..=GRID_ROWS).contains(&row) {
            return None;
        }

        let grid_row = i32::from(letters[0] - b'A');
        let grid_column = i32::from(letters[1] - b'A');
        Some(Self {
            column: grid_column * GRID_COLUMNS + column,
            row: grid_row * GRID_ROWS + row,
        })
    }

    pub fn to_coords(self) -> Option<Coords> {
        if self.column < 1 || self.row < 1 {
            return None;
        }
        let grid_column = (self.column - 1) / GRID_COLUMNS;
        let grid_row = (self.row - 1) / GRID_ROWS;
        if grid_column > 25 || grid_row > 25 {
            return None;
        }

        let grid = format!(
            "{}{}",
            char::from(b'A' + grid_row as u8),
            char::from(b'A' + grid_column as u8)
        );
        Some(Coords::Grid {
            grid,
            column: ((self.column - 1) % GRID_COLUMNS + 1) as u8,
            row: ((self.row - 1) % GRID_ROWS + 1) as u8,
        })
    }

    pub fn neighbor(self, direction: Direction) -> Self {
        let (dc, dr) = vector(self.column, direction);
        Self {
            column: self.column + dc,
            row: self.row + dr,
        }
    }
}

pub fn neighbor(coords: &Coords, direction: Direction) -> Option<Coords> {
    walk(coords, &[direction])
}

/// Follows `path` from `coords`. `N/A`, obscured and off-map results
/// resolve to `None`.
pub fn walk(coords: &Coords, path: &[Direction]) -> Option<Coords> {
    let mut hex = GlobalHex::from_coords(coords)?;
    for direction in path {
        hex = hex.neighbor(*direction);
    }
    hex.to_coords()
}

#[cfg(test)]
mod tests;
