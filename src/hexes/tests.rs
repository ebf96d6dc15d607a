use super::*;

fn grid(text: &str) -> Coords {
    Coords::parse(text).unwrap()
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::N => Direction::S,
        Direction::NE => Direction::SW,
        Direction::SE => Direction::NW,
        Direction::S => Direction::N,
        Direction::SW => Direction::NE,
        Direction::NW => Direction::SE,
    }
}

#[test]
fn every_direction_is_undone_by_its_opposite() {
    for row in 1..=21 {
        for column in 1..=10 {
            let origin = GlobalHex { column, row: row + 21 };
            for direction in Direction::ALL {
                let back = origin.neighbor(direction).neighbor(opposite(direction));
                assert_eq!(back, origin, "{direction} from column {column} row {row}");
            }
        }
    }
}

#[test]
fn vectors_follow_column_parity() {
    assert_eq!(vector(2, Direction::NE), (1, 0));
    assert_eq!(vector(2, Direction::SE), (1, 1));
    assert_eq!(vector(1, Direction::NE), (1, -1));
    assert_eq!(vector(1, Direction::SE), (1, 0));
    assert_eq!(vector(1, Direction::N), (0, -1));
    assert_eq!(vector(2, Direction::S), (0, 1));
}

#[test]
fn neighbors_stay_inside_a_grid() {
    assert_eq!(neighbor(&grid("QQ 0909"), Direction::N), Some(grid("QQ 0908")));
    assert_eq!(neighbor(&grid("QQ 0909"), Direction::NE), Some(grid("QQ 1008")));
    assert_eq!(neighbor(&grid("QQ 1010"), Direction::SE), Some(grid("QQ 1111")));
    assert_eq!(neighbor(&grid("QQ 1010"), Direction::SW), Some(grid("QQ 0911")));
}

#[test]
fn neighbors_cross_grid_boundaries() {
    assert_eq!(neighbor(&grid("QQ 3005"), Direction::SE), Some(grid("QR 0106")));
    assert_eq!(neighbor(&grid("QQ 0101"), Direction::N), Some(grid("PQ 0121")));
    assert_eq!(neighbor(&grid("QQ 0521"), Direction::S), Some(grid("RQ 0501")));
    assert_eq!(neighbor(&grid("AA 0101"), Direction::N), None);
}

#[test]
fn walk_resolves_two_hex_paths_and_ignores_unknown_origins() {
    assert_eq!(
        walk(&grid("QQ 1010"), &[Direction::N, Direction::N]),
        Some(grid("QQ 1008"))
    );
    assert_eq!(walk(&Coords::NotApplicable, &[Direction::N]), None);
    assert_eq!(walk(&Coords::Obscured { column: 9, row: 9 }, &[Direction::N]), None);
}

#[test]
fn directions_parse_their_own_labels() {
    for direction in Direction::ALL {
        assert_eq!(Direction::parse(direction.as_str()), Some(direction));
    }
    assert_eq!(Direction::parse("E"), None);
}
