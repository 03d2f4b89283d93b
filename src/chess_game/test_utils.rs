use super::model::{ChessSquare, MoveRecord};

/// Compares a generated move list against the expected coordinate strings,
/// ignoring generation order.
pub fn assert_move_list(moves: impl Iterator<Item = MoveRecord>, expected: Vec<&str>) {
    let mut actual: Vec<String> = moves.map(|m| m.as_algebraic()).collect();
    let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}

pub fn assert_destinations(squares: impl Iterator<Item = ChessSquare>, expected: Vec<&str>) {
    let mut actual: Vec<String> = squares.map(|s| s.as_algebraic()).collect();
    let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}
