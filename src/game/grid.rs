use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
  pub x: i32,
  pub y: i32,
}

impl Cell {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  pub fn step(self, direction: Direction) -> Cell {
    let (dx, dy) = direction.delta();
    Cell {
      x: self.x + dx,
      y: self.y + dy,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  /// Parses the wire spelling used by `keydown` events. Anything else is not a direction.
  pub fn parse(value: &str) -> Option<Direction> {
    match value {
      "UP" => Some(Direction::Up),
      "DOWN" => Some(Direction::Down),
      "LEFT" => Some(Direction::Left),
      "RIGHT" => Some(Direction::Right),
      _ => None,
    }
  }

  fn delta(self) -> (i32, i32) {
    match self {
      Direction::Up => (0, -1),
      Direction::Down => (0, 1),
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
    }
  }
}

/// Fixed-size playing field. Cells outside `[0, width) x [0, height)` are walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
  width: i32,
  height: i32,
}

impl Board {
  pub fn new(width: u16, height: u16) -> Self {
    Self {
      width: i32::from(width.max(1)),
      height: i32::from(height.max(1)),
    }
  }

  pub fn width(&self) -> i32 {
    self.width
  }

  pub fn height(&self) -> i32 {
    self.height
  }

  pub fn contains(&self, cell: Cell) -> bool {
    cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
  }

  pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
    (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell { x, y }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn step_moves_one_unit_along_axis() {
    let origin = Cell::new(5, 5);
    assert_eq!(origin.step(Direction::Up), Cell::new(5, 4));
    assert_eq!(origin.step(Direction::Down), Cell::new(5, 6));
    assert_eq!(origin.step(Direction::Left), Cell::new(4, 5));
    assert_eq!(origin.step(Direction::Right), Cell::new(6, 5));
  }

  #[test]
  fn board_bounds_are_half_open() {
    let board = Board::new(20, 20);
    assert!(board.contains(Cell::new(0, 0)));
    assert!(board.contains(Cell::new(19, 19)));
    assert!(!board.contains(Cell::new(20, 5)));
    assert!(!board.contains(Cell::new(5, 20)));
    assert!(!board.contains(Cell::new(-1, 0)));
    assert!(!board.contains(Cell::new(0, -1)));
  }

  #[test]
  fn parse_accepts_only_uppercase_names() {
    assert_eq!(Direction::parse("LEFT"), Some(Direction::Left));
    assert_eq!(Direction::parse("left"), None);
    assert_eq!(Direction::parse("NORTH"), None);
  }

  #[test]
  fn cells_covers_whole_board() {
    let board = Board::new(3, 2);
    let cells: Vec<Cell> = board.cells().collect();
    assert_eq!(cells.len(), 6);
    assert_eq!(cells[0], Cell::new(0, 0));
    assert_eq!(cells[5], Cell::new(2, 1));
  }

  #[test]
  fn direction_serializes_as_wire_name() {
    let json = serde_json::to_string(&Direction::Right).expect("json");
    assert_eq!(json, "\"RIGHT\"");
  }
}
