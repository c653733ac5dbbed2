pub mod calendar;
pub mod catalog;
pub mod engine;
mod parse;
pub mod progress;
pub mod render;
pub mod session;
pub mod share;

pub use engine::{Engine, MoveOutcome, Snapshot};
pub use parse::parse_to_level;
/// Error types returned by [`parse_to_level`].
pub use nom::error as nom_error;

use aglet::{Coord, CoordVec};
use ahash::AHashSet;

/// An immutable puzzle: a board plus where Lead and Echo start and finish.
#[derive(Debug, Clone)]
pub struct Level {
  id: String,
  name: String,
  board: Board,
  lead: Route,
  echo: Route,
  par: Option<u32>,
}

impl Level {
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    board: Board,
    lead: Route,
    echo: Route,
    par: Option<u32>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      board,
      lead,
      echo,
      par,
    }
  }

  /// The same puzzle under a different id and name.
  ///
  /// Daily puzzles are catalog levels relabelled with their date.
  pub fn relabel(
    &self,
    id: impl Into<String>,
    name: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      ..self.clone()
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn width(&self) -> u32 {
    self.board.width()
  }

  pub fn height(&self) -> u32 {
    self.board.height()
  }

  pub fn lead_start(&self) -> Coord {
    self.lead.start
  }

  pub fn echo_start(&self) -> Coord {
    self.echo.start
  }

  pub fn goal_lead(&self) -> Coord {
    self.lead.goal
  }

  pub fn goal_echo(&self) -> Coord {
    self.echo.goal
  }

  /// Advisory target move count. Never consulted by the engine.
  pub fn par(&self) -> Option<u32> {
    self.par
  }

  pub fn is_wall(&self, coord: Coord) -> bool {
    self.board.is_wall(coord)
  }

  /// In bounds and not a wall.
  pub fn is_open(&self, coord: Coord) -> bool {
    self.board.is_open(coord)
  }
}

/// Grid extent and wall tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
  width: u32,
  height: u32,
  walls: AHashSet<Coord>,
}

impl Board {
  pub fn new(
    width: u32,
    height: u32,
    walls: impl IntoIterator<Item = Coord>,
  ) -> Self {
    Self {
      width,
      height,
      walls: walls.into_iter().collect(),
    }
  }

  /// Build a board from rows of `#` (wall) and anything else (open floor).
  ///
  /// The width is taken from the longest row.
  pub fn from_rows(rows: &[&str]) -> Self {
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let walls = rows.iter().enumerate().flat_map(|(y, row)| {
      row
        .chars()
        .enumerate()
        .filter(|&(_, c)| c == '#')
        .map(move |(x, _)| Coord::new(x as _, y as _))
    });
    Self::new(width as u32, rows.len() as u32, walls)
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn walls(&self) -> &AHashSet<Coord> {
    &self.walls
  }

  pub fn in_bounds(&self, coord: Coord) -> bool {
    coord.x < self.width && coord.y < self.height
  }

  pub fn is_wall(&self, coord: Coord) -> bool {
    self.walls.contains(&coord)
  }

  pub fn is_open(&self, coord: Coord) -> bool {
    self.in_bounds(coord) && !self.is_wall(coord)
  }
}

/// Where a piece starts and where it has to end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
  pub start: Coord,
  pub goal: Coord,
}

impl Route {
  pub fn new(start: Coord, goal: Coord) -> Self {
    Self { start, goal }
  }
}

/// One player input. Up is towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  pub const ALL: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
  ];

  pub fn deltas(self) -> CoordVec {
    match self {
      Direction::Up => CoordVec::new(0, -1),
      Direction::Down => CoordVec::new(0, 1),
      Direction::Left => CoordVec::new(-1, 0),
      Direction::Right => CoordVec::new(1, 0),
    }
  }

  /// Single-letter notation used by move strings, `UDLR`.
  pub fn letter(self) -> char {
    match self {
      Direction::Up => 'U',
      Direction::Down => 'D',
      Direction::Left => 'L',
      Direction::Right => 'R',
    }
  }

  pub fn from_letter(c: char) -> Option<Self> {
    match c.to_ascii_uppercase() {
      'U' => Some(Direction::Up),
      'D' => Some(Direction::Down),
      'L' => Some(Direction::Left),
      'R' => Some(Direction::Right),
      _ => None,
    }
  }

  pub fn arrow(self) -> char {
    match self {
      Direction::Up => '↑',
      Direction::Down => '↓',
      Direction::Left => '←',
      Direction::Right => '→',
    }
  }
}

/// Parse a move string like `"RRDL"`. Whitespace is ignored.
///
/// On failure returns the first character that isn't a direction.
pub fn parse_moves(s: &str) -> Result<Vec<Direction>, char> {
  s.chars()
    .filter(|c| !c.is_whitespace())
    .map(|c| Direction::from_letter(c).ok_or(c))
    .collect()
}

/// Format moves back into `UDLR` notation.
pub fn format_moves(moves: &[Direction]) -> String {
  moves.iter().map(|d| d.letter()).collect()
}
