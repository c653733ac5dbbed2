//! What to show on each tile, and a plain-text board.

use aglet::Coord;

use crate::{Level, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
  Floor,
  Wall,
  LeadGoal,
  EchoGoal,
  /// Both goals on one tile.
  SharedGoal,
  Lead,
  Echo,
  /// Both pieces on one tile.
  Both,
}

impl Glyph {
  pub fn char(self) -> char {
    match self {
      Glyph::Floor => '.',
      Glyph::Wall => '#',
      Glyph::LeadGoal => 'l',
      Glyph::EchoGoal => 'e',
      Glyph::SharedGoal => '*',
      Glyph::Lead => 'L',
      Glyph::Echo => 'E',
      Glyph::Both => 'B',
    }
  }
}

/// Pieces draw over goals, goals over floor.
pub fn glyph_at(level: &Level, state: &Snapshot, coord: Coord) -> Glyph {
  let lead = state.lead == coord;
  let echo = state.echo == coord;
  let lead_goal = level.goal_lead() == coord;
  let echo_goal = level.goal_echo() == coord;
  match (lead, echo) {
    (true, true) => Glyph::Both,
    (true, false) => Glyph::Lead,
    (false, true) => Glyph::Echo,
    (false, false) if level.is_wall(coord) => Glyph::Wall,
    (false, false) => match (lead_goal, echo_goal) {
      (true, true) => Glyph::SharedGoal,
      (true, false) => Glyph::LeadGoal,
      (false, true) => Glyph::EchoGoal,
      (false, false) => Glyph::Floor,
    },
  }
}

/// One line per row, no trailing newline.
pub fn board_to_string(level: &Level, state: &Snapshot) -> String {
  (0..level.height())
    .map(|y| {
      (0..level.width())
        .map(|x| glyph_at(level, state, Coord::new(x, y)).char())
        .collect::<String>()
    })
    .collect::<Vec<_>>()
    .join("\n")
}
