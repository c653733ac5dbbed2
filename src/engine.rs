//! The delayed-echo simulation.
//!
//! Lead moves in the direction just input; Echo moves in the direction that
//! was input the turn before. Both are blocked silently by walls and by the
//! edge of the board.

use aglet::Coord;

use crate::{Direction, Level};

/// Everything that changes over the course of a play session.
///
/// Handed out by value, so holding one never lets the caller reach into the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
  pub lead: Coord,
  pub echo: Coord,
  /// The last direction that was applied. `None` only before the first move.
  pub previous_direction: Option<Direction>,
  pub move_count: u32,
  pub is_won: bool,
}

impl Snapshot {
  fn start_of(level: &Level) -> Self {
    Self {
      lead: level.lead_start(),
      echo: level.echo_start(),
      previous_direction: None,
      move_count: 0,
      is_won: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Playing,
  /// No more moves are accepted until an undo or reset.
  Won,
}

/// What [`Engine::apply_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
  /// The puzzle was already won; nothing changed.
  Ignored,
  Applied {
    lead_moved: bool,
    echo_moved: bool,
    won: bool,
  },
}

/// Coordinate arithmetic only. `None` when stepping off the top or left
/// edge; stepping off the bottom or right is caught by the bounds check.
pub fn step(pos: Coord, dir: Direction) -> Option<Coord> {
  (pos.to_icoord() + dir.deltas()).to_coord()
}

/// Where a piece at `pos` ends up when pushed in `dir`.
pub fn try_move(level: &Level, pos: Coord, dir: Direction) -> Coord {
  match step(pos, dir) {
    Some(next) if level.is_open(next) => next,
    _ => pos,
  }
}

#[derive(Debug, Clone)]
pub struct Engine {
  level: Level,
  state: Snapshot,
  history: Vec<Snapshot>,
}

impl Engine {
  pub fn new(level: Level) -> Self {
    let state = Snapshot::start_of(&level);
    Self {
      level,
      state,
      history: Vec::new(),
    }
  }

  /// Start a fresh session and feed it `moves` in order.
  pub fn replay(level: Level, moves: &[Direction]) -> Self {
    let mut engine = Self::new(level);
    for &dir in moves {
      engine.apply_move(dir);
    }
    engine
  }

  pub fn level(&self) -> &Level {
    &self.level
  }

  pub fn snapshot(&self) -> Snapshot {
    self.state
  }

  pub fn phase(&self) -> Phase {
    if self.state.is_won {
      Phase::Won
    } else {
      Phase::Playing
    }
  }

  pub fn is_won(&self) -> bool {
    self.state.is_won
  }

  pub fn move_count(&self) -> u32 {
    self.state.move_count
  }

  pub fn can_undo(&self) -> bool {
    !self.history.is_empty()
  }

  pub fn history_len(&self) -> usize {
    self.history.len()
  }

  /// The directions applied so far, oldest first.
  pub fn moves(&self) -> Vec<Direction> {
    self
      .history
      .iter()
      .skip(1)
      .chain(std::iter::once(&self.state))
      .filter_map(|s| s.previous_direction)
      .collect()
  }

  pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
    if self.state.is_won {
      return MoveOutcome::Ignored;
    }

    let before = self.state;
    let lead = try_move(&self.level, before.lead, direction);
    // Echo does not move on the very first input.
    let echo = match before.previous_direction {
      Some(prev) => try_move(&self.level, before.echo, prev),
      None => before.echo,
    };

    self.history.push(before);
    let is_won =
      lead == self.level.goal_lead() && echo == self.level.goal_echo();
    self.state = Snapshot {
      lead,
      echo,
      previous_direction: Some(direction),
      move_count: before.move_count + 1,
      is_won,
    };

    MoveOutcome::Applied {
      lead_moved: lead != before.lead,
      echo_moved: echo != before.echo,
      won: is_won,
    }
  }

  /// Step back one move. Returns whether anything was undone.
  pub fn undo(&mut self) -> bool {
    match self.history.pop() {
      Some(prev) => {
        self.state = prev;
        true
      }
      None => false,
    }
  }

  pub fn reset(&mut self) {
    self.state = Snapshot::start_of(&self.level);
    self.history.clear();
  }
}
