#![allow(dead_code)]

use echo_move::{
  parse_moves, parse_to_level, render::board_to_string, Direction, Engine,
  Level, MoveOutcome,
};

pub use dissimilar::diff as __diff;

#[macro_export]
macro_rules! assert_eq_text {
  ($left:expr, $right:expr) => {
    assert_eq_text!($left, $right,)
  };
  ($left:expr, $right:expr, $($tt:tt)*) => {{
    let left = $left;
    let right = $right;
    if left != right {
      if left.trim() == right.trim() {
        std::eprintln!("Left:\n{:?}\n\nRight:\n{:?}\n\nWhitespace difference\n", left, right);
      } else {
        let diff = $crate::common::__diff(left, right);
        std::eprintln!("Left:\n{}\n\nRight:\n{}\n\nDiff:\n{}\n", left, right, $crate::common::format_diff(diff));
      }
      std::eprintln!($($tt)*);
      panic!("text differs");
    }
  }};
}

pub fn format_diff(chunks: Vec<dissimilar::Chunk>) -> String {
  let mut buf = String::new();
  for chunk in chunks {
    let formatted = match chunk {
      dissimilar::Chunk::Equal(text) => text.into(),
      dissimilar::Chunk::Delete(text) => format!("\x1b[41m{}\x1b[0m", text),
      dissimilar::Chunk::Insert(text) => format!("\x1b[42m{}\x1b[0m", text),
    };
    buf.push_str(&formatted);
  }
  buf
}

/// Build a level from a level file body.
pub fn level(src: &str) -> Level {
  match parse_to_level(src) {
    Ok(level) => level,
    Err(e) => panic!("bad test level: {}", e),
  }
}

pub struct GameTestState {
  pub engine: Engine,
}

impl GameTestState {
  pub fn new(level: Level) -> Self {
    Self {
      engine: Engine::new(level),
    }
  }

  pub fn parse(src: &str) -> Self {
    Self::new(level(src))
  }

  pub fn game_to_string(&self) -> String {
    board_to_string(self.engine.level(), &self.engine.snapshot())
  }

  pub fn assert_move(&mut self, direction: Direction) -> MoveOutcome {
    let before = self.engine.move_count();
    let outcome = self.engine.apply_move(direction);
    assert!(
      matches!(outcome, MoveOutcome::Applied { .. }),
      "move {:?} was ignored in map\n{}",
      direction,
      self.game_to_string()
    );
    assert_eq!(self.engine.move_count(), before + 1);
    outcome
  }

  pub fn assert_moves(&mut self, moves: &str) {
    for dir in parse_moves(moves).expect("bad move string") {
      self.assert_move(dir);
    }
  }

  pub fn assert_matches(&self, expected: &str) {
    let actual = self.game_to_string();
    assert_eq_text!(expected.trim_matches('\n'), actual.as_str());
  }
}
