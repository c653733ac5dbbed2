//! Text for the win screen and for sharing a result.

/// `ECHO MOVE • <name> • <n> moves`, with the streak appended for dailies.
pub fn share_text(level_name: &str, moves: u32, streak: Option<u32>) -> String {
  let mut text = format!("ECHO MOVE • {} • {} moves", level_name, moves);
  if let Some(streak) = streak {
    text.push_str(&format!(" • Streak {}", streak));
  }
  text
}

/// How a finished puzzle compares with par and the previous best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinSummary {
  pub moves: u32,
  /// Best before this solve.
  pub previous_best: Option<u32>,
  pub par: Option<u32>,
}

impl WinSummary {
  pub fn is_new_best(&self) -> bool {
    self.previous_best.map_or(true, |best| self.moves < best)
  }

  /// Solved within par.
  pub fn is_perfect(&self) -> bool {
    self.par.map_or(false, |par| self.moves <= par)
  }

  pub fn title(&self) -> &'static str {
    if self.is_perfect() {
      "Perfect!"
    } else {
      "Solved!"
    }
  }

  pub fn best(&self) -> u32 {
    self.previous_best.map_or(self.moves, |best| best.min(self.moves))
  }
}
