//! One sitting at one level: the engine plus "have we reported the win".

use crate::{
  calendar::CalendarDay,
  catalog,
  progress::{ProgressStore, ProgressTracker},
  share::WinSummary,
  Direction, Engine, Level, MoveOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
  /// A level from a pack (or a file), tracked by id.
  Pack,
  /// The daily puzzle for a given day, tracked by date.
  Daily(CalendarDay),
}

/// A solve that still has to be written to progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  Level { id: String, moves: u32 },
  Daily { date: CalendarDay, moves: u32 },
}

impl Completion {
  pub fn moves(&self) -> u32 {
    match self {
      Completion::Level { moves, .. } | Completion::Daily { moves, .. } => {
        *moves
      }
    }
  }

  /// Compare this result with what `tracker` already holds, without
  /// recording it.
  pub fn summary<S: ProgressStore>(
    &self,
    level: &Level,
    tracker: &ProgressTracker<S>,
  ) -> WinSummary {
    let previous_best = match self {
      Completion::Level { id, .. } => tracker.level(id).best_moves,
      Completion::Daily { date, .. } => tracker
        .progress()
        .daily_best_moves
        .get(&date.to_string())
        .copied(),
    };
    WinSummary {
      moves: self.moves(),
      previous_best,
      par: level.par(),
    }
  }

  /// Write this result to `tracker` and summarise it for the win screen.
  pub fn record<S: ProgressStore>(
    &self,
    level: &Level,
    tracker: &mut ProgressTracker<S>,
    today: CalendarDay,
  ) -> WinSummary {
    let summary = self.summary(level, tracker);
    match self {
      Completion::Level { id, moves } => {
        tracker.complete_level(id, *moves);
      }
      Completion::Daily { date, moves } => {
        tracker.complete_daily(&date.to_string(), *moves, today);
      }
    }
    summary
  }
}

#[derive(Debug, Clone)]
pub struct PlaySession {
  engine: Engine,
  kind: LevelKind,
  reported: bool,
}

impl PlaySession {
  pub fn new(level: Level, kind: LevelKind) -> Self {
    Self {
      engine: Engine::new(level),
      kind,
      reported: false,
    }
  }

  pub fn daily(day: CalendarDay) -> Self {
    Self::new(catalog::daily_level(day), LevelKind::Daily(day))
  }

  pub fn engine(&self) -> &Engine {
    &self.engine
  }

  pub fn level(&self) -> &Level {
    self.engine.level()
  }

  pub fn kind(&self) -> LevelKind {
    self.kind
  }

  /// The result the current position stands for, once it is won.
  pub fn completion(&self) -> Option<Completion> {
    if !self.engine.is_won() {
      return None;
    }
    let moves = self.engine.move_count();
    Some(match self.kind {
      LevelKind::Pack => Completion::Level {
        id: self.level().id().to_string(),
        moves,
      },
      LevelKind::Daily(date) => Completion::Daily { date, moves },
    })
  }

  /// Apply a move. The first time the puzzle becomes won this returns the
  /// result to record; undoing and winning again does not report twice.
  pub fn apply_move(&mut self, direction: Direction) -> Option<Completion> {
    match self.engine.apply_move(direction) {
      MoveOutcome::Applied { won: true, .. } if !self.reported => {
        self.reported = true;
        log::debug!(
          "{} solved in {} moves",
          self.level().id(),
          self.engine.move_count()
        );
        self.completion()
      }
      _ => None,
    }
  }

  pub fn undo(&mut self) -> bool {
    self.engine.undo()
  }

  /// Start over. A fresh attempt reports its win again.
  pub fn replay(&mut self) {
    self.engine.reset();
    self.reported = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::progress::MemoryStore;
  use Direction::*;

  fn first_steps() -> PlaySession {
    PlaySession::new(catalog::find("tutorial-1").unwrap(), LevelKind::Pack)
  }

  #[test]
  fn reports_once_per_attempt() {
    let mut session = first_steps();
    assert_eq!(session.apply_move(Right), None);
    assert_eq!(
      session.apply_move(Right),
      Some(Completion::Level {
        id: "tutorial-1".into(),
        moves: 2
      })
    );
    session.undo();
    assert_eq!(session.apply_move(Right), None);
    assert!(session.engine().is_won());

    session.replay();
    session.apply_move(Right);
    assert!(session.apply_move(Right).is_some());
  }

  #[test]
  fn daily_completion_records_the_date() {
    let day: CalendarDay = "2024-03-01".parse().unwrap();
    let mut session = PlaySession::daily(day);
    assert_eq!(session.level().id(), "daily-2024-03-01");

    let solution = catalog::daily_solution(day);
    let mut completions = Vec::new();
    for dir in crate::parse_moves(solution).unwrap() {
      completions.extend(session.apply_move(dir));
    }
    assert_eq!(completions.len(), 1);
    let completion = completions.remove(0);
    assert!(
      matches!(completion, Completion::Daily { date, .. } if date == day)
    );

    let mut tracker = ProgressTracker::open(MemoryStore::new());
    let summary = completion.record(session.level(), &mut tracker, day);
    assert!(summary.is_new_best());
    assert!(summary.is_perfect());
    assert_eq!(tracker.current_streak(day), 1);
    assert_eq!(
      tracker.progress().daily_best_moves.get("2024-03-01"),
      Some(&completion.moves())
    );
  }

  #[test]
  fn level_completion_summary_uses_previous_best() {
    let mut tracker = ProgressTracker::open(MemoryStore::new());
    let level = catalog::find("tutorial-1").unwrap();
    let today = CalendarDay::from_index(0);
    let slow = Completion::Level {
      id: "tutorial-1".into(),
      moves: 4,
    };
    let quick = Completion::Level {
      id: "tutorial-1".into(),
      moves: 2,
    };
    assert_eq!(slow.record(&level, &mut tracker, today).previous_best, None);
    let summary = quick.record(&level, &mut tracker, today);
    assert_eq!(summary.previous_best, Some(4));
    assert!(summary.is_new_best());
    assert_eq!(tracker.level("tutorial-1").best_moves, Some(2));
  }

  #[test]
  fn rewin_after_undo_is_summarised_at_the_new_count() {
    let mut tracker = ProgressTracker::open(MemoryStore::new());
    let today = CalendarDay::from_index(0);
    let mut session = first_steps();
    assert_eq!(session.completion(), None);

    session.apply_move(Right);
    let first = session.apply_move(Right).unwrap();
    let summary = first.record(session.level(), &mut tracker, today);
    assert_eq!(summary.moves, 2);

    // Step back and take the long way round.
    session.undo();
    assert_eq!(session.completion(), None);
    for dir in [Left, Right] {
      assert_eq!(session.apply_move(dir), None);
    }
    assert_eq!(session.apply_move(Right), None);
    assert!(session.engine().is_won());

    let again = session.completion().unwrap();
    assert_eq!(again.moves(), 4);
    let summary = again.summary(session.level(), &tracker);
    assert_eq!(summary.moves, 4);
    assert_eq!(summary.previous_best, Some(2));
    assert!(!summary.is_new_best());
    // Only looked at, never written.
    assert_eq!(tracker.level("tutorial-1").best_moves, Some(2));
  }
}
