//! Completion records, best move counts and the daily streak.
//!
//! [`GameProgress`] is plain data with pure update rules. Where it lives is
//! up to a [`ProgressStore`]; [`ProgressTracker`] glues the two together and
//! never lets a storage failure reach the player.

use std::{
  collections::BTreeMap,
  fs, io,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{calendar::CalendarDay, Level};

/// Namespace the progress record is kept under.
pub const STORAGE_KEY: &str = "echo-move-progress";

pub const PROGRESS_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
  pub completed: bool,
  pub best_moves: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameProgress {
  pub version: u32,
  pub levels: BTreeMap<String, LevelProgress>,
  pub daily_streak: u32,
  /// `YYYY-MM-DD` of the last daily puzzle completed.
  pub last_daily_date: Option<String>,
  pub daily_best_moves: BTreeMap<String, u32>,
  pub current_level_index: usize,
}

impl Default for GameProgress {
  fn default() -> Self {
    Self {
      version: PROGRESS_VERSION,
      levels: BTreeMap::new(),
      daily_streak: 0,
      last_daily_date: None,
      daily_best_moves: BTreeMap::new(),
      current_level_index: 0,
    }
  }
}

impl GameProgress {
  pub fn level(&self, id: &str) -> LevelProgress {
    self.levels.get(id).copied().unwrap_or_default()
  }

  /// Returns whether `moves` is a new personal best.
  pub fn complete_level(&mut self, id: &str, moves: u32) -> bool {
    let entry = self.levels.entry(id.to_string()).or_default();
    let is_new_best = entry.best_moves.map_or(true, |best| moves < best);
    entry.completed = true;
    if is_new_best {
      entry.best_moves = Some(moves);
    }
    is_new_best
  }

  /// Record a daily puzzle result for `date` (`YYYY-MM-DD`).
  ///
  /// The streak grows when the previous daily was yesterday and restarts at
  /// one for a puzzle dated today. Finishing the same date again never
  /// touches the streak. Returns whether `moves` is a new best for the date.
  pub fn complete_daily(
    &mut self,
    date: &str,
    moves: u32,
    today: CalendarDay,
  ) -> bool {
    let today_str = today.to_string();
    let yesterday = today.pred().to_string();

    if self.last_daily_date.as_deref() != Some(date) {
      if self.last_daily_date.as_deref() == Some(yesterday.as_str()) {
        self.daily_streak = self.daily_streak.saturating_add(1);
      } else if date == today_str {
        self.daily_streak = 1;
      }
    }
    self.last_daily_date = Some(date.to_string());

    let existing = self.daily_best_moves.get(date).copied();
    let is_new_best = existing.map_or(true, |best| moves < best);
    if is_new_best {
      self.daily_best_moves.insert(date.to_string(), moves);
    }
    is_new_best
  }

  /// The streak, or zero once a day has been missed.
  pub fn current_streak(&self, today: CalendarDay) -> u32 {
    let last = self.last_daily_date.as_deref();
    if last == Some(today.to_string().as_str())
      || last == Some(today.pred().to_string().as_str())
    {
      self.daily_streak
    } else {
      0
    }
  }

  /// Totals across `levels`, usually the whole catalog.
  pub fn stats(&self, levels: &[Level], today: CalendarDay) -> Stats {
    let completed = self.levels.values().filter(|l| l.completed).count();
    let total_best_moves = self
      .levels
      .values()
      .filter_map(|l| l.best_moves)
      .fold(0u32, u32::saturating_add);
    let stars = levels
      .iter()
      .filter(|level| {
        match (self.level(level.id()).best_moves, level.par()) {
          (Some(best), Some(par)) => best <= par,
          _ => false,
        }
      })
      .count();
    Stats {
      completed,
      total_best_moves,
      stars,
      streak: self.current_streak(today),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
  pub completed: usize,
  pub total_best_moves: u32,
  /// Levels solved within par.
  pub stars: usize,
  pub streak: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("progress i/o failed: {0}")]
  Io(#[from] io::Error),
  #[error("progress record is not valid: {0}")]
  Json(#[from] serde_json::Error),
  #[error("progress record version {found} is not supported (want {expected})")]
  Version { found: u32, expected: u32 },
}

/// Somewhere to keep the progress record between runs.
pub trait ProgressStore {
  /// `Ok(None)` when nothing has been saved yet.
  fn load(&self) -> Result<Option<GameProgress>, StoreError>;
  fn save(&mut self, progress: &GameProgress) -> Result<(), StoreError>;
}

/// Decode a stored record, rejecting versions we don't understand.
pub fn decode(raw: &str) -> Result<GameProgress, StoreError> {
  let progress: GameProgress = serde_json::from_str(raw)?;
  if progress.version != PROGRESS_VERSION {
    return Err(StoreError::Version {
      found: progress.version,
      expected: PROGRESS_VERSION,
    });
  }
  Ok(progress)
}

pub fn encode(progress: &GameProgress) -> Result<String, StoreError> {
  Ok(serde_json::to_string_pretty(progress)?)
}

/// Pretty JSON in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// `<dir>/echo-move-progress.json`
  pub fn in_dir(dir: impl AsRef<Path>) -> Self {
    Self::new(dir.as_ref().join(format!("{}.json", STORAGE_KEY)))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl ProgressStore for JsonFileStore {
  fn load(&self) -> Result<Option<GameProgress>, StoreError> {
    match fs::read_to_string(&self.path) {
      Ok(raw) => decode(&raw).map(Some),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn save(&mut self, progress: &GameProgress) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
      }
    }
    fs::write(&self.path, encode(progress)?)?;
    Ok(())
  }
}

/// Keeps the encoded record in memory. Handy for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  record: Option<String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_record(record: impl Into<String>) -> Self {
    Self {
      record: Some(record.into()),
    }
  }

  pub fn record(&self) -> Option<&str> {
    self.record.as_deref()
  }
}

impl ProgressStore for MemoryStore {
  fn load(&self) -> Result<Option<GameProgress>, StoreError> {
    self.record.as_deref().map(decode).transpose()
  }

  fn save(&mut self, progress: &GameProgress) -> Result<(), StoreError> {
    self.record = Some(encode(progress)?);
    Ok(())
  }
}

/// Progress plus the store it came from. Every change is saved straight
/// away; failures are logged and play carries on from memory.
#[derive(Debug)]
pub struct ProgressTracker<S> {
  store: S,
  progress: GameProgress,
}

impl<S: ProgressStore> ProgressTracker<S> {
  pub fn open(store: S) -> Self {
    let progress = match store.load() {
      Ok(Some(progress)) => {
        log::info!("loaded progress ({} levels)", progress.levels.len());
        progress
      }
      Ok(None) => {
        log::info!("no saved progress, starting fresh");
        GameProgress::default()
      }
      Err(e) => {
        log::warn!("failed to load progress, starting fresh: {}", e);
        GameProgress::default()
      }
    };
    Self { store, progress }
  }

  pub fn progress(&self) -> &GameProgress {
    &self.progress
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn level(&self, id: &str) -> LevelProgress {
    self.progress.level(id)
  }

  pub fn complete_level(&mut self, id: &str, moves: u32) -> bool {
    let is_new_best = self.progress.complete_level(id, moves);
    log::info!(
      "completed {} in {} moves (new best: {})",
      id,
      moves,
      is_new_best
    );
    self.persist();
    is_new_best
  }

  pub fn complete_daily(
    &mut self,
    date: &str,
    moves: u32,
    today: CalendarDay,
  ) -> bool {
    let is_new_best = self.progress.complete_daily(date, moves, today);
    log::info!(
      "completed daily {} in {} moves, streak {}",
      date,
      moves,
      self.progress.daily_streak
    );
    self.persist();
    is_new_best
  }

  pub fn current_streak(&self, today: CalendarDay) -> u32 {
    self.progress.current_streak(today)
  }

  pub fn set_current_level_index(&mut self, index: usize) {
    self.progress.current_level_index = index;
    self.persist();
  }

  pub fn reset(&mut self) {
    self.progress = GameProgress::default();
    log::info!("progress reset");
    self.persist();
  }

  pub fn stats(&self, levels: &[Level], today: CalendarDay) -> Stats {
    self.progress.stats(levels, today)
  }

  fn persist(&mut self) {
    if let Err(e) = self.store.save(&self.progress) {
      log::warn!("failed to save progress: {}", e);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog;

  fn day(s: &str) -> CalendarDay {
    s.parse().unwrap()
  }

  #[test]
  fn best_only_improves() {
    let mut p = GameProgress::default();
    assert_eq!(p.level("a"), LevelProgress::default());
    assert!(p.complete_level("a", 9));
    assert!(!p.complete_level("a", 12));
    assert_eq!(p.level("a").best_moves, Some(9));
    assert!(p.complete_level("a", 7));
    assert_eq!(
      p.level("a"),
      LevelProgress {
        completed: true,
        best_moves: Some(7)
      }
    );
  }

  #[test]
  fn streak_counts_consecutive_days() {
    let mut p = GameProgress::default();
    p.complete_daily("2024-03-01", 6, day("2024-03-01"));
    assert_eq!(p.daily_streak, 1);
    p.complete_daily("2024-03-02", 5, day("2024-03-02"));
    assert_eq!(p.daily_streak, 2);
    // Same day again leaves the streak alone.
    p.complete_daily("2024-03-02", 4, day("2024-03-02"));
    assert_eq!(p.daily_streak, 2);
    assert_eq!(p.daily_best_moves["2024-03-02"], 4);
    assert_eq!(p.current_streak(day("2024-03-03")), 2);
    assert_eq!(p.current_streak(day("2024-03-04")), 0);
  }

  #[test]
  fn streak_restarts_after_a_gap() {
    let mut p = GameProgress::default();
    p.complete_daily("2024-03-01", 6, day("2024-03-01"));
    p.complete_daily("2024-03-02", 6, day("2024-03-02"));
    p.complete_daily("2024-03-05", 6, day("2024-03-05"));
    assert_eq!(p.daily_streak, 1);
    assert_eq!(p.last_daily_date.as_deref(), Some("2024-03-05"));
  }

  #[test]
  fn old_daily_does_not_start_a_streak() {
    let mut p = GameProgress::default();
    p.complete_daily("2024-01-01", 6, day("2024-03-01"));
    assert_eq!(p.daily_streak, 0);
    assert_eq!(p.last_daily_date.as_deref(), Some("2024-01-01"));
  }

  #[test]
  fn daily_best_keeps_the_minimum() {
    let mut p = GameProgress::default();
    let today = day("2024-03-01");
    assert!(p.complete_daily("2024-03-01", 8, today));
    assert!(!p.complete_daily("2024-03-01", 9, today));
    assert!(p.complete_daily("2024-03-01", 5, today));
    assert_eq!(p.daily_best_moves["2024-03-01"], 5);
  }

  #[test]
  fn stats_count_stars_against_par() {
    let levels = catalog::all_levels();
    let mut p = GameProgress::default();
    p.complete_level("tutorial-1", 2);
    p.complete_level("tutorial-2", 9);
    let stats = p.stats(&levels, day("2024-03-01"));
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.total_best_moves, 11);
    assert_eq!(stats.stars, 1);
    assert_eq!(stats.streak, 0);
  }

  #[test]
  fn missing_fields_take_defaults() {
    let p = decode(r#"{"version":1,"dailyStreak":3}"#).unwrap();
    assert_eq!(p.daily_streak, 3);
    assert!(p.levels.is_empty());
    assert_eq!(p.current_level_index, 0);
  }

  #[test]
  fn tracker_falls_back_on_corrupt_record() {
    let tracker = ProgressTracker::open(MemoryStore::with_record("{nope"));
    assert_eq!(tracker.progress(), &GameProgress::default());

    let tracker =
      ProgressTracker::open(MemoryStore::with_record(r#"{"version":99}"#));
    assert_eq!(tracker.progress(), &GameProgress::default());
  }

  #[test]
  fn huge_stored_counts_saturate() {
    let mut tracker = ProgressTracker::open(MemoryStore::with_record(
      r#"{
        "version": 1,
        "dailyStreak": 4294967295,
        "lastDailyDate": "2024-03-01",
        "levels": {
          "a": { "completed": true, "bestMoves": 4294967295 },
          "b": { "completed": true, "bestMoves": 2 }
        }
      }"#,
    ));
    let today = day("2024-03-02");
    tracker.complete_daily("2024-03-02", 3, today);
    assert_eq!(tracker.current_streak(today), u32::MAX);
    assert_eq!(tracker.stats(&[], today).total_best_moves, u32::MAX);
  }

  #[test]
  fn tracker_saves_every_change() {
    let mut tracker = ProgressTracker::open(MemoryStore::new());
    tracker.complete_level("main-1", 5);
    tracker.set_current_level_index(3);

    let mut reopened = ProgressTracker::open(tracker.store().clone());
    assert_eq!(reopened.level("main-1").best_moves, Some(5));
    assert_eq!(reopened.progress().current_level_index, 3);

    reopened.reset();
    let again = ProgressTracker::open(reopened.store().clone());
    assert_eq!(again.progress(), &GameProgress::default());
  }

  #[test]
  fn file_store_round_trip() {
    let dir = std::env::temp_dir()
      .join(format!("echo-move-progress-test-{}", std::process::id()));
    let mut store = JsonFileStore::in_dir(&dir);
    assert!(store.load().unwrap().is_none());

    let mut progress = GameProgress::default();
    progress.complete_level("tutorial-3", 4);
    store.save(&progress).unwrap();
    assert_eq!(store.load().unwrap(), Some(progress));

    let _ = fs::remove_dir_all(&dir);
  }
}
