//! Built-in level packs and the daily puzzle.

use aglet::Coord;

use crate::{calendar::CalendarDay, Board, Level, Route};

/// A catalog entry: the level plus a known solution in `UDLR` notation.
struct Entry {
  id: &'static str,
  name: &'static str,
  rows: &'static [&'static str],
  lead: [u32; 4],
  echo: [u32; 4],
  par: u32,
  solution: &'static str,
}

impl Entry {
  fn build(&self) -> Level {
    let route = |[sx, sy, gx, gy]: [u32; 4]| {
      Route::new(Coord::new(sx, sy), Coord::new(gx, gy))
    };
    Level::new(
      self.id,
      self.name,
      Board::from_rows(self.rows),
      route(self.lead),
      route(self.echo),
      Some(self.par),
    )
  }
}

const TUTORIAL: &[Entry] = &[
  Entry {
    id: "tutorial-1",
    name: "First Steps",
    rows: &["..."],
    lead: [0, 0, 2, 0],
    echo: [0, 0, 1, 0],
    par: 2,
    solution: "RR",
  },
  Entry {
    id: "tutorial-2",
    name: "Follow the Leader",
    rows: &["....", "...."],
    lead: [0, 0, 3, 0],
    echo: [0, 1, 2, 1],
    par: 3,
    solution: "RRR",
  },
  Entry {
    id: "tutorial-3",
    name: "Mind the Wall",
    rows: &["...#", "...."],
    lead: [0, 0, 2, 0],
    echo: [0, 1, 3, 1],
    par: 4,
    solution: "RRRR",
  },
  Entry {
    id: "tutorial-4",
    name: "Turn Around",
    rows: &["...", "...", "..."],
    lead: [0, 0, 1, 1],
    echo: [0, 2, 1, 2],
    par: 2,
    solution: "RD",
  },
];

const MAIN: &[Entry] = &[
  Entry {
    id: "main-1",
    name: "Corridor",
    rows: &[".....", ".###.", "....."],
    lead: [0, 0, 4, 0],
    echo: [0, 2, 4, 2],
    par: 5,
    solution: "RRRRR",
  },
  Entry {
    id: "main-2",
    name: "Stairs",
    rows: &["...#", "....", "....", "#..."],
    lead: [0, 0, 3, 2],
    echo: [0, 1, 2, 3],
    par: 5,
    solution: "RDRDR",
  },
  Entry {
    id: "main-3",
    name: "Waiting Room",
    rows: &["....#", ".....", ".#..."],
    lead: [0, 0, 3, 1],
    echo: [0, 1, 4, 1],
    par: 6,
    solution: "RRRRRD",
  },
  Entry {
    id: "main-4",
    name: "Crossing",
    rows: &["#....", ".....", "..#..", ".....", "....#"],
    lead: [0, 2, 3, 3],
    echo: [2, 0, 4, 0],
    par: 5,
    solution: "DRRUR",
  },
  Entry {
    id: "main-5",
    name: "Echo Chamber",
    rows: &["......", ".##...", "......", "...#.."],
    lead: [0, 0, 3, 2],
    echo: [0, 2, 2, 3],
    par: 7,
    solution: "RRDDRDD",
  },
  Entry {
    id: "main-6",
    name: "Detour",
    rows: &[".#...", ".#...", ".#.#.", "...#.", "...#."],
    lead: [0, 0, 2, 1],
    echo: [4, 0, 4, 2],
    par: 7,
    solution: "DDDRRUU",
  },
];

pub fn tutorial_levels() -> Vec<Level> {
  TUTORIAL.iter().map(Entry::build).collect()
}

pub fn main_levels() -> Vec<Level> {
  MAIN.iter().map(Entry::build).collect()
}

/// Tutorial pack followed by the main pack.
pub fn all_levels() -> Vec<Level> {
  TUTORIAL.iter().chain(MAIN).map(Entry::build).collect()
}

pub fn find(id: &str) -> Option<Level> {
  TUTORIAL
    .iter()
    .chain(MAIN)
    .find(|e| e.id == id)
    .map(Entry::build)
}

/// A known solution for a catalog level, in `UDLR` notation.
pub fn solution(id: &str) -> Option<&'static str> {
  TUTORIAL
    .iter()
    .chain(MAIN)
    .find(|e| e.id == id)
    .map(|e| e.solution)
}

fn daily_entry(day: CalendarDay) -> &'static Entry {
  let pick = day.index().rem_euclid(MAIN.len() as i64) as usize;
  &MAIN[pick]
}

/// The puzzle of the day: a main-pack level picked by the day's index,
/// relabelled `daily-YYYY-MM-DD`.
pub fn daily_level(day: CalendarDay) -> Level {
  daily_entry(day)
    .build()
    .relabel(format!("daily-{}", day), format!("Daily {}", day))
}

pub fn daily_solution(day: CalendarDay) -> &'static str {
  daily_entry(day).solution
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_unique() {
    let levels = all_levels();
    let mut ids = levels.iter().map(|l| l.id()).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), levels.len());
  }

  #[test]
  fn no_piece_starts_or_finishes_in_a_wall() {
    for level in all_levels() {
      for coord in [
        level.lead_start(),
        level.echo_start(),
        level.goal_lead(),
        level.goal_echo(),
      ] {
        assert!(level.is_open(coord), "{} at {}", level.id(), coord);
      }
    }
  }

  #[test]
  fn daily_is_stable_for_a_day() {
    let day: CalendarDay = "2026-10-18".parse().unwrap();
    let a = daily_level(day);
    let b = daily_level(day);
    assert_eq!(a.id(), "daily-2026-10-18");
    assert_eq!(a.id(), b.id());
    assert_eq!(a.name(), "Daily 2026-10-18");
    assert_eq!(a.board(), b.board());
  }

  #[test]
  fn daily_cycles_through_the_main_pack() {
    let start = CalendarDay::from_index(0);
    let first = daily_level(start);
    let later = daily_level(CalendarDay::from_index(MAIN.len() as i64));
    assert_eq!(first.board(), later.board());
    assert_eq!(first.goal_echo(), later.goal_echo());
    // Before the epoch still lands inside the catalog.
    let _ = daily_level(CalendarDay::from_index(-1));
  }

  #[test]
  fn find_and_solution() {
    let level = find("main-3").unwrap();
    assert_eq!(level.name(), "Waiting Room");
    assert_eq!(solution("tutorial-1"), Some("RR"));
    assert!(find("nope").is_none());
  }
}
