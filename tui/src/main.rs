mod harness;

use std::{
  fs::{self, File},
  path::{Path, PathBuf},
  str::FromStr,
  sync::Mutex,
};

use argh::FromArgs;
use ariadne::{Label, Report, ReportKind, Source};
use echo_move::{
  calendar::CalendarDay,
  catalog,
  nom_error::{VerboseError, VerboseErrorKind},
  parse_moves,
  progress::{JsonFileStore, ProgressStore, ProgressTracker},
  render::board_to_string,
  session::{LevelKind, PlaySession},
  share::share_text,
  Engine, Level,
};
use eyre::eyre;
use harness::PlayHarness;
use tracing_subscriber::EnvFilter;

const DEFAULT_PROGRESS: &str = "echo-move-progress.json";

fn main() -> eyre::Result<()> {
  let args: ArgsEntrypoint = argh::from_env();

  if let Some(path) = &args.log {
    init_logging(path)?;
  }

  match args.sub {
    Subcommands::Play(play) => play.run()?,
    Subcommands::Daily(daily) => daily.run()?,
    Subcommands::File(file) => file.run()?,
    Subcommands::Replay(replay) => replay.run()?,
    Subcommands::Stats(stats) => stats.run()?,
    Subcommands::ResetProgress(reset) => reset.run()?,
  }

  Ok(())
}

/// The terminal never gets log output; it goes to a file when asked for.
fn init_logging(path: &Path) -> eyre::Result<()> {
  let file = File::create(path)?;
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .compact()
    .init();
  Ok(())
}

#[derive(FromArgs, Debug)]
/// ECHO MOVE: steer Lead, and Echo follows one move behind.
struct ArgsEntrypoint {
  /// write logs to this file (filter with RUST_LOG)
  #[argh(option)]
  log: Option<PathBuf>,

  #[argh(subcommand)]
  sub: Subcommands,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Subcommands {
  Play(CmdPlay),
  Daily(CmdDaily),
  File(CmdFile),
  Replay(CmdReplay),
  Stats(CmdStats),
  ResetProgress(CmdResetProgress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pack {
  Tutorial,
  Main,
}

impl Pack {
  fn levels(self) -> Vec<Level> {
    match self {
      Pack::Tutorial => catalog::tutorial_levels(),
      Pack::Main => catalog::main_levels(),
    }
  }
}

impl FromStr for Pack {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "tutorial" => Ok(Pack::Tutorial),
      "main" => Ok(Pack::Main),
      other => Err(format!("no pack called `{}`", other)),
    }
  }
}

/// Play a level pack in the terminal.
///
/// Controls:
/// - Arrow keys, WASD or HJKL to move Lead.
/// - U or Backspace to undo, R to restart.
/// - N for the next level once solved.
/// - Q or Ctrl+C to quit.
/// - Ctrl+L to redraw the screen.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "play")]
struct CmdPlay {
  /// which pack, `tutorial` or `main`
  #[argh(option, default = "Pack::Main")]
  pack: Pack,
  /// level number within the pack, starting at 1. Defaults to where you
  /// left off.
  #[argh(option)]
  level: Option<usize>,
  /// path to the progress file
  #[argh(option, default = "PathBuf::from(DEFAULT_PROGRESS)")]
  progress: PathBuf,
}

impl CmdPlay {
  fn run(&self) -> eyre::Result<()> {
    let levels = self.pack.levels();
    let mut tracker =
      ProgressTracker::open(JsonFileStore::new(&self.progress));
    let index = start_index(&mut tracker, self.level, levels.len())
      .map_err(|e| eyre!("{:?} pack: {}", self.pack, e))?;
    let level = levels[index].clone();

    let session = PlaySession::new(level, LevelKind::Pack);
    PlayHarness::enter(
      session,
      tracker,
      Some((levels, index)),
      CalendarDay::today(),
    )?;
    Ok(())
  }
}

/// Which level of a `len`-level pack to open. A level picked on the command
/// line becomes the one to resume at next time.
fn start_index<S: ProgressStore>(
  tracker: &mut ProgressTracker<S>,
  requested: Option<usize>,
  len: usize,
) -> eyre::Result<usize> {
  match requested {
    Some(0) => Err(eyre!("levels are numbered from 1")),
    Some(n) if n > len => Err(eyre!("there are only {} levels", len)),
    Some(n) => {
      tracker.set_current_level_index(n - 1);
      Ok(n - 1)
    }
    None if len == 0 => Err(eyre!("there are no levels")),
    None => Ok(tracker.progress().current_level_index.min(len - 1)),
  }
}

/// Play today's daily puzzle.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "daily")]
struct CmdDaily {
  /// play the puzzle for this date (YYYY-MM-DD) instead of today
  #[argh(option)]
  date: Option<CalendarDay>,
  /// path to the progress file
  #[argh(option, default = "PathBuf::from(DEFAULT_PROGRESS)")]
  progress: PathBuf,
}

impl CmdDaily {
  fn run(&self) -> eyre::Result<()> {
    let today = CalendarDay::today();
    let day = self.date.unwrap_or(today);
    let tracker = ProgressTracker::open(JsonFileStore::new(&self.progress));
    PlayHarness::enter(PlaySession::daily(day), tracker, None, today)?;
    Ok(())
  }
}

/// Play a level from a file.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "file")]
struct CmdFile {
  /// path to the level file
  #[argh(positional)]
  path: PathBuf,
  /// path to the progress file
  #[argh(option, default = "PathBuf::from(DEFAULT_PROGRESS)")]
  progress: PathBuf,
}

impl CmdFile {
  fn run(&self) -> eyre::Result<()> {
    let level = load_level_file(&self.path)?;
    let tracker = ProgressTracker::open(JsonFileStore::new(&self.progress));
    let session = PlaySession::new(level, LevelKind::Pack);
    PlayHarness::enter(session, tracker, None, CalendarDay::today())?;
    Ok(())
  }
}

/// Apply a move string like `RRDL` to a level and print the board.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "replay")]
struct CmdReplay {
  /// a catalog level id, `daily`, or a path to a level file
  #[argh(positional)]
  level: String,
  /// moves in UDLR notation
  #[argh(positional, default = "String::new()")]
  moves: String,
  /// date for `daily` (YYYY-MM-DD), defaults to today
  #[argh(option)]
  date: Option<CalendarDay>,
}

impl CmdReplay {
  fn run(&self) -> eyre::Result<()> {
    let level = if self.level == "daily" {
      catalog::daily_level(self.date.unwrap_or_else(CalendarDay::today))
    } else if let Some(level) = catalog::find(&self.level) {
      level
    } else {
      load_level_file(Path::new(&self.level))?
    };
    let moves = parse_moves(&self.moves)
      .map_err(|c| eyre!("`{}` is not one of U, D, L, R", c))?;

    let engine = Engine::replay(level, &moves);
    let state = engine.snapshot();
    println!("{}", engine.level().name());
    println!("{}", board_to_string(engine.level(), &state));
    print!("moves {}", state.move_count);
    if let Some(par) = engine.level().par() {
      print!(" / par {}", par);
    }
    println!();
    if engine.is_won() {
      println!("solved!");
      println!("{}", share_text(engine.level().name(), state.move_count, None));
    }
    Ok(())
  }
}

/// Show progress statistics.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "stats")]
struct CmdStats {
  /// path to the progress file
  #[argh(option, default = "PathBuf::from(DEFAULT_PROGRESS)")]
  progress: PathBuf,
}

impl CmdStats {
  fn run(&self) -> eyre::Result<()> {
    let tracker = ProgressTracker::open(JsonFileStore::new(&self.progress));
    let levels = catalog::all_levels();
    let stats = tracker.stats(&levels, CalendarDay::today());

    println!("solved      {}/{}", stats.completed, levels.len());
    println!("stars       {}", stats.stars);
    println!("best total  {}", stats.total_best_moves);
    println!("streak      {}", stats.streak);
    println!();
    for level in &levels {
      let progress = tracker.level(level.id());
      let mark = match (progress.best_moves, level.par()) {
        (Some(best), Some(par)) if best <= par => "★",
        _ if progress.completed => "✓",
        _ => " ",
      };
      let best = progress
        .best_moves
        .map_or_else(|| "-".to_string(), |b| b.to_string());
      println!(
        "{} {:<12} {:<20} best {:>3}  par {}",
        mark,
        level.id(),
        level.name(),
        best,
        level.par().map_or_else(|| "-".to_string(), |p| p.to_string()),
      );
    }
    Ok(())
  }
}

/// Forget all progress.
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "reset-progress")]
struct CmdResetProgress {
  /// path to the progress file
  #[argh(option, default = "PathBuf::from(DEFAULT_PROGRESS)")]
  progress: PathBuf,
}

impl CmdResetProgress {
  fn run(&self) -> eyre::Result<()> {
    let mut tracker =
      ProgressTracker::open(JsonFileStore::new(&self.progress));
    tracker.reset();
    println!("progress cleared");
    Ok(())
  }
}

fn load_level_file(path: &Path) -> eyre::Result<Level> {
  let src = fs::read_to_string(path)?;
  echo_move::parse_to_level(&src).map_err(|e| {
    report_parse_error(&src, &e);
    eyre!("could not parse level file {}", path.display())
  })
}

/// Point at the offending spot in the level file.
fn report_parse_error(src: &str, err: &VerboseError<&str>) {
  let Some((rest, kind)) = err.errors.first() else {
    return;
  };
  let byte_offset = src.len() - rest.len();
  // ariadne counts chars, nom counts bytes.
  let offset = src[..byte_offset].chars().count();
  let len = src.chars().count();
  let start = offset.min(len.saturating_sub(1));
  let end = (start + 1).min(len);

  let message = err
    .errors
    .iter()
    .find_map(|(_, kind)| match kind {
      VerboseErrorKind::Context(ctx) => Some(format!("expected {}", ctx)),
      _ => None,
    })
    .unwrap_or_else(|| "could not parse level".to_string());
  let label = match kind {
    VerboseErrorKind::Char(c) => format!("expected `{}` here", c),
    VerboseErrorKind::Context(ctx) => format!("in {}", ctx),
    VerboseErrorKind::Nom(kind) => format!("{:?} failed here", kind),
  };

  let _ = Report::build(ReportKind::Error, (), start)
    .with_message(message)
    .with_label(Label::new(start..end).with_message(label))
    .finish()
    .eprint(Source::from(src));
}
