//! Play harness

use std::io::{self, Stdout, Write};

use aglet::Coord;
use crossterm::{
  cursor::{Hide, MoveTo, Show},
  event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
  style::{
    Attribute, Attributes, Color, Colors, Print, ResetColor, SetAttribute,
    SetAttributes, SetColors, SetForegroundColor,
  },
  terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
  },
  QueueableCommand,
};
use echo_move::{
  calendar::CalendarDay,
  progress::{ProgressStore, ProgressTracker},
  render::{glyph_at, Glyph},
  session::{LevelKind, PlaySession},
  share::{share_text, WinSummary},
  Direction, Level,
};

const START_X: u16 = 2;
const START_Y: u16 = 1;

const TILE_STRIDE_X: u16 = 2;
const TILE_STRIDE_Y: u16 = 1;

/// Top-left of the board; the title and HUD sit above it.
const BOARD_X: u16 = 4;
const BOARD_Y: u16 = 4;

/// Lines of text drawn under the board.
const FOOTER_LINES: u16 = 4;

pub struct PlayHarness<S> {
  session: PlaySession,
  tracker: ProgressTracker<S>,
  /// The pack being played and our place in it.
  pack: Option<(Vec<Level>, usize)>,
  today: CalendarDay,

  banner: Option<WinBanner>,

  must_redraw: bool,
}

struct WinBanner {
  summary: WinSummary,
  share: String,
}

impl<S: ProgressStore> PlayHarness<S> {
  /// Transfer runtime to the harness.
  /// This will only return once the player is through.
  pub fn enter(
    session: PlaySession,
    tracker: ProgressTracker<S>,
    pack: Option<(Vec<Level>, usize)>,
    today: CalendarDay,
  ) -> io::Result<()> {
    let mut harness = Self {
      session,
      tracker,
      pack,
      today,
      banner: None,
      must_redraw: true,
    };
    log::info!("playing {}", harness.session.level().id());

    harness.spin()?;

    Ok(())
  }

  fn spin(&mut self) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.queue(EnterAlternateScreen)?.queue(Hide)?.flush()?;

    loop {
      self.draw(&mut stdout)?;

      if let Event::Key(ev) = event::read()? {
        if matches!(ev.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
          let quit = self.update(ev.code, ev.modifiers);
          if quit {
            break;
          }
        }
      }
    }

    stdout
      .queue(ResetColor)?
      .queue(Show)?
      .queue(LeaveAlternateScreen)?
      .flush()?;
    disable_raw_mode()?;

    Ok(())
  }

  /// return whether to quit
  fn update(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
    if self.must_redraw {
      self.must_redraw = false;
    }
    if mods.contains(KeyModifiers::CONTROL) {
      match key {
        KeyCode::Char('c') => return true,
        KeyCode::Char('l') => self.must_redraw = true,
        _ => {}
      }
      return false;
    }

    if let Some(dir) = key_direction(key) {
      self.step(dir);
      return false;
    }

    match key {
      KeyCode::Char('q') | KeyCode::Esc => return true,
      KeyCode::Char('u') | KeyCode::Char('U') | KeyCode::Backspace => {
        if self.session.undo() {
          self.banner = None;
        }
      }
      KeyCode::Char('r') | KeyCode::Char('R') => {
        self.session.replay();
        self.banner = None;
      }
      KeyCode::Char('n') | KeyCode::Char('N') => self.next_level(),
      _ => {}
    }
    false
  }

  fn step(&mut self, dir: Direction) {
    if self.session.engine().is_won() {
      return;
    }
    let summary = match self.session.apply_move(dir) {
      Some(completion) => completion.record(
        self.session.level(),
        &mut self.tracker,
        self.today,
      ),
      // Won again after an undo: already recorded, so only compare.
      None => match self.session.completion() {
        Some(completion) => {
          completion.summary(self.session.level(), &self.tracker)
        }
        None => return,
      },
    };
    let streak = match self.session.kind() {
      LevelKind::Daily(_) => Some(self.tracker.current_streak(self.today)),
      LevelKind::Pack => None,
    };
    let share = share_text(self.session.level().name(), summary.moves, streak);
    log::info!("{}", share);
    self.banner = Some(WinBanner { summary, share });
  }

  fn next_level(&mut self) {
    if !self.session.engine().is_won() {
      return;
    }
    let Some((levels, index)) = &mut self.pack else {
      return;
    };
    let Some(next) = levels.get(*index + 1) else {
      return;
    };
    *index += 1;
    let index = *index;
    self.session = PlaySession::new(next.clone(), LevelKind::Pack);
    self.tracker.set_current_level_index(index);
    self.banner = None;
    self.must_redraw = true;
    log::info!("playing {}", self.session.level().id());
  }

  fn has_next(&self) -> bool {
    matches!(&self.pack, Some((levels, index)) if index + 1 < levels.len())
  }

  fn draw(&self, stdout: &mut Stdout) -> io::Result<()> {
    if self.must_redraw {
      stdout.queue(Clear(ClearType::All))?;
    }

    let level = self.session.level();
    let state = self.session.engine().snapshot();

    stdout
      .queue(MoveTo(START_X, START_Y))?
      .queue(ResetColor)?
      .queue(SetAttribute(Attribute::Bold))?
      .queue(Print(level.name()))?
      .queue(SetAttribute(Attribute::Reset))?
      .queue(Clear(ClearType::UntilNewLine))?;

    let par = level.par().map_or_else(String::new, |p| format!(" / par {}", p));
    let echo_next = state.previous_direction.map_or('-', Direction::arrow);
    stdout
      .queue(MoveTo(START_X, START_Y + 1))?
      .queue(Print(format!(
        "moves {}{}   echo next {}",
        state.move_count, par, echo_next
      )))?
      .queue(Clear(ClearType::UntilNewLine))?;

    for y in 0..level.height() {
      for x in 0..level.width() {
        let coord = Coord::new(x, y);
        let (ch, cols, fmt) = glyph_display(glyph_at(level, &state, coord));
        let screenpos = grid_to_screen(coord);
        stdout
          .queue(MoveTo(screenpos.0, screenpos.1))?
          .queue(SetColors(cols))?
          .queue(SetAttributes(fmt))?
          .queue(Print(ch))?;
      }
    }
    stdout
      .queue(ResetColor)?
      .queue(SetAttribute(Attribute::Reset))?;

    let footer = grid_to_screen(Coord::new(0, level.height()));
    let footer_y = footer.1 + 1;
    let lines = self.footer_lines();
    for row in 0..FOOTER_LINES {
      stdout.queue(MoveTo(START_X, footer_y + row))?;
      if let Some((color, text)) = lines.get(row as usize) {
        stdout
          .queue(SetForegroundColor(*color))?
          .queue(Print(text))?
          .queue(ResetColor)?;
      }
      stdout.queue(Clear(ClearType::UntilNewLine))?;
    }

    stdout.flush()?;
    Ok(())
  }

  fn footer_lines(&self) -> Vec<(Color, String)> {
    let banner = match &self.banner {
      Some(banner) if self.session.engine().is_won() => banner,
      _ => {
        return vec![(
          Color::DarkGrey,
          "arrows/wasd/hjkl move  u undo  r restart  q quit".to_string(),
        )]
      }
    };

    let summary = &banner.summary;
    let title_color = if summary.is_perfect() {
      Color::Yellow
    } else {
      Color::Green
    };
    let mut best = format!("moves {}  best {}", summary.moves, summary.best());
    if summary.is_new_best() {
      best.push_str("  new best!");
    }
    let keys = if self.has_next() {
      "n next  r replay  q quit"
    } else {
      "r replay  q quit"
    };
    vec![
      (title_color, summary.title().to_string()),
      (Color::White, best),
      (Color::Cyan, banner.share.clone()),
      (Color::DarkGrey, keys.to_string()),
    ]
  }
}

fn key_direction(key: KeyCode) -> Option<Direction> {
  match key {
    KeyCode::Up
    | KeyCode::Char('w')
    | KeyCode::Char('W')
    | KeyCode::Char('k')
    | KeyCode::Char('K') => Some(Direction::Up),
    KeyCode::Down
    | KeyCode::Char('s')
    | KeyCode::Char('S')
    | KeyCode::Char('j')
    | KeyCode::Char('J') => Some(Direction::Down),
    KeyCode::Left
    | KeyCode::Char('a')
    | KeyCode::Char('A')
    | KeyCode::Char('h')
    | KeyCode::Char('H') => Some(Direction::Left),
    KeyCode::Right
    | KeyCode::Char('d')
    | KeyCode::Char('D')
    | KeyCode::Char('l')
    | KeyCode::Char('L') => Some(Direction::Right),
    _ => None,
  }
}

fn glyph_display(glyph: Glyph) -> (char, Colors, Attributes) {
  let bold = Attributes::default() | Attribute::Bold | Attribute::NoItalic;
  match glyph {
    Glyph::Floor => (
      glyph.char(),
      Colors::new(Color::DarkGrey, Color::Reset),
      Attribute::NormalIntensity.into(),
    ),
    Glyph::Wall => (
      glyph.char(),
      Colors::new(Color::White, Color::DarkGrey),
      Attribute::Bold.into(),
    ),
    Glyph::LeadGoal => (
      glyph.char(),
      Colors::new(Color::DarkCyan, Color::Reset),
      Attribute::Italic.into(),
    ),
    Glyph::EchoGoal => (
      glyph.char(),
      Colors::new(Color::DarkMagenta, Color::Reset),
      Attribute::Italic.into(),
    ),
    Glyph::SharedGoal => (
      glyph.char(),
      Colors::new(Color::DarkYellow, Color::Reset),
      Attribute::Italic.into(),
    ),
    Glyph::Lead => (glyph.char(), Colors::new(Color::Cyan, Color::Reset), bold),
    Glyph::Echo => {
      (glyph.char(), Colors::new(Color::Magenta, Color::Reset), bold)
    }
    Glyph::Both => (glyph.char(), Colors::new(Color::White, Color::Blue), bold),
  }
}

fn grid_to_screen(coord: Coord) -> (u16, u16) {
  (
    coord.x as u16 * TILE_STRIDE_X + BOARD_X,
    coord.y as u16 * TILE_STRIDE_Y + BOARD_Y,
  )
}
