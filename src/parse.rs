use aglet::Coord;
use nom::{
  branch::alt,
  bytes::complete::{tag, take, take_until, take_while1},
  character::complete::{
    char, line_ending, multispace0, not_line_ending, space0, space1,
    u32 as number,
  },
  combinator::{eof, map, opt, value},
  error::{context, VerboseError},
  multi::{count, many0, many1},
  sequence::{preceded, separated_pair, terminated, tuple},
  Finish, IResult, Parser,
};

use crate::{Board, Level, Route};

/// Parse a string into a level.
///
/// ```text
/// Title
/// any comment
/// ---
/// id first-steps
/// par 2
/// lead 0,0 -> 2,0
/// echo 0,0 -> 1,0
/// ---
/// ...
/// ```
pub fn parse_to_level(s: &str) -> Result<Level, VerboseError<&str>> {
  let (s, level) = level(s).finish()?;
  debug_assert_eq!(s, "");
  Ok(level)
}

fn level(s: &str) -> IResult<&str, Level, VerboseError<&str>> {
  let (s, title) = header(s)?;
  let (s, meta) = meta(s)?;
  let (s, board) = board(s)?;
  let (s, _) = context("end of board", eof)(s)?;
  Ok((
    s,
    Level::new(meta.id, title, board, meta.lead, meta.echo, meta.par),
  ))
}

/// Returns the title
fn header(s: &str) -> IResult<&str, String, VerboseError<&str>> {
  let (s, title) = terminated(not_line_ending, line_ending)(s)?;

  let (s, _comment) =
    discard_ws_after(terminated(take_until("---"), take(3usize)))(s)?;
  Ok((s, title.trim().to_string()))
}

fn meta(s: &str) -> IResult<&str, Meta, VerboseError<&str>> {
  let (s, id) = context(
    "id",
    keyword_line(
      "id",
      take_while1(|c: char| {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
      }),
    ),
  )(s)?;
  let (s, par) = opt(keyword_line("par", number))(s)?;
  let (s, lead) = context("lead route", keyword_line("lead", route))(s)?;
  let (s, echo) = context("echo route", keyword_line("echo", route))(s)?;
  let (s, _) = discard_ws_after(tag("---"))(s)?;
  Ok((
    s,
    Meta {
      id: id.to_string(),
      par,
      lead,
      echo,
    },
  ))
}

fn route(s: &str) -> IResult<&str, Route, VerboseError<&str>> {
  map(
    separated_pair(coord, tuple((space0, tag("->"), space0)), coord),
    |(start, goal)| Route::new(start, goal),
  )(s)
}

fn coord(s: &str) -> IResult<&str, Coord, VerboseError<&str>> {
  map(
    separated_pair(number, tuple((space0, char(','), space0)), number),
    |(x, y)| Coord::new(x, y),
  )(s)
}

fn board(s: &str) -> IResult<&str, Board, VerboseError<&str>> {
  let (s, first) = context("board row", board_row(many1(a_tile)))(s)?;
  let width = first.len();
  let (s, mut rows) =
    many0(context("board row", board_row(count(a_tile, width))))(s)?;
  let (s, _trail) = multispace0(s)?;

  // and convert
  rows.insert(0, first);
  let height = rows.len();
  let walls = rows.into_iter().enumerate().flat_map(|(y, row)| {
    row
      .into_iter()
      .enumerate()
      .filter(|&(_, wall)| wall)
      .map(move |(x, _)| Coord::new(x as _, y as _))
  });

  Ok((s, Board::new(width as u32, height as u32, walls)))
}

/// `true` for a wall.
fn a_tile(s: &str) -> IResult<&str, bool, VerboseError<&str>> {
  context(
    "tile",
    alt((value(true, char('#')), value(false, char('.')))),
  )(s)
}

/// A board row has to end exactly at a line break or the end of input,
/// so a row that is too long is an error instead of being split.
fn board_row<'a, O, F>(
  inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>
where
  F: Parser<&'a str, O, VerboseError<&'a str>>,
{
  preceded(
    space0,
    terminated(inner, tuple((space0, alt((line_ending, eof))))),
  )
}

/// `<keyword> <value>` on its own line.
fn keyword_line<'a, O, F>(
  keyword: &'static str,
  inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>
where
  F: Parser<&'a str, O, VerboseError<&'a str>>,
{
  discard_ws_after(preceded(tuple((space0, tag(keyword), space1)), inner))
}

// nice combinator
fn discard_ws_after<'a, O, F>(
  inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>
where
  F: Parser<&'a str, O, VerboseError<&'a str>>,
{
  terminated(inner, tuple((space0, opt(line_ending))))
}

struct Meta {
  id: String,
  par: Option<u32>,
  lead: Route,
  echo: Route,
}
