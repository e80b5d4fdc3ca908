//! Parsing of the line-oriented commands typed at the prompt.

use anyhow::{bail, Context, Result};
use geocoin_core::{CellCoord, Direction, GeoPoint};

/// Help text listing every accepted command.
pub(crate) const HELP: &str = "\
commands:
  n | s | e | w          step north, south, east or west
  look                   show the status panel and nearby caches
  collect <i> <j>        take the head coin of the cache in cell (i, j)
  deposit <i> <j>        put your head coin into the cache in cell (i, j)
  locate [<lat> <lng>]   apply a location fix; without a reading the sensor is unavailable
  save                   write the game state now
  help                   show this text
  quit                   leave the game";

/// Player intent parsed from one input line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    /// Step in a cardinal direction.
    Move(Direction),
    /// Redraw the status panel and every nearby cache.
    Look,
    /// Take a coin from the cache in the cell.
    Collect(CellCoord),
    /// Put a coin into the cache in the cell.
    Deposit(CellCoord),
    /// Simulated sensor reading; `None` means no fix could be acquired.
    Locate(Option<GeoPoint>),
    /// Persist the game state.
    Save,
    /// Print the command list.
    Help,
    /// End the session.
    Quit,
}

/// Parses a line of input. Blank lines yield `None`.
pub(crate) fn parse(line: &str) -> Result<Option<Action>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let action = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("n" | "north", []) => Action::Move(Direction::North),
        ("s" | "south", []) => Action::Move(Direction::South),
        ("e" | "east", []) => Action::Move(Direction::East),
        ("w" | "west", []) => Action::Move(Direction::West),
        ("look" | "l", []) => Action::Look,
        ("collect" | "c", rest) => Action::Collect(parse_cell(rest)?),
        ("deposit" | "d", rest) => Action::Deposit(parse_cell(rest)?),
        ("locate", []) => Action::Locate(None),
        ("locate", [lat, lng]) => Action::Locate(Some(GeoPoint::new(
            parse_degrees(lat)?,
            parse_degrees(lng)?,
        ))),
        ("save", []) => Action::Save,
        ("help" | "?", []) => Action::Help,
        ("quit" | "q" | "exit", []) => Action::Quit,
        ("n" | "north" | "s" | "south" | "e" | "east" | "w" | "west" | "look" | "l" | "save"
        | "help" | "?" | "quit" | "q" | "exit" | "locate", _) => {
            bail!("unexpected arguments for `{verb}`")
        }
        _ => bail!("unknown command `{verb}`; type `help` for the command list"),
    };

    Ok(Some(action))
}

fn parse_cell(args: &[&str]) -> Result<CellCoord> {
    match args {
        [key] => key
            .parse()
            .with_context(|| format!("`{key}` is not a cell")),
        [i, j] => {
            let i = i.parse().with_context(|| format!("`{i}` is not a row index"))?;
            let j = j
                .parse()
                .with_context(|| format!("`{j}` is not a column index"))?;
            Ok(CellCoord::new(i, j))
        }
        _ => bail!("expected a cell as `<i> <j>` or `<i>,<j>`"),
    }
}

fn parse_degrees(text: &str) -> Result<f64> {
    let value: f64 = text
        .parse()
        .with_context(|| format!("`{text}` is not a coordinate"))?;
    if !value.is_finite() {
        bail!("`{text}` is not a finite coordinate");
    }
    Ok(value)
}
