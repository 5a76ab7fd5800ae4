//! Console command parsing.
//!
//! Each input line is `<player> <command> [args]`. The sell command accepts
//! the aliases `sellclaim`, `sellclaimblocks`, `sellblocks`, and the
//! two-word `sell blocks`, followed by an optional block count.

/// Usage string for the sell command.
pub const SELL_SYNTAX: &str = "sellblocks [<amount>]";

/// Usage string for the grant command.
pub const GIVE_SYNTAX: &str = "giveblocks <amount>";

const SELL_ALIASES: [&str; 3] = ["sellclaim", "sellclaimblocks", "sellblocks"];

/// Errors from parsing a console line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A player name was given without a command.
    #[error("missing command for player {0}")]
    MissingCommand(String),

    /// The command word is not recognized.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The amount argument is not an integer.
    #[error("invalid amount {value:?} ({reason}), usage: {syntax}")]
    InvalidAmount {
        /// The offending argument.
        value: String,
        /// Why it did not parse.
        reason: String,
        /// Usage for the command.
        syntax: &'static str,
    },

    /// Too many or too few arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// A parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sell blocks, or quote when no amount is given.
    SellBlocks {
        /// Requested block count as typed.
        amount: Option<i64>,
    },
    /// Grant bonus blocks to the player.
    GiveBlocks {
        /// Blocks to add.
        amount: u64,
    },
}

/// A command together with the player who issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleLine<'a> {
    /// Player display name.
    pub player: &'a str,
    /// What they asked for.
    pub command: Command,
}

/// Parse one console line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`CommandError`] when the line is not a valid command.
pub fn parse_line(line: &str) -> Result<Option<ConsoleLine<'_>>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(player) = words.next() else {
        return Ok(None);
    };
    let verb = words
        .next()
        .ok_or_else(|| CommandError::MissingCommand(player.to_owned()))?;

    let command = if SELL_ALIASES.contains(&verb.to_ascii_lowercase().as_str()) {
        parse_sell(words)?
    } else if verb.eq_ignore_ascii_case("sell") {
        match words.next() {
            Some(sub) if sub.eq_ignore_ascii_case("blocks") => parse_sell(words)?,
            _ => return Err(CommandError::UnknownCommand(line.trim().to_owned())),
        }
    } else if verb.eq_ignore_ascii_case("giveblocks") {
        parse_give(words)?
    } else {
        return Err(CommandError::UnknownCommand(verb.to_owned()));
    };

    Ok(Some(ConsoleLine { player, command }))
}

fn parse_sell<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<Command, CommandError> {
    let amount = match args.next() {
        None => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|e| CommandError::InvalidAmount {
            value: raw.to_owned(),
            reason: e.to_string(),
            syntax: SELL_SYNTAX,
        })?),
    };
    if args.next().is_some() {
        return Err(CommandError::Usage(SELL_SYNTAX));
    }
    Ok(Command::SellBlocks { amount })
}

fn parse_give<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<Command, CommandError> {
    let raw = args.next().ok_or(CommandError::Usage(GIVE_SYNTAX))?;
    let amount = raw.parse::<u64>().map_err(|e| CommandError::InvalidAmount {
        value: raw.to_owned(),
        reason: e.to_string(),
        syntax: GIVE_SYNTAX,
    })?;
    if args.next().is_some() {
        return Err(CommandError::Usage(GIVE_SYNTAX));
    }
    Ok(Command::GiveBlocks { amount })
}
