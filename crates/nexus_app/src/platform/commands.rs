use nexus_core::{JobId, Msg, SiteStrategy};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  list                               scrapers with status and metrics
  history                            recent runs, most recent first
  run <id>                           start a run
  stop <id>                          stop a running job
  new <STRATEGY> <url> <name...>     add a scraper (STATIC, DYNAMIC or API)
  edit <id> <STRATEGY> <url> <name...>
  console                            show or hide live console output
  clear                              clear the live console
  help
  quit";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Create {
        strategy: SiteStrategy,
        url: String,
        name: String,
    },
    Edit {
        id: JobId,
        strategy: SiteStrategy,
        url: String,
        name: String,
    },
    List,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown strategy `{0}`; expected STATIC, DYNAMIC or API")]
    Strategy(String),
}

/// `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "history" => Command::History,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "console" => Command::Dispatch(Msg::ConsoleToggled),
        "clear" => Command::Dispatch(Msg::ConsoleCleared),
        "run" => match rest.as_slice() {
            [id] => Command::Dispatch(Msg::RunClicked(id.to_string())),
            _ => return Err(CommandError::Usage("run <id>")),
        },
        "stop" => match rest.as_slice() {
            [id] => Command::Dispatch(Msg::StopClicked(id.to_string())),
            _ => return Err(CommandError::Usage("stop <id>")),
        },
        "new" => match rest.as_slice() {
            [strategy, url, name @ ..] if !name.is_empty() => Command::Create {
                strategy: parse_strategy(strategy)?,
                url: url.to_string(),
                name: name.join(" "),
            },
            _ => return Err(CommandError::Usage("new <STRATEGY> <url> <name...>")),
        },
        "edit" => match rest.as_slice() {
            [id, strategy, url, name @ ..] if !name.is_empty() => Command::Edit {
                id: id.to_string(),
                strategy: parse_strategy(strategy)?,
                url: url.to_string(),
                name: name.join(" "),
            },
            _ => return Err(CommandError::Usage("edit <id> <STRATEGY> <url> <name...>")),
        },
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_strategy(raw: &str) -> Result<SiteStrategy, CommandError> {
    SiteStrategy::parse(raw).ok_or_else(|| CommandError::Strategy(raw.to_string()))
}
