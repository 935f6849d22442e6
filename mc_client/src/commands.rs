use movie_catalog::models::MovieId;
use std::collections::HashMap;
use std::fmt;

/// Commands understood by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        username: String,
        email: String,
        password: String,
    },
    SignOut,
    WhoAmI,
    /// Update username and optional phone.
    Profile {
        username: String,
        phone: Option<String>,
    },
    /// Upload a local image and use it as avatar.
    Avatar {
        path: String,
    },
    /// Open a movie card.
    Movie {
        id: MovieId,
        title: String,
        poster_path: Option<String>,
        vote_average: Option<f64>,
        release_date: Option<String>,
    },
    /// Save or unsave an opened movie.
    Toggle {
        id: MovieId,
    },
    Saved,
    Unsave {
        id: MovieId,
    },
    /// Record that a search term led to a movie.
    Search {
        term: String,
        id: MovieId,
        title: String,
        poster_path: Option<String>,
    },
    Trending,
    Posts,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command given without its required arguments.
    MissingArguments {
        command: &'static str,
        usage: &'static str,
    },
    /// Movie id is not a positive integer.
    InvalidMovieId(String),
    /// Rating is not a number between 0 and 10.
    InvalidRating(String),
    /// Option not accepted by the command.
    UnknownOption {
        command: &'static str,
        option: String,
    },
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArguments { command, usage } => {
                write!(f, "'{}' is missing arguments. Usage: {}", command, usage)
            }
            Self::InvalidMovieId(value) => write!(
                f,
                "Invalid movie id '{}'. Must be a positive number (e.g., 'toggle 550')",
                value
            ),
            Self::InvalidRating(value) => write!(
                f,
                "Invalid rating '{}'. Must be a number from 0 to 10 (e.g., '--rating 8.4')",
                value
            ),
            Self::UnknownOption { command, option } => {
                write!(f, "'{}' does not accept option '{}'", command, option)
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const USAGE: &str = "\
Commands:
  signin EMAIL PASSWORD            Sign in
  signup USERNAME EMAIL PASSWORD   Create an account and sign in
  signout                          Sign out
  whoami                           Show the signed-in profile
  profile USERNAME [PHONE]         Update username and phone
  avatar PATH                      Upload PATH as the profile image
  movie ID TITLE... [--poster P] [--rating R] [--released YYYY-MM-DD]
                                   Open a movie card
  toggle ID                        Save or unsave an opened movie
  saved                            List saved movies
  unsave ID                        Remove a movie from the saved list
  search TERM ID TITLE... [--poster P]
                                   Count a search that led to a movie
  trending                         Show the most searched movies
  posts                            List your video posts
  help                             Show this message
  quit                             Exit";

/// Parse a command string into a ClientCommand.
///
/// # Examples
///
/// ```
/// use mc_client::commands::{ClientCommand, parse_command};
///
/// assert_eq!(parse_command("saved"), Ok(ClientCommand::Saved));
/// assert_eq!(parse_command("toggle 550"), Ok(ClientCommand::Toggle { id: 550 }));
/// assert!(parse_command("toggle abc").is_err());
/// ```
pub fn parse_command(input: &str) -> Result<ClientCommand, ParseError> {
    let trimmed = input.trim();

    match trimmed {
        "signout" | "logout" => return Ok(ClientCommand::SignOut),
        "whoami" => return Ok(ClientCommand::WhoAmI),
        "saved" => return Ok(ClientCommand::Saved),
        "trending" => return Ok(ClientCommand::Trending),
        "posts" => return Ok(ClientCommand::Posts),
        "help" | "?" => return Ok(ClientCommand::Help),
        "quit" | "exit" => return Ok(ClientCommand::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"signin") => match parts.as_slice() {
            [_, email, password] => Ok(ClientCommand::SignIn {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(missing("signin", "signin EMAIL PASSWORD")),
        },
        Some(&"signup") => match parts.as_slice() {
            [_, username, email, password] => Ok(ClientCommand::SignUp {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(missing("signup", "signup USERNAME EMAIL PASSWORD")),
        },
        Some(&"profile") => match parts.as_slice() {
            [_, username] => Ok(ClientCommand::Profile {
                username: username.to_string(),
                phone: None,
            }),
            [_, username, phone] => Ok(ClientCommand::Profile {
                username: username.to_string(),
                phone: Some(phone.to_string()),
            }),
            _ => Err(missing("profile", "profile USERNAME [PHONE]")),
        },
        Some(&"avatar") => match parts.get(1) {
            // Paths may contain spaces
            Some(_) => Ok(ClientCommand::Avatar {
                path: rest_after(trimmed, 1),
            }),
            None => Err(missing("avatar", "avatar PATH")),
        },
        Some(&"movie") => parse_movie_command(&parts),
        Some(&"toggle") => match parts.get(1) {
            Some(id) => Ok(ClientCommand::Toggle {
                id: parse_movie_id(id)?,
            }),
            None => Err(missing("toggle", "toggle ID")),
        },
        Some(&"unsave") => match parts.get(1) {
            Some(id) => Ok(ClientCommand::Unsave {
                id: parse_movie_id(id)?,
            }),
            None => Err(missing("unsave", "unsave ID")),
        },
        Some(&"search") => parse_search_command(&parts),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

fn missing(command: &'static str, usage: &'static str) -> ParseError {
    ParseError::MissingArguments { command, usage }
}

fn parse_movie_id(value: &str) -> Result<MovieId, ParseError> {
    value
        .parse::<MovieId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ParseError::InvalidMovieId(value.to_string()))
}

/// Remainder of `input` after skipping `words` whitespace-separated words
fn rest_after(input: &str, words: usize) -> String {
    let mut rest = input;
    for _ in 0..words {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    rest.trim().to_string()
}

/// Split words into positional words and `--name value` options
///
/// Only options listed in `allowed` are accepted; an option without a value
/// is treated as missing.
fn split_options<'a>(
    command: &'static str,
    usage: &'static str,
    words: &[&'a str],
    allowed: &[&str],
) -> Result<(Vec<&'a str>, HashMap<&'a str, &'a str>), ParseError> {
    let mut positional = Vec::new();
    let mut options = HashMap::new();
    let mut rest = words.iter();
    while let Some(word) = rest.next() {
        if !word.starts_with("--") {
            positional.push(*word);
            continue;
        }
        if !allowed.contains(word) {
            return Err(ParseError::UnknownOption {
                command,
                option: word.to_string(),
            });
        }
        let value = rest.next().ok_or_else(|| missing(command, usage))?;
        options.insert(*word, *value);
    }
    Ok((positional, options))
}

fn parse_rating(value: &str) -> Result<f64, ParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|r| (0.0..=10.0).contains(r))
        .ok_or_else(|| ParseError::InvalidRating(value.to_string()))
}

/// Parse "movie ID TITLE... [--poster PATH] [--rating R] [--released DATE]"
fn parse_movie_command(parts: &[&str]) -> Result<ClientCommand, ParseError> {
    let usage = "movie ID TITLE... [--poster PATH] [--rating R] [--released YYYY-MM-DD]";
    let id = parts.get(1).ok_or_else(|| missing("movie", usage))?;
    let id = parse_movie_id(id)?;

    let (title, options) = split_options(
        "movie",
        usage,
        parts.get(2..).unwrap_or_default(),
        &["--poster", "--rating", "--released"],
    )?;
    if title.is_empty() {
        return Err(missing("movie", usage));
    }

    Ok(ClientCommand::Movie {
        id,
        title: title.join(" "),
        poster_path: options.get("--poster").map(|p| p.to_string()),
        vote_average: options.get("--rating").map(|r| parse_rating(r)).transpose()?,
        release_date: options.get("--released").map(|d| d.to_string()),
    })
}

/// Parse "search TERM ID TITLE... [--poster PATH]"
fn parse_search_command(parts: &[&str]) -> Result<ClientCommand, ParseError> {
    let usage = "search TERM ID TITLE... [--poster PATH]";
    let (words, options) = split_options(
        "search",
        usage,
        parts.get(1..).unwrap_or_default(),
        &["--poster"],
    )?;

    match words.as_slice() {
        [term, id, title @ ..] if !title.is_empty() => Ok(ClientCommand::Search {
            term: term.to_string(),
            id: parse_movie_id(id)?,
            title: title.join(" "),
            poster_path: options.get("--poster").map(|p| p.to_string()),
        }),
        _ => Err(missing("search", usage)),
    }
}
