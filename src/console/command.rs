//! Parsing of interpreter input lines.

use std::sync::OnceLock;

use regex::Regex;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        // A double-quoted run (quotes dropped) or a bare run of non-space.
        Regex::new(r#""([^"]*)"|(\S+)"#).expect("token pattern is a valid regex")
    })
}

/// Splits a line into whitespace-separated tokens.
///
/// Double-quoted tokens may contain spaces; the quotes are removed.
///
/// # Examples
///
/// ```
/// use hbnb::console::tokenize;
///
/// let tokens = tokenize(r#"update BaseModel 42 name "Betty Holberton""#);
/// assert_eq!(tokens, ["update", "BaseModel", "42", "name", "Betty Holberton"]);
/// ```
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    token_re()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// One interpreter command with its (possibly missing) arguments.
///
/// Arguments are kept optional here; the interpreter decides which
/// diagnostic to print for each missing piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create <TypeName>`
    Create {
        /// Type to instantiate.
        class: Option<String>,
    },
    /// `show <TypeName> <id>`
    Show {
        /// Type name.
        class: Option<String>,
        /// Model id.
        id: Option<String>,
    },
    /// `destroy <TypeName> <id>`
    Destroy {
        /// Type name.
        class: Option<String>,
        /// Model id.
        id: Option<String>,
    },
    /// `all [TypeName]`
    All {
        /// Optional type filter.
        class: Option<String>,
    },
    /// `update <TypeName> <id> <attr> <value>`
    Update {
        /// Type name.
        class: Option<String>,
        /// Model id.
        id: Option<String>,
        /// Attribute to set.
        attribute: Option<String>,
        /// New string value.
        value: Option<String>,
    },
    /// `help [command]`
    Help {
        /// Command to describe.
        topic: Option<String>,
    },
    /// `quit`
    Quit,
    /// End of input, or a literal `EOF`.
    Eof,
    /// Blank line.
    Empty,
    /// Anything else; holds the trimmed line.
    Unknown(String),
}

impl Command {
    /// Parses one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let mut tokens = tokenize(trimmed).into_iter();
        let Some(name) = tokens.next() else {
            return Self::Empty;
        };
        let mut arg = || tokens.next();

        match name.as_str() {
            "create" => Self::Create { class: arg() },
            "show" => Self::Show {
                class: arg(),
                id: arg(),
            },
            "destroy" => Self::Destroy {
                class: arg(),
                id: arg(),
            },
            "all" => Self::All { class: arg() },
            "update" => Self::Update {
                class: arg(),
                id: arg(),
                attribute: arg(),
                value: arg(),
            },
            "help" => Self::Help { topic: arg() },
            "quit" => Self::Quit,
            "EOF" => Self::Eof,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}
