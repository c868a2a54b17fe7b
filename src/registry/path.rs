//! Module Path Parsing
//!
//! A path addresses a value below a root module:
//! - `name` - attribute access
//! - `[3]` - positional access into a sequence
//! - `['key']` / `["key"]` - keyed access into a mapping
//! - `[key]` - keyed access with a bare identifier key (as produced by
//!   `named_sub_modules` for identifier-like keys)
//!
//! Segments are separated by `.` and every segment starts with an identifier,
//! e.g. `sub.nested_list[1]['key'].predict`. Dots and brackets inside quoted
//! keys are part of the key.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::error::{PathError, PathResult};

fn identifier_regex() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"))
}

/// Check whether `s` is a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(s: &str) -> bool {
    identifier_regex().is_match(s)
}

/// One access step of a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Attribute access on a module.
    Attr(String),
    /// Positional access into a sequence.
    Index(usize),
    /// Keyed access into a mapping.
    Key(String),
}

impl PathStep {
    /// Render this step as it appears after a preceding step.
    pub fn render(&self) -> String {
        match self {
            PathStep::Attr(name) => format!(".{}", name),
            PathStep::Index(i) => format!("[{}]", i),
            PathStep::Key(k) => format!("['{}']", escape_key(k)),
        }
    }
}

fn escape_key(key: &str) -> String {
    key.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A parsed path: an ordered, non-empty sequence of steps starting with an
/// attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModulePath {
    steps: Vec<PathStep>,
}

impl ModulePath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Split into the final step and the steps leading to it.
    pub fn split_last(&self) -> Option<(&PathStep, &[PathStep])> {
        self.steps.split_last()
    }

    /// Render the first `n` steps.
    pub fn render_prefix(&self, n: usize) -> String {
        render_steps(&self.steps[..n.min(self.steps.len())])
    }
}

fn render_steps(steps: &[PathStep]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        match step {
            PathStep::Attr(name) if i == 0 => out.push_str(name),
            _ => out.push_str(&step.render()),
        }
    }
    out
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_steps(&self.steps))
    }
}

impl FromStr for ModulePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

/// Parse a path string into its steps.
///
/// # Errors
/// `PathError::MalformedPath` on an empty path, an empty segment, unbalanced
/// brackets, an unterminated quote, or a bracket token that is neither an
/// integer, a quoted string, nor a bare identifier.
pub fn parse_path(path: &str) -> PathResult<ModulePath> {
    PathLexer::new(path).parse()
}

/// Hand-written scanner over the path characters.
struct PathLexer<'a> {
    source: &'a str,
    input: Vec<char>,
    pos: usize,
}

impl<'a> PathLexer<'a> {
    fn new(source: &'a str) -> Self {
        PathLexer {
            source,
            input: source.chars().collect(),
            pos: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        Some(ch)
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::malformed(self.source, reason)
    }

    fn parse(mut self) -> PathResult<ModulePath> {
        if self.input.is_empty() {
            return Err(self.error("empty path"));
        }

        let mut steps = Vec::new();
        loop {
            steps.push(PathStep::Attr(self.identifier()?));
            while self.current() == Some('[') {
                self.advance();
                steps.push(self.bracket()?);
            }
            match self.current() {
                None => break,
                Some('.') => {
                    self.advance();
                    if self.current().is_none() {
                        return Err(self.error("trailing '.'"));
                    }
                }
                Some(']') => {
                    return Err(self.error(format!("unbalanced ']' at position {}", self.pos)));
                }
                Some(c) => {
                    return Err(self.error(format!("unexpected '{}' at position {}", c, self.pos)));
                }
            }
        }
        Ok(ModulePath::new(steps))
    }

    fn identifier(&mut self) -> PathResult<String> {
        let start = self.pos;
        match self.current() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some('.') => return Err(self.error(format!("empty segment at position {}", start))),
            Some(c) => {
                return Err(self.error(format!(
                    "expected identifier at position {}, found '{}'",
                    start, c
                )))
            }
            None => return Err(self.error("expected identifier at end of path")),
        }
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].iter().collect())
    }

    /// Parse the inside of `[...]`; the opening bracket is already consumed.
    fn bracket(&mut self) -> PathResult<PathStep> {
        match self.current() {
            Some(q @ ('\'' | '"')) => {
                self.advance();
                let key = self.quoted(q)?;
                match self.current() {
                    Some(']') => {
                        self.advance();
                        Ok(PathStep::Key(key))
                    }
                    None => Err(self.error("unbalanced '['")),
                    Some(c) => Err(self.error(format!(
                        "expected ']' after quoted key, found '{}'",
                        c
                    ))),
                }
            }
            _ => self.bare(),
        }
    }

    fn quoted(&mut self, quote: char) -> PathResult<String> {
        let mut key = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated quoted key")),
                Some('\\') => match self.advance() {
                    Some(c) => key.push(c),
                    None => return Err(self.error("unterminated quoted key")),
                },
                Some(c) if c == quote => return Ok(key),
                Some(c) => key.push(c),
            }
        }
    }

    fn bare(&mut self) -> PathResult<PathStep> {
        let start = self.pos;
        loop {
            match self.current() {
                None => return Err(self.error("unbalanced '['")),
                Some('[') => return Err(self.error(format!("unbalanced '[' at position {}", self.pos))),
                Some(']') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }
        let token: String = self.input[start..self.pos].iter().collect();
        self.advance();

        if token.is_empty() {
            return Err(self.error("empty brackets"));
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            return token
                .parse::<usize>()
                .map(PathStep::Index)
                .map_err(|_| self.error(format!("index '{}' is too large", token)));
        }
        if is_identifier(&token) {
            return Ok(PathStep::Key(token));
        }
        Err(self.error(format!(
            "bracket token '{}' is neither an integer nor a quoted string",
            token
        )))
    }
}
