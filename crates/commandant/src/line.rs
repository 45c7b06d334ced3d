#![forbid(unsafe_code)]

//! Command line tokenizer and parsed argument list.
//!
//! A command line is a single string holding the command name followed by
//! its arguments:
//!
//! ```text
//! CreateBox -name {My Box} -size 5 -force
//! ```
//!
//! # Grammar
//!
//! - The first token is the command name.
//! - A token starting with `-` followed by a letter opens a named parameter;
//!   the next token becomes its value. A named parameter directly followed
//!   by another named parameter (or the end of the line) holds the empty
//!   value, which is how presence flags like `-force` are expressed.
//! - `"..."` and `{...}` group a value containing whitespace into one token.
//!   Braces nest; quotes do not.
//! - Anything else is a positional argument.
//! - Tokens starting with `-` followed by a digit are values, so negative
//!   numbers need no escaping.
//!
//! Named lookup is case-insensitive. A [`CommandLine`] is immutable once
//! parsed; after a successful execution the history entry takes ownership
//! of the line used.

use crate::error::{CommandError, Result};
use std::fmt;
use std::str::FromStr;

/// One parsed argument: named (`-key value`) or positional.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    key: Option<String>,
    value: String,
}

/// A raw token plus whether it was quote- or brace-grouped.
///
/// Grouped tokens are never interpreted as parameter names, so
/// `"-literal"` stays a value.
struct Token {
    text: String,
    grouped: bool,
}

impl Token {
    fn is_flag(&self) -> bool {
        !self.grouped
            && self.text.len() >= 2
            && self.text.starts_with('-')
            && self.text.as_bytes()[1].is_ascii_alphabetic()
    }
}

/// An immutable, parsed command line: command name plus argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    name: String,
    params: Vec<Param>,
}

impl CommandLine {
    /// Parse a full command string (name plus arguments).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Parse`] when the input is empty, the command
    /// name is quote-grouped, or a quote/brace group is left unterminated.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut iter = tokens.into_iter().peekable();
        let Some(first) = iter.next() else {
            return Err(CommandError::Parse("empty command line".to_string()));
        };
        if first.grouped {
            return Err(CommandError::Parse(
                "command name cannot be quoted or braced".to_string(),
            ));
        }
        let name = first.text;

        let mut params = Vec::new();
        while let Some(token) = iter.next() {
            if token.is_flag() {
                let key = token.text[1..].to_string();
                let value = if iter.peek().is_some_and(|next| !next.is_flag()) {
                    iter.next().map(|t| t.text).unwrap_or_default()
                } else {
                    String::new()
                };
                params.push(Param {
                    key: Some(key),
                    value,
                });
            } else {
                params.push(Param {
                    key: None,
                    value: token.text,
                });
            }
        }

        Ok(Self { name, params })
    }

    /// The command name, exactly as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of parsed arguments, named and positional.
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// Whether the line carries no arguments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Name of the argument at `index`, or `None` when it is positional or
    /// out of range.
    #[must_use]
    pub fn param_name(&self, index: usize) -> Option<&str> {
        self.params.get(index)?.key.as_deref()
    }

    /// Value of the argument at `index`.
    #[must_use]
    pub fn param_value(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|p| p.value.as_str())
    }

    /// Case-insensitive lookup of a named parameter's value.
    ///
    /// When the same name appears more than once the first occurrence wins.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(key)))
            .map(|p| p.value.as_str())
    }

    /// Like [`CommandLine::value`] but with a fallback default.
    #[must_use]
    pub fn value_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.value(key).unwrap_or(default)
    }

    /// The `index`-th positional (unnamed) argument.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.params
            .iter()
            .filter(|p| p.key.is_none())
            .nth(index)
            .map(|p| p.value.as_str())
    }

    /// Whether a named parameter is present, with or without a value.
    #[must_use]
    pub fn has_param(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Whether a named parameter is present with a non-empty value.
    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.value(key).is_some_and(|v| !v.is_empty())
    }

    /// Typed lookup through [`FromStr`]. Absent parameters yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Parse`] when the raw value does not parse.
    pub fn value_as<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.value(key) else {
            return Ok(None);
        };
        raw.trim().parse::<T>().map(Some).map_err(|_| {
            CommandError::Parse(format!(
                "parameter '-{key}': cannot interpret value '{raw}'"
            ))
        })
    }

    /// Tolerant boolean lookup.
    ///
    /// Accepts `true`/`false`, `1`/`0`, `yes`/`no`, and `on`/`off` in any
    /// case. A parameter present with the empty value (a bare flag such as
    /// `-force`) reads as `true`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Parse`] for any other value.
    pub fn value_as_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.value(key) else {
            return Ok(None);
        };
        let v = raw.trim();
        if v.is_empty() {
            return Ok(Some(true));
        }
        for truthy in ["true", "1", "yes", "on"] {
            if v.eq_ignore_ascii_case(truthy) {
                return Ok(Some(true));
            }
        }
        for falsy in ["false", "0", "no", "off"] {
            if v.eq_ignore_ascii_case(falsy) {
                return Ok(Some(false));
            }
        }
        Err(CommandError::Parse(format!(
            "parameter '-{key}': '{raw}' is not a boolean"
        )))
    }
}

impl fmt::Display for CommandLine {
    /// Render the line back into parseable text.
    ///
    /// Values needing grouping get braces, falling back to quotes when they
    /// contain brace characters. A value containing both quote and brace
    /// characters cannot be represented in this grammar and renders
    /// best-effort.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for p in &self.params {
            match &p.key {
                Some(key) => write!(f, " -{key} {}", render_value(&p.value))?,
                None => write!(f, " {}", render_value(&p.value))?,
            }
        }
        Ok(())
    }
}

fn render_value(value: &str) -> String {
    let needs_grouping = value.is_empty()
        || value.chars().any(char::is_whitespace)
        || value.starts_with('-')
        || value.starts_with('"')
        || value.starts_with('{');
    if !needs_grouping {
        return value.to_string();
    }
    if value.contains('{') || value.contains('}') {
        format!("\"{value}\"")
    } else {
        format!("{{{value}}}")
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&c) = chars.peek() else {
            break;
        };

        if c == '"' {
            chars.next();
            let mut tok = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => tok.push(ch),
                    None => {
                        return Err(CommandError::Parse("unterminated quote".to_string()));
                    }
                }
            }
            tokens.push(Token {
                text: tok,
                grouped: true,
            });
        } else if c == '{' {
            chars.next();
            let mut tok = String::new();
            let mut depth = 1usize;
            loop {
                match chars.next() {
                    Some('{') => {
                        depth += 1;
                        tok.push('{');
                    }
                    Some('}') => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                        tok.push('}');
                    }
                    Some(ch) => tok.push(ch),
                    None => {
                        return Err(CommandError::Parse("unterminated brace".to_string()));
                    }
                }
            }
            tokens.push(Token {
                text: tok,
                grouped: true,
            });
        } else {
            let mut tok = String::new();
            while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace()) {
                tok.push(ch);
            }
            tokens.push(Token {
                text: tok,
                grouped: false,
            });
        }
    }

    Ok(tokens)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_parameters() {
        let line = CommandLine::parse("CreateBox -name Box1 -size 5").unwrap();
        assert_eq!(line.name(), "CreateBox");
        assert_eq!(line.num_params(), 2);
        assert_eq!(line.value("name"), Some("Box1"));
        assert_eq!(line.value("size"), Some("5"));
        assert_eq!(line.value("missing"), None);
    }

    #[test]
    fn test_parse_positional_parameters() {
        let line = CommandLine::parse("Select Box1 Box2 Box3").unwrap();
        assert_eq!(line.num_params(), 3);
        assert_eq!(line.positional(0), Some("Box1"));
        assert_eq!(line.positional(2), Some("Box3"));
        assert_eq!(line.positional(3), None);
        assert_eq!(line.param_name(0), None);
    }

    #[test]
    fn test_parse_mixed_parameters() {
        let line = CommandLine::parse("Move Box1 -x 10 -y 20").unwrap();
        assert_eq!(line.positional(0), Some("Box1"));
        assert_eq!(line.value("x"), Some("10"));
        assert_eq!(line.value("y"), Some("20"));
        assert_eq!(line.param_name(1), Some("x"));
        assert_eq!(line.param_value(1), Some("10"));
    }

    #[test]
    fn test_quoted_value_keeps_whitespace() {
        let line = CommandLine::parse("Rename -from \"My Box\" -to Other").unwrap();
        assert_eq!(line.value("from"), Some("My Box"));
        assert_eq!(line.value("to"), Some("Other"));
    }

    #[test]
    fn test_braced_value_nests() {
        let line = CommandLine::parse("Schedule -cmd {CreateBox -name {My Box}}").unwrap();
        assert_eq!(line.value("cmd"), Some("CreateBox -name {My Box}"));
    }

    #[test]
    fn test_bare_flag_has_empty_value() {
        let line = CommandLine::parse("Delete -force -name Box1").unwrap();
        assert_eq!(line.value("force"), Some(""));
        assert!(line.has_param("force"));
        assert!(!line.has_value("force"));
        assert_eq!(line.value("name"), Some("Box1"));
    }

    #[test]
    fn test_trailing_flag_has_empty_value() {
        let line = CommandLine::parse("Save -all").unwrap();
        assert_eq!(line.value("all"), Some(""));
    }

    #[test]
    fn test_negative_numbers_are_values() {
        let line = CommandLine::parse("Move -x -5 -y -3.5").unwrap();
        assert_eq!(line.value("x"), Some("-5"));
        assert_eq!(line.value_as::<i32>("x").unwrap(), Some(-5));
        assert_eq!(line.value_as::<f64>("y").unwrap(), Some(-3.5));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let line = CommandLine::parse("CreateBox -Name Box1").unwrap();
        assert_eq!(line.value("name"), Some("Box1"));
        assert_eq!(line.value("NAME"), Some("Box1"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let line = CommandLine::parse("Cmd -key a -KEY b").unwrap();
        assert_eq!(line.value("key"), Some("a"));
    }

    #[test]
    fn test_value_as_parse_failure() {
        let line = CommandLine::parse("Cmd -count five").unwrap();
        let err = line.value_as::<u32>("count").unwrap_err();
        assert!(matches!(err, CommandError::Parse(_)));
    }

    #[test]
    fn test_value_as_bool_variants() {
        let line = CommandLine::parse("Cmd -a true -b 0 -c YES -d off -e").unwrap();
        assert_eq!(line.value_as_bool("a").unwrap(), Some(true));
        assert_eq!(line.value_as_bool("b").unwrap(), Some(false));
        assert_eq!(line.value_as_bool("c").unwrap(), Some(true));
        assert_eq!(line.value_as_bool("d").unwrap(), Some(false));
        assert_eq!(line.value_as_bool("e").unwrap(), Some(true));
        assert_eq!(line.value_as_bool("missing").unwrap(), None);
    }

    #[test]
    fn test_value_as_bool_rejects_garbage() {
        let line = CommandLine::parse("Cmd -flag maybe").unwrap();
        assert!(line.value_as_bool("flag").is_err());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(
            CommandLine::parse(""),
            Err(CommandError::Parse(_))
        ));
        assert!(matches!(
            CommandLine::parse("   \t  "),
            Err(CommandError::Parse(_))
        ));
    }

    #[test]
    fn test_unterminated_groups_are_errors() {
        assert!(CommandLine::parse("Cmd -name \"open").is_err());
        assert!(CommandLine::parse("Cmd -name {open").is_err());
        assert!(CommandLine::parse("Cmd -name {a {b}").is_err());
    }

    #[test]
    fn test_grouped_token_is_never_a_flag() {
        let line = CommandLine::parse("Echo \"-not-a-flag\"").unwrap();
        assert_eq!(line.positional(0), Some("-not-a-flag"));
        assert_eq!(line.num_params(), 1);
    }

    #[test]
    fn test_quoted_command_name_is_an_error() {
        assert!(CommandLine::parse("\"CreateBox\" -name x").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let original = "CreateBox -name {My Box} -size 5 -force {} tail";
        let line = CommandLine::parse(original).unwrap();
        let rendered = line.to_string();
        let reparsed = CommandLine::parse(&rendered).unwrap();
        assert_eq!(line, reparsed);
    }

    #[test]
    fn test_display_groups_empty_and_spaced_values() {
        let line = CommandLine::parse("Cmd -force -path {a b}").unwrap();
        let rendered = line.to_string();
        assert!(rendered.contains("-force {}"));
        assert!(rendered.contains("{a b}"));
        assert_eq!(CommandLine::parse(&rendered).unwrap(), line);
    }
}
