#![forbid(unsafe_code)]

//! Declared command parameters and argument validation.
//!
//! A command may describe the parameters it understands through a
//! [`CommandSyntax`]. The manager validates every parsed line against the
//! command's syntax between lookup and execution, so command bodies can
//! assume required parameters are present and typed values parse.
//!
//! A command that declares no parameters opts out: validation passes any
//! argument list through. A command that declares at least one parameter
//! opts into strict checking, and undeclared named parameters are rejected.

use crate::line::CommandLine;
use std::fmt;

/// Value category a declared parameter is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any text, no constraint.
    String,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Tolerant boolean (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`,
    /// or a bare flag).
    Bool,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    description: String,
    kind: ParamKind,
    required: bool,
    default: Option<String>,
}

impl ParamSpec {
    /// Declared parameter name (matched case-insensitively).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description for help output.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Value category checked during validation.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Whether the parameter must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default value for optional parameters.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// The declared parameter list of a command.
#[derive(Debug, Clone, Default)]
pub struct CommandSyntax {
    params: Vec<ParamSpec>,
}

impl CommandSyntax {
    /// An empty syntax: validation passes everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required parameter.
    #[must_use]
    pub fn required(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ParamKind,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            description: description.into(),
            kind,
            required: true,
            default: None,
        });
        self
    }

    /// Declare an optional parameter with a default value.
    #[must_use]
    pub fn optional(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ParamKind,
        default: impl Into<String>,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            default: Some(default.into()),
        });
        self
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameters were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Declared parameter at `index`, in declaration order.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&ParamSpec> {
        self.params.get(index)
    }

    /// Case-insensitive lookup of a declared parameter.
    #[must_use]
    pub fn find_param(&self, name: &str) -> Option<&ParamSpec> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Default value of an optional parameter, by name.
    #[must_use]
    pub fn default_of(&self, name: &str) -> Option<&str> {
        self.find_param(name)?.default.as_deref()
    }

    /// Check a parsed line against the declaration.
    ///
    /// Verifies that every required parameter is present, every declared
    /// parameter that is present has a value of the declared kind, and (for
    /// non-empty declarations) that no undeclared named parameter appears.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first violation found.
    pub fn validate(&self, line: &CommandLine) -> std::result::Result<(), String> {
        if self.params.is_empty() {
            return Ok(());
        }

        for spec in &self.params {
            if spec.required && !line.has_param(&spec.name) {
                return Err(format!("missing required parameter '-{}'", spec.name));
            }
            if line.has_param(&spec.name) {
                check_kind(line, spec)?;
            }
        }

        for index in 0..line.num_params() {
            if let Some(name) = line.param_name(index) {
                if self.find_param(name).is_none() {
                    return Err(format!("unknown parameter '-{name}'"));
                }
            }
        }

        Ok(())
    }

    /// Render a help string listing every declared parameter.
    #[must_use]
    pub fn usage(&self) -> String {
        let mut out = String::new();
        for spec in &self.params {
            let marker = if spec.required {
                "(required)".to_string()
            } else {
                match &spec.default {
                    Some(d) if !d.is_empty() => format!("(default: {d})"),
                    _ => "(optional)".to_string(),
                }
            };
            out.push_str(&format!(
                "  -{} <{}> {} {}\n",
                spec.name, spec.kind, marker, spec.description
            ));
        }
        out
    }
}

fn check_kind(line: &CommandLine, spec: &ParamSpec) -> std::result::Result<(), String> {
    let bad = |raw: &str| {
        format!(
            "parameter '-{}' expects a {} value, got '{raw}'",
            spec.name, spec.kind
        )
    };
    match spec.kind {
        ParamKind::String => Ok(()),
        ParamKind::Int => match line.value_as::<i64>(&spec.name) {
            Ok(_) => Ok(()),
            Err(_) => Err(bad(line.value(&spec.name).unwrap_or_default())),
        },
        ParamKind::Float => match line.value_as::<f64>(&spec.name) {
            Ok(_) => Ok(()),
            Err(_) => Err(bad(line.value(&spec.name).unwrap_or_default())),
        },
        ParamKind::Bool => match line.value_as_bool(&spec.name) {
            Ok(_) => Ok(()),
            Err(_) => Err(bad(line.value(&spec.name).unwrap_or_default())),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
