//! Command-line parameters for task actions
//!
//! Tasks declare [`Param`]s; at invocation time the arguments following a task
//! name are parsed against those declarations and the resulting values are
//! substituted into `%(name)s` placeholders of the task's shell actions.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{DoableError, DoableResult};

/// Resolved parameter values keyed by parameter name
pub type ParamValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Integer,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub long: String,
    pub short: Option<char>,
    pub kind: ParamType,
    pub default: String,
    pub help: Option<String>,
}

impl Param {
    /// A string parameter whose long flag equals its name
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            long: name.clone(),
            name,
            short: None,
            kind: ParamType::String,
            default: default.into(),
            help: None,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Check `value` against the parameter type and normalise it
    pub fn validate(&self, value: &str) -> DoableResult<String> {
        match self.kind {
            ParamType::String => Ok(value.to_string()),
            ParamType::Integer => value
                .trim()
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|_| {
                    DoableError::InvalidParam(format!(
                        "'{}' expects an integer, got '{}'",
                        self.long, value
                    ))
                }),
            ParamType::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok("true".to_string()),
                "false" | "no" | "off" | "0" => Ok("false".to_string()),
                _ => Err(DoableError::InvalidParam(format!(
                    "'{}' expects a boolean, got '{}'",
                    self.long, value
                ))),
            },
        }
    }

    /// Whether `flag` (with its leading dashes) names this parameter
    pub fn matches_flag(&self, flag: &str) -> bool {
        if let Some(long) = flag.strip_prefix("--") {
            return long == self.long;
        }
        match (flag.strip_prefix('-'), self.short) {
            (Some(s), Some(short)) => s.chars().eq(std::iter::once(short)),
            _ => false,
        }
    }

    /// Whether the flag consumes the following argument as its value
    pub fn takes_value(&self) -> bool {
        self.kind != ParamType::Boolean
    }
}

/// Parse `args` against `params`, starting from the declared defaults.
///
/// Accepts `--long value`, `--long=value` and `-s value`. Boolean parameters
/// given without an inline value are switched on.
pub fn parse_params(params: &[Param], args: &[String]) -> DoableResult<ParamValues> {
    let mut values: ParamValues = params
        .iter()
        .map(|p| (p.name.clone(), p.default.clone()))
        .collect();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if !arg.starts_with('-') || arg == "-" || arg == "--" {
            return Err(DoableError::InvalidParam(format!(
                "unexpected argument '{}'",
                arg
            )));
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => (arg.as_str(), None),
        };

        let param = params
            .iter()
            .find(|p| p.matches_flag(flag))
            .ok_or_else(|| DoableError::InvalidParam(format!("unknown option '{}'", flag)))?;

        let raw = match inline {
            Some(value) => value,
            None if !param.takes_value() => "true".to_string(),
            None => iter.next().cloned().ok_or_else(|| {
                DoableError::InvalidParam(format!("option '{}' requires a value", flag))
            })?,
        };

        values.insert(param.name.clone(), param.validate(&raw)?);
    }

    Ok(values)
}

/// Replace `%(name)s` placeholders with values and `%%` with `%`.
///
/// A `%` that starts neither form is copied through unchanged.
pub fn substitute(template: &str, values: &ParamValues) -> DoableResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("%%") {
            out.push('%');
            rest = after;
        } else if let Some(inner) = tail.strip_prefix("%(") {
            let end = inner.find(")s").ok_or_else(|| {
                DoableError::InvalidParam(format!("unterminated placeholder in '{}'", template))
            })?;
            let key = &inner[..end];
            let value = values.get(key).ok_or_else(|| {
                DoableError::InvalidParam(format!(
                    "no value for placeholder '%({})s' in '{}'",
                    key, template
                ))
            })?;
            out.push_str(value);
            rest = &inner[end + 2..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(value: &str) -> String {
    let suffix = match value.strip_prefix('~') {
        Some(s) if s.is_empty() || s.starts_with('/') || s.starts_with('\\') => s,
        _ => return value.to_string(),
    };

    match dirs::home_dir() {
        Some(home) => match suffix.trim_start_matches(['/', '\\']) {
            "" => home.display().to_string(),
            rest => home.join(rest).display().to_string(),
        },
        None => value.to_string(),
    }
}
