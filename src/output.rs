//! Rendering parse results for scripts: shell statements or JSON.
//!
//! The binary writes the rendered text to a temporary file and prints its
//! path, so a shell script can `source` the result.

use crate::parser::OptConfig;
use crate::value::Value;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Heredoc delimiter for usage output.
const USAGE_DELIMITER: &str = "OPTCONFIG_USAGE";

/// Option values and positional arguments after a parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Keyed by the display name of each option.
    pub values: BTreeMap<String, Value>,
    pub args: Vec<String>,
}

impl Report {
    /// Collect the current value of every option.
    pub fn new(opt: &OptConfig, args: Vec<String>) -> Self {
        let values = opt
            .options()
            .iter()
            .filter_map(|def| {
                let names = def.names();
                let name = names.iter().find(|n| n.len() > 1).or(names.first())?;
                Some((name.clone(), def.value().clone()))
            })
            .collect();
        Self { values, args }
    }
}

/// Escape a string for safe use in a shell double-quoted context.
///
/// Escapes: $, `, \, ", and !
fn escape_shell_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '$' => escaped.push_str("\\$"),
            '`' => escaped.push_str("\\`"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '!' => escaped.push_str("\\!"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Convert an option name to a valid shell variable name.
fn to_shell_var_name(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

/// Shell form of a value: booleans as `true`/empty, lists comma-joined.
fn shell_value(value: &Value) -> String {
    match value {
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render `export` statements for every option plus a `set --` line that
/// replaces the positional parameters.
pub fn render_shell(report: &Report, prefix: &str) -> String {
    let mut output = String::new();
    for (name, value) in &report.values {
        output.push_str(&format!(
            "export {}{}=\"{}\"\n",
            prefix,
            to_shell_var_name(name),
            escape_shell_value(&shell_value(value))
        ));
    }

    output.push_str("set --");
    for arg in &report.args {
        output.push_str(&format!(" \"{}\"", escape_shell_value(arg)));
    }
    output.push('\n');
    output
}

pub fn render_json(report: &Report) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

/// When sourced, prints the message to stderr and exits 1.
pub fn render_error(message: &str) -> String {
    format!(
        "echo \"optconfig: {}\" >&2\nexit 1\n",
        escape_shell_value(message)
    )
}

/// When sourced, prints the usage text and exits 0.
pub fn render_usage(text: &str) -> String {
    format!(
        "cat <<'{delimiter}'\n{text}{delimiter}\nexit 0\n",
        delimiter = USAGE_DELIMITER,
        text = text
    )
}

/// Write content to a temporary file and return its path.
///
/// The file persists after the process exits.
pub fn write_temp_file(content: &str) -> Result<PathBuf> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    let path = file.into_temp_path().keep()?;
    Ok(path)
}
