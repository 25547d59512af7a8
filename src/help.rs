//! Usage text generation.
//!
//! Each described option gets one entry: its short names, then its long
//! names, followed by the description in a column starting at 26.
//!
//! ```text
//!   -x, --long              option description
//!   -s, --longlonglonglonglonglong
//!                           option description
//! ```

use crate::option::OptionDef;
use crate::parser::OptConfig;

/// Column where descriptions start.
const DESCRIPTION_COLUMN: usize = 26;

/// Render the usage text for every option that has a description.
///
/// `%s` in a description is replaced by the option's current value, so
/// the text shows defaults before a parse and parsed values after it.
pub fn usage(opt: &OptConfig) -> String {
    let mut out = String::new();
    for def in opt.options() {
        if let Some(entry) = entry(def) {
            out.push_str(&entry);
        }
    }
    out
}

/// Usage text with a `Usage:` line for the given program name on top.
pub fn usage_with_header(opt: &OptConfig, program: &str) -> String {
    let body = usage(opt);
    if body.is_empty() {
        format!("Usage: {}\n", program)
    } else {
        format!("Usage: {} [options]\n\nOptions:\n{}", program, body)
    }
}

fn entry(def: &OptionDef) -> Option<String> {
    let description = def.description()?;

    let mut short = Vec::new();
    let mut long = Vec::new();
    for (name, declared) in def.names().iter().zip(def.usage_names()) {
        if name.len() == 1 {
            short.push(format!("-{}", declared));
        } else {
            long.push(format!("--{}", declared));
        }
    }
    short.extend(long);

    let mut line = format!("  {}", short.join(", "));
    if description.is_empty() {
        line.push('\n');
        return Some(line);
    }

    let indent = " ".repeat(DESCRIPTION_COLUMN);
    if line.len() >= DESCRIPTION_COLUMN - 1 {
        line.push('\n');
        line.push_str(&indent);
    } else {
        line.push_str(&" ".repeat(DESCRIPTION_COLUMN - line.len()));
    }

    let text = description.replace("%s", &def.value().to_string());
    let mut lines = text.split('\n');
    line.push_str(lines.next().unwrap_or_default());
    line.push('\n');
    for rest in lines {
        line.push_str(&indent);
        line.push_str(rest);
        line.push('\n');
    }
    Some(line)
}

impl OptConfig {
    /// See [`usage`].
    pub fn usage(&self) -> String {
        usage(self)
    }
}
