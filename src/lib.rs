//! optconfig - command-line option parsing with configuration file merging.
//!
//! Options are defined once and can then be given on the command line
//! (`-s`, `-abc`, `--long`, `--long=value`, abbreviated `--lo`, negated
//! `--no-long`) or in a configuration file of `name = value` lines with
//! optional `[section]` headings. Command-line values override file values.
//!
//! ```
//! use optconfig::{ArgumentPolicy, OptConfig, OptionAttrs, Value};
//!
//! let mut opt = OptConfig::new();
//! opt.define(&["v", "verbose"], OptionAttrs::new()).unwrap();
//! opt.define(&["o", "output"], OptionAttrs::new().argument(ArgumentPolicy::Required))
//!     .unwrap();
//!
//! let rest = opt.parse(&["-v", "--out=a.txt", "input"]).unwrap();
//! assert_eq!(rest, ["input"]);
//! assert_eq!(opt.value_of("verbose").unwrap(), &Value::Bool(true));
//! assert_eq!(opt.value_of("o").unwrap(), &Value::from("a.txt"));
//! ```

pub mod coerce;
pub mod config;
pub mod error;
pub mod file;
pub mod help;
pub mod option;
pub mod output;
pub mod parser;
pub mod registry;
pub mod rule;
pub mod value;

pub use config::{AttrSpec, FormatSpec, OptionSpec, Schema, Settings};
pub use error::{Error, Result};
pub use option::{ArgumentPolicy, Callback, Format, Multiplicity, OptionAttrs, OptionDef};
pub use output::Report;
pub use parser::OptConfig;
pub use registry::Registry;
pub use rule::{Choices, IntRange, Integer, Literal, Pattern, Rule, RuleError};
pub use value::Value;
