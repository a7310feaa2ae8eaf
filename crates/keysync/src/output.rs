//! Writes command results to stdout in the `--output` format.
//!
//! Listings become rounded tables, run reports a table of changes plus a
//! summary line. JSON and YAML always carry the full serialized value.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

pub struct Printer {
    format: OutputFormat,
    quiet: bool,
    color: bool,
}

impl Printer {
    pub fn new(global: &GlobalOpts) -> Self {
        let color = match global.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        };
        Self {
            format: global.output.clone(),
            quiet: global.quiet,
            color,
        }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// A listing: one table row per item, or one `key` per line in plain mode.
    pub fn list<T, R>(&self, items: &[T], row: impl Fn(&T) -> R, key: impl Fn(&T) -> String)
    where
        T: Serialize,
        R: Tabled,
    {
        let text = self.structured(items).unwrap_or_else(|| match self.format {
            OutputFormat::Plain => items.iter().map(key).collect::<Vec<_>>().join("\n"),
            _ => table(items.iter().map(row)),
        });
        self.line(&text);
    }

    /// A single value with its own human rendering and a one-line plain form.
    pub fn value<T: Serialize>(
        &self,
        value: &T,
        human: impl FnOnce(&T) -> String,
        plain: impl FnOnce(&T) -> String,
    ) {
        let text = self.structured(value).unwrap_or_else(|| match self.format {
            OutputFormat::Plain => plain(value),
            _ => human(value),
        });
        self.line(&text);
    }

    /// Free text, dropped in quiet mode.
    pub fn line(&self, text: &str) {
        if self.quiet || text.is_empty() {
            return;
        }
        let _ = writeln!(io::stdout().lock(), "{text}");
    }

    fn structured<T: Serialize + ?Sized>(&self, value: &T) -> Option<String> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            OutputFormat::JsonCompact => serde_json::to_string(value).map_err(|e| e.to_string()),
            OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            OutputFormat::Table | OutputFormat::Plain => return None,
        };
        Some(rendered.expect("serialization should not fail"))
    }
}

pub(crate) fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// An optional value as a table cell, blank when absent.
pub(crate) fn cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
