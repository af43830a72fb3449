use console::style;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Writes command results to stdout.
///
/// In JSON mode only [`OutputWriter::result`] prints anything; the
/// human-facing helpers stay silent so stdout is a single JSON document.
pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: impl Display) {
        if !self.json {
            println!("{} {}", style("✓").green().bold(), message);
        }
    }

    pub fn info(&self, message: impl Display) {
        if !self.json {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    pub fn warning(&self, message: impl Display) {
        if !self.json {
            eprintln!("{} {}", style("⚠").yellow().bold(), message);
        }
    }

    pub fn error(&self, message: impl Display) {
        if !self.json {
            eprintln!("{} {}", style("✗").red().bold(), message);
        }
    }

    pub fn section(&self, title: impl Display) {
        if !self.json {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if !self.json {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        if self.json {
            return;
        }
        if rows.is_empty() {
            println!("{}", style("(no data)").dim());
        } else {
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    /// Print a command's result, wrapped in a status envelope in JSON mode
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let document = if self.json {
            envelope(data)?
        } else {
            serde_json::to_value(data)?
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
        Ok(())
    }
}

fn envelope<T: Serialize>(data: T) -> serde_json::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "status": "success",
        "data": serde_json::to_value(data)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wraps_data() {
        let value = envelope(serde_json::json!({"requested": 2})).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["requested"], 2);
    }
}
