use std::{
    borrow::Cow,
    fs::File,
    io::{self, Write as _},
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;

mod table;

pub use table::{SchemaColumn, TableRow, page_title, render_table};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
    Quiet,
}

/// Destination for command results: stdout, or a file created once per run.
/// Each emit writes one newline-terminated entry.
#[derive(Debug)]
pub struct Output {
    format: OutputFormat,
    file: Option<File>,
}

impl Output {
    pub fn new(format: OutputFormat, path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(|path| {
                File::create(path)
                    .with_context(|| format!("creating output file {}", path.display()))
            })
            .transpose()?;
        Ok(Self { format, file })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn emit_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let data = match self.format {
            OutputFormat::Quiet => return Ok(()),
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
            OutputFormat::Json | OutputFormat::Table => serde_json::to_string(value)?,
        };
        self.write_entry(&data)
    }

    /// Renders rows as a table in table mode, and as a json array otherwise.
    pub fn emit_table<T: TableRow + Serialize>(&self, rows: &[T]) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.write_entry(&render_table(rows)),
            _ => self.emit_json(rows),
        }
    }

    pub fn emit_text(&self, text: &str) -> Result<()> {
        if self.format == OutputFormat::Quiet {
            return Ok(());
        }
        self.write_entry(text)
    }

    fn write_entry(&self, data: &str) -> Result<()> {
        let entry = if data.ends_with('\n') {
            Cow::Borrowed(data)
        } else {
            Cow::Owned(format!("{data}\n"))
        };
        match &self.file {
            Some(file) => {
                let mut writer: &File = file;
                writer.write_all(entry.as_bytes())?;
            }
            None => io::stdout().lock().write_all(entry.as_bytes())?,
        }
        Ok(())
    }
}
