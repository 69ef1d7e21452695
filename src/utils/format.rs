//! Table formatting and output utilities
//!
//! This module provides functionality for formatting and displaying
//! tabular data with color support.

use crossterm::style::Stylize;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Table formatter with color support
pub struct TableFormatter {
    format: OutputFormat,
    no_color: bool,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        Self { format, no_color }
    }

    /// Create formatted output from data
    pub fn format_table<T: Tabled + Serialize>(&self, data: &[T]) -> Result<String> {
        if data.is_empty() {
            return Ok("No data to display".to_string());
        }

        match self.format {
            OutputFormat::Table => self.format_as_table(data),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        }
    }

    /// Format data as a styled table
    fn format_as_table<T: Tabled>(&self, data: &[T]) -> Result<String> {
        let mut table = Table::new(data);

        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Padding::new(1, 1, 0, 0));

        if !self.no_color {
            table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
        }

        Ok(table.to_string())
    }
}

/// Console display utilities for progress and status lines
pub struct DisplayUtils {
    no_color: bool,
}

impl DisplayUtils {
    /// Create new display utilities
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    /// Print a section header
    pub fn print_header(&self, title: &str) -> Result<()> {
        if self.no_color {
            println!("\n{title}");
        } else {
            println!("\n{}", title.to_string().blue().bold());
        }
        println!("{}", "-".repeat(title.len()));
        Ok(())
    }

    /// Print an informational progress line
    pub fn print_info(&self, message: &str) -> Result<()> {
        if self.no_color {
            println!("{message}");
        } else {
            println!("{}", message.to_string().cyan());
        }
        Ok(())
    }

    /// Print a success line
    pub fn print_success(&self, message: &str) -> Result<()> {
        if self.no_color {
            println!("{message}");
        } else {
            println!("{}", message.to_string().green());
        }
        Ok(())
    }

    /// Print a warning line
    pub fn print_warning(&self, message: &str) -> Result<()> {
        if self.no_color {
            eprintln!("{message}");
        } else {
            eprintln!("{}", message.to_string().yellow());
        }
        Ok(())
    }

    /// Print an aligned key/value line
    pub fn print_key_value(&self, key: &str, value: &str) -> Result<()> {
        if self.no_color {
            println!("{key:<16} {value}");
        } else {
            println!("{:<16} {}", key.to_string().bold(), value);
        }
        Ok(())
    }
}
