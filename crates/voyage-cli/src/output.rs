//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::DateTime;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use voyage_dialogue::{Reply, ScheduleObject};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an assistant reply.
    pub fn format_reply(&self, reply: &Reply) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(reply)?),
            OutputFormat::Table => Ok(match reply {
                Reply::Message { text } => self.colorize(text, "cyan"),
                Reply::Schedule { objects } => self.format_schedule_table(objects),
            }),
        }
    }

    /// Format departures as a table.
    fn format_schedule_table(&self, objects: &[ScheduleObject]) -> String {
        if objects.is_empty() {
            return self.colorize("No departures found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Type", "Departs (UTC)", "Arrives (UTC)", "From", "To", "Ticket"]);

        for object in objects {
            builder.push_record([
                object.kind.as_str(),
                &format_time(object.time_start_utc),
                &format_time(object.time_end_utc),
                &object.place_start,
                &object.place_finish,
                &object.ticket_url,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render a Unix timestamp as `dd.mm.yyyy HH:MM` in UTC.
pub fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
