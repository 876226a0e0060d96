//! Output formatting for CLI

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::{Deserialize, Serialize};

use abtest_metrics::Recommendation;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Output writer that handles different formats
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, color: bool) -> Self {
        if !color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    /// Write a single item
    pub fn write<T: Serialize + TableDisplay>(&self, item: &T) -> Result<()> {
        match self.format {
            OutputFormat::Table => item.display_table(),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(item)?),
        }
        Ok(())
    }

    /// Write a success message (table mode only)
    pub fn success(&self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Write a warning message
    pub fn warning(&self, message: &str) {
        if self.format == OutputFormat::Table {
            eprintln!("{} {}", "⚠".yellow(), message);
        } else {
            eprintln!("Warning: {}", message);
        }
    }

    /// Write an error; under `--output json` as `{"error": {"stage", "message"}}` on stdout
    pub fn error(&self, stage: Option<&str>, message: &str) {
        match self.format {
            OutputFormat::Json => {
                let body = serde_json::json!({
                    "error": { "stage": stage, "message": message }
                });
                println!("{body:#}");
            }
            OutputFormat::Yaml | OutputFormat::Table => match stage {
                Some(stage) => eprintln!("{} {} ({})", "✗".red(), message, stage.dimmed()),
                None => eprintln!("{} {}", "✗".red(), message),
            },
        }
    }
}

/// Trait for displaying items in table mode
pub trait TableDisplay {
    fn display_table(&self);
}

/// Create a table with the standard styling and a cyan header row
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// Print a key-value pair in detail format
pub fn print_field(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Format a fraction as a percentage with two decimals
pub fn format_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn format_p_value(p: f64) -> String {
    if p < 1e-4 {
        "< 0.0001".to_string()
    } else {
        format!("{p:.4}")
    }
}

/// Significance badge with color
pub fn significance_badge(significant: bool) -> String {
    if significant {
        "yes".green().bold().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

/// Recommendation label with color
pub fn recommendation_badge(recommendation: Recommendation) -> String {
    let label = recommendation.to_string();
    match recommendation {
        Recommendation::Rollout => label.green().bold().to_string(),
        Recommendation::DoNotRollout => label.red().bold().to_string(),
        Recommendation::Monitor => label.yellow().bold().to_string(),
    }
}
