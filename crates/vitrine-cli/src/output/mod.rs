//! # Output Formatting
//!
//! Commands print either human-readable text or a single JSON document.
//! JSON keys are camelCase.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use vitrine_core::{Navigation, ShellSnapshot, WarmUpReport};

/// Output format options supported by the CLI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty text output (default)
    #[default]
    Text,
    /// Single JSON object
    Json,
}

/// What `show` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<'a> {
    pub navigation: &'a Navigation,
    #[serde(flatten)]
    pub shell: ShellSnapshot,
}

/// Print the shell after a navigation.
pub fn print_page(view: &PageView<'_>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => {
            let shell = &view.shell;
            println!("{}", shell.document_title.bold());
            println!("{} {}", "heading:".dimmed(), shell.heading);
            println!("{} {}", "description:".dimmed(), shell.description);
            if shell.active_menu.is_empty() {
                println!("{} -", "menu:".dimmed());
            } else {
                println!("{} {}", "menu:".dimmed(), shell.active_menu.join(", ").green());
            }
            println!();
            println!("{}", shell.body_html);
        },
    }
    Ok(())
}

/// Print the outcome of a warm-up.
pub fn print_warm_up(report: &WarmUpReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let failed: Vec<_> = report
                .failed
                .iter()
                .map(|(page, reason)| json!({ "page": page, "reason": reason }))
                .collect();
            let payload = json!({ "warmed": report.warmed, "failed": failed });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        },
        OutputFormat::Text => {
            if report.warmed.is_empty() && report.failed.is_empty() {
                println!("Nothing to warm.");
            }
            for page in &report.warmed {
                println!("{} {page}", "✓".green());
            }
            for (page, reason) in &report.failed {
                println!("{} {page}: {reason}", "✗".red());
            }
        },
    }
    Ok(())
}
