//! Tag-based logging for SimBot
//!
//! Console logging with colored output, per-module tags and debug filtering
//! driven by `--debug-<module>` command-line flags.
//!
//! ```rust
//! use simbot::logger::{log, LogTag};
//!
//! log(LogTag::Search, "INFO", "Evaluation finished");
//! log(LogTag::Trader, "DEBUG", "tick details..."); // only with --debug-trader
//! ```

use chrono::Utc;
use colored::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};

use crate::arguments::{
    is_debug_corpus_enabled, is_debug_search_enabled, is_debug_trader_enabled,
};

/// Log categories, one per module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Search,
    Trader,
    Corpus,
    Config,
}

impl LogTag {
    fn label(&self) -> ColoredString {
        match self {
            LogTag::System => "SYSTEM".green().bold(),
            LogTag::Search => "SEARCH".magenta().bold(),
            LogTag::Trader => "TRADER".yellow().bold(),
            LogTag::Corpus => "CORPUS".cyan().bold(),
            LogTag::Config => "CONFIG".blue().bold(),
        }
    }

    /// Whether DEBUG-level messages for this tag are enabled via CLI flags
    fn debug_enabled(&self) -> bool {
        match self {
            LogTag::Search => is_debug_search_enabled(),
            LogTag::Trader => is_debug_trader_enabled(),
            LogTag::Corpus => is_debug_corpus_enabled(),
            _ => false,
        }
    }
}

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(-?[\d,]+\.?\d*%?)").expect("static regex"));

/// Central logging entry point
///
/// Levels: "ERROR" and "WARN" always shown, "INFO" and "SUCCESS" shown by
/// default, "DEBUG" shown only when the tag's --debug-<module> flag is set.
pub fn log(tag: LogTag, level: &str, message: &str) {
    if level == "DEBUG" && !tag.debug_enabled() {
        return;
    }

    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    let (symbol, body) = match level {
        "ERROR" => ("❌".red().bold(), message.red().to_string()),
        "WARN" => ("⚠".yellow().bold(), message.yellow().to_string()),
        "SUCCESS" => ("✅".green().bold(), message.green().to_string()),
        "DEBUG" => ("🐛".purple().bold(), message.dimmed().to_string()),
        _ => ("ℹ".blue().bold(), format_message(message)),
    };

    println!(
        "{} {} {} {}",
        symbol,
        tag.label(),
        format!("[{}]", timestamp).dimmed(),
        body
    );
    let _ = io::stdout().flush();
}

pub fn info(tag: LogTag, message: &str) {
    log(tag, "INFO", message);
}

pub fn warning(tag: LogTag, message: &str) {
    log(tag, "WARN", message);
}

pub fn error(tag: LogTag, message: &str) {
    log(tag, "ERROR", message);
}

pub fn debug(tag: LogTag, message: &str) {
    log(tag, "DEBUG", message);
}

pub fn header(title: &str) {
    println!();
    println!(
        "{} {} {}",
        "🤖".green().bold(),
        "SimBot".green().bold(),
        format!("- {}", title).bright_white().bold()
    );
    println!("{}", "─".repeat(50).dimmed());
    let _ = io::stdout().flush();
}

pub fn separator() {
    println!("{}", "─".repeat(50).dimmed());
    let _ = io::stdout().flush();
}

// Highlight numbers and percentages in INFO messages
fn format_message(message: &str) -> String {
    NUMBER_RE
        .replace_all(message, |caps: &regex::Captures| {
            caps[1].bright_white().bold().to_string()
        })
        .to_string()
}
