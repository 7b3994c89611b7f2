//! CLI subcommand modules.
//!
//! Every command renders either a text report or pretty-printed JSON,
//! selected by the global `--format` flag.

pub(crate) mod assess;
pub(crate) mod bands;
pub(crate) mod classify;
pub(crate) mod compare;
pub(crate) mod forecast;
pub(crate) mod history;
pub(crate) mod serve;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

const WIDTH: usize = 62;

/// Boxed report title.
pub(crate) fn banner(title: &str) -> String {
    let bar = "═".repeat(WIDTH);
    format!("\n╔{bar}╗\n║{title:^width$}║\n╚{bar}╝\n", width = WIDTH)
}

/// Ruled section heading.
pub(crate) fn section(title: &str) -> String {
    let rule = "━".repeat(WIDTH);
    format!("{rule}\n{title}\n{rule}\n")
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `value` with `decimals` places, or `N/A`.
pub(crate) fn or_na(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.decimals$}"))
}

/// `value` as a percentage with two places, or `N/A`.
pub(crate) fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}%"))
}

/// Dollar amount, or `N/A`.
pub(crate) fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}"))
}

/// Large amount in billions, or `N/A`.
pub(crate) fn billions(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("${:.1}B", v / 1e9))
}

/// Quality score out of 100, or `N/A`.
pub(crate) fn score(value: Option<u8>) -> String {
    value.map_or_else(|| "N/A".to_string(), |s| format!("{s}/100"))
}
