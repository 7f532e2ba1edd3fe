//! Rendering of discovery results for the terminal.
//!
//! Two formats: pretty JSON for scripts and a short human-readable listing.
//! Both are pure functions returning strings; `main` decides where they go.

use std::fmt::Write as _;
use std::time::Duration;

use clap::ValueEnum;
use hub_core::Candidate;
use serde::{Deserialize, Serialize};

/// Output format of the `hub-discover` binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

/// JSON shape of one discovered hub.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HubReport<'a> {
    address: &'a str,
    /// Empty string when the hub id is unknown.
    hub_id: &'a str,
    host: &'a str,
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

impl<'a> From<&'a Candidate> for HubReport<'a> {
    fn from(c: &'a Candidate) -> Self {
        Self {
            address: c.address(),
            hub_id: c.hub_id().unwrap_or_default(),
            host: c.host(),
            port: c.port(),
            name: c.name(),
            model: c.model(),
            version: c.version(),
        }
    }
}

/// Renders `hubs` as a pretty-printed JSON array (`[]` when empty).
///
/// # Errors
///
/// Propagates serialization failures from `serde_json`.
pub fn render_json(hubs: &[Candidate]) -> Result<String, serde_json::Error> {
    let reports: Vec<HubReport<'_>> = hubs.iter().map(HubReport::from).collect();
    serde_json::to_string_pretty(&reports)
}

/// Banner printed before a table-format run starts listening.
pub fn searching_banner(timeout: Duration) -> String {
    format!("Searching for hubs (timeout: {}s)...", timeout.as_secs())
}

/// Renders `hubs` as a numbered listing, or guidance when nothing was found.
pub fn render_table(hubs: &[Candidate]) -> String {
    let mut out = String::new();

    if hubs.is_empty() {
        out.push_str("No hubs found.\n\n");
        out.push_str("Tips:\n");
        out.push_str("  - Make sure you're on the same network as the hub\n");
        out.push_str("  - Try increasing the timeout: --timeout 10\n");
        out.push_str("  - Set the hub address manually if discovery keeps failing\n");
        return out;
    }

    let _ = writeln!(out, "Found {} hub(s):\n", hubs.len());
    for (i, hub) in hubs.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {}", i + 1, hub.address());
        let _ = writeln!(out, "      Hub ID: {}", hub.hub_id().unwrap_or("-"));
        if let Some(name) = hub.name() {
            let _ = writeln!(out, "      Name: {name}");
        }
        if let Some(model) = hub.model() {
            let _ = writeln!(out, "      Model: {model}");
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
