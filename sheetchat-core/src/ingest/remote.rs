//! Remote Google Sheet retrieval via the xlsx export endpoint

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use super::{parse_workbook, Workbook};
use crate::config::ChatConfig;
use crate::error::IngestError;

const EXPORT_HOST: &str = "https://docs.google.com/spreadsheets/d";

/// Display name given to remotely fetched workbooks.
const REMOTE_DISPLAY_NAME: &str = "Google Sheet Data.xlsx";

fn sheet_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").unwrap())
}

/// Extract a spreadsheet id from a bare token or a full sheet URL.
///
/// A string with no slashes longer than 20 characters is taken as the id
/// itself; otherwise the `/spreadsheets/d/<id>` path segment must be present.
pub fn extract_sheet_id(input: &str) -> Result<&str, IngestError> {
    let trimmed = input.trim();
    if !trimmed.contains('/') && trimmed.len() > 20 {
        return Ok(trimmed);
    }
    if let Some(m) = sheet_id_regex().captures(trimmed).and_then(|c| c.get(1)) {
        return Ok(m.as_str());
    }
    Err(IngestError::BadIdentifier(input.to_string()))
}

/// Direct export URL for a spreadsheet id.
fn export_url(sheet_id: &str) -> String {
    format!("{}/{}/export?format=xlsx", EXPORT_HOST, sheet_id)
}

/// Final fetch URL, wrapped through the pass-through relay when one is
/// configured (needed where direct cross-origin fetches are blocked).
fn fetch_url(sheet_id: &str, relay: Option<&str>) -> String {
    let direct = export_url(sheet_id);
    match relay {
        Some(prefix) => format!("{}{}", prefix, encode_component(&direct)),
        None => direct,
    }
}

/// Percent-encode a string for use as a single URL component.
///
/// Unreserved characters (RFC 3986) pass through, everything else is
/// `%XX`-escaped byte by byte.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Resolve `input` to a sheet id, download the xlsx export and decode it.
///
/// The fetch is a single attempt with the configured timeout; no retries.
pub fn fetch_google_sheet(input: &str, config: &ChatConfig) -> Result<Workbook, IngestError> {
    let sheet_id = extract_sheet_id(input)?;
    let url = fetch_url(sheet_id, config.relay_url.as_deref());
    log::debug!("fetching sheet {} via {}", sheet_id, url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| IngestError::Fetch(e.to_string()))?;

    let response = client.get(&url).send().map_err(|e| {
        log::warn!("sheet fetch transport error: {}", e);
        IngestError::Fetch(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("sheet export returned HTTP {} for {}", status, sheet_id);
        return Err(IngestError::Fetch(format!("HTTP {}", status)));
    }

    let bytes = response
        .bytes()
        .map_err(|e| IngestError::Fetch(e.to_string()))?;
    parse_workbook(&bytes, REMOTE_DISPLAY_NAME)
}
