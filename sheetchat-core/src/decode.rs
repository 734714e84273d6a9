//! Reply decoding: split model output into prose and an optional chart spec

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Chart families the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Area,
}

/// One plotted point. Extra fields beyond `name`/`value` are kept verbatim
/// so multi-series payloads survive the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    pub value: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Structured chart directive embedded in a model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub data: Vec<ChartDataPoint>,
}

/// A model reply after directive extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReply {
    pub prose: String,
    pub chart: Option<ChartSpec>,
}

fn chart_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Fence tagged exactly `chart`: the tag must end the line, so fences
    // like ```chartjs stay ordinary code blocks.
    RE.get_or_init(|| Regex::new(r"(?s)```chart[ \t]*\r?\n(.*?)```").unwrap())
}

/// Split a reply into prose and an optional chart.
///
/// Only the first `chart`-tagged fence is honored; later ones stay in the
/// prose verbatim. The matched fence is removed from the prose whether or
/// not its body parses as a valid [`ChartSpec`]; a malformed payload fails
/// silently (chart absent, no error surfaced), matching the original
/// application's behavior. Whitespace around the removed block is collapsed
/// so the prose reads without a dangling blank line.
pub fn decode_reply(reply: &str) -> DecodedReply {
    let Some(caps) = chart_fence_regex().captures(reply) else {
        return DecodedReply {
            prose: reply.to_string(),
            chart: None,
        };
    };

    let whole = caps.get(0).expect("regex match has group 0");
    let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    let chart = match serde_json::from_str::<ChartSpec>(body.trim()) {
        Ok(spec) => Some(spec),
        Err(e) => {
            log::warn!("chart directive body did not parse: {}", e);
            None
        }
    };

    let before = reply[..whole.start()].trim_end();
    let after = reply[whole.end()..].trim_start();
    let prose = match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        (false, false) => format!("{}\n\n{}", before, after),
    };

    DecodedReply { prose, chart }
}
