//! Raw input record definitions.
//!
//! These mirror the V8 `.cpuprofile` format closely enough to deserialize
//! it directly. Times are microseconds.

use serde::{Deserialize, Deserializer, Serialize};

/// Everything the engine consumes: one CPU profile plus the marker stream
/// recorded alongside it.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub profile: RawProfile,
    pub markers: Vec<RawMarker>,
}

/// A single CPU profile record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    pub nodes: Vec<RawNode>,

    #[serde(default)]
    pub start_time: f64,

    #[serde(default)]
    pub end_time: f64,

    /// Node id of the top frame for every sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,

    /// Microseconds elapsed since the previous sample (or since start time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_deltas: Option<Vec<f64>>,
}

/// A node of the raw call tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: u64,

    pub call_frame: CallFrame,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<u64>>,

    /// Only present in chunked trace-event profiles, which link upwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,

    #[serde(default, alias = "bailoutReason", skip_serializing_if = "Option::is_none")]
    pub deopt_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_ticks: Option<Vec<PositionTickInfo>>,
}

/// Source information for a raw node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,

    /// V8 emits this as a string, older tools as a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub script_id: String,

    #[serde(default)]
    pub url: String,

    /// 0-based, -1 when unknown
    #[serde(default = "unknown_position")]
    pub line_number: i64,

    /// 0-based, -1 when unknown
    #[serde(default = "unknown_position")]
    pub column_number: i64,
}

impl Default for CallFrame {
    fn default() -> Self {
        Self {
            function_name: String::new(),
            script_id: "0".to_string(),
            url: String::new(),
            line_number: -1,
            column_number: -1,
        }
    }
}

/// Tick count for one source line of a node's function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTickInfo {
    /// 1-based line
    pub line: u32,
    pub ticks: u64,
}

/// A named instantaneous marker on the profile's timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarker {
    pub name: String,
    pub timestamp: f64,
}

impl RawMarker {
    pub fn new(name: impl Into<String>, timestamp: f64) -> Self {
        Self {
            name: name.into(),
            timestamp,
        }
    }
}

fn unknown_position() -> i64 {
    -1
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok("0".to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for scriptId, found {}",
            other
        ))),
    }
}
