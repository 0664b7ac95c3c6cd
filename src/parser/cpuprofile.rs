//! Input parser for V8 CPU profiles.
//!
//! Accepts either:
//! - a bare `.cpuprofile` object (`{"nodes": [...], "samples": [...], ...}`)
//! - a Chrome trace-event document (an array of events, or an object with
//!   `traceEvents`) carrying a `CpuProfile` event, or `Profile` +
//!   `ProfileChunk` events
//!
//! Instant and mark events in a trace-event document become the marker
//! stream.

use super::schema::{ProfileInput, RawMarker, RawNode, RawProfile};
use crate::utils::config::{
    CPU_PROFILE_EVENT, MARKER_PHASES, PROFILE_CHUNK_EVENT, PROFILE_EVENT,
};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One trace event, reduced to the fields we look at
#[derive(Debug, Clone, Deserialize)]
struct TraceEvent {
    #[serde(default)]
    name: String,

    #[serde(default)]
    ph: String,

    #[serde(default)]
    ts: Option<f64>,

    #[serde(default)]
    id: Option<serde_json::Value>,

    #[serde(default)]
    args: serde_json::Value,
}

/// Partially assembled profile from `Profile`/`ProfileChunk` events
#[derive(Debug, Default)]
struct ChunkedProfile {
    id: Option<serde_json::Value>,
    start_time: Option<f64>,
    nodes: Vec<RawNode>,
    samples: Vec<u64>,
    time_deltas: Vec<f64>,
    chunk_count: usize,
}

/// Read and parse a profile file from disk
///
/// **Public** - used by the `inspect` command
pub fn read_input(path: impl AsRef<Path>) -> Result<ProfileInput, ParseError> {
    let path = path.as_ref();
    debug!("Reading profile input from: {}", path.display());

    let file = File::open(path)?;
    let raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    parse_input(&raw)
}

/// Parse raw JSON into engine input
///
/// # Errors
/// * `ParseError::JsonError` - The profile record does not deserialize
/// * `ParseError::InvalidFormat` - Input is neither an object nor an array
/// * `ParseError::ProfileNotFound` - A trace contains no CPU profile
pub fn parse_input(raw: &serde_json::Value) -> Result<ProfileInput, ParseError> {
    match raw {
        serde_json::Value::Object(obj) if obj.contains_key("nodes") => {
            debug!("Input is a bare cpuprofile");
            let profile: RawProfile = serde_json::from_value(raw.clone())?;
            Ok(ProfileInput {
                profile,
                markers: Vec::new(),
            })
        }

        serde_json::Value::Object(obj) => match obj.get("traceEvents") {
            Some(serde_json::Value::Array(events)) => parse_trace_events(events),
            _ => Err(ParseError::InvalidFormat(
                "Object input must contain 'nodes' or 'traceEvents'".to_string(),
            )),
        },

        serde_json::Value::Array(events) => parse_trace_events(events),

        _ => Err(ParseError::InvalidFormat(
            "Profile must be a JSON object or array".to_string(),
        )),
    }
}

/// Extract the CPU profile and markers from a list of trace events
///
/// **Private** - internal helper for parse_input
fn parse_trace_events(events: &[serde_json::Value]) -> Result<ProfileInput, ParseError> {
    debug!("Input is a trace with {} events", events.len());

    let mut profile: Option<RawProfile> = None;
    let mut chunked = ChunkedProfile::default();
    let mut markers = Vec::new();

    for (index, value) in events.iter().enumerate() {
        let event = match serde_json::from_value::<TraceEvent>(value.clone()) {
            Ok(event) => event,
            Err(e) => {
                // Log but don't fail - unrelated events may be malformed
                warn!("Failed to parse trace event {}: {}", index, e);
                continue;
            }
        };

        match event.name.as_str() {
            CPU_PROFILE_EVENT => {
                if profile.is_some() {
                    warn!("Ignoring additional CpuProfile event {}", index);
                    continue;
                }
                if let Some(data) = event.args.pointer("/data/cpuProfile") {
                    profile = Some(serde_json::from_value(data.clone())?);
                }
            }
            PROFILE_EVENT => {
                if chunked.id.is_some() {
                    warn!("Ignoring additional Profile event {}", index);
                    continue;
                }
                chunked.id = event.id.clone();
                chunked.start_time = event
                    .args
                    .pointer("/data/startTime")
                    .and_then(|v| v.as_f64())
                    .or(event.ts);
            }
            PROFILE_CHUNK_EVENT => {
                if chunked.id.is_some() && event.id != chunked.id {
                    continue;
                }
                add_chunk(&mut chunked, &event.args)?;
            }
            _ => {
                if let (Some(ts), true) = (event.ts, is_marker(&event)) {
                    markers.push(RawMarker::new(event.name, ts));
                }
            }
        }
    }

    let profile = match profile {
        Some(profile) => profile,
        None if chunked.chunk_count > 0 => assemble_chunks(chunked),
        None => return Err(ParseError::ProfileNotFound),
    };

    markers.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    debug!(
        "Found profile with {} nodes and {} markers",
        profile.nodes.len(),
        markers.len()
    );

    Ok(ProfileInput { profile, markers })
}

fn is_marker(event: &TraceEvent) -> bool {
    !event.name.is_empty() && MARKER_PHASES.contains(&event.ph.as_str())
}

/// Append one `ProfileChunk` payload
///
/// **Private** - internal helper for parse_trace_events
fn add_chunk(chunked: &mut ChunkedProfile, args: &serde_json::Value) -> Result<(), ParseError> {
    let Some(data) = args.get("data") else {
        warn!("ProfileChunk event without data, skipping");
        return Ok(());
    };

    if let Some(nodes) = data.pointer("/cpuProfile/nodes") {
        let nodes: Vec<RawNode> = serde_json::from_value(nodes.clone())?;
        chunked.nodes.extend(nodes);
    }
    if let Some(samples) = data.pointer("/cpuProfile/samples") {
        let samples: Vec<u64> = serde_json::from_value(samples.clone())?;
        chunked.samples.extend(samples);
    }
    if let Some(deltas) = data.get("timeDeltas") {
        let deltas: Vec<f64> = serde_json::from_value(deltas.clone())?;
        chunked.time_deltas.extend(deltas);
    }

    chunked.chunk_count += 1;
    Ok(())
}

/// Turn accumulated chunks into a single profile record
///
/// Chunked nodes link to their parent; the engine expects child lists, so
/// those are rebuilt here.
fn assemble_chunks(chunked: ChunkedProfile) -> RawProfile {
    debug!("Assembling profile from {} chunks", chunked.chunk_count);

    let mut nodes = chunked.nodes;
    let index: HashMap<u64, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id, i))
        .collect();

    let links: Vec<(usize, u64)> = nodes
        .iter()
        .filter_map(|node| {
            let parent = node.parent?;
            match index.get(&parent) {
                Some(&i) => Some((i, node.id)),
                None => {
                    warn!("Node {} references unknown parent {}", node.id, parent);
                    None
                }
            }
        })
        .collect();

    for (parent, child) in links {
        nodes[parent].children.get_or_insert_with(Vec::new).push(child);
    }

    let start_time = chunked.start_time.unwrap_or(0.0);
    let end_time = start_time + chunked.time_deltas.iter().sum::<f64>();
    let time_deltas = (!chunked.time_deltas.is_empty()).then_some(chunked.time_deltas);

    RawProfile {
        nodes,
        start_time,
        end_time,
        samples: Some(chunked.samples),
        time_deltas,
    }
}
