//! Sample stream and timestamp reconstruction.
//!
//! With time deltas, absolute times are a running sum from the start time
//! and samples are re-sorted by time. Without them, samples are spread
//! evenly over the profile using the average sample duration.

use super::tree::{Relocations, Tree};
use crate::parser::schema::RawProfile;
use crate::utils::error::ProfileError;
use log::{debug, warn};

/// Reconstructed sample timeline
#[derive(Debug, Clone, Default)]
pub(crate) struct SampleTimeline {
    /// Surviving node id per sample, in time order
    pub samples: Vec<u64>,
    /// Sample times; one extra trailing entry when synthesized
    pub timestamps: Vec<f64>,
    pub average_duration: f64,
    pub end_time: f64,
}

/// Rebuild sample times and attach them to nodes
///
/// `total_hits` is the profile-wide sample count, used for the synthetic
/// spacing when no deltas are available.
pub(crate) fn reconstruct(
    raw: &RawProfile,
    relocations: &Relocations,
    tree: &mut Tree,
    total_hits: u64,
) -> Result<SampleTimeline, ProfileError> {
    let fallback_duration = if total_hits > 0 {
        (raw.end_time - raw.start_time) / total_hits as f64
    } else {
        0.0
    };

    let Some(raw_samples) = raw.samples.as_deref() else {
        debug!("No sample stream, timestamps unavailable");
        return Ok(SampleTimeline {
            average_duration: fallback_duration,
            end_time: raw.end_time,
            ..Default::default()
        });
    };

    let samples: Vec<u64> = raw_samples.iter().map(|&id| relocations.resolve(id)).collect();

    let deltas = match raw.time_deltas.as_deref() {
        Some(deltas) if deltas.len() == samples.len() => Some(deltas),
        Some(deltas) => {
            warn!(
                "{} time deltas for {} samples, using uniform spacing",
                deltas.len(),
                samples.len()
            );
            None
        }
        None => None,
    };

    let timeline = match deltas {
        Some(deltas) => timeline_from_deltas(raw.start_time, samples, deltas),
        None => synthesized_timeline(raw.start_time, raw.end_time, samples, fallback_duration),
    };

    for (&id, &timestamp) in timeline.samples.iter().zip(&timeline.timestamps) {
        let &index = tree
            .index
            .get(&id)
            .ok_or(ProfileError::UnknownSampleNode(id))?;
        tree.nodes[index].timestamps.push(timestamp);
    }

    Ok(timeline)
}

fn timeline_from_deltas(start_time: f64, samples: Vec<u64>, deltas: &[f64]) -> SampleTimeline {
    debug!("Reconstructing {} sample times from deltas", samples.len());

    let mut now = start_time;
    let mut pairs: Vec<(u64, f64)> = samples
        .into_iter()
        .zip(deltas)
        .map(|(id, delta)| {
            now += delta;
            (id, now)
        })
        .collect();

    // Deltas can be negative, so the running sum is not guaranteed ordered
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (samples, timestamps): (Vec<u64>, Vec<f64>) = pairs.into_iter().unzip();
    let average_duration = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => (last - first) / timestamps.len() as f64,
        _ => 0.0,
    };
    let end_time = timestamps
        .last()
        .map_or(start_time, |last| last + average_duration);

    SampleTimeline {
        samples,
        timestamps,
        average_duration,
        end_time,
    }
}

fn synthesized_timeline(
    start_time: f64,
    end_time: f64,
    samples: Vec<u64>,
    average_duration: f64,
) -> SampleTimeline {
    debug!("Synthesizing {} evenly spaced sample times", samples.len());

    let timestamps = (0..=samples.len())
        .map(|i| start_time + i as f64 * average_duration)
        .collect();

    SampleTimeline {
        samples,
        timestamps,
        average_duration,
        end_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{CallFrame, RawNode};
    use crate::profile::tree::build_tree;

    fn raw(samples: Vec<u64>, deltas: Option<Vec<f64>>) -> RawProfile {
        let node = |id: u64, children: Option<Vec<u64>>| RawNode {
            id,
            call_frame: CallFrame {
                function_name: format!("f{id}"),
                url: format!("{id}.js"),
                ..Default::default()
            },
            children,
            ..Default::default()
        };

        RawProfile {
            nodes: vec![node(1, Some(vec![2])), node(2, None)],
            start_time: 1000.0,
            end_time: 1100.0,
            samples: Some(samples),
            time_deltas: deltas,
        }
    }

    #[test]
    fn test_deltas_are_summed_and_sorted() {
        let raw = raw(vec![1, 2, 2], Some(vec![10.0, 30.0, -20.0]));
        let mut tree = build_tree(&raw).unwrap();

        let timeline = reconstruct(&raw, &Relocations::default(), &mut tree, 3).unwrap();

        assert_eq!(timeline.timestamps, vec![1010.0, 1020.0, 1040.0]);
        assert_eq!(timeline.samples, vec![1, 2, 2]);
        assert_eq!(timeline.average_duration, 10.0);
        assert_eq!(timeline.end_time, 1050.0);
        assert_eq!(tree.get(2).unwrap().timestamps, vec![1020.0, 1040.0]);
        assert_eq!(tree.get(1).unwrap().timestamps, vec![1010.0]);
    }

    #[test]
    fn test_uniform_spacing_without_deltas() {
        let raw = raw(vec![2, 1, 2, 2], None);
        let mut tree = build_tree(&raw).unwrap();

        let timeline = reconstruct(&raw, &Relocations::default(), &mut tree, 4).unwrap();

        assert_eq!(timeline.average_duration, 25.0);
        assert_eq!(
            timeline.timestamps,
            vec![1000.0, 1025.0, 1050.0, 1075.0, 1100.0]
        );
        assert_eq!(timeline.end_time, 1100.0);
        assert_eq!(tree.get(2).unwrap().timestamps, vec![1000.0, 1050.0, 1075.0]);
    }

    #[test]
    fn test_mismatched_deltas_fall_back_to_uniform() {
        let raw = raw(vec![2, 2], Some(vec![5.0]));
        let mut tree = build_tree(&raw).unwrap();

        let timeline = reconstruct(&raw, &Relocations::default(), &mut tree, 2).unwrap();
        assert_eq!(timeline.timestamps, vec![1000.0, 1050.0, 1100.0]);
    }
}
