//! Calculate performance metrics and hot functions from a profile.
//!
//! Hot functions are the call sites with the most self samples.
//! These are the primary targets for optimization.

use super::views::{AggregateView, FunctionView};
use crate::profile::Profile;
use crate::timeline::Range;
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Bound;

/// One ranked entry of the hot function list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotFunction {
    pub name: String,
    pub url: String,

    /// 0-based line of the function definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub category: String,
    pub self_count: u64,
    pub total_count: u64,

    /// Self samples as a percentage of all samples
    pub self_percentage: f64,
    pub total_percentage: f64,
}

/// Samples attributed to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub self_count: u64,
    pub total_count: u64,
    pub percentage: f64,
}

/// Samples and wall time spent inside one marker-delimited phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseShare {
    pub phase: String,

    /// Number of disjoint intervals the phase covers
    pub intervals: usize,

    /// Covered time in microseconds, clipped to the profile bounds
    pub duration: f64,
    pub samples: u64,
    pub percentage: f64,
}

/// Calculate hot functions from a profile
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `profile` - Built profile
/// * `top_n` - Number of top functions to return (e.g., 20)
///
/// # Returns
/// Function views ranked by self samples (descending), ties broken by
/// total samples and then by first appearance
pub fn calculate_hot_functions(profile: &Profile, top_n: usize) -> Vec<HotFunction> {
    let views = profile.function_views();
    debug!("Ranking top {} of {} functions", top_n, views.len());

    let mut ranked: Vec<&FunctionView> = views.iter().filter(|v| v.self_count() > 0).collect();
    ranked.sort_by(|a, b| {
        b.self_count()
            .cmp(&a.self_count())
            .then_with(|| b.total_count().cmp(&a.total_count()))
            .then_with(|| a.ordinal().cmp(&b.ordinal()))
    });

    let total = profile.total_count();
    ranked
        .into_iter()
        .take(top_n)
        .map(|view| create_hot_function(view, total))
        .collect()
}

/// **Private** - internal conversion
fn create_hot_function(view: &FunctionView, total: u64) -> HotFunction {
    HotFunction {
        name: display_name(view.function_name()).to_string(),
        url: view.location().url.clone(),
        line: view.location().line,
        category: view.category().to_string(),
        self_count: view.self_count(),
        total_count: view.total_count(),
        self_percentage: percentage(view.self_count(), total),
        total_percentage: percentage(view.total_count(), total),
    }
}

/// Per-category totals, in category order
///
/// **Public** - every category present in the profile, including parents
pub fn calculate_category_breakdown(profile: &Profile) -> Vec<CategoryShare> {
    let total = profile.total_count();
    profile
        .category_views()
        .iter()
        .map(|view| CategoryShare {
            category: view.category().to_string(),
            self_count: view.self_count(),
            total_count: view.total_count(),
            percentage: percentage(view.total_count(), total),
        })
        .collect()
}

/// Time and samples inside each `before-<phase>` / `after-<phase>` span
///
/// **Public** - phases without markers cover the whole profile
pub fn calculate_phase_breakdown(profile: &Profile, phases: &[String]) -> Vec<PhaseShare> {
    let total = profile.total_count();
    phases
        .iter()
        .map(|phase| {
            let ranges = profile.events().phase_ranges(phase);
            let samples = profile.sample_count_in(&ranges);
            debug!("Phase {}: {} intervals, {} samples", phase, ranges.len(), samples);
            PhaseShare {
                phase: phase.clone(),
                intervals: ranges.len(),
                duration: ranges.iter().map(|r| clipped_length(profile, r)).sum(),
                samples,
                percentage: percentage(samples, total),
            }
        })
        .collect()
}

/// Concentration of samples across functions
///
/// **Public** - returned from calculate_sample_distribution
#[derive(Debug, Clone, Default)]
pub struct SampleDistribution {
    /// Samples across all functions
    pub total_samples: u64,

    /// Functions with at least one self sample
    pub function_count: usize,

    /// Samples in the hottest 10% of those functions
    pub top_10_percent_samples: u64,
    pub top_10_percent_percentage: f64,
}

/// Summarize how samples spread across functions
///
/// **Public** - provides summary statistics
pub fn calculate_sample_distribution(profile: &Profile) -> SampleDistribution {
    let mut counts: Vec<u64> = profile
        .function_views()
        .iter()
        .map(|view| view.self_count())
        .filter(|&count| count > 0)
        .collect();
    if counts.is_empty() {
        return SampleDistribution::default();
    }
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let total: u64 = counts.iter().sum();
    let top_count = (counts.len() as f64 * 0.1).ceil() as usize;
    let top: u64 = counts.iter().take(top_count).sum();

    SampleDistribution {
        total_samples: total,
        function_count: counts.len(),
        top_10_percent_samples: top,
        top_10_percent_percentage: percentage(top, total),
    }
}

impl SampleDistribution {
    /// Returns true if the top 10% of functions hold more than 80% of samples
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Samples: {} | Functions: {} | Top 10%: {:.1}%",
            self.total_samples, self.function_count, self.top_10_percent_percentage
        )
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(anonymous)"
    } else {
        name
    }
}

fn clipped_length(profile: &Profile, range: &Range<f64>) -> f64 {
    let left = match range.left() {
        Bound::Included(x) | Bound::Excluded(x) => x.max(profile.start_time()),
        Bound::Unbounded => profile.start_time(),
    };
    let right = match range.right() {
        Bound::Included(x) | Bound::Excluded(x) => x.min(profile.end_time()),
        Bound::Unbounded => profile.end_time(),
    };
    (right - left).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{CallFrame, RawMarker, RawNode, RawProfile};
    use crate::profile::ProfileOptions;
    use pretty_assertions::assert_eq;

    fn node(id: u64, name: &str, hits: u64, children: &[u64]) -> RawNode {
        RawNode {
            id,
            call_frame: CallFrame {
                function_name: name.to_string(),
                script_id: "1".to_string(),
                url: if id == 1 { String::new() } else { "main.js".to_string() },
                line_number: id as i64,
                column_number: 0,
            },
            hit_count: Some(hits),
            children: Some(children.to_vec()),
            ..Default::default()
        }
    }

    fn create_test_profile(markers: &[RawMarker]) -> Profile {
        let raw = RawProfile {
            nodes: vec![
                node(1, "(root)", 0, &[2]),
                node(2, "execute", 1000, &[3, 4]),
                node(3, "storage", 3000, &[]),
                node(4, "", 6000, &[]),
            ],
            start_time: 0.0,
            end_time: 100.0,
            samples: None,
            time_deltas: None,
        };
        Profile::build(&raw, markers, &ProfileOptions::new()).unwrap()
    }

    #[test]
    fn test_calculate_hot_functions() {
        let profile = create_test_profile(&[]);

        let hot = calculate_hot_functions(&profile, 2);

        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].name, "(anonymous)");
        assert_eq!(hot[0].self_count, 6000);
        assert_eq!(hot[0].self_percentage, 60.0);
        assert_eq!(hot[1].name, "storage");
        assert_eq!(hot[1].line, Some(3));
        assert_eq!(hot[1].category, "user");
    }

    #[test]
    fn test_hot_functions_skip_zero_self() {
        let profile = create_test_profile(&[]);
        let hot = calculate_hot_functions(&profile, 10);
        // (root) has no self samples
        assert_eq!(hot.len(), 3);
        assert_eq!(hot[2].name, "execute");
        assert_eq!(hot[2].total_percentage, 100.0);
    }

    #[test]
    fn test_category_breakdown() {
        let profile = create_test_profile(&[]);
        let breakdown = calculate_category_breakdown(&profile);

        let names: Vec<&str> = breakdown.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["system", "user"]);
        assert_eq!(breakdown[1].self_count, 10000);
        assert_eq!(breakdown[1].percentage, 100.0);
    }

    #[test]
    fn test_phase_breakdown_clips_to_profile() {
        let markers = vec![
            RawMarker::new("before-check", 20.0),
            RawMarker::new("after-check", 50.0),
        ];
        let profile = create_test_profile(&markers);

        let names = ["check".to_string(), "emit".to_string()];
        let phases = calculate_phase_breakdown(&profile, &names);

        assert_eq!(phases[0].intervals, 1);
        assert_eq!(phases[0].duration, 30.0);
        // No markers for emit: the whole profile
        assert_eq!(phases[1].intervals, 1);
        assert_eq!(phases[1].duration, 100.0);
    }

    #[test]
    fn test_calculate_sample_distribution() {
        let profile = create_test_profile(&[]);
        let dist = calculate_sample_distribution(&profile);

        assert_eq!(dist.total_samples, 10000);
        assert_eq!(dist.function_count, 3);
        assert_eq!(dist.top_10_percent_samples, 6000);
        assert!(!dist.is_highly_concentrated());
        assert!(dist.summary().contains("Functions: 3"));
    }

    #[test]
    fn test_percentage_empty_total() {
        assert_eq!(percentage(5, 0), 0.0);
    }
}
