//! Serializable profile summary and its text rendering.

use crate::aggregator::{
    calculate_category_breakdown, calculate_hot_functions, calculate_phase_breakdown,
    CategoryShare, HotFunction, PhaseShare,
};
use crate::profile::Profile;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Summary of one analyzed profile, as written by `inspect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Schema version (e.g., "1.0.0")
    pub version: String,

    /// Input file the profile was read from
    pub source: String,

    /// Profile start and end, microseconds
    pub start_time: f64,
    pub end_time: f64,

    pub total_samples: u64,
    pub node_count: usize,
    pub average_sample_duration: f64,

    /// Whether native frames were kept
    pub include_natives: bool,

    pub hot_functions: Vec<HotFunction>,
    pub categories: Vec<CategoryShare>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<PhaseShare>,

    /// RFC 3339 timestamp
    pub generated_at: String,
}

impl ProfileSummary {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Build the summary for a profile
///
/// **Public** - main entry point for summary creation
///
/// # Arguments
/// * `profile` - Built profile
/// * `source` - Where the profile came from, recorded verbatim
/// * `top_n` - Number of hot functions to keep
/// * `phases` - Phase names to break down by marker pairs
pub fn to_summary(
    profile: &Profile,
    source: &str,
    top_n: usize,
    phases: &[String],
) -> ProfileSummary {
    ProfileSummary {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        start_time: profile.start_time(),
        end_time: profile.end_time(),
        total_samples: profile.total_count(),
        node_count: profile.nodes().len(),
        average_sample_duration: profile.average_sample_duration(),
        include_natives: profile.options().include_natives,
        hot_functions: calculate_hot_functions(profile, top_n),
        categories: calculate_category_breakdown(profile),
        phases: calculate_phase_breakdown(profile, phases),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Render a summary as a plain-text report
///
/// **Public** - used by `inspect --summary`
pub fn format_text_summary(summary: &ProfileSummary, max_lines: usize) -> String {
    let mut lines = Vec::new();
    let rule = "=".repeat(80);

    lines.push(rule.clone());
    lines.push("PROFILE SUMMARY".to_string());
    lines.push(rule.clone());
    lines.push(format!("Source:        {}", summary.source));
    lines.push(format!("Duration:      {:.3} ms", summary.duration() / 1000.0));
    lines.push(format!("Samples:       {}", summary.total_samples));
    lines.push(format!("Nodes:         {}", summary.node_count));
    lines.push(format!(
        "Sample period: {:.1} us",
        summary.average_sample_duration
    ));

    lines.push(String::new());
    lines.push(format!(
        "  {:<44} {:>10} {:>8} {:>8}",
        "Hot functions (self)", "SAMPLES", "SELF %", "TOTAL %"
    ));
    for function in summary.hot_functions.iter().take(max_lines) {
        lines.push(format!(
            "  {:<44} {:>10} {:>7.1}% {:>7.1}%",
            truncate(&function_label(function), 44),
            function.self_count,
            function.self_percentage,
            function.total_percentage
        ));
    }
    if summary.hot_functions.len() > max_lines {
        lines.push(format!(
            "   (Showing top {} of {} functions)",
            max_lines,
            summary.hot_functions.len()
        ));
    }

    lines.push(String::new());
    lines.push(format!("  {:<20} {:>10} {:>10} {:>8}", "Category", "SELF", "TOTAL", "%"));
    for category in &summary.categories {
        lines.push(format!(
            "  {:<20} {:>10} {:>10} {:>7.1}%",
            category.category, category.self_count, category.total_count, category.percentage
        ));
    }

    if !summary.phases.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {:<20} {:>12} {:>10} {:>8}", "Phase", "TIME (ms)", "SAMPLES", "%"));
        for phase in &summary.phases {
            lines.push(format!(
                "  {:<20} {:>12.3} {:>10} {:>7.1}%",
                phase.phase,
                phase.duration / 1000.0,
                phase.samples,
                phase.percentage
            ));
        }
    }

    lines.push(rule);
    lines.join("\n")
}

fn function_label(function: &HotFunction) -> String {
    match (function.url.is_empty(), function.line) {
        (true, _) => function.name.clone(),
        (false, Some(line)) => format!("{} ({}:{})", function.name, function.url, line + 1),
        (false, None) => format!("{} ({})", function.name, function.url),
    }
}

/// Keep the tail of long labels, where the file name is
fn truncate(label: &str, width: usize) -> String {
    let count = label.chars().count();
    if count <= width {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - (width - 3)).collect();
    format!("...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{CallFrame, RawMarker, RawNode, RawProfile};
    use crate::profile::ProfileOptions;

    fn create_test_profile() -> Profile {
        let frame = |name: &str, url: &str| CallFrame {
            function_name: name.to_string(),
            url: url.to_string(),
            ..Default::default()
        };
        let raw = RawProfile {
            nodes: vec![
                RawNode {
                    id: 1,
                    call_frame: frame("(root)", ""),
                    children: Some(vec![2]),
                    ..Default::default()
                },
                RawNode {
                    id: 2,
                    call_frame: frame("main", "/app/index.js"),
                    ..Default::default()
                },
            ],
            start_time: 1000.0,
            end_time: 5000.0,
            samples: Some(vec![2, 2, 1, 2]),
            time_deltas: Some(vec![0.0, 1000.0, 1000.0, 1000.0]),
        };
        let markers = [RawMarker::new("before-run", 1500.0), RawMarker::new("after-run", 3500.0)];
        Profile::build(&raw, &markers, &ProfileOptions::new()).unwrap()
    }

    #[test]
    fn test_to_summary() {
        let profile = create_test_profile();
        let summary = to_summary(&profile, "trace.json", 10, &["run".to_string()]);

        assert_eq!(summary.version, SCHEMA_VERSION);
        assert_eq!(summary.total_samples, 4);
        assert_eq!(summary.node_count, 2);
        assert_eq!(summary.hot_functions.len(), 2);
        assert_eq!(summary.hot_functions[0].name, "main");
        assert_eq!(summary.hot_functions[0].self_count, 3);
        assert_eq!(summary.phases[0].samples, 2);
        assert_eq!(summary.phases[0].duration, 2000.0);
        assert!(!summary.generated_at.is_empty());
    }

    #[test]
    fn test_format_text_summary() {
        let profile = create_test_profile();
        let summary = to_summary(&profile, "trace.json", 10, &["run".to_string()]);

        let text = format_text_summary(&summary, 1);
        assert!(text.contains("PROFILE SUMMARY"));
        assert!(text.contains("main (/app/index.js)"));
        assert!(text.contains("(Showing top 1 of 2 functions)"));
        assert!(text.contains("run"));
    }

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "...hijkl");
    }
}
