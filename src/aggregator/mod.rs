//! Aggregation of profile nodes into views and metrics.
//!
//! This module groups the nodes of a [`Profile`](crate::profile::Profile) into:
//! - Function views (one per call site)
//! - File views (one per source URL)
//! - Category views (one per category, including ancestors)
//! - Hot function rankings and category breakdowns

pub mod metrics;
pub mod views;

pub use metrics::{
    calculate_category_breakdown, calculate_hot_functions, calculate_phase_breakdown,
    calculate_sample_distribution, CategoryShare, HotFunction, PhaseShare, SampleDistribution,
};
pub use views::{topmost, AggregateView, CategoryView, FileView, FunctionView, ViewMap, ViewStats};
