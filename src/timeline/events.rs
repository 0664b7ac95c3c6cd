//! Named marker events and the intervals between them.

use super::range::Range;
use crate::parser::schema::RawMarker;
use crate::utils::config::{AFTER_MARKER_PREFIX, BEFORE_MARKER_PREFIX};
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Bound::{Included, Unbounded};

/// Index over the marker stream of a profile.
///
/// Interval queries are cached per `(start, end)` name pair for the
/// lifetime of the index.
#[derive(Debug, Default)]
pub struct EventIndex {
    events: Vec<RawMarker>,
    by_name: HashMap<String, Vec<f64>>,
    range_cache: RefCell<HashMap<(String, String), Vec<Range<f64>>>>,
}

impl EventIndex {
    pub fn new(markers: &[RawMarker]) -> Self {
        let mut events = markers.to_vec();
        events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let mut by_name: HashMap<String, Vec<f64>> = HashMap::new();
        for event in &events {
            by_name
                .entry(event.name.clone())
                .or_default()
                .push(event.timestamp);
        }

        debug!("Indexed {} markers with {} names", events.len(), by_name.len());

        Self {
            events,
            by_name,
            range_cache: RefCell::new(HashMap::new()),
        }
    }

    /// All markers, in time order
    pub fn events(&self) -> &[RawMarker] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct marker names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Every timestamp recorded for `name`, ascending
    pub fn occurrences(&self, name: &str) -> &[f64] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<f64> {
        self.occurrences(name).first().copied()
    }

    pub fn last(&self, name: &str) -> Option<f64> {
        self.occurrences(name).last().copied()
    }

    /// Intervals running from each `start` marker to the next `end` marker.
    ///
    /// Missing markers leave that side unbounded. Each end marker closes at
    /// most one interval; a start with no end left after it is dropped.
    /// The result is normalized, so nested or repeated phases merge.
    pub fn get_ranges(&self, start: &str, end: &str) -> Vec<Range<f64>> {
        let key = (start.to_string(), end.to_string());
        if let Some(cached) = self.range_cache.borrow().get(&key) {
            return cached.clone();
        }

        let ranges = pair_markers(self.occurrences(start), self.occurrences(end));
        self.range_cache.borrow_mut().insert(key, ranges.clone());
        ranges
    }

    /// Intervals of phase `phase`, from `before-<phase>` to `after-<phase>`
    pub fn phase_ranges(&self, phase: &str) -> Vec<Range<f64>> {
        self.get_ranges(
            &format!("{BEFORE_MARKER_PREFIX}{phase}"),
            &format!("{AFTER_MARKER_PREFIX}{phase}"),
        )
    }
}

/// Two-pointer pairing of sorted start and end timestamps
fn pair_markers(starts: &[f64], ends: &[f64]) -> Vec<Range<f64>> {
    match (starts.first(), ends.last()) {
        (None, None) => return vec![Range::unbounded()],
        (None, Some(&last_end)) => return vec![Range::new(Unbounded, Included(last_end))],
        (Some(&first_start), None) => return vec![Range::new(Included(first_start), Unbounded)],
        (Some(_), Some(_)) => {}
    }

    let mut ranges = Vec::new();
    let mut cursor = 0;
    for &start in starts {
        while cursor < ends.len() && ends[cursor] < start {
            cursor += 1;
        }
        let Some(&end) = ends.get(cursor) else {
            break;
        };
        ranges.push(Range::closed(start, end));
        cursor += 1;
    }

    Range::normalize(ranges)
}
