//! Intervals with open, closed and unbounded endpoints.
//!
//! Endpoints are `std::ops::Bound`s, so `Included`/`Excluded` carry the
//! inclusivity flag and `Unbounded` never compares as a real value.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound::{self, Excluded, Included, Unbounded};

/// An interval over any partially ordered value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range<T> {
    left: Bound<T>,
    right: Bound<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(left: Bound<T>, right: Bound<T>) -> Self {
        Self { left, right }
    }

    /// `[left, right]`
    pub fn closed(left: T, right: T) -> Self {
        Self::new(Included(left), Included(right))
    }

    /// `(left, right)`
    pub fn open(left: T, right: T) -> Self {
        Self::new(Excluded(left), Excluded(right))
    }

    /// `[left, right)`
    pub fn half_open(left: T, right: T) -> Self {
        Self::new(Included(left), Excluded(right))
    }

    /// `[left, +inf)`
    pub fn at_least(left: T) -> Self {
        Self::new(Included(left), Unbounded)
    }

    /// `(-inf, right]`
    pub fn at_most(right: T) -> Self {
        Self::new(Unbounded, Included(right))
    }

    /// `(-inf, +inf)`
    pub fn unbounded() -> Self {
        Self::new(Unbounded, Unbounded)
    }

    pub fn left(&self) -> Bound<T> {
        self.left
    }

    pub fn right(&self) -> Bound<T> {
        self.right
    }

    pub fn is_empty(&self) -> bool {
        match (self.left, self.right) {
            (Unbounded, _) | (_, Unbounded) => false,
            (Included(l), Included(r)) => l > r,
            (Included(l) | Excluded(l), Included(r) | Excluded(r)) => !(l < r),
        }
    }

    pub fn contains(&self, value: T) -> bool {
        let after_left = match self.left {
            Unbounded => true,
            Included(l) => l <= value,
            Excluded(l) => l < value,
        };
        let before_right = match self.right {
            Unbounded => true,
            Included(r) => value <= r,
            Excluded(r) => value < r,
        };
        after_left && before_right
    }

    /// Number of values of an ascending slice that fall in this range
    pub fn count_sorted(&self, sorted: &[T]) -> usize {
        let start = match self.left {
            Unbounded => 0,
            Included(l) => sorted.partition_point(|v| *v < l),
            Excluded(l) => sorted.partition_point(|v| *v <= l),
        };
        let end = match self.right {
            Unbounded => sorted.len(),
            Included(r) => sorted.partition_point(|v| *v <= r),
            Excluded(r) => sorted.partition_point(|v| *v < r),
        };
        end.saturating_sub(start)
    }

    /// The overlap of two ranges, or `None` if they are disjoint
    pub fn intersect(&self, other: &Range<T>) -> Option<Range<T>> {
        let left = if cmp_left(&self.left, &other.left) == Ordering::Less {
            other.left
        } else {
            self.left
        };
        let right = if cmp_right(&self.right, &other.right) == Ordering::Greater {
            other.right
        } else {
            self.right
        };

        let range = Range::new(left, right);
        (!range.is_empty()).then_some(range)
    }

    /// Both ranges as a normalized set: one range if they touch, else two
    pub fn union(&self, other: &Range<T>) -> Vec<Range<T>> {
        Range::normalize([*self, *other])
    }

    /// Sort by left bound, drop empty ranges and merge any that overlap or
    /// touch. The result is a canonical, idempotent form of the set.
    pub fn normalize<I>(ranges: I) -> Vec<Range<T>>
    where
        I: IntoIterator<Item = Range<T>>,
    {
        let mut sorted: Vec<Range<T>> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        sorted.sort_by(|a, b| cmp_left(&a.left, &b.left));

        let mut merged: Vec<Range<T>> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if connects(&last.right, &range.left) => {
                    if cmp_right(&range.right, &last.right) == Ordering::Greater {
                        last.right = range.right;
                    }
                }
                _ => merged.push(range),
            }
        }
        merged
    }

    /// Union of two range sets
    pub fn union_all(a: &[Range<T>], b: &[Range<T>]) -> Vec<Range<T>> {
        Range::normalize(a.iter().chain(b).copied())
    }

    /// Intersection of two range sets, normalized
    pub fn intersect_all(a: &[Range<T>], b: &[Range<T>]) -> Vec<Range<T>> {
        let a = Range::normalize(a.iter().copied());
        let b = Range::normalize(b.iter().copied());

        let (mut i, mut j) = (0, 0);
        let mut result = Vec::new();
        while i < a.len() && j < b.len() {
            if let Some(overlap) = a[i].intersect(&b[j]) {
                result.push(overlap);
            }
            if cmp_right(&a[i].right, &b[j].right) == Ordering::Less {
                i += 1;
            } else {
                j += 1;
            }
        }
        result
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.left {
            Unbounded => f.write_str("(-inf")?,
            Included(l) => write!(f, "[{l}")?,
            Excluded(l) => write!(f, "({l}")?,
        }
        f.write_str(", ")?;
        match &self.right {
            Unbounded => f.write_str("+inf)"),
            Included(r) => write!(f, "{r}]"),
            Excluded(r) => write!(f, "{r})"),
        }
    }
}

fn cmp_values<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Order left bounds: unbounded first, and at equal values an included
/// bound starts before an excluded one
fn cmp_left<T: PartialOrd>(a: &Bound<T>, b: &Bound<T>) -> Ordering {
    match (a, b) {
        (Unbounded, Unbounded) => Ordering::Equal,
        (Unbounded, _) => Ordering::Less,
        (_, Unbounded) => Ordering::Greater,
        (Included(x) | Excluded(x), Included(y) | Excluded(y)) => cmp_values(x, y)
            .then_with(|| matches!(a, Excluded(_)).cmp(&matches!(b, Excluded(_)))),
    }
}

/// Order right bounds: unbounded last, and at equal values an excluded
/// bound ends before an included one
fn cmp_right<T: PartialOrd>(a: &Bound<T>, b: &Bound<T>) -> Ordering {
    match (a, b) {
        (Unbounded, Unbounded) => Ordering::Equal,
        (Unbounded, _) => Ordering::Greater,
        (_, Unbounded) => Ordering::Less,
        (Included(x) | Excluded(x), Included(y) | Excluded(y)) => cmp_values(x, y)
            .then_with(|| matches!(a, Included(_)).cmp(&matches!(b, Included(_)))),
    }
}

/// Whether a range ending at `right` overlaps or touches one starting at
/// `left` (with `left` not before the first range's start)
fn connects<T: PartialOrd>(right: &Bound<T>, left: &Bound<T>) -> bool {
    match (right, left) {
        (Unbounded, _) | (_, Unbounded) => true,
        (Included(r) | Excluded(r), Included(l) | Excluded(l)) => match cmp_values(r, l) {
            Ordering::Greater => true,
            Ordering::Equal => !matches!((right, left), (Excluded(_), Excluded(_))),
            Ordering::Less => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emptiness() {
        assert!(!Range::closed(1, 1).is_empty());
        assert!(Range::half_open(1, 1).is_empty());
        assert!(Range::open(1, 1).is_empty());
        assert!(Range::closed(2, 1).is_empty());
        assert!(!Range::<i32>::unbounded().is_empty());
        assert!(!Range::at_most(-5).is_empty());
    }

    #[test]
    fn test_contains() {
        let range = Range::half_open(1.0, 2.0);
        assert!(range.contains(1.0));
        assert!(range.contains(1.5));
        assert!(!range.contains(2.0));
        assert!(Range::at_least(3).contains(1_000_000));
        assert!(!Range::at_least(3).contains(2));
    }

    #[test]
    fn test_count_sorted() {
        let values = [1.0, 2.0, 2.0, 3.0, 5.0, 8.0];
        assert_eq!(Range::closed(2.0, 5.0).count_sorted(&values), 4);
        assert_eq!(Range::open(2.0, 5.0).count_sorted(&values), 1);
        assert_eq!(Range::at_least(4.0).count_sorted(&values), 2);
        assert_eq!(Range::<f64>::unbounded().count_sorted(&values), 6);
        assert_eq!(Range::closed(6.0, 7.0).count_sorted(&values), 0);
        assert_eq!(Range::closed(9.0, 1.0).count_sorted(&values), 0);
    }

    #[test]
    fn test_intersect() {
        assert_eq!(
            Range::closed(1, 5).intersect(&Range::open(3, 8)),
            Some(Range::new(Excluded(3), Included(5)))
        );
        assert_eq!(
            Range::at_most(4).intersect(&Range::at_least(2)),
            Some(Range::closed(2, 4))
        );
        assert_eq!(Range::half_open(1, 2).intersect(&Range::closed(2, 3)), None);
        assert_eq!(
            Range::closed(1, 2).intersect(&Range::closed(2, 3)),
            Some(Range::closed(2, 2))
        );
    }

    #[test]
    fn test_union() {
        assert_eq!(
            Range::closed(1, 3).union(&Range::closed(2, 5)),
            vec![Range::closed(1, 5)]
        );
        assert_eq!(
            Range::half_open(1, 2).union(&Range::closed(2, 3)),
            vec![Range::closed(1, 3)]
        );
        assert_eq!(
            Range::open(1, 2).union(&Range::open(2, 3)),
            vec![Range::open(1, 2), Range::open(2, 3)]
        );
        assert_eq!(
            Range::closed(5, 6).union(&Range::at_most(0)),
            vec![Range::at_most(0), Range::closed(5, 6)]
        );
    }

    #[test]
    fn test_normalize_merges_and_sorts() {
        let ranges = vec![
            Range::closed(10, 12),
            Range::closed(1, 3),
            Range::closed(2, 4),
            Range::closed(5, 4),
            Range::at_least(11),
        ];
        assert_eq!(
            Range::normalize(ranges),
            vec![Range::closed(1, 4), Range::at_least(10)]
        );
    }

    #[test]
    fn test_normalize_keeps_disjoint_ranges() {
        let ranges = vec![Range::closed(5.0, 6.0), Range::closed(1.0, 2.0)];
        assert_eq!(
            Range::normalize(ranges),
            vec![Range::closed(1.0, 2.0), Range::closed(5.0, 6.0)]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = vec![
            vec![],
            vec![Range::closed(1, 2), Range::open(2, 3), Range::closed(7, 9)],
            vec![Range::open(1, 2), Range::open(2, 3)],
            vec![Range::at_most(3), Range::at_least(3)],
            vec![Range::half_open(4, 6), Range::closed(0, 1), Range::closed(1, 4)],
            vec![Range::new(Excluded(0), Unbounded), Range::closed(-3, -1)],
        ];

        for ranges in samples {
            let once = Range::normalize(ranges);
            let twice = Range::normalize(once.clone());
            assert_eq!(once, twice);
            for pair in once.windows(2) {
                assert!(!connects(&pair[0].right, &pair[1].left));
            }
        }
    }

    #[test]
    fn test_set_operations() {
        let a = vec![Range::closed(0, 5), Range::closed(10, 15)];
        let b = vec![Range::closed(3, 12), Range::at_least(14)];

        assert_eq!(
            Range::intersect_all(&a, &b),
            vec![
                Range::closed(3, 5),
                Range::closed(10, 12),
                Range::closed(14, 15),
            ]
        );
        assert_eq!(Range::union_all(&a, &b), vec![Range::at_least(0)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Range::half_open(1, 2).to_string(), "[1, 2)");
        assert_eq!(Range::<i32>::unbounded().to_string(), "(-inf, +inf)");
    }
}
