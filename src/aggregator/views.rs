//! Aggregated views over the call tree.
//!
//! Each view groups nodes sharing a key:
//! - [`FunctionView`]: call-site uid
//! - [`FileView`]: script url (`"program"` when empty)
//! - [`CategoryView`]: category, including every ancestor category of a
//!   node's own category
//!
//! Total counts sum only the topmost members with respect to the tree, so
//! recursion and nesting inside one group are not counted twice. Self
//! counts sum only direct members.

use crate::parser::schema::PositionTickInfo;
use crate::profile::{Category, CallSiteUid, Location, Node, NodeIndex, Profile};
use crate::timeline::Range;
use crate::utils::config::PROGRAM_FILE_NAME;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Counts shared by every kind of view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewStats {
    /// Self samples of direct members only
    pub self_count: u64,

    /// Total samples of the topmost members
    pub total_count: u64,

    /// Members that recorded a bailout reason
    pub bailout_count: u64,

    /// Distinct bailout reasons, first-seen order
    pub bailout_reasons: Vec<String>,

    /// Most specific categories among members
    pub categories: Vec<Category>,
}

impl ViewStats {
    fn compute(
        profile: &Profile,
        members: &[NodeIndex],
        is_direct: impl Fn(&Node) -> bool,
    ) -> Self {
        let mut stats = ViewStats::default();
        let mut seen_reasons = HashSet::new();
        let mut categories = Vec::with_capacity(members.len());

        for &index in members {
            let node = profile.node_at(index);
            if is_direct(node) {
                stats.self_count += node.self_count();
            }
            if let Some(reason) = node.bailout_reason() {
                stats.bailout_count += 1;
                if seen_reasons.insert(reason) {
                    stats.bailout_reasons.push(reason.to_string());
                }
            }
            categories.push(node.category());
        }

        stats.total_count = topmost(profile, members)
            .into_iter()
            .map(|index| profile.node_at(index).total_count())
            .sum();
        stats.categories = Category::reduce(categories);
        stats
    }
}

/// Members that have no ancestor inside the same member set.
///
/// When a node and one of its descendants are both members, the ancestor
/// wins and the descendant is dropped.
pub fn topmost(profile: &Profile, members: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut sorted: Vec<&Node> = members.iter().map(|&i| profile.node_at(i)).collect();
    sorted.sort_by_key(|node| node.enter);

    let mut top = Vec::new();
    let mut covered_until: Option<usize> = None;
    for node in sorted {
        if covered_until.is_some_and(|exit| node.enter <= exit) {
            continue;
        }
        covered_until = Some(node.exit);
        top.push(node.index);
    }
    top
}

/// Behaviour common to function, file and category views
pub trait AggregateView {
    /// Position of this view in its profile-wide list
    fn ordinal(&self) -> usize;

    fn name(&self) -> String;

    /// Arena indices of every member node
    fn node_indices(&self) -> &[NodeIndex];

    fn stats(&self) -> &ViewStats;

    /// Whether a member contributes its self count to this view
    fn is_direct_member(&self, node: &Node) -> bool;

    fn self_count(&self) -> u64 {
        self.stats().self_count
    }

    fn total_count(&self) -> u64 {
        self.stats().total_count
    }

    fn bailout_count(&self) -> u64 {
        self.stats().bailout_count
    }

    fn bailout_reasons(&self) -> &[String] {
        &self.stats().bailout_reasons
    }

    fn categories(&self) -> &[Category] {
        &self.stats().categories
    }

    fn nodes<'a>(&'a self, profile: &'a Profile) -> impl Iterator<Item = &'a Node> + 'a {
        self.node_indices().iter().map(move |&i| profile.node_at(i))
    }

    /// Sample times of the direct members, ascending
    fn timestamps(&self, profile: &Profile) -> Vec<f64> {
        let mut timestamps: Vec<f64> = self
            .nodes(profile)
            .filter(|node| self.is_direct_member(node))
            .flat_map(|node| node.timestamps().iter().copied())
            .collect();
        timestamps.sort_by(f64::total_cmp);
        timestamps
    }

    /// Self samples of the direct members that fall inside `ranges`
    fn self_count_in(&self, profile: &Profile, ranges: &[Range<f64>]) -> u64 {
        let ranges = Range::normalize(ranges.iter().copied());
        self.nodes(profile)
            .filter(|node| self.is_direct_member(node))
            .map(|node| {
                ranges
                    .iter()
                    .map(|range| range.count_sorted(node.timestamps()) as u64)
                    .sum::<u64>()
            })
            .sum()
    }
}

/// Views of one kind, in first-seen order, with a key lookup
#[derive(Debug)]
pub struct ViewMap<K, V> {
    views: Vec<V>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash, V> ViewMap<K, V> {
    pub fn views(&self) -> &[V] {
        &self.views
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).map(|&i| &self.views[i])
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Node groups keyed by first appearance
struct Groups<K> {
    index: HashMap<K, usize>,
    members: Vec<(K, Vec<NodeIndex>)>,
}

impl<K: Eq + Hash + Clone> Groups<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            members: Vec::new(),
        }
    }

    fn add(&mut self, key: K, node: NodeIndex) {
        match self.index.get(&key) {
            Some(&i) => self.members[i].1.push(node),
            None => {
                self.index.insert(key.clone(), self.members.len());
                self.members.push((key, vec![node]));
            }
        }
    }

    fn into_view_map<V>(
        self,
        mut make: impl FnMut(usize, K, Vec<NodeIndex>) -> V,
    ) -> ViewMap<K, V> {
        let views = self
            .members
            .into_iter()
            .enumerate()
            .map(|(ordinal, (key, nodes))| make(ordinal, key, nodes))
            .collect();
        ViewMap {
            views,
            index: self.index,
        }
    }
}

/// Distinct views reached from `members` through `step`, optionally
/// leaving out the view with ordinal `exclude`
fn related_views<'p, V, S, I>(
    profile: &'p Profile,
    members: &[NodeIndex],
    step: S,
    lookup: impl Fn(&'p Node) -> Option<&'p V>,
    exclude: Option<usize>,
) -> Vec<&'p V>
where
    V: AggregateView + 'p,
    S: Fn(&'p Node) -> I,
    I: IntoIterator<Item = NodeIndex>,
{
    let mut seen = HashSet::new();
    let mut related = Vec::new();
    for &index in members {
        for next in step(profile.node_at(index)) {
            let Some(view) = lookup(profile.node_at(next)) else {
                continue;
            };
            if Some(view.ordinal()) != exclude && seen.insert(view.ordinal()) {
                related.push(view);
            }
        }
    }
    related
}

/// All nodes of one call site
#[derive(Debug, Clone)]
pub struct FunctionView {
    ordinal: usize,
    uid: CallSiteUid,
    location: Location,
    category: Category,
    nodes: Vec<NodeIndex>,
    stats: ViewStats,
    positions: Vec<PositionTickInfo>,
}

impl FunctionView {
    pub fn uid(&self) -> &CallSiteUid {
        &self.uid
    }

    pub fn function_name(&self) -> &str {
        &self.uid.function_name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Per-line ticks merged across members, by line
    pub fn positions(&self) -> &[PositionTickInfo] {
        &self.positions
    }

    /// Functions whose nodes call into this one
    pub fn callers<'p>(&self, profile: &'p Profile) -> Vec<&'p FunctionView> {
        related_views(
            profile,
            &self.nodes,
            |node| node.parent(),
            |node| profile.function_view_for(node).ok(),
            None,
        )
    }

    /// Functions called from this one
    pub fn callees<'p>(&self, profile: &'p Profile) -> Vec<&'p FunctionView> {
        related_views(
            profile,
            &self.nodes,
            |node| node.children().iter().copied(),
            |node| profile.function_view_for(node).ok(),
            None,
        )
    }
}

impl AggregateView for FunctionView {
    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn name(&self) -> String {
        self.uid.to_string()
    }

    fn node_indices(&self) -> &[NodeIndex] {
        &self.nodes
    }

    fn stats(&self) -> &ViewStats {
        &self.stats
    }

    fn is_direct_member(&self, _node: &Node) -> bool {
        true
    }
}

/// All nodes of one script
#[derive(Debug, Clone)]
pub struct FileView {
    ordinal: usize,
    url: String,
    nodes: Vec<NodeIndex>,
    stats: ViewStats,
}

impl FileView {
    /// Script url, or `"program"` for frames without one
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Other files whose code calls into this file
    pub fn parents<'p>(&self, profile: &'p Profile) -> Vec<&'p FileView> {
        related_views(
            profile,
            &self.nodes,
            |node| node.parent(),
            |node| profile.file_view_for(node).ok(),
            Some(self.ordinal),
        )
    }

    /// Other files called from this file
    pub fn children<'p>(&self, profile: &'p Profile) -> Vec<&'p FileView> {
        related_views(
            profile,
            &self.nodes,
            |node| node.children().iter().copied(),
            |node| profile.file_view_for(node).ok(),
            Some(self.ordinal),
        )
    }
}

impl AggregateView for FileView {
    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn name(&self) -> String {
        self.url.clone()
    }

    fn node_indices(&self) -> &[NodeIndex] {
        &self.nodes
    }

    fn stats(&self) -> &ViewStats {
        &self.stats
    }

    fn is_direct_member(&self, _node: &Node) -> bool {
        true
    }
}

/// All nodes whose category is this category or one of its descendants
#[derive(Debug, Clone)]
pub struct CategoryView {
    ordinal: usize,
    category: Category,
    nodes: Vec<NodeIndex>,
    stats: ViewStats,
}

impl CategoryView {
    pub fn category(&self) -> Category {
        self.category
    }

    /// View of the parent category, if it has one
    pub fn parent<'p>(&self, profile: &'p Profile) -> Option<&'p CategoryView> {
        self.category
            .parent()
            .and_then(|parent| profile.category_view(parent).ok())
    }

    /// Views of child categories present in the profile
    pub fn children<'p>(&self, profile: &'p Profile) -> Vec<&'p CategoryView> {
        self.category
            .children()
            .filter_map(|child| profile.category_view(child).ok())
            .collect()
    }
}

impl AggregateView for CategoryView {
    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn name(&self) -> String {
        self.category.name().to_string()
    }

    fn node_indices(&self) -> &[NodeIndex] {
        &self.nodes
    }

    fn stats(&self) -> &ViewStats {
        &self.stats
    }

    fn is_direct_member(&self, node: &Node) -> bool {
        node.category() == self.category
    }
}

/// File view key for a url
pub fn file_key(url: &str) -> &str {
    if url.is_empty() {
        PROGRAM_FILE_NAME
    } else {
        url
    }
}

pub(crate) fn build_function_views(profile: &Profile) -> ViewMap<CallSiteUid, FunctionView> {
    let mut groups = Groups::new();
    for node in profile.nodes() {
        groups.add(node.call_uid().clone(), node.index());
    }

    groups.into_view_map(|ordinal, uid, nodes| {
        let first = profile.node_at(nodes[0]);
        FunctionView {
            ordinal,
            location: first.location().clone(),
            category: first.category(),
            stats: ViewStats::compute(profile, &nodes, |_| true),
            positions: merge_positions(profile, &nodes),
            uid,
            nodes,
        }
    })
}

pub(crate) fn build_file_views(profile: &Profile) -> ViewMap<String, FileView> {
    let mut groups = Groups::new();
    for node in profile.nodes() {
        groups.add(file_key(node.url()).to_string(), node.index());
    }

    groups.into_view_map(|ordinal, url, nodes| FileView {
        ordinal,
        stats: ViewStats::compute(profile, &nodes, |_| true),
        url,
        nodes,
    })
}

pub(crate) fn build_category_views(profile: &Profile) -> ViewMap<Category, CategoryView> {
    let mut members: Vec<Vec<NodeIndex>> = vec![Vec::new(); Category::COUNT];
    for node in profile.nodes() {
        let own = node.category();
        for category in std::iter::once(own).chain(own.ancestors()) {
            members[category as usize].push(node.index());
        }
    }

    // Category order rather than first-seen order
    let mut groups = Groups::new();
    for category in Category::ALL {
        for &index in &members[category as usize] {
            groups.add(category, index);
        }
    }

    groups.into_view_map(|ordinal, category, nodes| CategoryView {
        ordinal,
        stats: ViewStats::compute(profile, &nodes, |node| node.category() == category),
        category,
        nodes,
    })
}

fn merge_positions(profile: &Profile, members: &[NodeIndex]) -> Vec<PositionTickInfo> {
    let mut by_line: BTreeMap<u32, u64> = BTreeMap::new();
    for &index in members {
        for tick in profile.node_at(index).line_ticks() {
            *by_line.entry(tick.line).or_insert(0) += tick.ticks;
        }
    }
    by_line
        .into_iter()
        .map(|(line, ticks)| PositionTickInfo { line, ticks })
        .collect()
}
