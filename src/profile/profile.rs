//! The profile model: owner of every node, view and marker.
//!
//! Construction is a fixed pipeline:
//! build tree -> fold natives -> rebuild sample times -> roll up totals.
//! Views are built on first access and cached; the profile is immutable
//! once [`Profile::build`] returns.

use super::category::Category;
use super::node::{CallSiteUid, Node, NodeIndex};
use super::options::ProfileOptions;
use super::samples::reconstruct;
use super::tree::{build_tree, compute_totals, relocate_natives, Relocations, Tree};
use crate::aggregator::views::{
    build_category_views, build_file_views, build_function_views, file_key, CategoryView,
    FileView, FunctionView, ViewMap,
};
use crate::parser::schema::{ProfileInput, RawMarker, RawProfile};
use crate::timeline::{EventIndex, Range};
use crate::utils::error::ProfileError;
use log::{debug, info};
use std::cell::OnceCell;

/// A reconstructed, queryable CPU profile
#[derive(Debug)]
pub struct Profile {
    tree: Tree,
    samples: Vec<u64>,
    timestamps: Vec<f64>,
    start_time: f64,
    end_time: f64,
    average_sample_duration: f64,
    total_count: u64,
    options: ProfileOptions,
    events: EventIndex,
    function_views: OnceCell<ViewMap<CallSiteUid, FunctionView>>,
    file_views: OnceCell<ViewMap<String, FileView>>,
    category_views: OnceCell<ViewMap<Category, CategoryView>>,
}

impl Profile {
    /// Build a profile from parsed input
    pub fn from_input(
        input: &ProfileInput,
        options: &ProfileOptions,
    ) -> Result<Self, ProfileError> {
        Self::build(&input.profile, &input.markers, options)
    }

    /// Build a profile from a raw record and its marker stream
    ///
    /// # Errors
    /// * `ProfileError::MissingSampleData` - No hit counts and no samples
    /// * `ProfileError::DuplicateNode` / `DanglingChild` - Broken node list
    /// * `ProfileError::UnknownSampleNode` - A sample names no node
    pub fn build(
        raw: &RawProfile,
        markers: &[RawMarker],
        options: &ProfileOptions,
    ) -> Result<Self, ProfileError> {
        info!(
            "Building profile: {} nodes, {} samples",
            raw.nodes.len(),
            raw.samples.as_ref().map_or(0, Vec::len)
        );

        let mut tree = build_tree(raw)?;

        let relocations = if options.include_natives {
            Relocations::default()
        } else {
            relocate_natives(&mut tree)
        };

        let total_hits: u64 = tree.nodes.iter().map(|node| node.self_count).sum();
        let timeline = reconstruct(raw, &relocations, &mut tree, total_hits)?;

        compute_totals(&mut tree);
        let total_count: u64 = tree
            .roots
            .iter()
            .map(|&root| tree.nodes[root].total_count)
            .sum();
        debug_assert_eq!(total_count, total_hits, "totals do not match self counts");

        debug!(
            "Profile built: {} nodes, {} samples, {:.1}us average sample",
            tree.nodes.len(),
            total_count,
            timeline.average_duration
        );

        Ok(Self {
            tree,
            samples: timeline.samples,
            timestamps: timeline.timestamps,
            start_time: raw.start_time,
            end_time: timeline.end_time,
            average_sample_duration: timeline.average_duration,
            total_count,
            options: options.clone(),
            events: EventIndex::new(markers),
            function_views: OnceCell::new(),
            file_views: OnceCell::new(),
            category_views: OnceCell::new(),
        })
    }

    pub fn options(&self) -> &ProfileOptions {
        &self.options
    }

    /// Start time in microseconds
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End time in microseconds
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Total samples in the profile
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn average_sample_duration(&self) -> f64 {
        self.average_sample_duration
    }

    /// Surviving node id of every sample, in time order
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Sample times matching [`samples`](Self::samples); synthesized
    /// timelines carry one extra trailing entry for the profile end
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Samples whose time falls in any of `ranges`
    pub fn sample_count_in(&self, ranges: &[Range<f64>]) -> u64 {
        let times = &self.timestamps[..self.samples.len()];
        Range::normalize(ranges.iter().copied())
            .iter()
            .map(|range| range.count_sorted(times) as u64)
            .sum()
    }

    // ---- nodes -------------------------------------------------------

    pub fn nodes(&self) -> &[Node] {
        &self.tree.nodes
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.tree.roots.iter().map(|&i| &self.tree.nodes[i])
    }

    /// The first root, which V8 names `(root)`
    pub fn root(&self) -> Option<&Node> {
        self.roots().next()
    }

    pub fn has_node(&self, id: u64) -> bool {
        self.tree.index.contains_key(&id)
    }

    pub fn node(&self, id: u64) -> Result<&Node, ProfileError> {
        self.tree.get(id).ok_or(ProfileError::NodeNotFound(id))
    }

    /// Node by arena index; indices come from this profile's nodes
    pub fn node_at(&self, index: NodeIndex) -> &Node {
        &self.tree.nodes[index]
    }

    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent().map(|i| self.node_at(i))
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children().iter().map(|&i| self.node_at(i))
    }

    /// Strict ancestors, nearest first
    pub fn ancestors<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        std::iter::successors(self.parent(node), |n| self.parent(n))
    }

    /// Strict descendants in pre-order
    pub fn descendants<'a>(&'a self, node: &'a Node) -> Descendants<'a> {
        Descendants {
            profile: self,
            stack: node.children().iter().rev().copied().collect(),
        }
    }

    /// Other children of the same parent (other roots for a root)
    pub fn siblings<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        let candidates = match node.parent() {
            Some(parent) => self.node_at(parent).children(),
            None => self.tree.roots.as_slice(),
        };
        candidates
            .iter()
            .filter(move |&&i| i != node.index())
            .map(|&i| self.node_at(i))
    }

    /// Nearest strict ancestor matching `predicate`
    pub fn find_ancestor<'a>(
        &'a self,
        node: &'a Node,
        predicate: impl Fn(&Node) -> bool,
    ) -> Option<&'a Node> {
        self.ancestors(node).find(|n| predicate(n))
    }

    /// Strict descendants matching `predicate`, in pre-order
    pub fn find_descendants<'a>(
        &'a self,
        node: &'a Node,
        predicate: impl Fn(&Node) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.descendants(node).filter(move |n| predicate(n))
    }

    pub fn is_ancestor(&self, ancestor: &Node, descendant: &Node) -> bool {
        ancestor.is_ancestor_of(descendant)
    }

    // ---- function views ---------------------------------------------

    fn function_view_map(&self) -> &ViewMap<CallSiteUid, FunctionView> {
        self.function_views.get_or_init(|| build_function_views(self))
    }

    pub fn function_views(&self) -> &[FunctionView] {
        self.function_view_map().views()
    }

    pub fn has_function_view(&self, uid: &CallSiteUid) -> bool {
        self.function_view_map().contains(uid)
    }

    pub fn function_view(&self, uid: &CallSiteUid) -> Result<&FunctionView, ProfileError> {
        self.function_view_map()
            .get(uid)
            .ok_or_else(|| ProfileError::FunctionViewNotFound(uid.to_string()))
    }

    pub fn function_view_for(&self, node: &Node) -> Result<&FunctionView, ProfileError> {
        self.function_view(node.call_uid())
    }

    // ---- file views -------------------------------------------------

    fn file_view_map(&self) -> &ViewMap<String, FileView> {
        self.file_views.get_or_init(|| build_file_views(self))
    }

    pub fn file_views(&self) -> &[FileView] {
        self.file_view_map().views()
    }

    pub fn has_file_view(&self, url: &str) -> bool {
        self.file_view_map().contains(file_key(url))
    }

    pub fn file_view(&self, url: &str) -> Result<&FileView, ProfileError> {
        self.file_view_map()
            .get(file_key(url))
            .ok_or_else(|| ProfileError::FileViewNotFound(url.to_string()))
    }

    pub fn file_view_for(&self, node: &Node) -> Result<&FileView, ProfileError> {
        self.file_view(node.url())
    }

    // ---- category views ---------------------------------------------

    fn category_view_map(&self) -> &ViewMap<Category, CategoryView> {
        self.category_views.get_or_init(|| build_category_views(self))
    }

    pub fn category_views(&self) -> &[CategoryView] {
        self.category_view_map().views()
    }

    pub fn has_category_view(&self, category: Category) -> bool {
        self.category_view_map().contains(&category)
    }

    pub fn category_view(&self, category: Category) -> Result<&CategoryView, ProfileError> {
        self.category_view_map()
            .get(&category)
            .ok_or_else(|| ProfileError::CategoryViewNotFound(category.to_string()))
    }

    /// Category view by display name, e.g. `"checker"`
    pub fn category_view_by_name(&self, name: &str) -> Result<&CategoryView, ProfileError> {
        self.category_view(name.parse()?)
    }

    pub fn category_view_for(&self, node: &Node) -> Result<&CategoryView, ProfileError> {
        self.category_view(node.category())
    }

    // ---- markers ----------------------------------------------------

    pub fn events(&self) -> &EventIndex {
        &self.events
    }

    /// Intervals between `start` and `end` markers
    pub fn get_ranges(&self, start: &str, end: &str) -> Vec<Range<f64>> {
        self.events.get_ranges(start, end)
    }
}

/// Pre-order walk below a node
pub struct Descendants<'a> {
    profile: &'a Profile,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = self.profile.node_at(index);
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
