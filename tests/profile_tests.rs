use pretty_assertions::assert_eq;
use profile_lens::aggregator::AggregateView;
use profile_lens::parser::{CallFrame, RawMarker, RawNode, RawProfile};
use profile_lens::profile::{Category, Node, Profile, ProfileOptions};
use profile_lens::timeline::Range;
use profile_lens::utils::ProfileError;

fn node(id: u64, name: &str, url: &str, hits: u64, children: &[u64]) -> RawNode {
    RawNode {
        id,
        call_frame: CallFrame {
            function_name: name.to_string(),
            script_id: id.to_string(),
            url: url.to_string(),
            line_number: 0,
            column_number: 0,
        },
        hit_count: Some(hits),
        children: Some(children.to_vec()),
        ..Default::default()
    }
}

/// root(1) -> native(2, self 4) -> leaf(3, self 3)
fn native_chain() -> RawProfile {
    RawProfile {
        nodes: vec![
            node(1, "(root)", "", 0, &[2]),
            node(2, "push", "native array.js", 4, &[3]),
            node(3, "leaf", "/app/leaf.js", 3, &[]),
        ],
        start_time: 0.0,
        end_time: 70.0,
        samples: Some(vec![2, 3, 2, 3, 2, 3, 2]),
        time_deltas: Some(vec![0.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]),
    }
}

/// A wider tree with natives at several depths, including a native under a native
fn mixed_tree() -> RawProfile {
    RawProfile {
        nodes: vec![
            node(1, "(root)", "", 0, &[2, 7]),
            node(2, "main", "/app/main.js", 2, &[3, 6]),
            node(3, "sort", "native array.js", 1, &[4]),
            node(4, "compare", "v8/builtins", 2, &[5]),
            node(5, "cmp", "/app/util.js", 6, &[]),
            node(6, "io", "/app/io.js", 3, &[]),
            node(7, "(garbage collector)", "", 4, &[]),
        ],
        start_time: 0.0,
        end_time: 180.0,
        samples: None,
        time_deltas: None,
    }
}

fn assert_totals_invariant(profile: &Profile) {
    for node in profile.nodes() {
        let children: u64 = profile.children(node).map(Node::total_count).sum();
        assert_eq!(node.total_count(), node.self_count() + children, "node {}", node.id());
    }
    let self_sum: u64 = profile.nodes().iter().map(Node::self_count).sum();
    assert_eq!(profile.total_count(), self_sum);
}

#[test]
fn test_native_collapse() {
    let profile = Profile::build(&native_chain(), &[], &ProfileOptions::new()).unwrap();

    assert!(!profile.has_node(2));

    let root = profile.node(1).unwrap();
    let leaf = profile.node(3).unwrap();
    assert_eq!(profile.parent(leaf).map(Node::id), Some(1));
    assert_eq!(root.self_count(), 4);
    assert_eq!(root.total_count(), 7);

    // Samples recorded in the native frame now belong to its caller
    assert_eq!(profile.samples(), &[1, 3, 1, 3, 1, 3, 1]);
    assert_eq!(root.timestamps(), &[0.0, 20.0, 40.0, 60.0]);
}

#[test]
fn test_natives_kept_when_requested() {
    let options = ProfileOptions::new().with_natives(true);
    let profile = Profile::build(&native_chain(), &[], &options).unwrap();

    let native = profile.node(2).unwrap();
    assert_eq!(native.category(), Category::Native);
    assert_eq!(native.total_count(), 7);
    assert_eq!(profile.node(1).unwrap().self_count(), 0);
    assert_eq!(profile.samples()[0], 2);
}

#[test]
fn test_relocation_preserves_sample_count() {
    let raw = mixed_tree();
    let with = Profile::build(&raw, &[], &ProfileOptions::new().with_natives(true)).unwrap();
    let without = Profile::build(&raw, &[], &ProfileOptions::new()).unwrap();

    assert_eq!(with.total_count(), 18);
    assert_eq!(without.total_count(), with.total_count());
    assert!(without.nodes().iter().all(|n| n.category() != Category::Native));

    // Both natives fold into main, and cmp takes their place under it
    let main = without.node(2).unwrap();
    assert_eq!(main.self_count(), 5);
    let children: Vec<u64> = without.children(main).map(Node::id).collect();
    assert_eq!(children, vec![5, 6]);

    assert_totals_invariant(&with);
    assert_totals_invariant(&without);
}

#[test]
fn test_wide_native_fan_out_keeps_order() {
    // root -> [first, 5000 x (native -> leaf), last]
    let width = 5000u64;
    let leaf_ids: Vec<u64> = (0..width).map(|i| 101 + 2 * i).collect();
    let mut root_children = vec![2];
    root_children.extend(leaf_ids.iter().map(|id| id - 1));
    root_children.push(3);

    let mut nodes = vec![
        node(1, "(root)", "", 0, &root_children),
        node(2, "first", "/app/first.js", 1, &[]),
        node(3, "last", "/app/last.js", 1, &[]),
    ];
    for &leaf in &leaf_ids {
        nodes.push(node(leaf - 1, "push", "native array.js", 2, &[leaf]));
        nodes.push(node(leaf, "leaf", "/app/leaf.js", 3, &[]));
    }
    let raw = RawProfile {
        nodes,
        start_time: 0.0,
        end_time: 100.0,
        samples: None,
        time_deltas: None,
    };

    let profile = Profile::build(&raw, &[], &ProfileOptions::new()).unwrap();

    assert_eq!(profile.nodes().len(), 3 + width as usize);
    let root = profile.node(1).unwrap();
    assert_eq!(root.self_count(), 2 * width);
    assert_eq!(root.total_count(), 2 + 5 * width);

    let children: Vec<u64> = profile.children(root).map(Node::id).collect();
    let mut expected = vec![2];
    expected.extend(&leaf_ids);
    expected.push(3);
    assert_eq!(children, expected);
    assert_totals_invariant(&profile);
}

#[test]
fn test_system_categories() {
    let profile = Profile::build(&mixed_tree(), &[], &ProfileOptions::new()).unwrap();

    let gc = profile.node(7).unwrap();
    assert_eq!(gc.category(), Category::GarbageCollector);
    assert!(gc.category().is_category(Category::System));

    let system = profile.category_view(Category::System).unwrap();
    assert_eq!(profile.category_view_for(gc).unwrap().total_count(), 4);
    assert_eq!(system.total_count(), 18);
}

#[test]
fn test_missing_sample_data() {
    let mut raw = mixed_tree();
    for node in &mut raw.nodes {
        node.hit_count = None;
    }

    let err = Profile::build(&raw, &[], &ProfileOptions::new()).unwrap_err();
    assert_eq!(err, ProfileError::MissingSampleData);
}

#[test]
fn test_dangling_child() {
    let mut raw = mixed_tree();
    raw.nodes[5].children = Some(vec![42]);

    let err = Profile::build(&raw, &[], &ProfileOptions::new()).unwrap_err();
    assert_eq!(err, ProfileError::DanglingChild { parent: 6, child: 42 });
}

#[test]
fn test_uniform_timestamps_without_deltas() {
    let mut raw = native_chain();
    raw.time_deltas = None;

    let profile = Profile::build(&raw, &[], &ProfileOptions::new()).unwrap();

    assert_eq!(profile.average_sample_duration(), 10.0);
    assert_eq!(profile.end_time(), 70.0);
    assert_eq!(profile.timestamps().len(), 8);
    assert_eq!(profile.timestamps()[7], 70.0);
}

#[test]
fn test_get_ranges_pairing() {
    let pairs = [
        ("start", 1.0),
        ("end", 2.0),
        ("start", 5.0),
        ("end", 6.0),
        ("start", 9.0),
    ];
    let markers: Vec<RawMarker> = pairs
        .into_iter()
        .map(|(name, ts)| RawMarker::new(name, ts))
        .collect();
    let profile = Profile::build(&native_chain(), &markers, &ProfileOptions::new()).unwrap();

    let ranges = profile.get_ranges("start", "end");
    assert_eq!(ranges, vec![Range::closed(1.0, 2.0), Range::closed(5.0, 6.0)]);

    // Cached results are identical
    assert_eq!(profile.get_ranges("start", "end"), ranges);
    assert_eq!(profile.events().occurrences("start"), &[1.0, 5.0, 9.0]);
}

#[test]
fn test_phase_slicing() {
    let markers = vec![
        RawMarker::new("before-emit", 15.0),
        RawMarker::new("after-emit", 45.0),
    ];
    let profile = Profile::build(&native_chain(), &markers, &ProfileOptions::new()).unwrap();

    let emit = profile.events().phase_ranges("emit");
    assert_eq!(emit, vec![Range::closed(15.0, 45.0)]);

    // Samples at 20, 30 and 40
    assert_eq!(profile.sample_count_in(&emit), 3);
    let leaf = profile.node(3).unwrap();
    let leaf_view = profile.function_view_for(leaf).unwrap();
    assert_eq!(leaf_view.self_count_in(&profile, &emit), 1);
}
