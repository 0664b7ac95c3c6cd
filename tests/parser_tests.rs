use pretty_assertions::assert_eq;
use profile_lens::parser::{parse_input, read_input};
use profile_lens::profile::{Profile, ProfileOptions};
use profile_lens::timeline::Range;
use profile_lens::utils::ParseError;
use serde_json::json;
use std::io::Write;

fn chunked_trace() -> serde_json::Value {
    json!({
        "traceEvents": [
            {"name": "TracingStartedInBrowser", "ph": "I", "ts": 0},
            {"name": "Profile", "ph": "P", "id": "0x1", "ts": 1000, "args": {"data": {"startTime": 1000}}},
            {"name": "ProfileChunk", "ph": "P", "id": "0x1", "ts": 1100, "args": {"data": {
                "cpuProfile": {
                    "nodes": [
                        {"id": 1, "callFrame": {"functionName": "(root)", "scriptId": 0, "url": "", "lineNumber": -1, "columnNumber": -1}},
                        {"id": 2, "parent": 1, "callFrame": {"functionName": "compile", "scriptId": 4, "url": "/ts/src/compiler/program.ts", "lineNumber": 5, "columnNumber": 2}}
                    ],
                    "samples": [2, 2]
                },
                "timeDeltas": [100, 100]
            }}},
            {"name": "ProfileChunk", "ph": "P", "id": "0x1", "ts": 1300, "args": {"data": {
                "cpuProfile": {
                    "nodes": [
                        {"id": 3, "parent": 2, "callFrame": {"functionName": "checkSourceFile", "scriptId": 4, "url": "/ts/src/compiler/checker.ts", "lineNumber": 40, "columnNumber": 0}}
                    ],
                    "samples": [3, 3, 1]
                },
                "timeDeltas": [100, 100, 100]
            }}},
            {"name": "ProfileChunk", "ph": "P", "id": "0x2", "ts": 1300, "args": {"data": {"cpuProfile": {"samples": [99]}}}},
            {"name": "before-check", "ph": "R", "ts": 1250},
            {"name": "after-check", "ph": "R", "ts": 1450},
            "not an event"
        ]
    })
}

#[test]
fn test_chunked_trace_builds_profile() {
    let input = parse_input(&chunked_trace()).unwrap();

    assert_eq!(input.profile.nodes.len(), 3);
    assert_eq!(input.profile.samples.as_deref(), Some(&[2, 2, 3, 3, 1][..]));
    assert_eq!(input.profile.start_time, 1000.0);
    assert_eq!(input.profile.end_time, 1500.0);

    let names: Vec<&str> = input.markers.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["TracingStartedInBrowser", "before-check", "after-check"]);

    let profile = Profile::from_input(&input, &ProfileOptions::new()).unwrap();
    assert_eq!(profile.total_count(), 5);
    assert_eq!(profile.node(3).unwrap().total_count(), 2);
    assert_eq!(profile.node(2).unwrap().total_count(), 4);

    let check = profile.events().phase_ranges("check");
    assert_eq!(check, vec![Range::closed(1250.0, 1450.0)]);
    // Samples at 1300 and 1400 fall in the phase
    assert_eq!(profile.sample_count_in(&check), 2);
}

#[test]
fn test_bare_cpuprofile_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let body = json!({
        "nodes": [
            {"id": 1, "callFrame": {"functionName": "(root)", "scriptId": "0", "url": ""}, "hitCount": 0, "children": [2]},
            {"id": 2, "callFrame": {"functionName": "(idle)", "scriptId": "0", "url": ""}, "hitCount": 9}
        ],
        "startTime": 0,
        "endTime": 900
    });
    file.write_all(body.to_string().as_bytes()).unwrap();

    let input = read_input(file.path()).unwrap();
    assert!(input.markers.is_empty());

    let profile = Profile::from_input(&input, &ProfileOptions::new()).unwrap();
    assert_eq!(profile.total_count(), 9);
    assert_eq!(profile.average_sample_duration(), 100.0);
    assert!(profile.timestamps().is_empty());
}

#[test]
fn test_trace_without_profile() {
    let trace = json!([{"name": "before-x", "ph": "R", "ts": 1}]);
    let result = parse_input(&trace);
    assert!(matches!(result, Err(ParseError::ProfileNotFound)));
}

#[test]
fn test_invalid_format() {
    assert!(matches!(parse_input(&json!("text")), Err(ParseError::InvalidFormat(_))));
    assert!(matches!(parse_input(&json!({"foo": 1})), Err(ParseError::InvalidFormat(_))));
}

#[test]
fn test_missing_file() {
    let result = read_input("does/not/exist.cpuprofile");
    assert!(matches!(result, Err(ParseError::ReadFailed(_))));
}
