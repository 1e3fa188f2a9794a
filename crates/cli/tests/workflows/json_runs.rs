//! JSON snapshots across consecutive runs

use crate::common::TestDir;
use crate::snapdelta;
use anyhow::Result;
use serde_json::json;

const DAY1: &str = r#"{
  "generated": "2024-05-01",
  "products": [
    {"id": "a", "name": "apple", "price": 100},
    {"id": "b", "name": "pear", "price": 200},
    {"id": "c", "name": "plum", "price": 50}
  ]
}"#;

#[test]
fn test_json_runs_emit_only_changes() -> Result<()> {
    let dir = TestDir::new()?;
    let day1 = dir.write("day1.json", DAY1)?;
    snapdelta!(dir.path(), "json", &day1, "products", "$.id").assert_success()?;

    let delta = dir.read_json("day1.json.changes.json")?;
    assert_eq!(delta["products"].as_array().map(Vec::len), Some(3));

    // "a" is identical; "b" changes; "c" is gone; "d" is new
    let day2 = dir.write(
        "day2.json",
        r#"{"products": [
            {"id": "a", "name": "apple", "price": 100},
            {"id": "b", "name": "pear", "price": 250},
            {"id": "d", "name": "fig", "price": 400}
        ]}"#,
    )?;
    let previous = dir.arg("day1.json.fingerprints.json");
    snapdelta!(dir.path(), "json", &day2, "products", "$.id", &previous).assert_success()?;

    let delta = dir.read_json("day2.json.changes.json")?;
    assert_eq!(
        delta,
        json!({"products": [
            {"id": "b", "name": "pear", "price": 250},
            {"id": "d", "name": "fig", "price": 400}
        ]})
    );

    let removed = dir.read_json("day2.json.removedIds.json")?;
    assert_eq!(removed.as_object().map(|m| m.len()), Some(1));
    assert!(removed.get("c").is_some());
    Ok(())
}

#[test]
fn test_member_reorder_is_a_change() -> Result<()> {
    let dir = TestDir::new()?;
    let day1 = dir.write("day1.json", r#"{"products": [{"id": "a", "name": "apple", "price": 100}]}"#)?;
    snapdelta!(dir.path(), "json", &day1, "products", "$.id").assert_success()?;

    let day2 = dir.write("day2.json", r#"{"products": [{"price": 100, "name": "apple", "id": "a"}]}"#)?;
    let previous = dir.arg("day1.json.fingerprints.json");
    snapdelta!(dir.path(), "json", &day2, "products", "$.id", &previous).assert_success()?;

    assert_eq!(
        dir.read("day2.json.changes.json")?,
        "{\"products\":[\n{\"price\":100,\"name\":\"apple\",\"id\":\"a\"}\n]}\n"
    );
    assert!(!dir.exists("day2.json.removedIds.json"));
    Ok(())
}

#[test]
fn test_delta_records_keep_source_text() -> Result<()> {
    let dir = TestDir::new()?;
    let records = [
        r#"{"sku":"z-9","id":"k1","tags":["b","a"],"meta":{"y":null,"x":true}}"#,
        r#"{"id":"k2","zeta":1,"alpha":{"nested":[{"q":2,"p":1}]}}"#,
    ];
    let snapshot = dir.write("feed.json", &format!("{{\"products\": [{}]}}", records.join(", ")))?;
    snapdelta!(dir.path(), "json", &snapshot, "products", "$.id").assert_success()?;

    let delta = dir.read("feed.json.changes.json")?;
    let lines: Vec<&str> = delta.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], records[0]);
    assert_eq!(lines[2], format!(",{}", records[1]));
    Ok(())
}

#[test]
fn test_missing_snapshot_leaves_no_output() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.arg("feed.json");

    let result = snapdelta!(dir.path(), "json", &snapshot, "products", "$.id").assert_failure()?;
    assert!(result.contains_stderr("Failed to open snapshot"));
    assert!(!dir.exists("feed.json.changes.json"));
    assert!(!dir.exists("feed.json.fingerprints.json"));
    Ok(())
}

#[test]
fn test_delta_layout_matches_entries_path() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.json", r#"{"products": [{"id": 1}, {"id": 2}]}"#)?;
    snapdelta!(dir.path(), "json", &snapshot, "products", "id").assert_success()?;

    assert_eq!(
        dir.read("feed.json.changes.json")?,
        "{\"products\":[\n{\"id\":1}\n,{\"id\":2}\n]}\n"
    );
    // Numeric identities are keyed by their JSON text
    let fingerprints = dir.read_json("feed.json.fingerprints.json")?;
    assert!(fingerprints.get("1").is_some());
    assert!(fingerprints.get("2").is_some());
    Ok(())
}

#[test]
fn test_nested_entries_path() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write(
        "events.json",
        r#"{"messages": [
            {"markets": [{"key": {"market": "m1"}, "odds": 1.5}]},
            {"markets": [{"key": {"market": "m2"}, "odds": 2.0}, {"key": {"market": "m1"}, "odds": 9.9}]}
        ]}"#,
    )?;
    snapdelta!(dir.path(), "json", &snapshot, "messages.item.markets", "$.key.market").assert_success()?;

    let delta = dir.read_json("events.json.changes.json")?;
    assert_eq!(delta["messages.item.markets"].as_array().map(Vec::len), Some(2));
    assert_eq!(dir.read_json("events.json.duplicateIds.json")?, json!(["m1"]));
    Ok(())
}

#[test]
fn test_missing_entries_path_yields_empty_delta() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.json", r#"{"items": [{"id": 1}]}"#)?;
    snapdelta!(dir.path(), "json", &snapshot, "products", "id").assert_success()?;

    assert_eq!(dir.read_json("feed.json.changes.json")?, json!({"products": []}));
    assert_eq!(dir.read_json("feed.json.fingerprints.json")?, json!({}));
    Ok(())
}

#[test]
fn test_record_without_identity_is_fatal() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.json", r#"{"products": [{"id": 1}, {"sku": 2}]}"#)?;

    let result = snapdelta!(dir.path(), "json", &snapshot, "products", "$.id").assert_failure()?;
    assert!(result.contains_stderr("identity extraction failed at record 2"));
    assert!(!dir.exists("feed.json.fingerprints.json"));
    Ok(())
}

#[test]
fn test_malformed_json_is_fatal() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.json", r#"{"products": [{"id": 1}, "#)?;

    let result = snapdelta!(dir.path(), "json", &snapshot, "products", "id").assert_failure()?;
    assert!(result.contains_stderr("malformed source"));
    Ok(())
}
