//! CSV snapshots across consecutive runs

use crate::common::TestDir;
use crate::snapdelta;
use anyhow::Result;

const DAY1: &str = "id,name,price\n1,apple,1.00\n2,pear,2.00\n3,plum,0.50\n";

fn first_run(dir: &TestDir) -> Result<()> {
    let snapshot = dir.write("day1.csv", DAY1)?;
    snapdelta!(dir.path(), "csv", &snapshot, "id").assert_success()?;
    Ok(())
}

#[test]
fn test_first_run_emits_every_record() -> Result<()> {
    let dir = TestDir::new()?;
    first_run(&dir)?;

    assert_eq!(dir.read("day1.csv.changes.csv")?, DAY1);

    let fingerprints = dir.read_json("day1.csv.fingerprints.json")?;
    let entries = fingerprints.as_object().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.values().all(|v| v.as_str().map(str::len) == Some(64)));

    let summary = dir.read_json("day1.csv.summary.json")?;
    assert_eq!(summary["records"], 3);
    assert_eq!(summary["new"], 3);
    assert_eq!(summary["delta"], 3);

    assert!(!dir.exists("day1.csv.duplicateIds.json"));
    assert!(!dir.exists("day1.csv.removedIds.json"));
    Ok(())
}

#[test]
fn test_second_run_emits_only_changes() -> Result<()> {
    let dir = TestDir::new()?;
    first_run(&dir)?;

    let snapshot = dir.write(
        "day2.csv",
        "id,name,price\n1,apple,1.00\n2,pear,2.50\n3,plum,0.50\n4,fig,4.00\n",
    )?;
    let previous = dir.arg("day1.csv.fingerprints.json");
    snapdelta!(dir.path(), "csv", &snapshot, "id", &previous).assert_success()?;

    assert_eq!(
        dir.read("day2.csv.changes.csv")?,
        "id,name,price\n2,pear,2.50\n4,fig,4.00\n"
    );

    let summary = dir.read_json("day2.csv.summary.json")?;
    assert_eq!(summary["new"], 1);
    assert_eq!(summary["changed"], 1);
    assert_eq!(summary["unchanged"], 2);
    assert_eq!(summary["removed"], 0);
    Ok(())
}

#[test]
fn test_identical_snapshot_yields_header_only_delta() -> Result<()> {
    let dir = TestDir::new()?;
    first_run(&dir)?;

    let snapshot = dir.write("again.csv", DAY1)?;
    let previous = dir.arg("day1.csv.fingerprints.json");
    snapdelta!(dir.path(), "csv", &snapshot, "id", &previous).assert_success()?;

    assert_eq!(dir.read("again.csv.changes.csv")?, "id,name,price\n");
    // Same table, same bytes
    assert_eq!(
        dir.read("again.csv.fingerprints.json")?,
        dir.read("day1.csv.fingerprints.json")?
    );
    assert!(!dir.exists("again.csv.removedIds.json"));
    Ok(())
}

#[test]
fn test_deleted_records_reported_with_last_digest() -> Result<()> {
    let dir = TestDir::new()?;
    first_run(&dir)?;

    let snapshot = dir.write("day2.csv", "id,name,price\n1,apple,1.00\n")?;
    let previous = dir.arg("day1.csv.fingerprints.json");
    snapdelta!(dir.path(), "csv", &snapshot, "id", &previous).assert_success()?;

    let old = dir.read_json("day1.csv.fingerprints.json")?;
    let removed = dir.read_json("day2.csv.removedIds.json")?;
    assert_eq!(removed.as_object().unwrap().len(), 2);
    assert_eq!(removed["2"], old["2"]);
    assert_eq!(removed["3"], old["3"]);

    let fingerprints = dir.read_json("day2.csv.fingerprints.json")?;
    assert_eq!(fingerprints.as_object().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_duplicates_logged_first_occurrence_wins() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("dups.csv", "id,v\n7,first\n8,x\n7,second\n7,third\n")?;
    snapdelta!(dir.path(), "csv", &snapshot, "id").assert_success()?;

    assert_eq!(dir.read("dups.csv.changes.csv")?, "id,v\n7,first\n8,x\n");
    assert_eq!(dir.read_json("dups.csv.duplicateIds.json")?, serde_json::json!(["7", "7"]));
    assert_eq!(dir.read_json("dups.csv.summary.json")?["unique"], 2);
    Ok(())
}

#[test]
fn test_stale_side_reports_cleared() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.csv", "id,v\n1,a\n1,b\n")?;
    snapdelta!(dir.path(), "csv", &snapshot, "id").assert_success()?;
    assert!(dir.exists("feed.csv.duplicateIds.json"));

    dir.write("feed.csv", "id,v\n1,a\n")?;
    snapdelta!(dir.path(), "csv", &snapshot, "id").assert_success()?;
    assert!(!dir.exists("feed.csv.duplicateIds.json"));
    Ok(())
}

#[test]
fn test_column_by_index_and_delimiter() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("semi.csv", "name;id\nalpha;10\nbeta;11\n")?;
    snapdelta!(dir.path(), "csv", &snapshot, "1", "--delimiter", ";").assert_success()?;

    assert_eq!(dir.read("semi.csv.changes.csv")?, "name;id\nalpha;10\nbeta;11\n");
    let fingerprints = dir.read_json("semi.csv.fingerprints.json")?;
    assert!(fingerprints.get("10").is_some());
    assert!(fingerprints.get("11").is_some());
    Ok(())
}

#[test]
fn test_out_dir_keeps_snapshot_name() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("in/feed.csv", "id\n1\n")?;
    std::fs::create_dir_all(dir.join("out"))?;
    let out = dir.arg("out");

    snapdelta!(dir.path(), "csv", &snapshot, "id", "--out-dir", &out).assert_success()?;

    assert!(dir.exists("out/feed.csv.changes.csv"));
    assert!(dir.exists("out/feed.csv.fingerprints.json"));
    assert!(!dir.exists("in/feed.csv.fingerprints.json"));
    Ok(())
}

#[test]
fn test_out_dir_created_when_missing() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.csv", "id,v\n1,a\n")?;
    let out = dir.arg("out/nested");

    snapdelta!(dir.path(), "csv", &snapshot, "id", "--out-dir", &out).assert_success()?;

    assert!(dir.exists("out/nested/feed.csv.changes.csv"));
    assert!(dir.exists("out/nested/feed.csv.fingerprints.json"));
    Ok(())
}

#[test]
fn test_latin1_identities_not_duplicates() -> Result<()> {
    let dir = TestDir::new()?;
    let path = dir.join("feed.csv");
    std::fs::write(&path, b"id,v\nM\xfcller,x\nM\xe4ller,y\n")?;
    let snapshot = dir.arg("feed.csv");

    snapdelta!(dir.path(), "csv", &snapshot, "id").assert_success()?;

    assert!(!dir.exists("feed.csv.duplicateIds.json"));
    let fingerprints = dir.read_json("feed.csv.fingerprints.json")?;
    assert_eq!(fingerprints.as_object().map(|m| m.len()), Some(2));
    assert!(fingerprints.get(r"M\xfcller").is_some());
    assert!(fingerprints.get(r"M\xe4ller").is_some());

    let delta = std::fs::read(dir.join("feed.csv.changes.csv"))?;
    assert_eq!(delta, b"id,v\nM\xfcller,x\nM\xe4ller,y\n");
    Ok(())
}

#[test]
fn test_summary_printed_unless_quiet() -> Result<()> {
    let dir = TestDir::new()?;
    let snapshot = dir.write("feed.csv", "id\n1\n2\n")?;

    let result = snapdelta!(dir.path(), "csv", &snapshot, "id").assert_success()?;
    assert!(result.contains_stdout("Processed"));
    assert!(result.contains_stdout("feed.csv.changes.csv"));

    let result = snapdelta!(dir.path(), "--quiet", "csv", &snapshot, "id").assert_success()?;
    assert!(result.stdout.is_empty());
    Ok(())
}
