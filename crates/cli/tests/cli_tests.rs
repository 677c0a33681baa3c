//! End-to-end tests of the hiseg CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// The 2x3 4-adjacency grid with its canonical edge order.
const GRID_2X3: &str = r#"{
    "num_vertices": 6,
    "edges": [[0,1],[0,3],[1,2],[1,4],[2,5],[3,4],[4,5]],
    "edge_weights": [1.0, 0.0, 2.0, 1.0, 1.0, 1.0, 2.0],
    "shape": [2, 3]
}"#;

fn write_graph(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("graph.json");
    std::fs::write(&path, GRID_2X3).unwrap();
    path
}

#[test]
fn info_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path());
    Command::cargo_bin("hiseg")
        .unwrap()
        .args(["info", graph.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("vertices:   6"))
        .stdout(predicate::str::contains("edges:      7"))
        .stdout(predicate::str::contains("components: 1"));
}

#[test]
fn bpt_outputs_expected_hierarchy() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path());
    let out = dir.path().join("bpt.json");
    Command::cargo_bin("hiseg")
        .unwrap()
        .args([
            "--quiet",
            "bpt",
            graph.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        doc["parents"],
        serde_json::json!([6, 7, 9, 6, 8, 9, 7, 8, 10, 10, 10])
    );
    assert_eq!(doc["mst_edge_map"], serde_json::json!([1, 0, 3, 4, 2]));
}

#[test]
fn cuts_from_regions_labels_leaves() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path());
    let hierarchy = dir.path().join("bpt.json");
    Command::cargo_bin("hiseg")
        .unwrap()
        .args([
            "--quiet",
            "bpt",
            graph.to_str().unwrap(),
            "-o",
            hierarchy.to_str().unwrap(),
        ])
        .assert()
        .success();

    let out = dir.path().join("cut.json");
    Command::cargo_bin("hiseg")
        .unwrap()
        .args([
            "cuts",
            hierarchy.to_str().unwrap(),
            "--regions",
            "2",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let labels = doc["leaf_labels"].as_array().unwrap();
    assert_eq!(labels.len(), 6);
    assert_eq!(doc["num_regions"], serde_json::json!(2));
}

#[test]
fn cuts_requires_a_selector() {
    let dir = tempfile::tempdir().unwrap();
    let hierarchy = dir.path().join("h.json");
    std::fs::write(
        &hierarchy,
        r#"{"parents": [2, 2, 2], "num_leaves": 2, "altitudes": [0.0, 0.0, 1.0]}"#,
    )
    .unwrap();
    Command::cargo_bin("hiseg")
        .unwrap()
        .args(["cuts", hierarchy.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn render_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path());
    let out = dir.path().join("contours.png");
    Command::cargo_bin("hiseg")
        .unwrap()
        .args([
            "--quiet",
            "render",
            graph.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn watershed_runs_on_path_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("path.json");
    // 1x19 path with three catchment basins
    let edges: Vec<(usize, usize)> = (0..18).map(|i| (i, i + 1)).collect();
    let weights = [
        0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0,
        2.0, 0.0, 0.0,
    ];
    let doc = serde_json::json!({
        "num_vertices": 19,
        "edges": edges,
        "edge_weights": weights,
    });
    std::fs::write(&path, doc.to_string()).unwrap();

    let out = dir.path().join("ws.json");
    Command::cargo_bin("hiseg")
        .unwrap()
        .args([
            "--quiet",
            "watershed",
            path.to_str().unwrap(),
            "--by",
            "area",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let ws: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let altitudes = ws["altitudes"].as_array().unwrap();
    assert_eq!(altitudes.last().unwrap().as_f64().unwrap(), 5.0);
}
