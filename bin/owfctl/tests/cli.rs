//! ---
//! owf_section: "05-networking-external-interfaces"
//! owf_subsection: "binary"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Command-line front end for collection and export design runs."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

const SCENARIO: &str = r#"{
    "name": "cli-pair",
    "turbine_power": 2.0,
    "turbines": {"layout": "explicit", "positions": [[4000.0, 3000.0], [4000.0, -3000.0]]},
    "catalogs": {"mv_cables": [{"name": "mv1", "family": "mv", "rated_power": 2.0, "cost_per_meter": 10.0}]}
}"#;

fn owfctl(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("owfctl").unwrap();
    cmd.current_dir(dir).env_remove("OWF_CONFIG");
    cmd
}

#[test]
fn layout_prints_turbines() {
    let dir = tempdir().unwrap();
    let output = owfctl(dir.path())
        .args(["layout", "--rows", "2", "--cols", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let turbines: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let turbines = turbines.as_array().unwrap();
    assert_eq!(turbines.len(), 6);
    assert_eq!(turbines[0]["id"], 1);
    assert_eq!(turbines[3]["position"][0], 25_250.0);
}

#[test]
fn optimize_writes_reports_and_summary() {
    let dir = tempdir().unwrap();
    let scenario = dir.path().join("pair.json");
    fs::write(&scenario, SCENARIO).unwrap();
    let reports = dir.path().join("out");

    let output = owfctl(dir.path())
        .arg("optimize")
        .arg("--scenario")
        .arg(&scenario)
        .arg("--output")
        .arg(&reports)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["scenario"], "cli-pair");
    assert_eq!(summary["export_mode"], "mv-only");
    for name in [
        "topology.json",
        "export.json",
        "summary.json",
        "bill_of_quantities.csv",
    ] {
        assert!(reports.join(name).exists(), "missing {}", name);
    }
}

#[test]
fn sweep_reports_one_point_per_factor() {
    let dir = tempdir().unwrap();
    let scenario = dir.path().join("pair.json");
    fs::write(&scenario, SCENARIO).unwrap();

    let output = owfctl(dir.path())
        .arg("sweep")
        .arg("--scenario")
        .arg(&scenario)
        .args(["--target", "mv", "--factors", "0.5,1,2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let points: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(points.as_array().unwrap().len(), 3);
}

#[test]
fn blocked_ray_fails() {
    let dir = tempdir().unwrap();
    let scenario = dir.path().join("blocked.yaml");
    fs::write(
        &scenario,
        "name: blocked\nturbine_power: 2.0\nturbines:\n  layout: explicit\n  positions:\n    - [100.0, 0.0]\n    - [200.0, 0.0]\n    - [150.0, 100.0]\ncatalogs:\n  mv_cables:\n    - {name: mv1, family: mv, rated_power: 5.0, cost_per_meter: 10.0}\n",
    )
    .unwrap();

    owfctl(dir.path())
        .arg("optimize")
        .arg("--scenario")
        .arg(&scenario)
        .arg("--no-reports")
        .assert()
        .failure();
}
