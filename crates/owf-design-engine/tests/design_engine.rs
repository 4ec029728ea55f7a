//! ---
//! owf_section: "08-energy-models-optimization"
//! owf_subsection: "module"
//! owf_type: "source"
//! owf_scope: "code"
//! owf_description: "Collection and export design routines for offshore wind farms."
//! owf_version: "v0.0.0-prealpha"
//! owf_owner: "tbd"
//! ---
use std::{fs, path::Path};

use nalgebra::distance;
use owf_design_engine::{
    design_scenario,
    io::load_scenario_from_file,
    model::{
        CableFamily, CableType, CatalogKind, Catalogs, DesignProblem, Position, SearchSettings,
        TransformerType, WindFarm,
    },
    network::NodeRef,
    optimize_design, sensitivity_sweep, DesignError, ExportMode,
};
use tempfile::tempdir;

fn three_turbine_problem(clearance_radius: f64) -> DesignProblem {
    let farm = WindFarm::uniform(
        [
            Position::new(100.0, 0.0),
            Position::new(200.0, 0.0),
            Position::new(150.0, 100.0),
        ],
        2.0,
    );
    let catalogs = Catalogs::mv_only(vec![CableType::new("mv1", CableFamily::Mv, 5.0, 10.0)]);
    DesignProblem::new("three-turbines", farm, catalogs).with_settings(SearchSettings {
        clearance_radius,
        ..SearchSettings::default()
    })
}

#[test]
fn default_clearance_blocks_the_whole_ray() {
    // Every candidate is within 100 of the turbine at (100, 0).
    let err = optimize_design(&three_turbine_problem(250.0)).unwrap_err();
    assert!(matches!(
        err,
        DesignError::NoFeasibleCandidate { clearance_radius } if clearance_radius == 250.0
    ));
}

#[test]
fn three_turbine_design_is_consistent_and_reproducible() {
    let problem = three_turbine_problem(50.0);
    let result = optimize_design(&problem).unwrap();

    assert_eq!(result.topology.edges.len(), 3);
    assert!(result.topology.ccp_edges().count() >= 1);
    assert_eq!(result.topology.flow_into_ccp(), 6.0);
    for edge in &result.topology.edges {
        assert!(edge.from != NodeRef::Ccp);
    }

    let edge_sum: f64 = result.topology.edges.iter().map(|e| e.cost).sum();
    assert_eq!(result.connection_cost, edge_sum);
    assert_eq!(result.total_cost, edge_sum + result.export.total_cost);
    assert_eq!(result.export.mode, ExportMode::MvOnly);
    assert!(result.export.transformer_usage.is_none());
    assert_eq!(result.export.bundle.count, 2);

    // CCP lies on the segment towards the centroid (150, 100/3).
    let centroid = Position::new(150.0, 100.0 / 3.0);
    assert!((0.0..=1.0).contains(&result.ray_parameter));
    let expected = Position::origin() + (centroid - Position::origin()) * result.ray_parameter;
    assert!(distance(&expected, &result.ccp) < 1e-9);
    for turbine in &problem.farm.turbines {
        assert!(distance(&result.ccp, &turbine.position) >= 50.0);
    }

    let again = optimize_design(&problem).unwrap();
    assert_eq!(result, again);
}

#[test]
fn scenario_file_to_reports() {
    let dir = tempdir().unwrap();
    let scenario_path = dir.path().join("line.toml");
    fs::write(
        &scenario_path,
        r#"
name = "line"
onshore = [0.0, 0.0]
turbine_power = 2.0

[turbines]
layout = "explicit"
positions = [[900.0, 0.0], [1000.0, 0.0], [1100.0, 0.0]]

[[catalogs.mv_cables]]
name = "mv1"
family = "mv"
rated_power = 5.0
cost_per_meter = 10.0

[[catalogs.hv_cables]]
name = "hv1"
family = "hv"
rated_power = 100.0
cost_per_meter = 1.0

[[catalogs.transformers]]
name = "tr1"
rated_power = 100.0
cost = 10.0
"#,
    )
    .unwrap();

    let problem = load_scenario_from_file(&scenario_path)
        .unwrap()
        .into_problem(SearchSettings::default())
        .unwrap();
    let report = design_scenario(&problem).unwrap();
    assert_eq!(report.result.export.mode, ExportMode::Hv);

    let output = dir.path().join("reports");
    let written = report.exporter().export_all(&output, true).unwrap();
    assert_eq!(written.len(), 4);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
    }

    let topology: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("topology.json")).unwrap()).unwrap();
    assert_eq!(topology["data"]["edges"].as_array().unwrap().len(), 3);
    assert_eq!(topology["schema"]["title"], "CollectionTopologyReport");

    let export: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("export.json")).unwrap()).unwrap();
    assert_eq!(export["data"]["transformer_usage"]["tr1"], 1);
}

#[test]
fn transformer_sweep_can_flip_export_mode() {
    let farm = WindFarm::uniform(
        [
            Position::new(20_000.0, 0.0),
            Position::new(20_500.0, 0.0),
            Position::new(21_000.0, 0.0),
        ],
        2.0,
    );
    let catalogs = Catalogs {
        mv_cables: vec![CableType::new("mv1", CableFamily::Mv, 5.0, 10.0)],
        hv_cables: Some(vec![CableType::new("hv1", CableFamily::Hv, 100.0, 5.0)]),
        transformers: Some(vec![TransformerType::new("tr1", 100.0, 1_000.0)]),
    };
    let problem = DesignProblem::new("sweep", farm, catalogs);

    let points =
        sensitivity_sweep(&problem, CatalogKind::Transformers, &[1.0, 1_000_000.0]).unwrap();
    assert_eq!(points[0].export_mode, ExportMode::Hv);
    assert_eq!(points[1].export_mode, ExportMode::MvOnly);
    assert!(points[0].total_cost <= points[1].total_cost);
}

#[test]
fn reference_grid_prefers_hv_export() {
    let scenarios = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/scenarios");
    let load = |name: &str| {
        load_scenario_from_file(scenarios.join(name))
            .unwrap()
            .into_problem(SearchSettings::default())
            .unwrap()
    };

    let with_hv = optimize_design(&load("grid-4x7-hv.toml")).unwrap();
    assert_eq!(with_hv.topology.edges.len(), 28);
    assert_eq!(with_hv.export.mode, ExportMode::Hv);
    let usage = with_hv.export.transformer_usage.as_ref().unwrap();
    assert_eq!(usage["tr2"], 1);
    assert_eq!(usage.len(), 1);

    let mv_only = optimize_design(&load("grid-4x7-mv.toml")).unwrap();
    assert_eq!(mv_only.export.mode, ExportMode::MvOnly);
    assert_eq!(mv_only.export.bundle.cable.name, "mv2");
    assert_eq!(mv_only.export.bundle.count, 4);
    assert!(with_hv.total_cost < mv_only.total_cost);
}
