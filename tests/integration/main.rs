//! Integration tests for stepgraph
//!
//! These tests verify that the decoder, graph builders and the CLI
//! pipeline work together correctly.

use std::path::Path;
use std::process::Command;

use stepgraph_core::{build_assembly_graph, valid_parts, AssemblyConfig};
use stepgraph_step::StepDocument;

/// A unit tetrahedron solid, offset by `(dx, dy, dz)`, with entity ids
/// starting at `base` and a PRODUCT record naming it.
fn tetrahedron(base: u64, offset: [f64; 3], product: &str) -> String {
    let [dx, dy, dz] = offset;
    let mut s = String::new();
    let points = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
    ];
    for (i, (x, y, z)) in points.iter().enumerate() {
        s += &format!(
            "#{} = CARTESIAN_POINT('',({:.1},{:.1},{:.1}));\n",
            base + i as u64,
            x + dx,
            y + dy,
            z + dz
        );
    }
    for i in 0..4u64 {
        s += &format!("#{} = VERTEX_POINT('',#{});\n", base + 4 + i, base + i);
    }
    let edges: [(u64, u64); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    for (i, &(a, b)) in edges.iter().enumerate() {
        s += &format!(
            "#{} = EDGE_CURVE('',#{},#{},#{},.T.);\n",
            base + 8 + i as u64,
            base + 4 + a,
            base + 4 + b,
            base + 8 + i as u64
        );
    }
    let faces: [[u64; 3]; 4] = [[0, 3, 1], [0, 2, 4], [1, 5, 2], [3, 5, 4]];
    for (f, edge_ids) in faces.iter().enumerate() {
        let f = f as u64;
        for (k, &e) in edge_ids.iter().enumerate() {
            s += &format!(
                "#{} = ORIENTED_EDGE('',*,*,#{},.T.);\n",
                base + 14 + f * 6 + k as u64,
                base + 8 + e
            );
        }
        s += &format!(
            "#{} = EDGE_LOOP('',(#{},#{},#{}));\n",
            base + 14 + f * 6 + 3,
            base + 14 + f * 6,
            base + 14 + f * 6 + 1,
            base + 14 + f * 6 + 2
        );
        s += &format!(
            "#{} = FACE_OUTER_BOUND('',#{},.T.);\n",
            base + 14 + f * 6 + 4,
            base + 14 + f * 6 + 3
        );
        s += &format!(
            "#{} = ADVANCED_FACE('',(#{}),#{},.T.);\n",
            base + 14 + f * 6 + 5,
            base + 14 + f * 6 + 4,
            base + 14 + f * 6 + 5
        );
    }
    s += &format!(
        "#{} = CLOSED_SHELL('',(#{},#{},#{},#{}));\n",
        base + 38,
        base + 19,
        base + 25,
        base + 31,
        base + 37
    );
    s += &format!(
        "#{} = MANIFOLD_SOLID_BREP('solid',#{});\n",
        base + 39,
        base + 38
    );
    s += &format!("#{} = PRODUCT('{}','','',());\n", base + 40, product);
    s
}

/// A three-part assembly: Bracket and Pin touch at x=1, Washer floats
/// far away.
fn fixture_step_text() -> String {
    let mut data = String::new();
    data += &tetrahedron(100, [0.0, 0.0, 0.0], "Bracket");
    data += &tetrahedron(300, [1.0, 0.0, 0.0], "Pin");
    data += &tetrahedron(500, [50.0, 0.0, 0.0], "Washer");
    format!(
        "ISO-10303-21;\nHEADER;\nFILE_NAME('fixture','',(''),(''),'','','');\nENDSEC;\nDATA;\n#1 = PRODUCT('Fixture','','',());\n{data}ENDSEC;\nEND-ISO-10303-21;"
    )
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("fixture.step");
    std::fs::write(&path, fixture_step_text()).unwrap();
    path
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .current_dir(".")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stepgraph"));
    assert!(stdout.contains("Process a folder of STEP files"));
}

/// Decoder and graph builders working end to end, without the CLI.
#[test]
fn test_pipeline_in_process() {
    let doc = StepDocument::parse(&fixture_step_text()).unwrap();
    assert_eq!(doc.parts.len(), 3);

    let parts = valid_parts(doc.parts);
    let config = AssemblyConfig::default();
    let graph = build_assembly_graph(&parts, &config, &mut || true);

    assert_eq!(graph.node_count(), 3);
    assert!(graph.contains_edge("Bracket", "Pin"));
    assert!(!graph.contains_edge("Bracket", "Washer"));
    assert!(!graph.contains_edge("Pin", "Washer"));
}

/// Full batch run through the CLI: artifacts land in per-file folders.
#[test]
fn test_process_creates_artifacts() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let status = Command::new("cargo")
        .args([
            "run",
            "--",
            "process",
            "--input",
            input.path().to_str().unwrap(),
            "--output",
            output.path().to_str().unwrap(),
            "--assembly",
            "--hierarchical",
            "--stats",
            "--workers",
            "1",
        ])
        .current_dir(".")
        .status()
        .expect("Failed to execute command");
    assert!(status.success());

    let subfolder = output.path().join("fixture");
    let graphml = subfolder.join("fixture_assembly.graphml");
    assert!(graphml.exists());
    assert!(subfolder.join("fixture_hierarchical.graphml").exists());

    let xml = std::fs::read_to_string(&graphml).unwrap();
    assert!(xml.contains("<node id=\"Bracket\" />"));
    assert!(xml.contains("<node id=\"Pin\" />"));

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(subfolder.join("fixture_stats.json")).unwrap())
            .unwrap();
    assert_eq!(stats["parts_total"], 3);
    assert_eq!(stats["assembly_nodes"], 3);
    assert_eq!(stats["assembly_edges"], 1);
    // Three tetrahedra: 3 shells, 12 faces, 36 loop edges.
    assert_eq!(stats["shells"], 3);
    assert_eq!(stats["faces"], 12);
}

/// A second run over existing artifacts skips them.
#[test]
fn test_skip_existing_artifacts() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let run = || {
        Command::new("cargo")
            .args([
                "run",
                "--",
                "process",
                "--input",
                input.path().to_str().unwrap(),
                "--output",
                output.path().to_str().unwrap(),
                "--assembly",
                "--workers",
                "1",
            ])
            .current_dir(".")
            .output()
            .expect("Failed to execute command")
    };

    let first = run();
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("processed successfully"));

    let second = run();
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("skipping"));
}
