//! Integration tests for the RotoWorks CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PROJECT_FILE: &str = "123456_Phase1_CentrifugalCompressor.rw";

/// Helper to get a rotoworks command isolated from the user's config
fn rotoworks(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rotoworks").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env_remove("ROTOWORKS_MACROS")
        .env_remove("ROTOWORKS_CMM_SPOOL")
        .env_remove("ROTOWORKS_DRAWING")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a centrifugal compressor project with `stages` stages
fn setup_project(job: &str, stages: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args([
            "init",
            "--job",
            job,
            "--phase",
            "1",
            "--machine",
            "centrifugal-compressor",
            "--stages",
            &stages.to_string(),
        ])
        .assert()
        .success();
    tmp
}

fn read(tmp: &TempDir, name: &str) -> String {
    fs::read_to_string(tmp.path().join(name)).unwrap()
}

// ============================================================================
// Init and Catalog Tests
// ============================================================================

#[test]
fn test_init_creates_project_file() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args([
            "init",
            "--job",
            "123456",
            "--phase",
            "1",
            "--machine",
            "Centrifugal Compressor",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"));

    let contents = read(&tmp, PROJECT_FILE);
    assert!(contents.contains("job_number: '123456'") || contents.contains("job_number: \"123456\""));
    assert!(contents.contains("Centrifugal Compressor"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let tmp = setup_project("123456", 2);
    rotoworks(tmp.path())
        .args(["init", "--job", "123456", "--phase", "1", "--machine", "centrifugal-compressor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    // The existing scope survives
    rotoworks(tmp.path())
        .args(["scope", "show", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2,0"));
}

#[test]
fn test_init_filename_includes_sub_type_and_nickname() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args([
            "init", "--job", "42", "--phase", "final", "--machine", "gear", "--sub", "Bull",
            "--nickname", "spare_1",
        ])
        .assert()
        .success();
    assert!(tmp.path().join("42_Final_Gear_Bull_spare_1.rw").is_file());
}

#[test]
fn test_init_rejects_bad_job_number() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args(["init", "--job", "12A", "--phase", "1", "--machine", "gear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("job number"));
}

#[test]
fn test_init_bad_stage_count_leaves_no_project() {
    let tmp = TempDir::new().unwrap();
    let init = |stages: &str| {
        let mut cmd = rotoworks(tmp.path());
        cmd.args([
            "init",
            "--job",
            "1234",
            "--phase",
            "1",
            "--machine",
            "centrifugal-compressor",
            "--stages",
            stages,
        ]);
        cmd
    };

    init("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a number"));
    init("1000000000000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the maximum"));
    assert!(!tmp.path().join("1234_Phase1_CentrifugalCompressor.rw").exists());

    init("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"));
    let output = rotoworks(tmp.path())
        .args(["status", "--format", "json"])
        .output()
        .unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["stages"], 3);
}

#[test]
fn test_init_rejects_unknown_machine() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args(["init", "--job", "1", "--phase", "1", "--machine", "windmill"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown machine type"));
}

#[test]
fn test_machines_lists_catalog() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args(["machines", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Steam Turbine"))
        .stdout(predicate::str::contains("Bull, Pinion"));
}

#[test]
fn test_commands_need_a_project() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no RotoWorks project found"));
}

// ============================================================================
// Scope Tests
// ============================================================================

#[test]
fn test_scope_resize_keeps_existing_flags() {
    let tmp = setup_project("123456", 2);
    rotoworks(tmp.path())
        .args(["scope", "set", "2", "Open Face", "on"])
        .assert()
        .success();
    rotoworks(tmp.path()).args(["scope", "resize", "3"]).assert().success();

    rotoworks(tmp.path())
        .args(["scope", "show", "--format", "csv"])
        .assert()
        .success()
        .stdout("Stage,Open Face\n1,0\n2,1\n3,0\n");
}

#[test]
fn test_scope_resize_rejects_bad_input() {
    let tmp = setup_project("123456", 2);
    rotoworks(tmp.path())
        .args(["scope", "resize", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("negative"));
    rotoworks(tmp.path())
        .args(["scope", "resize", "four"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn test_scope_set_unknown_stage() {
    let tmp = setup_project("123456", 2);
    rotoworks(tmp.path())
        .args(["scope", "set", "7", "1", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stage 7 is not in the project scope"));
}

#[test]
fn test_scope_apply_grid() {
    let tmp = setup_project("123456", 2);
    fs::write(tmp.path().join("grid.csv"), "Stage,Open Face\n1,1\n2,0\n").unwrap();
    rotoworks(tmp.path())
        .args(["scope", "apply-grid", "grid.csv"])
        .assert()
        .success();
    rotoworks(tmp.path())
        .args(["scope", "show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"1\": [\n    1\n  ]"));
}

// ============================================================================
// Axial Session Tests
// ============================================================================

#[test]
fn test_axial_publish_writes_scope_file() {
    let tmp = setup_project("123456", 2);
    rotoworks(tmp.path())
        .args(["scope", "set", "Stage 2", "Open Face", "on"])
        .assert()
        .success();
    rotoworks(tmp.path())
        .args([
            "axial", "add", "Stage 1", "Stage 2", "Balance Drum", "--distance", "A",
            "--distance", "B*H", "--width", "C",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued Distance B*H"));

    rotoworks(tmp.path())
        .args(["axial", "publish", "--no-send"])
        .assert()
        .success();

    let scope = read(&tmp, "AxialScope.csv");
    insta::assert_snapshot!(scope.trim_end(), @r"
    Stage 1,Eye Face,I.C.P.,I.B.P.
    Stage 2,Leading Edge,Trailing Edge,I.B.P.,O.B.P.
    Balance Drum
    Distance,A,B*H
    Width,C
    ");

    // Publishing empties the session
    rotoworks(tmp.path())
        .args(["axial", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No axial targets queued"));
}

#[test]
fn test_axial_labels_are_unique_across_kinds() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["axial", "add", "Distance A"])
        .assert()
        .success();
    rotoworks(tmp.path())
        .args(["axial", "add", "--width", "A*H", "--width", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Width A*H is already queued"))
        .stdout(predicate::str::contains("Queued Width B"));

    // Removing the distance frees its label
    rotoworks(tmp.path())
        .args(["axial", "rm", "Distance A"])
        .assert()
        .success();
    rotoworks(tmp.path())
        .args(["axial", "add", "--width", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued Width A"));
}

#[test]
fn test_axial_rejects_stage_outside_scope() {
    let tmp = setup_project("123456", 2);
    rotoworks(tmp.path())
        .args(["axial", "add", "Stage 5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stage 5 is not in the project scope"));
}

#[test]
fn test_axial_rejects_invalid_labels() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["axial", "add", "--distance", "A*P"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown modifier"));
}

#[test]
fn test_axial_publish_empty_session_fails() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["axial", "publish"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No axial targets queued"));
    assert!(!tmp.path().join("AxialScope.csv").exists());
}

#[test]
fn test_axial_publish_sends_to_spool() {
    let tmp = setup_project("123456", 1);
    let spool = tmp.path().join("cmm.spool");
    rotoworks(tmp.path())
        .args(["axial", "add", "Stage 1"])
        .assert()
        .success();
    rotoworks(tmp.path())
        .env("ROTOWORKS_CMM_SPOOL", &spool)
        .env("ROTOWORKS_MACROS", "/pw/macros")
        .args(["axial", "publish"])
        .assert()
        .success();

    let sent = fs::read_to_string(&spool).unwrap();
    assert!(sent.starts_with("MACRO EXEC ( \"/pw/macros/axialsIn.pwmacro\", \""));
    assert!(sent.contains("AxialScope.csv\", \"/pw/macros\" )"));
}

#[test]
fn test_axial_import_template() {
    let reference = setup_project("111111", 1);
    fs::write(reference.path().join("AxialScope.csv"), "Stage 1,Eye Face\n").unwrap();
    let tmp = setup_project("222222", 1);

    rotoworks(tmp.path())
        .args(["axial", "import", "--no-send", "--from"])
        .arg(reference.path())
        .assert()
        .success();

    assert_eq!(read(&tmp, "AxialScope.csv"), "Stage 1,Eye Face\n");
    assert!(read(&tmp, "222222_Phase1_CentrifugalCompressor.rw")
        .contains("111111_Phase1_CentrifugalCompressor.rw"));
}

// ============================================================================
// Diameter Session Tests
// ============================================================================

#[test]
fn test_diameter_ranges_and_publish() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["diameter", "add", "A-C*P", "B", "E"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already queued: B"));

    rotoworks(tmp.path())
        .args(["diameter", "publish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MACRO EXEC ( \"diametersIn.pwmacro\""));

    assert_eq!(read(&tmp, "DiameterScope.csv"), "A*P\nB*P\nC*P\nE\n");
}

#[test]
fn test_diameter_range_cannot_start_with_modifier() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["diameter", "add", "A*H-C"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot start with a modifier"));

    rotoworks(tmp.path())
        .args(["diameter", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No diameter labels queued"));
}

#[test]
fn test_diameter_rm() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path()).args(["diameter", "add", "A-D"]).assert().success();
    rotoworks(tmp.path())
        .args(["diameter", "rm", "b", "Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 label(s)"));
    rotoworks(tmp.path())
        .args(["diameter", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"A\",\n  \"C\",\n  \"D\""));
}

// ============================================================================
// Manual Entry Tests
// ============================================================================

#[test]
fn test_thermal_gap_writes_results() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["thermal-gap", "0.5", "0.25"])
        .assert()
        .success();
    assert_eq!(read(&tmp, "ThermalGaps.csv"), "Name,Meas\nTG1,0.5\nTG2,0.25\n");
}

#[test]
fn test_thermal_gap_rejects_out_of_range() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["thermal-gap", "0.5", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TG2"));
    assert!(!tmp.path().join("ThermalGaps.csv").exists());
}

#[test]
fn test_weights_sum() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["weights", "--te", "120", "--nte", "95"])
        .assert()
        .success();
    assert_eq!(
        read(&tmp, "RotorWeights.csv"),
        "Name,Meas\nTEW,120\nNTEW,95\nOAW,215\n"
    );

    rotoworks(tmp.path()).args(["weights", "--te", "80"]).assert().success();
    assert!(read(&tmp, "RotorWeights.csv").ends_with("OAW,80\n"));
}

// ============================================================================
// Documentation and Comparison Tests
// ============================================================================

const DRAWING: &str = "\
layouts:
  - name: Axial
    texts:
      - id: T1
        text: A
  - name: ThermalGap
    texts:
      - id: T2
        text: TG1
      - id: T3
        text: TG2
";

#[test]
fn test_doc_thermal_gap() {
    let tmp = setup_project("123456", 1);
    fs::write(tmp.path().join("drawing.yaml"), DRAWING).unwrap();
    rotoworks(tmp.path())
        .args(["thermal-gap", "0.5", "0.25"])
        .assert()
        .success();

    rotoworks(tmp.path())
        .args(["doc", "thermal-gap", "--drawing", "drawing.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 placeholder text(s) replaced"));

    let drawing = read(&tmp, "drawing.yaml");
    assert!(drawing.contains("text: '0.5'") || drawing.contains("text: \"0.5\""));
    assert!(tmp.path().join("ThermalGapDoc.txt").is_file());
}

#[test]
fn test_doc_axial_uses_configured_drawing() {
    let tmp = setup_project("123456", 2);
    fs::write(tmp.path().join("drawing.yaml"), DRAWING).unwrap();
    fs::write(tmp.path().join("rotoworks.yaml"), "drawing: drawing.yaml\n").unwrap();
    fs::write(
        tmp.path().join("Axials.csv"),
        "Name,Control,Meas\nStage 1-Eye Face,3D Distance,12.5\nDistance A,3D Distance,4.25\n",
    )
    .unwrap();

    rotoworks(tmp.path())
        .args(["doc", "axial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table cell(s) filled"));

    let drawing = read(&tmp, "drawing.yaml");
    assert!(drawing.contains("Axial Measurements From Active Face"));
    assert!(drawing.contains("4.25"));
    assert!(tmp.path().join("AxialDoc.txt").is_file());
}

#[test]
fn test_doc_without_drawing_fails() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["doc", "diameter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No drawing configured"));
}

#[test]
fn test_compare_against_reference() {
    let reference = setup_project("111111", 1);
    fs::write(
        reference.path().join("Diameters.csv"),
        "Name,Control,Meas\nA,Diameter,10.0\nRef A,Diameter,1.0\n",
    )
    .unwrap();
    let tmp = setup_project("222222", 1);
    fs::write(
        tmp.path().join("Diameters.csv"),
        "Name,Control,Meas\nA,Diameter,10.5\nB,Diameter,8.0\nC,Angle,3.0\n",
    )
    .unwrap();

    rotoworks(tmp.path())
        .args(["compare", "--inspection", "diameter", "-o", "cmp.csv", "--reference"])
        .arg(reference.path())
        .assert()
        .success();

    assert_eq!(
        read(&tmp, "cmp.csv"),
        "Name,222222 Meas,111111 Meas,Deviation\nA,10.5,10,0.5\nB,8,,\n"
    );
}

// ============================================================================
// Status and Completions Tests
// ============================================================================

#[test]
fn test_status_reports_inspections() {
    let tmp = setup_project("123456", 1);
    rotoworks(tmp.path())
        .args(["weights", "--te", "1", "--nte", "2"])
        .assert()
        .success();

    let output = rotoworks(tmp.path())
        .args(["status", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["project"]["job_number"], "123456");
    let weights = status["inspections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["kind"] == "rotor-weight")
        .unwrap();
    assert_eq!(weights["measured"], true);
    assert_eq!(weights["documented"], false);
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    rotoworks(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotoworks"));
}
