//! CLI tests for the `beamsim` binary

mod fixtures;

use std::process::Command;

use fixtures::{startup_dir, ScratchDir};

fn beamsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_beamsim"))
}

#[test]
fn test_build_startup_dir_lists_endpoints() {
    let output = beamsim()
        .arg("build")
        .arg("--startup-dir")
        .arg(startup_dir())
        .arg("--lenient")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\n  XF:07ID-BI{ADC:1}I0:Volt "));
    assert!(stdout.contains("\n  SIM:Endstn-Sel "));
    assert!(!stdout.contains("SIM:XF:"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning: camera: 'ProsilicaDetector' not found"));
}

#[test]
fn test_build_strict_exit_code() {
    let status = beamsim()
        .arg("build")
        .arg("--startup-dir")
        .arg(startup_dir())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(3));
}

#[test]
fn test_build_requires_both_files() {
    let scratch = ScratchDir::new("[m1]\n_target = \"EpicsMotor\"\n", None);

    let output = beamsim()
        .arg("build")
        .arg("--device-file")
        .arg(scratch.device_file())
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_build_json_summary() {
    let scratch = ScratchDir::new(
        "[m1]\n_target = \"EpicsMotor\"\nprefix = \"M1\"\n",
        Some("[devices]\n"),
    );

    let output = beamsim()
        .arg("build")
        .arg("--device-file")
        .arg(scratch.device_file())
        .arg("--config-file")
        .arg(scratch.dir.path().join("sim_conf.toml"))
        .arg("--prefix")
        .arg("T:")
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["groups"]["misc"][0], "misc.m1");
    let m1 = summary["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|node| node["path"] == "misc.m1")
        .unwrap();
    assert_eq!(m1["prefix"], "M1");
    assert!(summary["transmission"].as_array().unwrap().is_empty());
}

#[test]
fn test_resolve_writes_output_file() {
    let scratch = ScratchDir::new("[m1]\n_target = \"ophyd.EpicsMotor\"\n_group = \"motors\"\n", None);
    let out = scratch.dir.path().join("resolved.json");

    let status = beamsim()
        .arg("resolve")
        .arg("--device-file")
        .arg(scratch.device_file())
        .arg("--translate")
        .arg("EpicsMotor=beamsim.devices.manipulator.MultiMesh")
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    let resolved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(resolved["config"]["motors"]["m1"]["_target"], "beamsim.devices.manipulator.MultiMesh");
    assert_eq!(resolved["sources"][0]["origin"], "devices");
}
