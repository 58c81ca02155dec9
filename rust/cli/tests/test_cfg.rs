//! Configuration precedence tests for the `cfg` command.
//!
//! These tests mutate `GREENFELT_*` environment variables, so they run
//! serially to keep each scenario isolated.

use greenfelt_cli::run;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;

const ENV_VARS: &[&str] = &[
    "GREENFELT_CONFIG",
    "GREENFELT_SEED",
    "GREENFELT_CHIPS",
    "GREENFELT_STAKE",
    "GREENFELT_LOG_DIR",
    "GREENFELT_UNICODE",
];

fn clear_env() {
    for var in ENV_VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

fn run_cfg() -> (i32, String, String) {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(["greenfelt", "cfg"], &mut out, &mut err);
    (
        code,
        String::from_utf8_lossy(&out).into_owned(),
        String::from_utf8_lossy(&err).into_owned(),
    )
}

fn cfg_value(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("cfg output must be JSON")
}

#[test]
#[serial]
fn cfg_reports_defaults_when_nothing_is_set() {
    clear_env();

    let (code, stdout, stderr) = run_cfg();
    assert_eq!(code, 0, "stderr={}", stderr);

    let v = cfg_value(&stdout);
    assert_eq!(v["starting_chips"]["value"], 1000);
    assert_eq!(v["starting_chips"]["source"], "default");
    assert_eq!(v["default_stake"]["value"], 10);
    assert_eq!(v["default_stake"]["source"], "default");
    assert_eq!(v["seed"]["value"], serde_json::Value::Null);
    assert_eq!(v["log_dir"]["value"], "logs");
    assert_eq!(v["unicode"]["value"], true);
}

#[test]
#[serial]
fn cfg_reports_env_overrides_with_env_source() {
    clear_env();
    unsafe {
        std::env::set_var("GREENFELT_SEED", "42");
        std::env::set_var("GREENFELT_CHIPS", "500");
    }

    let (code, stdout, stderr) = run_cfg();
    clear_env();
    assert_eq!(code, 0, "stderr={}", stderr);

    let v = cfg_value(&stdout);
    assert_eq!(v["seed"]["value"], 42);
    assert_eq!(v["seed"]["source"], "env");
    assert_eq!(v["starting_chips"]["value"], 500);
    assert_eq!(v["starting_chips"]["source"], "env");
    // Untouched settings keep their defaults
    assert_eq!(v["default_stake"]["source"], "default");
}

#[test]
#[serial]
fn cfg_reports_file_values_with_file_source() {
    clear_env();

    let mut path = PathBuf::from("target");
    path.push(format!("cfg_{}.toml", std::process::id()));
    let _ = fs::create_dir_all(path.parent().unwrap());
    fs::write(&path, "starting_chips = 2500\nlog_dir = \"casino-logs\"\n").unwrap();
    unsafe {
        std::env::set_var("GREENFELT_CONFIG", &path);
    }

    let (code, stdout, stderr) = run_cfg();
    clear_env();
    assert_eq!(code, 0, "stderr={}", stderr);

    let v = cfg_value(&stdout);
    assert_eq!(v["starting_chips"]["value"], 2500);
    assert_eq!(v["starting_chips"]["source"], "file");
    assert_eq!(v["log_dir"]["value"], "casino-logs");
    assert_eq!(v["log_dir"]["source"], "file");
    assert_eq!(v["unicode"]["source"], "default");
}

#[test]
#[serial]
fn cfg_env_wins_over_file() {
    clear_env();

    let mut path = PathBuf::from("target");
    path.push(format!("cfg_both_{}.toml", std::process::id()));
    let _ = fs::create_dir_all(path.parent().unwrap());
    fs::write(&path, "default_stake = 50\n").unwrap();
    unsafe {
        std::env::set_var("GREENFELT_CONFIG", &path);
        std::env::set_var("GREENFELT_STAKE", "75");
    }

    let (code, stdout, stderr) = run_cfg();
    clear_env();
    assert_eq!(code, 0, "stderr={}", stderr);

    let v = cfg_value(&stdout);
    assert_eq!(v["default_stake"]["value"], 75);
    assert_eq!(v["default_stake"]["source"], "env");
}

#[test]
#[serial]
fn cfg_rejects_invalid_env_value() {
    clear_env();
    unsafe {
        std::env::set_var("GREENFELT_CHIPS", "abc");
    }

    let (code, _stdout, stderr) = run_cfg();
    clear_env();

    assert_eq!(code, 2, "invalid env value should exit 2");
    assert!(
        stderr.contains("Invalid configuration"),
        "stderr={}",
        stderr
    );
}

#[test]
#[serial]
fn cfg_rejects_zero_starting_chips() {
    clear_env();
    unsafe {
        std::env::set_var("GREENFELT_CHIPS", "0");
    }

    let (code, _stdout, stderr) = run_cfg();
    clear_env();

    assert_eq!(code, 2, "zero chips should fail validation");
    assert!(
        stderr.contains("starting_chips must be >0"),
        "stderr={}",
        stderr
    );
}
