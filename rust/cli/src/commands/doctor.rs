//! Environment diagnostics and health checks command.
//!
//! The `doctor` command validates the local environment to ensure all dependencies
//! and file system access are working correctly. It performs various health checks
//! and reports results in JSON format.
//!
//! ## Checks Performed
//!
//! - **Config**: Loads and validates the effective configuration
//! - **Zstd**: Verifies compressed round logs can be written and read back
//! - **Log Directory**: Tests write permissions in the round log directory
//! - **Locale**: Ensures UTF-8 locale for proper suit glyph handling
//! - **Wheel**: Confirms the red/black partition covers the wheel evenly
//! - **Paytable**: Confirms rarer slots symbols pay strictly more
//! - **RNG**: Probes that seeded shuffles are reproducible and seed-sensitive
//!
//! ## Environment Variables
//!
//! - `GREENFELT_DOCTOR_ZSTD_DIR`: Override zstd check directory (default: temp dir)
//! - `GREENFELT_DOCTOR_LOG_DIR`: Override log directory path (default: `logs/`)
//! - `GREENFELT_DOCTOR_LOCALE_OVERRIDE`: Force specific locale for testing

use crate::config;
use crate::error::CliError;
use crate::ui;
use greenfelt_engine::deck::Deck;
use greenfelt_engine::roulette::{PocketColor, pocket_color};
use greenfelt_engine::slots::ALL_SYMBOLS;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Represents a single diagnostic check result.
struct DoctorCheck {
    name: &'static str,
    ok: bool,
    detail: String,
    error: Option<String>,
}

impl DoctorCheck {
    /// Create a passing check result.
    fn ok(name: &'static str, detail: impl Into<String>) -> Self {
        DoctorCheck {
            name,
            ok: true,
            detail: detail.into(),
            error: None,
        }
    }

    /// Create a failing check result.
    fn fail(name: &'static str, detail: impl Into<String>, error: impl Into<String>) -> Self {
        DoctorCheck {
            name,
            ok: false,
            detail: detail.into(),
            error: Some(error.into()),
        }
    }

    /// Convert check result to JSON value.
    fn to_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(
            "status".into(),
            serde_json::Value::String(if self.ok { "ok" } else { "fail" }.into()),
        );
        map.insert(
            "detail".into(),
            serde_json::Value::String(self.detail.clone()),
        );
        if let Some(err) = &self.error {
            map.insert("error".into(), serde_json::Value::String(err.clone()));
        }
        serde_json::Value::Object(map)
    }
}

/// Generate a unique suffix for temporary file names.
fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros()
}

/// Check that a compressed round log can be written and read back.
fn check_zstd(dir: &Path) -> DoctorCheck {
    if !dir.exists() {
        return DoctorCheck::fail(
            "zstd",
            format!("Zstd check looked for {}", dir.display()),
            format!(
                "Zstd check failed: directory {} does not exist",
                dir.display()
            ),
        );
    }
    if !dir.is_dir() {
        return DoctorCheck::fail(
            "zstd",
            format!("Zstd check attempted in {}", dir.display()),
            format!("Zstd check failed: {} is not a directory", dir.display()),
        );
    }
    let payload = b"{\"id\":\"000000\",\"game\":\"slots\",\"stake\":1,\"outcome\":\"lose\",\"payout\":0}\n";
    let compressed = match zstd::bulk::compress(payload, 3) {
        Ok(bytes) => bytes,
        Err(e) => {
            return DoctorCheck::fail(
                "zstd",
                "Zstd compression attempt".to_string(),
                format!("Zstd check failed: {}", e),
            );
        }
    };
    let candidate = dir.join(format!("greenfelt-doctor-{}.jsonl.zst", unique_suffix()));
    if let Err(e) = std::fs::write(&candidate, &compressed) {
        let _ = std::fs::remove_file(&candidate);
        return DoctorCheck::fail(
            "zstd",
            format!("Zstd write attempt in {}", dir.display()),
            format!("Zstd check failed: unable to write to {}: {}", candidate.display(), e),
        );
    }
    let read_back = std::fs::read(&candidate);
    let _ = std::fs::remove_file(&candidate);
    match read_back {
        Ok(bytes) => match zstd::bulk::decompress(&bytes, payload.len() * 2) {
            Ok(decoded) if decoded == payload => DoctorCheck::ok(
                "zstd",
                format!("Zstd round-trip test passed in {}", dir.display()),
            ),
            Ok(_) => DoctorCheck::fail(
                "zstd",
                format!("Zstd round-trip attempt in {}", dir.display()),
                "Zstd check failed: decompressed payload does not match".to_string(),
            ),
            Err(e) => DoctorCheck::fail(
                "zstd",
                format!("Zstd round-trip attempt in {}", dir.display()),
                format!("Zstd check failed: {}", e),
            ),
        },
        Err(e) => DoctorCheck::fail(
            "zstd",
            format!("Zstd read attempt in {}", dir.display()),
            format!("Zstd check failed: {}", e),
        ),
    }
}

/// Check log directory creation and write permissions.
fn check_log_dir(path: &Path) -> DoctorCheck {
    if !path.exists()
        && let Err(e) = std::fs::create_dir_all(path)
    {
        return DoctorCheck::fail(
            "log_dir",
            format!("Log directory creation attempt at {}", path.display()),
            format!("Failed to create log directory: {}", e),
        );
    }
    if !path.is_dir() {
        return DoctorCheck::fail(
            "log_dir",
            format!("Log directory probe at {}", path.display()),
            format!(
                "Log directory check failed: {} is not a directory",
                path.display()
            ),
        );
    }
    let probe = path.join("greenfelt-doctor-write.tmp");
    match std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe)
    {
        Ok(mut file) => {
            if let Err(e) = file.write_all(b"ok") {
                let _ = std::fs::remove_file(&probe);
                return DoctorCheck::fail(
                    "log_dir",
                    format!("Log directory write attempt in {}", path.display()),
                    format!("Log directory check failed: {}", e),
                );
            }
            drop(file);
            let _ = std::fs::remove_file(&probe);
            DoctorCheck::ok(
                "log_dir",
                format!("Log directory '{}' is writable", path.display()),
            )
        }
        Err(e) => DoctorCheck::fail(
            "log_dir",
            format!("Log directory write attempt in {}", path.display()),
            format!("Log directory check failed: {}", e),
        ),
    }
}

/// Evaluate locale value for UTF-8 support.
fn evaluate_locale(source: &str, value: String) -> DoctorCheck {
    let lowered = value.to_ascii_lowercase();
    let display = value.clone();
    if lowered.contains("utf-8") || lowered.contains("utf8") {
        DoctorCheck::ok(
            "locale",
            format!("{} reports UTF-8 locale ({})", source, display),
        )
    } else {
        DoctorCheck::fail(
            "locale",
            format!("{} reports non-UTF-8 locale ({})", source, display.clone()),
            format!("Locale check failed: {}={} is not UTF-8", source, display),
        )
    }
}

/// Check locale configuration for UTF-8 support.
fn check_locale(override_val: Option<String>) -> DoctorCheck {
    if let Some(val) = override_val {
        return evaluate_locale("GREENFELT_DOCTOR_LOCALE_OVERRIDE", val);
    }
    for key in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Ok(val) = std::env::var(key) {
            return evaluate_locale(key, val);
        }
    }
    let candidate =
        std::env::temp_dir().join(format!("greenfelt-doctor-diagnosis-{}.txt", unique_suffix()));
    match std::fs::File::create(&candidate) {
        Ok(mut file) => {
            if let Err(e) = file.write_all("♠".as_bytes()) {
                let _ = std::fs::remove_file(&candidate);
                return DoctorCheck::fail(
                    "locale",
                    "UTF-8 filesystem probe failed",
                    format!("Locale check failed: {}", e),
                );
            }
            drop(file);
            let _ = std::fs::remove_file(&candidate);
            DoctorCheck::ok(
                "locale",
                "UTF-8 filesystem probe succeeded (fallback)".to_string(),
            )
        }
        Err(e) => DoctorCheck::fail(
            "locale",
            "UTF-8 filesystem probe failed",
            format!("Locale check failed: {}", e),
        ),
    }
}

/// Check that the effective configuration parses and validates.
fn check_config() -> DoctorCheck {
    match config::load_with_sources() {
        Ok(resolved) => DoctorCheck::ok(
            "config",
            format!(
                "configuration loads (chips {}, stake {})",
                resolved.config.starting_chips, resolved.config.default_stake
            ),
        ),
        Err(e) => DoctorCheck::fail(
            "config",
            "configuration failed to load",
            format!("Config check failed: {}", e),
        ),
    }
}

/// Check the wheel partition: 18 red, 18 black, a green zero.
fn check_wheel() -> DoctorCheck {
    let mut reds = 0;
    let mut blacks = 0;
    for pocket in 0..=36u8 {
        match pocket_color(pocket) {
            PocketColor::Red => reds += 1,
            PocketColor::Black => blacks += 1,
            PocketColor::Green => {}
        }
    }
    if reds == 18 && blacks == 18 && pocket_color(0) == PocketColor::Green {
        DoctorCheck::ok("wheel", "37 pockets: 18 red, 18 black, green zero")
    } else {
        DoctorCheck::fail(
            "wheel",
            format!("wheel partition off: {} red, {} black", reds, blacks),
            "Wheel check failed: color partition does not cover 1-36 evenly".to_string(),
        )
    }
}

/// Check the slots paytable: every triple pays, rarer symbols pay more.
fn check_paytable() -> DoctorCheck {
    let mut last = 0u64;
    for symbol in ALL_SYMBOLS {
        let multiplier = symbol.triple_multiplier();
        if multiplier <= last {
            return DoctorCheck::fail(
                "paytable",
                format!("{} pays {}x, not above {}x", symbol, multiplier, last),
                "Paytable check failed: multipliers are not strictly increasing".to_string(),
            );
        }
        last = multiplier;
    }
    DoctorCheck::ok("paytable", format!("8 symbols, top multiplier {}x", last))
}

/// Check that seeded shuffles are reproducible and seed-sensitive.
fn check_rng() -> DoctorCheck {
    let order = |seed: u64| {
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();
        std::iter::from_fn(|| deck.deal_card()).collect::<Vec<_>>()
    };
    let a = order(42);
    let b = order(42);
    let c = order(43);
    if a != b {
        return DoctorCheck::fail(
            "rng",
            "same seed produced different shuffles",
            "RNG check failed: seeded shuffle is not reproducible".to_string(),
        );
    }
    if a == c {
        return DoctorCheck::fail(
            "rng",
            "different seeds produced the same shuffle",
            "RNG check failed: shuffle ignores the seed".to_string(),
        );
    }
    DoctorCheck::ok("rng", "seeded shuffle reproducible and seed-sensitive")
}

/// Handle the doctor command - run environment diagnostics.
///
/// Validates the local environment to ensure all dependencies and file system
/// access are working correctly. Outputs a JSON report of check results.
///
/// # Arguments
///
/// * `out` - Output stream for diagnostic report (JSON format)
/// * `err` - Output stream for error messages
///
/// # Returns
///
/// * `Ok(())` if all checks pass
/// * `Err(CliError::Config)` if any check fails
pub fn handle_doctor_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let zstd_dir = env::var("GREENFELT_DOCTOR_ZSTD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir());
    let log_dir = env::var("GREENFELT_DOCTOR_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs"));
    let locale_override = env::var("GREENFELT_DOCTOR_LOCALE_OVERRIDE").ok();

    let checks = vec![
        check_config(),
        check_zstd(&zstd_dir),
        check_log_dir(&log_dir),
        check_locale(locale_override),
        check_wheel(),
        check_paytable(),
        check_rng(),
    ];

    let mut report = serde_json::Map::new();
    let mut ok_all = true;
    for check in checks {
        if !check.ok {
            ok_all = false;
            if let Some(msg) = &check.error {
                ui::write_error(err, msg)?;
            }
        }
        report.insert(check.name.to_string(), check.to_value());
    }

    let output = serde_json::json!({
        "checks": serde_json::Value::Object(report)
    });

    let json_output = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize doctor report: {}", e)))?;
    writeln!(out, "{}", json_output)?;

    if ok_all {
        Ok(())
    } else {
        Err(CliError::Config(
            "Environment diagnostics failed".to_string(),
        ))
    }
}
