//! Build script for reflow-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates oven.toml and the embedded profiles at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
    validate_profiles();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate oven.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=oven.toml");

    let config_path = Path::new("oven.toml");
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read oven.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in oven.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    check_duties(&config, &mut errors);
    check_periods(&config, &mut errors);
    check_rotary(&config, &mut errors);
    check_strings(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid oven.toml configuration", &errors);
    }

    println!("cargo:warning=oven.toml validated successfully");
}

/// Validate every profile file embedded into the firmware
fn validate_profiles() {
    println!("cargo:rerun-if-changed=profiles");

    let entries = match fs::read_dir("profiles") {
        Ok(entries) => entries,
        Err(e) => fail("Failed to read profiles/", &[e.to_string()]),
    };

    let mut errors = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("prf") {
            continue;
        }
        let name = path.display().to_string();
        match fs::read_to_string(&path) {
            Ok(text) => check_profile_text(&name, &text, &mut errors),
            Err(e) => errors.push(format!("{}: {}", name, e)),
        }
    }

    if !errors.is_empty() {
        fail("Invalid reflow profile", &errors);
    }
}

fn check_profile_text(name: &str, text: &str, errors: &mut Vec<String>) {
    let mut lines = text.lines();
    match lines.next() {
        Some(title) if title.len() <= 32 => {}
        Some(_) => errors.push(format!("{}: name longer than 32 bytes", name)),
        None => errors.push(format!("{}: empty file", name)),
    }

    let mut count = 0;
    for (index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        count += 1;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let numeric = fields.len() == 3 && fields.iter().all(|f| f.parse::<u16>().is_ok());
        if !numeric {
            errors.push(format!("{}: bad entry in line {}", name, index + 2));
        } else if fields[2].parse::<u16>().unwrap_or(0) > 10 {
            errors.push(format!("{}: more than 10 overshoot steps in line {}", name, index + 2));
        }
    }
    if count > 16 {
        errors.push(format!("{}: more than 16 entries", name));
    }
}

fn int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn check_duties(config: &toml::Value, errors: &mut Vec<String>) {
    let duties = [
        ("heater", "top_max_duty"),
        ("heater", "bottom_max_duty"),
        ("fan", "low_duty"),
        ("fan", "high_duty"),
    ];
    for (section, key) in duties {
        if let Some(value) = int(config, section, key) {
            if !(0..=100).contains(&value) {
                errors.push(format!("[{}] {} must be 0-100", section, key));
            }
        }
    }
}

fn check_periods(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["period_ms", "status_period_ms", "menu_period_ms"] {
        if let Some(value) = int(config, "control", key) {
            if value <= 0 {
                errors.push(format!("[control] {} must be positive", key));
            }
        }
    }
}

fn check_rotary(config: &toml::Value, errors: &mut Vec<String>) {
    if let (Some(min), Some(max)) = (int(config, "rotary", "min"), int(config, "rotary", "max")) {
        if min > max {
            errors.push("[rotary] min must not exceed max".to_string());
        }
    }
    if let Some(mode) = config
        .get("rotary")
        .and_then(|r| r.get("mode"))
        .and_then(|m| m.as_str())
    {
        if !["unbounded", "wrap", "bounded"].contains(&mode) {
            errors.push("[rotary] mode must be 'unbounded', 'wrap', or 'bounded'".to_string());
        }
    }
}

fn check_strings(config: &toml::Value, errors: &mut Vec<String>) {
    let limits = [
        ("control", "pcb_channel", 8),
        ("storage", "extension", 8),
        ("storage", "default_profile", 32),
    ];
    for (section, key, max_len) in limits {
        if let Some(value) = config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_str())
        {
            if value.len() > max_len {
                errors.push(format!("[{}] {} longer than {} bytes", section, key, max_len));
            }
        }
    }
}

/// Abort the build with a boxed error listing
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.len() > 62 {
                    format!("{}...", &line[..59])
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
