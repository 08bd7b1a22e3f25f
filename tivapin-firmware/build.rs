//! Build script for tivapin-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates board_config.rs from board.toml

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tivapin_core::config::parse_pin_string;

/// Accepted `[led] drive` values and the matching `DriveStrength` variants
const DRIVES: [(&str, &str); 4] = [
    ("2mA", "Ma2"),
    ("4mA", "Ma4"),
    ("8mA", "Ma8"),
    ("8mA-slew", "Ma8SlewControlled"),
];

/// Accepted `[button] pull` values and the matching `PinMode` variants
const PULLS: [(&str, &str); 3] = [
    ("none", "Standard"),
    ("up", "StandardPullUp"),
    ("down", "StandardPullDown"),
];

const MAX_PERIOD_MS: i64 = 60_000;

fn main() {
    setup_linker();
    let board = validate_config();
    generate_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated board description
struct Board {
    led_port: u8,
    led_pin: u8,
    led_active_low: bool,
    led_drive: &'static str,
    button_port: u8,
    button_pin: u8,
    button_active_low: bool,
    button_pull: &'static str,
    blink_period_ms: u32,
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the tivapin-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    for section in ["led", "button", "blink"] {
        if !matches!(config.get(section), Some(toml::Value::Table(_))) {
            errors.push(format!("Missing [{}] section", section));
        }
    }
    report("Missing required sections in board.toml", &errors);

    let led = validate_pin(&config, "led", &mut errors);
    let led_drive = validate_choice(&config, "led", "drive", &DRIVES, "2mA", &mut errors);
    let button = validate_pin(&config, "button", &mut errors);
    let button_pull = validate_choice(&config, "button", "pull", &PULLS, "none", &mut errors);

    if let (Some((led_id, _)), Some((button_id, _))) = (led, button) {
        if led_id == button_id {
            errors.push(format!("[led] and [button] both use {}", led_id));
        }
    }

    let blink_period_ms = match config.get("blink").and_then(|b| b.get("period_ms")) {
        Some(toml::Value::Integer(ms)) if (1..=MAX_PERIOD_MS).contains(ms) => *ms as u32,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[blink] period_ms must be 1-{}", MAX_PERIOD_MS));
            0
        }
        Some(_) => {
            errors.push("[blink] period_ms must be an integer".to_string());
            0
        }
        None => {
            errors.push("[blink] missing 'period_ms'".to_string());
            0
        }
    };

    report("Invalid board configuration", &errors);

    // Errors above stop the build, so both pins are present here
    let (led_id, led_active_low) = led.unwrap();
    let (button_id, button_active_low) = button.unwrap();

    println!("cargo:warning=board.toml validated successfully");

    Board {
        led_port: led_id.port(),
        led_pin: led_id.pin(),
        led_active_low,
        led_drive,
        button_port: button_id.port(),
        button_pin: button_id.pin(),
        button_active_low,
        button_pull,
        blink_period_ms,
    }
}

/// Validate `[section] pin`
fn validate_pin(
    config: &toml::Value,
    section: &str,
    errors: &mut Vec<String>,
) -> Option<(tivapin_core::PinId, bool)> {
    match config.get(section).and_then(|s| s.get("pin")) {
        Some(toml::Value::String(pin)) => {
            let parsed = parse_pin_string(pin);
            if parsed.is_none() {
                errors.push(format!(
                    "[{}] invalid pin '{}' (expected PA0-PF7, optional '!')",
                    section, pin
                ));
            }
            parsed
        }
        Some(_) => {
            errors.push(format!("[{}] pin must be a string", section));
            None
        }
        None => {
            errors.push(format!("[{}] missing 'pin'", section));
            None
        }
    }
}

/// Validate an optional string field against a fixed set of names
///
/// Returns the code-side name for the chosen value.
fn validate_choice(
    config: &toml::Value,
    section: &str,
    key: &str,
    choices: &[(&'static str, &'static str)],
    default: &str,
    errors: &mut Vec<String>,
) -> &'static str {
    let value = match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::String(v)) => v.as_str(),
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            default
        }
        None => default,
    };

    match choices.iter().find(|(name, _)| *name == value) {
        Some((_, variant)) => *variant,
        None => {
            let names: Vec<_> = choices.iter().map(|(name, _)| *name).collect();
            errors.push(format!(
                "[{}] {} must be one of: {}",
                section,
                key,
                names.join(", ")
            ));
            choices[0].1
        }
    }
}

/// Emit board_config.rs into OUT_DIR
fn generate_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();

    // A press is the edge into the active level
    let press = if board.button_active_low {
        "FallingEdge"
    } else {
        "RisingEdge"
    };

    writeln!(f, "// Generated from board.toml by build.rs").unwrap();
    writeln!(
        f,
        "pub const LED: PinId = PinId::new({}, {});",
        board.led_port, board.led_pin
    )
    .unwrap();
    writeln!(
        f,
        "pub const LED_ACTIVE_LOW: bool = {};",
        board.led_active_low
    )
    .unwrap();
    writeln!(
        f,
        "pub const LED_DRIVE: DriveStrength = DriveStrength::{};",
        board.led_drive
    )
    .unwrap();
    writeln!(
        f,
        "pub const BUTTON: PinId = PinId::new({}, {});",
        board.button_port, board.button_pin
    )
    .unwrap();
    writeln!(
        f,
        "pub const BUTTON_MODE: PinMode = PinMode::{};",
        board.button_pull
    )
    .unwrap();
    writeln!(
        f,
        "pub const BUTTON_PRESS: InterruptCondition = InterruptCondition::{};",
        press
    )
    .unwrap();
    writeln!(
        f,
        "pub const BLINK_PERIOD_MS: u32 = {};",
        board.blink_period_ms
    )
    .unwrap();
}

/// Stop the build with a boxed list of errors, if any
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
