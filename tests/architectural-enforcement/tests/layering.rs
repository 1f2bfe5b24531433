//! Integration Test: Core/UI Separation
//!
//! **Policy**: `redqueen-core` holds all chat state and talks to the backend;
//! it never touches the terminal. Only `tui` may depend on ratatui or
//! crossterm, and the core never reaches back into the TUI.

use std::fs;

use architectural_enforcement::{production_lines, rust_files, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("client/core/Cargo.toml"))
        .expect("core manifest readable");

    let offenders: Vec<&str> = manifest
        .lines()
        .map(|line| line.split('#').next().unwrap_or(line).trim())
        .filter(|line| UI_CRATES.iter().any(|c| line.starts_with(c)))
        .collect();

    assert!(
        offenders.is_empty(),
        "core depends on UI crates: {offenders:?}"
    );
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let offenders: Vec<String> = rust_files("client/core/src")
        .iter()
        .flat_map(|path| production_lines(path))
        .filter(|line| {
            UI_CRATES
                .iter()
                .any(|c| line.code.contains(&format!("{c}::")))
                || line.code.contains("redqueen_tui")
        })
        .map(|line| line.to_string())
        .collect();

    assert!(offenders.is_empty(), "UI code in core:\n{}", offenders.join("\n"));
}

#[test]
fn test_tui_does_not_call_the_backend_directly() {
    // Requests go through the controller so replies can be matched to sessions
    let offenders: Vec<String> = rust_files("tui/src")
        .iter()
        .flat_map(|path| production_lines(path))
        .filter(|line| line.code.contains("reqwest::") || line.code.contains(".send(&"))
        .map(|line| line.to_string())
        .collect();

    assert!(offenders.is_empty(), "TUI bypasses the controller:\n{}", offenders.join("\n"));
}
