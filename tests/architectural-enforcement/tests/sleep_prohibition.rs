//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep to wait for things. Replies
//! arrive on channels, animation advances from timestamps.
//! **Exception**: frame rate limiting in the TUI event loop (`App::run`).

use architectural_enforcement::{production_lines, rust_files, SourceLine};

fn is_sleep(line: &SourceLine) -> bool {
    line.code.contains("::sleep(") || line.code.contains(".sleep(")
}

fn is_frame_limiting(line: &SourceLine) -> bool {
    line.path.ends_with("tui/src/app.rs") && line.function.as_deref() == Some("run")
}

fn violations(dir: &str, allow_frame_limiting: bool) -> Vec<SourceLine> {
    rust_files(dir)
        .iter()
        .flat_map(|path| production_lines(path))
        .filter(is_sleep)
        .filter(|line| !(allow_frame_limiting && is_frame_limiting(line)))
        .collect()
}

fn report(violations: &[SourceLine]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ Sleep calls found in production code:");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!("\n✅ Wait on a channel, or compute progress from an Instant.");
    panic!("Found {} sleep violation(s)", violations.len());
}

#[test]
fn test_no_sleep_in_core() {
    report(&violations("client/core/src", false));
}

#[test]
fn test_no_sleep_in_tui_outside_frame_loop() {
    report(&violations("tui/src", true));
}

#[test]
fn test_scanner_sees_the_frame_loop() {
    // Guards against the exception silently swallowing everything
    let frame_sleeps: Vec<_> = rust_files("tui/src")
        .iter()
        .flat_map(|path| production_lines(path))
        .filter(is_sleep)
        .collect();
    assert!(!frame_sleeps.is_empty());
    assert!(frame_sleeps.iter().all(is_frame_limiting));
}
