//! Integration Test: Headless Conductor
//!
//! **Policy**: `conductor/core` holds all conversation behavior and knows
//! nothing about terminals. Only the TUI may depend on ratatui or crossterm.

use std::fs;

use architectural_enforcement::{rust_files, scan_file, workspace_root, TERMINAL_CRATES};

#[test]
fn test_conductor_manifest_has_no_terminal_crates() {
    let manifest = workspace_root().join("conductor/core/Cargo.toml");
    let content = fs::read_to_string(&manifest).expect("read conductor manifest");

    for krate in TERMINAL_CRATES {
        assert!(
            !content.lines().any(|l| l.trim_start().starts_with(krate)),
            "conductor/core depends on {krate}"
        );
    }
}

#[test]
fn test_conductor_source_has_no_terminal_imports() {
    let src = workspace_root().join("conductor/core/src");
    let violations: Vec<_> = rust_files(&src)
        .iter()
        .flat_map(|path| {
            scan_file(path, |code| {
                TERMINAL_CRATES
                    .iter()
                    .any(|krate| code.contains(&format!("{krate}::")))
            })
        })
        .collect();

    assert!(
        violations.is_empty(),
        "terminal crates used in conductor/core:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_tui_depends_on_conductor() {
    let manifest = workspace_root().join("tui/Cargo.toml");
    let content = fs::read_to_string(&manifest).expect("read tui manifest");
    assert!(content.contains("buddy-conductor"));
}
