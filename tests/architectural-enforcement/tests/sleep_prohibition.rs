//! Integration Test: Sleep Prohibition
//!
//! **Policy**: production code in the TUI and the conductor never sleeps.
//! Waiting happens on I/O, channels or `tokio::time::interval`.

use architectural_enforcement::{is_sleep_call, scan_production};

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan_production(is_sleep_call);

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nWait on I/O, a channel or tokio::time::interval instead.");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}
