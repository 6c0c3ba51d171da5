//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`:
//! - No sleep() calls in production code
//! - The conductor stays headless (no terminal crates)
//!
//! Paths resolve from this crate's manifest, so the tests pass from any
//! working directory.

use std::fs;
use std::path::{Path, PathBuf};

/// Crates whose `src/` trees are production code
pub const PRODUCTION_CRATES: &[&str] = &["conductor/core", "tui"];

/// Terminal crates the conductor must never depend on
pub const TERMINAL_CRATES: &[&str] = &["ratatui", "crossterm"];

/// A forbidden pattern found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir`
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Lines of production code: comments stripped, test modules cut off
///
/// Test modules sit at the end of a file, so everything from the first
/// `#[cfg(test)]` on is skipped.
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .collect()
}

/// Whether a code line calls a sleep function
pub fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Lines in `path` whose production code matches `pattern`
pub fn scan_file(path: &Path, pattern: impl Fn(&str) -> bool) -> Vec<Violation> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    production_lines(&content)
        .into_iter()
        .filter(|(_, code)| pattern(*code))
        .map(|(line, _)| Violation {
            path: path.to_path_buf(),
            line,
            text: content.lines().nth(line - 1).unwrap_or_default().trim().to_string(),
        })
        .collect()
}

/// Scan every production crate's `src/` for `pattern`
pub fn scan_production(pattern: impl Fn(&str) -> bool + Copy) -> Vec<Violation> {
    let root = workspace_root();
    PRODUCTION_CRATES
        .iter()
        .flat_map(|krate| rust_files(&root.join(krate).join("src")))
        .flat_map(|path| scan_file(&path, pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_detection() {
        assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
        assert!(is_sleep_call("std::thread::sleep(d);"));
        assert!(!is_sleep_call("let mut ticker = tokio::time::interval(FRAME_INTERVAL);"));
    }

    #[test]
    fn test_comments_and_test_modules_are_skipped() {
        let source = "fn run() {\n    // tokio::time::sleep(d)\n}\n#[cfg(test)]\nmod tests {\n    fn t() { tokio::time::sleep(d); }\n}\n";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|(_, code)| !is_sleep_call(code)));
    }

    #[test]
    fn test_workspace_root_has_production_crates() {
        let root = workspace_root();
        for krate in PRODUCTION_CRATES {
            assert!(root.join(krate).join("src").is_dir(), "missing {krate}");
        }
    }
}
