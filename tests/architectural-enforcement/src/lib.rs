//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code outside the TUI frame loop
//! - The core crate stays free of terminal/UI dependencies
//!
//! The helpers here walk the workspace sources; the rules live in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A line of production code
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub path: PathBuf,
    pub number: usize,
    /// The line with any trailing `//` comment removed
    pub code: String,
    /// Name of the enclosing `fn`, when one was seen above at lower indent
    pub function: Option<String>,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.number, self.code.trim())
    }
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Production lines of a file: comments stripped, `#[cfg(test)]` modules skipped
pub fn production_lines(path: &Path) -> Vec<SourceLine> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut function: Option<(usize, String)> = None;
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();

        // Test modules run to the end of the file in this workspace
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }

        let code = line.split("//").next().unwrap_or(line).to_string();
        if code.trim().is_empty() {
            continue;
        }

        let indent = line.len() - trimmed.len();
        if let Some(name) = fn_name(trimmed) {
            function = Some((indent, name));
        }

        lines.push(SourceLine {
            path: path.to_path_buf(),
            number: idx + 1,
            code,
            function: function.as_ref().map(|(_, name)| name.clone()),
        });

        // A closing brace at the function's own indent ends it
        if trimmed.starts_with('}') && function.as_ref().is_some_and(|(i, _)| indent <= *i) {
            function = None;
        }
    }

    lines
}

fn fn_name(trimmed: &str) -> Option<String> {
    let start = trimmed.find("fn ")?;
    let prefix = &trimmed[..start];
    let allowed = ["pub ", "pub(crate) ", "async ", "const ", "unsafe "];
    let mut rest = prefix;
    while !rest.is_empty() {
        let next = allowed.iter().find_map(|p| rest.strip_prefix(p))?;
        rest = next;
    }
    let name: String = trimmed[start + 3..]
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_name() {
        assert_eq!(fn_name("pub async fn run(&mut self)"), Some("run".into()));
        assert_eq!(fn_name("fn helper<T>()"), Some("helper".into()));
        assert_eq!(fn_name("let f = |x| x;"), None);
        assert_eq!(fn_name("// fn commented"), None);
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
