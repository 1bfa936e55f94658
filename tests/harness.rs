//! Test harness for arbor integration tests

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub use arbor::test_utils::TestTree;

/// Run the arbor binary with a stable environment: no color forcing, no
/// digit grouping, default log level.
pub fn run_arbor(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = env!("CARGO_BIN_EXE_arbor");
    let output = Command::new(binary)
        .args(args)
        .current_dir(dir)
        .env_remove("FORCE_COLOR")
        .env_remove("LC_ALL")
        .env_remove("LC_NUMERIC")
        .env_remove("ARBOR_LOG")
        .env("LANG", "C")
        .output()
        .expect("Failed to run arbor");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// Run arbor on the tree root, passing its path explicitly.
pub fn run_on(tree: &TestTree, args: &[&str]) -> (String, String, bool) {
    let root = tree.path().to_string_lossy().to_string();
    let mut full: Vec<&str> = args.to_vec();
    full.push(&root);
    run_arbor(tree.path(), &full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_temp_dir() {
        let tree = TestTree::new();
        assert!(tree.path().exists());
    }

    #[test]
    fn test_harness_add_sized() {
        let tree = TestTree::new();
        let path = tree.add_sized("a/b.txt", 42);
        assert_eq!(std::fs::metadata(path).unwrap().len(), 42);
    }
}
