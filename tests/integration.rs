//! Integration tests for arbor

mod harness;

use assert_cmd::Command;
use harness::{TestTree, run_on};
use predicates::prelude::*;

fn arbor() -> Command {
    let mut cmd = Command::cargo_bin("arbor").expect("binary should build");
    cmd.env_remove("FORCE_COLOR")
        .env_remove("LC_ALL")
        .env_remove("LC_NUMERIC")
        .env("LANG", "C");
    cmd
}

#[test]
fn test_three_files_with_sizes() {
    let tree = TestTree::new();
    tree.add_sized("a", 10);
    tree.add_sized("b", 20);
    tree.add_sized("c", 30);

    let (stdout, _stderr, success) = run_on(&tree, &["-s", "-L", "0"]);
    assert!(success, "arbor should succeed");

    let expected = [
        format!("{:>11} {}", 60, tree.path().display()),
        format!("{:>11} ┣━ a", 10),
        format!("{:>11} ┣━ b", 20),
        format!("{:>11} ┗━ c", 30),
        String::new(),
        "0 directories, 3 files, 60 size".to_string(),
    ];
    assert_eq!(stdout, expected.join("\n") + "\n");
}

#[test]
fn test_single_child_directories_are_joined() {
    let tree = TestTree::new();
    tree.add_file("a/b/c.txt", "");
    tree.add_file("z.txt", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-L", "0"]);
    assert!(success);
    assert!(stdout.contains("┣━ a/b/c.txt\n"), "chain should be joined: {}", stdout);
    assert!(stdout.contains("┗━ z.txt\n"));
    assert!(stdout.ends_with("\n2 directories, 2 files\n"), "{}", stdout);
}

#[test]
fn test_nojoin_prints_every_level() {
    let tree = TestTree::new();
    tree.add_file("a/b/c.txt", "");
    tree.add_file("z.txt", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-J", "-L", "0"]);
    assert!(success);
    assert!(stdout.contains("┣━ a\n┃ ┗━ b\n┃   ┗━ c.txt\n┗━ z.txt\n"), "{}", stdout);
}

#[test]
fn test_reverse_sort() {
    let tree = TestTree::new();
    tree.add_file("apple", "");
    tree.add_file("banana", "");
    tree.add_file("cherry", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-r"]);
    assert!(success);
    let c = stdout.find("cherry").unwrap();
    let b = stdout.find("banana").unwrap();
    let a = stdout.find("apple").unwrap();
    assert!(c < b && b < a, "reverse order expected: {}", stdout);
}

#[test]
fn test_dirs_first() {
    let tree = TestTree::new();
    tree.add_file("a.txt", "");
    tree.add_file("zdir/inner.txt", "");

    let (stdout, _stderr, success) = run_on(&tree, &["--dirsfirst"]);
    assert!(success);
    let dir = stdout.find("zdir").unwrap();
    let file = stdout.find("a.txt").unwrap();
    assert!(dir < file, "directory should come first: {}", stdout);
}

#[test]
fn test_version_sort() {
    let tree = TestTree::new();
    tree.add_file("file10", "");
    tree.add_file("file2", "");
    tree.add_file("file1", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-v"]);
    assert!(success);
    let one = stdout.find("file1\n").unwrap();
    let two = stdout.find("file2\n").unwrap();
    let ten = stdout.find("file10\n").unwrap();
    assert!(one < two && two < ten, "{}", stdout);
}

#[test]
fn test_size_sort_smallest_first() {
    let tree = TestTree::new();
    tree.add_sized("small", 1);
    tree.add_sized("large", 300);
    tree.add_sized("medium", 20);

    let (stdout, _stderr, success) = run_on(&tree, &["--sort", "size"]);
    assert!(success);
    let large = stdout.find("large").unwrap();
    let medium = stdout.find("medium").unwrap();
    let small = stdout.find("small").unwrap();
    assert!(small < medium && medium < large, "{}", stdout);
}

#[test]
fn test_hidden_and_backup_files_skipped() {
    let tree = TestTree::new();
    tree.add_file("visible.txt", "");
    tree.add_file(".hidden", "");
    tree.add_file("notes~", "");
    tree.add_file("old.bak", "");

    let (stdout, _stderr, success) = run_on(&tree, &[]);
    assert!(success);
    assert!(stdout.contains("visible.txt"));
    assert!(!stdout.contains(".hidden"), "{}", stdout);
    assert!(!stdout.contains("notes~"), "{}", stdout);
    assert!(!stdout.contains("old.bak"), "{}", stdout);
}

#[test]
fn test_all_shows_hidden_files() {
    let tree = TestTree::new();
    tree.add_file("visible.txt", "");
    tree.add_file(".hidden", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-a"]);
    assert!(success);
    assert!(stdout.contains(".hidden"), "{}", stdout);
}

#[test]
fn test_dirs_only() {
    let tree = TestTree::new();
    tree.add_file("src/main.rs", "");
    tree.add_file("docs/guide.md", "");
    tree.add_file("top.txt", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-d"]);
    assert!(success);
    assert!(stdout.contains("docs"));
    assert!(stdout.contains("src"));
    assert!(!stdout.contains("top.txt"), "{}", stdout);
    assert!(!stdout.contains("main.rs"), "{}", stdout);
    assert!(stdout.ends_with("\n2 directories\n"), "{}", stdout);
}

#[test]
fn test_include_pattern() {
    let tree = TestTree::new();
    tree.add_file("main.rs", "");
    tree.add_file("notes.txt", "");
    tree.add_file("lib/util.rs", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-P", r"\.rs$"]);
    assert!(success);
    assert!(stdout.contains("main.rs"));
    assert!(stdout.contains("util.rs"));
    assert!(!stdout.contains("notes.txt"), "{}", stdout);
}

#[test]
fn test_exclude_pattern_ignore_case() {
    let tree = TestTree::new();
    tree.add_file("README.md", "");
    tree.add_file("main.rs", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-I", "readme", "--ignore-case"]);
    assert!(success);
    assert!(stdout.contains("main.rs"));
    assert!(!stdout.contains("README.md"), "{}", stdout);
}

#[test]
fn test_invalid_pattern_warns_and_lists_everything() {
    let tree = TestTree::new();
    tree.add_file("a.txt", "");
    tree.add_file("b.txt", "");

    let (stdout, stderr, success) = run_on(&tree, &["-P", "("]);
    assert!(success);
    assert!(stderr.contains("filter disabled"), "stderr: {}", stderr);
    assert!(stdout.contains("a.txt") && stdout.contains("b.txt"));
}

#[test]
fn test_fixed_level_stops_descent() {
    let tree = TestTree::new();
    tree.add_file("outer/inner/deep.txt", "");
    tree.add_file("top.txt", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-J", "-L", "1"]);
    assert!(success);
    assert!(stdout.contains("outer"));
    assert!(stdout.contains("top.txt"));
    assert!(!stdout.contains("inner"), "{}", stdout);
    assert!(!stdout.contains("deep.txt"), "{}", stdout);
}

#[test]
fn test_human_sizes() {
    let tree = TestTree::new();
    tree.add_sized("kilo", 1024);
    tree.add_sized("tiny", 5);

    let (stdout, _stderr, success) = run_on(&tree, &["-h"]);
    assert!(success);
    assert!(stdout.contains("1.0K ┣━ kilo"), "{}", stdout);
    assert!(stdout.contains("   5 ┗━ tiny"), "{}", stdout);
    assert!(stdout.ends_with(", 1.0K size\n"), "{}", stdout);
}

#[test]
fn test_classify_and_quote() {
    let tree = TestTree::new();
    tree.add_file("dir/x", "");
    tree.add_file("plain", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-F", "-Q", "-J"]);
    assert!(success);
    assert!(stdout.contains("\"dir\"/"), "{}", stdout);
    assert!(stdout.contains("\"plain\"\n"), "{}", stdout);
}

#[test]
fn test_noindent_and_noreport() {
    let tree = TestTree::new();
    tree.add_file("a", "");
    tree.add_file("b", "");

    let (stdout, _stderr, success) = run_on(&tree, &["-i", "--noreport"]);
    assert!(success);
    let expected = format!("{}\na\nb\n", tree.path().display());
    assert_eq!(stdout, expected);
}

#[test]
fn test_missing_root_is_reported_inline() {
    let tree = TestTree::new();
    let missing = tree.path().join("nope");

    arbor()
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{} [no such file or directory]",
            missing.display()
        )));
}

#[test]
fn test_multiple_roots_share_one_report() {
    let first = TestTree::new();
    first.add_file("one.txt", "");
    let second = TestTree::new();
    second.add_file("two.txt", "");
    second.add_file("three.txt", "");

    arbor()
        .arg(first.path())
        .arg(second.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("one.txt"))
        .stdout(predicate::str::contains("two.txt"))
        .stdout(predicate::str::ends_with("\n0 directories, 3 files\n"));
}

#[test]
fn test_output_to_file() {
    let tree = TestTree::new();
    tree.add_file("listed.txt", "");
    let out = tree.path().join("out.txt");

    arbor()
        .arg("-o")
        .arg(&out)
        .arg("-C")
        .arg("-I")
        .arg("out.txt")
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("listed.txt"), "{}", written);
}

#[test]
fn test_color_always_emits_escapes() {
    let tree = TestTree::new();
    tree.add_file("sub/file", "");
    tree.add_file("other", "");

    arbor()
        .args(["--color", "always"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["));
}

#[test]
fn test_color_never_is_plain() {
    let tree = TestTree::new();
    tree.add_file("sub/file", "");

    arbor()
        .args(["--color", "never"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_json_output() {
    let tree = TestTree::new();
    tree.add_sized("dir/inner.txt", 4);
    tree.add_sized("top.txt", 6);

    let (stdout, _stderr, success) = run_on(&tree, &["--json", "-s", "-L", "0"]);
    assert!(success);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let root = &entries[0];
    assert_eq!(root["type"], "directory");
    assert_eq!(root["size"], 10);
    let contents = root["contents"].as_array().unwrap();
    assert_eq!(contents[0]["name"], "dir");
    assert_eq!(contents[0]["contents"][0]["name"], "inner.txt");
    assert_eq!(contents[1]["name"], "top.txt");
    assert_eq!(contents[1]["type"], "file");

    let report = &entries[1];
    assert_eq!(report["type"], "report");
    assert_eq!(report["directories"], 1);
    assert_eq!(report["files"], 2);
    assert_eq!(report["size"], 10);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let tree = TestTree::new();
    for d in 0..8 {
        for f in 0..5 {
            tree.add_sized(&format!("d{d}/sub/f{f}.txt"), d * 10 + f);
        }
    }

    let (sequential, _, ok1) = run_on(&tree, &["-j", "1", "-s", "-L", "0"]);
    let (parallel, _, ok2) = run_on(&tree, &["-j", "4", "-s", "-L", "0"]);
    assert!(ok1 && ok2);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_help_uses_long_flag() {
    arbor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}
