use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_help_shows_options() {
    cargo_bin_cmd!("hoofsay")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pony"))
        .stdout(predicate::str::contains("--balloon"))
        .stdout(predicate::str::contains("--wrap"));
}

#[test]
fn test_message_lands_in_balloon() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "mini", "--width", "none", "hello", "there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello there"))
        .stdout(predicate::str::contains("╭"))
        .stdout(predicate::str::contains("╯"));
}

#[test]
fn test_stdin_message() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "mini", "--width", "none"])
        .write_stdin("from a pipe\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("from a pipe"));
}

#[test]
fn test_pony_only_drops_balloon_and_links() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "mini", "--pony-only", "--width", "none", "unused"])
        .assert()
        .success()
        .stdout(predicate::str::contains("( o o )"))
        .stdout(predicate::str::contains("unused").not())
        .stdout(predicate::str::contains("╭").not());
}

#[test]
fn test_think_style_uses_thought_borders() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "mini", "--think", "--width", "none", "hmm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("( hmm"))
        .stdout(predicate::str::contains("╭").not());
}

#[test]
fn test_info_full_replaces_message() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "sparkle", "--info", "2", "--width", "none", "unused"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME: sparkle"))
        .stdout(predicate::str::contains("unused").not());
}

#[test]
fn test_info_inline_prints_header_above_art() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "sparkle", "--info", "1", "--width", "none", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GROUP: demo"))
        .stdout(predicate::str::contains("hi"));
}

#[test]
fn test_custom_pony_file() {
    let dir = tempdir().unwrap();
    let pony_path = dir.path().join("custom.pony");
    fs::write(&pony_path, "$balloon$\n\n\n$\\$ custom art\n").unwrap();

    cargo_bin_cmd!("hoofsay")
        .args([
            "--pony",
            pony_path.to_str().unwrap(),
            "--width",
            "none",
            "yo",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("yo"))
        .stdout(predicate::str::contains("custom art"));
}

#[test]
fn test_undefined_variable_is_a_clean_error() {
    let dir = tempdir().unwrap();
    let pony_path = dir.path().join("broken.pony");
    fs::write(&pony_path, "$nosuchvariable$\n").unwrap();

    cargo_bin_cmd!("hoofsay")
        .args(["--pony", pony_path.to_str().unwrap(), "hi"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("nosuchvariable"));
}

#[test]
fn test_missing_pony_file_reports_path() {
    cargo_bin_cmd!("hoofsay")
        .args(["--pony", "/no/such/pony.pony", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/no/such/pony.pony"));
}

#[test]
fn test_wrap_folds_long_messages() {
    let long = "one two three four five six seven eight nine ten";
    let output = cargo_bin_cmd!("hoofsay")
        .args(["--pony", "mini", "--width", "none", "-W", "16", long])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    // The message cannot fit one balloon row at wrap column 16.
    assert!(!stdout.contains("one two three four five"), "{stdout}");
    assert!(stdout.contains("one two"), "{stdout}");
    assert!(stdout.contains("ten"), "{stdout}");
}

#[test]
fn test_truncation_limits_line_width() {
    let output = cargo_bin_cmd!("hoofsay")
        .args(["--pony", "mini", "--width", "12", "-W", "none", "wide wide wide wide"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for line in stdout.lines() {
        let visible = line
            .chars()
            .filter(|c| !c.is_control())
            .collect::<String>();
        // Rough bound: no line may carry more than 12 visible columns plus
        // SGR parameter characters; the balloon glyphs here are all narrow.
        assert!(
            strip_sgr(&visible).chars().count() <= 12,
            "line too wide: {line:?}"
        );
    }
}

#[test]
fn test_styles_lists_embedded_styles() {
    cargo_bin_cmd!("hoofsay")
        .arg("styles")
        .assert()
        .success()
        .stdout(predicate::str::contains("round"))
        .stdout(predicate::str::contains("ascii"))
        .stdout(predicate::str::contains("think"));
}

#[test]
fn test_ponies_lists_embedded_ponies() {
    cargo_bin_cmd!("hoofsay")
        .arg("ponies")
        .assert()
        .success()
        .stdout(predicate::str::contains("sparkle"))
        .stdout(predicate::str::contains("mini"));
}

/// Drops SGR parameter runs left over after control chars were removed.
fn strip_sgr(s: &str) -> String {
    let mut out = String::new();
    let mut in_seq = false;
    for c in s.chars() {
        if in_seq {
            if c.is_ascii_alphabetic() || c == '~' {
                in_seq = false;
            }
            continue;
        }
        if c == '[' {
            in_seq = true;
            continue;
        }
        out.push(c);
    }
    out
}
