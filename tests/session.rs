use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn minsh(dir: &Path, script: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_minsh"))
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn minsh");

    child
        .stdin
        .take()
        .expect("stdin present")
        .write_all(script.as_bytes())
        .expect("write script");

    child.wait_with_output().expect("wait for minsh")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn output_redirection_overwrites_target() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("out.txt"), "stale content\n").unwrap();

    let output = minsh(dir.path(), "echo hello > out.txt\nexit\n");

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "hello\n"
    );
}

#[test]
fn input_redirection_feeds_stdin() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("in.txt"), "b\na\nc\n").unwrap();

    let output = minsh(dir.path(), "sort < in.txt\nexit\n");

    assert!(output.status.success());
    assert!(stdout(&output).contains("a\nb\nc\n"));
}

#[test]
fn pipe_counts_lines() {
    let dir = tempdir().unwrap();

    let output = minsh(dir.path(), "seq 7 | wc -l\nexit\n");

    assert!(output.status.success());
    assert!(stdout(&output).lines().any(|line| line.trim_end().ends_with('7')));
}

#[test]
fn mkdir_and_cd_change_working_directory() {
    let dir = tempdir().unwrap();

    let output = minsh(
        dir.path(),
        "mkdir sub\ncd sub\npwd > where.txt\ncd /nonexistent/minsh\npwd > still.txt\nexit\n",
    );

    assert!(output.status.success());
    let sub = dir.path().join("sub");
    let expected = sub.canonicalize().unwrap();
    for name in ["where.txt", "still.txt"] {
        let recorded = fs::read_to_string(sub.join(name)).unwrap();
        assert_eq!(Path::new(recorded.trim()).canonicalize().unwrap(), expected);
    }
    assert!(String::from_utf8_lossy(&output.stderr).contains("minsh: cd: /nonexistent/minsh"));
}

#[test]
fn recall_appends_to_previous_line() {
    let dir = tempdir().unwrap();

    let output = minsh(dir.path(), "touch first\n!! second\nexit\n");

    assert!(output.status.success());
    assert!(dir.path().join("first").exists());
    assert!(dir.path().join("second").exists());
    assert!(stdout(&output).contains("touch first second\n"));
}

#[test]
fn recall_without_previous_line_reports() {
    let dir = tempdir().unwrap();

    let output = minsh(dir.path(), "!! extra\nexit\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no previous command"));
}

#[test]
fn echo_mode_breaks_line_down() {
    let dir = tempdir().unwrap();

    let output = minsh(dir.path(), "a b|c echo\nexit\n");

    assert!(stdout(&output).contains("a\nSPACE\nb\nPIPE\nc\n"));
}

#[test]
fn exit_ignores_arguments_and_skips_remaining_input() {
    let dir = tempdir().unwrap();

    let output = minsh(dir.path(), "exit 3\nmkdir never\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(!dir.path().join("never").exists());
}

#[test]
fn end_of_input_exits_cleanly() {
    let dir = tempdir().unwrap();

    let output = minsh(dir.path(), "true\nminsh-no-such-program-4711\n");

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("minsh: exec error"));
}
