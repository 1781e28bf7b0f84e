// Drives the pdf-organize binary
mod common;

use common::{scan_ids, write_numbered, write_scans};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_pdf-organize");

fn command() -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env_remove("RUST_LOG").env_remove("PDF_ORGANIZE_JOBS");
    // keep a developer's own config.toml out of the way
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-pdf-organize-config");
    cmd
}

#[test]
fn test_missing_source_directory() {
    let tmp = TempDir::new().unwrap();
    let output = command()
        .arg("-d")
        .arg(tmp.path().join("missing"))
        .arg("-o")
        .arg(tmp.path().join("out"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Directory does not exist"));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_creates_output_directory_and_organizes() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scans");
    fs::create_dir(&input).unwrap();
    write_scans(&input.join("a.pdf"), &[("1", "1/2"), ("2", "1/2"), ("3", "2/2")]);
    let out_dir = tmp.path().join("nested").join("out");

    let output = command()
        .arg("--directory")
        .arg(&input)
        .arg("--output")
        .arg(&out_dir)
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains(&format!("Created output directory: {}", out_dir.display())));
    assert!(stdout.contains("✓ a.pdf: 3 -> 2 pages (↓ 33.33%)"));
    assert!(stdout.contains("Organized 1/1 files, removed 1 duplicate pages"));
    assert_eq!(scan_ids(&out_dir.join("a.pdf")), vec!["2", "3"]);
}

#[test]
fn test_any_failed_file_sets_exit_status() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scans");
    let out_dir = tmp.path().join("out");
    fs::create_dir(&input).unwrap();
    write_scans(&input.join("good.pdf"), &[("1", "1/1")]);
    fs::write(input.join("bad.pdf"), b"nope").unwrap();

    let output = command()
        .arg("-d")
        .arg(&input)
        .arg("-o")
        .arg(&out_dir)
        .arg("--jobs")
        .arg("1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 file(s) failed:"));
    assert!(stderr.contains("bad.pdf"));
    assert!(out_dir.join("good.pdf").is_file());
}

#[test]
fn test_config_file_is_applied() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scans");
    let out_dir = tmp.path().join("out");
    fs::create_dir(&input).unwrap();
    write_scans(&input.join("doc.scan"), &[("1", "1/1"), ("2", "1/1")]);
    write_scans(&input.join("ignored.pdf"), &[("1", "1/1")]);
    let config = tmp.path().join("organize.toml");
    fs::write(&config, "extension = \".scan\"\n").unwrap();

    let output = command()
        .arg("-d")
        .arg(&input)
        .arg("-o")
        .arg(&out_dir)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(scan_ids(&out_dir.join("doc.scan")), vec!["2"]);
    assert!(!out_dir.join("ignored.pdf").exists());
}

#[test]
fn test_invalid_config_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("in")).unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "jobs = \"many\"\n").unwrap();

    let output = command()
        .arg("-d")
        .arg(tmp.path().join("in"))
        .arg("-o")
        .arg(tmp.path().join("out"))
        .arg("-c")
        .arg(&config)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

// rexpect reads the pty byte by byte, so anything past ASCII arrives mangled;
// the terminal tests only match ASCII text.

#[cfg(unix)]
#[test]
fn test_live_progress_in_a_terminal() {
    use rexpect::session::spawn_command;

    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scans");
    fs::create_dir(&input).unwrap();
    write_scans(&input.join("one.pdf"), &[("1", "1/1"), ("2", "1/1")]);
    write_scans(&input.join("two.pdf"), &[("1", "2/2"), ("2", "1/2")]);

    let mut cmd = command();
    cmd.arg("-d").arg(&input).arg("-o").arg(tmp.path().join("out"));
    let mut session = spawn_command(cmd, Some(30_000)).unwrap();

    session.exp_string("\x1b[?25l").unwrap();
    session.exp_string("one.pdf: 2 -> 1 pages").unwrap();
    session.exp_string("50.00%)").unwrap();
    session.exp_string("\x1b[?25h").unwrap();
    session.exp_string("Organized 2/2 files").unwrap();
    session.exp_eof().unwrap();
}

#[cfg(unix)]
#[test]
fn test_log_records_wait_for_the_progress_block() {
    use rexpect::session::spawn_command;

    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scans");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("a_bad.pdf"), b"this is not a pdf").unwrap();
    write_numbered(&input.join("b_good.pdf"), 200);

    let mut cmd = command();
    cmd.arg("-d").arg(&input).arg("-o").arg(tmp.path().join("out"));
    let mut session = spawn_command(cmd, Some(60_000)).unwrap();
    let transcript = session.exp_eof().unwrap();

    let start = transcript.find("\x1b[?25l").unwrap();
    let end = transcript.find("\x1b[?25h").unwrap();
    let block = &transcript[start..end];
    assert!(!block.contains("ERROR"), "log record inside the progress block: {block:?}");
    assert!(block.contains("a_bad.pdf: cannot parse"));
    assert!(block.contains("b_good.pdf: 200 -> 200 pages"));

    let after = &transcript[end..];
    assert!(after.contains("ERROR"));
    assert!(after.contains("1 file(s) failed:"));
}

#[cfg(unix)]
#[test]
fn test_ctrl_c_restores_cursor_and_exits_130() {
    use rexpect::process::wait::WaitStatus;
    use rexpect::session::spawn_command;

    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("scans");
    fs::create_dir(&input).unwrap();
    write_numbered(&input.join("big.pdf"), 3000);
    let out_dir = tmp.path().join("out");

    let mut cmd = command();
    cmd.arg("-d").arg(&input).arg("-o").arg(&out_dir);
    let mut session = spawn_command(cmd, Some(60_000)).unwrap();

    session.exp_string("big.pdf: 1/3000").unwrap();
    session.send_control('c').unwrap();
    session.exp_string("\x1b[?25h").unwrap();
    let rest = session.exp_eof().unwrap();
    assert!(rest.contains("interrupted"));

    match session.process.wait().unwrap() {
        WaitStatus::Exited(_, code) => assert_eq!(code, 130),
        other => panic!("unexpected exit: {other:?}"),
    }
    assert!(!out_dir.join("big.pdf").exists());
}
