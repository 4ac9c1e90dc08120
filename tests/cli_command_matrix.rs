use assert_cmd::Command;
use tempfile::TempDir;

fn run_help(home: &TempDir, args: &[&str]) {
    let mut cmd = Command::cargo_bin("abigate").expect("abigate binary");
    cmd.current_dir(home.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let home = TempDir::new().expect("temp home");

    // top-level
    run_help(&home, &[]);

    run_help(&home, &["release-prepare"]);
    run_help(&home, &["verify"]);
    run_help(&home, &["show-baseline"]);
    run_help(&home, &["baselines"]);
    run_help(&home, &["snapshot"]);
    run_help(&home, &["diff"]);
    run_help(&home, &["sync-status"]);
}
