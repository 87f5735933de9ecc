use assert_cmd::Command;

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("brainpad-stats").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn subcommand_help_smoke() {
    for sub in ["run", "predict", "validate"] {
        let mut cmd = Command::cargo_bin("brainpad-stats").unwrap();
        cmd.arg(sub).arg("--help");
        cmd.assert().success();
    }
}
