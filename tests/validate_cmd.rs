use std::fs;

use assert_cmd::Command;
use tempfile::TempDir;

#[test]
fn validate_command_ok() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("cohorts.csv");
    fs::write(
        &input,
        "Cohort,BrainPAD,AIS\ncontrol,1.0,\ncontrol,2.5,\nSCI_P,3.0,A\nSCI_P,0.5,B\nSCI_nNP,4.2,A\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("brainpad-stats").unwrap();
    cmd.arg("validate").arg("--input").arg(&input);
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("brainpad-stats validate ok"));
    assert!(stdout.contains("subjects: 5"));
    assert!(stdout.contains("normality brainpad: n=5"));
    assert!(stdout.contains("normality age: not available"));
}

#[test]
fn validate_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("brainpad-stats").unwrap();
    cmd.arg("validate")
        .arg("--input")
        .arg(tmp.path().join("missing.csv"));
    cmd.assert().failure();
}
