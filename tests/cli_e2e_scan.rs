//! End-to-end tests for the `up2 scan` command.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_scan_help() {
    let mut cmd = cargo_bin_cmd!("up2");
    cmd.arg("scan")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "List the git repositories found in a directory or list file",
        ))
        .stdout(predicate::str::contains("SOURCE"));
}

#[test]
fn test_scan_empty_directory() {
    let source = SourceFixture::new().with_plain_dir("downloads");

    let mut cmd = cargo_bin_cmd!("up2");
    cmd.arg("scan")
        .arg(source.path())
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("No git repositories detected"));
}

#[test]
fn test_scan_requires_source() {
    let mut cmd = cargo_bin_cmd!("up2");
    cmd.arg("scan").assert().code(2);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_scan_lists_repositories_with_sizes() {
    if !git_available() {
        eprintln!("Skipping: git is not installed");
        return;
    }
    let source = SourceFixture::new()
        .with_git_repo("blogine")
        .with_git_repo("taskover")
        .with_plain_dir("downloads");

    let mut cmd = cargo_bin_cmd!("up2");
    cmd.arg("scan")
        .arg(source.path())
        .arg("--quiet")
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 repositories detected"))
        .stdout(predicate::str::contains("blogine"))
        .stdout(predicate::str::contains("taskover"))
        .stdout(predicate::str::contains("downloads").not())
        .stdout(predicate::str::is_match(r"1\. .*blogine \d+\.\d{2}M").unwrap());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_scan_list_file() {
    if !git_available() {
        eprintln!("Skipping: git is not installed");
        return;
    }
    let source = SourceFixture::new()
        .with_git_repo("blogine")
        .with_git_repo("taskover");
    let list = assert_fs::NamedTempFile::new("repos.list").unwrap();
    list.write_str(&format!(
        "# repositories to move\n{}\n\n{}\n",
        source.child("taskover").display(),
        source.child("missing").display()
    ))
    .unwrap();

    let mut cmd = cargo_bin_cmd!("up2");
    cmd.arg("scan")
        .arg(list.path())
        .arg("--quiet")
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 repositories detected"))
        .stdout(predicate::str::contains("taskover"))
        .stdout(predicate::str::contains("blogine").not());
}
