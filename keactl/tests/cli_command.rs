use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn keactl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keactl"));
    cmd.env_remove("KEACTL_LOG");
    cmd
}

#[test]
fn command_sorts_services_and_omits_missing_arguments() {
    keactl()
        .args(["command", "list-commands", "--service", "dhcp6", "--service", "dhcp4"])
        .assert()
        .success()
        .stdout("{\"command\":\"list-commands\",\"service\":[\"dhcp4\",\"dhcp6\"]}\n");
}

#[test]
fn command_without_services_has_no_service_key() {
    keactl()
        .args(["command", "config-get"])
        .assert()
        .success()
        .stdout("{\"command\":\"config-get\"}\n");
}

#[test]
fn command_accepts_inline_and_file_arguments() {
    keactl()
        .args(["command", "subnet4-get", "--service", "dhcp4", "--arguments", r#"{"id": 1}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""arguments":{"id":1}"#));

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("args.json");
    fs::write(&path, r#"{"remove": true, "hw-address": "aa:bb:cc:dd:ee:ff"}"#).expect("write");
    keactl()
        .args(["command", "lease4-del", "--arguments-file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""arguments":{"remove":true,"hw-address":"aa:bb:cc:dd:ee:ff"}"#,
        ));
}

#[test]
fn command_rejects_non_object_arguments() {
    keactl()
        .args(["command", "config-set", "--arguments", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot build command 'config-set'"));
}

#[test]
fn command_rejects_empty_name_and_bad_json() {
    keactl().args(["command", ""]).assert().failure();
    keactl()
        .args(["command", "config-get", "--arguments", "{nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON in --arguments"));
}

#[test]
fn invalid_log_filter_is_reported() {
    keactl()
        .env("KEACTL_LOG", "keactl=loud")
        .args(["command", "config-get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log filter in KEACTL_LOG"));
}
