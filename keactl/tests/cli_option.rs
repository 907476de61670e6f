use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

const OPTIONS: &str = r#"[
    {"code": 26, "space": "dhcp4", "universe": "IPv4",
     "fields": [{"type": "uint16", "value": 1400}]},
    {"code": 250, "space": "dhcp4", "universe": "IPv4",
     "fields": [{"type": "uint16", "value": 1234}]}
]"#;

fn keactl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keactl"));
    cmd.env_remove("KEACTL_LOG").env("NO_COLOR", "1");
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn encode_uses_csv_for_defined_options_and_hex_otherwise() {
    let output = keactl()
        .args(["option", "encode", "-", "--format", "json"])
        .write_stdin(OPTIONS)
        .output()
        .expect("encode output");
    assert!(output.status.success(), "encode should succeed");

    let data: Value = serde_json::from_slice(&output.stdout).expect("json parse");
    assert_eq!(
        data,
        json!([
            {"code": 26, "csv-format": true, "data": "1400", "space": "dhcp4"},
            {"code": 250, "csv-format": false, "data": "04d2", "space": "dhcp4"}
        ])
    );
}

#[test]
fn encode_applies_daemon_definitions_from_config() {
    let dir = tempdir().expect("tempdir");
    let config = write(
        dir.path(),
        "kea-dhcp4.json",
        r#"{"Dhcp4": {"option-def": [{"code": 250, "name": "site-port", "type": "uint16"}]}}"#,
    );

    keactl()
        .args(["option", "encode", "-", "--daemon", "3", "--config"])
        .arg(&config)
        .write_stdin(OPTIONS)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "code=250 space=dhcp4 csv-format=true data=\"1234\"",
        ));
}

#[test]
fn encode_config_requires_daemon() {
    keactl()
        .args(["option", "encode", "-", "--config", "kea.json"])
        .write_stdin(OPTIONS)
        .assert()
        .failure();
}

#[test]
fn decode_follows_definitions_and_reports_failures() {
    let dir = tempdir().expect("tempdir");
    let input = write(
        dir.path(),
        "option-data.json",
        r#"[
            {"code": 6, "data": "192.0.2.1, 192.0.2.2"},
            {"code": 26, "data": "jumbo"},
            {"code": 251, "csv-format": false, "data": "DE:AD:BE:EF"}
        ]"#,
    );

    keactl()
        .args(["option", "decode", "--universe", "4"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "code=6 space=dhcp4 universe=IPv4 fields=[ipv4-address 192.0.2.1, ipv4-address 192.0.2.2]",
        ))
        .stdout(predicate::str::contains(
            "code=251 space=dhcp4 universe=IPv4 fields=[binary deadbeef] encapsulate=option-251",
        ))
        .stderr(predicate::str::contains("1 option(s) could not be converted"))
        .stderr(predicate::str::contains("option 26 in dhcp4"));
}

#[test]
fn decode_uses_extra_definition_files() {
    let dir = tempdir().expect("tempdir");
    let definitions = write(
        dir.path(),
        "site.toml",
        "[[definition]]\ncode = 1000\nname = \"site-id\"\nspace = \"dhcp6\"\ntype = \"uint32\"\n",
    );
    let input = write(dir.path(), "option-data.json", r#"[{"code": 1000, "data": "42"}]"#);

    let output = keactl()
        .args(["option", "decode", "--universe", "6", "--format", "json", "--definitions"])
        .arg(&definitions)
        .arg(&input)
        .output()
        .expect("decode output");
    assert!(output.status.success(), "decode should succeed");

    let options: Value = serde_json::from_slice(&output.stdout).expect("json parse");
    assert_eq!(options[0]["universe"], "IPv6");
    assert_eq!(options[0]["fields"], json!([{"type": "uint32", "value": 42}]));
}

#[test]
fn decode_resolves_options_given_by_name() {
    keactl()
        .args(["option", "decode", "-", "--universe", "4"])
        .write_stdin(r#"[{"name": "routers", "data": "192.0.2.1"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "code=3 space=dhcp4 universe=IPv4 fields=[ipv4-address 192.0.2.1]",
        ));
}
