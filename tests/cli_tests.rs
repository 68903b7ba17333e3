use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const LONG_A1: &str = "0x00000000000000000000000000000000000000000000000000000000000000a1";
const LONG_B2: &str = "0x00000000000000000000000000000000000000000000000000000000000000b2";
const LONG_A: &str = "0x000000000000000000000000000000000000000000000000000000000000000a";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn vault_sim() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("vault-sim").unwrap();
    cmd.env_remove("VAULT_SIM_FORMAT")
        .env_remove("VAULT_SIM_SKIP_ZERO")
        .env_remove("VAULT_SIM_LOG");
    cmd
}

fn parse_json(stdout: &[u8]) -> serde_json::Value {
    serde_json::from_slice(stdout).expect("stdout is JSON")
}

#[test]
fn test_parse_fixture_merges_coin_and_fungible_views() {
    let output = vault_sim()
        .arg("parse")
        .arg(fixture("vault_transfer.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = parse_json(&output.stdout);
    assert_eq!(report["success"], true);
    assert_eq!(report["gasUsed"], "12");

    let changes = &report["balanceChanges"];
    let sender = &changes[LONG_A1]["0x1::aptos_coin::AptosCoin"];
    assert_eq!(sender["delta"], "-100");
    assert_eq!(sender["faAddress"], LONG_A);

    let receiver = &changes[LONG_B2][LONG_A];
    assert_eq!(receiver["delta"], "100");
    assert_eq!(receiver["coinType"], serde_json::Value::Null);
}

#[test]
fn test_parse_reads_stdin_batch() {
    let single = std::fs::read_to_string(fixture("vault_transfer.json")).unwrap();
    let batch = format!("[{0}, {0}]", single);

    let output = vault_sim()
        .args(["parse", "-", "--compact"])
        .write_stdin(batch)
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports = parse_json(&output.stdout);
    assert_eq!(reports.as_array().map(Vec::len), Some(2));
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
}

#[test]
fn test_parse_csv_with_account_filter() {
    vault_sim()
        .arg("parse")
        .arg(fixture("vault_transfer.json"))
        .args(["--format", "csv", "--account", "0xb2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "hash,account,asset,coin_type,fa_address,delta",
        ))
        .stdout(predicate::str::contains(",100"))
        .stdout(predicate::str::contains("-100").not());
}

#[test]
fn test_format_from_environment() {
    vault_sim()
        .env("VAULT_SIM_FORMAT", "human")
        .arg("parse")
        .arg(fixture("vault_transfer.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("(success)"))
        .stdout(predicate::str::contains("-100"));
}

#[test]
fn test_corrupt_address_fails_with_location() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corrupt.json");
    std::fs::write(
        &path,
        r#"{ "hash": "0xdead", "changes": [], "events": [
            { "type": "0x1::coin::CoinDeposit",
              "data": { "account": "0xnothex", "amount": "1", "coin_type": "0x1::aptos_coin::AptosCoin" } }
        ] }"#,
    )
    .unwrap();

    vault_sim()
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("transaction #0 (0xdead)"))
        .stderr(predicate::str::contains("InvalidAddress"));
}

#[test]
fn test_missing_input_file() {
    vault_sim()
        .args(["parse", "/nonexistent/simulation.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_paired_metadata() {
    vault_sim()
        .args(["paired-metadata", "0x1::aptos_coin::AptosCoin"])
        .assert()
        .success()
        .stdout(format!("{}\n", LONG_A));

    let output = vault_sim()
        .args(["paired-metadata", "0x1::example::Usd"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let derived = String::from_utf8(output.stdout).unwrap();
    assert_eq!(derived.trim().len(), 66);
    assert_ne!(derived.trim(), LONG_A);
}

#[test]
fn test_normalize() {
    vault_sim()
        .args(["normalize", "0XA1"])
        .assert()
        .success()
        .stdout(format!("{}\n", LONG_A1));

    vault_sim()
        .args(["normalize", "0x000a1", "--short"])
        .assert()
        .success()
        .stdout("0xa1\n");

    vault_sim()
        .args(["normalize", "0xzz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-hex character"));
}
