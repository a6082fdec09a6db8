mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn estate(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("estate-ledger"));
    cmd.arg("--data-dir").arg(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    common::write_catalogs(dir.path())?;

    estate(dir.path())
        .args(["assign", "--player", "Ann", "--area", "Dark Blue"])
        .args(["--asset", "Boardwalk", "--houses", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SUCCESS: Asset 'Boardwalk' (Dark Blue) assigned to player 'Ann' with 2 houses.",
        ))
        .stdout(predicate::str::contains("paid $800 to Treasurer"));

    estate(dir.path())
        .args(["balance", "--player", "Ann"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"balance\": 700"));

    estate(dir.path())
        .args(["buy", "--player", "Bob", "--class", "Utilities", "--asset", "Water Works"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SUCCESS:"));

    estate(dir.path())
        .args(["players"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Ann\"").and(predicate::str::contains("\"Bob\"")));

    Ok(())
}

#[test]
fn test_statement_is_csv() {
    let dir = tempdir().unwrap();

    estate(dir.path())
        .args(["rent", "--from", "Ann", "--to", "Bob", "--amount", "75"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SUCCESS: Player 'Ann' has paid $75 to player 'Bob'.",
        ));

    estate(dir.path())
        .args(["statement", "--player", "Ann"])
        .assert()
        .success()
        .stdout("payment amount,payment source\n1500,Treasurer\n-75,Bob\n");
}

#[test]
fn test_catalog_listing() {
    let dir = tempdir().unwrap();
    common::write_catalogs(dir.path()).unwrap();

    estate(dir.path())
        .arg("areas")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Brown\"").and(predicate::str::contains("\"Dark Blue\"")));

    estate(dir.path())
        .args(["assets", "--area", "Brown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Old Kent Road"));

    estate(dir.path())
        .args(["assets", "--area", "Green"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: Invalid argument: Area 'Green' not found"));
}

#[test]
fn test_rent_quote() {
    let dir = tempdir().unwrap();
    common::write_catalogs(dir.path()).unwrap();

    estate(dir.path())
        .args(["quote", "--asset", "Boardwalk"])
        .assert()
        .success()
        .stdout("null\n");

    estate(dir.path())
        .args(["assign", "--player", "Ann", "--area", "Dark Blue"])
        .args(["--asset", "Boardwalk", "--houses", "4"])
        .assert()
        .success();

    estate(dir.path())
        .args(["quote", "--asset", "Boardwalk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": 1700"))
        .stdout(predicate::str::contains("\"owner\": \"Ann\""));
}
