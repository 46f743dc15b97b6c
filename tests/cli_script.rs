use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn shell(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ledger_history_cli").unwrap();
    cmd.env("LEDGER_HISTORY_HOME", home.path())
        .env("LEDGER_HISTORY_CLI_SCRIPT", "1");
    cmd
}

#[test]
fn script_mode_runs_undo_redo_flow() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("account-add Cash cash 100\nundo\nredo\nredo\nexit\n")
        .assert()
        .success()
        .stdout(contains("Done: Crear cuenta: Cash"))
        .stdout(contains("Undone: Crear cuenta: Cash"))
        .stdout(contains("Redone: Crear cuenta: Cash"))
        .stdout(contains("Nothing to redo."));

    let ledger = fs::read_to_string(home.path().join("ledger.json")).unwrap();
    assert!(ledger.contains("\"Cash\""));
    assert!(home.path().join("undo_history.json").exists());
}

#[test]
fn history_persists_between_sessions() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("account-add Cash\naccount-rename Cash Wallet\nexit\n")
        .assert()
        .success();

    shell(&home)
        .write_stdin("history\nundo\nundo\nundo\nexit\n")
        .assert()
        .success()
        .stdout(contains("Editar cuenta: Wallet"))
        .stdout(contains("Undone: Editar cuenta: Wallet"))
        .stdout(contains("Undone: Crear cuenta: Cash"))
        .stdout(contains("Nothing to undo."));
}

#[test]
fn batch_undo_requires_confirmation_flag() {
    let home = TempDir::new().unwrap();
    let csv = home.path().join("movimientos.csv");
    fs::write(
        &csv,
        "2024-06-01,Cash,expense,12.5,Cafe\n2024-06-02,Cash,income,100,Sueldo\n",
    )
    .unwrap();

    let script = format!(
        "account-add Cash\ntxn-import {}\nundo\nundo --yes\nexit\n",
        csv.display()
    );
    shell(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Done: Importar movimientos.csv (2 cambios)"))
        .stdout(contains("rerun `undo --yes` to confirm"))
        .stdout(contains("Undone: Importar movimientos.csv (2 cambios)"));
}

#[test]
fn bad_input_is_reported_without_aborting() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("frobnicate\naccount-add Cash\naccount-add cash\nundo\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `frobnicate`."))
        .stdout(contains("Undone: Crear cuenta: Cash"))
        .stdout(contains("Done: Crear cuenta: cash").not());
}
