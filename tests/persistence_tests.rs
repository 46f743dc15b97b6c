mod common;

use std::fs;

use common::{account, expense, temp_dir};
use ledger_history::{
    commands::{Command, RecordCommand},
    config::{ConfigManager, HistoryConfig},
    domain::{BudgetPeriod, BudgetRecord, CategoryKind, CategoryRecord, EntityKind},
    history::{EntryState, HistoryFile},
    utils::persistence::tmp_path,
    EntityStore, LedgerStore, UndoRedoManager,
};
use serde_json::{json, Value};

fn file_store(dir: &std::path::Path) -> Box<LedgerStore> {
    Box::new(LedgerStore::open(dir.join("ledger.json"), "Casa").expect("open ledger"))
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read history")).expect("parse history")
}

#[test]
fn history_survives_restart() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    let wallet = account("Wallet");
    let food = CategoryRecord::new("Comida", CategoryKind::Expense);

    let before = {
        let mut manager =
            UndoRedoManager::with_history_file(file_store(&dir), HistoryFile::new(&history), 30);
        manager.execute(Command::create(wallet.clone())).unwrap();
        manager.execute(Command::create(food.clone())).unwrap();
        manager
            .execute(
                Command::batch(
                    "Importar enero",
                    vec![
                        RecordCommand::create(expense(wallet.id, 10.0, "Cafe")),
                        RecordCommand::create(expense(wallet.id, 20.0, "Taxi")),
                    ],
                )
                .unwrap(),
            )
            .unwrap();
        manager
            .execute(Command::create(
                BudgetRecord::new(food.id, 200.0, BudgetPeriod::Monthly).with_category_name("Comida"),
            ))
            .unwrap();
        manager.undo().unwrap();
        manager.history()
    };

    let mut manager =
        UndoRedoManager::with_history_file(file_store(&dir), HistoryFile::new(&history), 30);
    assert!(manager.load_warnings().is_empty());
    assert_eq!(manager.history(), before);
    assert_eq!(manager.max_depth(), 30);
    assert_eq!(before[0].state, EntryState::Undone);
    assert_eq!(before[1].description, "Importar enero (2 cambios)");

    manager.undo_confirmed(|_| true).unwrap();
    assert_eq!(manager.store().list(EntityKind::Transaction).unwrap().len(), 0);
    manager.redo_confirmed(|_| true).unwrap();
    manager.redo().unwrap();
    assert_eq!(manager.store().list(EntityKind::Budget).unwrap().len(), 1);
}

#[test]
fn log_document_has_expected_shape() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    let wallet = account("Wallet");
    let mut manager =
        UndoRedoManager::with_history_file(file_store(&dir), HistoryFile::new(&history), 25);
    manager.execute(Command::create(wallet.clone())).unwrap();
    manager.execute(Command::delete(wallet.clone(), true)).unwrap();
    manager.undo().unwrap();

    let document = read_json(&history);
    assert_eq!(document["max_stack_size"], 25);
    let undo = document["undo_stack"].as_array().unwrap();
    let redo = document["redo_stack"].as_array().unwrap();
    assert_eq!(undo.len(), 1);
    assert_eq!(redo.len(), 1);

    let entry = &undo[0];
    for key in [
        "type",
        "timestamp",
        "entity_kind",
        "target_id",
        "before_state",
        "after_state",
        "description",
    ] {
        assert!(entry.get(key).is_some(), "missing {key}");
    }
    assert_eq!(entry["type"], "CreateAccount");
    assert_eq!(entry["description"], "Crear cuenta: Wallet");
    assert_eq!(redo[0]["type"], "DeleteAccount");
    assert_eq!(redo[0]["soft"], true);
}

#[test]
fn unknown_entries_are_skipped_with_warnings() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    let wallet = account("Wallet");
    let valid = {
        let mut manager = UndoRedoManager::with_history_file(
            Box::new(LedgerStore::in_memory("Scratch")),
            HistoryFile::new(dir.join("scratch.json")),
            25,
        );
        manager.execute(Command::create(wallet)).unwrap();
        read_json(&dir.join("scratch.json"))["undo_stack"][0].clone()
    };
    let document = json!({
        "max_stack_size": 25,
        "undo_stack": [
            {"type": "RenameLedger", "timestamp": "2024-06-01T10:00:00Z", "description": "?"},
            valid,
            {"type": "UpdateAccount", "timestamp": "2024-06-01T10:00:00Z", "target_id": null}
        ],
        "redo_stack": []
    });
    fs::write(&history, document.to_string()).unwrap();

    let manager = UndoRedoManager::with_history_file(
        Box::new(LedgerStore::in_memory("Casa")),
        HistoryFile::new(&history),
        25,
    );
    assert_eq!(manager.undo_len(), 1);
    assert_eq!(manager.load_warnings().len(), 2);
    assert_eq!(
        manager.peek_undo_description().as_deref(),
        Some("Crear cuenta: Wallet")
    );
}

#[test]
fn unreadable_file_starts_empty() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    fs::write(&history, "not json at all").unwrap();

    let manager = UndoRedoManager::with_history_file(
        Box::new(LedgerStore::in_memory("Casa")),
        HistoryFile::new(&history),
        25,
    );
    assert!(!manager.can_undo());
    assert!(!manager.can_redo());
    assert_eq!(manager.load_warnings().len(), 1);
}

#[test]
fn configured_limit_wins_over_stored_size() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    {
        let mut manager = UndoRedoManager::with_history_file(
            Box::new(LedgerStore::in_memory("Casa")),
            HistoryFile::new(&history),
            60,
        );
        for i in 0..40 {
            manager
                .execute(Command::create(account(&format!("Cuenta {i}"))))
                .unwrap();
        }
    }

    let manager = UndoRedoManager::with_history_file(
        Box::new(LedgerStore::in_memory("Casa")),
        HistoryFile::new(&history),
        15,
    );
    assert_eq!(manager.max_depth(), 15);
    assert_eq!(manager.undo_len(), 15);
    assert_eq!(
        manager.peek_undo_description().as_deref(),
        Some("Crear cuenta: Cuenta 39")
    );
}

#[test]
fn failed_history_write_keeps_store_change() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    fs::create_dir_all(tmp_path(&history)).unwrap();
    let wallet = account("Wallet");

    let mut manager = UndoRedoManager::with_history_file(
        Box::new(LedgerStore::in_memory("Casa")),
        HistoryFile::new(&history),
        25,
    );
    manager.execute(Command::create(wallet.clone())).unwrap();
    assert!(manager.store().exists(EntityKind::Account, wallet.id).unwrap());
    assert!(manager.can_undo());
    assert!(!history.exists());

    manager.undo().unwrap();
    assert!(!manager.store().exists(EntityKind::Account, wallet.id).unwrap());
}

#[test]
fn clear_and_depth_changes_are_persisted() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    let mut manager = UndoRedoManager::with_history_file(
        Box::new(LedgerStore::in_memory("Casa")),
        HistoryFile::new(&history),
        25,
    );
    manager.execute(Command::create(account("A"))).unwrap();
    manager.set_max_depth(3);
    assert_eq!(read_json(&history)["max_stack_size"], 10);

    manager.clear();
    let document = read_json(&history);
    assert_eq!(document["undo_stack"], json!([]));
    assert_eq!(document["redo_stack"], json!([]));
}

#[test]
fn manager_from_config_uses_configured_paths() {
    let dir = temp_dir();
    let config_manager = ConfigManager::with_base_dir(dir.clone()).unwrap();
    let config = HistoryConfig {
        undo_limit: 12,
        history_file: Some(dir.join("custom_history.json")),
        ..HistoryConfig::default()
    };
    config_manager.save(&config).unwrap();

    let loaded = config_manager.load().unwrap();
    let mut manager = UndoRedoManager::from_config(
        Box::new(LedgerStore::in_memory("Casa")),
        &loaded,
        &config_manager,
    );
    assert_eq!(manager.max_depth(), 12);
    assert_eq!(manager.context(), Some("default"));
    manager.execute(Command::create(account("A"))).unwrap();
    assert!(dir.join("custom_history.json").exists());
}

#[test]
fn reload_discards_unsaved_state() {
    let dir = temp_dir();
    let history = dir.join("undo_history.json");
    let mut manager = UndoRedoManager::with_history_file(
        Box::new(LedgerStore::in_memory("Casa")),
        HistoryFile::new(&history),
        25,
    );
    manager.execute(Command::create(account("A"))).unwrap();
    manager.execute(Command::create(account("B"))).unwrap();
    fs::write(&history, "{}").unwrap();

    manager.reload();
    assert!(!manager.can_undo());
    assert!(manager.load_warnings().is_empty());
}
