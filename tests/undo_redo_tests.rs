mod common;

use common::{account, expense, flaky_store};
use ledger_history::{
    commands::{Command, RecordCommand},
    domain::{
        AccountKind, AccountRecord, BudgetPeriod, BudgetRecord, CategoryKind, CategoryRecord,
        EntityKind, Record,
    },
    errors::{ErrorCategory, HistoryError, StoreError},
    history::{manager::DEFAULT_CONTEXT, Direction},
    EntityStore, LedgerStore, UndoRedoManager,
};

fn manager_with(records: &[Record]) -> UndoRedoManager {
    let mut store = LedgerStore::in_memory("Scenarios");
    for record in records {
        store
            .create(record.kind(), record.id(), record)
            .expect("seed record");
    }
    UndoRedoManager::new(Box::new(store), 25)
}

fn snapshot(manager: &UndoRedoManager) -> Vec<Record> {
    EntityKind::ALL
        .into_iter()
        .flat_map(|kind| manager.store().list(kind).expect("list records"))
        .collect()
}

#[test]
fn create_transaction_undo_redo_restores_identical_record() {
    let wallet = account("Wallet");
    let mut manager = manager_with(&[wallet.clone().into()]);
    let txn = expense(wallet.id, 100.0, "Supermercado");

    manager.execute(Command::create(txn.clone())).unwrap();
    assert!(manager.store().exists(EntityKind::Transaction, txn.id).unwrap());

    manager.undo().unwrap();
    assert!(!manager.store().exists(EntityKind::Transaction, txn.id).unwrap());

    manager.redo().unwrap();
    assert_eq!(
        manager.store().get(EntityKind::Transaction, txn.id).unwrap(),
        Record::from(txn)
    );
}

#[test]
fn update_account_undo_then_empty_stack() {
    let cash = AccountRecord::new("Cash", AccountKind::Cash);
    let mut manager = manager_with(&[cash.clone().into()]);
    let mut wallet = cash.clone();
    wallet.name = "Wallet".into();

    manager.execute(Command::update(cash.clone(), wallet).unwrap()).unwrap();
    assert_eq!(
        manager.store().get(EntityKind::Account, cash.id).unwrap().label(),
        "Wallet"
    );

    let outcome = manager.undo().unwrap();
    assert_eq!(outcome.description, "Editar cuenta: Wallet");
    assert_eq!(
        manager.store().get(EntityKind::Account, cash.id).unwrap(),
        Record::from(cash.clone())
    );

    let err = manager.undo().unwrap_err();
    assert!(matches!(err, HistoryError::EmptyStack(Direction::Undo)));
    assert_eq!(
        manager.store().get(EntityKind::Account, cash.id).unwrap().label(),
        "Cash"
    );
    assert!(!err.is_user_visible());
}

#[test]
fn every_command_type_is_symmetric() {
    let wallet = account("Wallet");
    let food = CategoryRecord::new("Comida", CategoryKind::Expense);
    let txn = expense(wallet.id, 25.0, "Almuerzo").with_category(food.id);
    let budget =
        BudgetRecord::new(food.id, 300.0, BudgetPeriod::Monthly).with_category_name("Comida");
    // Listed in the order the store reports kinds.
    let seeded: Vec<Record> = vec![
        txn.clone().into(),
        wallet.clone().into(),
        food.clone().into(),
        budget.clone().into(),
    ];

    let mut renamed = wallet.clone();
    renamed.name = "Billetera".into();
    let mut recategorized = food.clone();
    recategorized.kind = CategoryKind::Transfer;
    let mut bigger = txn.clone();
    bigger.amount = 40.0;
    let mut loose = budget.clone();
    loose.limit = 500.0;

    let commands = vec![
        Command::create(account("Ahorros")),
        Command::create(CategoryRecord::new("Renta", CategoryKind::Expense)),
        Command::create(expense(wallet.id, 12.0, "Cafe")),
        Command::create(BudgetRecord::new(food.id, 80.0, BudgetPeriod::Yearly)),
        Command::update(wallet.clone(), renamed).unwrap(),
        Command::update(food.clone(), recategorized).unwrap(),
        Command::update(txn.clone(), bigger).unwrap(),
        Command::update(budget.clone(), loose).unwrap(),
        Command::delete(wallet, false),
        Command::delete(food, true),
        Command::delete(txn, false),
        Command::delete(budget, true),
    ];

    for command in commands {
        let type_name = command.type_name();
        let mut once = manager_with(&seeded);
        once.execute(command.clone()).unwrap();

        let mut cycled = manager_with(&seeded);
        cycled.execute(command).unwrap();
        cycled.undo().unwrap();
        assert_eq!(snapshot(&cycled), seeded, "{type_name} undo");
        cycled.redo().unwrap();
        assert_eq!(snapshot(&cycled), snapshot(&once), "{type_name} redo");
    }
}

#[test]
fn execute_clears_redo_stack() {
    let mut manager = manager_with(&[]);
    manager.execute(Command::create(account("A"))).unwrap();
    manager.execute(Command::create(account("B"))).unwrap();
    manager.undo().unwrap();
    manager.undo().unwrap();
    assert_eq!(manager.redo_len(), 2);

    manager.execute(Command::create(account("C"))).unwrap();
    assert!(!manager.can_redo());
    assert_eq!(manager.undo_len(), 1);
}

#[test]
fn depth_bound_keeps_most_recent_entries() {
    let mut manager = UndoRedoManager::new(Box::new(LedgerStore::in_memory("Depth")), 10);
    let accounts: Vec<_> = (0..12).map(|i| account(&format!("Cuenta {i}"))).collect();
    for record in &accounts {
        manager.execute(Command::create(record.clone())).unwrap();
    }
    assert_eq!(manager.undo_len(), 10);

    for _ in 0..10 {
        manager.undo().unwrap();
    }
    assert!(!manager.can_undo());
    assert!(manager.store().exists(EntityKind::Account, accounts[0].id).unwrap());
    assert!(manager.store().exists(EntityKind::Account, accounts[1].id).unwrap());
    assert!(!manager.store().exists(EntityKind::Account, accounts[2].id).unwrap());
}

#[test]
fn redo_onto_full_stack_evicts_oldest() {
    let mut manager = UndoRedoManager::new(Box::new(LedgerStore::in_memory("Depth")), 20);
    for i in 0..11 {
        manager
            .execute(Command::create(account(&format!("Cuenta {i}"))))
            .unwrap();
    }
    manager.undo().unwrap();
    assert_eq!(manager.set_max_depth(10), 10);
    assert_eq!(manager.undo_len(), 10);

    let outcome = manager.redo().unwrap();
    assert_eq!(outcome.evicted, 1);
    assert_eq!(manager.undo_len(), 10);
    assert_eq!(
        manager.history().last().map(|entry| entry.description.clone()),
        Some("Crear cuenta: Cuenta 1".to_string())
    );
}

#[test]
fn delete_account_undo_recreates_snapshot() {
    let savings = AccountRecord::new("Savings", AccountKind::Savings).with_balance(500.0);
    let mut manager = manager_with(&[savings.clone().into()]);

    manager.execute(Command::delete(savings.clone(), false)).unwrap();
    assert!(!manager.store().exists(EntityKind::Account, savings.id).unwrap());

    manager.undo().unwrap();
    assert_eq!(
        manager.store().get(EntityKind::Account, savings.id).unwrap(),
        Record::from(savings)
    );
}

#[test]
fn externally_deleted_target_keeps_command_on_undo_stack() {
    let cash = account("Cash");
    let mut manager = manager_with(&[cash.clone().into()]);
    let mut renamed = cash.clone();
    renamed.name = "Wallet".into();
    manager.execute(Command::update(cash.clone(), renamed).unwrap()).unwrap();

    manager
        .store_mut()
        .delete(EntityKind::Account, cash.id, false)
        .unwrap();

    let err = manager.undo().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::RecordMissing);
    assert!(err.is_user_visible());
    assert_eq!(manager.undo_len(), 1);
    assert_eq!(manager.redo_len(), 0);
    assert_eq!(
        manager.peek_undo_description().as_deref(),
        Some("Editar cuenta: Wallet")
    );
}

#[test]
fn unavailable_store_leaves_stacks_untouched() {
    let (store, handle) = flaky_store();
    let mut manager = UndoRedoManager::new(Box::new(store), 25);
    let first = account("Primera");
    manager.execute(Command::create(first.clone())).unwrap();

    handle.faults.borrow_mut().set_offline(true);
    let err = manager.execute(Command::create(account("Segunda"))).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::StoreUnavailable);
    assert_eq!(manager.undo_len(), 1);

    let err = manager.undo().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::StoreUnavailable);
    assert_eq!(manager.undo_len(), 1);
    assert_eq!(manager.redo_len(), 0);

    handle.faults.borrow_mut().set_offline(false);
    manager.undo().unwrap();
    assert!(!handle.exists(EntityKind::Account, first.id));
}

#[test]
fn validation_rejection_is_not_recorded() {
    let mut manager = manager_with(&[account("Cash").into()]);
    let err = manager.execute(Command::create(account("cash"))).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValidationRejected);
    assert!(!manager.can_undo());
}

#[test]
fn failed_redo_returns_command_to_redo_stack() {
    let (store, handle) = flaky_store();
    let mut manager = UndoRedoManager::new(Box::new(store), 25);
    manager.execute(Command::create(account("Cash"))).unwrap();
    manager.undo().unwrap();

    handle
        .faults
        .borrow_mut()
        .fail_next(StoreError::ValidationRejected("locked".into()));
    assert!(manager.redo().is_err());
    assert_eq!(manager.redo_len(), 1);
    assert_eq!(manager.undo_len(), 0);
    manager.redo().unwrap();
    assert_eq!(handle.count(EntityKind::Account), 1);
}

#[test]
fn clear_disables_undo_and_redo() {
    let mut manager = manager_with(&[]);
    manager.execute(Command::create(account("A"))).unwrap();
    manager.execute(Command::create(account("B"))).unwrap();
    manager.undo().unwrap();
    manager.clear();
    assert!(!manager.can_undo());
    assert!(!manager.can_redo());
    assert!(manager.peek_undo_description().is_none());
    assert!(manager.history().is_empty());
}

#[test]
fn soft_deleted_record_is_restored_in_place() {
    let food = CategoryRecord::new("Comida", CategoryKind::Expense);
    let mut manager = manager_with(&[food.clone().into()]);
    manager
        .execute(RecordCommand::delete(food.clone()).soft_delete(true))
        .unwrap();
    assert!(!manager
        .store()
        .get(EntityKind::Category, food.id)
        .unwrap()
        .is_active());

    manager.undo().unwrap();
    assert!(manager
        .store()
        .get(EntityKind::Category, food.id)
        .unwrap()
        .is_active());
}

#[test]
fn new_managers_have_no_context_until_switched() {
    let mut manager = manager_with(&[]);
    assert_eq!(manager.context(), None);
    manager.switch_context(DEFAULT_CONTEXT);
    assert_eq!(manager.context(), Some(DEFAULT_CONTEXT));
}
