#![doc(test(attr(deny(warnings))))]

//! Undo/redo history for a personal-finance ledger: reversible record
//! commands, a bounded command log persisted between sessions, and a small
//! shell to drive them.

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod history;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use commands::{BatchCommand, Command, RecordCommand};
pub use errors::{HistoryError, StoreError};
pub use history::{HistoryFile, UndoRedoManager};
pub use storage::{EntityStore, LedgerStore};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger history tracing initialized.");
    });
}
