use tracing::{error, info, warn};

use crate::{
    commands::Command,
    config::{ConfigManager, HistoryConfig},
    errors::{HistoryError, Result},
    storage::EntityStore,
};

use super::{
    Action, Direction, EntryState, HistoryEntry, HistoryFile, Outcome,
    stacks::CommandStacks,
};

/// Context name used when no project has been selected.
pub const DEFAULT_CONTEXT: &str = "default";

/// Owns the entity store and the undo/redo stacks, and keeps the history
/// file in step with every change to them.
///
/// Persistence problems are logged and never undo a successful store
/// operation.
pub struct UndoRedoManager {
    store: Box<dyn EntityStore>,
    stacks: CommandStacks,
    file: Option<HistoryFile>,
    context: Option<String>,
    load_warnings: Vec<String>,
}

impl UndoRedoManager {
    /// In-memory history that is never written to disk.
    pub fn new(store: Box<dyn EntityStore>, max_depth: usize) -> Self {
        Self {
            store,
            stacks: CommandStacks::new(max_depth),
            file: None,
            context: None,
            load_warnings: Vec::new(),
        }
    }

    /// Restores history from `file`. `max_depth` takes precedence over the
    /// depth recorded in the file.
    pub fn with_history_file(
        store: Box<dyn EntityStore>,
        file: HistoryFile,
        max_depth: usize,
    ) -> Self {
        let report = file.load(max_depth);
        if let Some(stored) = report.stored_max_depth {
            if stored != report.stacks.max_depth() {
                info!(
                    stored,
                    configured = report.stacks.max_depth(),
                    "using configured history depth"
                );
            }
        }
        Self {
            store,
            stacks: report.stacks,
            file: Some(file),
            context: None,
            load_warnings: report.warnings,
        }
    }

    pub fn from_config(
        store: Box<dyn EntityStore>,
        config: &HistoryConfig,
        config_manager: &ConfigManager,
    ) -> Self {
        let file = HistoryFile::new(config_manager.history_file(config));
        let mut manager = Self::with_history_file(store, file, config.effective_undo_limit());
        manager.context = Some(
            config
                .last_project
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        );
        manager
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn EntityStore {
        self.store.as_mut()
    }

    /// Swaps the backing store, returning the previous one. History is left
    /// alone; pair with [`UndoRedoManager::switch_context`] when the new store
    /// holds unrelated data.
    pub fn replace_store(&mut self, store: Box<dyn EntityStore>) -> Box<dyn EntityStore> {
        std::mem::replace(&mut self.store, store)
    }

    pub fn history_file(&self) -> Option<&HistoryFile> {
        self.file.as_ref()
    }

    /// Entries skipped while loading the history file.
    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Runs `command` and records it. A new command discards the redo branch.
    pub fn execute(&mut self, command: impl Into<Command>) -> Result<Outcome> {
        let command = command.into();
        if let Err(err) = command.execute(self.store.as_mut()) {
            error!(command = %command.description(), "execute failed: {err}");
            return Err(err);
        }
        let outcome = Outcome {
            action: Action::Executed,
            description: command.description(),
            is_batch: command.is_batch(),
            evicted: self.stacks.push_executed(command),
        };
        info!(command = %outcome.description, "executed");
        self.persist();
        Ok(outcome)
    }

    pub fn undo(&mut self) -> Result<Outcome> {
        let command = self
            .stacks
            .pop_undo()
            .ok_or(HistoryError::EmptyStack(Direction::Undo))?;
        if let Err(err) = command.undo(self.store.as_mut()) {
            self.recover(Direction::Undo, command, &err);
            return Err(err);
        }
        let outcome = Outcome {
            action: Action::Undone,
            description: command.description(),
            is_batch: command.is_batch(),
            evicted: 0,
        };
        self.stacks.push_undone(command);
        info!(command = %outcome.description, "undone");
        self.persist();
        Ok(outcome)
    }

    pub fn redo(&mut self) -> Result<Outcome> {
        let command = self
            .stacks
            .pop_redo()
            .ok_or(HistoryError::EmptyStack(Direction::Redo))?;
        if let Err(err) = command.redo(self.store.as_mut()) {
            self.recover(Direction::Redo, command, &err);
            return Err(err);
        }
        let outcome = Outcome {
            action: Action::Redone,
            description: command.description(),
            is_batch: command.is_batch(),
            evicted: 0,
        };
        let evicted = self.stacks.push_redone(command);
        info!(command = %outcome.description, "redone");
        self.persist();
        Ok(Outcome { evicted, ..outcome })
    }

    /// Like [`UndoRedoManager::undo`], but asks `confirm` before reverting a
    /// batch. A declined confirmation leaves everything untouched.
    pub fn undo_confirmed<F>(&mut self, confirm: F) -> Result<Outcome>
    where
        F: FnOnce(&str) -> bool,
    {
        if let Some(description) = self.pending_batch(Direction::Undo) {
            if !confirm(&description) {
                return Err(HistoryError::Cancelled);
            }
        }
        self.undo()
    }

    pub fn redo_confirmed<F>(&mut self, confirm: F) -> Result<Outcome>
    where
        F: FnOnce(&str) -> bool,
    {
        if let Some(description) = self.pending_batch(Direction::Redo) {
            if !confirm(&description) {
                return Err(HistoryError::Cancelled);
            }
        }
        self.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.stacks.undo_len() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.stacks.redo_len() > 0
    }

    pub fn peek_undo_description(&self) -> Option<String> {
        self.stacks.peek_undo().map(Command::description)
    }

    pub fn peek_redo_description(&self) -> Option<String> {
        self.stacks.peek_redo().map(Command::description)
    }

    pub fn is_next_undo_batch(&self) -> bool {
        self.stacks.peek_undo().is_some_and(Command::is_batch)
    }

    pub fn is_next_redo_batch(&self) -> bool {
        self.stacks.peek_redo().is_some_and(Command::is_batch)
    }

    pub fn undo_len(&self) -> usize {
        self.stacks.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.stacks.redo_len()
    }

    pub fn max_depth(&self) -> usize {
        self.stacks.max_depth()
    }

    /// Timeline, furthest future first: the redo stack bottom to top, then
    /// the undo stack from most recent to oldest.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let entry = |command: &Command, state| HistoryEntry {
            description: command.description(),
            type_name: command.type_name(),
            timestamp: command.timestamp(),
            is_batch: command.is_batch(),
            state,
        };
        self.stacks
            .redo_entries()
            .map(|command| entry(command, EntryState::Undone))
            .chain(
                self.stacks
                    .undo_entries()
                    .rev()
                    .map(|command| entry(command, EntryState::Applied)),
            )
            .collect()
    }

    /// Drops both stacks and persists the empty log.
    pub fn clear(&mut self) {
        self.stacks.clear();
        info!("history cleared");
        self.persist();
    }

    /// Sets a new depth (clamped to the supported range), evicting the oldest
    /// undo entries if needed. Returns the depth actually applied.
    pub fn set_max_depth(&mut self, depth: usize) -> usize {
        let evicted = self.stacks.set_max_depth(depth);
        let applied = self.stacks.max_depth();
        if applied != depth {
            warn!(requested = depth, applied, "history depth clamped");
        }
        info!(depth = applied, evicted, "history depth updated");
        self.persist();
        applied
    }

    /// Records the active project. Moving to a different project clears the
    /// history, since its commands refer to the previous project's records.
    /// Returns whether the history was cleared.
    pub fn switch_context(&mut self, context: &str) -> bool {
        if self.context.as_deref() == Some(context) {
            return false;
        }
        let cleared = self.context.is_some();
        if cleared {
            self.clear();
        }
        info!(context, "history context switched");
        self.context = Some(context.to_string());
        cleared
    }

    /// Discards in-memory stacks and re-reads the history file.
    pub fn reload(&mut self) {
        let Some(file) = self.file.as_ref() else {
            return;
        };
        let report = file.load(self.stacks.max_depth());
        self.stacks = report.stacks;
        self.load_warnings = report.warnings;
    }

    fn pending_batch(&self, direction: Direction) -> Option<String> {
        let next = match direction {
            Direction::Undo => self.stacks.peek_undo(),
            Direction::Redo => self.stacks.peek_redo(),
        };
        next.filter(|command| command.is_batch())
            .map(Command::description)
    }

    /// Places a command whose undo/redo failed. It goes back where it came
    /// from if the store is unchanged; a partially applied batch is dropped.
    fn recover(&mut self, direction: Direction, command: Command, err: &HistoryError) {
        let store_unchanged = err
            .batch_failure()
            .map_or(true, |failure| failure.store_unchanged());
        if store_unchanged {
            warn!(command = %command.description(), "{direction} failed: {err}");
            match direction {
                Direction::Undo => self.stacks.restore_undo(command),
                Direction::Redo => self.stacks.restore_redo(command),
            }
        } else {
            error!(
                command = %command.description(),
                "{direction} left a partial batch; dropping it from history: {err}"
            );
            self.persist();
        }
    }

    fn persist(&self) {
        let Some(file) = self.file.as_ref() else {
            return;
        };
        if let Err(err) = file.save(&self.stacks) {
            warn!(path = %file.path().display(), "failed to save history: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountKind, AccountRecord, EntityKind};
    use crate::storage::LedgerStore;

    fn manager() -> UndoRedoManager {
        UndoRedoManager::new(Box::new(LedgerStore::in_memory("Test")), 10)
    }

    fn account(name: &str) -> AccountRecord {
        AccountRecord::new(name, AccountKind::Bank)
    }

    #[test]
    fn empty_stacks_report_empty() {
        let mut manager = manager();
        assert!(matches!(
            manager.undo(),
            Err(HistoryError::EmptyStack(Direction::Undo))
        ));
        assert!(matches!(
            manager.redo(),
            Err(HistoryError::EmptyStack(Direction::Redo))
        ));
    }

    #[test]
    fn execute_undo_redo_cycle() {
        let mut manager = manager();
        let cash = account("Cash");
        manager.execute(Command::create(cash.clone())).unwrap();
        assert_eq!(
            manager.peek_undo_description().as_deref(),
            Some("Crear cuenta: Cash")
        );

        let outcome = manager.undo().unwrap();
        assert_eq!(outcome.action, Action::Undone);
        assert!(!manager.store().exists(EntityKind::Account, cash.id).unwrap());
        assert!(manager.can_redo());

        manager.redo().unwrap();
        assert!(manager.store().exists(EntityKind::Account, cash.id).unwrap());
        assert!(!manager.can_redo());
    }

    #[test]
    fn history_lists_future_then_past() {
        let mut manager = manager();
        for name in ["A", "B", "C"] {
            manager.execute(Command::create(account(name))).unwrap();
        }
        manager.undo().unwrap();
        manager.undo().unwrap();

        let timeline: Vec<_> = manager
            .history()
            .into_iter()
            .map(|entry| (entry.description, entry.state))
            .collect();
        assert_eq!(
            timeline,
            vec![
                ("Crear cuenta: C".to_string(), EntryState::Undone),
                ("Crear cuenta: B".to_string(), EntryState::Undone),
                ("Crear cuenta: A".to_string(), EntryState::Applied),
            ]
        );
    }

    #[test]
    fn declined_batch_confirmation_cancels() {
        let mut manager = manager();
        let batch = Command::batch(
            "Alta masiva",
            vec![
                crate::commands::RecordCommand::create(account("A")),
                crate::commands::RecordCommand::create(account("B")),
            ],
        )
        .unwrap();
        manager.execute(batch).unwrap();
        assert!(manager.is_next_undo_batch());

        let mut asked = None;
        let result = manager.undo_confirmed(|description| {
            asked = Some(description.to_string());
            false
        });
        assert!(matches!(result, Err(HistoryError::Cancelled)));
        assert_eq!(asked.as_deref(), Some("Alta masiva (2 cambios)"));
        assert_eq!(manager.undo_len(), 1);
    }

    #[test]
    fn switching_context_clears_only_on_change() {
        let mut manager = manager();
        assert!(!manager.switch_context("Casa"));
        manager.execute(Command::create(account("A"))).unwrap();
        assert!(!manager.switch_context("Casa"));
        assert_eq!(manager.undo_len(), 1);
        assert!(manager.switch_context("Viaje"));
        assert_eq!(manager.undo_len(), 0);
    }

    #[test]
    fn set_max_depth_clamps_and_evicts() {
        let mut manager = UndoRedoManager::new(Box::new(LedgerStore::in_memory("Test")), 50);
        for index in 0..20 {
            manager
                .execute(Command::create(account(&format!("A{index}"))))
                .unwrap();
        }
        assert_eq!(manager.set_max_depth(5), 10);
        assert_eq!(manager.undo_len(), 10);
        assert_eq!(manager.set_max_depth(400), 100);
    }
}
