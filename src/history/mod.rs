//! Bounded undo/redo history, its on-disk log and the manager driving both.

pub mod codec;
pub mod log_file;
pub mod manager;
pub mod stacks;

use std::fmt;

use chrono::{DateTime, Utc};

pub use log_file::{HistoryFile, LoadReport};
pub use manager::UndoRedoManager;
pub use stacks::CommandStacks;

/// Which stack an operation draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Undo => "undo",
            Direction::Redo => "redo",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Executed,
    Undone,
    Redone,
}

impl Action {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Executed => "Done",
            Action::Undone => "Undone",
            Action::Redone => "Redone",
        }
    }
}

/// What a successful execute/undo/redo did.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub action: Action,
    pub description: String,
    pub is_batch: bool,
    /// Entries dropped from the bottom of the undo stack to stay within depth.
    pub evicted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// On the undo stack: currently applied.
    Applied,
    /// On the redo stack: reverted and available to redo.
    Undone,
}

/// One line of the history timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub description: String,
    pub type_name: String,
    pub timestamp: DateTime<Utc>,
    pub is_batch: bool,
    pub state: EntryState,
}
