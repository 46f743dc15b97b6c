use std::collections::VecDeque;

use crate::{commands::Command, config::clamp_depth};

/// The paired undo/redo stacks. Both are stored oldest first; the top of
/// each stack is its back.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStacks {
    undo: VecDeque<Command>,
    redo: VecDeque<Command>,
    max_depth: usize,
}

impl CommandStacks {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            max_depth: clamp_depth(max_depth),
        }
    }

    /// Builds stacks from persisted entries, trimming the undo side to depth.
    pub fn from_parts(undo: Vec<Command>, redo: Vec<Command>, max_depth: usize) -> Self {
        let mut stacks = Self {
            undo: undo.into(),
            redo: redo.into(),
            max_depth: clamp_depth(max_depth),
        };
        stacks.evict();
        stacks
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Applies a new (clamped) depth and returns how many entries were evicted.
    pub fn set_max_depth(&mut self, depth: usize) -> usize {
        self.max_depth = clamp_depth(depth);
        self.evict()
    }

    /// Records a freshly executed command. Any redo branch is discarded.
    pub fn push_executed(&mut self, command: Command) -> usize {
        self.redo.clear();
        self.undo.push_back(command);
        self.evict()
    }

    /// Records a redone command without touching the rest of the redo stack.
    pub fn push_redone(&mut self, command: Command) -> usize {
        self.undo.push_back(command);
        self.evict()
    }

    pub fn push_undone(&mut self, command: Command) {
        self.redo.push_back(command);
    }

    pub fn pop_undo(&mut self) -> Option<Command> {
        self.undo.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<Command> {
        self.redo.pop_back()
    }

    /// Puts a command back on the undo stack after a failed undo.
    pub fn restore_undo(&mut self, command: Command) {
        self.undo.push_back(command);
    }

    /// Puts a command back on the redo stack after a failed redo.
    pub fn restore_redo(&mut self, command: Command) {
        self.redo.push_back(command);
    }

    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo.back()
    }

    pub fn peek_redo(&self) -> Option<&Command> {
        self.redo.back()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Oldest first.
    pub fn undo_entries(&self) -> impl DoubleEndedIterator<Item = &Command> {
        self.undo.iter()
    }

    /// Oldest first.
    pub fn redo_entries(&self) -> impl DoubleEndedIterator<Item = &Command> {
        self.redo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn evict(&mut self) -> usize {
        let excess = self.undo.len().saturating_sub(self.max_depth);
        self.undo.drain(..excess);
        excess
    }
}
