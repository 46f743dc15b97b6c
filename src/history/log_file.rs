use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    errors::{HistoryError, Result},
    utils::persistence,
};

use super::{
    codec::{self, LogDocument},
    stacks::CommandStacks,
};

/// Result of reading the history log. Loading never fails: anything that
/// cannot be read is reported as a warning and replaced by empty stacks.
#[derive(Debug)]
pub struct LoadReport {
    pub stacks: CommandStacks,
    /// Depth recorded in the file, before the configured limit overrides it.
    pub stored_max_depth: Option<usize>,
    pub warnings: Vec<String>,
}

/// The JSON file holding both stacks between sessions.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the log; `max_depth` wins over the depth stored in the file.
    pub fn load(&self, max_depth: usize) -> LoadReport {
        let empty = |warnings: Vec<String>| LoadReport {
            stacks: CommandStacks::new(max_depth),
            stored_max_depth: None,
            warnings,
        };
        if !self.path.exists() {
            return empty(Vec::new());
        }
        let document = fs::read_to_string(&self.path)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                serde_json::from_str::<LogDocument>(&raw).map_err(|err| err.to_string())
            });
        let document = match document {
            Ok(document) => document,
            Err(err) => {
                let message = format!(
                    "could not read history file {}: {err}",
                    self.path.display()
                );
                warn!("{message}");
                return empty(vec![message]);
            }
        };

        let decoded = codec::decode_document(document);
        for warning in &decoded.warnings {
            warn!(path = %self.path.display(), "{warning}");
        }
        let stacks = CommandStacks::from_parts(decoded.undo, decoded.redo, max_depth);
        debug!(
            path = %self.path.display(),
            undo = stacks.undo_len(),
            redo = stacks.redo_len(),
            "history loaded"
        );
        LoadReport {
            stacks,
            stored_max_depth: Some(decoded.max_stack_size),
            warnings: decoded.warnings,
        }
    }

    /// Writes both stacks atomically; the previous file survives a failed write.
    pub fn save(&self, stacks: &CommandStacks) -> Result<()> {
        let document = codec::encode_stacks(stacks)?;
        persistence::save_json(&document, &self.path)
            .map_err(|err| HistoryError::PersistenceFailure(err.to_string()))?;
        debug!(
            path = %self.path.display(),
            undo = stacks.undo_len(),
            redo = stacks.redo_len(),
            "history saved"
        );
        Ok(())
    }
}
