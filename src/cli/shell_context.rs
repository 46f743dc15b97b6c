use dialoguer::theme::ColorfulTheme;
use tracing::warn;

use crate::{
    config::{ConfigManager, HistoryConfig},
    errors::CliError,
    history::{manager::DEFAULT_CONTEXT, UndoRedoManager},
    storage::LedgerStore,
    utils::paths,
};

use super::commands::{self, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: UndoRedoManager,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: HistoryConfig,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let store = open_store(&config_manager, config.last_project.as_deref())?;
        let manager = UndoRedoManager::from_config(Box::new(store), &config, &config_manager);
        Ok(Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            manager,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            last_command: None,
            running: true,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn project_name(&self) -> &str {
        self.config.last_project.as_deref().unwrap_or(DEFAULT_CONTEXT)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }
}

/// Opens the file-backed store for `project`, or the default ledger.
pub(crate) fn open_store(
    config_manager: &ConfigManager,
    project: Option<&str>,
) -> Result<LedgerStore, CliError> {
    let path = paths::ledger_file_in(config_manager.base_dir(), project);
    let store = LedgerStore::open(&path, project.unwrap_or(DEFAULT_CONTEXT))
        .map_err(|err| CliError::Command(format!("cannot open ledger: {err}")))?;
    for warning in store.warnings() {
        warn!(path = %path.display(), "{warning}");
    }
    Ok(store)
}
