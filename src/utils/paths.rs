use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".ledger_history";
const HOME_ENV: &str = "LEDGER_HISTORY_HOME";
const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "undo_history.json";
const LEDGER_FILE: &str = "ledger.json";

/// Returns the application data directory, defaulting to `~/.ledger_history`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Default location of the persisted undo/redo log.
pub fn history_file_in(base: &std::path::Path) -> PathBuf {
    base.join(HISTORY_FILE)
}

/// Default location of the file-backed ledger store for a project.
pub fn ledger_file_in(base: &std::path::Path, project: Option<&str>) -> PathBuf {
    match project {
        Some(name) => base
            .join("projects")
            .join(format!("{}.json", canonical_name(name))),
        None => base.join(LEDGER_FILE),
    }
}

/// Lower-cases a name and replaces anything outside `[a-z0-9]` with `_`.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}
