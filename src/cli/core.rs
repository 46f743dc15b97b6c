//! Shell dispatch, error reporting, and helpers shared by command handlers.

use std::io;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    commands::Command,
    domain::{AccountRecord, BudgetRecord, CategoryRecord, EntityKind, Record},
    errors::{ErrorCategory, HistoryError},
    history::{Direction, Outcome},
    storage::EntityStore,
};

use super::commands::CommandDefinition;
use super::io as cli_io;
pub use super::shell_context::{CliMode, ShellContext};
pub use crate::errors::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.print_warning(&format!("Unknown command `{raw}`."));
            self.print_hint("Type `help` to list available commands.");
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!(
            "ledger[{}] undo:{} redo:{} > ",
            self.project_name(),
            self.manager.undo_len(),
            self.manager.redo_len()
        )
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Command(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::History(err) if !err.is_user_visible() => {
                self.print_warning(&err.to_string());
                Ok(())
            }
            CommandError::History(err) => {
                self.print_error(&err.to_string());
                if err.category() == ErrorCategory::StoreUnavailable {
                    self.print_hint("The change was not applied; try again once the ledger is reachable.");
                }
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }

    /// Prints warnings collected while restoring the persisted history.
    pub(crate) fn report_load_warnings(&self) {
        for warning in self.manager.load_warnings() {
            self.print_warning(&format!("History: {warning}"));
        }
    }

    /// Executes `command` through the history manager and reports the result.
    pub(crate) fn run_command(&mut self, command: impl Into<Command>) -> CommandResult {
        let outcome = self.manager.execute(command)?;
        self.report_outcome(&outcome);
        Ok(())
    }

    /// Undo or redo one step. Batches need confirmation: a prompt in
    /// interactive mode, `--yes` in script mode.
    pub(crate) fn step(&mut self, direction: Direction, assume_yes: bool) -> CommandResult {
        let mode = self.mode;
        let theme = &self.theme;
        let confirm = |description: &str| -> bool {
            if assume_yes {
                return true;
            }
            match mode {
                CliMode::Script => {
                    cli_io::print_warning(format!(
                        "`{description}` is a batch; rerun `{direction} --yes` to confirm."
                    ));
                    false
                }
                CliMode::Interactive => cli_io::confirm_action(
                    theme,
                    &format!("{direction} \"{description}\"?"),
                    false,
                )
                .unwrap_or(false),
            }
        };
        let result = match direction {
            Direction::Undo => self.manager.undo_confirmed(confirm),
            Direction::Redo => self.manager.redo_confirmed(confirm),
        };
        match result {
            Ok(outcome) => {
                self.report_outcome(&outcome);
                Ok(())
            }
            Err(HistoryError::EmptyStack(direction)) => {
                cli_io::print_info(format!("Nothing to {direction}."));
                Ok(())
            }
            Err(HistoryError::Cancelled) => {
                cli_io::print_info("Cancelled.");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn report_outcome(&self, outcome: &Outcome) {
        cli_io::print_success(format!(
            "{}: {}",
            outcome.action.past_tense(),
            outcome.description
        ));
        if outcome.evicted > 0 {
            cli_io::print_info(format!(
                "Oldest {} history entr{} dropped (depth {}).",
                outcome.evicted,
                if outcome.evicted == 1 { "y" } else { "ies" },
                self.manager.max_depth()
            ));
        }
    }

    pub(crate) fn records(&self, kind: EntityKind) -> Result<Vec<Record>, CommandError> {
        Ok(self
            .manager
            .store()
            .list(kind)
            .map_err(HistoryError::from)?)
    }

    pub(crate) fn find_account(&self, name: &str) -> Result<AccountRecord, CommandError> {
        self.records(EntityKind::Account)?
            .into_iter()
            .find_map(|record| match record {
                Record::Account(account) if account.active && same_name(&account.name, name) => {
                    Some(account)
                }
                _ => None,
            })
            .ok_or_else(|| CommandError::InvalidArguments(format!("account `{name}` not found")))
    }

    pub(crate) fn find_category(&self, name: &str) -> Result<CategoryRecord, CommandError> {
        self.records(EntityKind::Category)?
            .into_iter()
            .find_map(|record| match record {
                Record::Category(category)
                    if category.active && same_name(&category.name, name) =>
                {
                    Some(category)
                }
                _ => None,
            })
            .ok_or_else(|| CommandError::InvalidArguments(format!("category `{name}` not found")))
    }

    pub(crate) fn find_budget(&self, category_id: Uuid) -> Result<Option<BudgetRecord>, CommandError> {
        Ok(self
            .records(EntityKind::Budget)?
            .into_iter()
            .find_map(|record| match record {
                Record::Budget(budget) if budget.active && budget.category_id == category_id => {
                    Some(budget)
                }
                _ => None,
            }))
    }
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{input}`")))
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

/// Splits `--flag value` options out of positional arguments.
pub(crate) fn take_option<'a>(args: &mut Vec<&'a str>, flag: &str) -> Option<&'a str> {
    let index = args.iter().position(|arg| *arg == flag)?;
    if index + 1 >= args.len() {
        args.remove(index);
        return None;
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Some(value)
}

pub(crate) fn take_flag(args: &mut Vec<&str>, flag: &str) -> bool {
    match args.iter().position(|arg| *arg == flag) {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::History(inner) => CommandError::History(inner),
            CliError::Input(message) => CommandError::InvalidArguments(message),
            other => CommandError::Message(other.to_string()),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    config_manager: crate::config::ConfigManager,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_config_manager(CliMode::Script, config_manager)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}
