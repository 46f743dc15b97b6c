use chrono::Local;

use super::CommandDefinition;
use crate::cli::core::{take_flag, CommandError, CommandResult, ShellContext};
use crate::cli::{io, output};
use crate::history::{Direction, EntryState};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "undo",
            "Revert the most recent change",
            "undo [--yes]",
            cmd_undo,
        ),
        CommandDefinition::new(
            "redo",
            "Re-apply the most recently undone change",
            "redo [--yes]",
            cmd_redo,
        ),
        CommandDefinition::new(
            "history",
            "Show the undo/redo timeline",
            "history",
            cmd_history,
        ),
        CommandDefinition::new(
            "depth",
            "Show or set how many changes can be undone (10-100)",
            "depth [n]",
            cmd_depth,
        ),
    ]
}

fn cmd_undo(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let assume_yes = take_flag(&mut args, "--yes");
    context.step(Direction::Undo, assume_yes)
}

fn cmd_redo(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let assume_yes = take_flag(&mut args, "--yes");
    context.step(Direction::Redo, assume_yes)
}

fn cmd_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let manager = &context.manager;
    output::section(format!(
        "History ({} of {} slots used)",
        manager.undo_len(),
        manager.max_depth()
    ));
    let entries = manager.history();
    if entries.is_empty() {
        io::print_info("History is empty.");
        return Ok(());
    }
    for entry in entries {
        let marker = match entry.state {
            EntryState::Applied => " ",
            EntryState::Undone => "~",
        };
        let kind = if entry.is_batch { " [batch]" } else { "" };
        output::line(format!(
            "{marker} {}  {}{kind}",
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            entry.description
        ));
    }
    if let Some(next) = manager.peek_undo_description() {
        io::print_hint(format!("Next undo: {next}"));
    }
    if let Some(next) = manager.peek_redo_description() {
        io::print_hint(format!("Next redo: {next}"));
    }
    Ok(())
}

fn cmd_depth(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(value) = args.first() else {
        io::print_info(format!(
            "History depth: {} (undo {}, redo {})",
            context.manager.max_depth(),
            context.manager.undo_len(),
            context.manager.redo_len()
        ));
        return Ok(());
    };
    let requested: usize = value
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid depth `{value}`")))?;
    let applied = context.manager.set_max_depth(requested);
    if applied != requested {
        io::print_warning(format!("Depth clamped to {applied}."));
    }
    context.config.undo_limit = applied;
    context
        .config_manager
        .save(&context.config)
        .map_err(|err| CommandError::Message(err.to_string()))?;
    io::print_success(format!("History depth set to {applied}."));
    Ok(())
}
