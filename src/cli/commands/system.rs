use super::CommandDefinition;
use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::shell_context::open_store;
use crate::cli::{io, output};
use crate::domain::{EntityKind, Record};
use crate::history::manager::DEFAULT_CONTEXT;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "project",
            "Show or switch the active project (switching clears history)",
            "project [name]",
            cmd_project,
        ),
        CommandDefinition::new(
            "list",
            "List stored records",
            "list [accounts|categories|transactions|budgets]",
            cmd_list,
        ),
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_project(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first().map(|name| name.trim()).filter(|name| !name.is_empty()) else {
        io::print_info(format!("Active project: {}", context.project_name()));
        return Ok(());
    };
    if name == context.project_name() {
        io::print_info(format!("Already on project `{name}`."));
        return Ok(());
    }

    // The default project lives in the top-level ledger file.
    let project = (name != DEFAULT_CONTEXT).then_some(name);
    let store = open_store(&context.config_manager, project)?;
    context.manager.replace_store(Box::new(store));
    let cleared = context.manager.switch_context(name);
    context.config.last_project = project.map(str::to_string);
    context
        .config_manager
        .save(&context.config)
        .map_err(|err| CommandError::Message(err.to_string()))?;

    io::print_success(format!("Switched to project `{name}`."));
    if cleared {
        io::print_info("Undo history cleared.");
    }
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kinds = match args.first() {
        None => EntityKind::ALL.to_vec(),
        Some(value) => vec![parse_kind(value)?],
    };
    for kind in kinds {
        let records = context.records(kind)?;
        output::section(format!("{}s ({})", kind, records.len()));
        for record in records {
            output::line(format!("  {}", summarize(&record)));
        }
    }
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(command) => help::print_command(command),
            None => context.print_warning(&format!("Unknown command `{}`.", args[0])),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.running = false;
    Err(CommandError::ExitRequested)
}

fn parse_kind(value: &str) -> Result<EntityKind, CommandError> {
    let normalized = value.trim().to_ascii_lowercase();
    let singular = normalized
        .strip_suffix("ies")
        .map(|stem| format!("{stem}y"))
        .or_else(|| normalized.strip_suffix('s').map(str::to_string))
        .unwrap_or(normalized);
    EntityKind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == singular)
        .ok_or_else(|| CommandError::InvalidArguments(format!("unknown record kind `{value}`")))
}

fn summarize(record: &Record) -> String {
    let status = if record.is_active() { "" } else { " (inactive)" };
    let detail = match record {
        Record::Account(account) => {
            format!("{} [{:?}] balance {:.2}", account.name, account.kind, account.balance)
        }
        Record::Category(category) => format!("{} [{:?}]", category.name, category.kind),
        Record::Transaction(txn) => format!(
            "{} {:>10.2} {}",
            txn.date,
            txn.signed_amount(),
            txn.description
        ),
        Record::Budget(budget) => format!(
            "{} limit {:.2} [{:?}]",
            budget.label(),
            budget.limit,
            budget.period
        ),
    };
    format!("{} {detail}{status}", short_id(record.id()))
}
