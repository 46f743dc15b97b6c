use std::{fs, path::Path};

use chrono::Local;

use super::CommandDefinition;
use crate::cli::core::{
    parse_amount, parse_date, take_flag, take_option, CommandError, CommandResult, ShellContext,
};
use crate::{
    commands::{Command, RecordCommand},
    domain::{
        AccountKind, AccountRecord, BudgetPeriod, BudgetRecord, CategoryKind, CategoryRecord,
        TransactionKind, TransactionRecord,
    },
};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "account-add",
            "Create an account",
            "account-add <name> [bank|cash|savings|credit|investment|other] [balance]",
            cmd_account_add,
        ),
        CommandDefinition::new(
            "account-rename",
            "Rename an account",
            "account-rename <name> <new-name>",
            cmd_account_rename,
        ),
        CommandDefinition::new(
            "account-delete",
            "Delete an account",
            "account-delete <name> [--soft|--hard]",
            cmd_account_delete,
        ),
        CommandDefinition::new(
            "category-add",
            "Create a category",
            "category-add <name> [expense|income|transfer] [--parent <name>]",
            cmd_category_add,
        ),
        CommandDefinition::new(
            "txn-add",
            "Record a transaction",
            "txn-add <account> <income|expense|transfer> <amount> [description] [--date YYYY-MM-DD] [--category <name>]",
            cmd_txn_add,
        ),
        CommandDefinition::new(
            "txn-import",
            "Import transactions from a CSV file as one undoable batch",
            "txn-import <file.csv>  (rows: date,account,kind,amount,description[,category])",
            cmd_txn_import,
        ),
        CommandDefinition::new(
            "budget-set",
            "Create or change the budget of a category",
            "budget-set <category> <limit> [monthly|quarterly|yearly]",
            cmd_budget_set,
        ),
    ]
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}

fn cmd_account_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| usage("account-add <name> [kind] [balance]"))?;
    let kind = match args.get(1) {
        Some(value) => AccountKind::parse(value).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown account kind `{value}`"))
        })?,
        None => AccountKind::Bank,
    };
    let balance = args.get(2).map(|value| parse_amount(value)).transpose()?;
    let account = AccountRecord::new(*name, kind).with_balance(balance.unwrap_or(0.0));
    context.run_command(Command::create(account))
}

fn cmd_account_rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, new_name] = args else {
        return Err(usage("account-rename <name> <new-name>"));
    };
    let before = context.find_account(name)?;
    let mut after = before.clone();
    after.name = new_name.to_string();
    context.run_command(Command::update(before, after)?)
}

fn cmd_account_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let soft = if take_flag(&mut args, "--soft") {
        true
    } else if take_flag(&mut args, "--hard") {
        false
    } else {
        context.config.soft_delete
    };
    let name = args
        .first()
        .ok_or_else(|| usage("account-delete <name> [--soft|--hard]"))?;
    let before = context.find_account(name)?;
    context.run_command(Command::delete(before, soft))
}

fn cmd_category_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let parent = take_option(&mut args, "--parent");
    let name = args
        .first()
        .ok_or_else(|| usage("category-add <name> [kind] [--parent <name>]"))?;
    let kind = match args.get(1) {
        Some(value) => CategoryKind::parse(value).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown category kind `{value}`"))
        })?,
        None => CategoryKind::Expense,
    };
    let mut category = CategoryRecord::new(*name, kind);
    if let Some(parent) = parent {
        category = category.with_parent(context.find_category(parent)?.id);
    }
    context.run_command(Command::create(category))
}

fn cmd_txn_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut args = args.to_vec();
    let date = take_option(&mut args, "--date").map(parse_date).transpose()?;
    let category = take_option(&mut args, "--category");
    let [account, kind, amount, rest @ ..] = args.as_slice() else {
        return Err(usage(
            "txn-add <account> <income|expense|transfer> <amount> [description]",
        ));
    };
    let transaction = build_transaction(
        context,
        TransactionRow {
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            account,
            kind,
            amount,
            description: &rest.join(" "),
            category,
        },
    )?;
    context.run_command(Command::create(transaction))
}

fn cmd_txn_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = Path::new(args.first().ok_or_else(|| usage("txn-import <file.csv>"))?);
    let contents = fs::read_to_string(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(contents.as_bytes());
    let mut children = Vec::new();
    for result in reader.records() {
        let fields = result.map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let line = fields.position().map_or(0, |position| position.line());
        let row = match (fields.get(0), fields.get(1), fields.get(2), fields.get(3), fields.get(4)) {
            (Some(date), Some(account), Some(kind), Some(amount), Some(description)) => {
                TransactionRow {
                    date: parse_date(date).map_err(|err| at_line(line, err))?,
                    account,
                    kind,
                    amount,
                    description,
                    category: fields.get(5).filter(|value| !value.is_empty()),
                }
            }
            _ => {
                return Err(at_line(
                    line,
                    CommandError::InvalidArguments(
                        "expected date,account,kind,amount,description[,category]".into(),
                    ),
                ))
            }
        };
        let transaction = build_transaction(context, row).map_err(|err| at_line(line, err))?;
        children.push(RecordCommand::create(transaction));
    }
    if children.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "{} contains no transactions",
            path.display()
        )));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    context.run_command(Command::batch(format!("Importar {name}"), children)?)
}

fn cmd_budget_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [category, limit, rest @ ..] = args else {
        return Err(usage("budget-set <category> <limit> [monthly|quarterly|yearly]"));
    };
    let category = context.find_category(category)?;
    let limit = parse_amount(limit)?;
    let period = match rest.first() {
        Some(value) => BudgetPeriod::parse(value).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown budget period `{value}`"))
        })?,
        None => BudgetPeriod::default(),
    };

    let command = match context.find_budget(category.id)? {
        Some(before) => {
            let mut after = before.clone();
            after.limit = limit;
            after.period = period;
            after.category_name = Some(category.name.clone());
            Command::update(before, after)?
        }
        None => Command::create(
            BudgetRecord::new(category.id, limit, period).with_category_name(category.name),
        ),
    };
    context.run_command(command)
}

struct TransactionRow<'a> {
    date: chrono::NaiveDate,
    account: &'a str,
    kind: &'a str,
    amount: &'a str,
    description: &'a str,
    category: Option<&'a str>,
}

fn build_transaction(
    context: &ShellContext,
    row: TransactionRow<'_>,
) -> Result<TransactionRecord, CommandError> {
    let account = context.find_account(row.account)?;
    let kind = TransactionKind::parse(row.kind).ok_or_else(|| {
        CommandError::InvalidArguments(format!("unknown transaction kind `{}`", row.kind))
    })?;
    let amount = parse_amount(row.amount)?;
    let mut transaction =
        TransactionRecord::new(account.id, row.date, amount, kind, row.description);
    if let Some(category) = row.category {
        transaction = transaction.with_category(context.find_category(category)?.id);
    }
    Ok(transaction)
}

fn at_line(line: u64, err: CommandError) -> CommandError {
    CommandError::InvalidArguments(format!("line {line}: {err}"))
}
