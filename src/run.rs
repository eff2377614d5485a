use std::collections::HashMap;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::models::User;
use crate::ops;

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let (positionals, flags) = parse_opts(&args[2..]);

    match args[1].as_str() {
        "register" => cli_register(db, &positionals),
        "users" => cli_users(db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("havikiadas {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            // Everything else acts on one user's ledger.
            let env_user = std::env::var("HAVIKIADAS_USER").ok();
            let selector = flags.get("user").copied().or(env_user.as_deref());
            let user = ops::resolve_user(db, selector)?;
            match command {
                "months" => cli_months(db, &user),
                "summary" | "s" => cli_summary(db, &user, &positionals),
                "budgets" | "b" => cli_budgets(db, &user, &positionals),
                "set-budget" => cli_set_budget(db, &user, &positionals),
                "edit-budget" => cli_edit_budget(db, &user, &positionals),
                "rm-budget" => cli_rm_budget(db, &user, &positionals),
                "set-budgets" => cli_set_budgets(db, &user, &positionals),
                "add-income" => cli_add_income(db, &user, &positionals, &flags),
                "incomes" => cli_incomes(db, &user, &positionals),
                "edit-income" => cli_edit_income(db, &user, &positionals),
                "rm-income" => cli_rm_income(db, &user, &positionals),
                "add-expense" => cli_add_expense(db, &user, &positionals, &flags),
                "expenses" => cli_expenses(db, &user, &positionals),
                "edit-expense" => cli_edit_expense(db, &user, &positionals),
                "rm-expense" => cli_rm_expense(db, &user, &positionals),
                "set-start" => cli_set_start(db, &user, &positionals),
                "export" => cli_export(db, &user, &positionals, &flags),
                other => {
                    print_usage();
                    anyhow::bail!("Unknown command: {other}");
                }
            }
        }
    }
}

pub(crate) fn print_usage() {
    println!("HaviKiadas — monthly income/expense tracker with per-category budgets");
    println!();
    println!("Usage: havikiadas <command> [--user <email>]");
    println!();
    println!("The acting user comes from --user or the HAVIKIADAS_USER variable.");
    println!("Months are given as YYYY-MM and default to the current month.");
    println!();
    println!("Commands:");
    println!("  register <email>                            Create a user");
    println!("  users                                       List users");
    println!("  months                                      List ledger months");
    println!("  summary [YYYY-MM]                           Income/expense/balance summary");
    println!("  budgets [YYYY-MM]                           Budgets vs spending, with roll-up");
    println!("  set-budget <YYYY-MM> <category> <amount>    Add one category budget");
    println!("  edit-budget <id> <amount>                   Change a budget's limit");
    println!("  rm-budget <id>                              Delete a budget");
    println!("  set-budgets <YYYY-MM> <cat>=<amt> ...       Replace the month's whole budget set");
    println!("  add-income <YYYY-MM> <amount> <source>      Record income");
    println!("    --date <YYYY-MM-DD> --label <s> --note <s>");
    println!("  incomes [YYYY-MM]                           List income entries");
    println!("  edit-income <id> <amount>                   Change an income amount");
    println!("  rm-income <id>                              Delete an income entry");
    println!("  add-expense <YYYY-MM> <amount> <item> <category>   Record an expense");
    println!("    --date <YYYY-MM-DD> --note <s>");
    println!("  expenses [YYYY-MM]                          List expense entries");
    println!("  edit-expense <id> <amount>                  Change an expense amount");
    println!("  rm-expense <id>                             Delete an expense entry");
    println!("  set-start <YYYY-MM> <amount>                Set the month's starting balance");
    println!("  export [path]                               Export a month's ledger to CSV");
    println!("    --month <YYYY-MM>");
    println!("  --help, -h                                  Show this help");
    println!("  --version, -V                               Show version");
}

/// Splits raw arguments into positionals and `--flag value` pairs.
fn parse_opts(args: &[String]) -> (Vec<&str>, HashMap<&str, &str>) {
    let mut positionals = Vec::new();
    let mut flags = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].strip_prefix("--") {
            Some(name) if i + 1 < args.len() => {
                flags.insert(name, args[i + 1].as_str());
                i += 2;
            }
            Some(_) => {
                i += 1;
            }
            None => {
                positionals.push(args[i].as_str());
                i += 1;
            }
        }
    }
    (positionals, flags)
}

fn current_month_key() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

fn month_arg(positionals: &[&str]) -> String {
    positionals
        .first()
        .map(|s| s.to_string())
        .unwrap_or_else(current_month_key)
}

fn id_arg(positionals: &[&str], usage: &str) -> Result<i64> {
    let raw = positionals
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: havikiadas {usage}"))?;
    raw.parse::<i64>()
        .map_err(|_| anyhow::anyhow!("'{raw}' is not a numeric id"))
}

fn fmt_amount(amount: Decimal) -> String {
    format!("{amount:.2} Ft")
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    path.to_string()
}

// ── Users & months ────────────────────────────────────────────

fn cli_register(db: &Database, positionals: &[&str]) -> Result<()> {
    let email = positionals
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: havikiadas register <email>"))?;
    let user = ops::register_user(db, email)?;
    println!("Registered {}", user.email);
    Ok(())
}

fn cli_users(db: &Database) -> Result<()> {
    let users = db.get_users()?;
    if users.is_empty() {
        println!("No users yet. Create one with: havikiadas register <email>");
        return Ok(());
    }
    for user in &users {
        println!("{}", user.email);
    }
    Ok(())
}

fn cli_months(db: &Database, user: &User) -> Result<()> {
    let months = ops::list_months(db, user)?;
    if months.is_empty() {
        println!("No months yet — they are created when you record an entry.");
        return Ok(());
    }
    for month in &months {
        println!(
            "{}  {:<20} start {}",
            month.key(),
            month.label(),
            fmt_amount(month.starting_balance)
        );
    }
    Ok(())
}

// ── Summaries ─────────────────────────────────────────────────

fn cli_summary(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let key = month_arg(positionals);
    let summary = ops::month_summary(db, user, &key)?;

    println!("HaviKiadas — {key}");
    println!("{}", "─".repeat(40));
    println!("  Starting:  {:>16}", fmt_amount(summary.starting_balance));
    println!("  Income:    {:>16}", fmt_amount(summary.total_income));
    println!("  Expenses:  {:>16}", fmt_amount(summary.total_expenses));
    println!("  Balance:   {:>16}", fmt_amount(summary.balance));
    Ok(())
}

fn cli_budgets(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let key = month_arg(positionals);
    let overview = ops::budget_overview_for_month(db, user, &key)?;

    println!("HaviKiadas — {key} budgets");
    println!("{}", "─".repeat(56));
    if overview.budgets.is_empty() {
        println!("  No budgets set for this month");
        println!("  Use: havikiadas set-budget {key} <category> <amount>");
        return Ok(());
    }

    for entry in &overview.budgets {
        let marker = if entry.is_over_budget { "  OVER" } else { "" };
        println!(
            "  {:<16} {:>13} / {:<13} {:>7}%{}",
            entry.budget.category.to_string(),
            format!("{:.2}", entry.spent),
            format!("{:.2}", entry.budget.budget_amount),
            format!("{:.1}", entry.percentage),
            marker
        );
    }
    println!("{}", "─".repeat(56));
    let marker = if overview.is_over_budget { "  OVER" } else { "" };
    println!(
        "  {:<16} {:>13} / {:<13} {:>7}%{}",
        "Total",
        format!("{:.2}", overview.total_spent),
        format!("{:.2}", overview.total_budget),
        format!("{:.1}", overview.overall_percentage),
        marker
    );
    println!("  Remaining: {}", fmt_amount(overview.total_remaining));
    Ok(())
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_set_budget(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let &[key, category, amount] = positionals else {
        anyhow::bail!("Usage: havikiadas set-budget <YYYY-MM> <category> <amount>");
    };
    let category = ops::parse_category(category)?;
    let amount = ops::parse_amount("budget_amount", amount)?;
    let budget = ops::set_budget(db, user, key, category, amount)?;
    println!(
        "Budget set: {} {} (id {})",
        budget.category,
        fmt_amount(budget.budget_amount),
        budget.id.unwrap_or(0)
    );
    Ok(())
}

fn cli_edit_budget(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let id = id_arg(positionals, "edit-budget <id> <amount>")?;
    let amount = positionals
        .get(1)
        .ok_or_else(|| anyhow::anyhow!("Usage: havikiadas edit-budget <id> <amount>"))?;
    let amount = ops::parse_amount("budget_amount", amount)?;
    let budget = ops::edit_budget(db, user, id, amount)?;
    println!(
        "Budget updated: {} {}",
        budget.category,
        fmt_amount(budget.budget_amount)
    );
    Ok(())
}

fn cli_rm_budget(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let id = id_arg(positionals, "rm-budget <id>")?;
    ops::remove_budget(db, user, id)?;
    println!("Budget deleted");
    Ok(())
}

fn cli_set_budgets(db: &mut Database, user: &User, positionals: &[&str]) -> Result<()> {
    let Some((&key, pairs)) = positionals.split_first() else {
        anyhow::bail!("Usage: havikiadas set-budgets <YYYY-MM> <category>=<amount> ...");
    };
    let mut entries = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let Some((category, amount)) = pair.split_once('=') else {
            anyhow::bail!("'{pair}' is not <category>=<amount>");
        };
        entries.push((
            ops::parse_category(category)?,
            ops::parse_amount("budget_amount", amount)?,
        ));
    }
    let created = ops::replace_budgets(db, user, key, &entries)?;
    println!("Replaced budgets for {key} ({} categories)", created.len());
    Ok(())
}

// ── Incomes ───────────────────────────────────────────────────

fn cli_add_income(
    db: &Database,
    user: &User,
    positionals: &[&str],
    flags: &HashMap<&str, &str>,
) -> Result<()> {
    let &[key, amount, source] = positionals else {
        anyhow::bail!("Usage: havikiadas add-income <YYYY-MM> <amount> <source> [--date <YYYY-MM-DD>] [--label <s>] [--note <s>]");
    };
    let input = ops::IncomeInput {
        date: flags.get("date").map(|s| s.to_string()),
        amount: ops::parse_amount("amount", amount)?,
        source: ops::parse_source(source)?,
        custom_source: flags.get("label").map(|s| s.to_string()),
        notes: flags.get("note").map(|s| s.to_string()),
    };
    let income = ops::add_income(db, user, key, input)?;
    println!(
        "Income recorded: {} {} on {} (id {})",
        income.source_label(),
        fmt_amount(income.amount),
        income.date,
        income.id.unwrap_or(0)
    );
    Ok(())
}

fn cli_incomes(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let key = month_arg(positionals);
    let incomes = ops::list_incomes(db, user, &key)?;
    if incomes.is_empty() {
        println!("No income recorded for {key}");
        return Ok(());
    }
    for income in &incomes {
        println!(
            "{:>5}  {}  {:<20} {:>14}  {}",
            income.id.unwrap_or(0),
            income.date,
            income.source_label(),
            fmt_amount(income.amount),
            income.notes.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn cli_edit_income(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let id = id_arg(positionals, "edit-income <id> <amount>")?;
    let amount = positionals
        .get(1)
        .ok_or_else(|| anyhow::anyhow!("Usage: havikiadas edit-income <id> <amount>"))?;
    ops::update_income_amount(db, user, id, ops::parse_amount("amount", amount)?)?;
    println!("Income updated");
    Ok(())
}

fn cli_rm_income(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let id = id_arg(positionals, "rm-income <id>")?;
    ops::remove_income(db, user, id)?;
    println!("Income deleted");
    Ok(())
}

// ── Expenses ──────────────────────────────────────────────────

fn cli_add_expense(
    db: &Database,
    user: &User,
    positionals: &[&str],
    flags: &HashMap<&str, &str>,
) -> Result<()> {
    let &[key, amount, item, category] = positionals else {
        anyhow::bail!("Usage: havikiadas add-expense <YYYY-MM> <amount> <item> <category> [--date <YYYY-MM-DD>] [--note <s>]");
    };
    let input = ops::ExpenseInput {
        date: flags.get("date").map(|s| s.to_string()),
        amount: ops::parse_amount("amount", amount)?,
        item_name: item.to_string(),
        category: ops::parse_category(category)?,
        notes: flags.get("note").map(|s| s.to_string()),
    };
    let expense = ops::add_expense(db, user, key, input)?;
    println!(
        "Expense recorded: {} ({}) {} on {} (id {})",
        expense.item_name,
        expense.category,
        fmt_amount(expense.amount),
        expense.date,
        expense.id.unwrap_or(0)
    );
    Ok(())
}

fn cli_expenses(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let key = month_arg(positionals);
    let expenses = ops::list_expenses(db, user, &key)?;
    if expenses.is_empty() {
        println!("No expenses recorded for {key}");
        return Ok(());
    }
    for expense in &expenses {
        println!(
            "{:>5}  {}  {:<20} {:<16} {:>14}  {}",
            expense.id.unwrap_or(0),
            expense.date,
            expense.item_name,
            expense.category.to_string(),
            fmt_amount(expense.amount),
            expense.notes.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn cli_edit_expense(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let id = id_arg(positionals, "edit-expense <id> <amount>")?;
    let amount = positionals
        .get(1)
        .ok_or_else(|| anyhow::anyhow!("Usage: havikiadas edit-expense <id> <amount>"))?;
    ops::update_expense_amount(db, user, id, ops::parse_amount("amount", amount)?)?;
    println!("Expense updated");
    Ok(())
}

fn cli_rm_expense(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let id = id_arg(positionals, "rm-expense <id>")?;
    ops::remove_expense(db, user, id)?;
    println!("Expense deleted");
    Ok(())
}

// ── Starting balance & export ─────────────────────────────────

fn cli_set_start(db: &Database, user: &User, positionals: &[&str]) -> Result<()> {
    let &[key, amount] = positionals else {
        anyhow::bail!("Usage: havikiadas set-start <YYYY-MM> <amount>");
    };
    let amount = ops::parse_amount("starting_balance", amount)?;
    let month = ops::set_starting_balance(db, user, key, amount)?;
    println!(
        "Starting balance for {} set to {}",
        month.key(),
        fmt_amount(month.starting_balance)
    );
    Ok(())
}

fn cli_export(
    db: &Database,
    user: &User,
    positionals: &[&str],
    flags: &HashMap<&str, &str>,
) -> Result<()> {
    let month = flags
        .get("month")
        .map(|s| s.to_string())
        .unwrap_or_else(current_month_key);

    let output_path = positionals
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/havikiadas-export-{month}.csv")
        });

    let count = ops::export_month(db, user, &month, &output_path)?;
    if count == 0 {
        println!("No entries for {month}");
    } else {
        println!("Exported {count} entries to {output_path}");
    }
    Ok(())
}
