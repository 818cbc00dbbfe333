//! Terminal front-end for spendbook.
//!
//! # Responsibility
//! - Map command-line flags onto `TrackerConfig`.
//! - Route each subcommand to one tracker command and print the result.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use spendbook_core::db::open_db;
use spendbook_core::{
    core_version, dispatch, init_logging, ActionOutcome, CsvWriter, ExpenseInput, ExpenseTracker,
    ExportError, RowAction, SqliteExpenseGateway, TrackerConfig, TrackerError,
};
use std::path::PathBuf;

/// Record expenses and view them grouped by category.
#[derive(Parser, Debug)]
#[command(name = "spendbook", version)]
struct Cli {
    /// Directory holding the ledger database and logs.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Label printed before amounts.
    #[arg(long, global = true)]
    currency: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show expenses grouped by category.
    List,
    /// Record a new expense.
    Add {
        description: String,
        amount: String,
        category: String,
        /// YYYY-MM-DD, defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Re-enter an expense; unspecified fields keep their values.
    Edit {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove an expense.
    Delete { id: i64 },
    /// Write expenses.csv.
    Export {
        /// Target directory, defaults to the current directory.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the grand total.
    Total,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    init_logging(&config.log_level, &config.log_dir())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let conn = open_db(config.db_path())
        .with_context(|| format!("failed to open {}", config.db_path().display()))?;
    let mut tracker =
        ExpenseTracker::open(SqliteExpenseGateway::new(&conn)).with_currency(&config.currency_label);

    match cli.command {
        Command::List => println!("{}", tracker.display()),
        Command::Total => println!("{}", tracker.display().grand_total),
        Command::Add {
            description,
            amount,
            category,
            date,
        } => {
            let date = date.unwrap_or_else(|| ExpenseInput::today().date);
            let id = report(tracker.add(&ExpenseInput::new(description, amount, category, date)))?;
            println!("added {id}");
            println!("{}", tracker.display());
        }
        Command::Edit {
            id,
            description,
            amount,
            category,
            date,
        } => {
            let ActionOutcome::EditStarted(Some(mut input)) =
                report(dispatch(&mut tracker, RowAction::Edit(id)))?
            else {
                println!("no expense with id {id}");
                return Ok(());
            };
            if let Some(value) = description {
                input.description = value;
            }
            if let Some(value) = amount {
                input.amount = value;
            }
            if let Some(value) = category {
                input.category = value;
            }
            if let Some(value) = date {
                input.date = value;
            }
            let new_id = match tracker.add(&input) {
                Err(TrackerError::Validation(err)) => {
                    eprintln!("expense {id} was removed; the values entered were:");
                    eprintln!("{}", describe_input(&input));
                    bail!("{} ({})", err, err.field());
                }
                result => report(result)?,
            };
            println!("expense {id} replaced by {new_id}");
            println!("{}", tracker.display());
        }
        Command::Delete { id } => {
            match report(dispatch(&mut tracker, RowAction::Delete(id)))? {
                ActionOutcome::Deleted(true) => println!("deleted {id}"),
                _ => println!("no expense with id {id}"),
            }
            println!("{}", tracker.display());
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.export_dir.clone());
            match tracker.export(&CsvWriter, &dir) {
                Ok(path) => println!("exported {}", path.display()),
                Err(TrackerError::Export(ExportError::NothingToExport)) => {
                    println!("No expenses to export!")
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<TrackerConfig> {
    let mut config = TrackerConfig::default();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(currency) = &cli.currency {
        config.currency_label = currency.clone();
    }
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    Ok(config.absolutize(&cwd))
}

/// Lists form values so a rejected re-entry can be typed again.
fn describe_input(input: &ExpenseInput) -> String {
    format!(
        "  description: {}\n  amount: {}\n  category: {}\n  date: {}",
        input.description, input.amount, input.category, input.date
    )
}

/// Appends the failing field name to validation errors.
fn report<T>(result: Result<T, TrackerError>) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(TrackerError::Validation(err)) => bail!("{} ({})", err, err.field()),
        Err(err) => Err(err.into()),
    }
}
