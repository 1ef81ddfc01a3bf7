// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Roster CLI
//!
//! Maintains the employee roster from the command line.
//!
//! # Commands
//!
//! - `add`, `update`, `term`, `delete` - change a record (each writes one history entry)
//! - `list`, `search` - show records as tab-separated rows
//! - `history` - show the change log, newest first
//! - `schema` - bring the store up to date and report what changed

mod config;
mod error;

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use clap::{Parser, Subcommand};
use roster_store_db::documents::{DocumentBackend, LocalDocumentStore};
use roster_store_db::{
    Backend, Editor, Employee, EmployeeUpdate, HistoryEvent, OpenMode, Outcome, RosterDb, Status,
    Termed,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{BackendKind, Config};
use crate::error::{CliError, Result};

/// Employee roster with an audit log.
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Fail instead of creating a missing SQLite roster
    #[arg(global = true, long)]
    no_create: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new employee
    Add {
        identifier: String,
        first_name: String,
        last_name: String,
        role: String,
        company: String,

        #[arg(short, long, default_value = "Active")]
        status: Status,
    },

    /// Replace an employee's details
    Update {
        identifier: String,
        first_name: String,
        last_name: String,
        role: String,
        company: String,

        #[arg(short, long, default_value = "Active")]
        status: Status,

        /// Overwrite the termed flag (kept as stored when omitted)
        #[arg(short, long)]
        termed: Option<Termed>,
    },

    /// Mark an employee as termed
    Term { identifier: String },

    /// Remove an employee
    Delete { identifier: String },

    /// List all employees
    List,

    /// List employees with a field containing the query
    Search { query: String },

    /// Show the change history
    History,

    /// Migrate the store and report what changed
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let editor = Editor::from_environment();
    match config.backend {
        BackendKind::Sqlite => {
            info!("Using SQLite roster at {}", config.database_path.display());
            let mode = open_mode(cli.no_create);
            run(RosterDb::open_sqlite(&config.database_path, mode, editor)?, cli.command)
        }
        BackendKind::Documents => {
            info!("Using document roster at {}", config.documents_path.display());
            let store = LocalDocumentStore::open(&config.documents_path)?;
            run(RosterDb::open(DocumentBackend::new(store), editor)?, cli.command)
        }
    }
}

fn run<B: Backend>(mut db: RosterDb<B>, command: Command) -> Result<()> {
    match command {
        Command::Add {
            identifier,
            first_name,
            last_name,
            role,
            company,
            status,
        } => {
            let employee =
                Employee::new(identifier.clone(), first_name, last_name, role, company, status);
            expect_applied(db.insert(employee)?, identifier)
        }
        Command::Update {
            identifier,
            first_name,
            last_name,
            role,
            company,
            status,
            termed,
        } => {
            let update = EmployeeUpdate {
                first_name,
                last_name,
                role,
                company,
                status,
                termed,
            };
            expect_applied(db.update(&identifier, update)?, identifier)
        }
        Command::Term { identifier } => expect_applied(db.term(&identifier)?, identifier),
        Command::Delete { identifier } => expect_applied(db.delete(&identifier)?, identifier),
        Command::List => {
            print_employees(&db.employees()?);
            Ok(())
        }
        Command::Search { query } => {
            print_employees(&db.search(&query)?);
            Ok(())
        }
        Command::History => {
            for event in db.history()? {
                println!("{}", history_line(&event));
            }
            Ok(())
        }
        Command::Schema => {
            let report = db.schema_report();
            println!("created\t{}", report.created);
            println!("added_termed\t{}", report.added_termed);
            println!(
                "quarantined_to\t{}",
                report.quarantined_to.as_deref().unwrap_or("-")
            );
            Ok(())
        }
    }
}

fn open_mode(no_create: bool) -> OpenMode {
    if no_create {
        OpenMode::ReadWrite
    } else {
        OpenMode::Create
    }
}

fn expect_applied(outcome: Outcome, identifier: String) -> Result<()> {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::DuplicateKey => Err(CliError::Duplicate(identifier)),
        Outcome::NotFound => Err(CliError::NotFound(identifier)),
    }
}

fn print_employees(employees: &[Employee]) {
    for employee in employees {
        println!("{}", employee.row().join("\t"));
    }
}

fn history_line(event: &HistoryEvent) -> String {
    let secs = event
        .timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!(
        "{}\t{}\t{}\t{}\t{}",
        event.sequence_id, secs, event.action, event.details, event.editor
    )
}
