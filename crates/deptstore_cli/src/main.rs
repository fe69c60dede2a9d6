//! Command-line front end for the department store.
//!
//! # Responsibility
//! - Map subcommands onto `DepartmentRepository` operations.
//! - Print entities as JSON on stdout.
//!
//! # Invariants
//! - One connection and one repository (with its own identity cache) per
//!   invocation.
//! - A lookup that finds nothing exits with a failure code, not an error.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use deptstore_core::{
    default_log_level, init_logging, open_db, Department, DepartmentId, DepartmentRepository,
    SqliteDepartmentRepository,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "deptstore", version, about = "Manage departments stored in SQLite")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "DEPTSTORE_DB", default_value = "departments.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "DEPTSTORE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the departments table.
    Init,
    /// Drop the departments table.
    Drop,
    /// Add a department.
    Add { name: String, location: String },
    /// List every department.
    List,
    /// Show one department by id.
    Get { id: DepartmentId },
    /// Show the first department with the given name.
    Find { name: String },
    /// Change name and/or location of a department.
    Rename {
        id: DepartmentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete a department by id.
    Remove { id: DepartmentId },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| anyhow!("log directory must be valid UTF-8"))?;
        init_logging(&cli.log_level, log_dir).map_err(|err| anyhow!(err))?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let mut repo = SqliteDepartmentRepository::new(&conn);

    let found = run(&mut repo, cli.command)?;
    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Executes one command; returns `false` when the target department is absent.
fn run<R: DepartmentRepository>(repo: &mut R, command: Command) -> Result<bool> {
    match command {
        Command::Init => {
            repo.create_table().context("failed to create table")?;
            info!("event=cli_command module=cli status=ok command=init");
        }
        Command::Drop => {
            repo.drop_table().context("failed to drop table")?;
            info!("event=cli_command module=cli status=ok command=drop");
        }
        Command::Add { name, location } => {
            let department = repo
                .create(&name, &location)
                .context("failed to add department")?;
            print_json(&department)?;
        }
        Command::List => {
            let departments = repo.get_all().context("failed to list departments")?;
            print_json(&departments)?;
        }
        Command::Get { id } => {
            let department = repo
                .find_by_id(id)
                .with_context(|| format!("failed to load department {id}"))?;
            return print_found(department, &format!("id {id}"));
        }
        Command::Find { name } => {
            let department = repo
                .find_by_name(&name)
                .with_context(|| format!("failed to search department `{name}`"))?;
            return print_found(department, &format!("name `{name}`"));
        }
        Command::Rename { id, name, location } => {
            let Some(mut department) = repo.find_by_id(id)? else {
                eprintln!("no department with id {id}");
                return Ok(false);
            };
            if let Some(name) = name {
                department.name = name;
            }
            if let Some(location) = location {
                department.location = location;
            }
            repo.update(&department)
                .with_context(|| format!("failed to update department {id}"))?;
            print_json(&department)?;
        }
        Command::Remove { id } => {
            let Some(mut department) = repo.find_by_id(id)? else {
                eprintln!("no department with id {id}");
                return Ok(false);
            };
            repo.delete(&mut department)
                .with_context(|| format!("failed to delete department {id}"))?;
            info!("event=cli_command module=cli status=ok command=remove id={id}");
        }
    }

    Ok(true)
}

fn print_found(department: Option<Department>, lookup: &str) -> Result<bool> {
    match department {
        Some(department) => {
            print_json(&department)?;
            Ok(true)
        }
        None => {
            eprintln!("no department with {lookup}");
            Ok(false)
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
