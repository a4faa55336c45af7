//! Command-line front end for `userbook_core`.
//!
//! # Responsibility
//! - Drive the registration and user-list controllers against a SQLite file.
//! - Keep output plain and line-oriented for quick local checks.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use userbook_core::{
    core_version, init_logging_from_config, load_config, open_db, CoreConfig, Field,
    RecordListController, RegistrationForm, SqliteRecordStore, SystemClock,
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "userbook", about = "Register, list, edit and delete user records")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides the configured `db_path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Registers a new record.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Lists records, optionally filtered by name and sorted.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,
        /// Sort descending instead of ascending.
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Edits fields of one record.
    Edit {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Deletes one record.
    Delete { id: Uuid },
    /// Prints the core version.
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortColumn {
    Name,
    Email,
    Phone,
}

impl From<SortColumn> for Field {
    fn from(value: SortColumn) -> Self {
        match value {
            SortColumn::Name => Field::Name,
            SortColumn::Email => Field::Email,
            SortColumn::Phone => Field::Phone,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Version = cli.command {
        println!("userbook_core version={}", core_version());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging_from_config(&config)?;
    info!("event=cli_start module=cli command={}", command_name(&cli.command));

    let conn = open_db(&config.db_path)?;
    let store = SqliteRecordStore::new(&conn);

    match cli.command {
        Command::Register { name, email, phone } => register(&store, &config, name, email, phone),
        Command::List { search, sort, desc } => list(&store, search, sort, desc),
        Command::Edit {
            id,
            name,
            email,
            phone,
        } => edit(&store, id, [(Field::Name, name), (Field::Email, email), (Field::Phone, phone)]),
        Command::Delete { id } => delete(&store, id),
        Command::Version => Ok(()),
    }
}

fn register(
    store: &SqliteRecordStore<'_>,
    config: &CoreConfig,
    name: String,
    email: String,
    phone: String,
) -> Result<(), Box<dyn Error>> {
    let mut form =
        RegistrationForm::new(store, SystemClock).with_banner_delay_ms(config.success_banner_ms);
    form.set_field(Field::Name, name);
    form.set_field(Field::Email, email);
    form.set_field(Field::Phone, phone);

    let record = form.submit()?;
    if let Some(notice) = form.take_notice() {
        println!("{}", notice.message);
    }
    println!("{}", record.id);
    Ok(())
}

fn list(
    store: &SqliteRecordStore<'_>,
    search: Option<String>,
    sort: Option<SortColumn>,
    desc: bool,
) -> Result<(), Box<dyn Error>> {
    let mut controller = RecordListController::new(store);
    controller.load()?;
    if let Some(term) = search {
        controller.set_search_term(term);
    }
    if let Some(column) = sort {
        controller.sort_by(column.into());
        if desc {
            controller.sort_by(column.into());
        }
    }

    let header = Field::ALL
        .iter()
        .map(|field| match controller.sort_indicator(*field) {
            Some(arrow) => format!("{field} {arrow}"),
            None => field.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\t");
    println!("id\t{header}");

    let view = controller.view();
    for row in &view.rows {
        let record = &row.record;
        println!(
            "{}\t{}\t{}\t{}",
            record.id, record.name, record.email, record.phone
        );
    }
    println!("{} of {} records", view.rows.len(), view.total);
    Ok(())
}

fn edit(
    store: &SqliteRecordStore<'_>,
    id: Uuid,
    changes: [(Field, Option<String>); 3],
) -> Result<(), Box<dyn Error>> {
    let mut controller = RecordListController::new(store);
    controller.load()?;
    controller.begin_edit(id)?;
    if let Some(draft) = controller.edit_draft_mut() {
        for (field, value) in changes {
            if let Some(value) = value {
                draft.set(field, value);
            }
        }
    }

    let record = controller.submit_edit()?;
    if let Some(notice) = controller.take_notice() {
        println!("{}", notice.message);
    }
    println!(
        "{}\t{}\t{}\t{}",
        record.id, record.name, record.email, record.phone
    );
    Ok(())
}

fn delete(store: &SqliteRecordStore<'_>, id: Uuid) -> Result<(), Box<dyn Error>> {
    let mut controller = RecordListController::new(store);
    controller.load()?;
    controller.request_delete(id)?;
    controller.confirm_delete()?;
    if let Some(notice) = controller.take_notice() {
        println!("{}", notice.message);
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Register { .. } => "register",
        Command::List { .. } => "list",
        Command::Edit { .. } => "edit",
        Command::Delete { .. } => "delete",
        Command::Version => "version",
    }
}
