mod config;
mod db;
mod search;
mod seed;
mod service;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use config::Config;
use db::Database;
use service::CrmService;

#[derive(Parser, Debug)]
#[command(name = "crmx")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file and create the database
    Init(InitArgs),
    /// Populate the database with demo companies, statuses, and contacts
    Seed(SeedArgs),
    /// Query contacts matching a filter (tab-separated output)
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Overwrite an existing configuration
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Where to create the database (defaults to the platform data dir)
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Number of demo contacts to create
    #[arg(long, default_value_t = seed::DEFAULT_CONTACT_COUNT)]
    count: usize,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Search term (matches first or last name)
    query: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        match command {
            Command::Init(args) => return handle_init(cli.config.as_deref(), args),
            Command::Seed(args) => {
                let config = config::load(cli.config.as_deref())?;
                return handle_seed(&config, args);
            }
            Command::Query(args) => {
                let config = config::load(cli.config.as_deref())?;
                return handle_query(&config, args);
            }
        }
    }

    let config = config::load(cli.config.as_deref())?;
    println!("Loaded configuration from {}", config.config_path.display());

    let mut service = CrmService::open(&config.db_path)?;
    let mut app = ui::app::App::new(&mut service, &config)?;
    app.run()?;

    Ok(())
}

fn handle_init(config_override: Option<&Path>, args: InitArgs) -> Result<()> {
    let config_path = match config_override {
        Some(path) => path.to_path_buf(),
        None => config::default_config_path()?,
    };
    let db_path = match args.db_path {
        Some(path) => path,
        None => config::default_db_path()?,
    };

    config::write_default(&config_path, &db_path, args.force)?;
    Database::open(&db_path)?;

    println!("Initialized crmx configuration at {}", config_path.display());
    println!("Database created at {}", db_path.display());
    Ok(())
}

fn handle_seed(config: &Config, args: SeedArgs) -> Result<()> {
    let mut db = Database::open(&config.db_path)?;
    let report = seed::seed(&mut db, args.count)?;

    if report.skipped {
        println!("Database already contains contacts; skipping seed.");
    } else {
        println!(
            "Seeded {} companies, {} statuses, {} contacts.",
            report.companies, report.statuses, report.contacts
        );
    }
    Ok(())
}

fn handle_query(config: &Config, args: QueryArgs) -> Result<()> {
    let service = CrmService::open(&config.db_path)?;
    let results = service.find_all_contacts(&args.query)?;

    if results.is_empty() {
        println!("No matches for \"{}\"", args.query);
    } else {
        println!(
            "Found {} contact(s) matching \"{}\"",
            results.len(),
            args.query
        );
    }

    // Results: name<TAB>email<TAB>company<TAB>status
    for entry in results {
        println!(
            "{} {}\t{}\t{}\t{}",
            entry.first_name,
            entry.last_name,
            entry.email,
            entry.company_name.as_deref().unwrap_or("-"),
            entry.status_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
