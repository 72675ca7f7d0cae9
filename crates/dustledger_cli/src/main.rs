//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a user database and print one search page as JSON.
//! - Optionally seed demo users so a fresh database has something to list.
//!
//! Paging and sort options are passed through as raw text; the core
//! normalization decides what is valid, exactly as for any other caller.

use clap::{ArgAction, Parser};
use dustledger_core::db::open_db;
use dustledger_core::{
    default_log_level, init_logging, RawSearchParams, SqliteUserRepository, UserCreateCommand,
    UserFilter, UserService,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

const DEMO_USERS: &[(&str, i64)] = &[
    ("Ada Lovelace", 120),
    ("alan turing", 80),
    ("Grace Hopper", 300),
    ("Edsger Dijkstra", 0),
    ("Barbara Liskov", 42),
];

#[derive(Parser, Debug)]
#[command(
    name = "dustledger",
    version,
    about = "Print one page of users from a dustledger database as JSON"
)]
struct Cli {
    /// SQLite database file; created and migrated when missing
    #[arg(env = "DUSTLEDGER_DB")]
    db_path: PathBuf,

    /// Insert demo users before listing
    #[arg(long, action = ArgAction::SetTrue)]
    seed: bool,

    /// Page number (1-based)
    #[arg(long)]
    page: Option<String>,

    /// Users per page
    #[arg(long)]
    per_page: Option<String>,

    /// Sort field (display_name, created_at, dust_balance)
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction (asc, desc)
    #[arg(long)]
    sort_dir: Option<String>,

    /// Case-insensitive display name substring
    #[arg(long)]
    filter: Option<String>,

    /// Absolute directory for rotating log files; logging is off without it
    #[arg(long, env = "DUSTLEDGER_LOG_DIR")]
    log_dir: Option<String>,
}

impl Cli {
    fn search_request(&self) -> RawSearchParams<UserFilter> {
        let mut raw = RawSearchParams::new();
        if let Some(page) = &self.page {
            raw = raw.page(page.as_str());
        }
        if let Some(per_page) = &self.per_page {
            raw = raw.per_page(per_page.as_str());
        }
        if let Some(sort) = &self.sort {
            raw = raw.sort(sort.as_str());
        }
        if let Some(sort_dir) = &self.sort_dir {
            raw = raw.sort_dir(sort_dir.as_str());
        }
        if let Some(filter) = &self.filter {
            raw = raw.filter(filter.clone());
        }
        raw
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level(), log_dir)?;
    }

    let conn = open_db(&cli.db_path).map_err(|err| err.to_string())?;
    let repo = SqliteUserRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let mut service = UserService::new(repo);

    if cli.seed {
        for (name, dust) in DEMO_USERS {
            let mut command = UserCreateCommand::new(*name);
            command.dust_balance = Some(*dust);
            service.create_user(command).map_err(|err| err.to_string())?;
        }
        info!(
            "event=cli_seed module=cli status=ok count={}",
            DEMO_USERS.len()
        );
    }

    let page = service
        .list_users(cli.search_request())
        .map_err(|err| err.to_string())?;
    let json = serde_json::to_string_pretty(&page).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}
