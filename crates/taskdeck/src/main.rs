//! CLI entry point for taskdeck.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use time::{Date, UtcOffset};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use taskdeck_app::AppConfig;
use taskdeck_core::due::parse_date;
use taskdeck_core::{SortDirection, SortKey, TaskId, TaskPriority, TaskStatus};

mod commands;
mod render;
mod token;

/// Task list client for a remote task service.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "taskdeck: filter, sort and edit your remote task list")]
struct Cli {
    /// Configuration file (defaults to the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Task service base URL, overriding the configuration.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the session token.
    Logout,

    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Show the filtered and sorted task list.
    #[command(alias = "ls")]
    List {
        /// Case-insensitive title search.
        #[arg(short = 's', long)]
        search: Option<String>,
        /// Accepted statuses (repeatable).
        #[arg(long = "status")]
        statuses: Vec<TaskStatus>,
        /// Accepted priorities (repeatable).
        #[arg(short = 'p', long = "priority")]
        priorities: Vec<TaskPriority>,
        /// Earliest due day (YYYY-MM-DD).
        #[arg(long, value_parser = parse_day)]
        from: Option<Date>,
        /// Latest due day, inclusive (YYYY-MM-DD).
        #[arg(long, value_parser = parse_day)]
        to: Option<Date>,
        /// Sort key: due-date, priority, status or title.
        #[arg(long)]
        sort: Option<SortKey>,
        /// Sort direction: asc or desc.
        #[arg(long)]
        direction: Option<SortDirection>,
        /// Print the view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Create a task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Due date or date-time; defaults to now.
        #[arg(long)]
        due: Option<String>,
    },

    /// Change fields of an existing task.
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        due: Option<String>,
    },

    /// Toggle a task between completed and to-do.
    Done { id: TaskId },

    /// Delete a task.
    #[command(alias = "delete")]
    Rm { id: TaskId },
}

fn parse_day(raw: &str) -> Result<Date, String> {
    parse_date(raw).ok_or_else(|| format!("'{raw}' is not a YYYY-MM-DD date"))
}

fn main() -> Result<()> {
    // Must run before any other thread exists.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let Cli { config, api_url, cmd } = Cli::parse();

    install_tracing();

    let mut config = AppConfig::load(config.as_deref())?;
    if let Some(url) = api_url {
        config = config.with_overrides(|_| Some(url.clone()))?;
    }

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(commands::run(cmd, &config, offset))
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parse_list_command() {
        let cli = Cli::parse_from([
            "taskdeck",
            "list",
            "--search",
            "proj",
            "--status",
            "todo",
            "--status",
            "in-progress",
            "-p",
            "URGENT",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-05",
            "--sort",
            "priority",
            "--direction",
            "asc",
        ]);

        match cli.cmd {
            Command::List {
                search,
                statuses,
                priorities,
                from,
                to,
                sort,
                direction,
                json,
            } => {
                assert_eq!(search.as_deref(), Some("proj"));
                assert_eq!(statuses, vec![TaskStatus::Todo, TaskStatus::InProgress]);
                assert_eq!(priorities, vec![TaskPriority::Urgent]);
                assert_eq!(from, Some(date!(2024 - 01 - 01)));
                assert_eq!(to, Some(date!(2024 - 01 - 05)));
                assert_eq!(sort, Some(SortKey::Priority));
                assert_eq!(direction, Some(SortDirection::Asc));
                assert!(!json);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from([
            "taskdeck",
            "add",
            "--title",
            "Write report",
            "--priority",
            "high",
            "--due",
            "2024-02-01",
        ]);

        match cli.cmd {
            Command::Add {
                title,
                priority,
                due,
                status,
                ..
            } => {
                assert_eq!(title, "Write report");
                assert_eq!(priority, Some(TaskPriority::High));
                assert_eq!(due.as_deref(), Some("2024-02-01"));
                assert_eq!(status, None);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_id_commands() {
        let cli = Cli::parse_from(["taskdeck", "done", "#12"]);
        assert!(matches!(cli.cmd, Command::Done { id } if id == TaskId(12)));

        let cli = Cli::parse_from(["taskdeck", "--api-url", "http://127.0.0.1:9000", "rm", "7"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(matches!(cli.cmd, Command::Rm { id } if id == TaskId(7)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["taskdeck", "list", "--status", "finished"]).is_err());
        assert!(Cli::try_parse_from(["taskdeck", "list", "--from", "01/05/2024"]).is_err());
        assert!(Cli::try_parse_from(["taskdeck", "done", "abc"]).is_err());
    }

    #[test]
    fn parse_edit_command() {
        let cli = Cli::parse_from(["taskdeck", "edit", "3", "--title", "Renamed", "--status", "cancelled"]);
        match cli.cmd {
            Command::Edit {
                id, title, status, ..
            } => {
                assert_eq!(id, TaskId(3));
                assert_eq!(title.as_deref(), Some("Renamed"));
                assert_eq!(status, Some(TaskStatus::Cancelled));
            }
            _ => panic!("expected edit command"),
        }
    }
}
