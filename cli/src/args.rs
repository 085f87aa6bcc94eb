//! Command-line arguments.
//!
//! # Environment Variables
//!
//! | Variable | Flag | Description |
//! |----------|------|-------------|
//! | `HAKUNA_AUTH_TOKEN` | `--token` | API token (required) |
//! | `HAKUNA_TENANT` | `--tenant` | Company subdomain (required) |
//! | `HAKUNA_USER_AGENT` | `--user-agent` | User-Agent header |
//! | `HAKUNA_BASE_URL` | `--base-url` | Replaces `https://{tenant}.hakuna.ch/api/v1` |
//! | `HAKUNA_AS_USER` | `--as-user` | Act on a managed user's personal resources |
//! | `HAKUNA_LOG_LEVEL` | `--log-level` | Fallback when `RUST_LOG` is unset |

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hakuna_core::{ApiError, ClientConfig, NewTimeEntry, StartTimer, StopTimer, TimeEntryUpdate};

#[derive(Debug, Parser)]
#[command(name = "hakuna", version, about = "Command-line client for the Hakuna time-tracking API")]
pub struct Cli {
    /// API token.
    #[arg(long, env = "HAKUNA_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Company subdomain, e.g. `acme` for acme.hakuna.ch.
    #[arg(long, env = "HAKUNA_TENANT")]
    pub tenant: Option<String>,

    #[arg(long, env = "HAKUNA_USER_AGENT", default_value = concat!("hakuna-cli/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    #[arg(long, env = "HAKUNA_BASE_URL")]
    pub base_url: Option<String>,

    /// Scope personal resources to this user id.
    #[arg(long, env = "HAKUNA_AS_USER")]
    pub as_user: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HAKUNA_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn client_config(&self) -> Result<ClientConfig, ApiError> {
        let mut builder = ClientConfig::builder().user_agent(&self.user_agent);
        if let Some(token) = &self.token {
            builder = builder.auth_token(token);
        }
        if let Some(tenant) = &self.tenant {
            builder = builder.tenant(tenant);
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Overtime, vacation and timer summary.
    Overview,
    /// The authenticated user.
    Me,
    /// Users the token may manage.
    Users,
    #[command(subcommand)]
    Timer(TimerCommand),
    #[command(subcommand)]
    Entries(EntryCommand),
    Absences {
        #[arg(long)]
        year: i32,
    },
    Projects,
    TimeTypes,
    Tasks,
    /// Presence status of the whole organization.
    OrgStatus {
        /// Organization API key used instead of the token for this call.
        #[arg(long, env = "HAKUNA_ORGANIZATION_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TimerCommand {
    Show,
    Start {
        #[arg(long)]
        task: Option<u64>,
        #[arg(long)]
        time_type: Option<u64>,
        #[arg(long)]
        project: Option<u64>,
        /// HH:MM, defaults to now.
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    Stop {
        /// HH:MM, defaults to now.
        #[arg(long)]
        end: Option<String>,
    },
    Cancel,
}

impl TimerCommand {
    pub fn start_payload(&self) -> Option<StartTimer> {
        match self {
            TimerCommand::Start {
                task,
                time_type,
                project,
                start,
                note,
            } => Some(StartTimer {
                task_id: *task,
                time_type_id: *time_type,
                start_time: start.clone(),
                project_id: *project,
                note: note.clone(),
            }),
            _ => None,
        }
    }

    pub fn stop_payload(&self) -> Option<StopTimer> {
        match self {
            TimerCommand::Stop { end } => Some(StopTimer { end_time: end.clone() }),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    List {
        #[arg(long)]
        date: NaiveDate,
    },
    Get {
        id: u64,
    },
    Create(EntryFields),
    Update {
        id: u64,
        #[command(flatten)]
        fields: EntryFields,
    },
    Delete {
        id: u64,
    },
}

#[derive(Debug, Clone, Args)]
pub struct EntryFields {
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub task: Option<u64>,
    #[arg(long)]
    pub time_type: Option<u64>,
    #[arg(long)]
    pub project: Option<u64>,
    #[arg(long)]
    pub note: Option<String>,
}

impl EntryFields {
    pub fn new_entry(&self) -> NewTimeEntry {
        NewTimeEntry {
            date: self.date.map(|d| d.to_string()),
            start_time: self.start.clone(),
            end_time: self.end.clone(),
            task_id: self.task,
            time_type_id: self.time_type,
            project_id: self.project,
            note: self.note.clone(),
        }
    }

    pub fn update(&self, id: u64) -> TimeEntryUpdate {
        TimeEntryUpdate {
            id,
            date: self.date.map(|d| d.to_string()),
            start_time: self.start.clone(),
            end_time: self.end.clone(),
            task_id: self.task,
            time_type_id: self.time_type,
            project_id: self.project,
            note: self.note.clone(),
        }
    }
}
