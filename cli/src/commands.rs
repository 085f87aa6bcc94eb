//! Maps parsed subcommands onto client calls.

use hakuna_core::{ApiError, HakunaClient};
use serde_json::Value;

use crate::args::{Command, EntryCommand, TimerCommand};

/// Runs `command` and returns the body to print. Status-only calls resolve
/// to `None`.
pub async fn execute(client: &HakunaClient, command: &Command) -> Result<Option<Value>, ApiError> {
    let body = match command {
        Command::Overview => client.overview().await?,
        Command::Me => client.get_own_user().await?,
        Command::Users => client.list_manageable_users().await?,
        Command::Timer(timer) => return timer_command(client, timer).await,
        Command::Entries(entries) => return entry_command(client, entries).await,
        Command::Absences { year } => client.list_absences(*year).await?,
        Command::Projects => client.list_projects().await?,
        Command::TimeTypes => client.list_time_types().await?,
        Command::Tasks => client.list_tasks().await?,
        Command::OrgStatus { api_key } => client.organization_status(api_key.as_deref()).await?,
    };
    Ok(Some(body))
}

async fn timer_command(client: &HakunaClient, command: &TimerCommand) -> Result<Option<Value>, ApiError> {
    let body = match command {
        TimerCommand::Show => client.get_timer().await?,
        TimerCommand::Start { .. } => {
            let payload = command.start_payload().unwrap_or_default();
            client.start_timer(&payload).await?
        }
        TimerCommand::Stop { .. } => {
            let payload = command.stop_payload().unwrap_or_default();
            client.stop_timer(&payload).await?
        }
        TimerCommand::Cancel => {
            client.cancel_timer().await?;
            return Ok(None);
        }
    };
    Ok(Some(body))
}

async fn entry_command(client: &HakunaClient, command: &EntryCommand) -> Result<Option<Value>, ApiError> {
    let body = match command {
        EntryCommand::List { date } => client.list_time_entries(*date).await?,
        EntryCommand::Get { id } => client.get_time_entry(*id).await?,
        EntryCommand::Create(fields) => client.create_time_entry(&fields.new_entry()).await?,
        EntryCommand::Update { id, fields } => client.update_time_entry(&fields.update(*id)).await?,
        EntryCommand::Delete { id } => {
            client.delete_time_entry(*id).await?;
            return Ok(None);
        }
    };
    Ok(Some(body))
}
