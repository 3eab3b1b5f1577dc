//! BigQuery Data Transfer samples: scheduled queries and manual runs.

use crate::output::handled;
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use gcp_client::services::data_transfer::{TransferConfig, SCHEDULED_QUERY};
use gcp_client::{FieldMask, GcpClient, ResourceName};
use serde_json::json;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DataTransferArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    #[arg(long, default_value = "us")]
    pub location: String,

    #[command(subcommand)]
    pub command: DataTransferCommand,
}

#[derive(Subcommand, Debug)]
pub enum DataTransferCommand {
    /// Schedule a query that writes into a dataset
    CreateScheduledQuery {
        #[arg(long)]
        dataset_id: String,
        #[arg(long)]
        query: String,
        #[arg(long, default_value = "Scheduled query")]
        display_name: String,
        #[arg(long, default_value = "every 24 hours")]
        schedule: String,
        /// Destination table, may use run-time parameters such as {run_date}
        #[arg(long, default_value = "scheduled_query_{run_date}")]
        table_template: String,
        #[arg(long)]
        service_account: Option<String>,
    },
    GetTransferConfig {
        #[arg(long)]
        config_id: String,
    },
    ListTransferConfigs,
    UpdateTransferConfig {
        #[arg(long)]
        config_id: String,
        #[arg(long)]
        display_name: String,
    },
    DeleteTransferConfig {
        #[arg(long)]
        config_id: String,
    },
    /// Request an immediate run
    StartManualRun {
        #[arg(long)]
        config_id: String,
    },
    ListTransferRuns {
        #[arg(long)]
        config_id: String,
    },
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: DataTransferArgs) -> Result<()> {
    let parent = ResourceName::project(&args.project_id)?.location(&args.location)?;

    match args.command {
        DataTransferCommand::CreateScheduledQuery {
            dataset_id,
            query,
            display_name,
            schedule,
            table_template,
            service_account,
        } => {
            let config = scheduled_query(&dataset_id, &query, &display_name, &schedule, &table_template);
            create_transfer_config(client, out, &parent, &config, service_account.as_deref()).await
        }
        DataTransferCommand::GetTransferConfig { config_id } => {
            get_transfer_config(client, out, &parent, &config_id).await
        }
        DataTransferCommand::ListTransferConfigs => list_transfer_configs(client, out, &parent).await,
        DataTransferCommand::UpdateTransferConfig {
            config_id,
            display_name,
        } => update_transfer_config(client, out, &parent, &config_id, &display_name).await,
        DataTransferCommand::DeleteTransferConfig { config_id } => {
            delete_transfer_config(client, out, &parent, &config_id).await
        }
        DataTransferCommand::StartManualRun { config_id } => {
            start_manual_run(client, out, &parent, &config_id).await
        }
        DataTransferCommand::ListTransferRuns { config_id } => {
            list_transfer_runs(client, out, &parent, &config_id).await
        }
    }
}

/// Transfer config for a scheduled query truncating its destination table.
pub fn scheduled_query(
    dataset_id: &str,
    query: &str,
    display_name: &str,
    schedule: &str,
    table_template: &str,
) -> TransferConfig {
    TransferConfig {
        display_name: Some(display_name.to_string()),
        data_source_id: Some(SCHEDULED_QUERY.to_string()),
        destination_dataset_id: Some(dataset_id.to_string()),
        params: Some(json!({
            "query": query,
            "destination_table_name_template": table_template,
            "write_disposition": "WRITE_TRUNCATE",
            "partitioning_field": "",
        })),
        schedule: Some(schedule.to_string()),
        ..Default::default()
    }
}

fn config_name(parent: &ResourceName, config_id: &str) -> Result<String> {
    Ok(parent.clone().child("transferConfigs", config_id)?.to_string())
}

pub async fn create_transfer_config(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    config: &TransferConfig,
    service_account: Option<&str>,
) -> Result<()> {
    let result = client
        .data_transfer()
        .create_transfer_config(&parent.to_string(), config, service_account)
        .await;
    let display_name = config.display_name.as_deref().unwrap_or_default();
    let Some(created) = handled(out, result, "Transfer config", display_name)? else {
        return Ok(());
    };
    writeln!(out, "Created transfer config: {}", created.name)?;
    Ok(())
}

pub async fn get_transfer_config(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    config_id: &str,
) -> Result<()> {
    let name = config_name(parent, config_id)?;
    let result = client.data_transfer().get_transfer_config(&name).await;
    let Some(config) = handled(out, result, "Transfer config", config_id)? else {
        return Ok(());
    };
    writeln!(out, "Transfer config: {}", config.name)?;
    writeln!(out, "  Display name: {}", config.display_name.as_deref().unwrap_or_default())?;
    writeln!(out, "  Data source: {}", config.data_source_id.as_deref().unwrap_or_default())?;
    writeln!(out, "  Schedule: {}", config.schedule.as_deref().unwrap_or_default())?;
    if let Some(state) = &config.state {
        writeln!(out, "  State: {}", state)?;
    }
    if let Some(next_run) = &config.next_run_time {
        writeln!(out, "  Next run: {}", next_run)?;
    }
    Ok(())
}

pub async fn list_transfer_configs(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
) -> Result<()> {
    let result = client
        .data_transfer()
        .list_transfer_configs(&parent.to_string())
        .await;
    let Some(configs) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for config in &configs {
        writeln!(
            out,
            "{} ({})",
            config.name,
            config.display_name.as_deref().unwrap_or_default()
        )?;
    }
    if configs.is_empty() {
        writeln!(out, "No transfer configs found.")?;
    }
    Ok(())
}

pub async fn update_transfer_config(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    config_id: &str,
    display_name: &str,
) -> Result<()> {
    let config = TransferConfig {
        name: config_name(parent, config_id)?,
        display_name: Some(display_name.to_string()),
        ..Default::default()
    };
    let result = client
        .data_transfer()
        .update_transfer_config(&config, &FieldMask::new().with("display_name"))
        .await;
    let Some(updated) = handled(out, result, "Transfer config", config_id)? else {
        return Ok(());
    };
    writeln!(
        out,
        "Updated transfer config {} with display name '{}'",
        updated.name,
        updated.display_name.as_deref().unwrap_or_default()
    )?;
    Ok(())
}

pub async fn delete_transfer_config(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    config_id: &str,
) -> Result<()> {
    let name = config_name(parent, config_id)?;
    let result = client.data_transfer().delete_transfer_config(&name).await;
    if handled(out, result, "Transfer config", config_id)?.is_some() {
        writeln!(out, "Deleted transfer config {}", name)?;
    }
    Ok(())
}

pub async fn start_manual_run(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    config_id: &str,
) -> Result<()> {
    let name = config_name(parent, config_id)?;
    let result = client
        .data_transfer()
        .start_manual_runs(&name, Utc::now())
        .await;
    let Some(response) = handled(out, result, "Transfer config", config_id)? else {
        return Ok(());
    };
    for run in &response.runs {
        writeln!(out, "Started transfer run: {} ({})", run.name, run.state)?;
    }
    Ok(())
}

pub async fn list_transfer_runs(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    config_id: &str,
) -> Result<()> {
    let name = config_name(parent, config_id)?;
    let result = client.data_transfer().list_transfer_runs(&name).await;
    let Some(runs) = handled(out, result, "Transfer config", config_id)? else {
        return Ok(());
    };
    for run in &runs {
        write!(out, "Run {}: {}", run.name, run.state)?;
        if let Some(error) = &run.error_status {
            write!(out, " ({})", error.message)?;
        }
        writeln!(out)?;
    }
    if runs.is_empty() {
        writeln!(out, "No transfer runs found.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_query_params() {
        let config = scheduled_query(
            "reports",
            "SELECT 1",
            "Daily report",
            "every 24 hours",
            "report_{run_date}",
        );
        assert_eq!(config.data_source_id.as_deref(), Some("scheduled_query"));
        let params = config.params.unwrap();
        assert_eq!(params["query"], "SELECT 1");
        assert_eq!(params["destination_table_name_template"], "report_{run_date}");
        assert_eq!(params["write_disposition"], "WRITE_TRUNCATE");
    }
}
