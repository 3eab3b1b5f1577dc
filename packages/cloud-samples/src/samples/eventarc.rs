//! Eventarc samples: message buses and triggers.

use crate::output::handled;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use gcp_client::services::eventarc::{CloudRun, Destination, EventFilter, LoggingConfig, MessageBus, Trigger};
use gcp_client::{FieldMask, GcpClient, ResourceName};
use std::io::Write;

#[derive(Args, Debug)]
pub struct EventarcArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    #[arg(long, default_value = "us-central1")]
    pub location: String,

    #[command(subcommand)]
    pub command: EventarcCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventarcCommand {
    CreateMessageBus {
        #[arg(long)]
        message_bus_id: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    GetMessageBus {
        #[arg(long)]
        message_bus_id: String,
    },
    ListMessageBuses,
    UpdateMessageBus {
        #[arg(long)]
        message_bus_id: String,
        #[arg(long)]
        display_name: Option<String>,
        /// NONE, DEBUG, INFO, NOTICE, WARNING, ERROR, CRITICAL, ALERT or EMERGENCY
        #[arg(long)]
        log_severity: Option<String>,
    },
    DeleteMessageBus {
        #[arg(long)]
        message_bus_id: String,
    },
    /// Route events of one type to a Cloud Run service
    CreateTrigger {
        #[arg(long)]
        trigger_id: String,
        /// Cloud Run service name
        #[arg(long)]
        service: String,
        #[arg(long, default_value = "google.cloud.pubsub.topic.v1.messagePublished")]
        event_type: String,
        #[arg(long)]
        service_account: String,
        #[arg(long)]
        path: Option<String>,
    },
    GetTrigger {
        #[arg(long)]
        trigger_id: String,
    },
    ListTriggers,
    DeleteTrigger {
        #[arg(long)]
        trigger_id: String,
    },
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: EventarcArgs) -> Result<()> {
    let parent = ResourceName::project(&args.project_id)?.location(&args.location)?;

    match args.command {
        EventarcCommand::CreateMessageBus {
            message_bus_id,
            display_name,
        } => {
            let bus = MessageBus {
                display_name,
                ..Default::default()
            };
            create_message_bus(client, out, &parent, &message_bus_id, &bus).await
        }
        EventarcCommand::GetMessageBus { message_bus_id } => {
            get_message_bus(client, out, &parent, &message_bus_id).await
        }
        EventarcCommand::ListMessageBuses => list_message_buses(client, out, &parent).await,
        EventarcCommand::UpdateMessageBus {
            message_bus_id,
            display_name,
            log_severity,
        } => update_message_bus(client, out, &parent, &message_bus_id, display_name, log_severity).await,
        EventarcCommand::DeleteMessageBus { message_bus_id } => {
            delete_message_bus(client, out, &parent, &message_bus_id).await
        }
        EventarcCommand::CreateTrigger {
            trigger_id,
            service,
            event_type,
            service_account,
            path,
        } => {
            let trigger = Trigger {
                event_filters: vec![EventFilter {
                    attribute: "type".to_string(),
                    value: event_type,
                    operator: None,
                }],
                service_account: Some(service_account),
                destination: Some(Destination {
                    cloud_run: Some(CloudRun {
                        service,
                        path,
                        region: args.location.clone(),
                    }),
                }),
                ..Default::default()
            };
            create_trigger(client, out, &parent, &trigger_id, &trigger).await
        }
        EventarcCommand::GetTrigger { trigger_id } => get_trigger(client, out, &parent, &trigger_id).await,
        EventarcCommand::ListTriggers => list_triggers(client, out, &parent).await,
        EventarcCommand::DeleteTrigger { trigger_id } => {
            delete_trigger(client, out, &parent, &trigger_id).await
        }
    }
}

// =============================================================================
// Message buses
// =============================================================================

pub async fn create_message_bus(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    message_bus_id: &str,
    bus: &MessageBus,
) -> Result<()> {
    let result = client
        .eventarc()
        .create_message_bus(&parent.to_string(), message_bus_id, bus)
        .await;
    let Some(created) = handled(out, result, "Message bus", message_bus_id)? else {
        return Ok(());
    };
    writeln!(out, "Created message bus: {}", created.name)?;
    Ok(())
}

pub async fn get_message_bus(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    message_bus_id: &str,
) -> Result<()> {
    let name = parent.clone().child("messageBuses", message_bus_id)?.to_string();
    let result = client.eventarc().get_message_bus(&name).await;
    let Some(bus) = handled(out, result, "Message bus", message_bus_id)? else {
        return Ok(());
    };
    writeln!(out, "Message bus {}", bus.name)?;
    if let Some(display_name) = &bus.display_name {
        writeln!(out, "  Display name: {}", display_name)?;
    }
    if let Some(logging) = &bus.logging_config {
        writeln!(out, "  Log severity: {}", logging.log_severity)?;
    }
    Ok(())
}

pub async fn list_message_buses(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
) -> Result<()> {
    let result = client.eventarc().list_message_buses(&parent.to_string()).await;
    let Some(buses) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for bus in &buses {
        writeln!(out, "Message bus: {}", bus.name)?;
    }
    if buses.is_empty() {
        writeln!(out, "No message buses found.")?;
    }
    Ok(())
}

pub async fn update_message_bus(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    message_bus_id: &str,
    display_name: Option<String>,
    log_severity: Option<String>,
) -> Result<()> {
    let mut mask = FieldMask::new();
    if display_name.is_some() {
        mask.push("display_name");
    }
    if log_severity.is_some() {
        mask.push("logging_config");
    }
    if mask.is_empty() {
        bail!("Nothing to update: pass --display-name and/or --log-severity");
    }

    let bus = MessageBus {
        name: parent.clone().child("messageBuses", message_bus_id)?.to_string(),
        display_name,
        logging_config: log_severity.map(|log_severity| LoggingConfig { log_severity }),
        ..Default::default()
    };
    let result = client.eventarc().update_message_bus(&bus, &mask).await;
    let Some(updated) = handled(out, result, "Message bus", message_bus_id)? else {
        return Ok(());
    };
    writeln!(out, "Updated message bus: {}", updated.name)?;
    Ok(())
}

pub async fn delete_message_bus(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    message_bus_id: &str,
) -> Result<()> {
    let name = parent.clone().child("messageBuses", message_bus_id)?.to_string();
    let result = client.eventarc().delete_message_bus(&name).await;
    if handled(out, result, "Message bus", message_bus_id)?.is_some() {
        writeln!(out, "Deleted message bus: {}", name)?;
    }
    Ok(())
}

// =============================================================================
// Triggers
// =============================================================================

pub async fn create_trigger(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    trigger_id: &str,
    trigger: &Trigger,
) -> Result<()> {
    let result = client
        .eventarc()
        .create_trigger(&parent.to_string(), trigger_id, trigger)
        .await;
    let Some(created) = handled(out, result, "Trigger", trigger_id)? else {
        return Ok(());
    };
    writeln!(out, "Created trigger: {}", created.name)?;
    Ok(())
}

pub async fn get_trigger(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    trigger_id: &str,
) -> Result<()> {
    let name = parent.clone().child("triggers", trigger_id)?.to_string();
    let result = client.eventarc().get_trigger(&name).await;
    let Some(trigger) = handled(out, result, "Trigger", trigger_id)? else {
        return Ok(());
    };
    writeln!(out, "Trigger {}", trigger.name)?;
    writeln!(out, "  Event type: {}", trigger.event_type().unwrap_or_default())?;
    if let Some(run) = trigger.destination.as_ref().and_then(|d| d.cloud_run.as_ref()) {
        writeln!(out, "  Destination: Cloud Run service {} in {}", run.service, run.region)?;
    }
    Ok(())
}

pub async fn list_triggers(client: &GcpClient, out: &mut dyn Write, parent: &ResourceName) -> Result<()> {
    let result = client.eventarc().list_triggers(&parent.to_string()).await;
    let Some(triggers) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for trigger in &triggers {
        writeln!(
            out,
            "Trigger: {} ({})",
            trigger.name,
            trigger.event_type().unwrap_or_default()
        )?;
    }
    if triggers.is_empty() {
        writeln!(out, "No triggers found.")?;
    }
    Ok(())
}

pub async fn delete_trigger(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    trigger_id: &str,
) -> Result<()> {
    let name = parent.clone().child("triggers", trigger_id)?.to_string();
    let result = client.eventarc().delete_trigger(&name).await;
    if handled(out, result, "Trigger", trigger_id)?.is_some() {
        writeln!(out, "Deleted trigger: {}", name)?;
    }
    Ok(())
}
