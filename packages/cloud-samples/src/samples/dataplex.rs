//! Dataplex samples: lakes, catalog entry groups and entry search.

use crate::output::handled;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use gcp_client::services::dataplex::{EntryGroup, Lake};
use gcp_client::{FieldMask, GcpClient, ResourceName};
use std::io::Write;

#[derive(Args, Debug)]
pub struct DataplexArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    #[arg(long, default_value = "us-central1")]
    pub location: String,

    #[command(subcommand)]
    pub command: DataplexCommand,
}

#[derive(Subcommand, Debug)]
pub enum DataplexCommand {
    CreateLake {
        #[arg(long)]
        lake_id: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    GetLake {
        #[arg(long)]
        lake_id: String,
    },
    ListLakes,
    UpdateLake {
        #[arg(long)]
        lake_id: String,
        #[command(flatten)]
        changes: DescriptiveFields,
    },
    DeleteLake {
        #[arg(long)]
        lake_id: String,
    },
    CreateEntryGroup {
        #[arg(long)]
        entry_group_id: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    GetEntryGroup {
        #[arg(long)]
        entry_group_id: String,
    },
    ListEntryGroups,
    UpdateEntryGroup {
        #[arg(long)]
        entry_group_id: String,
        #[command(flatten)]
        changes: DescriptiveFields,
    },
    DeleteEntryGroup {
        #[arg(long)]
        entry_group_id: String,
    },
    /// Search the catalog across all locations
    SearchEntries {
        #[arg(long)]
        query: String,
    },
}

/// Display name and description changes of an update.
#[derive(Args, Debug, Default, Clone)]
pub struct DescriptiveFields {
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl DescriptiveFields {
    fn mask(&self) -> Result<FieldMask> {
        let mut mask = FieldMask::new();
        if self.display_name.is_some() {
            mask.push("display_name");
        }
        if self.description.is_some() {
            mask.push("description");
        }
        if mask.is_empty() {
            bail!("Nothing to update: pass --display-name and/or --description");
        }
        Ok(mask)
    }
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: DataplexArgs) -> Result<()> {
    let project = ResourceName::project(&args.project_id)?;
    let parent = project.clone().location(&args.location)?;

    match args.command {
        DataplexCommand::CreateLake {
            lake_id,
            display_name,
            description,
        } => {
            let lake = Lake {
                display_name,
                description,
                ..Default::default()
            };
            create_lake(client, out, &parent, &lake_id, &lake).await
        }
        DataplexCommand::GetLake { lake_id } => get_lake(client, out, &parent, &lake_id).await,
        DataplexCommand::ListLakes => list_lakes(client, out, &parent).await,
        DataplexCommand::UpdateLake { lake_id, changes } => {
            update_lake(client, out, &parent, &lake_id, changes).await
        }
        DataplexCommand::DeleteLake { lake_id } => delete_lake(client, out, &parent, &lake_id).await,
        DataplexCommand::CreateEntryGroup {
            entry_group_id,
            display_name,
            description,
        } => {
            let entry_group = EntryGroup {
                display_name,
                description,
                ..Default::default()
            };
            create_entry_group(client, out, &parent, &entry_group_id, &entry_group).await
        }
        DataplexCommand::GetEntryGroup { entry_group_id } => {
            get_entry_group(client, out, &parent, &entry_group_id).await
        }
        DataplexCommand::ListEntryGroups => list_entry_groups(client, out, &parent).await,
        DataplexCommand::UpdateEntryGroup {
            entry_group_id,
            changes,
        } => update_entry_group(client, out, &parent, &entry_group_id, changes).await,
        DataplexCommand::DeleteEntryGroup { entry_group_id } => {
            delete_entry_group(client, out, &parent, &entry_group_id).await
        }
        DataplexCommand::SearchEntries { query } => {
            // Catalog search is served from the global location only.
            let global = project.location("global")?;
            search_entries(client, out, &global, &query).await
        }
    }
}

// =============================================================================
// Lakes
// =============================================================================

pub async fn create_lake(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    lake_id: &str,
    lake: &Lake,
) -> Result<()> {
    let result = client
        .dataplex()
        .create_lake(&parent.to_string(), lake_id, lake)
        .await;
    let Some(created) = handled(out, result, "Lake", lake_id)? else {
        return Ok(());
    };
    writeln!(out, "Successfully created lake: {}", created.name)?;
    Ok(())
}

pub async fn get_lake(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    lake_id: &str,
) -> Result<()> {
    let name = parent.clone().child("lakes", lake_id)?.to_string();
    let result = client.dataplex().get_lake(&name).await;
    let Some(lake) = handled(out, result, "Lake", lake_id)? else {
        return Ok(());
    };
    writeln!(out, "Lake {}", lake.name)?;
    if let Some(display_name) = &lake.display_name {
        writeln!(out, "  Display name: {}", display_name)?;
    }
    if let Some(state) = &lake.state {
        writeln!(out, "  State: {}", state)?;
    }
    Ok(())
}

pub async fn list_lakes(client: &GcpClient, out: &mut dyn Write, parent: &ResourceName) -> Result<()> {
    let result = client.dataplex().list_lakes(&parent.to_string()).await;
    let Some(lakes) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for lake in &lakes {
        writeln!(out, "Lake: {}", lake.name)?;
    }
    if lakes.is_empty() {
        writeln!(out, "No lakes found.")?;
    }
    Ok(())
}

pub async fn update_lake(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    lake_id: &str,
    changes: DescriptiveFields,
) -> Result<()> {
    let mask = changes.mask()?;
    let lake = Lake {
        name: parent.clone().child("lakes", lake_id)?.to_string(),
        display_name: changes.display_name,
        description: changes.description,
        ..Default::default()
    };
    let result = client.dataplex().update_lake(&lake, &mask).await;
    let Some(updated) = handled(out, result, "Lake", lake_id)? else {
        return Ok(());
    };
    writeln!(out, "Successfully updated lake: {}", updated.name)?;
    Ok(())
}

pub async fn delete_lake(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    lake_id: &str,
) -> Result<()> {
    let name = parent.clone().child("lakes", lake_id)?.to_string();
    let result = client.dataplex().delete_lake(&name).await;
    if handled(out, result, "Lake", lake_id)?.is_some() {
        writeln!(out, "Successfully deleted lake {}", name)?;
    }
    Ok(())
}

// =============================================================================
// Entry groups
// =============================================================================

pub async fn create_entry_group(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    entry_group_id: &str,
    entry_group: &EntryGroup,
) -> Result<()> {
    let result = client
        .dataplex()
        .create_entry_group(&parent.to_string(), entry_group_id, entry_group)
        .await;
    let Some(created) = handled(out, result, "Entry group", entry_group_id)? else {
        return Ok(());
    };
    writeln!(out, "Successfully created entry group: {}", created.name)?;
    Ok(())
}

pub async fn get_entry_group(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    entry_group_id: &str,
) -> Result<()> {
    let name = parent.clone().child("entryGroups", entry_group_id)?.to_string();
    let result = client.dataplex().get_entry_group(&name).await;
    let Some(entry_group) = handled(out, result, "Entry group", entry_group_id)? else {
        return Ok(());
    };
    writeln!(out, "Entry group {}", entry_group.name)?;
    if let Some(description) = &entry_group.description {
        writeln!(out, "  Description: {}", description)?;
    }
    Ok(())
}

pub async fn list_entry_groups(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
) -> Result<()> {
    let result = client.dataplex().list_entry_groups(&parent.to_string()).await;
    let Some(entry_groups) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for entry_group in &entry_groups {
        writeln!(out, "Entry group: {}", entry_group.name)?;
    }
    if entry_groups.is_empty() {
        writeln!(out, "No entry groups found.")?;
    }
    Ok(())
}

pub async fn update_entry_group(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    entry_group_id: &str,
    changes: DescriptiveFields,
) -> Result<()> {
    let mask = changes.mask()?;
    let entry_group = EntryGroup {
        name: parent.clone().child("entryGroups", entry_group_id)?.to_string(),
        display_name: changes.display_name,
        description: changes.description,
        ..Default::default()
    };
    let result = client.dataplex().update_entry_group(&entry_group, &mask).await;
    let Some(updated) = handled(out, result, "Entry group", entry_group_id)? else {
        return Ok(());
    };
    writeln!(out, "Successfully updated entry group: {}", updated.name)?;
    Ok(())
}

pub async fn delete_entry_group(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    entry_group_id: &str,
) -> Result<()> {
    let name = parent.clone().child("entryGroups", entry_group_id)?.to_string();
    let result = client.dataplex().delete_entry_group(&name).await;
    if handled(out, result, "Entry group", entry_group_id)?.is_some() {
        writeln!(out, "Successfully deleted entry group {}", name)?;
    }
    Ok(())
}

// =============================================================================
// Search
// =============================================================================

pub async fn search_entries(
    client: &GcpClient,
    out: &mut dyn Write,
    global: &ResourceName,
    query: &str,
) -> Result<()> {
    let result = client
        .dataplex()
        .search_entries(&global.to_string(), query)
        .await;
    let Some(results) = handled(out, result, "Project", global.get("projects").unwrap_or_default())?
    else {
        return Ok(());
    };
    if results.is_empty() {
        writeln!(out, "No entries match '{}'.", query)?;
    }
    for found in &results {
        let entry = found.dataplex_entry.as_ref();
        let name = entry.map(|e| e.name.as_str()).unwrap_or_default();
        let display_name = entry
            .and_then(|e| e.entry_source.as_ref())
            .and_then(|s| s.display_name.as_deref())
            .unwrap_or_default();
        writeln!(out, "Entry {} ({})", name, display_name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_mask_from_given_fields() {
        let changes = DescriptiveFields {
            display_name: Some("Sales".into()),
            description: None,
        };
        assert_eq!(changes.mask().unwrap().to_string(), "display_name");

        let both = DescriptiveFields {
            display_name: Some("Sales".into()),
            description: Some("Sales data".into()),
        };
        assert_eq!(both.mask().unwrap().to_string(), "display_name,description");
    }

    #[test]
    fn test_update_without_changes_is_error() {
        assert!(DescriptiveFields::default().mask().is_err());
    }
}
