//! Cloud Storage control plane samples: folders, managed folders, layout
//! and Anywhere Caches.

use crate::output::handled;
use anyhow::Result;
use clap::{Args, Subcommand};
use gcp_client::services::storage_control::AnywhereCache;
use gcp_client::GcpClient;
use std::io::Write;

#[derive(Args, Debug)]
pub struct StorageControlArgs {
    #[arg(long)]
    pub bucket: String,

    #[command(subcommand)]
    pub command: StorageControlCommand,
}

#[derive(Subcommand, Debug)]
pub enum StorageControlCommand {
    /// Create a folder in a hierarchical namespace bucket
    CreateFolder {
        #[arg(long)]
        folder: String,
    },
    GetFolder {
        #[arg(long)]
        folder: String,
    },
    ListFolders {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Rename a folder, waiting for the operation
    RenameFolder {
        #[arg(long)]
        source: String,
        #[arg(long)]
        destination: String,
    },
    DeleteFolder {
        #[arg(long)]
        folder: String,
    },
    CreateManagedFolder {
        #[arg(long)]
        folder: String,
    },
    GetManagedFolder {
        #[arg(long)]
        folder: String,
    },
    ListManagedFolders,
    DeleteManagedFolder {
        #[arg(long)]
        folder: String,
    },
    GetStorageLayout,
    /// Create a cache in one zone, waiting for the operation
    CreateAnywhereCache {
        #[arg(long)]
        zone: String,
        /// e.g. 86400s
        #[arg(long)]
        ttl: Option<String>,
        /// admit-on-first-miss or admit-on-second-miss
        #[arg(long)]
        admission_policy: Option<String>,
    },
    GetAnywhereCache {
        #[arg(long)]
        cache_id: String,
    },
    ListAnywhereCaches,
    DisableAnywhereCache {
        #[arg(long)]
        cache_id: String,
    },
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: StorageControlArgs) -> Result<()> {
    let bucket = args.bucket.as_str();

    match args.command {
        StorageControlCommand::CreateFolder { folder } => create_folder(client, out, bucket, &folder).await,
        StorageControlCommand::GetFolder { folder } => get_folder(client, out, bucket, &folder).await,
        StorageControlCommand::ListFolders { prefix } => {
            list_folders(client, out, bucket, prefix.as_deref()).await
        }
        StorageControlCommand::RenameFolder {
            source,
            destination,
        } => rename_folder(client, out, bucket, &source, &destination).await,
        StorageControlCommand::DeleteFolder { folder } => delete_folder(client, out, bucket, &folder).await,
        StorageControlCommand::CreateManagedFolder { folder } => {
            create_managed_folder(client, out, bucket, &folder).await
        }
        StorageControlCommand::GetManagedFolder { folder } => {
            get_managed_folder(client, out, bucket, &folder).await
        }
        StorageControlCommand::ListManagedFolders => list_managed_folders(client, out, bucket).await,
        StorageControlCommand::DeleteManagedFolder { folder } => {
            delete_managed_folder(client, out, bucket, &folder).await
        }
        StorageControlCommand::GetStorageLayout => get_storage_layout(client, out, bucket).await,
        StorageControlCommand::CreateAnywhereCache {
            zone,
            ttl,
            admission_policy,
        } => {
            let cache = AnywhereCache {
                zone,
                ttl,
                admission_policy,
                ..Default::default()
            };
            create_anywhere_cache(client, out, bucket, &cache).await
        }
        StorageControlCommand::GetAnywhereCache { cache_id } => {
            get_anywhere_cache(client, out, bucket, &cache_id).await
        }
        StorageControlCommand::ListAnywhereCaches => list_anywhere_caches(client, out, bucket).await,
        StorageControlCommand::DisableAnywhereCache { cache_id } => {
            disable_anywhere_cache(client, out, bucket, &cache_id).await
        }
    }
}

/// Folder names always end in `/`.
pub fn folder_name(folder: &str) -> String {
    if folder.ends_with('/') {
        folder.to_string()
    } else {
        format!("{}/", folder)
    }
}

// =============================================================================
// Folders
// =============================================================================

pub async fn create_folder(client: &GcpClient, out: &mut dyn Write, bucket: &str, folder: &str) -> Result<()> {
    let folder = folder_name(folder);
    let result = client.storage_control().create_folder(bucket, &folder).await;
    let Some(created) = handled(out, result, "Folder", &folder)? else {
        return Ok(());
    };
    writeln!(out, "Created folder: {}", created.name)?;
    Ok(())
}

pub async fn get_folder(client: &GcpClient, out: &mut dyn Write, bucket: &str, folder: &str) -> Result<()> {
    let folder = folder_name(folder);
    let result = client.storage_control().get_folder(bucket, &folder).await;
    let Some(found) = handled(out, result, "Folder", &folder)? else {
        return Ok(());
    };
    writeln!(out, "Got folder: {}", found.name)?;
    if let Some(created) = &found.create_time {
        writeln!(out, "  Created: {}", created)?;
    }
    Ok(())
}

pub async fn list_folders(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    prefix: Option<&str>,
) -> Result<()> {
    let result = client.storage_control().list_folders(bucket, prefix).await;
    let Some(folders) = handled(out, result, "Bucket", bucket)? else {
        return Ok(());
    };
    for folder in &folders {
        writeln!(out, "{}", folder.name)?;
    }
    if folders.is_empty() {
        writeln!(out, "No folders found.")?;
    }
    Ok(())
}

pub async fn rename_folder(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    source: &str,
    destination: &str,
) -> Result<()> {
    let source = folder_name(source);
    let destination = folder_name(destination);
    let result = client
        .storage_control()
        .rename_folder(bucket, &source, &destination)
        .await;
    if handled(out, result, "Folder", &source)?.is_some() {
        writeln!(out, "Renamed folder {} to {}", source, destination)?;
    }
    Ok(())
}

pub async fn delete_folder(client: &GcpClient, out: &mut dyn Write, bucket: &str, folder: &str) -> Result<()> {
    let folder = folder_name(folder);
    let result = client.storage_control().delete_folder(bucket, &folder).await;
    if handled(out, result, "Folder", &folder)?.is_some() {
        writeln!(out, "Deleted folder: {}", folder)?;
    }
    Ok(())
}

// =============================================================================
// Managed folders
// =============================================================================

pub async fn create_managed_folder(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    folder: &str,
) -> Result<()> {
    let folder = folder_name(folder);
    let result = client.storage_control().create_managed_folder(bucket, &folder).await;
    let Some(created) = handled(out, result, "Managed folder", &folder)? else {
        return Ok(());
    };
    writeln!(out, "Created managed folder: {}", created.name)?;
    Ok(())
}

pub async fn get_managed_folder(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    folder: &str,
) -> Result<()> {
    let folder = folder_name(folder);
    let result = client.storage_control().get_managed_folder(bucket, &folder).await;
    let Some(found) = handled(out, result, "Managed folder", &folder)? else {
        return Ok(());
    };
    writeln!(out, "Got managed folder: {}", found.name)?;
    Ok(())
}

pub async fn list_managed_folders(client: &GcpClient, out: &mut dyn Write, bucket: &str) -> Result<()> {
    let result = client.storage_control().list_managed_folders(bucket).await;
    let Some(folders) = handled(out, result, "Bucket", bucket)? else {
        return Ok(());
    };
    for folder in &folders {
        writeln!(out, "{}", folder.name)?;
    }
    if folders.is_empty() {
        writeln!(out, "No managed folders found.")?;
    }
    Ok(())
}

pub async fn delete_managed_folder(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    folder: &str,
) -> Result<()> {
    let folder = folder_name(folder);
    let result = client.storage_control().delete_managed_folder(bucket, &folder).await;
    if handled(out, result, "Managed folder", &folder)?.is_some() {
        writeln!(out, "Deleted managed folder: {}", folder)?;
    }
    Ok(())
}

// =============================================================================
// Layout and caches
// =============================================================================

pub async fn get_storage_layout(client: &GcpClient, out: &mut dyn Write, bucket: &str) -> Result<()> {
    let result = client.storage_control().get_storage_layout(bucket).await;
    let Some(layout) = handled(out, result, "Bucket", bucket)? else {
        return Ok(());
    };
    writeln!(out, "Bucket: {}", bucket)?;
    writeln!(out, "  Location: {}", layout.location.as_deref().unwrap_or_default())?;
    writeln!(out, "  Location type: {}", layout.location_type.as_deref().unwrap_or_default())?;
    writeln!(out, "  Hierarchical namespace: {}", layout.hns_enabled())?;
    Ok(())
}

pub async fn create_anywhere_cache(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    cache: &AnywhereCache,
) -> Result<()> {
    writeln!(out, "Waiting for operation to complete...")?;
    let result = client.storage_control().create_anywhere_cache(bucket, cache).await;
    let Some(created) = handled(out, result, "Anywhere cache", &cache.zone)? else {
        return Ok(());
    };
    writeln!(
        out,
        "Created anywhere cache {} in {}",
        created.anywhere_cache_id.as_deref().unwrap_or_default(),
        created.zone
    )?;
    Ok(())
}

pub async fn get_anywhere_cache(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    cache_id: &str,
) -> Result<()> {
    let result = client.storage_control().get_anywhere_cache(bucket, cache_id).await;
    let Some(cache) = handled(out, result, "Anywhere cache", cache_id)? else {
        return Ok(());
    };
    writeln!(out, "Anywhere cache {}", cache_id)?;
    writeln!(out, "  Zone: {}", cache.zone)?;
    writeln!(out, "  State: {}", cache.state.as_deref().unwrap_or_default())?;
    if let Some(ttl) = &cache.ttl {
        writeln!(out, "  TTL: {}", ttl)?;
    }
    Ok(())
}

pub async fn list_anywhere_caches(client: &GcpClient, out: &mut dyn Write, bucket: &str) -> Result<()> {
    let result = client.storage_control().list_anywhere_caches(bucket).await;
    let Some(caches) = handled(out, result, "Bucket", bucket)? else {
        return Ok(());
    };
    for cache in &caches {
        writeln!(
            out,
            "{} ({})",
            cache.anywhere_cache_id.as_deref().unwrap_or(&cache.zone),
            cache.state.as_deref().unwrap_or_default()
        )?;
    }
    if caches.is_empty() {
        writeln!(out, "No anywhere caches found.")?;
    }
    Ok(())
}

pub async fn disable_anywhere_cache(
    client: &GcpClient,
    out: &mut dyn Write,
    bucket: &str,
    cache_id: &str,
) -> Result<()> {
    let result = client.storage_control().disable_anywhere_cache(bucket, cache_id).await;
    let Some(cache) = handled(out, result, "Anywhere cache", cache_id)? else {
        return Ok(());
    };
    writeln!(
        out,
        "Disabled anywhere cache {} ({})",
        cache_id,
        cache.state.as_deref().unwrap_or_default()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name_appends_slash() {
        assert_eq!(folder_name("logs/2024"), "logs/2024/");
        assert_eq!(folder_name("logs/"), "logs/");
    }
}
