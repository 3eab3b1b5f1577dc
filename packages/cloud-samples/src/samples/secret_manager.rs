//! Secret Manager samples.
//!
//! With `--location`, secrets live at `projects/P/locations/L/secrets/S` and
//! requests go to the regional endpoint.

use crate::output::{handled, parse_label};
use anyhow::Result;
use clap::{Args, Subcommand};
use gcp_client::services::secret_manager::{Replication, Secret};
use gcp_client::{FieldMask, GcpClient, ResourceName};
use std::collections::HashMap;
use std::io::Write;

#[derive(Args, Debug)]
pub struct SecretManagerArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    /// Regional secrets location, e.g. us-central1
    #[arg(long)]
    pub location: Option<String>,

    #[command(subcommand)]
    pub command: SecretManagerCommand,
}

#[derive(Subcommand, Debug)]
pub enum SecretManagerCommand {
    /// Create a secret with automatic replication
    CreateSecret {
        #[arg(long)]
        secret_id: String,
        /// Time to live, e.g. 86400s
        #[arg(long)]
        ttl: Option<String>,
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
    /// Add a version holding a payload
    AddSecretVersion {
        #[arg(long)]
        secret_id: String,
        #[arg(long)]
        payload: String,
    },
    /// Print the payload of a version
    AccessSecretVersion {
        #[arg(long)]
        secret_id: String,
        #[arg(long, default_value = "latest")]
        version: String,
    },
    GetSecret {
        #[arg(long)]
        secret_id: String,
    },
    ListSecrets {
        #[arg(long)]
        filter: Option<String>,
    },
    ListSecretVersions {
        #[arg(long)]
        secret_id: String,
    },
    /// Replace the labels of a secret
    UpdateSecret {
        #[arg(long)]
        secret_id: String,
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
    EnableSecretVersion {
        #[arg(long)]
        secret_id: String,
        #[arg(long)]
        version: String,
    },
    DisableSecretVersion {
        #[arg(long)]
        secret_id: String,
        #[arg(long)]
        version: String,
    },
    /// Irreversibly destroy a version's payload
    DestroySecretVersion {
        #[arg(long)]
        secret_id: String,
        #[arg(long)]
        version: String,
    },
    DeleteSecret {
        #[arg(long)]
        secret_id: String,
    },
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: SecretManagerArgs) -> Result<()> {
    let target = Target {
        project_id: args.project_id,
        location: args.location,
    };

    match args.command {
        SecretManagerCommand::CreateSecret {
            secret_id,
            ttl,
            labels,
        } => create_secret(client, out, &target, &secret_id, ttl, labels.into_iter().collect()).await,
        SecretManagerCommand::AddSecretVersion { secret_id, payload } => {
            add_secret_version(client, out, &target, &secret_id, payload.as_bytes()).await
        }
        SecretManagerCommand::AccessSecretVersion { secret_id, version } => {
            access_secret_version(client, out, &target, &secret_id, &version).await
        }
        SecretManagerCommand::GetSecret { secret_id } => get_secret(client, out, &target, &secret_id).await,
        SecretManagerCommand::ListSecrets { filter } => {
            list_secrets(client, out, &target, filter.as_deref()).await
        }
        SecretManagerCommand::ListSecretVersions { secret_id } => {
            list_secret_versions(client, out, &target, &secret_id).await
        }
        SecretManagerCommand::UpdateSecret { secret_id, labels } => {
            update_secret(client, out, &target, &secret_id, labels.into_iter().collect()).await
        }
        SecretManagerCommand::EnableSecretVersion { secret_id, version } => {
            change_version_state(client, out, &target, &secret_id, &version, VersionAction::Enable).await
        }
        SecretManagerCommand::DisableSecretVersion { secret_id, version } => {
            change_version_state(client, out, &target, &secret_id, &version, VersionAction::Disable).await
        }
        SecretManagerCommand::DestroySecretVersion { secret_id, version } => {
            change_version_state(client, out, &target, &secret_id, &version, VersionAction::Destroy).await
        }
        SecretManagerCommand::DeleteSecret { secret_id } => delete_secret(client, out, &target, &secret_id).await,
    }
}

/// Project and optional region the samples address.
#[derive(Debug, Clone)]
pub struct Target {
    pub project_id: String,
    pub location: Option<String>,
}

impl Target {
    fn parent(&self) -> Result<ResourceName> {
        let project = ResourceName::project(&self.project_id)?;
        Ok(match &self.location {
            Some(location) => project.location(location)?,
            None => project,
        })
    }

    fn secret(&self, secret_id: &str) -> Result<ResourceName> {
        Ok(self.parent()?.child("secrets", secret_id)?)
    }

    fn version(&self, secret_id: &str, version: &str) -> Result<ResourceName> {
        Ok(self.secret(secret_id)?.child("versions", version)?)
    }
}

pub async fn create_secret(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
    ttl: Option<String>,
    labels: HashMap<String, String>,
) -> Result<()> {
    let parent = target.parent()?.to_string();
    let secret = Secret {
        // Regional secrets take their placement from the endpoint.
        replication: target.location.is_none().then(Replication::automatic),
        ttl,
        labels,
        ..Default::default()
    };

    let result = client
        .secret_manager(target.location.as_deref())
        .create_secret(&parent, secret_id, &secret)
        .await;
    let Some(created) = handled(out, result, "Secret", secret_id)? else {
        return Ok(());
    };
    writeln!(out, "Created secret: {}", created.name)?;
    Ok(())
}

pub async fn add_secret_version(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
    payload: &[u8],
) -> Result<()> {
    let name = target.secret(secret_id)?.to_string();
    let result = client
        .secret_manager(target.location.as_deref())
        .add_secret_version(&name, payload)
        .await;
    let Some(version) = handled(out, result, "Secret", secret_id)? else {
        return Ok(());
    };
    writeln!(out, "Added secret version: {}", version.name)?;
    Ok(())
}

pub async fn access_secret_version(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
    version: &str,
) -> Result<()> {
    let name = target.version(secret_id, version)?.to_string();
    let result = client
        .secret_manager(target.location.as_deref())
        .access_secret_version(&name)
        .await;
    let Some(accessed) = handled(out, result, "Secret version", &name)? else {
        return Ok(());
    };
    let data = accessed.data()?;
    writeln!(out, "Plaintext: {}", String::from_utf8_lossy(&data))?;
    Ok(())
}

pub async fn get_secret(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
) -> Result<()> {
    let name = target.secret(secret_id)?.to_string();
    let result = client
        .secret_manager(target.location.as_deref())
        .get_secret(&name)
        .await;
    let Some(secret) = handled(out, result, "Secret", secret_id)? else {
        return Ok(());
    };
    let replication = secret
        .replication
        .as_ref()
        .map(Replication::kind)
        .unwrap_or("regional");
    writeln!(out, "Found secret {} with replication policy {}", secret.name, replication)?;
    Ok(())
}

pub async fn list_secrets(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    filter: Option<&str>,
) -> Result<()> {
    let parent = target.parent()?.to_string();
    let result = client
        .secret_manager(target.location.as_deref())
        .list_secrets(&parent, filter)
        .await;
    let Some(secrets) = handled(out, result, "Project", &target.project_id)? else {
        return Ok(());
    };
    for secret in &secrets {
        writeln!(out, "Found secret: {}", secret.name)?;
    }
    if secrets.is_empty() {
        writeln!(out, "No secrets found.")?;
    }
    Ok(())
}

pub async fn list_secret_versions(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
) -> Result<()> {
    let name = target.secret(secret_id)?.to_string();
    let result = client
        .secret_manager(target.location.as_deref())
        .list_secret_versions(&name)
        .await;
    let Some(versions) = handled(out, result, "Secret", secret_id)? else {
        return Ok(());
    };
    for version in &versions {
        writeln!(out, "Found secret version: {} ({})", version.name, version.state)?;
    }
    Ok(())
}

pub async fn update_secret(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
    labels: HashMap<String, String>,
) -> Result<()> {
    let secret = Secret {
        name: target.secret(secret_id)?.to_string(),
        labels,
        ..Default::default()
    };
    let result = client
        .secret_manager(target.location.as_deref())
        .update_secret(&secret, &FieldMask::new().with("labels"))
        .await;
    let Some(updated) = handled(out, result, "Secret", secret_id)? else {
        return Ok(());
    };
    writeln!(out, "Updated secret: {}", updated.name)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionAction {
    Enable,
    Disable,
    Destroy,
}

pub async fn change_version_state(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
    version: &str,
    action: VersionAction,
) -> Result<()> {
    let name = target.version(secret_id, version)?.to_string();
    let secrets = client.secret_manager(target.location.as_deref());
    let (result, verb) = match action {
        VersionAction::Enable => (secrets.enable_secret_version(&name).await, "Enabled"),
        VersionAction::Disable => (secrets.disable_secret_version(&name).await, "Disabled"),
        VersionAction::Destroy => (secrets.destroy_secret_version(&name).await, "Destroyed"),
    };
    let Some(version) = handled(out, result, "Secret version", &name)? else {
        return Ok(());
    };
    writeln!(out, "{} secret version {}", verb, version.name)?;
    Ok(())
}

pub async fn delete_secret(
    client: &GcpClient,
    out: &mut dyn Write,
    target: &Target,
    secret_id: &str,
) -> Result<()> {
    let name = target.secret(secret_id)?.to_string();
    let result = client
        .secret_manager(target.location.as_deref())
        .delete_secret(&name)
        .await;
    if handled(out, result, "Secret", secret_id)?.is_some() {
        writeln!(out, "Deleted secret {}", name)?;
    }
    Ok(())
}
