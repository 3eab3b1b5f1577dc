//! BigQuery Connection samples.

use crate::output::handled;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use gcp_client::services::bigquery_connection::{
    CloudResourceProperties, CloudSqlCredential, CloudSqlProperties, Connection,
};
use gcp_client::{FieldMask, GcpClient, ResourceName};
use std::io::Write;

#[derive(Args, Debug)]
pub struct BigQueryConnectionArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    /// BigQuery location, e.g. US or us-central1
    #[arg(long, default_value = "US")]
    pub location: String,

    #[command(subcommand)]
    pub command: BigQueryConnectionCommand,
}

#[derive(Subcommand, Debug)]
pub enum BigQueryConnectionCommand {
    /// Create a Cloud Resource connection, or a Cloud SQL one when an instance is given
    CreateConnection {
        #[arg(long)]
        connection_id: String,
        #[command(flatten)]
        cloud_sql: CloudSqlArgs,
    },
    GetConnection {
        #[arg(long)]
        connection_id: String,
    },
    ListConnections {
        #[arg(long, default_value_t = 100)]
        page_size: u32,
    },
    /// Change the friendly name and/or description
    UpdateConnection {
        #[arg(long)]
        connection_id: String,
        #[arg(long)]
        friendly_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    DeleteConnection {
        #[arg(long)]
        connection_id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct CloudSqlArgs {
    /// `project:region:instance`
    #[arg(long, requires_all = ["database", "username", "password"])]
    pub cloud_sql_instance: Option<String>,
    #[arg(long)]
    pub database: Option<String>,
    /// POSTGRES or MYSQL
    #[arg(long, default_value = "POSTGRES")]
    pub database_type: String,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

impl CloudSqlArgs {
    fn into_connection(self) -> Connection {
        match self.cloud_sql_instance {
            Some(instance_id) => Connection {
                cloud_sql: Some(CloudSqlProperties {
                    instance_id,
                    database: self.database.unwrap_or_default(),
                    database_type: self.database_type,
                    credential: Some(CloudSqlCredential {
                        username: self.username.unwrap_or_default(),
                        password: self.password.unwrap_or_default(),
                    }),
                    service_account_id: None,
                }),
                ..Default::default()
            },
            None => Connection {
                cloud_resource: Some(CloudResourceProperties::default()),
                ..Default::default()
            },
        }
    }
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: BigQueryConnectionArgs) -> Result<()> {
    let parent = ResourceName::project(&args.project_id)?.location(&args.location)?;

    match args.command {
        BigQueryConnectionCommand::CreateConnection {
            connection_id,
            cloud_sql,
        } => create_connection(client, out, &parent, &connection_id, cloud_sql.into_connection()).await,
        BigQueryConnectionCommand::GetConnection { connection_id } => {
            get_connection(client, out, &parent, &connection_id).await
        }
        BigQueryConnectionCommand::ListConnections { page_size } => {
            list_connections(client, out, &parent, page_size).await
        }
        BigQueryConnectionCommand::UpdateConnection {
            connection_id,
            friendly_name,
            description,
        } => update_connection(client, out, &parent, &connection_id, friendly_name, description).await,
        BigQueryConnectionCommand::DeleteConnection { connection_id } => {
            delete_connection(client, out, &parent, &connection_id).await
        }
    }
}

pub async fn create_connection(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    connection_id: &str,
    connection: Connection,
) -> Result<()> {
    let result = client
        .bigquery_connection()
        .create_connection(&parent.to_string(), connection_id, &connection)
        .await;
    let Some(created) = handled(out, result, "Connection", connection_id)? else {
        return Ok(());
    };
    writeln!(out, "Created connection {} ({})", created.name, created.kind())?;
    if let Some(account) = created
        .cloud_resource
        .as_ref()
        .and_then(|r| r.service_account_id.as_deref())
    {
        writeln!(out, "Service account: {}", account)?;
    }
    Ok(())
}

pub async fn get_connection(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    connection_id: &str,
) -> Result<()> {
    let name = parent.clone().child("connections", connection_id)?.to_string();
    let result = client.bigquery_connection().get_connection(&name).await;
    let Some(connection) = handled(out, result, "Connection", connection_id)? else {
        return Ok(());
    };
    writeln!(out, "Got connection {}", connection.name)?;
    writeln!(out, "  Kind: {}", connection.kind())?;
    if let Some(friendly_name) = &connection.friendly_name {
        writeln!(out, "  Friendly name: {}", friendly_name)?;
    }
    if let Some(description) = &connection.description {
        writeln!(out, "  Description: {}", description)?;
    }
    Ok(())
}

pub async fn list_connections(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    page_size: u32,
) -> Result<()> {
    let result = client
        .bigquery_connection()
        .list_connections(&parent.to_string(), page_size)
        .await;
    let Some(connections) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    if connections.is_empty() {
        writeln!(out, "No connections found in {}.", parent)?;
    }
    for connection in &connections {
        writeln!(out, "Connection: {} ({})", connection.name, connection.kind())?;
    }
    Ok(())
}

pub async fn update_connection(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    connection_id: &str,
    friendly_name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut mask = FieldMask::new();
    if friendly_name.is_some() {
        mask.push("friendly_name");
    }
    if description.is_some() {
        mask.push("description");
    }
    if mask.is_empty() {
        bail!("Nothing to update: pass --friendly-name and/or --description");
    }

    let name = parent.clone().child("connections", connection_id)?.to_string();
    let connection = Connection {
        friendly_name,
        description,
        ..Default::default()
    };
    let result = client
        .bigquery_connection()
        .update_connection(&name, &connection, &mask)
        .await;
    let Some(updated) = handled(out, result, "Connection", connection_id)? else {
        return Ok(());
    };
    writeln!(out, "Updated connection {}", updated.name)?;
    Ok(())
}

pub async fn delete_connection(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    connection_id: &str,
) -> Result<()> {
    let name = parent.clone().child("connections", connection_id)?.to_string();
    let result = client.bigquery_connection().delete_connection(&name).await;
    if handled(out, result, "Connection", connection_id)?.is_some() {
        writeln!(out, "Deleted connection {}", name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_connection_is_cloud_resource() {
        let connection = CloudSqlArgs::default().into_connection();
        assert_eq!(connection.kind(), "Cloud Resource");
    }

    #[test]
    fn test_cloud_sql_connection_carries_credential() {
        let connection = CloudSqlArgs {
            cloud_sql_instance: Some("p:us-central1:db".into()),
            database: Some("orders".into()),
            database_type: "MYSQL".into(),
            username: Some("reader".into()),
            password: Some("pw".into()),
        }
        .into_connection();
        let sql = connection.cloud_sql.unwrap();
        assert_eq!(sql.instance_id, "p:us-central1:db");
        assert_eq!(sql.database_type, "MYSQL");
        assert_eq!(sql.credential.unwrap().username, "reader");
    }
}
