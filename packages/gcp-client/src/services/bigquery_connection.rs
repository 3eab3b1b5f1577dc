//! BigQuery Connection API.
//!
//! API base: `https://bigqueryconnection.googleapis.com/v1`

use super::Empty;
use crate::error::Result;
use crate::resource::FieldMask;
use crate::{impl_page, GcpClient};
use serde::{Deserialize, Serialize};

const HOST: &str = "bigqueryconnection.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_sql: Option<CloudSqlProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_resource: Option<CloudResourceProperties>,
    /// Milliseconds since the epoch, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_credential: Option<bool>,
}

impl Connection {
    /// Which kind of external source this connection reaches.
    pub fn kind(&self) -> &'static str {
        if self.cloud_sql.is_some() {
            "Cloud SQL"
        } else if self.cloud_resource.is_some() {
            "Cloud Resource"
        } else {
            "other"
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSqlProperties {
    /// `project:region:instance`
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub database: String,
    /// `POSTGRES` or `MYSQL`.
    #[serde(default, rename = "type")]
    pub database_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<CloudSqlCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
}

/// Input only; never returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudSqlCredential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudResourceProperties {
    /// Output only; the service account BigQuery uses for this connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListConnectionsResponse {
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListConnectionsResponse, connections, Connection);

pub struct BigQueryConnection<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> BigQueryConnection<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/v1", client.base_url(HOST)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    /// `parent` is `projects/p/locations/l`.
    pub async fn create_connection(
        &self,
        parent: &str,
        connection_id: &str,
        connection: &Connection,
    ) -> Result<Connection> {
        let url = format!("{}/connections", self.url(parent));
        self.client
            .post(&url, &[("connectionId", connection_id.to_string())], connection)
            .await
    }

    pub async fn get_connection(&self, name: &str) -> Result<Connection> {
        self.client.get(&self.url(name), &[]).await
    }

    /// `page_size` is required by the API.
    pub async fn list_connections(&self, parent: &str, page_size: u32) -> Result<Vec<Connection>> {
        let url = format!("{}/connections", self.url(parent));
        self.client
            .list_all::<ListConnectionsResponse>(&url, &[("pageSize", page_size.to_string())])
            .await
    }

    pub async fn update_connection(
        &self,
        name: &str,
        connection: &Connection,
        mask: &FieldMask,
    ) -> Result<Connection> {
        self.client
            .patch(&self.url(name), &[("updateMask", mask.to_string())], connection)
            .await
    }

    pub async fn delete_connection(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cloud_resource_connection_serializes_empty_properties() {
        let connection = Connection {
            cloud_resource: Some(CloudResourceProperties::default()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&connection).unwrap(),
            json!({"cloudResource": {}})
        );
        assert_eq!(connection.kind(), "Cloud Resource");
    }

    #[test]
    fn test_cloud_sql_type_field() {
        let connection: Connection = serde_json::from_value(json!({
            "name": "projects/1/locations/us/connections/c",
            "cloudSql": {"instanceId": "p:us-central1:db", "database": "app", "type": "POSTGRES"},
            "hasCredential": true
        }))
        .unwrap();
        let sql = connection.cloud_sql.as_ref().unwrap();
        assert_eq!(sql.database_type, "POSTGRES");
        assert_eq!(connection.kind(), "Cloud SQL");
    }
}
