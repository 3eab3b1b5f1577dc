//! Secret Manager: secrets, versions and payload access.
//!
//! API base: `https://secretmanager.googleapis.com/v1`, or
//! `https://secretmanager.{location}.rep.googleapis.com/v1` for regional
//! secrets (`projects/p/locations/l/secrets/s`).

use super::Empty;
use crate::error::{GcpError, Result};
use crate::resource::FieldMask;
use crate::{impl_page, push_opt, GcpClient};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

const HOST: &str = "secretmanager.googleapis.com";

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication: Option<Replication>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    /// Input only, e.g. `"86400s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub version_aliases: HashMap<String, String>,
}

/// Replication policy. Regional secrets carry none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic: Option<AutomaticReplication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_managed: Option<UserManagedReplication>,
}

impl Replication {
    pub fn automatic() -> Self {
        Self {
            automatic: Some(AutomaticReplication::default()),
            user_managed: None,
        }
    }

    /// Human-readable policy kind.
    pub fn kind(&self) -> &'static str {
        if self.automatic.is_some() {
            "automatic"
        } else if self.user_managed.is_some() {
            "user managed"
        } else {
            "unspecified"
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomaticReplication {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserManagedReplication {
    #[serde(default)]
    pub replicas: Vec<Replica>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Replica {
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVersion {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub destroy_time: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretPayload {
    /// Base64 encoded by the API.
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub data_crc32c: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessSecretVersionResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub payload: Option<SecretPayload>,
}

impl AccessSecretVersionResponse {
    /// Decoded payload bytes (empty when the version has no payload).
    pub fn data(&self) -> Result<Vec<u8>> {
        match &self.payload {
            Some(payload) => STANDARD
                .decode(&payload.data)
                .map_err(|e| GcpError::Parse(format!("Invalid secret payload encoding: {}", e))),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSecretsResponse {
    #[serde(default)]
    secrets: Vec<Secret>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListSecretsResponse, secrets, Secret);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSecretVersionsResponse {
    #[serde(default)]
    versions: Vec<SecretVersion>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListSecretVersionsResponse, versions, SecretVersion);

// =============================================================================
// Facade
// =============================================================================

pub struct SecretManager<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> SecretManager<'a> {
    pub(crate) fn new(client: &'a GcpClient, location: Option<&str>) -> Self {
        let host = match location {
            Some(location) => format!("secretmanager.{}.rep.googleapis.com", location),
            None => HOST.to_string(),
        };
        Self {
            base: format!("{}/v1", client.base_url(&host)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    /// Create a secret under `parent` (`projects/p` or `projects/p/locations/l`).
    pub async fn create_secret(&self, parent: &str, secret_id: &str, secret: &Secret) -> Result<Secret> {
        let url = format!("{}/secrets", self.url(parent));
        self.client
            .post(&url, &[("secretId", secret_id.to_string())], secret)
            .await
    }

    pub async fn get_secret(&self, name: &str) -> Result<Secret> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_secrets(&self, parent: &str, filter: Option<&str>) -> Result<Vec<Secret>> {
        let mut query = Vec::new();
        push_opt(&mut query, "filter", filter);
        let url = format!("{}/secrets", self.url(parent));
        self.client.list_all::<ListSecretsResponse>(&url, &query).await
    }

    /// Patch the fields of `secret` named by `mask`.
    pub async fn update_secret(&self, secret: &Secret, mask: &FieldMask) -> Result<Secret> {
        self.client
            .patch(&self.url(&secret.name), &[("updateMask", mask.to_string())], secret)
            .await
    }

    pub async fn delete_secret(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }

    /// Add a version holding `payload` to the secret `name`.
    pub async fn add_secret_version(&self, name: &str, payload: &[u8]) -> Result<SecretVersion> {
        let url = format!("{}:addVersion", self.url(name));
        let body = json!({ "payload": { "data": STANDARD.encode(payload) } });
        self.client.post(&url, &[], &body).await
    }

    /// Access a version; `name` may end in `versions/latest`.
    pub async fn access_secret_version(&self, name: &str) -> Result<AccessSecretVersionResponse> {
        let url = format!("{}:access", self.url(name));
        self.client.get(&url, &[]).await
    }

    pub async fn list_secret_versions(&self, name: &str) -> Result<Vec<SecretVersion>> {
        let url = format!("{}/versions", self.url(name));
        self.client
            .list_all::<ListSecretVersionsResponse>(&url, &[])
            .await
    }

    pub async fn enable_secret_version(&self, name: &str) -> Result<SecretVersion> {
        self.version_action(name, "enable").await
    }

    pub async fn disable_secret_version(&self, name: &str) -> Result<SecretVersion> {
        self.version_action(name, "disable").await
    }

    pub async fn destroy_secret_version(&self, name: &str) -> Result<SecretVersion> {
        self.version_action(name, "destroy").await
    }

    async fn version_action(&self, name: &str, action: &str) -> Result<SecretVersion> {
        let url = format!("{}:{}", self.url(name), action);
        self.client.post(&url, &[], &json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_shape() {
        let secret = Secret {
            replication: Some(Replication::automatic()),
            labels: HashMap::from([("env".to_string(), "dev".to_string())]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&secret).unwrap(),
            json!({"replication": {"automatic": {}}, "labels": {"env": "dev"}})
        );
    }

    #[test]
    fn test_replication_kind() {
        assert_eq!(Replication::automatic().kind(), "automatic");
        let managed: Replication =
            serde_json::from_value(json!({"userManaged": {"replicas": [{"location": "us-east1"}]}}))
                .unwrap();
        assert_eq!(managed.kind(), "user managed");
        assert_eq!(Replication::default().kind(), "unspecified");
    }

    #[test]
    fn test_access_response_decodes_payload() {
        let resp: AccessSecretVersionResponse = serde_json::from_value(json!({
            "name": "projects/p/secrets/s/versions/1",
            "payload": {"data": "aGVsbG8=", "dataCrc32c": "907060870"}
        }))
        .unwrap();
        assert_eq!(resp.data().unwrap(), b"hello");

        let bad: AccessSecretVersionResponse =
            serde_json::from_value(json!({"payload": {"data": "***"}})).unwrap();
        assert!(matches!(bad.data(), Err(GcpError::Parse(_))));
    }
}
