//! Eventarc: message buses (Eventarc Advanced) and triggers.
//!
//! API base: `https://eventarc.googleapis.com/v1`. Mutations are
//! long-running operations.

use crate::error::Result;
use crate::operation::Operation;
use crate::resource::FieldMask;
use crate::{impl_page, GcpClient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const HOST: &str = "eventarc.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_config: Option<LoggingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto_key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `NONE`, `DEBUG`, `INFO`, ... `EMERGENCY`
    pub log_severity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_filters: Vec<EventFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Trigger {
    /// Value of the `type` event filter, if any.
    pub fn event_type(&self) -> Option<&str> {
        self.event_filters
            .iter()
            .find(|f| f.attribute == "type")
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub attribute: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_run: Option<CloudRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudRun {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub region: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessageBusesResponse {
    #[serde(default)]
    message_buses: Vec<MessageBus>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListMessageBusesResponse, message_buses, MessageBus);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTriggersResponse {
    #[serde(default)]
    triggers: Vec<Trigger>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListTriggersResponse, triggers, Trigger);

pub struct Eventarc<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> Eventarc<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/v1", client.base_url(HOST)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    async fn finish<T: DeserializeOwned>(&self, operation: Operation) -> Result<T> {
        self.client
            .wait_operation_as(operation, |name| self.url(name))
            .await
    }

    // =========================================================================
    // Message buses
    // =========================================================================

    pub async fn create_message_bus(
        &self,
        parent: &str,
        message_bus_id: &str,
        bus: &MessageBus,
    ) -> Result<MessageBus> {
        let url = format!("{}/messageBuses", self.url(parent));
        let operation: Operation = self
            .client
            .post(&url, &[("messageBusId", message_bus_id.to_string())], bus)
            .await?;
        self.finish(operation).await
    }

    pub async fn get_message_bus(&self, name: &str) -> Result<MessageBus> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_message_buses(&self, parent: &str) -> Result<Vec<MessageBus>> {
        let url = format!("{}/messageBuses", self.url(parent));
        self.client
            .list_all::<ListMessageBusesResponse>(&url, &[])
            .await
    }

    pub async fn update_message_bus(&self, bus: &MessageBus, mask: &FieldMask) -> Result<MessageBus> {
        let operation: Operation = self
            .client
            .patch(&self.url(&bus.name), &[("updateMask", mask.to_string())], bus)
            .await?;
        self.finish(operation).await
    }

    /// Deletion resolves to the deleted bus.
    pub async fn delete_message_bus(&self, name: &str) -> Result<MessageBus> {
        let operation: Operation = self.client.delete(&self.url(name), &[]).await?;
        self.finish(operation).await
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    pub async fn create_trigger(&self, parent: &str, trigger_id: &str, trigger: &Trigger) -> Result<Trigger> {
        let url = format!("{}/triggers", self.url(parent));
        let operation: Operation = self
            .client
            .post(&url, &[("triggerId", trigger_id.to_string())], trigger)
            .await?;
        self.finish(operation).await
    }

    pub async fn get_trigger(&self, name: &str) -> Result<Trigger> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_triggers(&self, parent: &str) -> Result<Vec<Trigger>> {
        let url = format!("{}/triggers", self.url(parent));
        self.client.list_all::<ListTriggersResponse>(&url, &[]).await
    }

    pub async fn delete_trigger(&self, name: &str) -> Result<Trigger> {
        let operation: Operation = self.client.delete(&self.url(name), &[]).await?;
        self.finish(operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_body_shape() {
        let trigger = Trigger {
            event_filters: vec![EventFilter {
                attribute: "type".into(),
                value: "google.cloud.pubsub.topic.v1.messagePublished".into(),
                operator: None,
            }],
            service_account: Some("sa@p.iam.gserviceaccount.com".into()),
            destination: Some(Destination {
                cloud_run: Some(CloudRun {
                    service: "hello".into(),
                    path: None,
                    region: "us-central1".into(),
                }),
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&trigger).unwrap(),
            json!({
                "eventFilters": [{"attribute": "type", "value": "google.cloud.pubsub.topic.v1.messagePublished"}],
                "serviceAccount": "sa@p.iam.gserviceaccount.com",
                "destination": {"cloudRun": {"service": "hello", "region": "us-central1"}}
            })
        );
        assert_eq!(
            trigger.event_type(),
            Some("google.cloud.pubsub.topic.v1.messagePublished")
        );
    }
}
