//! BigQuery Data Transfer Service: transfer configs and runs.
//!
//! API base: `https://bigquerydatatransfer.googleapis.com/v1`

use super::Empty;
use crate::error::{Result, RpcStatus};
use crate::resource::FieldMask;
use crate::{impl_page, push_opt, GcpClient};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const HOST: &str = "bigquerydatatransfer.googleapis.com";

/// Data source id of scheduled queries.
pub const SCHEDULED_QUERY: &str = "scheduled_query";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_dataset_id: Option<String>,
    /// Data-source specific parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// e.g. `every 24 hours`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRun {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub run_time: Option<String>,
    #[serde(default)]
    pub schedule_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub error_status: Option<RpcStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartManualTransferRunsResponse {
    #[serde(default)]
    pub runs: Vec<TransferRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTransferConfigsResponse {
    #[serde(default)]
    transfer_configs: Vec<TransferConfig>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListTransferConfigsResponse, transfer_configs, TransferConfig);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTransferRunsResponse {
    #[serde(default)]
    transfer_runs: Vec<TransferRun>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListTransferRunsResponse, transfer_runs, TransferRun);

pub struct DataTransfer<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> DataTransfer<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/v1", client.base_url(HOST)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    /// `service_account_name` runs the transfer as that service account.
    pub async fn create_transfer_config(
        &self,
        parent: &str,
        config: &TransferConfig,
        service_account_name: Option<&str>,
    ) -> Result<TransferConfig> {
        let mut query = Vec::new();
        push_opt(&mut query, "serviceAccountName", service_account_name);
        let url = format!("{}/transferConfigs", self.url(parent));
        self.client.post(&url, &query, config).await
    }

    pub async fn get_transfer_config(&self, name: &str) -> Result<TransferConfig> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_transfer_configs(&self, parent: &str) -> Result<Vec<TransferConfig>> {
        let url = format!("{}/transferConfigs", self.url(parent));
        self.client
            .list_all::<ListTransferConfigsResponse>(&url, &[])
            .await
    }

    pub async fn update_transfer_config(
        &self,
        config: &TransferConfig,
        mask: &FieldMask,
    ) -> Result<TransferConfig> {
        self.client
            .patch(&self.url(&config.name), &[("updateMask", mask.to_string())], config)
            .await
    }

    pub async fn delete_transfer_config(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }

    /// Request a one-off run of the config `name` at `requested_run_time`.
    pub async fn start_manual_runs(
        &self,
        name: &str,
        requested_run_time: DateTime<Utc>,
    ) -> Result<StartManualTransferRunsResponse> {
        let url = format!("{}:startManualRuns", self.url(name));
        let body = json!({
            "requestedRunTime": requested_run_time.to_rfc3339_opts(SecondsFormat::Secs, true)
        });
        self.client.post(&url, &[], &body).await
    }

    pub async fn list_transfer_runs(&self, name: &str) -> Result<Vec<TransferRun>> {
        let url = format!("{}/runs", self.url(name));
        self.client.list_all::<ListTransferRunsResponse>(&url, &[]).await
    }
}
