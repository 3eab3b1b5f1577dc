//! Dataplex: lakes, catalog entry groups and entry search.
//!
//! API base: `https://dataplex.googleapis.com/v1`. Create, update and
//! delete return long-running operations; the facade waits for them.

use crate::error::Result;
use crate::operation::Operation;
use crate::resource::FieldMask;
use crate::{impl_page, GcpClient};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const HOST: &str = "dataplex.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lake {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryGroup {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub entry_source: Option<EntrySource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySource {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub system: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntriesResult {
    #[serde(default)]
    pub dataplex_entry: Option<Entry>,
    #[serde(default)]
    pub linked_resource: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListLakesResponse {
    #[serde(default)]
    lakes: Vec<Lake>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListLakesResponse, lakes, Lake);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEntryGroupsResponse {
    #[serde(default)]
    entry_groups: Vec<EntryGroup>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListEntryGroupsResponse, entry_groups, EntryGroup);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEntriesResponse {
    #[serde(default)]
    results: Vec<SearchEntriesResult>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(SearchEntriesResponse, results, SearchEntriesResult);

pub struct Dataplex<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> Dataplex<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/v1", client.base_url(HOST)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    async fn finish<T: serde::de::DeserializeOwned>(&self, operation: Operation) -> Result<T> {
        self.client
            .wait_operation_as(operation, |name| self.url(name))
            .await
    }

    async fn finish_empty(&self, operation: Operation) -> Result<()> {
        self.client
            .wait_operation(operation, |name| self.url(name))
            .await?
            .into_result()?;
        Ok(())
    }

    // =========================================================================
    // Lakes
    // =========================================================================

    pub async fn create_lake(&self, parent: &str, lake_id: &str, lake: &Lake) -> Result<Lake> {
        let url = format!("{}/lakes", self.url(parent));
        let operation: Operation = self
            .client
            .post(&url, &[("lakeId", lake_id.to_string())], lake)
            .await?;
        self.finish(operation).await
    }

    pub async fn get_lake(&self, name: &str) -> Result<Lake> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_lakes(&self, parent: &str) -> Result<Vec<Lake>> {
        let url = format!("{}/lakes", self.url(parent));
        self.client.list_all::<ListLakesResponse>(&url, &[]).await
    }

    pub async fn update_lake(&self, lake: &Lake, mask: &FieldMask) -> Result<Lake> {
        let operation: Operation = self
            .client
            .patch(&self.url(&lake.name), &[("updateMask", mask.to_string())], lake)
            .await?;
        self.finish(operation).await
    }

    pub async fn delete_lake(&self, name: &str) -> Result<()> {
        let operation: Operation = self.client.delete(&self.url(name), &[]).await?;
        self.finish_empty(operation).await
    }

    // =========================================================================
    // Entry groups
    // =========================================================================

    pub async fn create_entry_group(
        &self,
        parent: &str,
        entry_group_id: &str,
        entry_group: &EntryGroup,
    ) -> Result<EntryGroup> {
        let url = format!("{}/entryGroups", self.url(parent));
        let operation: Operation = self
            .client
            .post(&url, &[("entryGroupId", entry_group_id.to_string())], entry_group)
            .await?;
        self.finish(operation).await
    }

    pub async fn get_entry_group(&self, name: &str) -> Result<EntryGroup> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_entry_groups(&self, parent: &str) -> Result<Vec<EntryGroup>> {
        let url = format!("{}/entryGroups", self.url(parent));
        self.client
            .list_all::<ListEntryGroupsResponse>(&url, &[])
            .await
    }

    pub async fn update_entry_group(
        &self,
        entry_group: &EntryGroup,
        mask: &FieldMask,
    ) -> Result<EntryGroup> {
        let operation: Operation = self
            .client
            .patch(
                &self.url(&entry_group.name),
                &[("updateMask", mask.to_string())],
                entry_group,
            )
            .await?;
        self.finish(operation).await
    }

    pub async fn delete_entry_group(&self, name: &str) -> Result<()> {
        let operation: Operation = self.client.delete(&self.url(name), &[]).await?;
        self.finish_empty(operation).await
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search catalog entries; `name` is `projects/p/locations/global`.
    pub async fn search_entries(&self, name: &str, query: &str) -> Result<Vec<SearchEntriesResult>> {
        let url = format!("{}:searchEntries", self.url(name));
        self.client
            .list_all_post::<SearchEntriesResponse>(&url, &[("query", query.to_string())])
            .await
    }
}
