//! Cloud Storage control plane: folders, managed folders, storage layout
//! and Anywhere Caches.
//!
//! API base: `https://storage.googleapis.com/storage/v1`. Folder and
//! managed folder names contain `/` and are percent-encoded in paths.
//! Long-running operations are polled at `b/{bucket}/operations/{id}`.

use super::Empty;
use crate::error::Result;
use crate::operation::Operation;
use crate::resource::{encode_segment, short_name};
use crate::{impl_page, push_opt, GcpClient};
use serde::{Deserialize, Serialize};
use serde_json::json;

const HOST: &str = "storage.googleapis.com";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub bucket: String,
    /// Ends in `/`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metageneration: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedFolder {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metageneration: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayout {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub hierarchical_namespace: Option<HierarchicalNamespace>,
}

impl StorageLayout {
    pub fn hns_enabled(&self) -> bool {
        self.hierarchical_namespace
            .as_ref()
            .map(|h| h.enabled)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchicalNamespace {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnywhereCache {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anywhere_cache_id: Option<String>,
    #[serde(default)]
    pub zone: String,
    /// Duration string, e.g. `"86400s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// `admit-on-first-miss` or `admit-on-second-miss`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFoldersResponse {
    #[serde(default)]
    items: Vec<Folder>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListFoldersResponse, items, Folder);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListManagedFoldersResponse {
    #[serde(default)]
    items: Vec<ManagedFolder>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListManagedFoldersResponse, items, ManagedFolder);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAnywhereCachesResponse {
    #[serde(default)]
    items: Vec<AnywhereCache>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListAnywhereCachesResponse, items, AnywhereCache);

pub struct StorageControl<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> StorageControl<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/storage/v1", client.base_url(HOST)),
            client,
        }
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!("{}/b/{}", self.base, encode_segment(bucket))
    }

    async fn finish(&self, bucket: &str, operation: Operation) -> Result<Operation> {
        let bucket_url = self.bucket_url(bucket);
        self.client
            .wait_operation(operation, |name| {
                format!("{}/operations/{}", bucket_url, short_name(name))
            })
            .await
    }

    // =========================================================================
    // Folders (hierarchical namespace buckets)
    // =========================================================================

    pub async fn create_folder(&self, bucket: &str, folder: &str) -> Result<Folder> {
        let url = format!("{}/folders", self.bucket_url(bucket));
        self.client.post(&url, &[], &json!({ "name": folder })).await
    }

    pub async fn get_folder(&self, bucket: &str, folder: &str) -> Result<Folder> {
        let url = format!("{}/folders/{}", self.bucket_url(bucket), encode_segment(folder));
        self.client.get(&url, &[]).await
    }

    pub async fn list_folders(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<Folder>> {
        let mut query = Vec::new();
        push_opt(&mut query, "prefix", prefix);
        let url = format!("{}/folders", self.bucket_url(bucket));
        self.client.list_all::<ListFoldersResponse>(&url, &query).await
    }

    /// Rename `source` to `destination`; waits for the operation.
    pub async fn rename_folder(&self, bucket: &str, source: &str, destination: &str) -> Result<()> {
        let url = format!(
            "{}/folders/{}/renameTo/folders/{}",
            self.bucket_url(bucket),
            encode_segment(source),
            encode_segment(destination)
        );
        let operation: Operation = self.client.post(&url, &[], &json!({})).await?;
        self.finish(bucket, operation).await?.into_result()?;
        Ok(())
    }

    pub async fn delete_folder(&self, bucket: &str, folder: &str) -> Result<()> {
        let url = format!("{}/folders/{}", self.bucket_url(bucket), encode_segment(folder));
        let _: Empty = self.client.delete(&url, &[]).await?;
        Ok(())
    }

    // =========================================================================
    // Managed folders
    // =========================================================================

    pub async fn create_managed_folder(&self, bucket: &str, folder: &str) -> Result<ManagedFolder> {
        let url = format!("{}/managedFolders", self.bucket_url(bucket));
        self.client.post(&url, &[], &json!({ "name": folder })).await
    }

    pub async fn get_managed_folder(&self, bucket: &str, folder: &str) -> Result<ManagedFolder> {
        let url = format!(
            "{}/managedFolders/{}",
            self.bucket_url(bucket),
            encode_segment(folder)
        );
        self.client.get(&url, &[]).await
    }

    pub async fn list_managed_folders(&self, bucket: &str) -> Result<Vec<ManagedFolder>> {
        let url = format!("{}/managedFolders", self.bucket_url(bucket));
        self.client
            .list_all::<ListManagedFoldersResponse>(&url, &[])
            .await
    }

    pub async fn delete_managed_folder(&self, bucket: &str, folder: &str) -> Result<()> {
        let url = format!(
            "{}/managedFolders/{}",
            self.bucket_url(bucket),
            encode_segment(folder)
        );
        let _: Empty = self.client.delete(&url, &[]).await?;
        Ok(())
    }

    // =========================================================================
    // Layout and caches
    // =========================================================================

    pub async fn get_storage_layout(&self, bucket: &str) -> Result<StorageLayout> {
        let url = format!("{}/storageLayout", self.bucket_url(bucket));
        self.client.get(&url, &[]).await
    }

    /// Create a cache in `cache.zone`; waits for the operation.
    pub async fn create_anywhere_cache(&self, bucket: &str, cache: &AnywhereCache) -> Result<AnywhereCache> {
        let url = format!("{}/anywhereCaches", self.bucket_url(bucket));
        let operation: Operation = self.client.post(&url, &[], cache).await?;
        self.finish(bucket, operation).await?.decode()
    }

    pub async fn get_anywhere_cache(&self, bucket: &str, cache_id: &str) -> Result<AnywhereCache> {
        let url = format!(
            "{}/anywhereCaches/{}",
            self.bucket_url(bucket),
            encode_segment(cache_id)
        );
        self.client.get(&url, &[]).await
    }

    pub async fn list_anywhere_caches(&self, bucket: &str) -> Result<Vec<AnywhereCache>> {
        let url = format!("{}/anywhereCaches", self.bucket_url(bucket));
        self.client
            .list_all::<ListAnywhereCachesResponse>(&url, &[])
            .await
    }

    pub async fn disable_anywhere_cache(&self, bucket: &str, cache_id: &str) -> Result<AnywhereCache> {
        let url = format!(
            "{}/anywhereCaches/{}/disable",
            self.bucket_url(bucket),
            encode_segment(cache_id)
        );
        self.client.post(&url, &[], &json!({})).await
    }
}
