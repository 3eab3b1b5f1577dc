//! Pure Google Cloud REST/JSON API client.
//!
//! A small client for the JSON surfaces of Google Cloud APIs: authenticated
//! requests, error decoding, page-token iteration and long-running operation
//! polling, plus typed facades for the services used by the samples.
//!
//! # Example
//!
//! ```rust,ignore
//! use gcp_client::GcpClient;
//!
//! let client = GcpClient::from_env(Default::default())?;
//!
//! let secrets = client.secret_manager(None).list_secrets("projects/my-project", None).await?;
//! for secret in &secrets {
//!     println!("{}", secret.name);
//! }
//! ```

pub mod auth;
pub mod error;
pub mod operation;
pub mod resource;
pub mod services;

pub use auth::{AccessToken, StaticToken, TokenProvider};
pub use error::{Code, GcpError, Result, Status};
pub use operation::Operation;
pub use resource::{FieldMask, ResourceName};

use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Send every request here instead of `https://{service}.googleapis.com`.
    pub endpoint_override: Option<String>,
    /// Project billed for quota (`x-goog-user-project`). `from_env` falls
    /// back to the `quota_project_id` of user credentials.
    pub quota_project: Option<String>,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Delay between polls of a long-running operation.
    pub poll_interval: Duration,
    /// Give up waiting on a long-running operation after this long.
    pub operation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_override: None,
            quota_project: None,
            user_agent: concat!("gcp-client/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            operation_timeout: Duration::from_secs(300),
        }
    }
}

/// A list response that may continue on another page.
pub trait Page: DeserializeOwned {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// Implement [`Page`] for a `{ <field>: [...], nextPageToken }` response.
#[macro_export]
macro_rules! impl_page {
    ($page:ty, $field:ident, $item:ty) => {
        impl $crate::Page for $page {
            type Item = $item;

            fn into_parts(self) -> (Vec<$item>, Option<String>) {
                (self.$field, self.next_page_token)
            }
        }
    };
}

/// Authenticated Google Cloud API client. Cheap to clone.
#[derive(Clone)]
pub struct GcpClient {
    http: Client,
    tokens: Arc<dyn TokenProvider>,
    config: ClientConfig,
}

impl GcpClient {
    /// Create a client with the given token provider.
    pub fn new(tokens: Arc<dyn TokenProvider>, config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            tokens,
            config,
        })
    }

    /// Create a client from Application Default Credentials.
    pub fn from_env(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(15))
            .build()?;
        let credentials = auth::default_credentials(http.clone())?;
        Ok(Self::with_credentials(http, credentials, config))
    }

    /// An explicit `quota_project` wins over the one named by the credentials.
    fn with_credentials(http: Client, credentials: auth::DefaultCredentials, mut config: ClientConfig) -> Self {
        if config.quota_project.is_none() {
            config.quota_project = credentials.quota_project;
        }
        Self {
            http,
            tokens: credentials.tokens,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL for a service host such as `secretmanager.googleapis.com`.
    pub fn base_url(&self, default_host: &str) -> String {
        match &self.config.endpoint_override {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", default_host),
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.execute(Method::GET, url, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T> {
        let body = to_json(body)?;
        self.execute(Method::POST, url, query, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T> {
        let body = to_json(body)?;
        self.execute(Method::PATCH, url, query, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.execute(Method::DELETE, url, query, None).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T> {
        let token = self.tokens.access_token().await?;
        tracing::debug!(%method, url, "Sending Google Cloud request");

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&token.token)
            .header(header::USER_AGENT, &self.config.user_agent);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(project) = &self.config.quota_project {
            request = request.header("x-goog-user-project", project);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let status = Status::from_response(status.as_u16(), &text);
            tracing::debug!(url, code = %status.code, "Google Cloud request failed");
            return Err(GcpError::Api(status));
        }

        // Deletes answer with an empty body (or 204).
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| GcpError::Parse(format!("Failed to decode response from {}: {}", url, e)))
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// GET every page of a list method, following `nextPageToken`.
    pub async fn list_all<P: Page>(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<P::Item>> {
        self.paginate::<P>(Method::GET, url, query).await
    }

    /// Like [`list_all`](Self::list_all) for list methods exposed as POST.
    pub async fn list_all_post<P: Page>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<P::Item>> {
        self.paginate::<P>(Method::POST, url, query).await
    }

    async fn paginate<P: Page>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_query = query.to_vec();
            if let Some(token) = &page_token {
                page_query.push(("pageToken", token.clone()));
            }

            let body = (method == Method::POST).then(|| Value::Object(Default::default()));
            let page: P = self.execute(method.clone(), url, &page_query, body).await?;
            let (mut batch, next) = page.into_parts();
            items.append(&mut batch);

            match next.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(items)
    }

    // =========================================================================
    // Long-running operations
    // =========================================================================

    /// Poll `operation` until it is done and return its response.
    ///
    /// `poll_url` maps the operation name to the URL that reports its state.
    pub async fn wait_operation(
        &self,
        operation: Operation,
        poll_url: impl Fn(&str) -> String,
    ) -> Result<Operation> {
        let deadline = Instant::now() + self.config.operation_timeout;
        let mut operation = operation;

        if !operation.done {
            tracing::info!(operation = %operation.name, "Waiting for operation to complete");
        }
        while !operation.done {
            if Instant::now() >= deadline {
                return Err(GcpError::Timeout(operation.name));
            }
            tokio::time::sleep(self.config.poll_interval).await;
            operation = self.get(&poll_url(&operation.name), &[]).await?;
        }

        tracing::debug!(operation = %operation.name, "Operation finished");
        Ok(operation)
    }

    /// Wait for an operation and decode its response as `T`.
    pub async fn wait_operation_as<T: DeserializeOwned>(
        &self,
        operation: Operation,
        poll_url: impl Fn(&str) -> String,
    ) -> Result<T> {
        self.wait_operation(operation, poll_url).await?.decode()
    }

    // =========================================================================
    // Service facades
    // =========================================================================

    /// Secret Manager; `location` selects the regional endpoint.
    pub fn secret_manager(&self, location: Option<&str>) -> services::SecretManager<'_> {
        services::SecretManager::new(self, location)
    }

    pub fn bigquery_connection(&self) -> services::BigQueryConnection<'_> {
        services::BigQueryConnection::new(self)
    }

    pub fn data_transfer(&self) -> services::DataTransfer<'_> {
        services::DataTransfer::new(self)
    }

    pub fn dlp(&self) -> services::Dlp<'_> {
        services::Dlp::new(self)
    }

    pub fn dataplex(&self) -> services::Dataplex<'_> {
        services::Dataplex::new(self)
    }

    pub fn eventarc(&self) -> services::Eventarc<'_> {
        services::Eventarc::new(self)
    }

    pub fn monitoring(&self) -> services::Monitoring<'_> {
        services::Monitoring::new(self)
    }

    /// Speech-to-Text; `location` selects the regional v2 endpoint.
    pub fn speech(&self, location: Option<&str>) -> services::Speech<'_> {
        services::Speech::new(self, location)
    }

    pub fn storage_control(&self) -> services::StorageControl<'_> {
        services::StorageControl::new(self)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| GcpError::Parse(format!("Failed to serialize request: {}", e)))
}

/// Single query pair, for call sites with optional parameters.
pub(crate) fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        query.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: ClientConfig) -> GcpClient {
        GcpClient::new(Arc::new(StaticToken::new("t")), config).unwrap()
    }

    #[test]
    fn test_quota_project_falls_back_to_credentials() {
        let credentials = || auth::DefaultCredentials {
            tokens: Arc::new(StaticToken::new("t")),
            quota_project: Some("adc-billing".into()),
        };

        let client = GcpClient::with_credentials(Client::new(), credentials(), ClientConfig::default());
        assert_eq!(client.config().quota_project.as_deref(), Some("adc-billing"));

        let explicit = ClientConfig {
            quota_project: Some("explicit".into()),
            ..Default::default()
        };
        let client = GcpClient::with_credentials(Client::new(), credentials(), explicit);
        assert_eq!(client.config().quota_project.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_base_url_default_host() {
        let client = client(ClientConfig::default());
        assert_eq!(
            client.base_url("dlp.googleapis.com"),
            "https://dlp.googleapis.com"
        );
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let client = client(ClientConfig {
            endpoint_override: Some("http://127.0.0.1:9000/".into()),
            ..Default::default()
        });
        assert_eq!(client.base_url("dlp.googleapis.com"), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_push_opt_skips_empty() {
        let mut query = Vec::new();
        push_opt(&mut query, "filter", None);
        push_opt(&mut query, "filter", Some(""));
        push_opt(&mut query, "filter", Some("labels.env=prod"));
        assert_eq!(query, vec![("filter", "labels.env=prod".to_string())]);
    }
}
