//! Cloud Monitoring: metric descriptors, time series, alert policies,
//! uptime checks and notification channels.
//!
//! API base: `https://monitoring.googleapis.com/v3`

use super::Empty;
use crate::error::Result;
use crate::resource::FieldMask;
use crate::{impl_page, push_opt, GcpClient};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

const HOST: &str = "monitoring.googleapis.com";

// =============================================================================
// Metrics and time series
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// e.g. `custom.googleapis.com/my_metric`
    #[serde(default, rename = "type")]
    pub metric_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDescriptor {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub metric: Metric,
    pub resource: MonitoredResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub metric_type: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Point {
    pub interval: TimeInterval,
    pub value: TypedValue,
}

impl Point {
    /// A gauge point at `at`.
    pub fn double(at: DateTime<Utc>, value: f64) -> Self {
        Self {
            interval: TimeInterval {
                start_time: None,
                end_time: Some(timestamp(at)),
            },
            value: TypedValue {
                double_value: Some(value),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    /// int64 travels as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int64_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

impl TypedValue {
    /// Render whichever field is set.
    pub fn display(&self) -> String {
        if let Some(v) = self.double_value {
            v.to_string()
        } else if let Some(v) = &self.int64_value {
            v.clone()
        } else if let Some(v) = self.bool_value {
            v.to_string()
        } else if let Some(v) = &self.string_value {
            v.clone()
        } else {
            "<unset>".to_string()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredResourceDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Alerting and uptime
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPolicy {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combiner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_channels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeCheckConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitored_resource: Option<MonitoredResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_check: Option<HttpCheck>,
    /// Duration string, e.g. `"10s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_ssl: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannel {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub channel_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

// =============================================================================
// List responses
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMetricDescriptorsResponse {
    #[serde(default)]
    metric_descriptors: Vec<MetricDescriptor>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListMetricDescriptorsResponse, metric_descriptors, MetricDescriptor);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTimeSeriesResponse {
    #[serde(default)]
    time_series: Vec<TimeSeries>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListTimeSeriesResponse, time_series, TimeSeries);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMonitoredResourceDescriptorsResponse {
    #[serde(default)]
    resource_descriptors: Vec<MonitoredResourceDescriptor>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(
    ListMonitoredResourceDescriptorsResponse,
    resource_descriptors,
    MonitoredResourceDescriptor
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAlertPoliciesResponse {
    #[serde(default)]
    alert_policies: Vec<AlertPolicy>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListAlertPoliciesResponse, alert_policies, AlertPolicy);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListUptimeCheckConfigsResponse {
    #[serde(default)]
    uptime_check_configs: Vec<UptimeCheckConfig>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListUptimeCheckConfigsResponse, uptime_check_configs, UptimeCheckConfig);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListNotificationChannelsResponse {
    #[serde(default)]
    notification_channels: Vec<NotificationChannel>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListNotificationChannelsResponse, notification_channels, NotificationChannel);

/// RFC 3339 with second precision, as Monitoring expects.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// =============================================================================
// Facade
// =============================================================================

pub struct Monitoring<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> Monitoring<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/v3", client.base_url(HOST)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    /// `project` is `projects/p`.
    pub async fn create_metric_descriptor(
        &self,
        project: &str,
        descriptor: &MetricDescriptor,
    ) -> Result<MetricDescriptor> {
        let url = format!("{}/metricDescriptors", self.url(project));
        self.client.post(&url, &[], descriptor).await
    }

    /// `name` is `projects/p/metricDescriptors/{metric type}`; the type keeps its slashes.
    pub async fn get_metric_descriptor(&self, name: &str) -> Result<MetricDescriptor> {
        self.client.get(&self.url(name), &[]).await
    }

    pub async fn list_metric_descriptors(
        &self,
        project: &str,
        filter: Option<&str>,
    ) -> Result<Vec<MetricDescriptor>> {
        let mut query = Vec::new();
        push_opt(&mut query, "filter", filter);
        let url = format!("{}/metricDescriptors", self.url(project));
        self.client
            .list_all::<ListMetricDescriptorsResponse>(&url, &query)
            .await
    }

    pub async fn delete_metric_descriptor(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }

    pub async fn create_time_series(&self, project: &str, series: &[TimeSeries]) -> Result<()> {
        let url = format!("{}/timeSeries", self.url(project));
        let _: Empty = self
            .client
            .post(&url, &[], &json!({ "timeSeries": series }))
            .await?;
        Ok(())
    }

    pub async fn list_time_series(
        &self,
        project: &str,
        filter: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeSeries>> {
        let url = format!("{}/timeSeries", self.url(project));
        let query = [
            ("filter", filter.to_string()),
            ("interval.startTime", timestamp(start)),
            ("interval.endTime", timestamp(end)),
            ("view", "FULL".to_string()),
        ];
        self.client
            .list_all::<ListTimeSeriesResponse>(&url, &query)
            .await
    }

    pub async fn list_monitored_resource_descriptors(
        &self,
        project: &str,
    ) -> Result<Vec<MonitoredResourceDescriptor>> {
        let url = format!("{}/monitoredResourceDescriptors", self.url(project));
        self.client
            .list_all::<ListMonitoredResourceDescriptorsResponse>(&url, &[])
            .await
    }

    pub async fn list_alert_policies(
        &self,
        project: &str,
        filter: Option<&str>,
    ) -> Result<Vec<AlertPolicy>> {
        let mut query = Vec::new();
        push_opt(&mut query, "filter", filter);
        let url = format!("{}/alertPolicies", self.url(project));
        self.client
            .list_all::<ListAlertPoliciesResponse>(&url, &query)
            .await
    }

    pub async fn update_alert_policy(&self, policy: &AlertPolicy, mask: &FieldMask) -> Result<AlertPolicy> {
        self.client
            .patch(&self.url(&policy.name), &[("updateMask", mask.to_string())], policy)
            .await
    }

    pub async fn create_uptime_check_config(
        &self,
        project: &str,
        config: &UptimeCheckConfig,
    ) -> Result<UptimeCheckConfig> {
        let url = format!("{}/uptimeCheckConfigs", self.url(project));
        self.client.post(&url, &[], config).await
    }

    pub async fn list_uptime_check_configs(&self, project: &str) -> Result<Vec<UptimeCheckConfig>> {
        let url = format!("{}/uptimeCheckConfigs", self.url(project));
        self.client
            .list_all::<ListUptimeCheckConfigsResponse>(&url, &[])
            .await
    }

    pub async fn delete_uptime_check_config(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }

    pub async fn list_notification_channels(&self, project: &str) -> Result<Vec<NotificationChannel>> {
        let url = format!("{}/notificationChannels", self.url(project));
        self.client
            .list_all::<ListNotificationChannelsResponse>(&url, &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_double_point_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            serde_json::to_value(Point::double(at, 3.5)).unwrap(),
            json!({"interval": {"endTime": "2024-05-01T12:00:00Z"}, "value": {"doubleValue": 3.5}})
        );
    }

    #[test]
    fn test_typed_value_display() {
        let int: TypedValue = serde_json::from_value(json!({"int64Value": "42"})).unwrap();
        assert_eq!(int.display(), "42");
        assert_eq!(TypedValue::default().display(), "<unset>");
    }
}
