//! Cloud Monitoring samples.

use crate::output::{handled, parse_label};
use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use clap::{ArgGroup, Args, Subcommand};
use gcp_client::services::monitoring::{
    HttpCheck, MetricDescriptor, Metric, MonitoredResource, Point, TimeSeries, UptimeCheckConfig,
};
use gcp_client::{FieldMask, GcpClient, ResourceName};
use std::collections::HashMap;
use std::io::Write;

#[derive(Args, Debug)]
pub struct MonitoringArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    #[command(subcommand)]
    pub command: MonitoringCommand,
}

#[derive(Subcommand, Debug)]
pub enum MonitoringCommand {
    CreateMetricDescriptor {
        /// e.g. custom.googleapis.com/my_metric
        #[arg(long)]
        metric_type: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "GAUGE")]
        metric_kind: String,
        #[arg(long, default_value = "DOUBLE")]
        value_type: String,
    },
    GetMetricDescriptor {
        #[arg(long)]
        metric_type: String,
    },
    ListMetricDescriptors {
        #[arg(long)]
        filter: Option<String>,
    },
    DeleteMetricDescriptor {
        #[arg(long)]
        metric_type: String,
    },
    /// Write one gauge point of a custom metric
    WriteTimeSeries {
        #[arg(long)]
        metric_type: String,
        #[arg(long)]
        value: f64,
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
    /// Print points written in the last few minutes
    ListTimeSeries {
        #[arg(long)]
        filter: String,
        /// Window ending now, at most one year
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(i64).range(1..=525_600))]
        minutes: i64,
    },
    ListMonitoredResourceDescriptors,
    ListAlertPolicies {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Enable or disable every alert policy matching a filter
    #[command(group(ArgGroup::new("state").required(true).args(["enable", "disable"])))]
    EnableAlertPolicies {
        #[arg(long)]
        enable: bool,
        #[arg(long)]
        disable: bool,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Check a host over HTTP every five minutes
    CreateUptimeCheck {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "New uptime check")]
        display_name: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
    ListUptimeChecks,
    DeleteUptimeCheck {
        #[arg(long)]
        uptime_check_id: String,
    },
    ListNotificationChannels,
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: MonitoringArgs) -> Result<()> {
    let project = ResourceName::project(&args.project_id)?;

    match args.command {
        MonitoringCommand::CreateMetricDescriptor {
            metric_type,
            description,
            metric_kind,
            value_type,
        } => {
            let descriptor = MetricDescriptor {
                metric_type,
                description,
                metric_kind: Some(metric_kind),
                value_type: Some(value_type),
                ..Default::default()
            };
            create_metric_descriptor(client, out, &project, &descriptor).await
        }
        MonitoringCommand::GetMetricDescriptor { metric_type } => {
            get_metric_descriptor(client, out, &project, &metric_type).await
        }
        MonitoringCommand::ListMetricDescriptors { filter } => {
            list_metric_descriptors(client, out, &project, filter.as_deref()).await
        }
        MonitoringCommand::DeleteMetricDescriptor { metric_type } => {
            delete_metric_descriptor(client, out, &project, &metric_type).await
        }
        MonitoringCommand::WriteTimeSeries {
            metric_type,
            value,
            labels,
        } => write_time_series(client, out, &project, &metric_type, value, labels.into_iter().collect()).await,
        MonitoringCommand::ListTimeSeries { filter, minutes } => {
            list_time_series(client, out, &project, &filter, minutes).await
        }
        MonitoringCommand::ListMonitoredResourceDescriptors => {
            list_monitored_resource_descriptors(client, out, &project).await
        }
        MonitoringCommand::ListAlertPolicies { filter } => {
            list_alert_policies(client, out, &project, filter.as_deref()).await
        }
        MonitoringCommand::EnableAlertPolicies { enable, filter, .. } => {
            enable_alert_policies(client, out, &project, enable, filter.as_deref()).await
        }
        MonitoringCommand::CreateUptimeCheck {
            host,
            display_name,
            path,
        } => create_uptime_check(client, out, &project, &host, &display_name, &path).await,
        MonitoringCommand::ListUptimeChecks => list_uptime_checks(client, out, &project).await,
        MonitoringCommand::DeleteUptimeCheck { uptime_check_id } => {
            delete_uptime_check(client, out, &project, &uptime_check_id).await
        }
        MonitoringCommand::ListNotificationChannels => {
            list_notification_channels(client, out, &project).await
        }
    }
}

/// Metric types contain `/`, so descriptor names are joined verbatim.
fn descriptor_name(project: &ResourceName, metric_type: &str) -> String {
    format!("{}/metricDescriptors/{}", project, metric_type)
}

// =============================================================================
// Metrics
// =============================================================================

pub async fn create_metric_descriptor(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    descriptor: &MetricDescriptor,
) -> Result<()> {
    let result = client
        .monitoring()
        .create_metric_descriptor(&project.to_string(), descriptor)
        .await;
    let Some(created) = handled(out, result, "Metric descriptor", &descriptor.metric_type)? else {
        return Ok(());
    };
    writeln!(out, "Created {}", created.name)?;
    Ok(())
}

pub async fn get_metric_descriptor(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    metric_type: &str,
) -> Result<()> {
    let name = descriptor_name(project, metric_type);
    let result = client.monitoring().get_metric_descriptor(&name).await;
    let Some(descriptor) = handled(out, result, "Metric descriptor", metric_type)? else {
        return Ok(());
    };
    writeln!(out, "Name: {}", descriptor.name)?;
    writeln!(out, "Type: {}", descriptor.metric_type)?;
    writeln!(out, "Metric kind: {}", descriptor.metric_kind.as_deref().unwrap_or_default())?;
    writeln!(out, "Value type: {}", descriptor.value_type.as_deref().unwrap_or_default())?;
    writeln!(out, "Description: {}", descriptor.description.as_deref().unwrap_or_default())?;
    for label in &descriptor.labels {
        writeln!(out, "Label: {}", label.key)?;
    }
    Ok(())
}

pub async fn list_metric_descriptors(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    filter: Option<&str>,
) -> Result<()> {
    let result = client
        .monitoring()
        .list_metric_descriptors(&project.to_string(), filter)
        .await;
    let Some(descriptors) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };
    for descriptor in &descriptors {
        writeln!(out, "{}", descriptor.metric_type)?;
    }
    Ok(())
}

pub async fn delete_metric_descriptor(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    metric_type: &str,
) -> Result<()> {
    let name = descriptor_name(project, metric_type);
    let result = client.monitoring().delete_metric_descriptor(&name).await;
    if handled(out, result, "Metric descriptor", metric_type)?.is_some() {
        writeln!(out, "Deleted metric descriptor {}", name)?;
    }
    Ok(())
}

pub async fn write_time_series(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    metric_type: &str,
    value: f64,
    labels: HashMap<String, String>,
) -> Result<()> {
    let series = TimeSeries {
        metric: Metric {
            metric_type: metric_type.to_string(),
            labels,
        },
        resource: MonitoredResource {
            resource_type: "global".to_string(),
            labels: HashMap::from([("project_id".to_string(), project.id().to_string())]),
        },
        points: vec![Point::double(Utc::now(), value)],
        ..Default::default()
    };
    let result = client
        .monitoring()
        .create_time_series(&project.to_string(), &[series])
        .await;
    if handled(out, result, "Metric", metric_type)?.is_some() {
        writeln!(out, "Wrote {} to {}", value, metric_type)?;
    }
    Ok(())
}

pub async fn list_time_series(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    filter: &str,
    minutes: i64,
) -> Result<()> {
    let end = Utc::now();
    let Some(start) = Duration::try_minutes(minutes).and_then(|window| end.checked_sub_signed(window))
    else {
        bail!("--minutes {} is out of range", minutes);
    };
    let result = client
        .monitoring()
        .list_time_series(&project.to_string(), filter, start, end)
        .await;
    let Some(series) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };
    for ts in &series {
        writeln!(out, "{} {:?}", ts.metric.metric_type, ts.metric.labels)?;
        for point in &ts.points {
            let at = point.interval.end_time.as_deref().unwrap_or_default();
            writeln!(out, "  {} {}", at, point.value.display())?;
        }
    }
    if series.is_empty() {
        writeln!(out, "No time series found.")?;
    }
    Ok(())
}

pub async fn list_monitored_resource_descriptors(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
) -> Result<()> {
    let result = client
        .monitoring()
        .list_monitored_resource_descriptors(&project.to_string())
        .await;
    let Some(descriptors) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };
    for descriptor in &descriptors {
        writeln!(out, "{}", descriptor.resource_type)?;
    }
    Ok(())
}

// =============================================================================
// Alerting
// =============================================================================

pub async fn list_alert_policies(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    filter: Option<&str>,
) -> Result<()> {
    let result = client
        .monitoring()
        .list_alert_policies(&project.to_string(), filter)
        .await;
    let Some(policies) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };
    for policy in &policies {
        let state = if policy.enabled.unwrap_or(false) { "enabled" } else { "disabled" };
        writeln!(
            out,
            "{} {} ({})",
            policy.name,
            policy.display_name.as_deref().unwrap_or_default(),
            state
        )?;
    }
    if policies.is_empty() {
        writeln!(out, "No alert policies found.")?;
    }
    Ok(())
}

/// Patch only the policies whose state differs from `enable`.
pub async fn enable_alert_policies(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    enable: bool,
    filter: Option<&str>,
) -> Result<()> {
    let monitoring = client.monitoring();
    let result = monitoring.list_alert_policies(&project.to_string(), filter).await;
    let Some(policies) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };

    let mask = FieldMask::new().with("enabled");
    let verb = if enable { "enabled" } else { "disabled" };
    for mut policy in policies {
        if policy.enabled == Some(enable) {
            writeln!(out, "Policy {} is already {}", policy.name, verb)?;
            continue;
        }
        policy.enabled = Some(enable);
        let name = policy.name.clone();
        let result = monitoring.update_alert_policy(&policy, &mask).await;
        if handled(out, result, "Alert policy", &name)?.is_some() {
            writeln!(out, "Policy {} {}", name, verb)?;
        }
    }
    Ok(())
}

// =============================================================================
// Uptime checks and channels
// =============================================================================

pub async fn create_uptime_check(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    host: &str,
    display_name: &str,
    path: &str,
) -> Result<()> {
    let config = UptimeCheckConfig {
        display_name: Some(display_name.to_string()),
        monitored_resource: Some(MonitoredResource {
            resource_type: "uptime_url".to_string(),
            labels: HashMap::from([
                ("host".to_string(), host.to_string()),
                ("project_id".to_string(), project.id().to_string()),
            ]),
        }),
        http_check: Some(HttpCheck {
            path: Some(path.to_string()),
            port: Some(80),
            use_ssl: None,
        }),
        timeout: Some("10s".to_string()),
        period: Some("300s".to_string()),
        ..Default::default()
    };
    let result = client
        .monitoring()
        .create_uptime_check_config(&project.to_string(), &config)
        .await;
    let Some(created) = handled(out, result, "Uptime check", display_name)? else {
        return Ok(());
    };
    writeln!(out, "Created uptime check {}", created.name)?;
    Ok(())
}

pub async fn list_uptime_checks(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
) -> Result<()> {
    let result = client
        .monitoring()
        .list_uptime_check_configs(&project.to_string())
        .await;
    let Some(configs) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };
    for config in &configs {
        writeln!(
            out,
            "{} ({})",
            config.name,
            config.display_name.as_deref().unwrap_or_default()
        )?;
    }
    if configs.is_empty() {
        writeln!(out, "No uptime checks found.")?;
    }
    Ok(())
}

pub async fn delete_uptime_check(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
    uptime_check_id: &str,
) -> Result<()> {
    let name = project
        .clone()
        .child("uptimeCheckConfigs", uptime_check_id)?
        .to_string();
    let result = client.monitoring().delete_uptime_check_config(&name).await;
    if handled(out, result, "Uptime check", uptime_check_id)?.is_some() {
        writeln!(out, "Deleted uptime check {}", name)?;
    }
    Ok(())
}

pub async fn list_notification_channels(
    client: &GcpClient,
    out: &mut dyn Write,
    project: &ResourceName,
) -> Result<()> {
    let result = client
        .monitoring()
        .list_notification_channels(&project.to_string())
        .await;
    let Some(channels) = handled(out, result, "Project", project.id())? else {
        return Ok(());
    };
    for channel in &channels {
        writeln!(
            out,
            "{} [{}] {}",
            channel.name,
            channel.channel_type,
            channel.display_name.as_deref().unwrap_or_default()
        )?;
    }
    if channels.is_empty() {
        writeln!(out, "No notification channels found.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_name_keeps_metric_type_slashes() {
        let project = ResourceName::project("p").unwrap();
        assert_eq!(
            descriptor_name(&project, "custom.googleapis.com/stores/daily_sales"),
            "projects/p/metricDescriptors/custom.googleapis.com/stores/daily_sales"
        );
    }

    #[test]
    fn test_minutes_outside_one_year_rejected() {
        use crate::cli::Cli;
        use clap::Parser;

        let parse = |minutes: &str| {
            Cli::try_parse_from([
                "cloud-samples",
                "monitoring",
                "--project-id",
                "p",
                "list-time-series",
                "--filter",
                "metric.type = \"x\"",
                "--minutes",
                minutes,
            ])
        };
        assert!(parse("9223372036854775807").is_err());
        assert!(parse("0").is_err());
        assert!(parse("525600").is_ok());
    }
}
