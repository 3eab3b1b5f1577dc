//! Sensitive Data Protection (DLP) samples.

use crate::output::handled;
use anyhow::Result;
use clap::{Args, Subcommand};
use gcp_client::services::dlp::{
    ContentItem, DeidentifyConfig, FindingLimits, InfoType, InspectConfig, InspectTemplate,
    PrimitiveTransformation,
};
use gcp_client::{GcpClient, ResourceName};
use std::io::Write;

const DEFAULT_INFO_TYPES: [&str; 3] = ["PHONE_NUMBER", "EMAIL_ADDRESS", "CREDIT_CARD_NUMBER"];

#[derive(Args, Debug)]
pub struct DlpArgs {
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    #[arg(long, default_value = "global")]
    pub location: String,

    #[command(subcommand)]
    pub command: DlpCommand,
}

#[derive(Subcommand, Debug)]
pub enum DlpCommand {
    /// Report sensitive data found in a string
    InspectString {
        #[arg(long)]
        text: String,
        #[arg(long = "info-type")]
        info_types: Vec<String>,
        #[arg(long)]
        min_likelihood: Option<String>,
        #[arg(long)]
        max_findings: Option<u32>,
    },
    /// Mask sensitive characters in a string
    DeidentifyWithMask {
        #[arg(long)]
        text: String,
        #[arg(long = "info-type")]
        info_types: Vec<String>,
        #[arg(long, default_value_t = '*')]
        masking_character: char,
        /// 0 masks the whole match
        #[arg(long, default_value_t = 0)]
        number_to_mask: u32,
    },
    /// Replace sensitive data with its info type name
    DeidentifyWithInfoType {
        #[arg(long)]
        text: String,
        #[arg(long = "info-type")]
        info_types: Vec<String>,
    },
    ListInfoTypes {
        #[arg(long)]
        language_code: Option<String>,
        /// e.g. supported_by=INSPECT
        #[arg(long)]
        filter: Option<String>,
    },
    CreateInspectTemplate {
        #[arg(long)]
        template_id: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long = "info-type")]
        info_types: Vec<String>,
    },
    ListInspectTemplates,
    DeleteInspectTemplate {
        #[arg(long)]
        template_id: String,
    },
    ListJobs {
        #[arg(long)]
        filter: Option<String>,
        /// INSPECT_JOB or RISK_ANALYSIS_JOB
        #[arg(long)]
        job_type: Option<String>,
    },
    DeleteJob {
        #[arg(long)]
        job_id: String,
    },
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: DlpArgs) -> Result<()> {
    let parent = ResourceName::project(&args.project_id)?.location(&args.location)?;

    match args.command {
        DlpCommand::InspectString {
            text,
            info_types,
            min_likelihood,
            max_findings,
        } => {
            let config = InspectConfig {
                min_likelihood,
                limits: max_findings.map(|max| FindingLimits {
                    max_findings_per_request: Some(max),
                }),
                ..inspect_config(&info_types)
            };
            inspect_string(client, out, &parent, &text, &config).await
        }
        DlpCommand::DeidentifyWithMask {
            text,
            info_types,
            masking_character,
            number_to_mask,
        } => {
            let transformation = PrimitiveTransformation::mask(masking_character, number_to_mask);
            deidentify(client, out, &parent, &text, &info_types, transformation).await
        }
        DlpCommand::DeidentifyWithInfoType { text, info_types } => {
            let transformation = PrimitiveTransformation::replace_with_info_type();
            deidentify(client, out, &parent, &text, &info_types, transformation).await
        }
        DlpCommand::ListInfoTypes {
            language_code,
            filter,
        } => list_info_types(client, out, language_code.as_deref(), filter.as_deref()).await,
        DlpCommand::CreateInspectTemplate {
            template_id,
            display_name,
            info_types,
        } => {
            let template = InspectTemplate {
                display_name,
                inspect_config: Some(inspect_config(&info_types)),
                ..Default::default()
            };
            create_inspect_template(client, out, &parent, &template_id, &template).await
        }
        DlpCommand::ListInspectTemplates => list_inspect_templates(client, out, &parent).await,
        DlpCommand::DeleteInspectTemplate { template_id } => {
            delete_inspect_template(client, out, &parent, &template_id).await
        }
        DlpCommand::ListJobs { filter, job_type } => {
            list_jobs(client, out, &parent, filter.as_deref(), job_type.as_deref()).await
        }
        DlpCommand::DeleteJob { job_id } => delete_job(client, out, &parent, &job_id).await,
    }
}

/// Inspect config quoting findings of `info_types`, or the default set when empty.
pub fn inspect_config(info_types: &[String]) -> InspectConfig {
    let info_types = if info_types.is_empty() {
        DEFAULT_INFO_TYPES.iter().map(|name| InfoType::new(*name)).collect()
    } else {
        info_types.iter().map(InfoType::new).collect()
    };
    InspectConfig {
        info_types,
        include_quote: Some(true),
        ..Default::default()
    }
}

pub async fn inspect_string(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    text: &str,
    config: &InspectConfig,
) -> Result<()> {
    let result = client
        .dlp()
        .inspect_content(&parent.to_string(), &ContentItem::text(text), config)
        .await;
    let Some(response) = handled(out, result, "Project", &parent.to_string())? else {
        return Ok(());
    };

    let findings = &response.result.findings;
    if findings.is_empty() {
        writeln!(out, "No findings.")?;
        return Ok(());
    }
    for finding in findings {
        writeln!(out, "Quote: {}", finding.quote.as_deref().unwrap_or_default())?;
        let info_type = finding.info_type.as_ref().map(|t| t.name.as_str());
        writeln!(out, "Info type: {}", info_type.unwrap_or_default())?;
        writeln!(out, "Likelihood: {}", finding.likelihood.as_deref().unwrap_or_default())?;
    }
    if response.result.findings_truncated == Some(true) {
        writeln!(out, "Findings were truncated.")?;
    }
    Ok(())
}

pub async fn deidentify(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    text: &str,
    info_types: &[String],
    transformation: PrimitiveTransformation,
) -> Result<()> {
    let result = client
        .dlp()
        .deidentify_content(
            &parent.to_string(),
            &ContentItem::text(text),
            &DeidentifyConfig::for_all_findings(transformation),
            &inspect_config(info_types),
        )
        .await;
    let Some(response) = handled(out, result, "Project", &parent.to_string())? else {
        return Ok(());
    };
    writeln!(out, "{}", response.item.value.unwrap_or_default())?;
    Ok(())
}

pub async fn list_info_types(
    client: &GcpClient,
    out: &mut dyn Write,
    language_code: Option<&str>,
    filter: Option<&str>,
) -> Result<()> {
    let info_types = client.dlp().list_info_types(language_code, filter).await?;
    for info_type in &info_types {
        writeln!(
            out,
            "{}: {}",
            info_type.name,
            info_type.display_name.as_deref().unwrap_or_default()
        )?;
    }
    Ok(())
}

pub async fn create_inspect_template(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    template_id: &str,
    template: &InspectTemplate,
) -> Result<()> {
    let result = client
        .dlp()
        .create_inspect_template(&parent.to_string(), template_id, template)
        .await;
    let Some(created) = handled(out, result, "Inspect template", template_id)? else {
        return Ok(());
    };
    writeln!(out, "Successfully created template {}", created.name)?;
    Ok(())
}

pub async fn list_inspect_templates(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
) -> Result<()> {
    let result = client.dlp().list_inspect_templates(&parent.to_string()).await;
    let Some(templates) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for template in &templates {
        writeln!(out, "Template {}:", template.name)?;
        if let Some(display_name) = &template.display_name {
            writeln!(out, "  Display name: {}", display_name)?;
        }
        if let Some(config) = &template.inspect_config {
            let names: Vec<&str> = config.info_types.iter().map(|t| t.name.as_str()).collect();
            writeln!(out, "  Info types: {}", names.join(", "))?;
        }
    }
    if templates.is_empty() {
        writeln!(out, "No inspect templates found.")?;
    }
    Ok(())
}

pub async fn delete_inspect_template(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    template_id: &str,
) -> Result<()> {
    let name = parent
        .clone()
        .child("inspectTemplates", template_id)?
        .to_string();
    let result = client.dlp().delete_inspect_template(&name).await;
    if handled(out, result, "Inspect template", template_id)?.is_some() {
        writeln!(out, "Successfully deleted template {}", name)?;
    }
    Ok(())
}

pub async fn list_jobs(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    filter: Option<&str>,
    job_type: Option<&str>,
) -> Result<()> {
    let result = client
        .dlp()
        .list_dlp_jobs(&parent.to_string(), filter, job_type)
        .await;
    let Some(jobs) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for job in &jobs {
        writeln!(out, "Job {} status: {}", job.name, job.state)?;
    }
    if jobs.is_empty() {
        writeln!(out, "No jobs found.")?;
    }
    Ok(())
}

pub async fn delete_job(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    job_id: &str,
) -> Result<()> {
    let name = parent.clone().child("dlpJobs", job_id)?.to_string();
    let result = client.dlp().delete_dlp_job(&name).await;
    if handled(out, result, "Job", job_id)?.is_some() {
        writeln!(out, "Successfully deleted job {}", name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_config_default_info_types() {
        let config = inspect_config(&[]);
        let names: Vec<&str> = config.info_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, DEFAULT_INFO_TYPES);
        assert_eq!(config.include_quote, Some(true));
    }

    #[test]
    fn test_inspect_config_explicit_info_types() {
        let config = inspect_config(&["US_SOCIAL_SECURITY_NUMBER".to_string()]);
        assert_eq!(config.info_types, vec![InfoType::new("US_SOCIAL_SECURITY_NUMBER")]);
    }
}
