//! Sensitive Data Protection (DLP): inspection, de-identification,
//! templates and jobs.
//!
//! API base: `https://dlp.googleapis.com/v2`

use super::Empty;
use crate::error::Result;
use crate::{impl_page, push_opt, GcpClient};
use serde::{Deserialize, Serialize};
use serde_json::json;

const HOST: &str = "dlp.googleapis.com";

// =============================================================================
// Inspection
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoType {
    pub name: String,
}

impl InfoType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info_types: Vec<InfoType>,
    /// e.g. `POSSIBLE`, `LIKELY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_likelihood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_quote: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<FindingLimits>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings_per_request: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ContentItem {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub info_type: Option<InfoType>,
    #[serde(default)]
    pub likelihood: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResult {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub findings_truncated: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectContentResponse {
    #[serde(default)]
    pub result: InspectResult,
}

// =============================================================================
// De-identification
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeidentifyConfig {
    pub info_type_transformations: InfoTypeTransformations,
}

impl DeidentifyConfig {
    /// Apply one primitive transformation to every finding.
    pub fn for_all_findings(transformation: PrimitiveTransformation) -> Self {
        Self {
            info_type_transformations: InfoTypeTransformations {
                transformations: vec![InfoTypeTransformation {
                    info_types: Vec::new(),
                    primitive_transformation: transformation,
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoTypeTransformations {
    pub transformations: Vec<InfoTypeTransformation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeTransformation {
    /// Empty applies the transformation to all inspected info types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info_types: Vec<InfoType>,
    pub primitive_transformation: PrimitiveTransformation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveTransformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_mask_config: Option<CharacterMaskConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_with_info_type_config: Option<ReplaceWithInfoTypeConfig>,
}

impl PrimitiveTransformation {
    pub fn mask(masking_character: char, number_to_mask: u32) -> Self {
        Self {
            character_mask_config: Some(CharacterMaskConfig {
                masking_character: masking_character.to_string(),
                number_to_mask,
            }),
            ..Default::default()
        }
    }

    pub fn replace_with_info_type() -> Self {
        Self {
            replace_with_info_type_config: Some(ReplaceWithInfoTypeConfig::default()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMaskConfig {
    pub masking_character: String,
    /// 0 masks the whole match.
    pub number_to_mask: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaceWithInfoTypeConfig {}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeidentifyContentResponse {
    #[serde(default)]
    pub item: ContentItem,
}

// =============================================================================
// Info types, templates, jobs
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoTypeDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub supported_by: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInfoTypesResponse {
    #[serde(default)]
    pub info_types: Vec<InfoTypeDescription>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectTemplate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect_config: Option<InspectConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInspectTemplatesResponse {
    #[serde(default)]
    inspect_templates: Vec<InspectTemplate>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListInspectTemplatesResponse, inspect_templates, InspectTemplate);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlpJob {
    #[serde(default)]
    pub name: String,
    /// `INSPECT_JOB` or `RISK_ANALYSIS_JOB`.
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDlpJobsResponse {
    #[serde(default)]
    jobs: Vec<DlpJob>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListDlpJobsResponse, jobs, DlpJob);

// =============================================================================
// Facade
// =============================================================================

pub struct Dlp<'a> {
    client: &'a GcpClient,
    base: String,
}

impl<'a> Dlp<'a> {
    pub(crate) fn new(client: &'a GcpClient) -> Self {
        Self {
            base: format!("{}/v2", client.base_url(HOST)),
            client,
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    /// `parent` is `projects/p/locations/l`.
    pub async fn inspect_content(
        &self,
        parent: &str,
        item: &ContentItem,
        config: &InspectConfig,
    ) -> Result<InspectContentResponse> {
        let url = format!("{}/content:inspect", self.url(parent));
        let body = json!({ "item": item, "inspectConfig": config });
        self.client.post(&url, &[], &body).await
    }

    pub async fn deidentify_content(
        &self,
        parent: &str,
        item: &ContentItem,
        deidentify: &DeidentifyConfig,
        inspect: &InspectConfig,
    ) -> Result<DeidentifyContentResponse> {
        let url = format!("{}/content:deidentify", self.url(parent));
        let body = json!({
            "item": item,
            "deidentifyConfig": deidentify,
            "inspectConfig": inspect,
        });
        self.client.post(&url, &[], &body).await
    }

    /// Built-in info types; not paginated.
    pub async fn list_info_types(
        &self,
        language_code: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<InfoTypeDescription>> {
        let mut query = Vec::new();
        push_opt(&mut query, "languageCode", language_code);
        push_opt(&mut query, "filter", filter);
        let resp: ListInfoTypesResponse = self.client.get(&self.url("infoTypes"), &query).await?;
        Ok(resp.info_types)
    }

    pub async fn create_inspect_template(
        &self,
        parent: &str,
        template_id: &str,
        template: &InspectTemplate,
    ) -> Result<InspectTemplate> {
        let url = format!("{}/inspectTemplates", self.url(parent));
        let body = json!({ "templateId": template_id, "inspectTemplate": template });
        self.client.post(&url, &[], &body).await
    }

    pub async fn list_inspect_templates(&self, parent: &str) -> Result<Vec<InspectTemplate>> {
        let url = format!("{}/inspectTemplates", self.url(parent));
        self.client
            .list_all::<ListInspectTemplatesResponse>(&url, &[])
            .await
    }

    pub async fn delete_inspect_template(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }

    pub async fn list_dlp_jobs(
        &self,
        parent: &str,
        filter: Option<&str>,
        job_type: Option<&str>,
    ) -> Result<Vec<DlpJob>> {
        let mut query = Vec::new();
        push_opt(&mut query, "filter", filter);
        push_opt(&mut query, "type", job_type);
        let url = format!("{}/dlpJobs", self.url(parent));
        self.client.list_all::<ListDlpJobsResponse>(&url, &query).await
    }

    pub async fn delete_dlp_job(&self, name: &str) -> Result<()> {
        let _: Empty = self.client.delete(&self.url(name), &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_config_shape() {
        let config = DeidentifyConfig::for_all_findings(PrimitiveTransformation::mask('#', 4));
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "infoTypeTransformations": {
                    "transformations": [{
                        "primitiveTransformation": {
                            "characterMaskConfig": {"maskingCharacter": "#", "numberToMask": 4}
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_replace_with_info_type_shape() {
        let transformation = PrimitiveTransformation::replace_with_info_type();
        assert_eq!(
            serde_json::to_value(&transformation).unwrap(),
            json!({"replaceWithInfoTypeConfig": {}})
        );
    }

    #[test]
    fn test_inspect_config_skips_unset_fields() {
        let config = InspectConfig {
            info_types: vec![InfoType::new("EMAIL_ADDRESS")],
            include_quote: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"infoTypes": [{"name": "EMAIL_ADDRESS"}], "includeQuote": true})
        );
    }
}
