//! Speech-to-Text v1 recognition and v2 recognizers.
//!
//! v1 base: `https://speech.googleapis.com/v1`; v1 operations are polled at
//! `v1/operations/{name}`. v2 base: `https://speech.googleapis.com/v2` for
//! `global`, `https://{location}-speech.googleapis.com/v2` otherwise.

use crate::error::Result;
use crate::operation::Operation;
use crate::{impl_page, GcpClient};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const HOST: &str = "speech.googleapis.com";

// =============================================================================
// v1
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    /// e.g. `LINEAR16`, `FLAC`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate_hertz: Option<u32>,
    pub language_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_automatic_punctuation: Option<bool>,
}

/// Inline bytes or a `gs://` URI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionAudio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl RecognitionAudio {
    pub fn bytes(audio: &[u8]) -> Self {
        Self {
            content: Some(STANDARD.encode(audio)),
            uri: None,
        }
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            content: None,
            uri: Some(uri.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// Response of v1 `recognize`, v1 `longrunningrecognize` and v2 `recognize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

impl RecognizeResponse {
    /// Top alternative of every result.
    pub fn transcripts(&self) -> impl Iterator<Item = &SpeechRecognitionAlternative> {
        self.results.iter().filter_map(|r| r.alternatives.first())
    }
}

// =============================================================================
// v2
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfigV2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_decoding_config: Option<AutoDetectDecodingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language_codes: Vec<String>,
}

impl RecognitionConfigV2 {
    pub fn auto(model: Option<&str>, language_codes: &[String]) -> Self {
        Self {
            auto_decoding_config: Some(AutoDetectDecodingConfig::default()),
            model: model.map(str::to_string),
            language_codes: language_codes.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoDetectDecodingConfig {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recognizer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_recognition_config: Option<RecognitionConfigV2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListRecognizersResponse {
    #[serde(default)]
    recognizers: Vec<Recognizer>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl_page!(ListRecognizersResponse, recognizers, Recognizer);

// =============================================================================
// Facade
// =============================================================================

pub struct Speech<'a> {
    client: &'a GcpClient,
    v1: String,
    v2: String,
}

impl<'a> Speech<'a> {
    pub(crate) fn new(client: &'a GcpClient, location: Option<&str>) -> Self {
        let v2_host = match location {
            Some(location) if location != "global" => format!("{}-{}", location, HOST),
            _ => HOST.to_string(),
        };
        Self {
            v1: format!("{}/v1", client.base_url(HOST)),
            v2: format!("{}/v2", client.base_url(&v2_host)),
            client,
        }
    }

    fn v2_url(&self, name: &str) -> String {
        format!("{}/{}", self.v2, name)
    }

    async fn finish_v2<T: DeserializeOwned>(&self, operation: Operation) -> Result<T> {
        self.client
            .wait_operation_as(operation, |name| self.v2_url(name))
            .await
    }

    /// Synchronous recognition of up to one minute of audio.
    pub async fn recognize(
        &self,
        config: &RecognitionConfig,
        audio: &RecognitionAudio,
    ) -> Result<RecognizeResponse> {
        let url = format!("{}/speech:recognize", self.v1);
        let body = json!({ "config": config, "audio": audio });
        self.client.post(&url, &[], &body).await
    }

    /// Asynchronous recognition; waits for the operation.
    pub async fn long_running_recognize(
        &self,
        config: &RecognitionConfig,
        audio: &RecognitionAudio,
    ) -> Result<RecognizeResponse> {
        let url = format!("{}/speech:longrunningrecognize", self.v1);
        let body = json!({ "config": config, "audio": audio });
        let operation: Operation = self.client.post(&url, &[], &body).await?;
        self.client
            .wait_operation_as(operation, |name| format!("{}/operations/{}", self.v1, name))
            .await
    }

    pub async fn create_recognizer(
        &self,
        parent: &str,
        recognizer_id: &str,
        recognizer: &Recognizer,
    ) -> Result<Recognizer> {
        let url = format!("{}/recognizers", self.v2_url(parent));
        let operation: Operation = self
            .client
            .post(&url, &[("recognizerId", recognizer_id.to_string())], recognizer)
            .await?;
        self.finish_v2(operation).await
    }

    pub async fn get_recognizer(&self, name: &str) -> Result<Recognizer> {
        self.client.get(&self.v2_url(name), &[]).await
    }

    pub async fn list_recognizers(&self, parent: &str) -> Result<Vec<Recognizer>> {
        let url = format!("{}/recognizers", self.v2_url(parent));
        self.client.list_all::<ListRecognizersResponse>(&url, &[]).await
    }

    /// Deletion resolves to the deleted recognizer.
    pub async fn delete_recognizer(&self, name: &str) -> Result<Recognizer> {
        let operation: Operation = self.client.delete(&self.v2_url(name), &[]).await?;
        self.finish_v2(operation).await
    }

    /// v2 recognition with a recognizer; `_` is the implicit default one.
    pub async fn recognize_v2(
        &self,
        recognizer: &str,
        config: &RecognitionConfigV2,
        audio: &[u8],
    ) -> Result<RecognizeResponse> {
        let url = format!("{}:recognize", self.v2_url(recognizer));
        let body = json!({ "config": config, "content": STANDARD.encode(audio) });
        self.client.post(&url, &[], &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_variants() {
        assert_eq!(
            serde_json::to_value(RecognitionAudio::bytes(b"abc")).unwrap(),
            json!({"content": "YWJj"})
        );
        assert_eq!(
            serde_json::to_value(RecognitionAudio::uri("gs://b/a.wav")).unwrap(),
            json!({"uri": "gs://b/a.wav"})
        );
    }

    #[test]
    fn test_transcripts_take_first_alternative() {
        let resp: RecognizeResponse = serde_json::from_value(json!({
            "results": [
                {"alternatives": [{"transcript": "how old is", "confidence": 0.98}, {"transcript": "how cold is"}]},
                {"alternatives": []},
                {"alternatives": [{"transcript": "the brooklyn bridge"}]}
            ]
        }))
        .unwrap();
        let texts: Vec<&str> = resp.transcripts().map(|a| a.transcript.as_str()).collect();
        assert_eq!(texts, vec!["how old is", "the brooklyn bridge"]);
    }

    #[test]
    fn test_v2_host_follows_location() {
        let client = GcpClient::new(
            std::sync::Arc::new(crate::StaticToken::new("t")),
            crate::ClientConfig::default(),
        )
        .unwrap();

        let regional = client.speech(Some("us-central1"));
        assert_eq!(regional.v2, "https://us-central1-speech.googleapis.com/v2");
        assert_eq!(regional.v1, "https://speech.googleapis.com/v1");
        assert_eq!(client.speech(Some("global")).v2, "https://speech.googleapis.com/v2");
        assert_eq!(client.speech(None).v2, "https://speech.googleapis.com/v2");
    }
}
