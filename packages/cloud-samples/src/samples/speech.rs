//! Speech-to-Text samples: v1 recognition and v2 recognizers.

use crate::output::handled;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gcp_client::services::speech::{
    RecognitionAudio, RecognitionConfig, RecognitionConfigV2, RecognizeResponse, Recognizer,
};
use gcp_client::{GcpClient, ResourceName};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SpeechArgs {
    /// Required by the v2 (recognizer) samples
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: Option<String>,

    /// v2 location; anything but `global` uses the regional endpoint
    #[arg(long, default_value = "global")]
    pub location: String,

    #[command(subcommand)]
    pub command: SpeechCommand,
}

/// Options shared by the v1 recognition samples.
#[derive(Args, Debug, Clone)]
pub struct RecognitionArgs {
    #[arg(long, default_value = "en-US")]
    pub language_code: String,
    /// e.g. LINEAR16 or FLAC; detected from the file header when omitted
    #[arg(long)]
    pub encoding: Option<String>,
    #[arg(long)]
    pub sample_rate: Option<u32>,
}

impl RecognitionArgs {
    fn config(&self) -> RecognitionConfig {
        RecognitionConfig {
            encoding: self.encoding.clone(),
            sample_rate_hertz: self.sample_rate,
            language_code: self.language_code.clone(),
            enable_automatic_punctuation: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SpeechCommand {
    /// Transcribe a local audio file of up to one minute
    TranscribeFile {
        #[arg(long)]
        path: PathBuf,
        #[command(flatten)]
        recognition: RecognitionArgs,
    },
    /// Transcribe a short audio file in Cloud Storage
    TranscribeGcs {
        #[arg(long)]
        uri: String,
        #[command(flatten)]
        recognition: RecognitionArgs,
    },
    /// Transcribe a long audio file in Cloud Storage, waiting for the operation
    TranscribeAsyncGcs {
        #[arg(long)]
        uri: String,
        #[command(flatten)]
        recognition: RecognitionArgs,
    },
    CreateRecognizer {
        #[arg(long)]
        recognizer_id: String,
        #[arg(long, default_value = "long")]
        model: String,
        #[arg(long = "language-code", default_value = "en-US")]
        language_codes: Vec<String>,
    },
    GetRecognizer {
        #[arg(long)]
        recognizer_id: String,
    },
    ListRecognizers,
    DeleteRecognizer {
        #[arg(long)]
        recognizer_id: String,
    },
    /// Transcribe a local file with a v2 recognizer and auto-detected decoding
    TranscribeFileV2 {
        #[arg(long)]
        path: PathBuf,
        /// `_` uses the implicit recognizer
        #[arg(long, default_value = "_")]
        recognizer: String,
        #[arg(long, default_value = "long")]
        model: String,
        #[arg(long = "language-code", default_value = "en-US")]
        language_codes: Vec<String>,
    },
}

pub async fn run(client: &GcpClient, out: &mut dyn Write, args: SpeechArgs) -> Result<()> {
    let SpeechArgs {
        project_id,
        location,
        command,
    } = args;
    let v2_parent = || -> Result<ResourceName> {
        let project_id = project_id
            .as_deref()
            .context("--project-id (or GOOGLE_CLOUD_PROJECT) is required for v2 samples")?;
        Ok(ResourceName::project(project_id)?.location(&location)?)
    };

    match command {
        SpeechCommand::TranscribeFile { path, recognition } => {
            transcribe_file(client, out, &path, &recognition.config()).await
        }
        SpeechCommand::TranscribeGcs { uri, recognition } => {
            transcribe_gcs(client, out, &uri, &recognition.config()).await
        }
        SpeechCommand::TranscribeAsyncGcs { uri, recognition } => {
            transcribe_async_gcs(client, out, &uri, &recognition.config()).await
        }
        SpeechCommand::CreateRecognizer {
            recognizer_id,
            model,
            language_codes,
        } => {
            let config = RecognitionConfigV2::auto(Some(model.as_str()), &language_codes);
            let recognizer = Recognizer {
                default_recognition_config: Some(config),
                ..Default::default()
            };
            create_recognizer(client, out, &v2_parent()?, &recognizer_id, &recognizer).await
        }
        SpeechCommand::GetRecognizer { recognizer_id } => {
            get_recognizer(client, out, &v2_parent()?, &recognizer_id).await
        }
        SpeechCommand::ListRecognizers => list_recognizers(client, out, &v2_parent()?).await,
        SpeechCommand::DeleteRecognizer { recognizer_id } => {
            delete_recognizer(client, out, &v2_parent()?, &recognizer_id).await
        }
        SpeechCommand::TranscribeFileV2 {
            path,
            recognizer,
            model,
            language_codes,
        } => {
            let config = RecognitionConfigV2::auto(Some(model.as_str()), &language_codes);
            transcribe_file_v2(client, out, &v2_parent()?, &recognizer, &path, &config).await
        }
    }
}

fn print_transcripts(out: &mut dyn Write, response: &RecognizeResponse) -> Result<()> {
    let mut any = false;
    for alternative in response.transcripts() {
        any = true;
        writeln!(out, "Transcript: {}", alternative.transcript)?;
        if let Some(confidence) = alternative.confidence {
            writeln!(out, "Confidence: {:.2}", confidence)?;
        }
    }
    if !any {
        writeln!(out, "No speech recognized.")?;
    }
    Ok(())
}

fn read_audio(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read audio file {}", path.display()))
}

// =============================================================================
// v1
// =============================================================================

pub async fn transcribe_file(
    client: &GcpClient,
    out: &mut dyn Write,
    path: &Path,
    config: &RecognitionConfig,
) -> Result<()> {
    let audio = RecognitionAudio::bytes(&read_audio(path)?);
    let response = client.speech(None).recognize(config, &audio).await?;
    print_transcripts(out, &response)
}

pub async fn transcribe_gcs(
    client: &GcpClient,
    out: &mut dyn Write,
    uri: &str,
    config: &RecognitionConfig,
) -> Result<()> {
    let result = client
        .speech(None)
        .recognize(config, &RecognitionAudio::uri(uri))
        .await;
    let Some(response) = handled(out, result, "Audio", uri)? else {
        return Ok(());
    };
    print_transcripts(out, &response)
}

pub async fn transcribe_async_gcs(
    client: &GcpClient,
    out: &mut dyn Write,
    uri: &str,
    config: &RecognitionConfig,
) -> Result<()> {
    writeln!(out, "Waiting for operation to complete...")?;
    let result = client
        .speech(None)
        .long_running_recognize(config, &RecognitionAudio::uri(uri))
        .await;
    let Some(response) = handled(out, result, "Audio", uri)? else {
        return Ok(());
    };
    print_transcripts(out, &response)
}

// =============================================================================
// v2 recognizers
// =============================================================================

fn recognizer_name(parent: &ResourceName, recognizer_id: &str) -> Result<String> {
    Ok(parent.clone().child("recognizers", recognizer_id)?.to_string())
}

pub async fn create_recognizer(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    recognizer_id: &str,
    recognizer: &Recognizer,
) -> Result<()> {
    let location = parent.id();
    let result = client
        .speech(Some(location))
        .create_recognizer(&parent.to_string(), recognizer_id, recognizer)
        .await;
    let Some(created) = handled(out, result, "Recognizer", recognizer_id)? else {
        return Ok(());
    };
    writeln!(out, "Created recognizer: {}", created.name)?;
    Ok(())
}

pub async fn get_recognizer(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    recognizer_id: &str,
) -> Result<()> {
    let name = recognizer_name(parent, recognizer_id)?;
    let result = client.speech(Some(parent.id())).get_recognizer(&name).await;
    let Some(recognizer) = handled(out, result, "Recognizer", recognizer_id)? else {
        return Ok(());
    };
    writeln!(out, "Recognizer: {}", recognizer.name)?;
    if let Some(state) = &recognizer.state {
        writeln!(out, "  State: {}", state)?;
    }
    if let Some(config) = &recognizer.default_recognition_config {
        writeln!(out, "  Model: {}", config.model.as_deref().unwrap_or_default())?;
        writeln!(out, "  Languages: {}", config.language_codes.join(", "))?;
    }
    Ok(())
}

pub async fn list_recognizers(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
) -> Result<()> {
    let result = client
        .speech(Some(parent.id()))
        .list_recognizers(&parent.to_string())
        .await;
    let Some(recognizers) = handled(out, result, "Location", &parent.to_string())? else {
        return Ok(());
    };
    for recognizer in &recognizers {
        writeln!(out, "Recognizer: {}", recognizer.name)?;
    }
    if recognizers.is_empty() {
        writeln!(out, "No recognizers found.")?;
    }
    Ok(())
}

pub async fn delete_recognizer(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    recognizer_id: &str,
) -> Result<()> {
    let name = recognizer_name(parent, recognizer_id)?;
    let result = client.speech(Some(parent.id())).delete_recognizer(&name).await;
    if handled(out, result, "Recognizer", recognizer_id)?.is_some() {
        writeln!(out, "Deleted recognizer: {}", name)?;
    }
    Ok(())
}

pub async fn transcribe_file_v2(
    client: &GcpClient,
    out: &mut dyn Write,
    parent: &ResourceName,
    recognizer_id: &str,
    path: &Path,
    config: &RecognitionConfigV2,
) -> Result<()> {
    let audio = read_audio(path)?;
    let name = recognizer_name(parent, recognizer_id)?;
    let result = client
        .speech(Some(parent.id()))
        .recognize_v2(&name, config, &audio)
        .await;
    let Some(response) = handled(out, result, "Recognizer", recognizer_id)? else {
        return Ok(());
    };
    print_transcripts(out, &response)
}
