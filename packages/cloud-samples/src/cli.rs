//! Command-line surface of the `cloud-samples` binary.

use crate::samples::bigquery_connection::BigQueryConnectionArgs;
use crate::samples::data_transfer::DataTransferArgs;
use crate::samples::dataplex::DataplexArgs;
use crate::samples::dlp::DlpArgs;
use crate::samples::eventarc::EventarcArgs;
use crate::samples::monitoring::MonitoringArgs;
use crate::samples::secret_manager::SecretManagerArgs;
use crate::samples::speech::SpeechArgs;
use crate::samples::storage_control::StorageControlArgs;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cloud-samples")]
#[command(about = "Runnable samples for Google Cloud APIs", version)]
pub struct Cli {
    /// OAuth2 access token; Application Default Credentials are used when absent
    #[arg(long, global = true, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub service: Service,
}

#[derive(Subcommand, Debug)]
pub enum Service {
    /// Secrets and secret versions
    SecretManager(SecretManagerArgs),
    /// BigQuery connections
    BigqueryConnection(BigQueryConnectionArgs),
    /// BigQuery Data Transfer configs and runs
    DataTransfer(DataTransferArgs),
    /// Sensitive Data Protection
    Dlp(DlpArgs),
    /// Dataplex lakes and catalog
    Dataplex(DataplexArgs),
    /// Eventarc message buses and triggers
    Eventarc(EventarcArgs),
    /// Cloud Monitoring
    Monitoring(MonitoringArgs),
    /// Speech-to-Text
    Speech(SpeechArgs),
    /// Cloud Storage folders and caches
    StorageControl(StorageControlArgs),
}
