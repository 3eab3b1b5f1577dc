//! Runnable samples for Google Cloud APIs.
//!
//! Every sample builds a resource name, makes one call through
//! [`gcp_client`] and writes a human-readable result. NotFound,
//! AlreadyExists and PermissionDenied are reported as messages; any other
//! failure is returned.

pub mod cli;
pub mod config;
pub mod output;
pub mod samples;

use anyhow::Result;
use cli::Service;
use gcp_client::GcpClient;
use std::io::Write;

/// Run the sample selected on the command line, writing its output to `out`.
pub async fn run(service: Service, client: &GcpClient, out: &mut dyn Write) -> Result<()> {
    match service {
        Service::SecretManager(args) => samples::secret_manager::run(client, out, args).await,
        Service::BigqueryConnection(args) => samples::bigquery_connection::run(client, out, args).await,
        Service::DataTransfer(args) => samples::data_transfer::run(client, out, args).await,
        Service::Dlp(args) => samples::dlp::run(client, out, args).await,
        Service::Dataplex(args) => samples::dataplex::run(client, out, args).await,
        Service::Eventarc(args) => samples::eventarc::run(client, out, args).await,
        Service::Monitoring(args) => samples::monitoring::run(client, out, args).await,
        Service::Speech(args) => samples::speech::run(client, out, args).await,
        Service::StorageControl(args) => samples::storage_control::run(client, out, args).await,
    }
}
