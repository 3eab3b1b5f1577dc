//! Typed facades over individual Google Cloud APIs.
//!
//! Each facade borrows the [`GcpClient`](crate::GcpClient), knows its
//! service host and API version, and exposes one method per RPC. Methods
//! that start a long-running operation wait for it before returning.

pub mod bigquery_connection;
pub mod data_transfer;
pub mod dataplex;
pub mod dlp;
pub mod eventarc;
pub mod monitoring;
pub mod secret_manager;
pub mod speech;
pub mod storage_control;

pub use bigquery_connection::BigQueryConnection;
pub use data_transfer::DataTransfer;
pub use dataplex::Dataplex;
pub use dlp::Dlp;
pub use eventarc::Eventarc;
pub use monitoring::Monitoring;
pub use secret_manager::SecretManager;
pub use speech::Speech;
pub use storage_control::StorageControl;

use serde::Deserialize;

/// `google.protobuf.Empty`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Empty {}
