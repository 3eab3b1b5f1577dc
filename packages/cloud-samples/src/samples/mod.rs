//! One module per service; each exposes its clap arguments, a `run`
//! dispatcher and the individual samples.

pub mod bigquery_connection;
pub mod data_transfer;
pub mod dataplex;
pub mod dlp;
pub mod eventarc;
pub mod monitoring;
pub mod secret_manager;
pub mod speech;
pub mod storage_control;
