pub mod download;
pub mod models;
pub mod stats_client_fl;
