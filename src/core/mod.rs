pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod sleuth;
