//! RateVault Server
//!
//! Thin HTTP transport over the core rate cache: request binding, JSON
//! serialization, and status-code mapping. All rate logic lives in
//! `ratevault-core`.

pub mod config;
pub mod routes;

pub use config::ServerConfig;
