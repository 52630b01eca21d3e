//! RateVault Core
//!
//! Daily exchange-rate records backed by an in-memory store acting as a
//! cache in front of a remote rate source.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ratevault_core::{MemoryStore, HttpRateSource, HttpSourceConfig, RateCacheService};
//!
//! let store = Arc::new(MemoryStore::new());
//! let source = Arc::new(HttpRateSource::new(HttpSourceConfig::default())?);
//! let service = RateCacheService::new(store, source);
//!
//! let rate = service.ensure_day("2024-01-01".parse()?).await?;
//! let week = service.find_range("2024-01-01", "2024-01-08").await?;
//! ```

pub mod error;
pub mod model;
pub mod service;
pub mod source;
pub mod store;

pub use error::{RateError, RateResult};
pub use model::{Rate, RateTable};
pub use service::{parse_day, RateCacheService};
pub use source::{HttpRateSource, HttpSourceConfig, RateSource};
pub use store::{MemoryStore, RateStore};

#[cfg(any(test, feature = "test-utils"))]
pub use source::MockRateSource;
