//! Rate storage trait and the in-memory implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use crate::error::{RateError, RateResult};
use crate::model::Rate;

/// The capability set any rate store must provide.
///
/// Implementations may back this with anything from a process-local map
/// to an external database; the cache service only sees this trait.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Get the stored record for `day`, or [`RateError::NotFound`].
    async fn get(&self, day: NaiveDate) -> RateResult<Rate>;

    /// Insert or unconditionally overwrite the record at `rate.date`.
    ///
    /// Overwrite-idempotent: creating the same day twice leaves one
    /// record and never fails.
    async fn create(&self, rate: Rate) -> RateResult<Rate>;

    /// Replace the record at `rate.date` only if one exists, else
    /// [`RateError::NotFound`].
    async fn update(&self, rate: Rate) -> RateResult<Rate>;

    /// Remove the record for `day`, or [`RateError::NotFound`] if absent.
    async fn delete(&self, day: NaiveDate) -> RateResult<()>;
}

/// Process-lifetime in-memory store.
///
/// Owns its mapping; callers never see the raw map. Starts empty, is
/// never persisted, and entries never expire on their own.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: DashMap<NaiveDate, Rate>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn get(&self, day: NaiveDate) -> RateResult<Rate> {
        self.data
            .get(&day)
            .map(|entry| entry.clone())
            .ok_or(RateError::NotFound(day))
    }

    async fn create(&self, rate: Rate) -> RateResult<Rate> {
        debug!(day = %rate.date, "storing rate");
        self.data.insert(rate.date, rate.clone());
        Ok(rate)
    }

    async fn update(&self, rate: Rate) -> RateResult<Rate> {
        let mut entry = self
            .data
            .get_mut(&rate.date)
            .ok_or(RateError::NotFound(rate.date))?;
        *entry = rate.clone();
        Ok(rate)
    }

    async fn delete(&self, day: NaiveDate) -> RateResult<()> {
        self.data
            .remove(&day)
            .map(|_| ())
            .ok_or(RateError::NotFound(day))
    }
}
