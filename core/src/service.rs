//! Cache-aside orchestration over a rate store and a rate source.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::{RateError, RateResult};
use crate::model::Rate;
use crate::source::RateSource;
use crate::store::RateStore;

/// Parse a day string in the ISO `%Y-%m-%d` form.
pub fn parse_day(input: &str) -> RateResult<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|source| RateError::InvalidDate {
        input: input.to_string(),
        source,
    })
}

/// Serves per-day rates from the store, consulting the source on a miss
/// and writing the result back.
///
/// Once a day is cached it is treated as historically fixed: the source
/// is the single retroactive authority and is only consulted on a miss.
pub struct RateCacheService {
    store: Arc<dyn RateStore>,
    source: Arc<dyn RateSource>,
    inflight: DashMap<NaiveDate, Arc<Mutex<()>>>,
}

impl RateCacheService {
    /// Create a service over the given store and source.
    pub fn new(store: Arc<dyn RateStore>, source: Arc<dyn RateSource>) -> Self {
        Self {
            store,
            source,
            inflight: DashMap::new(),
        }
    }

    /// Get the rate for `day`, fetching and caching it if absent.
    ///
    /// A stored record short-circuits the external fetch. Concurrent
    /// misses on the same day share one fetch: callers queue on a
    /// per-day gate and re-check the store once they hold it.
    #[instrument(skip(self), fields(day = %day))]
    pub async fn ensure_day(&self, day: NaiveDate) -> RateResult<Rate> {
        match self.store.get(day).await {
            Ok(rate) => {
                debug!("cache hit");
                return Ok(rate);
            }
            Err(RateError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let gate = self
            .inflight
            .entry(day)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _flight = gate.lock().await;

        // An earlier holder of the gate may have filled the entry.
        match self.store.get(day).await {
            Ok(rate) => {
                debug!("cache filled while waiting");
                self.release(day, &gate);
                return Ok(rate);
            }
            Err(RateError::NotFound(_)) => {}
            Err(e) => {
                self.release(day, &gate);
                return Err(e);
            }
        }

        debug!("cache miss, fetching from source");
        let result = match self.source.fetch(Some(day)).await {
            Ok(rate) => self.store.create(rate).await,
            Err(e) => Err(e),
        };
        self.release(day, &gate);
        result
    }

    /// Fetch the newest available rate and write it through to the
    /// store under its own day.
    #[instrument(skip(self))]
    pub async fn latest(&self) -> RateResult<Rate> {
        let rate = self.source.fetch(None).await?;
        self.store.create(rate).await
    }

    /// Ensure every day in the half-open range `[from, to)`, ascending.
    ///
    /// Both bounds are `%Y-%m-%d` strings. The result holds exactly one
    /// record per calendar day of the interval, in date order. Any
    /// single-day failure aborts the whole range: no partial sequence is
    /// returned, though days already ensured stay cached. `from >= to`
    /// yields an empty sequence.
    #[instrument(skip(self))]
    pub async fn find_range(&self, from: &str, to: &str) -> RateResult<Vec<Rate>> {
        let from = parse_day(from)?;
        let to = parse_day(to)?;

        let mut rates = Vec::new();
        let mut day = from;
        while day < to {
            rates.push(self.ensure_day(day).await?);
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }

        Ok(rates)
    }

    /// Drop the in-flight gate for `day` if it is still ours.
    fn release(&self, day: NaiveDate, gate: &Arc<Mutex<()>>) {
        self.inflight.remove_if(&day, |_, v| Arc::ptr_eq(v, gate));
    }
}
