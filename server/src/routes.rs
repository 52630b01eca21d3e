//! HTTP handlers for the rate endpoints.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ratevault_core::{parse_day, Rate, RateCacheService, RateError, RateStore};

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub service: Arc<RateCacheService>,
    pub store: Arc<dyn RateStore>,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("query must be ?day=, ?from=&to=, or empty")]
    BadQuery,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Rate(RateError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Rate(RateError::InvalidDate { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Rate(RateError::Source(_)) => StatusCode::BAD_GATEWAY,
            ApiError::BadQuery => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    day: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    day: String,
}

/// `GET /` — single day, date range, or latest.
async fn lookup(
    state: web::Data<AppState>,
    query: web::Query<LookupQuery>,
) -> Result<HttpResponse, ApiError> {
    match (&query.day, &query.from, &query.to) {
        (Some(day), None, None) => {
            let rate = state.service.ensure_day(parse_day(day)?).await?;
            Ok(HttpResponse::Ok().json(rate))
        }
        (None, Some(from), Some(to)) => {
            let rates = state.service.find_range(from, to).await?;
            debug!(len = rates.len(), "range served");
            Ok(HttpResponse::Ok().json(rates))
        }
        (None, None, None) => {
            let rate = state.service.latest().await?;
            Ok(HttpResponse::Ok().json(rate))
        }
        _ => Err(ApiError::BadQuery),
    }
}

/// `POST /` — store a rate, overwriting any record for the same day.
async fn create(
    state: web::Data<AppState>,
    rate: web::Json<Rate>,
) -> Result<HttpResponse, ApiError> {
    let created = state.store.create(rate.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// `PUT /` — replace an existing rate.
async fn update(
    state: web::Data<AppState>,
    rate: web::Json<Rate>,
) -> Result<HttpResponse, ApiError> {
    let updated = state.store.update(rate.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// `DELETE /` — remove the rate for a day.
async fn remove(
    state: web::Data<AppState>,
    query: web::Query<DayQuery>,
) -> Result<HttpResponse, ApiError> {
    state.store.delete(parse_day(&query.day)?).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount all routes on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(lookup))
            .route(web::post().to(create))
            .route(web::put().to(update))
            .route(web::delete().to(remove)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use chrono::NaiveDate;
    use ratevault_core::{MemoryStore, MockRateSource, RateTable};

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn make_rate(date: &str, usd: f64) -> Rate {
        Rate::new(
            "EUR",
            day(date),
            RateTable {
                usd,
                gbp: 0.86,
                eur: 1.0,
                czk: 24.7,
            },
        )
    }

    fn make_state(store: Arc<MemoryStore>, source: Arc<MockRateSource>) -> web::Data<AppState> {
        let service = Arc::new(RateCacheService::new(store.clone(), source));
        web::Data::new(AppState {
            service,
            store: store as Arc<dyn RateStore>,
        })
    }

    macro_rules! make_app {
        ($store:expr, $source:expr) => {
            test::init_service(
                App::new()
                    .app_data(make_state($store, $source))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_get_day_serves_cached_or_fetched() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockRateSource::new());
        source.set_rate(make_rate("2024-01-02", 1.10));
        let app = make_app!(store, source);

        let req = test::TestRequest::get()
            .uri("/?day=2024-01-02")
            .to_request();
        let rate: Rate = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rate.date, day("2024-01-02"));
        assert_eq!(rate.rates.usd, 1.10);
    }

    #[actix_web::test]
    async fn test_get_range_returns_ordered_sequence() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockRateSource::new());
        source.set_rate(make_rate("2024-01-01", 1.09));
        source.set_rate(make_rate("2024-01-02", 1.10));
        let app = make_app!(store, source);

        let req = test::TestRequest::get()
            .uri("/?from=2024-01-01&to=2024-01-03")
            .to_request();
        let rates: Vec<Rate> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].date, day("2024-01-01"));
        assert_eq!(rates[1].date, day("2024-01-02"));
    }

    #[actix_web::test]
    async fn test_get_with_half_a_range_is_bad_request() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockRateSource::new());
        let app = make_app!(store, source);

        let req = test::TestRequest::get().uri("/?from=2024-01-01").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_source_failure_is_bad_gateway() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockRateSource::new());
        let app = make_app!(store, source);

        let req = test::TestRequest::get()
            .uri("/?day=2024-01-02")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn test_crud_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockRateSource::new());
        let app = make_app!(store, source);
        let rate = make_rate("2024-01-02", 1.10);

        // Create.
        let req = test::TestRequest::post().uri("/").set_json(&rate).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        // Update.
        let changed = make_rate("2024-01-02", 1.15);
        let req = test::TestRequest::put().uri("/").set_json(&changed).to_request();
        let updated: Rate = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.rates.usd, 1.15);

        // Delete.
        let req = test::TestRequest::delete()
            .uri("/?day=2024-01-02")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        // Gone now.
        let req = test::TestRequest::delete()
            .uri("/?day=2024-01-02")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_update_missing_day_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockRateSource::new());
        let app = make_app!(store, source);

        let req = test::TestRequest::put()
            .uri("/")
            .set_json(make_rate("2024-01-02", 1.10))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
