// src/web/handlers/scrape_handlers.rs
use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::State;
use std::time::Instant;
use tracing::{error, info};

use crate::app::AppContext;
use crate::web::types::{ApiErrorResponse, ScrapeJobsPayload, ScrapeJobsResponse};

pub type ScrapeResult = Result<Json<ScrapeJobsResponse>, (Status, Json<ApiErrorResponse>)>;

pub async fn scrape_jobs_handler(
    payload: Result<Json<ScrapeJobsPayload>, json::Error<'_>>,
    ctx: &State<AppContext>,
) -> ScrapeResult {
    let started = Instant::now();
    let fail = |message: String| {
        error!("Scrape request failed: {}", message);
        (
            Status::InternalServerError,
            Json(ApiErrorResponse::new(message, Some(elapsed_ms(started)))),
        )
    };

    let payload = payload.map_err(|e| fail(format!("Invalid request body: {}", e)))?;
    let request = payload.into_inner().into_request().map_err(fail)?;

    info!(
        "Scrape request: query='{}' platforms={:?} limit={} offset={} session={:?}",
        request.query, request.platforms, request.limit, request.offset, request.session_id
    );

    let report = ctx
        .scrape
        .scrape(request)
        .await
        .map_err(|e| fail(format!("{:#}", e)))?;

    Ok(Json(ScrapeJobsResponse::from_report(report, elapsed_ms(started))))
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
