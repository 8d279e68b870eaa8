// src/web/handlers/search_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::str::FromStr;
use std::time::Instant;
use tracing::error;

use super::scrape_handlers::elapsed_ms;
use crate::app::AppContext;
use crate::web::types::{SearchErrorResponse, SearchMetadata, SearchPayload, SearchResponse};
use crate::web_search::SearchEngine;

pub type SearchResult = Result<Json<SearchResponse>, (Status, Json<SearchErrorResponse>)>;

pub async fn search_handler(payload: SearchPayload, ctx: &State<AppContext>) -> SearchResult {
    let started = Instant::now();

    let query = payload.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err((
            Status::BadRequest,
            Json(SearchErrorResponse {
                error: "Missing query parameter".to_string(),
                response_time_ms: None,
            }),
        ));
    }

    // unrecognised engine names fall back to the default chain
    let engine = payload
        .engine
        .as_deref()
        .and_then(|name| SearchEngine::from_str(name).ok())
        .unwrap_or_default();

    match ctx.search.search(query, engine).await {
        Ok(outcome) => Ok(Json(SearchResponse {
            search_metadata: SearchMetadata {
                query: query.to_string(),
                engine: outcome.engine.to_string(),
                total_results: format!("About {} results", outcome.results.len()),
                response_time_ms: elapsed_ms(started),
                cached: outcome.cached,
            },
            organic_results: outcome.results.to_vec(),
        })),
        Err(e) => {
            error!("Search for '{}' failed: {:#}", query, e);
            Err((
                Status::InternalServerError,
                Json(SearchErrorResponse {
                    error: format!("{:#}", e),
                    response_time_ms: Some(elapsed_ms(started)),
                }),
            ))
        }
    }
}
