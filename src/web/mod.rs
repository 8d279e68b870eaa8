// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::{self, Json};
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

use crate::app::AppContext;

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ));
    }
}

#[post("/scrape-jobs", data = "<payload>")]
pub async fn scrape_jobs(
    payload: Result<Json<ScrapeJobsPayload>, json::Error<'_>>,
    ctx: &State<AppContext>,
) -> handlers::ScrapeResult {
    handlers::scrape_jobs_handler(payload, ctx).await
}

#[post("/search", data = "<payload>")]
pub async fn search_post(
    payload: Result<Json<SearchPayload>, json::Error<'_>>,
    ctx: &State<AppContext>,
) -> handlers::SearchResult {
    // an unreadable body is treated like a missing query
    let payload = payload.map(Json::into_inner).unwrap_or_default();
    handlers::search_handler(payload, ctx).await
}

#[get("/search?<q>&<query>&<engine>")]
pub async fn search_get(
    q: Option<String>,
    query: Option<String>,
    engine: Option<String>,
    ctx: &State<AppContext>,
) -> handlers::SearchResult {
    let payload = SearchPayload {
        query: q.or(query),
        engine,
    };
    handlers::search_handler(payload, ctx).await
}

#[get("/platforms")]
pub async fn platforms(ctx: &State<AppContext>) -> Json<PlatformsResponse> {
    handlers::platforms_handler(ctx).await
}

#[get("/health")]
pub async fn health(ctx: &State<AppContext>) -> Json<HealthResponse> {
    handlers::health_handler(ctx).await
}

#[options("/<_..>")]
pub async fn preflight() -> Status {
    Status::Ok
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<ApiErrorResponse> {
    Json(ApiErrorResponse::new(format!("No route for {}", request.uri()), None))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ApiErrorResponse> {
    Json(ApiErrorResponse::new("Internal server error", None))
}

pub fn build_rocket(ctx: AppContext, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port));

    rocket::custom(figment)
        .attach(Cors)
        .manage(ctx)
        .register("/", catchers![not_found, internal_error])
        .mount(
            "/api",
            routes![scrape_jobs, search_post, search_get, platforms, health, preflight],
        )
}

pub async fn start_web_server(ctx: AppContext, port: u16) -> Result<()> {
    info!("Starting job aggregation API on http://0.0.0.0:{}", port);
    build_rocket(ctx, port).launch().await?;
    Ok(())
}
