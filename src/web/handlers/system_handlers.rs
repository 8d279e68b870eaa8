// src/web/handlers/system_handlers.rs
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::job_aggregation::Platform;
use crate::web::types::{HealthResponse, PlatformInfo, PlatformsResponse};

pub async fn platforms_handler(ctx: &State<AppContext>) -> Json<PlatformsResponse> {
    let defaults = Platform::default_selection();
    let platforms = Platform::ALL
        .into_iter()
        .map(|platform| PlatformInfo {
            id: platform.id(),
            name: platform.display_name(),
            stub: platform.is_stub(),
            default_selected: defaults.contains(&platform),
            roster_size: ctx.roster.tenants(platform).len(),
        })
        .collect();

    Json(PlatformsResponse {
        success: true,
        roster_version: ctx.roster.version(),
        platforms,
    })
}

pub async fn health_handler(ctx: &State<AppContext>) -> Json<HealthResponse> {
    let database = match ctx.scrape.store().health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: store unavailable: {:#}", e);
            false
        }
    };
    info!("Health check (database: {})", database);

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        timestamp: Utc::now().to_rfc3339(),
    })
}
