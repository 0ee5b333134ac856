use axum::{
    routing::get,
    Router,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::api::models::{ScrapeQuery, ScrapeRequestBody, ServiceInfo};
use crate::content::ScrapedContent;
use crate::scrape::{scrape, ScrapeRequest};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/scrape", get(scrape_query_handler).post(scrape_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo::describe())
}

async fn scrape_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<ScrapeRequestBody>, JsonRejection>,
) -> Result<Json<ScrapedContent>> {
    let Json(body) = body?;
    let req = ScrapeRequest::new(
        &body.url,
        body.timeout.unwrap_or(state.config.default_timeout_secs as i64),
        body.user_agent
            .unwrap_or_else(|| state.config.default_user_agent.clone()),
    )?;

    run_scrape(&state, req).await
}

async fn scrape_query_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ScrapeQuery>, QueryRejection>,
) -> Result<Json<ScrapedContent>> {
    let Query(query) = query?;
    let req = ScrapeRequest::new(
        &query.url,
        query.timeout.unwrap_or(state.config.default_timeout_secs as i64),
        state.config.default_user_agent.clone(),
    )?;

    run_scrape(&state, req).await
}

async fn run_scrape(state: &AppState, req: ScrapeRequest) -> Result<Json<ScrapedContent>> {
    tracing::info!(url = %req.url(), "processing scrape request");
    let start_time = std::time::Instant::now();

    let content = scrape(&state.fetcher, &req).await?;

    tracing::info!(
        url = %req.url(),
        status_code = content.status_code,
        elapsed = ?start_time.elapsed(),
        "scrape finished"
    );
    Ok(Json(content))
}
