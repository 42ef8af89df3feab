use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api_errors::AppError,
    app_state::{AppState, DashboardKind, Readiness},
    dashboard::FlightQuery,
    dataset::TableSlice,
    pages::{Page, PageLink, PageView},
    prediction::PredictionResponse,
    price::PriceInput,
    trends::{PriceTrends, SatisfactionTrends},
};

type ApiResult<T> = Result<Json<T>, AppError>;

/// Build the HTTP router over the loaded dashboards.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // navigation
        .route("/api/pages", get(list_pages))
        .route("/api/pages/{page}", get(show_page))
        // flight price
        .route("/api/price/predict", post(predict_price))
        .route("/api/price/trends", get(price_trends))
        .route("/api/price/flights", get(price_flights))
        // passenger satisfaction
        .route("/api/satisfaction/predict", post(predict_satisfaction))
        .route("/api/satisfaction/trends", get(satisfaction_trends))
        // model introspection
        .route("/api/models/{dashboard}/schema", get(model_schema))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readyz(State(st): State<Arc<AppState>>) -> (StatusCode, Json<Readiness>) {
    let readiness = st.readiness();
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

async fn list_pages() -> Json<Vec<PageLink>> {
    Json(Page::ALL.iter().map(PageLink::from).collect())
}

async fn show_page(
    State(st): State<Arc<AppState>>,
    Path(page): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let page: Page = page.parse()?;
    let view: PageView<'_> = page.render(&st)?;
    let body = serde_json::to_value(&view).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(body))
}

async fn predict_price(
    State(st): State<Arc<AppState>>,
    body: Result<Json<PriceInput>, JsonRejection>,
) -> ApiResult<PredictionResponse> {
    let Json(input) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(st.price()?.predict(input)?))
}

async fn price_trends(State(st): State<Arc<AppState>>) -> ApiResult<PriceTrends> {
    Ok(Json(st.price()?.trends().clone()))
}

async fn price_flights(
    State(st): State<Arc<AppState>>,
    query: Result<Query<FlightQuery>, QueryRejection>,
) -> ApiResult<TableSlice> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(st.price()?.flights(&query)?))
}

async fn predict_satisfaction(
    State(st): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<PredictionResponse> {
    let Json(body) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(st.satisfaction()?.predict(body)?))
}

async fn satisfaction_trends(State(st): State<Arc<AppState>>) -> ApiResult<SatisfactionTrends> {
    Ok(Json(st.satisfaction()?.trends().clone()))
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    dashboard: String,
    model_id: String,
    columns: Vec<String>,
}

async fn model_schema(
    State(st): State<Arc<AppState>>,
    Path(dashboard): Path<String>,
) -> ApiResult<SchemaResponse> {
    let kind: DashboardKind = dashboard.parse()?;
    let model_id = match kind {
        DashboardKind::Price => st.price()?.model_id().to_string(),
        DashboardKind::Satisfaction => st.satisfaction()?.model_id().to_string(),
    };
    Ok(Json(SchemaResponse {
        dashboard: kind.to_string(),
        model_id,
        columns: st.schema(kind)?.columns().to_vec(),
    }))
}
