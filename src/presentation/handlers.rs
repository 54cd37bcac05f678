// HTTP request handlers
use crate::application::chart_service::CHART_LOAD_FAILED;
use crate::domain::chart::ChartRange;
use crate::domain::overview::OverviewItem;
use crate::domain::sensor::SensorKind;
use crate::domain::session::Access;
use crate::domain::tile::{TileDescriptor, TileKind};
use crate::presentation::app_state::AppState;
use crate::presentation::views;
use axum::{
    Form, Json,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub source: String,
    pub target: String,
}

#[derive(Serialize)]
pub struct OverviewResponse {
    pub items: Vec<OverviewItem>,
    pub last_update: String,
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn tile_not_found(id: &str) -> Response {
    error_json(StatusCode::NOT_FOUND, &format!("no tile with id {}", id))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Gate for the tile and data API
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match state.session.snapshot().access() {
        Access::Granted(_) => next.run(request).await,
        Access::Pending => error_json(StatusCode::SERVICE_UNAVAILABLE, "session is still loading"),
        Access::Denied => error_json(StatusCode::UNAUTHORIZED, "sign in required"),
    }
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    let identity = state.session.snapshot();
    match identity.access() {
        Access::Pending => Html(views::loading_page()).into_response(),
        Access::Denied => Redirect::to("/login").into_response(),
        Access::Granted(user) => {
            let layout = state.layout.lock().await;
            Html(views::dashboard_page(user, layout.tiles())).into_response()
        }
    }
}

pub async fn login_page() -> Html<String> {
    Html(views::login_page("", None, None))
}

pub async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    match state.auth_service.sign_in(&form.email, &form.password).await {
        Ok(user) => {
            state.session.set_user(Some(user));
            Redirect::to("/").into_response()
        }
        Err(failure) => Html(views::login_page(&form.email, Some(&failure.to_string()), None)).into_response(),
    }
}

pub async fn reset_password(State(state): State<Arc<AppState>>, Form(form): Form<ResetForm>) -> Html<String> {
    match state.auth_service.send_password_reset(&form.email).await {
        Ok(notice) => Html(views::login_page(&form.email, None, Some(notice))),
        Err(failure) => Html(views::login_page(&form.email, Some(&failure.to_string()), None)),
    }
}

pub async fn register_page() -> Html<String> {
    Html(views::register_page("", None))
}

pub async fn register(State(state): State<Arc<AppState>>, Form(form): Form<RegisterForm>) -> Response {
    match state
        .auth_service
        .register(&form.email, &form.password, &form.confirm_password)
        .await
    {
        Ok(user) => {
            state.session.set_user(Some(user));
            Redirect::to("/").into_response()
        }
        Err(failure) => Html(views::register_page(&form.email, Some(&failure.to_string()))).into_response(),
    }
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Redirect {
    if let Some(user) = state.session.current_user() {
        tracing::info!("Signing out {}", user.email);
    }
    state.auth_service.sign_out().await;
    state.session.set_user(None);
    Redirect::to("/login")
}

pub async fn list_tiles(State(state): State<Arc<AppState>>) -> Json<Vec<TileDescriptor>> {
    Json(state.layout.lock().await.tiles().to_vec())
}

pub async fn add_tile(State(state): State<Arc<AppState>>) -> (StatusCode, Json<TileDescriptor>) {
    let tile = state.layout.lock().await.add();
    (StatusCode::CREATED, Json(tile))
}

pub async fn remove_tile(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let removed = state.layout.lock().await.remove(&id);
    state.chart_service.forget(&id);
    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        tile_not_found(&id)
    }
}

pub async fn reorder_tiles(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReorderRequest>,
) -> Json<Vec<TileDescriptor>> {
    let mut layout = state.layout.lock().await;
    layout.reorder(&request.source, &request.target);
    Json(layout.tiles().to_vec())
}

pub async fn update_tile_settings(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<Map<String, Value>>,
) -> Response {
    let mut layout = state.layout.lock().await;
    layout.update_settings(&id, patch);
    match layout.get(&id) {
        Some(tile) => Json(tile.clone()).into_response(),
        None => tile_not_found(&id),
    }
}

pub async fn set_tile_kind(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(kind): Json<TileKind>,
) -> Response {
    let tile = {
        let mut layout = state.layout.lock().await;
        layout.set_kind(&id, kind);
        layout.get(&id).cloned()
    };
    state.chart_service.forget(&id);
    match tile {
        Some(tile) => Json(tile).into_response(),
        None => tile_not_found(&id),
    }
}

/// Body of one tile. `range` overrides a chart tile's saved range for this
/// render only; saving a range goes through the settings endpoint.
pub async fn tile_content(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(tile) = state.layout.lock().await.get(&id).cloned() else {
        return tile_not_found(&id);
    };

    match tile.kind {
        TileKind::Empty => Html(views::empty_tile_content()).into_response(),
        TileKind::Overview => {
            let overview = state.sensor_service.fetch_overview().await.ok();
            Html(views::overview_content(overview.as_ref())).into_response()
        }
        TileKind::Chart { sensor } => {
            let range = match query.range.as_deref() {
                Some(requested) => ChartRange::parse_or_default(Some(requested)),
                None => tile.chart_range(),
            };
            let chart = state.chart_service.refresh(&tile.id, sensor, range).await;
            Html(views::chart_content(sensor, &chart)).into_response()
        }
    }
}

pub async fn overview(State(state): State<Arc<AppState>>) -> Response {
    match state.sensor_service.fetch_overview().await {
        Ok(overview) => Json(OverviewResponse {
            items: overview.items(),
            last_update: overview.latest_update_display(),
        })
        .into_response(),
        Err(_) => error_json(StatusCode::BAD_GATEWAY, views::OVERVIEW_LOAD_FAILED),
    }
}

pub async fn chart_series(
    Path(sensor): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Ok(kind) = sensor.parse::<SensorKind>() else {
        return error_json(StatusCode::NOT_FOUND, &format!("unknown sensor {}", sensor));
    };
    let range = ChartRange::parse_or_default(query.range.as_deref());
    match state.chart_service.load(kind, range).await {
        Ok(points) => Json(json!({ "sensor": kind, "range": range, "points": points })).into_response(),
        Err(e) => {
            tracing::warn!("Chart series {} ({}) failed: {}", kind, range, e);
            error_json(StatusCode::BAD_GATEWAY, CHART_LOAD_FAILED)
        }
    }
}
