//! HTTP routes
//!
//! Public lookups and admin writes are separate routers so the admin
//! surface can be left unmounted.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use breachcheck_core::{
    BreachId, BreachRecord, BreachSearchResult, MembershipId, MembershipRecord, NewBreach,
    NewMembership, NewPasswordPrefix, PasswordPrefixEntry, PrefixRange, SeedOutcome,
    SnapshotStats,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::service::QueryService;
use crate::state::SharedState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(flatten)]
    pub stats: SnapshotStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub message: String,
    pub seeded: bool,
    /// Breaches inserted by this call
    pub breaches: usize,
}

/// Lookups, catalog reads and health
pub fn create_public_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/breach/email/:hash", get(email_lookup))
        .route("/api/breach/phone/:hash", get(phone_lookup))
        .route("/api/breach/password/:prefix", get(password_prefix_lookup))
        .route("/api/breaches", get(list_breaches))
        .route("/api/breaches/:id", get(get_breach))
        .with_state(state)
}

/// Inserts and demo-data initialization
pub fn create_admin_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/breach", post(add_breach))
        .route("/api/compromised-data", post(add_membership))
        .route("/api/compromised-data/:id", get(get_membership))
        .route("/api/password-prefix", post(add_password_prefix))
        .route("/api/initialize-demo", post(initialize_demo))
        .with_state(state)
}

/// Public and admin routes together
pub fn create_router(state: SharedState) -> Router {
    create_public_router(state.clone()).merge(create_admin_router(state))
}

/// `router` plus `/metrics` rendered from `handle`
pub fn create_router_with_metrics(router: Router, handle: PrometheusHandle) -> Router {
    router.route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}

/// Run a store write on the blocking pool; a file-backed store fsyncs.
async fn run_write<T, F>(state: SharedState, write: F) -> Result<T>
where
    F: FnOnce(&QueryService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || write(&state.service))
        .await
        .map_err(|e| ServerError::Internal(format!("write task failed: {e}")))?
}

async fn health(State(state): State<SharedState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        stats: state.service.stats()?,
    }))
}

async fn email_lookup(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> Result<Json<BreachSearchResult>> {
    Ok(Json(state.service.query_email(&hash)?))
}

async fn phone_lookup(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> Result<Json<BreachSearchResult>> {
    Ok(Json(state.service.query_phone(&hash)?))
}

async fn password_prefix_lookup(
    State(state): State<SharedState>,
    Path(prefix): Path<String>,
) -> Result<Json<PrefixRange>> {
    Ok(Json(state.service.query_password_prefix(&prefix)?))
}

async fn list_breaches(State(state): State<SharedState>) -> Result<Json<Vec<BreachRecord>>> {
    Ok(Json(state.service.breaches()?))
}

async fn get_breach(
    State(state): State<SharedState>,
    id: std::result::Result<Path<BreachId>, PathRejection>,
) -> Result<Json<BreachRecord>> {
    let Path(id) = id.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    Ok(Json(state.service.breach(id)?))
}

async fn get_membership(
    State(state): State<SharedState>,
    id: std::result::Result<Path<MembershipId>, PathRejection>,
) -> Result<Json<MembershipRecord>> {
    let Path(id) = id.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    Ok(Json(state.service.membership(id)?))
}

async fn add_breach(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<NewBreach>, JsonRejection>,
) -> Result<(StatusCode, Json<BreachRecord>)> {
    let Json(new) = payload?;
    let record = run_write(state, move |service| service.add_breach(new)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn add_membership(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<NewMembership>, JsonRejection>,
) -> Result<(StatusCode, Json<MembershipRecord>)> {
    let Json(new) = payload?;
    let record = run_write(state, move |service| service.add_membership(new)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn add_password_prefix(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<NewPasswordPrefix>, JsonRejection>,
) -> Result<(StatusCode, Json<PasswordPrefixEntry>)> {
    let Json(new) = payload?;
    let entry = run_write(state, move |service| service.add_password_prefix(new)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn initialize_demo(State(state): State<SharedState>) -> Result<Json<InitializeResponse>> {
    let outcome = run_write(state, |service| service.initialize_demo_data()).await?;
    let response = match outcome {
        SeedOutcome::Seeded { breaches } => InitializeResponse {
            message: "Demo data initialized successfully".to_string(),
            seeded: true,
            breaches,
        },
        SeedOutcome::AlreadySeeded => InitializeResponse {
            message: "Demo data already initialized".to_string(),
            seeded: false,
            breaches: 0,
        },
    };
    Ok(Json(response))
}
