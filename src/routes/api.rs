// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public competition API, mounted under `/api/v1`.

use crate::error::{AppError, Result};
use crate::models::{
    ActivityRecord, ActivitySite, ActivityUpsert, Coordinates, Municipality, Score, User,
    UserUpsert,
};
use crate::services::{NearbyQuery, NearbySite};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Upper bound on any `limit` query parameter.
const MAX_LIMIT: usize = 100;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1", get(home))
        .route("/api/v1/", get(home))
        .route("/api/v1/ville/{position}", get(get_ville))
        .route("/api/v1/villes", get(get_villes))
        .route("/api/v1/plateaux/{target}", get(get_plateaux))
        .route("/api/v1/palmares", get(get_palmares))
        .route("/api/v1/user", put(put_user))
        .route("/api/v1/user/{id}", get(get_user))
        .route("/api/v1/activite", put(put_activite))
        .route("/api/v1/activite/{id}/confirme", post(confirm_activite))
        .route("/api/v1/contributions", get(get_contributions))
}

async fn home() -> Json<&'static str> {
    Json("Bonjour!")
}

/// Parse a `latitude,longitude` path segment.
///
/// Returns `None` when the segment is not two numbers, so callers can fall
/// back to treating it as an identifier.
fn parse_position(raw: &str) -> Option<Result<Coordinates>> {
    let (lat, lon) = raw.split_once(',')?;
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lon.trim().parse::<f64>().ok()?;
    Some(Coordinates::new(latitude, longitude))
}

/// Run a ledger operation off the async runtime; record stores do
/// blocking I/O.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?
}

// ─── Municipalities ──────────────────────────────────────────

/// Municipality containing a position.
async fn get_ville(
    State(state): State<Arc<AppState>>,
    Path(position): Path<String>,
) -> Result<Json<Municipality>> {
    let coords = parse_position(&position).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Expected 'latitude,longitude', got '{}'",
            position
        ))
    })??;

    let municipality = state
        .municipalities
        .containing_municipality(coords.latitude, coords.longitude)?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No municipality at {},{}",
                coords.latitude, coords.longitude
            ))
        })?;

    tracing::debug!(
        latitude = coords.latitude,
        longitude = coords.longitude,
        municipality = %municipality.id,
        "Resolved municipality"
    );
    Ok(Json(municipality.clone()))
}

async fn get_villes(State(state): State<Arc<AppState>>) -> Json<Vec<Municipality>> {
    Json(state.municipalities.municipalities().to_vec())
}

// ─── Activity sites ──────────────────────────────────────────

#[derive(Deserialize)]
struct NearbyParams {
    /// Search radius in km
    proximite: Option<f64>,
    limit: Option<usize>,
}

/// Either nearby sites (with distance) or the sites of one municipality.
#[derive(Serialize)]
#[serde(untagged)]
pub enum SitesResponse {
    Nearby(Vec<NearbySite>),
    Municipality(Vec<ActivitySite>),
}

/// `/plateaux/{lat},{lon}` lists sites by distance; `/plateaux/{ville}`
/// lists the sites of a municipality (empty for unknown ids).
async fn get_plateaux(
    State(state): State<Arc<AppState>>,
    Path(target): Path<String>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<SitesResponse>> {
    let Some(coords) = parse_position(&target) else {
        let sites = state
            .sites
            .sites_by_municipality(&target)
            .into_iter()
            .cloned()
            .collect();
        return Ok(Json(SitesResponse::Municipality(sites)));
    };
    let coords = coords?;

    let max_distance_km = params.proximite.unwrap_or(state.config.default_radius_km);
    if !max_distance_km.is_finite() || max_distance_km < 0.0 {
        return Err(AppError::BadRequest(
            "'proximite' must be a non-negative number of km".to_string(),
        ));
    }
    let query = NearbyQuery {
        max_distance_km,
        limit: params
            .limit
            .unwrap_or(state.config.default_limit)
            .min(MAX_LIMIT),
    };

    let nearby = state
        .sites
        .nearest_sites(coords.latitude, coords.longitude, &query)?;
    tracing::debug!(
        latitude = coords.latitude,
        longitude = coords.longitude,
        radius_km = query.max_distance_km,
        found = nearby.len(),
        "Nearby sites"
    );
    Ok(Json(SitesResponse::Nearby(nearby)))
}

// ─── Leaderboard ─────────────────────────────────────────────

async fn get_palmares(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Score>>> {
    let ledger = state.ledger.clone();
    Ok(Json(blocking(move || ledger.leaderboard()).await?))
}

// ─── Users ───────────────────────────────────────────────────

async fn put_user(
    State(state): State<Arc<AppState>>,
    Json(upsert): Json<UserUpsert>,
) -> Result<Json<User>> {
    let ledger = state.ledger.clone();
    Ok(Json(blocking(move || ledger.upsert_user(upsert)).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let ledger = state.ledger.clone();
    blocking(move || ledger.user(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

// ─── Activities ──────────────────────────────────────────────

async fn put_activite(
    State(state): State<Arc<AppState>>,
    Json(upsert): Json<ActivityUpsert>,
) -> Result<Json<ActivityRecord>> {
    let ledger = state.ledger.clone();
    Ok(Json(blocking(move || ledger.upsert_activity(upsert)).await?))
}

async fn confirm_activite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityRecord>> {
    let ledger = state.ledger.clone();
    blocking(move || ledger.confirm_activity(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))
}

#[derive(Deserialize)]
struct ContributionsQuery {
    user: Uuid,
    #[serde(default)]
    skip: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

/// A user's activity records, newest first, paged by `skip`/`limit`.
async fn get_contributions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContributionsQuery>,
) -> Result<Json<Vec<ActivityRecord>>> {
    let ledger = state.ledger.clone();
    let user = params.user;
    let records = blocking(move || ledger.activities_by_user(user)).await?;

    Ok(Json(
        records
            .into_iter()
            .skip(params.skip)
            .take(params.limit.min(MAX_LIMIT))
            .collect(),
    ))
}
