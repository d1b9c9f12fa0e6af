// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use points_air::config::Config;
use points_air::db::{collections, FileStore, MemoryStore};
use points_air::models::{ActivityRecord, User};
use points_air::routes::create_router;
use points_air::services::{ActivityLedger, MunicipalityResolver, SiteIndex};
use points_air::AppState;
use std::path::PathBuf;
use std::sync::Arc;

#[allow(dead_code)]
pub const REPENTIGNY: &str = "ville-de-repentigny";
#[allow(dead_code)]
pub const LAVAL: &str = "ville-de-laval";
#[allow(dead_code)]
pub const RIMOUSKI: &str = "ville-de-rimouski";
#[allow(dead_code)]
pub const SAINTE_ADELE: &str = "ville-de-sainte-adele";

/// Parc Sanguinet, in Repentigny.
#[allow(dead_code)]
pub const SANGUINET: &str = "5b7e3f0e-8d8a-4c52-9f57-0c1d7a2e6b11";
/// Centre de la nature, in Laval.
#[allow(dead_code)]
pub const CENTRE_NATURE: &str = "7e8d9c0b-1a2f-4e3d-8c4b-6a5f4e3d2c55";
/// Parc Beauséjour, in Rimouski.
#[allow(dead_code)]
pub const BEAUSEJOUR: &str = "2a3b4c5d-6e7f-4a8b-9c0d-1e2f3a4b5c66";

/// Query point a short walk from Parc Sanguinet.
#[allow(dead_code)]
pub const QUERY_POINT: (f64, f64) = (45.768380, -73.431657);

pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load the sample datasets shipped in `data/`.
#[allow(dead_code)]
pub fn load_datasets() -> (Arc<MunicipalityResolver>, Arc<SiteIndex>) {
    let municipalities = MunicipalityResolver::load_from_file(data_dir().join("villes.geojson"))
        .expect("Failed to load villes.geojson");
    let sites = SiteIndex::load_from_file(data_dir().join("plateaux.geojson"), &municipalities)
        .expect("Failed to load plateaux.geojson");
    (Arc::new(municipalities), Arc::new(sites))
}

/// Ledger over the sample datasets with in-memory stores.
#[allow(dead_code)]
pub fn test_ledger() -> ActivityLedger {
    let (municipalities, sites) = load_datasets();
    ActivityLedger::new(
        municipalities,
        sites,
        Arc::new(MemoryStore::<User>::new()),
        Arc::new(MemoryStore::<ActivityRecord>::new()),
    )
}

/// Ledger over the sample datasets with file stores in a fresh temp
/// directory. Returns the ledger and the records directory.
#[allow(dead_code)]
pub fn file_ledger() -> (ActivityLedger, PathBuf) {
    let (municipalities, sites) = load_datasets();
    let dir = std::env::temp_dir().join(format!("points-air-records-{}", uuid::Uuid::new_v4()));
    let users = FileStore::<User>::open(dir.join(collections::USERS)).expect("open users");
    let activities = FileStore::<ActivityRecord>::open(dir.join(collections::ACTIVITIES))
        .expect("open activities");
    let ledger = ActivityLedger::new(municipalities, sites, Arc::new(users), Arc::new(activities));
    (ledger, dir)
}

/// Create a test app over the sample datasets and in-memory stores.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let (municipalities, sites) = load_datasets();
    let ledger = ActivityLedger::new(
        municipalities.clone(),
        sites.clone(),
        Arc::new(MemoryStore::<User>::new()),
        Arc::new(MemoryStore::<ActivityRecord>::new()),
    );

    let state = Arc::new(AppState {
        config: Config {
            data_dir: data_dir(),
            ..Config::default()
        },
        municipalities,
        sites,
        ledger,
    });

    (create_router(state.clone()), state)
}
