// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points-Air API Server
//!
//! Loads the municipality and activity-site datasets once, then serves the
//! competition API.

use anyhow::Context;
use points_air::{
    config::Config,
    db::{collections, FileStore},
    models::{ActivityRecord, User},
    services::{ActivityLedger, MunicipalityResolver, SiteIndex},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Points-Air API");

    // Load municipality boundaries, then the sites that reference them
    let villes = config.municipalities_path();
    tracing::info!(path = %villes.display(), "Loading municipality boundaries");
    let municipalities = Arc::new(
        MunicipalityResolver::load_from_file(&villes)
            .context("Failed to load municipality boundaries")?,
    );

    let plateaux = config.sites_path();
    tracing::info!(path = %plateaux.display(), "Loading activity sites");
    let sites = Arc::new(
        SiteIndex::load_from_file(&plateaux, &municipalities)
            .context("Failed to load activity sites")?,
    );

    // Open record stores
    let users = FileStore::<User>::open(config.records_dir.join(collections::USERS))
        .context("Failed to open user records")?;
    let activities =
        FileStore::<ActivityRecord>::open(config.records_dir.join(collections::ACTIVITIES))
            .context("Failed to open activity records")?;
    tracing::info!(path = %config.records_dir.display(), "Record stores opened");

    let ledger = ActivityLedger::new(
        municipalities.clone(),
        sites.clone(),
        Arc::new(users),
        Arc::new(activities),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        municipalities,
        sites,
        ledger,
    });

    // Build router
    let app = points_air::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("points_air=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
