// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Points-Air: an inter-municipal physical activity competition.
//!
//! This crate provides the backend API that resolves coordinates to
//! municipalities, finds nearby activity sites, and keeps the leaderboard
//! of logged activities per municipality.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{ActivityLedger, MunicipalityResolver, SiteIndex};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub municipalities: Arc<MunicipalityResolver>,
    pub sites: Arc<SiteIndex>,
    pub ledger: ActivityLedger,
}
