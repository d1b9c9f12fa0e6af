// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod discovery;
pub mod geometry;
pub mod ledger;
pub mod municipality;
pub mod site;

pub use geometry::{GeometryError, GeometryStore};
pub use ledger::ActivityLedger;
pub use municipality::MunicipalityResolver;
pub use site::{NearbyQuery, NearbySite, SiteIndex};
