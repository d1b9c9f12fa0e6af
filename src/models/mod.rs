// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod geometry;
pub mod municipality;
pub mod score;
pub mod site;
pub mod user;

pub use activity::{ActivityRecord, ActivityUpsert};
pub use geometry::{Coordinates, Geometry, PreparedGeometry};
pub use municipality::Municipality;
pub use score::Score;
pub use site::{ActivityKind, ActivitySite, Season};
pub use user::{User, UserUpsert};
