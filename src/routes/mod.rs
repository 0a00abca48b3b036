// ABOUTME: HTTP route handler organization module for the REST surface
// ABOUTME: One route struct per domain, assembled into the server router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # HTTP Routes
//!
//! One `XxxRoutes` struct per domain, each exposing a `routes()` constructor
//! returning an axum router. Every handler except the health checks and the
//! test triggers extracts [`AuthUser`](crate::auth::AuthUser) and operates on
//! a store scoped to the caller's bearer token.

pub mod dashboard;
pub mod diary;
pub mod foods;
pub mod health;
pub mod notifications;
pub mod recommendations;
pub mod steps;
pub mod testing;
pub mod users;

pub use dashboard::DashboardRoutes;
pub use diary::DiaryRoutes;
pub use foods::FoodsRoutes;
pub use health::HealthRoutes;
pub use notifications::NotificationsRoutes;
pub use recommendations::RecommendationsRoutes;
pub use steps::StepsRoutes;
pub use testing::TestingRoutes;
pub use users::UsersRoutes;
