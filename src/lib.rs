// ABOUTME: Nutrack library crate: nutrition/fitness tracking backend
// ABOUTME: Diary aggregation, AI daily recommendations, push notifications, REST surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Nutrack
//!
//! Nutrition and fitness tracking backend: user profiles, food and activity
//! diaries, step counts, weight logs, and AI-generated daily recommendations
//! delivered via push notification. Persistence flows through a hosted
//! Postgres REST service; authentication is delegated to bearer-token
//! validation against a shared secret.
//!
//! The interesting pieces live in [`diary`] (per-day nutrition aggregation
//! with serialized mutations) and [`recommendations`] (the nightly per-user
//! pipeline joining diary data, a completion API, and push delivery).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod auth;
pub mod config;
pub mod diary;
pub mod errors;
pub mod foods;
pub mod llm;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod recommendations;
pub mod routes;
pub mod server;
pub mod steps;
pub mod store;
pub mod users;
