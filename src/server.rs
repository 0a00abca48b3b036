// ABOUTME: HTTP server assembly: shared state, router composition, middleware layers
// ABOUTME: Stamps the request path into error bodies and serves the axum app
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Server
//!
//! [`AppState`] wires the configuration, auth manager, diary lock registry,
//! notification dispatcher, and recommendation agent together. Per-request
//! user stores are built on demand from the caller's bearer token; the
//! service-scoped store is shared and used only by paths with no user
//! context.

use crate::auth::{AuthManager, AuthUser};
use crate::config::ServerConfig;
use crate::diary::DiaryLocks;
use crate::errors::{AppResult, ErrorBody};
use crate::llm::OpenAiClient;
use crate::notifications::{ExpoPushClient, NotificationDispatcher};
use crate::recommendations::{agent::spawn_scheduler, RecommendationAgent};
use crate::routes::{
    DashboardRoutes, DiaryRoutes, FoodsRoutes, HealthRoutes, NotificationsRoutes,
    RecommendationsRoutes, StepsRoutes, TestingRoutes, UsersRoutes,
};
use crate::store::Store;
use axum::extract::{FromRef, Request};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Bearer-token validator
    pub auth: AuthManager,
    /// Per-diary mutation locks
    pub locks: DiaryLocks,
    /// Service-scoped store for paths without user context
    pub service_store: Store,
    /// Push notification dispatcher
    pub dispatcher: NotificationDispatcher,
    /// Nightly recommendation pipeline
    pub agent: Arc<RecommendationAgent>,
}

impl FromRef<AppState> for AuthManager {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    /// Build the full state graph from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any HTTP client cannot be constructed.
    pub fn new(config: ServerConfig) -> AppResult<Self> {
        let config = Arc::new(config);
        let service_store = Store::for_service(&config.supabase)?;
        let dispatcher =
            NotificationDispatcher::new(service_store.clone(), ExpoPushClient::new()?);
        let completion = Arc::new(OpenAiClient::new(&config.openai)?);
        let agent = Arc::new(RecommendationAgent::new(
            service_store.clone(),
            completion,
            dispatcher.clone(),
            config.recommendations.strategy,
        ));

        Ok(Self {
            auth: AuthManager::new(&config.auth.jwt_secret),
            locks: DiaryLocks::new(),
            service_store,
            dispatcher,
            agent,
            config,
        })
    }

    /// Store scoped to the authenticated caller's row-level permissions
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn user_store(&self, user: &AuthUser) -> AppResult<Store> {
        Store::for_user(&self.config.supabase, &user.token)
    }
}

/// Assemble the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(UsersRoutes::routes())
        .merge(DiaryRoutes::routes())
        .merge(FoodsRoutes::routes())
        .merge(StepsRoutes::routes())
        .merge(RecommendationsRoutes::routes())
        .merge(DashboardRoutes::routes())
        .merge(NotificationsRoutes::routes())
        .merge(TestingRoutes::routes())
        .merge(HealthRoutes::routes())
        .layer(middleware::from_fn(stamp_error_path))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the server until shutdown, spawning the midnight scheduler when
/// enabled
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let port = config.http_port;
    let scheduler_enabled = config.recommendations.scheduler_enabled;
    let state = AppState::new(config)?;

    if scheduler_enabled {
        let _handle = spawn_scheduler(state.agent.clone());
        tracing::info!("midnight recommendation scheduler spawned");
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Error bodies are built before routing context is available, so the
/// request path is stamped in afterwards from this middleware.
async fn stamp_error_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    if let Some(body) = response.extensions().get::<ErrorBody>() {
        let mut body = body.clone();
        body.path = Some(path);
        let status = response.status();
        return (status, Json(body)).into_response();
    }
    response
}
