// ABOUTME: Push notification dispatch: token lookup, filtering, chunking, dead-token cleanup
// ABOUTME: Push token registration upserted by (user, device)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Notification Dispatcher
//!
//! Delivery is strictly best-effort: a user without tokens is a logged no-op,
//! malformed tokens are filtered before submission, and per-ticket failures
//! never abort the remaining chunks. Tickets reporting a dead device
//! (`DeviceNotRegistered` or credential errors) trigger deletion of the
//! token row so the next run does not resubmit to it.
//!
//! Token storage uses service credentials: registration happens during app
//! startup flows and dispatch happens from the nightly pipeline, neither of
//! which carries a user-scoped store.

pub mod expo;

pub use expo::{is_expo_push_token, ExpoPushClient, PushMessage, PushTicket, PUSH_CHUNK_SIZE};

use crate::errors::AppResult;
use crate::models::PushToken;
use crate::store::{tables, Store};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Request payload for registering a device's push token
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPushToken {
    /// Provider push token
    pub push_token: String,
    /// Stable device identifier; keys the upsert when present
    #[serde(default)]
    pub device_id: Option<String>,
    /// Human-readable device name
    #[serde(default)]
    pub device_name: Option<String>,
}

/// Sends push notifications to a user's registered devices
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    store: Store,
    expo: ExpoPushClient,
}

impl NotificationDispatcher {
    /// Dispatcher over a service-scoped store and an Expo client
    #[must_use]
    pub fn new(store: Store, expo: ExpoPushClient) -> Self {
        Self { store, expo }
    }

    /// Send one notification to every valid device of the user.
    ///
    /// Never fails for delivery reasons; only the initial token lookup can
    /// return an error. Dead tokens reported in tickets are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the token lookup fails.
    pub async fn send(
        &self,
        user_id: Uuid,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> AppResult<()> {
        let tokens = self.store.user_push_tokens(user_id).await?;
        if tokens.is_empty() {
            tracing::warn!(%user_id, "no push tokens registered, skipping notification");
            return Ok(());
        }

        let messages: Vec<PushMessage> = tokens
            .iter()
            .filter(|row| {
                let valid = is_expo_push_token(&row.push_token);
                if !valid {
                    tracing::error!(%user_id, token = %row.push_token, "invalid push token shape, skipping");
                }
                valid
            })
            .map(|row| PushMessage::new(row.push_token.clone(), title, body, data.clone()))
            .collect();

        if messages.is_empty() {
            tracing::warn!(%user_id, "no valid push tokens, skipping notification");
            return Ok(());
        }

        for chunk in messages.chunks(PUSH_CHUNK_SIZE) {
            match self.expo.send_chunk(chunk).await {
                Ok(tickets) => self.handle_tickets(user_id, chunk, &tickets).await,
                Err(e) => {
                    tracing::error!(%user_id, error = %e, "push chunk submission failed");
                }
            }
        }

        tracing::info!(%user_id, devices = messages.len(), "push notifications dispatched");
        Ok(())
    }

    /// Log ticket errors and delete token rows the provider reports as dead.
    /// Tickets arrive in the same order as the chunk's messages.
    async fn handle_tickets(&self, user_id: Uuid, chunk: &[PushMessage], tickets: &[PushTicket]) {
        for (message, ticket) in chunk.iter().zip(tickets) {
            if ticket.is_ok() {
                continue;
            }
            tracing::error!(
                %user_id,
                token = %message.to,
                error = ticket.message.as_deref().unwrap_or("unknown"),
                "push delivery failed"
            );
            if ticket.is_dead_token() {
                if let Err(e) = self.store.delete_push_token(user_id, &message.to).await {
                    tracing::error!(%user_id, token = %message.to, error = %e, "failed to delete dead push token");
                } else {
                    tracing::info!(%user_id, token = %message.to, "deleted dead push token");
                }
            }
        }
    }
}

impl Store {
    /// All push token rows of one user
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn user_push_tokens(&self, user_id: Uuid) -> AppResult<Vec<PushToken>> {
        self.from(tables::USER_PUSH_TOKENS)
            .eq("user_id", user_id)
            .fetch()
            .await
    }

    /// Register a device's push token. With a device id the row is upserted
    /// per (user, device); without one, every registration inserts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn register_push_token(
        &self,
        user_id: Uuid,
        registration: &RegisterPushToken,
    ) -> AppResult<()> {
        if let Some(device_id) = &registration.device_id {
            let existing: Option<PushToken> = self
                .from(tables::USER_PUSH_TOKENS)
                .eq("user_id", user_id)
                .eq("device_id", device_id)
                .fetch_optional()
                .await?;

            if let Some(row) = existing {
                self.from(tables::USER_PUSH_TOKENS)
                    .eq("id", row.id)
                    .update_void(&json!({
                        "push_token": registration.push_token,
                        "device_name": registration.device_name,
                    }))
                    .await?;
                tracing::info!(%user_id, device_id, "updated push token");
                return Ok(());
            }
        }

        let _: PushToken = self
            .from(tables::USER_PUSH_TOKENS)
            .insert(&json!({
                "user_id": user_id,
                "push_token": registration.push_token,
                "device_id": registration.device_id,
                "device_name": registration.device_name,
            }))
            .await?;
        tracing::info!(%user_id, "registered push token");
        Ok(())
    }

    /// Delete one token row by its token value
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn delete_push_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.from(tables::USER_PUSH_TOKENS)
            .eq("user_id", user_id)
            .eq("push_token", token)
            .delete()
            .await
    }

    /// Distinct user ids holding at least one push token
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn users_with_push_tokens(&self) -> AppResult<Vec<Uuid>> {
        #[derive(Deserialize)]
        struct UserIdRow {
            user_id: Uuid,
        }

        let rows: Vec<UserIdRow> = self
            .from(tables::USER_PUSH_TOKENS)
            .select("user_id")
            .fetch()
            .await?;

        let mut ids: Vec<Uuid> = rows.into_iter().map(|r| r.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
