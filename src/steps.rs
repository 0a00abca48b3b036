// ABOUTME: Step measurement storage with one row per user and calendar day
// ABOUTME: Upsert keyed by the measurement's start date plus trailing-window reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Step Measurements
//!
//! One `step_measurements` row per (user, calendar day), keyed by the UTC
//! date of `start_time`. A second submission for the same day updates the
//! existing row instead of inserting a duplicate.

use crate::errors::AppResult;
use crate::models::StepMeasurement;
use crate::store::{tables, Order, Store};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Request payload for submitting a step measurement
#[derive(Debug, Clone, Deserialize)]
pub struct NewStepMeasurement {
    /// Measurement window start; its UTC date keys the row
    pub start_time: DateTime<Utc>,
    /// Measurement window end
    pub end_time: DateTime<Utc>,
    /// Step count for the window
    pub step_count: i64,
    /// Reporting source
    #[serde(default)]
    pub source: Option<String>,
}

impl Store {
    /// Insert or update the step row for the measurement's calendar day
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn upsert_steps(
        &self,
        user_id: Uuid,
        measurement: &NewStepMeasurement,
    ) -> AppResult<StepMeasurement> {
        let day = measurement.start_time.date_naive();
        let day_start = day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        let day_end = day_start.map(|dt| dt + Duration::days(1));
        let (Some(day_start), Some(day_end)) = (day_start, day_end) else {
            // Midnight always exists for a valid NaiveDate; kept for totality.
            return self.insert_steps(user_id, measurement).await;
        };

        let existing: Option<StepMeasurement> = self
            .from(tables::STEP_MEASUREMENTS)
            .eq("user_id", user_id)
            .gte("start_time", day_start.to_rfc3339())
            .lt("start_time", day_end.to_rfc3339())
            .fetch_optional()
            .await?;

        match existing {
            Some(row) => {
                self.from(tables::STEP_MEASUREMENTS)
                    .eq("id", row.id)
                    .update(&json!({
                        "start_time": measurement.start_time,
                        "end_time": measurement.end_time,
                        "step_count": measurement.step_count,
                        "source": measurement.source,
                    }))
                    .await
            }
            None => self.insert_steps(user_id, measurement).await,
        }
    }

    async fn insert_steps(
        &self,
        user_id: Uuid,
        measurement: &NewStepMeasurement,
    ) -> AppResult<StepMeasurement> {
        self.from(tables::STEP_MEASUREMENTS)
            .insert(&json!({
                "user_id": user_id,
                "start_time": measurement.start_time,
                "end_time": measurement.end_time,
                "step_count": measurement.step_count,
                "source": measurement.source,
            }))
            .await
    }

    /// Full step history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn steps(&self, user_id: Uuid) -> AppResult<Vec<StepMeasurement>> {
        self.from(tables::STEP_MEASUREMENTS)
            .eq("user_id", user_id)
            .order("start_time", Order::Desc)
            .fetch()
            .await
    }

    /// Step rows within the trailing window of `days`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn steps_since(&self, user_id: Uuid, days: i64) -> AppResult<Vec<StepMeasurement>> {
        let cutoff = Utc::now() - Duration::days(days);
        self.from(tables::STEP_MEASUREMENTS)
            .eq("user_id", user_id)
            .gte("start_time", cutoff.to_rfc3339())
            .order("start_time", Order::Desc)
            .fetch()
            .await
    }
}
