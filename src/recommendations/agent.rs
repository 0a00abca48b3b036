// ABOUTME: Nightly recommendation pipeline: fetch yesterday's diary, prompt, generate, notify
// ABOUTME: Midnight UTC scheduler loop with per-user failure isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

use crate::config::RecommendationStrategy;
use crate::errors::AppResult;
use crate::llm::CompletionProvider;
use crate::models::{DailyDiaryWithEntries, FoodDiaryEntry, Gender, Goal, UserProfile};
use crate::notifications::NotificationDispatcher;
use crate::store::Store;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

/// Bumped whenever the prompt template changes, so stored artifacts can be
/// traced to the exact template that produced them
pub const PROMPT_VERSION: i32 = 1;

/// Push notification title for a fresh recommendation
const NOTIFICATION_TITLE: &str = "Nové doporučení k dispozici";

/// Push notification body for a fresh recommendation
const NOTIFICATION_BODY: &str =
    "Podívejte se na své nové nutriční doporučení na základě včerejšího jídelníčku.";

/// Outcome of one user's pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A recommendation was generated and persisted
    Generated(Uuid),
    /// No diary or no food entries for the analyzed day; a valid terminal
    /// state, not an error
    Skipped,
}

/// Runs the per-user recommendation pipeline over a candidate population
pub struct RecommendationAgent {
    store: Store,
    completion: Arc<dyn CompletionProvider>,
    dispatcher: NotificationDispatcher,
    strategy: RecommendationStrategy,
}

impl RecommendationAgent {
    /// Agent over a service-scoped store
    #[must_use]
    pub fn new(
        store: Store,
        completion: Arc<dyn CompletionProvider>,
        dispatcher: NotificationDispatcher,
        strategy: RecommendationStrategy,
    ) -> Self {
        Self {
            store,
            completion,
            dispatcher,
            strategy,
        }
    }

    /// Run the pipeline for every candidate user, analyzing yesterday's
    /// diary. Per-user failures are logged and skipped; the batch always
    /// runs to completion.
    ///
    /// # Errors
    ///
    /// Returns an error only if candidate enumeration itself fails.
    pub async fn run_daily(&self) -> AppResult<()> {
        let analyzed_date = Utc::now().date_naive() - Duration::days(1);
        tracing::info!(strategy = %self.strategy, %analyzed_date, "starting daily recommendation run");

        let candidates = self.store.recommendation_candidates(self.strategy).await?;
        let total = candidates.len();
        let mut generated = 0usize;

        for user_id in candidates {
            match self.process_user(user_id, analyzed_date).await {
                Ok(RunOutcome::Generated(id)) => {
                    generated += 1;
                    tracing::info!(%user_id, recommendation_id = %id, "recommendation generated");
                }
                Ok(RunOutcome::Skipped) => {
                    tracing::info!(%user_id, %analyzed_date, "no food entries, skipping");
                }
                Err(e) => {
                    tracing::error!(%user_id, error = %e, "recommendation failed, continuing with next user");
                }
            }
        }

        tracing::info!(total, generated, "daily recommendation run completed");
        Ok(())
    }

    /// Run the pipeline for one user and one analyzed date
    ///
    /// # Errors
    ///
    /// Returns an error if any step after the empty-diary check fails.
    pub async fn process_user(
        &self,
        user_id: Uuid,
        analyzed_date: NaiveDate,
    ) -> AppResult<RunOutcome> {
        let Some(diary) = self.store.daily_diary_by_date(user_id, analyzed_date).await? else {
            return Ok(RunOutcome::Skipped);
        };
        let diary = self.store.diary_with_entries(diary).await?;
        if diary.food_entries.is_empty() {
            return Ok(RunOutcome::Skipped);
        }

        let profile = self.store.user_profile(user_id).await?;
        let prompt = build_prompt(profile.as_ref(), &diary);
        let response = self.completion.generate(&prompt).await?;

        let recommendation = self
            .store
            .insert_recommendation(
                user_id,
                analyzed_date,
                &prompt,
                &response,
                self.completion.model(),
                PROMPT_VERSION,
            )
            .await?;

        self.dispatcher
            .send(
                user_id,
                NOTIFICATION_TITLE,
                NOTIFICATION_BODY,
                json!({ "recommendationId": recommendation.id }),
            )
            .await?;

        Ok(RunOutcome::Generated(recommendation.id))
    }
}

/// Spawn the midnight UTC scheduler loop. Each tick runs the full pipeline;
/// a failed run is logged and the loop keeps ticking.
pub fn spawn_scheduler(agent: Arc<RecommendationAgent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_midnight(Utc::now());
            tracing::debug!(seconds = wait.as_secs(), "scheduler sleeping until midnight UTC");
            tokio::time::sleep(wait).await;
            if let Err(e) = agent.run_daily().await {
                tracing::error!(error = %e, "daily recommendation run failed");
            }
        }
    })
}

/// Time remaining until the next UTC midnight
#[must_use]
pub fn duration_until_next_midnight(now: DateTime<Utc>) -> std::time::Duration {
    let next_midnight = (now.date_naive() + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .map_or(now + Duration::days(1), |dt| dt.and_utc());
    (next_midnight - now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(60))
}

/// Integer percentage shares of each macro in the consumed total. All zero
/// when nothing was consumed.
#[must_use]
pub fn macro_percentages(protein_g: f64, carbs_g: f64, fat_g: f64) -> (i64, i64, i64) {
    let total = protein_g + carbs_g + fat_g;
    if total <= 0.0 {
        return (0, 0, 0);
    }
    let share = |part: f64| (part / total * 100.0).round() as i64;
    (share(protein_g), share(carbs_g), share(fat_g))
}

/// Compose the versioned Czech prompt from the profile and yesterday's diary.
/// Bump [`PROMPT_VERSION`] when changing this template.
#[must_use]
pub fn build_prompt(profile: Option<&UserProfile>, diary: &DailyDiaryWithEntries) -> String {
    let gender = match profile.and_then(|p| p.gender) {
        Some(Gender::Male) => "muž",
        Some(Gender::Female) => "žena",
        _ => "osoba",
    };
    let goal = match profile.and_then(|p| p.goal) {
        Some(Goal::LoseFat) => "zhubnout",
        Some(Goal::GainMuscle) => "nabrat svaly",
        _ => "udržet váhu",
    };
    let current_weight = profile.and_then(|p| p.weight_value).unwrap_or(0.0);
    let target_weight = profile.and_then(|p| p.target_weight_value).unwrap_or(0.0);

    let d = &diary.diary;
    let (protein_pct, carbs_pct, fat_pct) =
        macro_percentages(d.protein_consumed_g, d.carbs_consumed_g, d.fat_consumed_g);

    let mut entries = String::new();
    for entry in &diary.food_entries {
        let _ = writeln!(entries, "{}", format_entry_line(entry));
    }

    format!(
        "\nUživatel: {gender}, {current_weight} kg, cíl {goal} na {target_weight} kg.\n\n\
Včerejší jídelníček:\n\
Celkem: {calories} kcal, {protein}g bílkovin ({protein_pct}%), {carbs}g sacharidů ({carbs_pct}%), {fat}g tuků ({fat_pct}%)\n\n\
Seznam jídel:\n{entries}\n\
Prosím, poskytni personalizované doporučení na základě těchto dat. Odpověz ve formátu JSON s následujícími klíči:\n\
1. \"summary\": Stručné shrnutí včerejšího jídelníčku\n\
2. \"positives\": Co dělá uživatel dobře (alespoň 2-3 body)\n\
3. \"improvements\": Doporučení ke zlepšení (alespoň 2-3 body)\n\
4. \"motivation\": Motivační zpráva pro uživatele\n\n\
Odpověď musí být v češtině a ve formátu JSON.\n",
        calories = d.calories_consumed,
        protein = d.protein_consumed_g,
        carbs = d.carbs_consumed_g,
        fat = d.fat_consumed_g,
    )
}

fn format_entry_line(entry: &FoodDiaryEntry) -> String {
    format!(
        "- {} ({}): {} kcal, {}g bílkovin, {}g sacharidů, {}g tuků",
        entry.food_name,
        entry.meal_type.as_str(),
        entry.calories,
        entry.protein,
        entry.carbs,
        entry.fat,
    )
}
