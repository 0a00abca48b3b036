// ABOUTME: Environment-based server configuration loading and validation
// ABOUTME: Collects database, completion API, auth, and scheduler settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Server Configuration
//!
//! Environment-only configuration for the Nutrack server. Required variables:
//!
//! - `SUPABASE_URL`: base URL of the hosted Postgres REST service
//! - `SUPABASE_KEY`: anon (user-scoped) API key
//! - `SUPABASE_SERVICE_ROLE_KEY`: elevated service API key
//! - `OPENAI_API_KEY`: completion API key
//! - `JWT_SECRET`: shared secret for bearer-token validation
//!
//! Optional: `HTTP_PORT` (default 3000), `OPENAI_MODEL` (default
//! `gpt-4o-mini`), `RECOMMENDATION_STRATEGY` (`profiles` | `push-tokens`),
//! `RECOMMENDATION_SCHEDULER` (`true` | `false`).

use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default HTTP port when `HTTP_PORT` is not set
const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default completion model when `OPENAI_MODEL` is not set
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP surface
    pub http_port: u16,
    /// Hosted Postgres REST service settings
    pub supabase: SupabaseConfig,
    /// Completion API settings
    pub openai: OpenAiConfig,
    /// Bearer-token validation settings
    pub auth: AuthConfig,
    /// Nightly recommendation job settings
    pub recommendations: RecommendationConfig,
}

/// Connection settings for the hosted Postgres REST service
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Base URL of the service (without the `/rest/v1` suffix)
    pub url: String,
    /// Anon API key used together with a forwarded user bearer token
    pub anon_key: String,
    /// Elevated service-role key for paths with no per-request user context
    pub service_role_key: String,
}

/// Completion API settings
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for the completion endpoint
    pub api_key: String,
    /// Model identifier sent with every request
    pub model: String,
}

/// Bearer-token validation settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HS256 secret the hosted auth service signs tokens with
    pub jwt_secret: String,
}

/// Nightly recommendation job settings
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// How candidate users are enumerated
    pub strategy: RecommendationStrategy,
    /// Whether the midnight scheduler loop is spawned
    pub scheduler_enabled: bool,
}

/// Candidate-user enumeration strategy for the nightly pipeline.
///
/// The two revisions of the upstream system disagreed on which population to
/// walk, so the choice is configuration, not code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecommendationStrategy {
    /// Every user holding a `user_profiles` row
    #[default]
    Profiles,
    /// Every distinct user holding at least one push token
    PushTokens,
}

impl FromStr for RecommendationStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "profiles" => Ok(Self::Profiles),
            "push-tokens" | "push_tokens" => Ok(Self::PushTokens),
            other => Err(AppError::config(format!(
                "Unknown recommendation strategy '{other}' (expected 'profiles' or 'push-tokens')"
            ))),
        }
    }
}

impl fmt::Display for RecommendationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profiles => write!(f, "profiles"),
            Self::PushTokens => write!(f, "push-tokens"),
        }
    }
}

impl ServerConfig {
    /// Load the configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to
    /// parse.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| AppError::config(format!("Invalid HTTP_PORT value: {value}")))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let strategy = match env::var("RECOMMENDATION_STRATEGY") {
            Ok(value) => value.parse()?,
            Err(_) => RecommendationStrategy::default(),
        };

        let scheduler_enabled = env::var("RECOMMENDATION_SCHEDULER")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            http_port,
            supabase: SupabaseConfig {
                url: required_var("SUPABASE_URL")?,
                anon_key: required_var("SUPABASE_KEY")?,
                service_role_key: required_var("SUPABASE_SERVICE_ROLE_KEY")?,
            },
            openai: OpenAiConfig {
                api_key: required_var("OPENAI_API_KEY")?,
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.into()),
            },
            auth: AuthConfig {
                jwt_secret: required_var("JWT_SECRET")?,
            },
            recommendations: RecommendationConfig {
                strategy,
                scheduler_enabled,
            },
        })
    }

    /// One-line startup summary. Never includes secret values.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} store={} model={} strategy={} scheduler={}",
            self.http_port,
            self.supabase.url,
            self.openai.model,
            self.recommendations.strategy,
            self.recommendations.scheduler_enabled,
        )
    }
}

fn required_var(name: &str) -> AppResult<String> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Missing required environment variable: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "profiles".parse::<RecommendationStrategy>().unwrap(),
            RecommendationStrategy::Profiles
        );
        assert_eq!(
            "push-tokens".parse::<RecommendationStrategy>().unwrap(),
            RecommendationStrategy::PushTokens
        );
        assert_eq!(
            "PUSH_TOKENS".parse::<RecommendationStrategy>().unwrap(),
            RecommendationStrategy::PushTokens
        );
        assert!("everyone".parse::<RecommendationStrategy>().is_err());
    }

    #[test]
    fn test_summary_excludes_secrets() {
        let config = ServerConfig {
            http_port: 3000,
            supabase: SupabaseConfig {
                url: "https://db.example.com".into(),
                anon_key: "anon-secret".into(),
                service_role_key: "service-secret".into(),
            },
            openai: OpenAiConfig {
                api_key: "sk-secret".into(),
                model: "gpt-4o-mini".into(),
            },
            auth: AuthConfig {
                jwt_secret: "jwt-secret".into(),
            },
            recommendations: RecommendationConfig {
                strategy: RecommendationStrategy::Profiles,
                scheduler_enabled: true,
            },
        };

        let summary = config.summary();
        assert!(summary.contains("gpt-4o-mini"));
        assert!(!summary.contains("secret"));
    }
}
