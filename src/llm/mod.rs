// ABOUTME: Completion provider abstraction for text generation
// ABOUTME: Single-shot prompt-to-text contract used by the recommendation pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Completion Client
//!
//! One trait, one implementation. The pipeline only needs "prompt in, raw
//! text out" with no streaming and no retry; any transport or API error is
//! wrapped into the crate error type and surfaced to the caller, which logs
//! and skips the affected user.

pub mod openai;

pub use openai::OpenAiClient;

use crate::errors::AppResult;
use async_trait::async_trait;

/// Single request/response text generation
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the prompt and return the raw response text.
    /// The response is stored without parsing; callers must not assume it is
    /// valid JSON even when the prompt demands it.
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Model identifier recorded alongside generated artifacts
    fn model(&self) -> &str;
}
