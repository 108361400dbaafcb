//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`HealthError`], [`ProviderError`]). Small helpers for reading/validating
//! configuration values are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::llm_provider::LlmProvider;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
///
/// Variants wrap domain-specific enums (config/health/provider) and a few
/// common cases (HTTP transport, timeouts).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Health-check/connectivity/decoding errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// A provider rejected the request or answered with an unexpected payload.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl AiLlmError {
    /// Maps a transport error, promoting client timeouts to [`AiLlmError::Timeout`].
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            AiLlmError::Timeout(timeout)
        } else {
            AiLlmError::HttpTransport(err)
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like ports, limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`, `OLLAMA_PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Unsupported provider in `LLM_KIND`.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OLLAMA_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* HTTP status details                                                       */
/* ------------------------------------------------------------------------- */

/// Non-successful upstream response, shared by provider and health errors.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Maximum number of characters kept from an upstream error body.
const SNIPPET_MAX_CHARS: usize = 240;

/// Builds a short, single-line snippet of an upstream response body.
pub fn make_snippet(body: &str) -> String {
    body.chars()
        .take(SNIPPET_MAX_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// What went wrong while talking to a specific provider.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    /// The config handed to a client names a different provider.
    #[error("invalid provider for this client")]
    InvalidProvider,

    /// The provider needs an API key and none was configured.
    #[error("missing API key")]
    MissingApiKey,

    /// The endpoint is empty or does not start with http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("unexpected {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Chat completion returned no usable choice.
    #[error("response contained no choices")]
    EmptyChoices,
}

/// Provider-scoped error: which backend failed, and how.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: LlmProvider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: LlmProvider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for provider health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] health probe failed: {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Config helpers (return unified `Result<T>`)                               */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty variable through `lookup`.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_var<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an optional variable (`None` if unset or blank).
pub fn opt_var<F>(lookup: &F, name: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional number through `lookup` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but does not
/// parse as `T`.
pub fn opt_number<F, T>(lookup: &F, name: &'static str, reason: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match opt_var(lookup, name) {
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var: name, reason }.into()),
        None => Ok(None),
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the string does not start with
/// a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}
