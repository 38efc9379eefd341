//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - GSC-000-009: Configuration errors
//! - GSC-010-019: Transport errors
//! - GSC-020-029: Decode errors
//! - GSC-030-039: Auth/token errors
//! - GSC-040-049: Input errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GscError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum GscError {
    // ═══════════════════════════════════════════
    // CONFIG ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[GSC-001] Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("[GSC-002] IO error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════
    // TRANSPORT ERRORS (010-019)
    // ═══════════════════════════════════════════
    /// Non-success status after at most one refresh-and-retry.
    /// The status is only logged, not carried.
    #[error("[GSC-010] API call error")]
    ApiCall,

    #[error("[GSC-011] HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ═══════════════════════════════════════════
    // DECODE ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[GSC-020] Failed to decode response: {details}")]
    Decode { details: String },

    #[error("[GSC-021] Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ═══════════════════════════════════════════
    // AUTH ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[GSC-030] Token cache error: {reason}")]
    TokenCache { reason: String },

    #[error("[GSC-031] No access token available")]
    MissingToken,

    // ═══════════════════════════════════════════
    // INPUT ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[GSC-040] Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl GscError {
    /// Stable error code (e.g. `GSC-010`)
    pub fn code(&self) -> &'static str {
        match self {
            GscError::ConfigError { .. } => "GSC-001",
            GscError::Io(_) => "GSC-002",
            GscError::ApiCall => "GSC-010",
            GscError::Http(_) => "GSC-011",
            GscError::Decode { .. } => "GSC-020",
            GscError::Json(_) => "GSC-021",
            GscError::TokenCache { .. } => "GSC-030",
            GscError::MissingToken => "GSC-031",
            GscError::InvalidUrl { .. } => "GSC-040",
        }
    }
}

impl FixSuggestion for GscError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            GscError::ConfigError { .. } => {
                Some("Check ~/.config/gsc-batch/config.toml syntax (TOML)")
            }
            GscError::Io(_) => Some("Check file path and permissions"),
            GscError::ApiCall => Some(
                "Check the token is valid and has the webmasters scope; run with RUST_LOG=debug for the status",
            ),
            GscError::Http(_) => Some("Check network connectivity and the configured base_url"),
            GscError::Decode { .. } => None,
            GscError::Json(_) => None,
            GscError::TokenCache { .. } => {
                Some("Delete ~/.config/gsc-batch/tokens.json and sign in again")
            }
            GscError::MissingToken => {
                Some("Set GSC_ACCESS_TOKEN or store a token in ~/.config/gsc-batch/tokens.json")
            }
            GscError::InvalidUrl { .. } => Some("Use a full URL like https://example.com/"),
        }
    }
}
