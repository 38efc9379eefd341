//! Centralized constants for the Search Console client
//!
//! All timeout, limit and wire values in one place for easy tuning.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════
// Endpoints
// ═══════════════════════════════════════════════════════════════

/// Search Console API host (JSON endpoints and `/batch`)
pub const DEFAULT_BASE_URL: &str = "https://searchconsole.googleapis.com";

/// OAuth token endpoint used for `refresh_token` grants
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

// ═══════════════════════════════════════════════════════════════
// Batch Envelope
// ═══════════════════════════════════════════════════════════════

/// Maximum number of sub-requests per batch envelope
pub const BATCH_LIMIT: usize = 900;

/// Multipart boundary used for every outgoing batch envelope
pub const BATCH_BOUNDARY: &str = "batch_boundary";

// ═══════════════════════════════════════════════════════════════
// HTTP Client
// ═══════════════════════════════════════════════════════════════

/// Timeout for a whole HTTP request (single or batch)
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for establishing HTTP connections
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of HTTP redirects to follow
pub const REDIRECT_LIMIT: usize = 5;

pub const USER_AGENT: &str = concat!("gsc-batch/", env!("CARGO_PKG_VERSION"));

// ═══════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════
