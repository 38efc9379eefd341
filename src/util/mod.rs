//! Utilities Module - shared infrastructure
//!
//! - `constants`: Centralized timeouts, limits and wire constants

pub mod constants;

pub use constants::{
    BATCH_BOUNDARY, BATCH_LIMIT, CONNECT_TIMEOUT, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL,
    FETCH_TIMEOUT, REDIRECT_LIMIT, USER_AGENT,
};
