// Project-wide constants
//
// Centralised here so addresses, limits and defaults have one source of
// truth. Import via `use crate::config::constants::*;`.

/// Default bind address for the HTTP service (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Browser origins allowed by CORS when none are configured (Vite dev server).
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

/// Largest request body accepted, uploads included.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Config directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".testgen";

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default maximum tokens for a single generation call.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Critique/regenerate cycles the validation gate may run.
pub const DEFAULT_ITERATION_CAP: u32 = 4;

/// Upper bound for a single provider call, in seconds.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

/// Retries after the first attempt for transient provider failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
