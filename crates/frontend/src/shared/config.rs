//! Client configuration
//!
//! Built once at startup. The API base can be pinned at compile time with
//! `HSK_API_BASE`; otherwise it is derived from the page location.

use super::api_utils;

/// Remaining time below which the countdown is shown as urgent
pub const DEFAULT_WARNING_THRESHOLD_SECS: i64 = 5 * 60;

/// Separator between blank values in a fill-in-blank answer
pub const DEFAULT_BLANK_DELIMITER: &str = "|";

pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub login_path: String,
    pub warning_threshold_secs: i64,
    pub blank_delimiter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
            blank_delimiter: DEFAULT_BLANK_DELIMITER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the running page
    pub fn load() -> Self {
        let api_base = match option_env!("HSK_API_BASE") {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
            _ => api_utils::api_base(),
        };
        log::debug!("API base: {}", api_base);
        Self {
            api_base,
            ..Self::default()
        }
    }
}
