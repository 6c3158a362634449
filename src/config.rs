use std::time::Duration;

use actix_web::cookie::Key;

use crate::progress::rules::CompletionRule;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub session_max_age_secs: i64,
    pub page_size: usize,
    pub complete_result_id: i64,
    pub completed_status_id: i64,
    pub backend_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_key: None,
            session_max_age_secs: 3600,
            page_size: 10,
            complete_result_id: 3,
            completed_status_id: 3,
            backend_timeout: None,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Invalid numbers keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let backend_url = lookup("BACKEND_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(d.backend_url);
        let bind_addr = lookup("BIND_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(d.bind_addr);

        Self {
            backend_url,
            bind_addr,
            session_key: lookup("SESSION_KEY"),
            session_max_age_secs: parse_or(&lookup, "SESSION_MAX_AGE_SECS", d.session_max_age_secs),
            page_size: parse_or(&lookup, "PAGE_SIZE", d.page_size).max(1),
            complete_result_id: parse_or(&lookup, "COMPLETE_RESULT_ID", d.complete_result_id),
            completed_status_id: parse_or(&lookup, "COMPLETED_STATUS_ID", d.completed_status_id),
            backend_timeout: lookup("BACKEND_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn completion_rule(&self) -> CompletionRule {
        CompletionRule::new(self.complete_result_id, self.completed_status_id)
    }

    /// Session signing key: SESSION_KEY when long enough, otherwise a random one.
    pub fn cookie_key(&self) -> Key {
        match self.session_key.as_deref() {
            Some(val) if val.len() >= 64 => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Some(val) => {
                log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
                Key::generate()
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                Key::generate()
            }
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Ignoring invalid value for {key}: {raw:?}");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = AppConfig::from_lookup(|_| None);
        assert_eq!(cfg.backend_url, "http://localhost:4000");
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.complete_result_id, 3);
        assert_eq!(cfg.session_max_age_secs, 3600);
        assert!(cfg.backend_timeout.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("BACKEND_URL", "http://api.local:9000/"),
            ("PAGE_SIZE", "25"),
            ("COMPLETE_RESULT_ID", "7"),
            ("BACKEND_TIMEOUT_SECS", "15"),
        ]));
        assert_eq!(cfg.backend_url, "http://api.local:9000");
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.complete_result_id, 7);
        assert_eq!(cfg.backend_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("PAGE_SIZE", "many"), ("SESSION_MAX_AGE_SECS", "-")]));
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.session_max_age_secs, 3600);
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("PAGE_SIZE", "0")]));
        assert_eq!(cfg.page_size, 1);
    }
}
