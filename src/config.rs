//! Client configuration.
//!
//! Loaded from eframe storage when available, otherwise from the environment
//! (native) or the page origin (web).

use serde::{Deserialize, Serialize};

pub const STORAGE_KEY: &str = "client_config";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Seconds a banner stays visible.
pub const BANNER_DWELL_SECS: f64 = 4.5;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL the three endpoints and hosted results are relative to.
    pub backend_url: String,
    pub request_timeout_secs: u64,
    /// Video synthesis polls upstream for minutes before answering.
    pub video_timeout_secs: u64,
    pub banner_dwell_secs: f64,
    pub log_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: 120,
            video_timeout_secs: 600,
            banner_dwell_secs: BANNER_DWELL_SECS,
            log_level: LogLevel::Info,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TRYON_BACKEND_URL` and `TRYON_LOG`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Ok(url) = std::env::var("TRYON_BACKEND_URL") {
            if !url.trim().is_empty() {
                config.backend_url = url.trim().to_string();
            }
        }
        if let Some(level) = std::env::var("TRYON_LOG")
            .ok()
            .and_then(|s| LogLevel::parse(&s))
        {
            config.log_level = level;
        }
        config
    }

    /// Defaults with the backend assumed to serve this page.
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            config.backend_url = origin;
        }
        config
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.backend_url, path)
    }

    /// Absolute form of a URL returned by the server. Server results are
    /// usually rooted paths like `/static/results/x.png`.
    pub fn resolve(&self, url: &str) -> String {
        if is_absolute(url) {
            url.to_string()
        } else {
            join_url(&self.backend_url, url)
        }
    }
}

fn is_absolute(url: &str) -> bool {
    ["http://", "https://", "data:", "blob:", "file://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ClientConfig {
            backend_url: "http://localhost:8000/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("/generate-tryon"),
            "http://localhost:8000/generate-tryon"
        );
    }

    #[test]
    fn resolve_keeps_absolute_urls() {
        let config = ClientConfig::default();
        assert_eq!(
            config.resolve("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            config.resolve("/static/results/tryon_1.png"),
            "http://127.0.0.1:8000/static/results/tryon_1.png"
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"backend_url":"http://example.com"}"#).unwrap();
        assert_eq!(config.backend_url, "http://example.com");
        assert_eq!(config.banner_dwell_secs, BANNER_DWELL_SECS);
        assert_eq!(config.video_timeout_secs, 600);
    }

    #[test]
    fn log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
