use pitchiq_api::client::{API_KEY_VAR, SPORTSDB_V1};
use pitchiq_api::news::ESPN_SOCCER;
use std::path::PathBuf;

pub const DEFAULT_AI_MODEL: &str = "gemma3:1b";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub sportsdb_key: Option<String>,
    pub sportsdb_url: String,
    pub news_url: String,
    pub ai_url: Option<String>,
    pub ai_model: String,
    pub ai_key: Option<String>,
    pub data_dir: PathBuf,
    pub default_user: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        Self {
            sportsdb_key: var(API_KEY_VAR),
            sportsdb_url: var("THESPORTSDB_BASE_URL").unwrap_or_else(|| SPORTSDB_V1.to_owned()),
            news_url: var("PITCHIQ_NEWS_BASE_URL").unwrap_or_else(|| ESPN_SOCCER.to_owned()),
            ai_url: var("PITCHIQ_AI_URL"),
            ai_model: var("PITCHIQ_AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_owned()),
            ai_key: var("PITCHIQ_AI_KEY"),
            data_dir: var("PITCHIQ_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            default_user: var("PITCHIQ_USER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = AppSettings::default();
        assert_eq!(s.sportsdb_key, None);
        assert_eq!(s.sportsdb_url, SPORTSDB_V1);
        assert_eq!(s.ai_model, DEFAULT_AI_MODEL);
        assert_eq!(s.ai_url, None);
        assert_eq!(s.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn blank_values_are_unset() {
        let s = settings(&[("THESPORTSDB_API_KEY", "  "), ("PITCHIQ_AI_MODEL", "")]);
        assert_eq!(s.sportsdb_key, None);
        assert_eq!(s.ai_model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn overrides_are_read() {
        let s = settings(&[
            ("THESPORTSDB_API_KEY", "123"),
            ("PITCHIQ_AI_URL", "http://localhost:11434"),
            ("PITCHIQ_DATA_DIR", "/var/lib/pitchiq"),
            ("PITCHIQ_USER", "alice"),
        ]);
        assert_eq!(s.sportsdb_key.as_deref(), Some("123"));
        assert_eq!(s.ai_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(s.data_dir, PathBuf::from("/var/lib/pitchiq"));
        assert_eq!(s.default_user.as_deref(), Some("alice"));
    }
}
