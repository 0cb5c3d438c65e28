use std::env;

use anyhow::{bail, Result};

use crate::config;
use crate::models::Locale;

#[derive(Clone)]
pub struct AppSettings {
    pub api_key: String,
    pub model: String,
    pub api_base_url: Option<String>,
    /// Dictation command and its arguments; `None` disables voice input.
    pub speech_command: Option<Vec<String>>,
    pub locale: Locale,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("speech_command", &self.speech_command)
            .field("locale", &self.locale)
            .finish()
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: config::DEFAULT_MODEL.to_string(),
            api_base_url: None,
            speech_command: None,
            locale: Locale::default(),
        }
    }
}

pub struct SettingsService;

impl SettingsService {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<AppSettings> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<AppSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = AppSettings::default();

        if let Some(key) =
            non_empty(config::ENV_API_KEY).or_else(|| non_empty(config::ENV_API_KEY_FALLBACK))
        {
            settings.api_key = key.trim().to_string();
        }

        if let Some(model) = non_empty(config::ENV_MODEL) {
            settings.model = model.trim().to_string();
        }

        if let Some(base) = non_empty(config::ENV_API_BASE) {
            let base = base.trim().trim_end_matches('/').to_string();
            if !base.starts_with("http://") && !base.starts_with("https://") {
                bail!("{} must be an http(s) URL, got {:?}", config::ENV_API_BASE, base);
            }
            settings.api_base_url = Some(base);
        }

        settings.speech_command = non_empty(config::ENV_SPEECH_CMD).map(|cmd| {
            cmd.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        if let Some(code) = non_empty(config::ENV_LOCALE) {
            match Locale::from_code(code.trim()) {
                Some(locale) => settings.locale = locale,
                None => tracing::warn!("Ignoring unknown locale {:?}", code),
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppSettings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SettingsService::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = load(&[]).unwrap();
        assert!(settings.api_key.is_empty());
        assert_eq!(settings.model, config::DEFAULT_MODEL);
        assert!(settings.api_base_url.is_none());
        assert!(settings.speech_command.is_none());
        assert_eq!(settings.locale, Locale::PtPt);
    }

    #[test]
    fn test_api_key_fallback_variable() {
        let settings = load(&[("API_KEY", "fallback")]).unwrap();
        assert_eq!(settings.api_key, "fallback");

        let settings = load(&[("API_KEY", "fallback"), ("GEMINI_API_KEY", "primary")]).unwrap();
        assert_eq!(settings.api_key, "primary");

        let settings = load(&[("GEMINI_API_KEY", "  "), ("API_KEY", "fallback")]).unwrap();
        assert_eq!(settings.api_key, "fallback");
    }

    #[test]
    fn test_overrides() {
        let settings = load(&[
            ("ORIENTAI_MODEL", "gemini-2.5-flash"),
            ("ORIENTAI_API_BASE", "http://localhost:8080/v1beta/"),
            ("ORIENTAI_SPEECH_CMD", "dictate --json"),
            ("ORIENTAI_LOCALE", "en"),
        ])
        .unwrap();
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(
            settings.api_base_url.as_deref(),
            Some("http://localhost:8080/v1beta")
        );
        assert_eq!(
            settings.speech_command,
            Some(vec!["dictate".to_string(), "--json".to_string()])
        );
        assert_eq!(settings.locale, Locale::En);
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(load(&[("ORIENTAI_API_BASE", "ftp://example.com")]).is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let settings = load(&[("GEMINI_API_KEY", "secret-value")]).unwrap();
        assert!(!format!("{:?}", settings).contains("secret-value"));
    }
}
