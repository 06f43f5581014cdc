use anyhow::{Context, Result};
use shared::settings::{ProviderKind, StreamSettings};
use std::fs;
use std::path::{Path, PathBuf};

/// `settings.json` in the platform config dir, or `$VIBE_CONFIG` when set.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("VIBE_CONFIG") {
        if !explicit.trim().is_empty() {
            return Some(PathBuf::from(explicit));
        }
    }
    directories::ProjectDirs::from("dev", "Vibe Coder", "VibeCoder")
        .map(|proj| proj.config_dir().join("settings.json"))
}

/// Read settings from `path`. A missing file means defaults; a file that
/// exists but cannot be read or parsed is an error.
pub fn load_settings(path: Option<&Path>) -> Result<StreamSettings> {
    let Some(path) = path else {
        return Ok(StreamSettings::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(StreamSettings::default());
    }
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Overlay values from the environment. `lookup` is `std::env::var` in the
/// binary and a map in tests.
pub fn apply_env_overrides(settings: &mut StreamSettings, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(provider) = get("VIBE_PROVIDER") {
        match ProviderKind::parse(&provider) {
            Some(kind) => settings.provider = kind,
            None => tracing::warn!(%provider, "unknown VIBE_PROVIDER, keeping {}", settings.provider.as_str()),
        }
    }

    let targets = [
        ("OPENAI", &mut settings.openai),
        ("GEMINI", &mut settings.gemini),
    ];
    for (prefix, endpoint) in targets {
        if let Some(key) = get(&format!("{}_API_KEY", prefix)) {
            endpoint.api_key = Some(key);
        }
        if let Some(url) = get(&format!("{}_BASE_URL", prefix)) {
            endpoint.base_url = url;
        }
        if let Some(model) = get(&format!("{}_MODEL", prefix)) {
            endpoint.model = model;
        }
    }
}

pub fn load_from_environment() -> Result<StreamSettings> {
    let path = config_path();
    let mut settings = load_settings(path.as_deref())?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("settings.json"))).unwrap();
        assert_eq!(settings.provider, ProviderKind::OpenAI);
        assert_eq!(settings.openai.model, "gpt-4o-mini");
        assert!(load_settings(None).is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"provider":"gemini","gemini":{"base_url":"http://localhost:9","model":"g-test"}}"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.provider, ProviderKind::Gemini);
        assert_eq!(settings.active_endpoint().model, "g-test");
        assert!(settings.gemini.api_key.is_none());
        assert_eq!(settings.generation.max_output_tokens, 8192);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_settings(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("parsing"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("VIBE_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "g-123"),
            ("OPENAI_BASE_URL", "http://proxy.local"),
            ("OPENAI_MODEL", "  "),
        ]);
        let mut settings = StreamSettings::default();
        apply_env_overrides(&mut settings, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.provider, ProviderKind::Gemini);
        assert_eq!(settings.gemini.credential(), Some("g-123"));
        assert_eq!(settings.openai.base_url, "http://proxy.local");
        assert_eq!(settings.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_unknown_provider_ignored() {
        let mut settings = StreamSettings::default();
        apply_env_overrides(&mut settings, |k| (k == "VIBE_PROVIDER").then(|| "bard".to_string()));
        assert_eq!(settings.provider, ProviderKind::OpenAI);
    }
}
