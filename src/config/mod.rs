use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::scheme::SchemeClassMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

pub(crate) const APP_DIR: &str = "schemekit";
const APP_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_STORAGE_KEY: &str = "color-scheme-preference";

/// Raw `config.json` contents; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawSchemeConfig {
    #[serde(default)]
    light_class: Option<String>,
    #[serde(default)]
    dark_class: Option<String>,
    #[serde(default)]
    storage_key: Option<String>,
}

/// Immutable engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeConfig {
    classes: SchemeClassMap,
    storage_key: String,
}

impl SchemeConfig {
    /// Builds a config from optional overrides.
    ///
    /// The class identifiers are only taken as a pair; a missing, blank or
    /// duplicated identifier keeps both defaults.
    pub fn from_overrides(
        light_class: Option<&str>,
        dark_class: Option<&str>,
        storage_key: Option<&str>,
    ) -> Self {
        let classes = match (light_class, dark_class) {
            (Some(light), Some(dark)) => SchemeClassMap::new(light, dark).unwrap_or_else(|| {
                tracing::warn!(light, dark, "invalid scheme class identifiers; using defaults");
                SchemeClassMap::default()
            }),
            (None, None) => SchemeClassMap::default(),
            (light, dark) => {
                tracing::warn!(?light, ?dark, "incomplete scheme class identifiers; using defaults");
                SchemeClassMap::default()
            }
        };

        let storage_key = match storage_key.map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            Some(_) => {
                tracing::warn!("empty storage key; using default");
                DEFAULT_STORAGE_KEY.to_string()
            }
            None => DEFAULT_STORAGE_KEY.to_string(),
        };

        Self {
            classes,
            storage_key,
        }
    }

    pub fn classes(&self) -> &SchemeClassMap {
        &self.classes
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            classes: SchemeClassMap::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl From<RawSchemeConfig> for SchemeConfig {
    fn from(raw: RawSchemeConfig) -> Self {
        Self::from_overrides(
            raw.light_class.as_deref(),
            raw.dark_class.as_deref(),
            raw.storage_key.as_deref(),
        )
    }
}

pub fn load_scheme_config() -> SchemeConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_scheme_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_scheme_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> SchemeConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return SchemeConfig::default(),
    };
    if !path.exists() {
        return SchemeConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str::<RawSchemeConfig>(&contents)
            .map(SchemeConfig::from)
            .unwrap_or_else(|err| {
                tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
                SchemeConfig::default()
            }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            SchemeConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("schemekit-config-{pid}-{nanos}"));
        path
    }

    fn with_config_file<F: FnOnce(&Path)>(contents: &str, f: F) {
        let root = fixture_root();
        let path = app_config_path(APP_DIR, APP_CONFIG_FILE, Some(&root), None).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "schemekit",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/schemekit/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("schemekit", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/schemekit/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("schemekit", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = SchemeConfig::default();
        assert_eq!(config.classes().light(), "light-scheme");
        assert_eq!(config.classes().dark(), "dark-scheme");
        assert_eq!(config.storage_key(), "color-scheme-preference");
    }

    #[test]
    fn overrides_require_both_identifiers() {
        let config = SchemeConfig::from_overrides(Some("day"), None, Some("theme"));
        assert_eq!(config.classes(), &SchemeClassMap::default());
        assert_eq!(config.storage_key(), "theme");

        let config = SchemeConfig::from_overrides(Some("day"), Some("night"), None);
        assert_eq!(config.classes().light(), "day");
        assert_eq!(config.classes().dark(), "night");
        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn blank_storage_key_falls_back_to_default() {
        let config = SchemeConfig::from_overrides(None, None, Some("   "));
        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let root = fixture_root();
        let config = load_scheme_config_with(Some(&root), None);
        assert_eq!(config, SchemeConfig::default());
    }

    #[test]
    fn config_file_overrides_identifiers_and_key() {
        with_config_file(
            r#"{"light_class": "day", "dark_class": "night", "storage_key": "ui.scheme"}"#,
            |root| {
                let config = load_scheme_config_with(Some(root), None);
                assert_eq!(config.classes().light(), "day");
                assert_eq!(config.classes().dark(), "night");
                assert_eq!(config.storage_key(), "ui.scheme");
            },
        );
    }

    #[test]
    fn unparseable_config_file_uses_defaults() {
        with_config_file("{ invalid ", |root| {
            let config = load_scheme_config_with(Some(root), None);
            assert_eq!(config, SchemeConfig::default());
        });
    }
}
