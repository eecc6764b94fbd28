use crate::theme::Theme;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "helpscreen";
const APPLICATION: &str = "helpscreen";
const CONFIG_FILE_NAME: &str = "helpscreen.toml";

/// Highest help document version this loader understands
pub const SUPPORTED_VERSION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    pub locale: String,
    pub fallback_locale: String,
    /// Directory holding `help/<locale>/<file>` image resources
    pub resource_root: Option<PathBuf>,
    /// Directory holding `<locale>.toml` translation tables
    pub translations_dir: Option<PathBuf>,
    pub supported_version: f64,
    pub theme: Theme,
}

impl Default for HelpConfig {
    fn default() -> Self {
        HelpConfig {
            locale: "en".to_string(),
            fallback_locale: "en".to_string(),
            resource_root: None,
            translations_dir: None,
            supported_version: SUPPORTED_VERSION,
            theme: Theme::default(),
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Read a config file; missing or malformed files yield the defaults
pub fn load_config(path: &Path) -> HelpConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            if err.kind() != ErrorKind::NotFound {
                log::warn!("Failed to read config file {}: {err}", path.display());
            }
            return HelpConfig::default();
        }
    };
    match toml::from_str::<HelpConfig>(&contents) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Failed to parse config file {}: {err}", path.display());
            HelpConfig::default()
        }
    }
}

/// Write `config` as TOML, creating parent directories
pub fn save_config(path: &Path, config: &HelpConfig) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml = toml::to_string_pretty(config)
        .map_err(|err| io::Error::other(format!("toml serialization error: {err}")))?;

    fs::write(path, toml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: HelpConfig = toml::from_str(
            "locale = \"de\"\nresource_root = \"/srv/snap\"\n[theme]\npadding = 12.0\n",
        )
        .unwrap();
        assert_eq!(config.locale, "de");
        assert_eq!(config.fallback_locale, "en");
        assert_eq!(config.resource_root, Some(PathBuf::from("/srv/snap")));
        assert_eq!(config.theme.padding, 12.0);
        assert_eq!(config.supported_version, SUPPORTED_VERSION);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(Path::new("/nonexistent/helpscreen.toml"));
        assert_eq!(config, HelpConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("helpscreen-config-{}", std::process::id()));
        let path = dir.join(CONFIG_FILE_NAME);
        let mut config = HelpConfig::default();
        config.locale = "fr".to_string();
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);
        let _ = fs::remove_dir_all(&dir);
    }
}
