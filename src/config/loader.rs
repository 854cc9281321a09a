use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazyarticles";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the config at `path`, falling back to defaults when there is none.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_from(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let Some(path) = path else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };

    if !path.exists() {
        debug!("Config file not found at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Write `config` to `path`, creating the parent directory if needed.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_to(path: &Path, config: &AppConfig) -> color_eyre::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.exists()
    {
        fs::create_dir_all(dir)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    debug!("Saved config to {:?}", path);
    Ok(())
}

/// Remember the last user that signed in, keeping the rest of the file.
///
/// # Errors
/// Returns an error if the config cannot be written.
pub fn save_last_username(path: Option<&Path>, username: &str) -> color_eyre::Result<()> {
    let Some(path) = path else {
        warn!("Could not determine config directory");
        return Ok(());
    };

    let mut config = load_from(Some(path)).unwrap_or_default();
    config.last_username = Some(username.to_string());
    save_to(path, &config)
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use super::*;
    use crate::config::DEFAULT_BASE_URL;
    use crate::config::key::{Key, KeyBinding};

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(Some(&dir.path().join("config.toml"))).unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.articles.topics, ["JavaScript", "React", "Node"]);
        assert!(config.last_username.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[api]
base_url = "https://articles.example.com/api"

[keybindings.global]
logout = "ctrl+l"
"#,
        )
        .unwrap();

        let config = load_from(Some(&path)).unwrap();

        assert_eq!(config.api.base_url, "https://articles.example.com/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(
            config.keybindings.global.logout,
            KeyBinding::from(Key::with_ctrl(KeyCode::Char('l')))
        );
        assert_eq!(
            config.keybindings.global.quit,
            KeyBinding::from(KeyCode::Char('q'))
        );
        assert_eq!(config.theme.name, "Catppuccin Mocha");
    }

    #[test]
    fn invalid_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[keybindings.global]\nquit = \"hyper+q\"\n").unwrap();

        assert!(load_from(Some(&path)).is_err());
    }

    #[test]
    fn save_last_username_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.articles.topics = vec!["Rust".to_string()];
        save_to(&path, &config).unwrap();

        save_last_username(Some(&path), "foo").unwrap();

        let reloaded = load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.last_username.as_deref(), Some("foo"));
        assert_eq!(reloaded.articles.topics, ["Rust"]);
    }
}
