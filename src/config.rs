use crate::models::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = ".stratumrc";

/// Load configuration from file or use defaults
///
/// Search order:
/// 1. Custom path if provided via --config
/// 2. .stratumrc in current directory
/// 3. ~/.stratumrc in home directory
/// 4. Built-in defaults
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    // If custom path provided, use it exclusively
    if let Some(path) = custom_path {
        return load_config_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let current_config = PathBuf::from(CONFIG_FILE);
    if current_config.exists() {
        return load_config_from_file(&current_config);
    }

    if let Some(home_config) = get_home_config_path() {
        if home_config.exists() {
            return load_config_from_file(&home_config);
        }
    }

    Ok(Config::default())
}

/// Load config from a specific file
fn load_config_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Get path to home directory config file
fn get_home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}

/// Parse the configured blame timeout
pub fn blame_timeout(config: &Config) -> Result<Duration> {
    humantime::parse_duration(&config.timeout)
        .with_context(|| format!("Invalid timeout: {}", config.timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;
    use crate::history::Traversal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_custom_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
marker = "FIXME"
ignored_dirs = [".git", "custom_ignore"]
timeout = "2m"
stop_after = 5
traversal = "first-parent"

[[languages.ini]]
start = ";"
end = "\n"
"#;
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.marker, "FIXME");
        assert_eq!(config.ignored_dirs.len(), 2);
        assert_eq!(config.stop_after, Some(5));
        assert_eq!(config.traversal, Traversal::FirstParent);
        assert_eq!(config.languages["ini"], vec![Boundary::new(";", "\n")]);
        assert_eq!(blame_timeout(&config).unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"stop_after = 3\n").unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.marker, "TODO");
        assert_eq!(config.timeout, "30s");
        assert_eq!(config.traversal, Traversal::AllParents);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"stop_after = \"many\"\n").unwrap();
        assert!(load_config(Some(temp_file.path())).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let config = Config {
            timeout: "eventually".to_string(),
            ..Config::default()
        };
        assert!(blame_timeout(&config).is_err());
    }
}
