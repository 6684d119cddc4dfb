//! Configuration file loading

use super::{validation, Config};
use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{info, warn};

/// Load and validate a configuration file
pub fn load_config(path: &str) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read config file '{}': {}", path, e))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path, e))?;

    validation::validate(&config)?;
    Ok(config)
}

/// Load the configuration, creating a default file when none exists
pub fn load_or_create(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        return load_config(path);
    }

    warn!("Config file '{}' not found, creating default config", path);
    let config = Config::default();
    let toml_text = toml::to_string_pretty(&config)?;
    std::fs::write(path, &toml_text)?;
    info!("Created default config file: {}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_roundtrip() -> Result<()> {
        let config = Config::default();
        let toml_text = toml::to_string_pretty(&config)?;

        let mut file = NamedTempFile::new()?;
        write!(file, "{}", toml_text)?;

        let loaded = load_config(file.path().to_str().unwrap())?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/path/nntpd.toml");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_invalid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "invalid toml [[[")?;

        let result = load_config(file.path().to_str().unwrap());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn test_load_config_rejects_invalid_values() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "[limits]\nmax_line_length = 0\n")?;

        assert!(load_config(file.path().to_str().unwrap()).is_err());
        Ok(())
    }

    #[test]
    fn test_load_or_create_writes_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nntpd.toml");
        let path_str = path.to_str().unwrap();

        let config = load_or_create(path_str)?;
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // Second load reads the file it just wrote
        let reloaded = load_or_create(path_str)?;
        assert_eq!(reloaded, config);
        Ok(())
    }
}
