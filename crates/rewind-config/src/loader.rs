//! Configuration loader with environment variable substitution.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::RewindConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<RewindConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<RewindConfig, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: RewindConfig = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.rewind`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.capture.text_debounce_ms, 1500);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nmax_actions = 42").unwrap();
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.session.max_actions, 42);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load(Path::new("/nonexistent/rewind.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_env_expansion() {
        unsafe { std::env::set_var("REWIND_TEST_STORE", "/tmp/rewind-test.db") };
        let config = ConfigLoader::load_str("store_path = \"${REWIND_TEST_STORE}\"").unwrap();
        assert_eq!(config.store_path, "/tmp/rewind-test.db");
    }

    #[test]
    fn test_env_missing_is_error() {
        let err =
            ConfigLoader::load_str("store_path = \"${REWIND_DEFINITELY_UNSET}\"").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotSet(_)));
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.rewind/sessions.db");
        assert!(!expanded.starts_with('~'));
    }
}
