//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Script source file (`.json`, `.yaml` or `.yml`).
    pub script_path: PathBuf,
    /// Experiment arm labels in declaration order.
    pub conditions: Vec<String>,
    /// Fallback arm; the first declared arm when unset.
    pub default_condition: Option<String>,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Enables the PostgreSQL sink when set.
    pub database_url: Option<String>,
    /// Local CSV fallback sink file.
    pub csv_log_path: PathBuf,
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` is not a valid `u16` or
    /// `CONDITIONS` names no arm.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let conditions: Vec<String> = get("CONDITIONS")
            .unwrap_or_else(|| "High_Empathy,High_Expertise".to_owned())
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect();
        if conditions.is_empty() {
            return Err(AppError::Config(
                "CONDITIONS must name at least one condition".to_owned(),
            ));
        }

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        Ok(Self {
            script_path: get("SCRIPT_PATH").map_or_else(|| PathBuf::from("script.json"), PathBuf::from),
            conditions,
            default_condition: get("DEFAULT_CONDITION"),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            database_url: get("DATABASE_URL"),
            csv_log_path: get("CSV_LOG_PATH")
                .map_or_else(|| PathBuf::from("experiment_logs.csv"), PathBuf::from),
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.script_path, PathBuf::from("script.json"));
        assert_eq!(config.conditions, vec!["High_Empathy", "High_Expertise"]);
        assert_eq!(config.default_condition, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.csv_log_path, PathBuf::from("experiment_logs.csv"));
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_values_are_read_and_trimmed() {
        let config = config_from(&[
            ("CONDITIONS", " A , B ,,C"),
            ("DEFAULT_CONDITION", "B"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("SCRIPT_PATH", "scripts/pilot.yaml"),
            ("DATABASE_URL", "postgres://localhost/chatlab"),
        ])
        .unwrap();

        assert_eq!(config.conditions, vec!["A", "B", "C"]);
        assert_eq!(config.default_condition.as_deref(), Some("B"));
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.script_path, PathBuf::from("scripts/pilot.yaml"));
        assert!(config.database_url.is_some());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = config_from(&[("PORT", "eighty")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_conditions_without_labels_is_config_error() {
        let result = config_from(&[("CONDITIONS", " , ,")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_blank_database_url_is_unset() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();

        assert_eq!(config.database_url, None);
    }
}
