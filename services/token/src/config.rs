use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// API key the room service knows us by; becomes the token issuer.
    pub api_key: String,
    /// Shared secret used to sign tokens.
    pub api_secret: String,
    /// Base URL of the room service, for the occupancy query. When unset,
    /// every room is treated as empty.
    pub room_service_url: Option<String>,
    /// Occupancy cap enforced before minting.
    pub max_participants: usize,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let api_key = std::env::var("NEVIRA_API_KEY")
            .map_err(|_| ConfigError::MissingVar("NEVIRA_API_KEY".to_string()))?;
        let api_secret = std::env::var("NEVIRA_API_SECRET")
            .map_err(|_| ConfigError::MissingVar("NEVIRA_API_SECRET".to_string()))?;

        let room_service_url = std::env::var("ROOM_SERVICE_URL").ok();

        let max_participants = match std::env::var("MAX_PARTICIPANTS") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_PARTICIPANTS".to_string(),
                    format!("'{}' is not a valid participant count", raw),
                )
            })?,
            Err(_) => 2,
        };

        let token_ttl_secs = match std::env::var("TOKEN_TTL_SECS") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "TOKEN_TTL_SECS".to_string(),
                    format!("'{}' is not a valid duration in seconds", raw),
                )
            })?,
            Err(_) => 600,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            api_key,
            api_secret,
            room_service_url,
            max_participants,
            token_ttl_secs,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("NEVIRA_API_KEY");
            env::remove_var("NEVIRA_API_SECRET");
            env::remove_var("ROOM_SERVICE_URL");
            env::remove_var("MAX_PARTICIPANTS");
            env::remove_var("TOKEN_TTL_SECS");
            env::remove_var("RUST_LOG");
        }
    }

    fn set_minimal_env() {
        unsafe {
            env::set_var("NEVIRA_API_KEY", "test-key");
            env::set_var("NEVIRA_API_SECRET", "test-secret");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal() {
        clear_env_vars();
        set_minimal_env();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:8787");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.api_secret, "test-secret");
        assert_eq!(config.room_service_url, None);
        assert_eq!(config.max_participants, 2);
        assert_eq!(config.token_ttl_secs, 600);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:9900");
            env::set_var("ROOM_SERVICE_URL", "https://rooms.example.test");
            env::set_var("MAX_PARTICIPANTS", "8");
            env::set_var("TOKEN_TTL_SECS", "120");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:9900");
        assert_eq!(
            config.room_service_url.as_deref(),
            Some("https://rooms.example.test")
        );
        assert_eq!(config.max_participants, 8);
        assert_eq!(config.token_ttl_secs, 120);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_config_missing_api_key_fails() {
        clear_env_vars();
        unsafe {
            env::set_var("NEVIRA_API_SECRET", "test-secret");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "NEVIRA_API_KEY"),
            _ => panic!("Expected MissingVar for NEVIRA_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_api_secret_fails() {
        clear_env_vars();
        unsafe {
            env::set_var("NEVIRA_API_KEY", "test-key");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "NEVIRA_API_SECRET"),
            _ => panic!("Expected MissingVar for NEVIRA_API_SECRET"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_max_participants() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("MAX_PARTICIPANTS", "lots");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAX_PARTICIPANTS"),
            _ => panic!("Expected InvalidValue for MAX_PARTICIPANTS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }
}
