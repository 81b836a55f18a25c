use std::fmt;
use std::time::Duration;

use nn_apply_api::ApiCredentials;
use nn_apply_runtime::SessionConfig;

pub const OWNER_ID_VAR: &str = "context.userId";
pub const TEAM_ID_VAR: &str = "context.teamId";
pub const PROJECT_ID_VAR: &str = "modal.state.slyProjectId";
pub const TASK_ID_VAR: &str = "TASK_ID";
pub const SERVER_ADDRESS_VAR: &str = "SERVER_ADDRESS";
pub const API_TOKEN_VAR: &str = "API_TOKEN";
pub const REQUEST_TIMEOUT_VAR: &str = "NN_APPLY_REQUEST_TIMEOUT";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for '{key}': expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Startup configuration, read once from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub server_address: String,
    pub credentials: ApiCredentials,
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let id = |key: &'static str| -> Result<u64, ConfigError> {
            let value = required(key)?;
            value.parse().map_err(|_| ConfigError::Invalid {
                key,
                value,
                expected: "a numeric id",
            })
        };

        let session = SessionConfig {
            owner_id: id(OWNER_ID_VAR)?,
            team_id: id(TEAM_ID_VAR)?,
            project_id: id(PROJECT_ID_VAR)?,
            task_id: id(TASK_ID_VAR)?,
        };
        let server_address = required(SERVER_ADDRESS_VAR)?;
        let credentials = lookup(API_TOKEN_VAR)
            .unwrap_or_default()
            .trim()
            .parse::<ApiCredentials>()
            .map_err(|_| ConfigError::Missing(API_TOKEN_VAR))?;

        let request_timeout = match lookup(REQUEST_TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            None => None,
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid {
                        key: REQUEST_TIMEOUT_VAR,
                        value,
                        expected: "a number of seconds",
                    })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            session,
            server_address,
            credentials,
            request_timeout,
        })
    }
}

// The token is never printed.
impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "server address: {}", self.server_address)?;
        writeln!(f, "owner id:       {}", self.session.owner_id)?;
        writeln!(f, "team id:        {}", self.session.team_id)?;
        writeln!(f, "project id:     {}", self.session.project_id)?;
        writeln!(f, "task id:        {}", self.session.task_id)?;
        match self.request_timeout {
            Some(timeout) => write!(f, "request timeout: {}s", timeout.as_secs()),
            None => write!(f, "request timeout: default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (OWNER_ID_VAR, "7"),
            (TEAM_ID_VAR, "8"),
            (PROJECT_ID_VAR, "42"),
            (TASK_ID_VAR, "1001"),
            (SERVER_ADDRESS_VAR, "https://app.example.com"),
            (API_TOKEN_VAR, "secret-token"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn reads_complete_environment() {
        let config = load(&env()).unwrap();

        assert_eq!(
            config.session,
            SessionConfig {
                owner_id: 7,
                team_id: 8,
                project_id: 42,
                task_id: 1001,
            }
        );
        assert_eq!(config.server_address, "https://app.example.com");
        assert_eq!(config.request_timeout, None);
    }

    #[rstest]
    #[case(OWNER_ID_VAR)]
    #[case(TEAM_ID_VAR)]
    #[case(PROJECT_ID_VAR)]
    #[case(TASK_ID_VAR)]
    #[case(SERVER_ADDRESS_VAR)]
    #[case(API_TOKEN_VAR)]
    fn missing_variable_fails(#[case] key: &'static str) {
        let mut env = env();
        env.remove(key);

        assert_eq!(load(&env).err(), Some(ConfigError::Missing(key)));
    }

    #[rstest]
    #[case(OWNER_ID_VAR, "seven")]
    #[case(PROJECT_ID_VAR, "-1")]
    #[case(TASK_ID_VAR, "12.5")]
    fn non_numeric_id_fails(#[case] key: &'static str, #[case] value: &'static str) {
        let mut env = env();
        env.insert(key, value);

        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { key: k, .. }) if k == key
        ));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut env = env();
        env.insert(API_TOKEN_VAR, "  ");

        assert_eq!(load(&env).err(), Some(ConfigError::Missing(API_TOKEN_VAR)));
    }

    #[test]
    fn optional_timeout_is_parsed() {
        let mut env = env();
        env.insert(REQUEST_TIMEOUT_VAR, "120");
        assert_eq!(
            load(&env).unwrap().request_timeout,
            Some(Duration::from_secs(120))
        );

        env.insert(REQUEST_TIMEOUT_VAR, "soon");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                key: REQUEST_TIMEOUT_VAR,
                ..
            })
        ));
    }

    #[test]
    fn display_hides_the_token() {
        let printed = load(&env()).unwrap().to_string();

        assert!(printed.contains("project id:     42"));
        assert!(!printed.contains("secret-token"));
    }
}
