//! Environment validation and importer configuration.
//!
//! All environment access goes through [`Runtime`], read once at startup.
//! Hard problems (an enabled feature missing its credential) are collected
//! and reported together; soft problems disable the feature with a warning.

use log::{error, info, warn};

use crate::runtime::Runtime;

pub const USE_GITHUB_DATA: &str = "USE_GITHUB_DATA";
pub const GITHUB_USERNAME: &str = "GITHUB_USERNAME";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const USE_MEDIUM_DATA: &str = "USE_MEDIUM_DATA";
pub const MEDIUM_USERNAME: &str = "MEDIUM_USERNAME";

/// Validated importer configuration. A `None` source is disabled, either
/// by its toggle or by a soft validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github: Option<GithubConfig>,
    pub medium: Option<MediumConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediumConfig {
    pub username: String,
}

/// All hard validation problems found in one pass.
#[derive(Debug)]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "environment validation failed:")?;
        for problem in &self.problems {
            write!(f, "\n  - {}", problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl Config {
    /// Reads and validates the importer's environment.
    ///
    /// Collects every hard problem before failing rather than stopping at
    /// the first, so one run reports the complete fix list.
    #[tracing::instrument(skip(runtime))]
    pub fn from_runtime<R: Runtime>(runtime: &R) -> Result<Self, ValidationError> {
        let use_github = toggle_enabled(runtime, USE_GITHUB_DATA);
        let use_medium = toggle_enabled(runtime, USE_MEDIUM_DATA);
        let github_username = env_value(runtime, GITHUB_USERNAME);
        let github_token = env_value(runtime, GITHUB_TOKEN);
        let medium_username = env_value(runtime, MEDIUM_USERNAME);

        info!("Validating environment configuration...");
        info!("{}: {}", USE_GITHUB_DATA, use_github);
        info!("{}: {}", USE_MEDIUM_DATA, use_medium);
        info!("{}: {}", GITHUB_USERNAME, presence(&github_username));
        info!("{}: {}", GITHUB_TOKEN, presence(&github_token));
        info!("{}: {}", MEDIUM_USERNAME, presence(&medium_username));

        let mut problems = Vec::new();

        let github = if use_github {
            if github_username.is_none() {
                problems.push(format!(
                    "{} is required when {}=true",
                    GITHUB_USERNAME, USE_GITHUB_DATA
                ));
            }
            if github_token.is_none() {
                problems.push(format!(
                    "{} is required when {}=true",
                    GITHUB_TOKEN, USE_GITHUB_DATA
                ));
            }
            match (github_username, github_token) {
                (Some(username), Some(token)) => Some(GithubConfig { username, token }),
                _ => None,
            }
        } else {
            None
        };

        let medium = if use_medium {
            match medium_username {
                Some(username) => Some(MediumConfig { username }),
                None => {
                    warn!(
                        "{} not set, Medium integration will be disabled",
                        MEDIUM_USERNAME
                    );
                    None
                }
            }
        } else {
            None
        };

        if !problems.is_empty() {
            error!("Environment validation failed:");
            for problem in &problems {
                error!("  - {}", problem);
            }
            return Err(ValidationError { problems });
        }

        info!("Environment validation completed successfully");
        Ok(Config { github, medium })
    }
}

fn toggle_enabled<R: Runtime>(runtime: &R, key: &str) -> bool {
    runtime.env_var(key).is_ok_and(|value| value == "true")
}

fn env_value<R: Runtime>(runtime: &R, key: &str) -> Option<String> {
    runtime.env_var(key).ok().filter(|value| !value.is_empty())
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() { "Set" } else { "Not set" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn mock_env(vars: &[(&str, &str)]) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        for key in [
            USE_GITHUB_DATA,
            GITHUB_USERNAME,
            GITHUB_TOKEN,
            USE_MEDIUM_DATA,
            MEDIUM_USERNAME,
        ] {
            let value = vars
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string());
            runtime
                .expect_env_var()
                .with(eq(key))
                .returning(move |_| value.clone().ok_or(std::env::VarError::NotPresent));
        }
        runtime
    }

    #[test]
    fn test_all_features_disabled() {
        let runtime = mock_env(&[]);
        let config = Config::from_runtime(&runtime).unwrap();
        assert_eq!(config.github, None);
        assert_eq!(config.medium, None);
    }

    #[test]
    fn test_github_fully_configured() {
        let runtime = mock_env(&[
            (USE_GITHUB_DATA, "true"),
            (GITHUB_USERNAME, "alice"),
            (GITHUB_TOKEN, "ghp_secret"),
        ]);
        let config = Config::from_runtime(&runtime).unwrap();
        assert_eq!(
            config.github,
            Some(GithubConfig {
                username: "alice".to_string(),
                token: "ghp_secret".to_string(),
            })
        );
    }

    #[test]
    fn test_github_missing_token_is_hard_error() {
        let runtime = mock_env(&[(USE_GITHUB_DATA, "true"), (GITHUB_USERNAME, "alice")]);
        let err = Config::from_runtime(&runtime).unwrap_err();
        assert_eq!(err.problems.len(), 1);
        assert!(err.problems[0].contains(GITHUB_TOKEN));
        assert!(err.to_string().contains(GITHUB_TOKEN));
    }

    #[test]
    fn test_github_missing_everything_collects_all_problems() {
        let runtime = mock_env(&[(USE_GITHUB_DATA, "true")]);
        let err = Config::from_runtime(&runtime).unwrap_err();
        assert_eq!(err.problems.len(), 2);
        assert!(err.problems[0].contains(GITHUB_USERNAME));
        assert!(err.problems[1].contains(GITHUB_TOKEN));
    }

    #[test]
    fn test_github_toggle_off_ignores_missing_credentials() {
        let runtime = mock_env(&[(USE_GITHUB_DATA, "false")]);
        let config = Config::from_runtime(&runtime).unwrap();
        assert_eq!(config.github, None);
    }

    #[test]
    fn test_toggle_requires_exact_true() {
        let runtime = mock_env(&[(USE_GITHUB_DATA, "TRUE")]);
        let config = Config::from_runtime(&runtime).unwrap();
        assert_eq!(config.github, None);
    }

    #[test]
    fn test_medium_missing_username_is_soft_failure() {
        let runtime = mock_env(&[(USE_MEDIUM_DATA, "true")]);
        let config = Config::from_runtime(&runtime).unwrap();
        assert_eq!(config.medium, None);
    }

    #[test]
    fn test_medium_fully_configured() {
        let runtime = mock_env(&[(USE_MEDIUM_DATA, "true"), (MEDIUM_USERNAME, "bob")]);
        let config = Config::from_runtime(&runtime).unwrap();
        assert_eq!(
            config.medium,
            Some(MediumConfig {
                username: "bob".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let runtime = mock_env(&[
            (USE_GITHUB_DATA, "true"),
            (GITHUB_USERNAME, "alice"),
            (GITHUB_TOKEN, ""),
        ]);
        let err = Config::from_runtime(&runtime).unwrap_err();
        assert!(err.problems[0].contains(GITHUB_TOKEN));
    }
}
