//! Environment-backed application configuration.

use std::env;
use std::fmt;

use thiserror::Error;

const PB_TOKEN_VAR: &str = "PUSHFERRY_PB_TOKEN";
const DEVICE_NICKNAME_VAR: &str = "PUSHFERRY_DEVICE_NICKNAME";
const TRANSMISSION_URL_VAR: &str = "PUSHFERRY_TRANSMISSION_URL";
const TRANSMISSION_USER_VAR: &str = "PUSHFERRY_TRANSMISSION_USER";
const TRANSMISSION_PASSWORD_VAR: &str = "PUSHFERRY_TRANSMISSION_PASSWORD";

const DEFAULT_DEVICE_NICKNAME: &str = "pushferry";

/// Error type for configuration loading. Fatal: no cycle runs without a
/// complete configuration.
#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable is set to an unusable value.
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        var: &'static str,
        reason: String,
    },
}

/// Application configuration resolved from the process environment.
pub(crate) struct Config {
    /// Pushbullet API access token.
    pub pushbullet_token: String,
    /// Nickname of the device this service consumes messages for.
    pub device_nickname: String,
    /// Transmission RPC URL; `None` means the client default.
    pub transmission_url: Option<String>,
    /// Optional basic-auth pair for Transmission.
    pub transmission_auth: Option<(String, String)>,
}

impl Config {
    /// Load configuration from the process environment.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pushbullet_token = lookup(PB_TOKEN_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar(PB_TOKEN_VAR))?;
        let device_nickname = lookup(DEVICE_NICKNAME_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DEVICE_NICKNAME.to_string());
        let transmission_url = lookup(TRANSMISSION_URL_VAR).filter(|v| !v.is_empty());

        let transmission_auth = match (
            lookup(TRANSMISSION_USER_VAR),
            lookup(TRANSMISSION_PASSWORD_VAR),
        ) {
            (Some(user), Some(password)) => Some((user, password)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    var: TRANSMISSION_PASSWORD_VAR,
                    reason: format!("must be set together with {TRANSMISSION_USER_VAR}"),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    var: TRANSMISSION_USER_VAR,
                    reason: format!("must be set together with {TRANSMISSION_PASSWORD_VAR}"),
                });
            }
        };

        Ok(Self {
            pushbullet_token,
            device_nickname,
            transmission_url,
            transmission_auth,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print credentials.
        write!(
            f,
            "Config(token=<{}>, device=\"{}\", transmission_url={:?}, auth=<{}>)",
            if self.pushbullet_token.is_empty() { "unset" } else { "set" },
            self.device_nickname,
            self.transmission_url,
            if self.transmission_auth.is_some() { "set" } else { "unset" },
        )
    }
}
