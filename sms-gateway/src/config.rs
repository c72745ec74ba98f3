//! Configuration module for environment variable parsing.
//!
//! Everything is read once at process start. Nothing here is re-read per
//! request; the resulting [`Config`] is passed explicitly to the server.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::warn;

use crate::auth::AuthorizedSenders;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Senders allowed to trigger processing (`PHONES`)
    pub authorized_senders: AuthorizedSenders,

    /// Port for the web server to listen on
    pub port: u16,

    /// Maximum number of processing handoffs running at once
    pub handoff_concurrency: usize,

    /// RabbitMQ connection URL; when absent, message bodies are only logged
    pub cloudamqp_url: Option<String>,

    /// Outbound messaging credentials (all three must be set)
    pub twilio: Option<TwilioConfig>,

    /// Number to notify once the gateway is up
    pub startup_notify_to: Option<String>,
}

/// Credentials for the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            authorized_senders: AuthorizedSenders::from_csv(
                &env::var("PHONES").unwrap_or_default(),
            ),

            port: parse_or::<u16>("PORT", 8080),

            handoff_concurrency: parse_or::<usize>("HANDOFF_CONCURRENCY", 32).max(1),

            cloudamqp_url: non_empty("CLOUDAMQP_URL"),

            twilio: match (
                non_empty("TWILIO_ACCOUNT_SID"),
                non_empty("TWILIO_AUTH_TOKEN"),
                non_empty("TWILIO_FROM_NUMBER"),
            ) {
                (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioConfig {
                    account_sid,
                    auth_token,
                    from_number,
                }),
                (None, None, None) => None,
                _ => {
                    warn!("twilio_config_incomplete");
                    None
                }
            },

            startup_notify_to: non_empty("STARTUP_NOTIFY_TO"),
        }
    }
}

/// Load `.env` from the working directory into the process environment.
///
/// Variables already set in the environment are not overridden. A missing
/// file yields `Ok(None)`; a file that exists but cannot be read or parsed
/// is an error.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    finish_dotenv(dotenvy::dotenv())
}

/// Like [`load_dotenv`], for an explicit file.
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>> {
    finish_dotenv(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn finish_dotenv(result: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Error loading .env"),
    }
}

/// Parse a variable, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_valid() {
        env::set_var("TEST_PARSE_OR_VALID", "9090");
        assert_eq!(parse_or::<u16>("TEST_PARSE_OR_VALID", 8080), 9090);
        env::remove_var("TEST_PARSE_OR_VALID");
    }

    #[test]
    fn test_parse_or_invalid_uses_default() {
        env::set_var("TEST_PARSE_OR_INVALID", "not-a-port");
        assert_eq!(parse_or::<u16>("TEST_PARSE_OR_INVALID", 8080), 8080);
        env::remove_var("TEST_PARSE_OR_INVALID");
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or::<usize>("NONEXISTENT_VAR", 32), 32);
    }

    fn write_env_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("sms-gateway-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_dotenv_from_sets_variables() {
        let path = write_env_file("valid.env", "TEST_DOTENV_PHONES=+15551234567,+15557654321\n");

        let loaded = load_dotenv_from(&path).unwrap();
        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(
            env::var("TEST_DOTENV_PHONES").unwrap(),
            "+15551234567,+15557654321"
        );

        env::remove_var("TEST_DOTENV_PHONES");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_dotenv_from_does_not_override() {
        env::set_var("TEST_DOTENV_KEEP", "from-process");
        let path = write_env_file("keep.env", "TEST_DOTENV_KEEP=from-file\n");

        load_dotenv_from(&path).unwrap();
        assert_eq!(env::var("TEST_DOTENV_KEEP").unwrap(), "from-process");

        env::remove_var("TEST_DOTENV_KEEP");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_dotenv_from_missing_file() {
        let path = env::temp_dir().join("sms-gateway-definitely-missing.env");
        assert!(load_dotenv_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_dotenv_from_malformed_file_is_error() {
        let path = write_env_file("malformed.env", "THIS IS NOT VALID\n");
        assert!(load_dotenv_from(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_non_empty() {
        env::set_var("TEST_NON_EMPTY_BLANK", "   ");
        assert_eq!(non_empty("TEST_NON_EMPTY_BLANK"), None);
        env::set_var("TEST_NON_EMPTY_SET", "amqp://localhost");
        assert_eq!(non_empty("TEST_NON_EMPTY_SET").as_deref(), Some("amqp://localhost"));
        env::remove_var("TEST_NON_EMPTY_BLANK");
        env::remove_var("TEST_NON_EMPTY_SET");
    }
}
