//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Environment variable prefix shared by every setting.
const ENV_PREFIX: &str = "MOCK_INTERVIEW_";

/// Timing and policy knobs for the page flow.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Delay before the simulated interviewer replies.
    pub reply_delay: Duration,
    /// Simulated latency after the report is handed off.
    pub submit_delay: Duration,
    /// Pause between the "submitted" toast and the redirect to thank-you.
    pub redirect_delay: Duration,
    /// Simulated latency between signup submission and the interview page.
    pub signup_delay: Duration,
    /// Minimum transcript entries required before finishing. `None` disables the gate.
    pub min_transcript_len: Option<usize>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1500),
            submit_delay: Duration::from_millis(2000),
            redirect_delay: Duration::from_millis(1500),
            signup_delay: Duration::from_millis(1000),
            min_transcript_len: Some(3),
        }
    }
}

impl FlowConfig {
    /// Config with every delay set to zero, for tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            reply_delay: Duration::ZERO,
            submit_delay: Duration::ZERO,
            redirect_delay: Duration::ZERO,
            signup_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Build from `MOCK_INTERVIEW_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let min = env_parse::<usize>("MIN_TRANSCRIPT")?
            .map(|n| if n == 0 { None } else { Some(n) })
            .unwrap_or(defaults.min_transcript_len);

        Ok(Self {
            reply_delay: env_millis("REPLY_DELAY_MS")?.unwrap_or(defaults.reply_delay),
            submit_delay: env_millis("SUBMIT_DELAY_MS")?.unwrap_or(defaults.submit_delay),
            redirect_delay: env_millis("REDIRECT_DELAY_MS")?.unwrap_or(defaults.redirect_delay),
            signup_delay: env_millis("SIGNUP_DELAY_MS")?.unwrap_or(defaults.signup_delay),
            min_transcript_len: min,
        })
    }
}

/// Where completion records are sent.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Sent as a bearer token when present.
    pub token: Option<SecretString>,
    pub timeout: Duration,
}

/// Process-level settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// libSQL database file, or `:memory:` for an ephemeral store.
    pub db_path: PathBuf,
    /// Scope for the persisted keys (one logical browser tab).
    pub session_id: String,
    /// `None` means records are only logged.
    pub webhook: Option<WebhookConfig>,
    /// Directory for a daily rolling log file, in addition to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/mock-interview.db"),
            session_id: "default".to_string(),
            webhook: None,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let webhook = match env_var("WEBHOOK_URL") {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        key: format!("{ENV_PREFIX}WEBHOOK_URL"),
                        message: format!("expected an http(s) URL, got {url:?}"),
                    });
                }
                let timeout = env_parse::<u64>("WEBHOOK_TIMEOUT_SECS")?.unwrap_or(10);
                Some(WebhookConfig {
                    url,
                    token: env_var("WEBHOOK_TOKEN").map(SecretString::from),
                    timeout: Duration::from_secs(timeout),
                })
            }
            None => {
                if env_var("WEBHOOK_TOKEN").is_some() {
                    return Err(ConfigError::MissingRequired {
                        key: format!("{ENV_PREFIX}WEBHOOK_URL"),
                        hint: "A webhook token was given without a webhook URL.".to_string(),
                    });
                }
                None
            }
        };

        Ok(Self {
            port: env_parse::<u16>("PORT")?.unwrap_or(defaults.port),
            db_path: env_var("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            session_id: env_var("SESSION_ID").unwrap_or(defaults.session_id),
            webhook,
            log_dir: env_var("LOG_DIR").map(PathBuf::from),
        })
    }

    /// Whether the store should live in memory only.
    pub fn is_ephemeral(&self) -> bool {
        self.db_path.as_os_str() == ":memory:"
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: format!("{ENV_PREFIX}{name}"),
                message: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}

fn env_millis(name: &str) -> Result<Option<Duration>, ConfigError> {
    Ok(env_parse::<u64>(name)?.map(Duration::from_millis))
}
