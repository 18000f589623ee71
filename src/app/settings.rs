use super::config::Config;
use crate::page::theme::Theme;
use crate::sync::format::DisplayOptions;
use crate::sync::poll::PollOptions;
use std::time::Duration;

/// Validation errors for configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Endpoint is not an absolute http(s) URL
    InvalidEndpoint { endpoint: String, reason: String },
    /// Poll interval must be positive
    ZeroInterval,
    /// Request timeout, when set, must be positive
    ZeroTimeout,
    /// Theme is neither light, dark nor empty
    UnknownTheme(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidEndpoint { endpoint, reason } => {
                write!(f, "Poll endpoint '{}' is invalid: {}", endpoint, reason)
            }
            ValidationError::ZeroInterval => {
                write!(f, "Poll interval must be greater than 0 ms")
            }
            ValidationError::ZeroTimeout => {
                write!(f, "Request timeout must be greater than 0 seconds")
            }
            ValidationError::UnknownTheme(theme) => {
                write!(f, "Theme '{}' is not one of: light, dark", theme)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = PollOptions::parse_endpoint(&config.poll.endpoint) {
        let reason = match e {
            crate::sync::SyncError::InvalidEndpoint { reason, .. } => reason,
            other => other.to_string(),
        };
        errors.push(ValidationError::InvalidEndpoint {
            endpoint: config.poll.endpoint.clone(),
            reason,
        });
    }

    if config.poll.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    if config.poll.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    let theme = config.general.theme.as_str();
    if !theme.is_empty() && theme.parse::<Theme>().is_err() {
        errors.push(ValidationError::UnknownTheme(theme.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Poll settings after applying command-line overrides on top of the config
#[derive(Debug, Clone)]
pub struct ResolvedPollSettings {
    pub options: PollOptions,
    pub user_agent: String,
    pub request_timeout: Option<Duration>,
}

impl ResolvedPollSettings {
    /// Resolve settings: command line > config file > defaults
    pub fn resolve(
        config: &Config,
        endpoint: Option<&str>,
        interval_ms: Option<u64>,
    ) -> anyhow::Result<Self> {
        let endpoint = endpoint.unwrap_or(&config.poll.endpoint);
        let endpoint = PollOptions::parse_endpoint(endpoint)?;

        let interval_ms = interval_ms.unwrap_or(config.poll.interval_ms);
        if interval_ms == 0 {
            return Err(anyhow::anyhow!(ValidationError::ZeroInterval));
        }

        let mut options = PollOptions::new(endpoint);
        options.interval = Duration::from_millis(interval_ms);
        options.discard_stale_ticks = config.poll.discard_stale_ticks;
        options.display = DisplayOptions {
            utc_times: config.display.utc_times,
        };

        Ok(Self {
            options,
            user_agent: config.network.user_agent.clone(),
            request_timeout: config
                .poll
                .request_timeout_secs
                .map(Duration::from_secs),
        })
    }
}
