use super::models::Config;
use crate::humanize::ByteSize;
use thiserror::Error;

const MAX_BODY_BYTES: ByteSize = ByteSize::mib(16);

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("max_body_bytes ({actual}) exceeds limit of {limit}")]
    BodyLimitTooLarge { actual: ByteSize, limit: ByteSize },

    #[error("{field} must be positive")]
    ZeroLimit { field: &'static str },

    #[error("http.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("list API path '{0}' must start with '/'")]
    RelativeListApiPath(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_http(config)?;
    validate_extractor(config)?;
    validate_logs(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    let actual = config.server.max_body_bytes;
    if actual.as_u64() == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "server.max_body_bytes",
        });
    }
    if actual > MAX_BODY_BYTES {
        return Err(ValidationError::BodyLimitTooLarge {
            actual,
            limit: MAX_BODY_BYTES,
        });
    }
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }
    if config.http.connect_timeout_secs == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "http.connect_timeout_secs",
        });
    }
    if config.http.page_timeout_secs == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "http.page_timeout_secs",
        });
    }
    Ok(())
}

/// An empty `list_api_paths` is allowed and disables list-API probing.
fn validate_extractor(config: &Config) -> Result<(), ValidationError> {
    let extractor = &config.extractor;

    if extractor.raw_html_limit == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "extractor.raw_html_limit",
        });
    }
    if extractor.max_filename_chars == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "extractor.max_filename_chars",
        });
    }
    if extractor.snippet_chars == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "extractor.snippet_chars",
        });
    }

    if let Some(path) = extractor.list_api_paths.iter().find(|p| !p.starts_with('/')) {
        return Err(ValidationError::RelativeListApiPath(path.clone()));
    }

    Ok(())
}

fn validate_logs(config: &Config) -> Result<(), ValidationError> {
    if config.logs.capacity == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "logs.capacity",
        });
    }
    if config.logs.idle_ttl_secs == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "logs.idle_ttl_secs",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_body_limit_too_large() {
        let mut config = Config::default();
        config.server.max_body_bytes = ByteSize::mib(64);

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::BodyLimitTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyUserAgent)
        ));
    }

    #[test]
    fn test_zero_limits() {
        let mut config = Config::default();
        config.extractor.raw_html_limit = 0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroLimit {
                field: "extractor.raw_html_limit"
            })
        ));

        let mut config = Config::default();
        config.logs.capacity = 0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroLimit {
                field: "logs.capacity"
            })
        ));
    }

    #[test]
    fn test_relative_list_api_path() {
        let mut config = Config::default();
        config.extractor.list_api_paths = vec!["share/list".to_string()];

        assert!(matches!(
            validate(&config),
            Err(ValidationError::RelativeListApiPath(path)) if path == "share/list"
        ));
    }

    #[test]
    fn test_empty_list_api_paths_allowed() {
        let mut config = Config::default();
        config.extractor.list_api_paths.clear();
        assert!(validate(&config).is_ok());
    }
}
