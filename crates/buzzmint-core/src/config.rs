use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
///
/// Every variable has a default; a config with no environment at all is valid
/// (the X bearer token stays unset and publishing reports itself unconfigured).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("BUZZMINT_ENV", "development"));
    let bind_addr = parse_addr("BUZZMINT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BUZZMINT_LOG_LEVEL", "info");
    let moments_path = PathBuf::from(or_default(
        "BUZZMINT_MOMENTS_PATH",
        "./config/moments.yaml",
    ));

    let default_subreddit = or_default("BUZZMINT_DEFAULT_SUBREDDIT", "nfl");
    let default_query = or_default("BUZZMINT_DEFAULT_QUERY", "super bowl");

    let feed_request_timeout_secs = parse_u64("BUZZMINT_FEED_REQUEST_TIMEOUT_SECS", "15")?;
    let feed_user_agent = or_default(
        "BUZZMINT_FEED_USER_AGENT",
        "buzzmint/0.1 (live-buzz-promos)",
    );
    let feed_max_retries = parse_u32("BUZZMINT_FEED_MAX_RETRIES", "2")?;
    let feed_retry_backoff_base_ms = parse_u64("BUZZMINT_FEED_RETRY_BACKOFF_BASE_MS", "500")?;

    let enrich_request_timeout_secs = parse_u64("BUZZMINT_ENRICH_REQUEST_TIMEOUT_SECS", "10")?;
    let enrich_lookup_timeout_secs = parse_u64("BUZZMINT_ENRICH_LOOKUP_TIMEOUT_SECS", "3")?;
    let enrich_concurrency = parse_usize("BUZZMINT_ENRICH_CONCURRENCY", "4")?;

    let compose_width = parse_u32("BUZZMINT_COMPOSE_WIDTH", "1024")?;
    let compose_height = parse_u32("BUZZMINT_COMPOSE_HEIGHT", "1024")?;

    let x_bearer_token = lookup("BUZZMINT_X_BEARER_TOKEN").ok();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        moments_path,
        default_subreddit,
        default_query,
        feed_request_timeout_secs,
        feed_user_agent,
        feed_max_retries,
        feed_retry_backoff_base_ms,
        enrich_request_timeout_secs,
        enrich_lookup_timeout_secs,
        enrich_concurrency,
        compose_width,
        compose_height,
        x_bearer_token,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_development() {
        assert_eq!(parse_environment("development"), Environment::Development);
    }

    #[test]
    fn parse_environment_test() {
        assert_eq!(parse_environment("test"), Environment::Test);
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("unknown"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.default_subreddit, "nfl");
        assert_eq!(cfg.default_query, "super bowl");
        assert_eq!(cfg.feed_request_timeout_secs, 15);
        assert_eq!(cfg.feed_user_agent, "buzzmint/0.1 (live-buzz-promos)");
        assert_eq!(cfg.feed_max_retries, 2);
        assert_eq!(cfg.feed_retry_backoff_base_ms, 500);
        assert_eq!(cfg.enrich_request_timeout_secs, 10);
        assert_eq!(cfg.enrich_lookup_timeout_secs, 3);
        assert_eq!(cfg.enrich_concurrency, 4);
        assert_eq!(cfg.compose_width, 1024);
        assert_eq!(cfg.compose_height, 1024);
        assert!(cfg.x_bearer_token.is_none());
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZMINT_BIND_ADDR"),
            "expected InvalidEnvVar(BUZZMINT_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_feed_timeout_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_FEED_REQUEST_TIMEOUT_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.feed_request_timeout_secs, 60);
    }

    #[test]
    fn build_app_config_feed_timeout_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_FEED_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZMINT_FEED_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(BUZZMINT_FEED_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_user_agent_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_FEED_USER_AGENT", "custom-agent/2.0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.feed_user_agent, "custom-agent/2.0");
    }

    #[test]
    fn build_app_config_enrich_concurrency_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_ENRICH_CONCURRENCY", "8");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.enrich_concurrency, 8);
    }

    #[test]
    fn build_app_config_enrich_concurrency_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_ENRICH_CONCURRENCY", "lots");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZMINT_ENRICH_CONCURRENCY"),
            "expected InvalidEnvVar(BUZZMINT_ENRICH_CONCURRENCY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_compose_dims_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_COMPOSE_WIDTH", "512");
        map.insert("BUZZMINT_COMPOSE_HEIGHT", "768");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.compose_width, 512);
        assert_eq!(cfg.compose_height, 768);
    }

    #[test]
    fn build_app_config_reads_bearer_token() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_X_BEARER_TOKEN", "tok-123");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.x_bearer_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn build_app_config_max_retries_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("BUZZMINT_FEED_MAX_RETRIES", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUZZMINT_FEED_MAX_RETRIES"),
            "expected InvalidEnvVar(BUZZMINT_FEED_MAX_RETRIES), got: {result:?}"
        );
    }
}
