use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub moments_path: PathBuf,
    pub default_subreddit: String,
    pub default_query: String,
    pub feed_request_timeout_secs: u64,
    pub feed_user_agent: String,
    pub feed_max_retries: u32,
    pub feed_retry_backoff_base_ms: u64,
    pub enrich_request_timeout_secs: u64,
    pub enrich_lookup_timeout_secs: u64,
    pub enrich_concurrency: usize,
    pub compose_width: u32,
    pub compose_height: u32,
    pub x_bearer_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("moments_path", &self.moments_path)
            .field("default_subreddit", &self.default_subreddit)
            .field("default_query", &self.default_query)
            .field(
                "feed_request_timeout_secs",
                &self.feed_request_timeout_secs,
            )
            .field("feed_user_agent", &self.feed_user_agent)
            .field("feed_max_retries", &self.feed_max_retries)
            .field(
                "feed_retry_backoff_base_ms",
                &self.feed_retry_backoff_base_ms,
            )
            .field(
                "enrich_request_timeout_secs",
                &self.enrich_request_timeout_secs,
            )
            .field(
                "enrich_lookup_timeout_secs",
                &self.enrich_lookup_timeout_secs,
            )
            .field("enrich_concurrency", &self.enrich_concurrency)
            .field("compose_width", &self.compose_width)
            .field("compose_height", &self.compose_height)
            .field(
                "x_bearer_token",
                &self.x_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
