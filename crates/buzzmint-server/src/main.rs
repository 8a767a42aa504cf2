mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use buzzmint_core::{AppConfig, MomentTable, Stoplist};
use buzzmint_signal::{AggregatorOptions, TrendAggregator};

use crate::{
    api::{build_app, default_rate_limit_state, AppState, RequestDefaults},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = buzzmint_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let (table, stoplist) = load_moment_rules(&config)?;

    let feed = buzzmint_feed::FeedClient::new(
        config.feed_request_timeout_secs,
        &config.feed_user_agent,
        config.feed_max_retries,
        config.feed_retry_backoff_base_ms,
    )?;
    let enrich = buzzmint_enrich::EnrichClient::new(
        config.enrich_request_timeout_secs,
        &config.feed_user_agent,
    )?;
    let aggregator =
        TrendAggregator::new(feed, enrich, table, stoplist).with_options(AggregatorOptions {
            concurrency: config.enrich_concurrency,
            lookup_timeout: Duration::from_secs(config.enrich_lookup_timeout_secs),
            ..AggregatorOptions::default()
        });
    let composer = buzzmint_composer::Composer::new(
        config.enrich_request_timeout_secs,
        &config.feed_user_agent,
    )?;
    let publisher = buzzmint_publish::PublishClient::new(config.x_bearer_token.clone(), 15)?;
    if !publisher.is_configured() {
        tracing::info!("no publisher token set, /api/v1/publish will report not_configured");
    }

    let auth = AuthState::from_env(matches!(
        config.env,
        buzzmint_core::Environment::Development
    ))?;
    let state = AppState {
        aggregator: Arc::new(aggregator),
        composer,
        publisher,
        defaults: Arc::new(RequestDefaults {
            subreddit: config.default_subreddit.clone(),
            query: config.default_query.clone(),
            width: config.compose_width,
            height: config.compose_height,
        }),
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "buzzmint server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Load the moment table, falling back to the built-ins when the configured
/// file does not exist. Any other failure (unreadable file, bad YAML) aborts
/// startup instead of silently running with defaults.
fn load_moment_rules(config: &AppConfig) -> anyhow::Result<(MomentTable, Stoplist)> {
    match buzzmint_core::load_moments_if_present(&config.moments_path)? {
        Some(file) => {
            let (table, stoplist) = file.into_parts();
            tracing::info!(
                path = %config.moments_path.display(),
                rules = table.rules.len(),
                "loaded moment rules"
            );
            Ok((table, stoplist))
        }
        None => {
            tracing::info!(
                path = %config.moments_path.display(),
                "moments file not found, using built-in rules"
            );
            Ok((MomentTable::default(), Stoplist::default()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
