//! `trend` command: one aggregation pass over the live feed, printed as JSON.

use std::time::Duration;

use clap::Args;

use buzzmint_core::{AppConfig, MomentTable, Stoplist};
use buzzmint_enrich::EnrichClient;
use buzzmint_feed::{FeedClient, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
use buzzmint_signal::{AggregatorOptions, TrendAggregator};

#[derive(Debug, Args)]
pub(crate) struct TrendArgs {
    /// Subreddit to watch.
    #[arg(long)]
    pub subreddit: Option<String>,
    /// Search query within the subreddit.
    #[arg(long)]
    pub q: Option<String>,
    /// Posts to fetch, clamped to 5..=50.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Fetch, score, and classify one batch of posts, then print the summary as
/// pretty JSON on stdout. Upstream failures degrade to an empty summary
/// inside the aggregator, so a dead feed still prints valid JSON.
///
/// # Errors
///
/// Returns an error if config loading or client construction fails.
pub(crate) async fn run(args: TrendArgs) -> anyhow::Result<()> {
    let config = buzzmint_core::load_app_config()?;
    let aggregator = build_aggregator(&config)?;

    let subreddit = args
        .subreddit
        .unwrap_or_else(|| config.default_subreddit.clone());
    let q = args.q.unwrap_or_else(|| config.default_query.clone());
    let limit = args
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(MIN_LIMIT, MAX_LIMIT);

    let summary = aggregator.aggregate(&subreddit, &q, limit).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Build the same aggregator stack the server runs, from config.
pub(crate) fn build_aggregator(
    config: &AppConfig,
) -> anyhow::Result<TrendAggregator<FeedClient, EnrichClient>> {
    let (table, stoplist) = match buzzmint_core::load_moments_if_present(&config.moments_path)? {
        Some(file) => file.into_parts(),
        None => {
            tracing::debug!(
                path = %config.moments_path.display(),
                "moments file not found, using built-in rules"
            );
            (MomentTable::default(), Stoplist::default())
        }
    };

    let feed = FeedClient::new(
        config.feed_request_timeout_secs,
        &config.feed_user_agent,
        config.feed_max_retries,
        config.feed_retry_backoff_base_ms,
    )?;
    let enrich = EnrichClient::new(config.enrich_request_timeout_secs, &config.feed_user_agent)?;

    Ok(
        TrendAggregator::new(feed, enrich, table, stoplist).with_options(AggregatorOptions {
            concurrency: config.enrich_concurrency,
            lookup_timeout: Duration::from_secs(config.enrich_lookup_timeout_secs),
            ..AggregatorOptions::default()
        }),
    )
}
