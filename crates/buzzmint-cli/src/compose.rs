//! `compose` command: render a promotional meme PNG to disk.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Args;

use buzzmint_composer::{build_caption, Composer, MemeSpec, MemeStyle, MomentTag};
use buzzmint_core::Vibe;
use buzzmint_feed::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};

/// Most post photos carried into one compose.
const GALLERY_LIMIT: usize = 8;

#[derive(Debug, Args)]
pub(crate) struct ComposeArgs {
    /// Business to promote.
    #[arg(long, default_value = "local pizza shop")]
    pub business: String,
    /// Offer line woven into the meme.
    #[arg(long, default_value = "15% OFF")]
    pub offer: String,
    /// Subreddit to watch.
    #[arg(long)]
    pub subreddit: Option<String>,
    /// Search query within the subreddit.
    #[arg(long)]
    pub q: Option<String>,
    /// Posts to fetch, clamped to 5..=50.
    #[arg(long)]
    pub limit: Option<usize>,
    /// classic, grid, or card.
    #[arg(long, default_value = "classic")]
    pub style: String,
    /// Grid tile count (1, 2, or 4).
    #[arg(long, default_value_t = 4)]
    pub tiles: u8,
    /// Seed the layout and copy draws for a reproducible render.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Vary layout and copy instead of the fixed first variant.
    #[arg(long)]
    pub randomize: bool,
    /// Where to write the PNG.
    #[arg(long, default_value = "meme.png")]
    pub out: PathBuf,
    /// Skip the live feed and compose from the flags alone.
    #[arg(long)]
    pub offline: bool,
}

/// Compose a meme, online (one trend pass feeds the layout) or offline
/// (gradient backgrounds, no moment, neutral mood), and write the PNG.
///
/// # Errors
///
/// Returns an error for an unknown style or tile count, a failed config
/// load or client build, a failed render, or an unwritable output path.
pub(crate) async fn run(args: ComposeArgs) -> anyhow::Result<()> {
    let config = buzzmint_core::load_app_config()?;
    let style = MemeStyle::from_tag(&args.style, args.tiles)?;

    let (vibe, keywords, moment, entity, gallery) = if args.offline {
        (Vibe::Neutral, Vec::new(), None, None, Vec::new())
    } else {
        let aggregator = crate::trend::build_aggregator(&config)?;
        let subreddit = args
            .subreddit
            .clone()
            .unwrap_or_else(|| config.default_subreddit.clone());
        let q = args.q.clone().unwrap_or_else(|| config.default_query.clone());
        let limit = args
            .limit
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(MIN_LIMIT, MAX_LIMIT);
        let summary = aggregator.aggregate(&subreddit, &q, limit).await;

        let mut seen = HashSet::new();
        let gallery: Vec<String> = summary
            .posts
            .iter()
            .flat_map(|post| post.image_urls.iter())
            .filter(|url| seen.insert((*url).clone()))
            .take(GALLERY_LIMIT)
            .cloned()
            .collect();

        (
            summary.vibe,
            summary.keywords,
            summary.top_moment.as_ref().map(MomentTag::from),
            summary.top_entity,
            gallery,
        )
    };

    // Same rule as the HTTP surface: a supplied seed implies randomize.
    let randomize = args.randomize || args.seed.is_some();

    let spec = MemeSpec::builder(args.business, args.offer)
        .moment(moment)
        .entity_profile(entity)
        .vibe(vibe)
        .keywords(keywords.clone())
        .style(style)
        .gallery(gallery)
        .randomize(randomize)
        .seed(args.seed)
        .size(config.compose_width, config.compose_height)
        .build()?;

    let composer = Composer::new(config.enrich_request_timeout_secs, &config.feed_user_agent)?;
    let caption = build_caption(vibe, &keywords, spec.business_name(), spec.offer_text());
    let image = composer.compose(&spec).await?;

    std::fs::write(&args.out, &image.bytes)?;
    println!(
        "wrote {} ({}x{}, {} style, variant {})",
        args.out.display(),
        image.width,
        image.height,
        spec.style().tag(),
        image.variant
    );
    println!("caption: {caption}");
    Ok(())
}
