use clap::{Parser, Subcommand};

mod compose;
mod trend;

#[derive(Debug, Parser)]
#[command(name = "buzzmint")]
#[command(about = "Live crowd-moment memes from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch live posts and print the scored trend summary as JSON.
    Trend(trend::TrendArgs),
    /// Render a promotional meme PNG to disk.
    Compose(compose::ComposeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Trend(args) => trend::run(args).await,
        Commands::Compose(args) => compose::run(args).await,
    }
}
