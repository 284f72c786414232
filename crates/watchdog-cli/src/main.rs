mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use watchdog_core::{AppConfig, Coordinates, ImageInput, PlatformFilter, PostFilter, SentimentFilter};
use watchdog_gemini::GeminiClient;
use watchdog_pipeline::{Controller, PipelineOptions, Submission};

#[derive(Debug, Parser)]
#[command(name = "watchdog")]
#[command(about = "Turn a city problem report into a pressure campaign")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline for one report
    Run(RunArgs),
    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Problem description (e.g. "dziura w drodze")
    #[arg(long)]
    topic: Option<String>,

    /// Place the problem concerns; defaults to `WATCHDOG_DEFAULT_LOCATION`
    #[arg(long)]
    location: Option<String>,

    /// Photo of the problem
    #[arg(long)]
    image: Option<PathBuf>,

    /// Show only posts from this platform (all, twitter, facebook, instagram)
    #[arg(long, default_value = "all")]
    platform: PlatformFilter,

    /// Show only posts with this sentiment (all, negative, neutral, positive)
    #[arg(long, default_value = "all")]
    sentiment: SentimentFilter,

    /// Latitude used to bias place lookups
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude used to bias place lookups
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Print the run as JSON instead of a text report
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn post_filter(&self) -> PostFilter {
        PostFilter {
            platform: self.platform,
            sentiment: self.sentiment,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = watchdog_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run_campaign(&config, args).await,
        Commands::Config => {
            println!("{config:#?}");
            Ok(())
        }
    }
}

/// Drive one run to completion and print the result.
///
/// Progress lines go to stderr as the run advances; the report (or JSON)
/// goes to stdout once it ends.
///
/// # Errors
///
/// Returns an error if the image cannot be read, the coordinates are out of
/// range, the client cannot be built, or the run ends in `Error`.
async fn run_campaign(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let filter = args.post_filter();
    let image = args.image.as_deref().map(ImageInput::from_path).transpose()?;
    let location = args
        .location
        .unwrap_or_else(|| config.default_location.clone());

    let mut options = PipelineOptions::from_config(config);
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let coordinates = Coordinates::new(lat, lon).map_err(|e| anyhow::anyhow!(e))?;
        options.coordinates = Some(coordinates);
    }

    let mut submission = Submission::new(args.topic.unwrap_or_default(), location);
    if let Some(image) = image {
        submission = submission.with_image(image);
    }
    if !submission.is_actionable() {
        anyhow::bail!("nothing to report: pass --topic or --image");
    }

    let client = GeminiClient::from_config(config)?;
    if !client.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; every gateway call will fail");
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = render::event_line(&event) {
                eprintln!("{line}");
            }
        }
    });

    let mut controller = Controller::new(client, options).with_events(tx);
    let result = controller.submit(submission).await;
    let run = controller.run().clone();
    drop(controller);
    progress.await?;

    if args.json {
        let value = render::run_json(&run, &filter);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::Report::new(&run, &filter));
    }

    if let Err(e) = result {
        eprintln!("{}", render::RETRY_PROMPT);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
