use anyhow::{bail, Result};
use clap::Parser;
use raceshot_uploader::models::Config;
use raceshot_uploader::{UploadClient, UploadRequest};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PLACEHOLDER_TOKEN: &str = "YOUR_API_TOKEN";
const TOKEN_PAGE_URL: &str = "https://raceshot.com/photographer/api-token";

#[derive(Debug, Parser)]
#[command(name = "raceshot-uploader")]
#[command(about = "Upload a race photo to the RaceShot photographer API")]
struct CliArgs {
    /// Path to the image (JPEG, PNG or HEIF).
    #[arg(long, value_name = "PATH")]
    image: PathBuf,

    #[arg(long)]
    event_id: String,

    /// Bib number shown in the photo; sent as "unknown" when omitted.
    #[arg(long)]
    bib_number: Option<String>,

    /// Where the photo was taken, for example "Finish line".
    #[arg(long)]
    location: String,

    /// Price of the photo; must be at least 60.
    #[arg(long, value_parser = parse_price_arg)]
    price: Decimal,

    /// API token. Falls back to RACESHOT_API_TOKEN.
    #[arg(long)]
    token: Option<String>,

    /// Upload endpoint. Falls back to RACESHOT_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Print the result as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn parse_price_arg(input: &str) -> std::result::Result<Decimal, String> {
    input
        .trim()
        .parse::<Decimal>()
        .map_err(|_| format!("Invalid price '{}'. Expected a decimal number", input))
}

fn resolve_token(flag: Option<String>, config: &Config) -> Result<String> {
    let token = flag
        .or_else(|| config.api_token.clone())
        .unwrap_or_default();

    if token.trim().is_empty() {
        bail!("No API token given. Pass --token or set RACESHOT_API_TOKEN");
    }
    if token == PLACEHOLDER_TOKEN {
        warn!(
            "Replace {} with a real API token, issued at {}",
            PLACEHOLDER_TOKEN, TOKEN_PAGE_URL
        );
        bail!("Placeholder API token");
    }
    Ok(token)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raceshot_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env()?;
    if let Some(api_url) = args.api_url.clone() {
        config.api_url = api_url;
    }
    let token = resolve_token(args.token.clone(), &config)?;

    if !args.image.is_file() {
        error!("Image file not found: {}", args.image.display());
        std::process::exit(1);
    }

    let mut builder = UploadRequest::builder()
        .credential(token)
        .image_path(&args.image)
        .event_id(&args.event_id)
        .location(&args.location)
        .price(args.price);
    if let Some(bib_number) = &args.bib_number {
        builder = builder.bib_number(bib_number);
    }
    let request = builder.build()?;

    let client = UploadClient::from_config(&config)?;
    let result = client.upload(&request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        println!("Upload succeeded");
        println!("Photo ID: {}", result.photo_id.as_deref().unwrap_or("-"));
        println!(
            "Original file ID: {}",
            result.original_file_id.as_deref().unwrap_or("-")
        );
        println!(
            "Cloudflare ID: {}",
            result.cloudflare_id.as_deref().unwrap_or("-")
        );
        println!("Message: {}", result.message);
    } else {
        println!("Upload failed");
        println!("Error: {}", result.message);
    }

    if !result.success {
        std::process::exit(1);
    }
    info!("Upload completed");
    Ok(())
}
