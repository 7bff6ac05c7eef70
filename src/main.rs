use clap::Parser;
use receipt_ocr::config::{Config, DEFAULT_ENGINE_MODE};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "receipt-ocr-server")]
#[command(about = "Extracts naira amounts from receipt images")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "RECEIPT_OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RECEIPT_OCR_PORT", default_value = "9292")]
    pub port: u16,

    /// Engine mode, e.g. "--oem 1 --psm 4 -l eng+osd"
    #[arg(long, env = "RECEIPT_OCR_ENGINE_MODE", default_value = DEFAULT_ENGINE_MODE, allow_hyphen_values = true)]
    pub engine_mode: String,

    /// Confidence at or above which amounts are auto-imported
    #[arg(long, env = "RECEIPT_OCR_CONFIDENCE_THRESHOLD", default_value = "0.80")]
    pub confidence_threshold: f32,

    /// Seconds allowed for a single recognition call
    #[arg(long, env = "RECEIPT_OCR_RECOGNITION_TIMEOUT", default_value = "60")]
    pub recognition_timeout: u64,

    /// Maximum file size in bytes (default: 10MB)
    #[arg(long, env = "RECEIPT_OCR_MAX_FILE_SIZE", default_value = "10485760")]
    pub max_file_size: usize,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            engine_mode: args.engine_mode,
            confidence_threshold: args.confidence_threshold,
            recognition_timeout: Duration::from_secs(args.recognition_timeout),
            max_file_size: args.max_file_size,
            tessdata_path: args.tessdata_path,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(args);

    tracing::info!("Starting receipt-ocr-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Binding to {}:{} (engine mode: {}, threshold: {:.2})",
        config.host,
        config.port,
        config.engine_mode,
        config.confidence_threshold
    );

    receipt_ocr::server::run(config).await
}
