use std::io::ErrorKind;
use std::io::Result;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crypto_price_board::board::PriceBoard;
use crypto_price_board::config::Config;
use crypto_price_board::input;
use crypto_price_board::market::source::CoinGeckoSource;
use crypto_price_board::session::Session;
use crypto_price_board::view::html::HtmlView;
use crypto_price_board::view::text::TextView;
use crypto_price_board::view::View;

const DEFAULT_CONFIG_PATH: &str = "board_config.json";

async fn read_config(file_path: &str) -> Result<Config> {
    let config_string = match fs::read_to_string(file_path).await {
        Ok(config_string) => config_string,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config file at {}, using defaults", file_path);
            return Ok(Config::default());
        }
        Err(e) => return Err(e),
    };

    let config: Config = serde_json::from_str(config_string.as_str())?;
    Ok(config)
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Uncaught error: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    install_panic_hook();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match read_config(&config_path).await {
        Ok(config) => config,
        Err(error) => {
            error!("Error reading config file {}: {}", config_path, error);
            return;
        }
    };

    let source = match CoinGeckoSource::new(&config) {
        Ok(source) => source,
        Err(error) => {
            error!("Cannot build market data client: {}", error);
            return;
        }
    };

    let view: Box<dyn View> = match config.html_output {
        Some(ref path) => {
            info!("Rendering board to {}", path);
            Box::new(HtmlView::new(path))
        }
        None => Box::new(TextView::stdout()),
    };

    if config.coingecko_api_key.trim().is_empty() {
        warn!("No CoinGecko API key configured, public rate limits apply");
    }

    let board = Arc::new(PriceBoard::new(Arc::new(source), view));

    let (event_sender, event_receiver) = mpsc::unbounded_channel();
    let listeners = vec![
        input::spawn_stdin_listener(event_sender.clone()),
        input::spawn_signal_listener(event_sender),
    ];

    info!("{}", input::HELP);
    let session = Session::init(board, config.refresh_interval(), listeners);
    session.run(event_receiver).await;

    info!("All tasks finished.");
}
