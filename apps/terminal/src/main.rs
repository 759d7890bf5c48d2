use std::sync::Arc;

use stocksim_market_data::{DataClient, ReqwestTransport};
use stocksim_terminal::{
    init_tracing, Command, CommandError, Config, Flow, TerminalView, UiController, View,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();

    let transport = Arc::new(ReqwestTransport::new(config.request_timeout));
    let client = Arc::new(
        DataClient::with_transport(config.api_key.clone(), transport)
            .with_base_url(config.base_url.clone()),
    );
    client.set_cache_duration(config.cache_duration);

    let controller = UiController::with_settings(
        client,
        Arc::new(TerminalView::stdout()),
        config.search_debounce,
        config.watchlist.clone(),
    );

    tracing::info!(
        "Stocksim ready: {} (watchlist: {})",
        config.base_url,
        config.watchlist.join(", ")
    );
    if config.api_key == stocksim_terminal::config::DEFAULT_API_KEY {
        tracing::warn!("Using the demo API key, most symbols will return no data");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                controller.view().alert(&e.to_string());
                continue;
            }
        };

        if controller.dispatch(command).await == Flow::Quit {
            break;
        }
    }

    controller.shutdown().await;
    tracing::info!("Stocksim shutting down");
    Ok(())
}
