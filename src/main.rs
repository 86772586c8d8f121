use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tui_reddit_app::api::RedditClient;
use tui_reddit_app::config::AppConfig;
use tui_reddit_app::internal::ui::app::App;
use tui_reddit_app::internal::ui::viewport::ViewportMetrics;
use tui_reddit_app::tui;

fn main() -> Result<()> {
    // Load configuration first to get logging settings; what the search
    // found is logged once a subscriber exists.
    let loaded = AppConfig::load();
    let config = &loaded.config;

    // The HTTP client is blocking, so it is built and dropped outside the
    // runtime; fetches run on the blocking pool.
    let client = RedditClient::new(&config.network).context("failed to build HTTP client")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    // While the TUI owns the terminal, logs must not reach stderr/stdout.
    match tui::init() {
        Ok(terminal) => {
            let log_dir = config.logging.log_directory.as_deref().unwrap_or("logs");
            let file_appender = tracing_appender::rolling::daily(log_dir, "tui-reddit-app.log");
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

            // RUST_LOG wins over the configured levels
            let env_filter = match std::env::var("RUST_LOG") {
                Ok(_) => tracing_subscriber::EnvFilter::from_default_env(),
                Err(_) => tracing_subscriber::EnvFilter::new(config.logging.filter_directive()),
            };

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact()
                .init();

            loaded.log();
            let config = loaded.config;
            tracing::info!(collection = %config.default_collection, "starting");

            let viewport = terminal
                .size()
                .map(|size| ViewportMetrics::new(size.height as usize, size.width as usize))
                .unwrap_or_default();
            let mut app = App::new(config, Arc::new(client), viewport);
            let res = runtime.block_on(app.run(terminal));

            // Restore terminal state before exiting so the console is usable again.
            tui::restore()?;
            drop(app);
            runtime.shutdown_timeout(Duration::from_secs(1));

            if let Err(err) = res {
                tracing::error!("{err:#}");
                eprintln!("{err:?}");
            }

            Ok(())
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .init();
            loaded.log();

            eprintln!("Failed to initialize TUI: {e:?}");
            Err(e.into())
        }
    }
}
