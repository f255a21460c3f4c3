use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use pitsync::client::cancel_on_signal;
use pitsync::{
    Args, Config, FileStore, HttpPublisher, LogPublisher, MemoryStore, Publisher, ReplaySource, Store, SyncClient,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_args(&args).context("Invalid configuration")?;

    pitsync::logging::init(config.debug);
    info!(version = env!("CARGO_PKG_VERSION"), config = %args.config.display(), "Starting pitsync");

    let Some(recording) = config.simulate.as_ref() else {
        bail!("Live telemetry is only available on Windows; pass --simulate <recording> to replay a session");
    };
    let source = ReplaySource::open(recording)?;

    let publisher: Arc<dyn Publisher> = match &config.post_url {
        Some(url) => {
            let publisher =
                HttpPublisher::new(url, config.access_token.clone(), config.proxy.as_deref(), config.publish_timeout())?;
            info!(url = %publisher.url(), "Publishing over HTTP");
            Arc::new(publisher)
        }
        None => {
            warn!("No post_url configured, messages are only logged");
            Arc::new(LogPublisher)
        }
    };

    let store: Arc<dyn Store> = match &config.state_dir {
        Some(dir) => Arc::new(FileStore::new(dir)?),
        None => {
            info!("No state_dir configured, state is kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), cancel.clone()));

    let mut client = SyncClient::new(source, publisher, store, config.client_settings()?);
    if let Err(e) = client.run(cancel).await {
        error!(error = %e, "Synchronization stopped");
        for suggestion in e.recovery_suggestions() {
            error!("  - {suggestion}");
        }
        return Err(e.into());
    }

    info!("Bye");
    Ok(())
}
