use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn, Instrument};

use crate::config::{Config, ServerConfig};
use crate::http::connection::Connection;
use crate::http::handler::Handler;
use crate::site::StaticFiles;

/// Validates the virtual hosts, binds the listen address and serves until
/// the process is stopped.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let handler = Arc::new(StaticFiles::from_config(cfg)?);
    if handler.hosts().is_empty() {
        warn!("no virtual hosts configured, every request will be answered 404");
    }

    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("cannot listen on {}", cfg.server.listen_addr))?;
    info!(
        "Listening on {} with {} virtual hosts",
        cfg.server.listen_addr,
        handler.hosts().len()
    );

    serve(listener, handler, cfg.server.clone()).await
}

/// Accepts connections forever, one task per connection.
///
/// A failed accept is logged and the loop continues.
pub async fn serve<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    settings: ServerConfig,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "failed accepting connection");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let handler = handler.clone();
        let settings = settings.clone();
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, handler, settings);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {:#}", peer, e);
                }
            }
            .instrument(tracing::info_span!("conn", %peer)),
        );
    }
}
