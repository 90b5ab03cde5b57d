use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod audio;
mod config;
mod cookies;
mod error;
mod extractor;
mod metadata;
mod util;

pub use error::{Error, Result};

use crate::{app::AppState, config::Config, extractor::Ytdlp};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let config = Config::from_env().context("invalid configuration")?;

  cookies::install(&config)
    .await
    .context("failed to write cookie file")?;

  let ytdlp = Ytdlp::new(&config);
  match ytdlp.version().await {
    Ok(version) => info!("loaded yt-dlp version: {}", version),
    Err(e) => warn!("could not determine yt-dlp version: {}", e),
  }

  let options = ytdlp.options();
  info!(
    "extracting with player clients [{}], cookies: {}, force ipv4: {}",
    options.player_clients.join(","),
    options.cookie_file.is_some(),
    options.force_ipv4,
  );
  if let Some(proxy) = &options.proxy {
    info!("using proxy: {}", util::redact_proxy(proxy));
  }

  let state = AppState::new(&config, Arc::new(ytdlp))?;
  let app = app::router(state);
  let addr = config.bind_addr;

  Toplevel::<BoxedError>::new(move |s| async move {
    s.start(SubsystemBuilder::new("http", move |subsys| {
      serve(app, addr, subsys)
    }));
  })
  .catch_signals()
  .handle_shutdown_requests(SHUTDOWN_TIMEOUT)
  .await?;

  Ok(())
}

async fn serve(
  app: Router,
  addr: SocketAddr,
  subsys: SubsystemHandle<BoxedError>,
) -> anyhow::Result<()> {
  info!("Listening on {}", addr);

  axum::Server::try_bind(&addr)
    .with_context(|| format!("failed to bind {addr}"))?
    .serve(app.into_make_service())
    .with_graceful_shutdown(subsys.on_shutdown_requested())
    .await?;

  info!("http server stopped");
  Ok(())
}
