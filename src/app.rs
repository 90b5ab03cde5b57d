use std::{
  net::{IpAddr, Ipv4Addr},
  sync::Arc,
  time::{Duration, Instant},
};

use axum::{
  http::Request,
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::get,
  Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::{audio, config::Config, extractor::Extractor, Result};

pub const SERVICE_NAME: &str = "forensic-proxy";

#[derive(Clone)]
pub struct AppState {
  pub extractor: Arc<dyn Extractor>,
  pub http: reqwest::Client,
  pub chunk_size: usize,
}

#[derive(Deserialize)]
pub struct UrlQuery {
  pub url: String,
}

impl AppState {
  pub fn new(config: &Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
    let mut builder =
      reqwest::Client::builder().connect_timeout(Duration::from_secs(15));

    // stream urls are signed for the address family yt-dlp resolved them
    // from, so the fetch has to leave over the same one
    if config.force_ipv4 {
      builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    Ok(Self {
      extractor,
      http: builder.build()?,
      chunk_size: config.chunk_size,
    })
  }
}

pub fn router(state: AppState) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  Router::new()
    .route("/health", get(health))
    .route("/info", get(crate::metadata::video_info))
    .route("/resolve", get(audio::resolve_audio))
    .layer(middleware::from_fn(log_request))
    .layer(cors)
    .with_state(state)
}

async fn health() -> impl IntoResponse {
  Json(json!({ "status": "operational", "service": SERVICE_NAME }))
}

async fn log_request<B>(req: Request<B>, next: Next<B>) -> Response {
  let method = req.method().clone();
  let uri = req.uri().clone();
  let start = Instant::now();

  let response = next.run(req).await;
  let status = response.status();
  let elapsed = start.elapsed();

  if status.is_server_error() {
    error!("{} {} -> {} ({:?})", method, uri, status, elapsed);
  } else {
    info!("{} {} -> {} ({:?})", method, uri, status, elapsed);
  }

  response
}
