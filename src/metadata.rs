use axum::{
  extract::{Query, State},
  Json,
};
use tracing::info;

use crate::{
  app::{AppState, UrlQuery},
  extractor::VideoInfo,
  util::is_youtube_url,
  Error, Result,
};

pub async fn video_info(
  State(state): State<AppState>,
  Query(query): Query<UrlQuery>,
) -> Result<Json<VideoInfo>> {
  if !is_youtube_url(&query.url) {
    return Err(Error::UnsupportedURL(query.url));
  }

  info!("fetching info: {}", query.url);
  let info = state
    .extractor
    .video_info(&query.url)
    .await
    .map_err(|e| Error::Info(e.to_string()))?;

  Ok(Json(info))
}
