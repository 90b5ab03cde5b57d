use axum::{
  body::StreamBody,
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use futures::{StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::{
  app::{AppState, UrlQuery},
  extractor::Extraction,
  util::{is_youtube_url, ChunkedStream},
  Error, Result,
};

pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";
pub const AUDIO_DISPOSITION: &str =
  "attachment; filename=\"forensic-audio.mp3\"";

// Resolves the best audio stream of a video and pipes it to the caller
// without buffering the whole file.
#[axum::debug_handler]
pub async fn resolve_audio(
  State(state): State<AppState>,
  Query(query): Query<UrlQuery>,
) -> Result<impl IntoResponse> {
  if !is_youtube_url(&query.url) {
    return Err(Error::UnsupportedURL(query.url));
  }

  info!("resolving: {}", query.url);
  let extraction = state
    .extractor
    .audio_stream(&query.url)
    .await
    .map_err(|e| Error::Extraction(e.to_string()))?;

  info!("stream url obtained, piping content");
  let upstream = fetch_upstream(&state.http, &extraction).await?;

  let url = query.url;
  let stream = upstream
    .bytes_stream()
    .map_err(Error::from)
    .inspect_err(move |e| warn!("stream for {} aborted: {}", url, e))
    .boxed();
  let body = StreamBody::new(ChunkedStream::new(stream, state.chunk_size));

  let headers = [
    (header::CONTENT_TYPE, AUDIO_MIME_TYPE),
    (header::CONTENT_DISPOSITION, AUDIO_DISPOSITION),
  ];

  Ok((headers, body))
}

async fn fetch_upstream(
  client: &reqwest::Client,
  extraction: &Extraction,
) -> Result<reqwest::Response> {
  let mut request = client.get(&extraction.url);
  for (name, value) in &extraction.headers {
    request = request.header(name.as_str(), value.as_str());
  }

  let response = request.send().await?.error_for_status()?;
  Ok(response)
}
