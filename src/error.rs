use axum::{
  response::{IntoResponse, Response},
  Json,
};
use http::StatusCode;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("Only YouTube URLs are supported currently.")]
  UnsupportedURL(String),
  #[error("yt-dlp failed: {0}")]
  Ytdlp(String),
  #[error("No direct URL found")]
  NoStreamUrl,
  #[error("Failed to parse yt-dlp output: {0}")]
  YtdlpOutput(#[from] serde_json::Error),
  #[error("Failed to extract audio: {0}")]
  Extraction(String),
  #[error("Failed to fetch info: {0}")]
  Info(String),
  #[error("Upstream request failed: {0}")]
  Upstream(#[from] reqwest::Error),
  #[error("IO error: {0}")]
  IO(#[from] std::io::Error),
  #[error(transparent)]
  Internal(#[from] anyhow::Error),
}

impl Error {
  pub fn status_code(&self) -> StatusCode {
    match self {
      Error::UnsupportedURL(_)
      | Error::Ytdlp(_)
      | Error::NoStreamUrl
      | Error::YtdlpOutput(_)
      | Error::Extraction(_)
      | Error::Info(_) => StatusCode::BAD_REQUEST,
      Error::Upstream(_)
      | Error::IO(_)
      | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status_code();
    let body = Json(json!({ "detail": self.to_string() }));
    (status, body).into_response()
  }
}
