mod options;
mod ytdlp;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::Result;

pub use options::YtdlpOptions;
pub use ytdlp::Ytdlp;

// a direct media url plus the headers the CDN expects alongside it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
  pub url: String,
  pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
  pub title: Option<String>,
  pub thumbnail: Option<String>,
  #[serde(default, deserialize_with = "whole_seconds")]
  pub duration: Option<u64>,
  pub uploader: Option<String>,
  pub view_count: Option<u64>,
}

#[async_trait]
pub trait Extractor: Send + Sync {
  async fn audio_stream(&self, url: &str) -> Result<Extraction>;
  async fn video_info(&self, url: &str) -> Result<VideoInfo>;
}

// yt-dlp reports durations as either integers or floats
fn whole_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  let secs = Option::<f64>::deserialize(deserializer)?;
  Ok(secs.filter(|s| s.is_finite() && *s >= 0.0).map(|s| s.round() as u64))
}
