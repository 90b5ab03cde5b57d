use std::{borrow::Cow, sync::LazyLock};

use http_types::Url;
use regex::Regex;

mod chunked_stream;
#[cfg(test)]
pub mod log_capture;

pub use chunked_stream::ChunkedStream;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

// accepts youtube.com, youtu.be and any of their subdomains
// (www., m., music.) over http(s). a missing scheme means https, since
// yt-dlp resolves bare `youtu.be/<id>` links the same way.
pub fn is_youtube_url(url: &str) -> bool {
  let url = url.trim();
  let parsed = url
    .parse::<Url>()
    .or_else(|_| format!("https://{url}").parse::<Url>());

  let Ok(url) = parsed else {
    return false;
  };

  if !matches!(url.scheme(), "http" | "https") {
    return false;
  }

  let Some(host) = url.host_str() else {
    return false;
  };
  let host = host.to_ascii_lowercase();

  YOUTUBE_HOSTS
    .iter()
    .any(|h| host == *h || host.ends_with(&format!(".{h}")))
}

// used to remove cred info from proxy url before printing
pub fn redact_proxy(proxy: &str) -> Cow<'_, str> {
  static AUTH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[^:/@]+(:[^@]+)?@").unwrap());

  AUTH_REGEX.replace(proxy, "//<REDACTED>@")
}
