use std::{ffi::OsString, path::PathBuf};

use itertools::Itertools;

use crate::config::Config;

pub const FORMAT_SELECTOR: &str = "bestaudio/best";

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
  AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const MOBILE_USER_AGENT: &str =
  "com.google.android.youtube/19.09.37 (Linux; U; Android 11) gzip";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

// Command line options handed to yt-dlp for every extraction.
//
// With cookies the session belongs to a browser login, so the web clients
// are used with a matching desktop user agent. Without cookies the mobile
// clients are less likely to be challenged.
#[derive(Debug, Clone, PartialEq)]
pub struct YtdlpOptions {
  pub format: String,
  pub player_clients: Vec<&'static str>,
  pub user_agent: &'static str,
  pub cookie_file: Option<PathBuf>,
  pub force_ipv4: bool,
  pub proxy: Option<String>,
}

impl YtdlpOptions {
  pub fn from_config(config: &Config) -> Self {
    let (player_clients, user_agent, cookie_file) = if config.has_cookies() {
      (
        vec!["web", "mweb"],
        DESKTOP_USER_AGENT,
        Some(config.cookie_file.clone()),
      )
    } else {
      (vec!["android", "ios"], MOBILE_USER_AGENT, None)
    };

    Self {
      format: FORMAT_SELECTOR.to_string(),
      player_clients,
      user_agent,
      cookie_file,
      force_ipv4: config.force_ipv4,
      proxy: config.ytdlp_proxy.clone(),
    }
  }

  // `-j` prints the info json of the selected format, including its `url`
  pub fn stream_args(&self, url: &str) -> Vec<OsString> {
    let mut args = os_args(["-j", "--no-playlist", "--no-warnings"]);
    args.extend(os_args(["-f", self.format.as_str()]));
    args.extend(self.common_args());
    args.push(url.into());
    args
  }

  pub fn info_args(&self, url: &str) -> Vec<OsString> {
    let mut args = os_args([
      "-j",
      "--no-playlist",
      "--no-warnings",
      "--skip-download",
      "--ignore-no-formats-error",
    ]);
    args.extend(self.common_args());
    args.push(url.into());
    args
  }

  fn common_args(&self) -> Vec<OsString> {
    let clients = self.player_clients.iter().join(",");
    let mut args = os_args([
      "--extractor-args",
      format!("youtube:player_client={clients}").as_str(),
      "--user-agent",
      self.user_agent,
      "--add-header",
      format!("Accept-Language:{ACCEPT_LANGUAGE}").as_str(),
    ]);

    if let Some(cookie_file) = &self.cookie_file {
      args.push("--cookies".into());
      args.push(cookie_file.into());
    }

    if self.force_ipv4 {
      args.push("--force-ipv4".into());
    }

    if let Some(proxy) = &self.proxy {
      args.push("--proxy".into());
      args.push(proxy.into());
    }

    args
  }
}

fn os_args<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<OsString> {
  items.into_iter().map(OsString::from).collect()
}
