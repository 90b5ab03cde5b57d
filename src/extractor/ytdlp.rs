use std::{collections::HashMap, ffi::OsString, path::PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{process::Command, sync::Semaphore};
use tracing::{debug, warn};

use crate::{config::Config, util::redact_proxy, Error, Result};

use super::{Extraction, Extractor, VideoInfo, YtdlpOptions};

// run yt-dlp command line to resolve stream urls and metadata.
// requires the yt-dlp executable to be in PATH or configured explicitly.
pub struct Ytdlp {
  program: PathBuf,
  options: YtdlpOptions,
  // ensure only a limited set of ytdlp processes at a time
  permits: Semaphore,
}

#[derive(Deserialize)]
struct StreamOutput {
  url: Option<String>,
  #[serde(default)]
  http_headers: HashMap<String, String>,
}

impl Ytdlp {
  pub fn new(config: &Config) -> Self {
    Self {
      program: config.ytdlp_path.clone(),
      options: YtdlpOptions::from_config(config),
      permits: Semaphore::new(config.ytdlp_concurrency),
    }
  }

  pub fn options(&self) -> &YtdlpOptions {
    &self.options
  }

  pub async fn version(&self) -> Result<String> {
    let output = Command::new(&self.program).arg("--version").output().await?;
    if !output.status.success() {
      return Err(Error::Ytdlp(failure_message(
        &output.stderr,
        output.status,
      )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  async fn run(&self, args: Vec<OsString>) -> Result<Vec<u8>> {
    let _guard = self
      .permits
      .acquire()
      .await
      .map_err(|e| Error::Internal(e.into()))?;

    debug!("running {} {}", self.program.display(), display_args(&args));
    let output = Command::new(&self.program)
      .args(args)
      .kill_on_drop(true)
      .output()
      .await?;

    if !output.status.success() {
      let message = failure_message(&output.stderr, output.status);
      warn!("yt-dlp error: {}", message);
      return Err(Error::Ytdlp(message));
    }

    Ok(output.stdout)
  }
}

#[async_trait]
impl Extractor for Ytdlp {
  async fn audio_stream(&self, url: &str) -> Result<Extraction> {
    let stdout = self.run(self.options.stream_args(url)).await?;
    parse_stream_output(&stdout)
  }

  async fn video_info(&self, url: &str) -> Result<VideoInfo> {
    let stdout = self.run(self.options.info_args(url)).await?;
    Ok(serde_json::from_slice(&stdout)?)
  }
}

fn parse_stream_output(stdout: &[u8]) -> Result<Extraction> {
  let output: StreamOutput = serde_json::from_slice(stdout)?;
  let url = output.url.ok_or(Error::NoStreamUrl)?;
  let mut headers: Vec<_> = output.http_headers.into_iter().collect();
  headers.sort();

  Ok(Extraction { url, headers })
}

// proxy credentials never reach the logs
fn display_args(args: &[OsString]) -> String {
  let mut out = Vec::with_capacity(args.len());
  let mut after_proxy = false;

  for arg in args {
    let arg = arg.to_string_lossy();
    if after_proxy {
      out.push(redact_proxy(&arg).into_owned());
    } else {
      out.push(arg.into_owned());
    }
    after_proxy = out.last().is_some_and(|a| a == "--proxy");
  }

  out.join(" ")
}

// prefer the last "ERROR:" line yt-dlp printed over the raw stderr
fn failure_message(stderr: &[u8], status: impl std::fmt::Display) -> String {
  let stderr = String::from_utf8_lossy(stderr);

  if let Some(line) = stderr.lines().rev().find(|l| l.contains("ERROR:")) {
    let (_, message) = line.split_once("ERROR:").unwrap_or(("", line));
    return message.trim().to_string();
  }

  match stderr.trim() {
    "" => format!("yt-dlp exited with {status}"),
    s => s.to_string(),
  }
}
