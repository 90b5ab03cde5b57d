use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::info;

use crate::{config::Config, Result};

const NETSCAPE_HEADER: &str = "# Netscape HTTP Cookie File";

// Writes the cookies from the environment to the configured cookie file so
// yt-dlp can pick them up with `--cookies`. Returns the path when written.
pub async fn install(config: &Config) -> Result<Option<PathBuf>> {
  let Some(raw) = config.cookies.as_deref() else {
    info!("no YOUTUBE_COOKIES set, extracting anonymously");
    return Ok(None);
  };

  write_cookie_file(&config.cookie_file, &normalize(raw)).await?;
  info!(
    "wrote YOUTUBE_COOKIES to {} ({} bytes)",
    config.cookie_file.display(),
    raw.len()
  );

  Ok(Some(config.cookie_file.clone()))
}

async fn write_cookie_file(path: &Path, contents: &str) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await?;
  }

  let mut options = OpenOptions::new();
  options.write(true).create(true).truncate(true);
  // new files are owner-only from the moment they exist
  #[cfg(unix)]
  options.mode(0o600);

  let mut file = options.open(path).await?;

  // `mode` only applies on creation, so tighten a pre-existing file too
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    file.set_permissions(perms).await?;
  }

  file.write_all(contents.as_bytes()).await?;
  file.flush().await?;

  Ok(())
}

// Secrets pasted into hosting dashboards often lose their newlines, so
// literal `\n` escapes are turned back into line breaks.
fn normalize(raw: &str) -> String {
  let mut contents = if !raw.contains('\n') && raw.contains("\\n") {
    raw.replace("\\n", "\n")
  } else {
    raw.to_string()
  };

  let has_header = contents
    .lines()
    .next()
    .map(|line| line.starts_with("# ") && line.contains("Cookie File"))
    .unwrap_or(false);

  if !has_header {
    contents.insert_str(0, &format!("{NETSCAPE_HEADER}\n"));
  }

  if !contents.ends_with('\n') {
    contents.push('\n');
  }

  contents
}

#[cfg(test)]
mod tests {
  use super::*;

  const LINE: &str = ".youtube.com\tTRUE\t/\tTRUE\t0\tPREF\tf6=40000000";

  #[test]
  fn test_normalize_adds_header_and_newline() {
    let out = normalize(LINE);
    assert_eq!(out, format!("{NETSCAPE_HEADER}\n{LINE}\n"));
  }

  #[test]
  fn test_normalize_keeps_existing_header() {
    let raw = format!("# HTTP Cookie File\n{LINE}\n");
    assert_eq!(normalize(&raw), raw);
  }

  #[test]
  fn test_normalize_unescapes_newlines() {
    let raw = format!("{NETSCAPE_HEADER}\\n{LINE}");
    assert_eq!(normalize(&raw), format!("{NETSCAPE_HEADER}\n{LINE}\n"));
  }

  #[tokio::test]
  async fn test_install_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
      cookies: Some(LINE.to_string()),
      cookie_file: dir.path().join("nested").join("cookies.txt"),
      ..Default::default()
    };

    let path = install(&config).await.unwrap().unwrap();
    assert_eq!(path, config.cookie_file);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with(NETSCAPE_HEADER));
    assert!(written.contains(LINE));

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      let mode = std::fs::metadata(&path).unwrap().permissions().mode();
      assert_eq!(mode & 0o777, 0o600);
    }
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn test_install_tightens_existing_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");
    let stale = "stale cookies that are longer than the fresh ones".repeat(4);
    std::fs::write(&path, stale).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
      .unwrap();

    let config = Config {
      cookies: Some(LINE.to_string()),
      cookie_file: path.clone(),
      ..Default::default()
    };
    install(&config).await.unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, format!("{NETSCAPE_HEADER}\n{LINE}\n"));
  }

  #[tokio::test]
  async fn test_install_without_cookies() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
      cookie_file: dir.path().join("cookies.txt"),
      ..Default::default()
    };

    assert_eq!(install(&config).await.unwrap(), None);
    assert!(!config.cookie_file.exists());
  }
}
