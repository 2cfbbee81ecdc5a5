//! Spawns yt-dlp and streams its progress back to the UI thread.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use rust_embed::RustEmbed;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};
use tracing::{debug, info, warn};

use crate::error::{DownloadError, Result};
use crate::model::DownloadEvent;
use crate::progress::{PROGRESS_TEMPLATE, parse_progress_from_line};

/// Bundled fallback binary. `assets/` may legitimately contain no yt-dlp, in
/// which case only a PATH-installed one works.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Asset;

/// How many trailing stderr lines to keep for the failure message.
const STDERR_TAIL: usize = 8;

fn ytdlp_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    }
}

/// Prefers the system yt-dlp; falls back to the embedded copy, unpacked once
/// into the temp dir.
async fn resolve_ytdlp() -> Result<PathBuf> {
    let bin = ytdlp_name();

    if let Ok(status) = Command::new(bin)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        if status.success() {
            return Ok(PathBuf::from(bin));
        }
    }

    let data = Asset::get(bin).ok_or(DownloadError::MissingBinary)?;
    let tmp = std::env::temp_dir().join(bin);
    if !tmp.exists() {
        tokio::fs::write(&tmp, &data.data).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o755)).await?;
        }
    }
    Ok(tmp)
}

/// One `--dump-json` probe for the real title.
async fn fetch_title(bin: &Path, url: &str) -> Result<String> {
    let output = Command::new(bin)
        .args(["--dump-json", "--no-warnings", "--no-playlist", url])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DownloadError::Metadata(stderr.trim().to_string()));
    }

    let info: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| DownloadError::Metadata(e.to_string()))?;
    info.get("title")
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| DownloadError::Metadata("no title in yt-dlp output".to_string()))
}

/// Arguments for the download run. No `-f`: yt-dlp picks its default format.
fn build_args(url: &str, download_folder: &str) -> Vec<String> {
    vec![
        "--no-playlist".to_owned(),
        "--newline".to_owned(),
        "--progress-template".to_owned(),
        PROGRESS_TEMPLATE.to_owned(),
        "-o".to_owned(),
        format!("{}/%(title)s.%(ext)s", download_folder),
        url.to_owned(),
    ]
}

async fn run_ytdlp(
    bin: &Path,
    url: &str,
    download_folder: &str,
    events: &UnboundedSender<DownloadEvent>,
) -> Result<()> {
    tokio::fs::create_dir_all(download_folder).await?;

    let args = build_args(url, download_folder);
    info!(bin = %bin.display(), %url, "spawning yt-dlp");

    let mut child = Command::new(bin)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("yt-dlp stdout was not captured"))?;
    let stderr = child.stderr.take();

    // Drain stderr concurrently, keeping the tail for the failure message.
    let stderr_task = tokio::spawn(async move {
        let mut tail: Vec<String> = Vec::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "ytdlp", "{line}");
                if tail.len() == STDERR_TAIL {
                    tail.remove(0);
                }
                tail.push(line);
            }
        }
        tail
    });

    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_progress_from_line(&line) {
            Some((fraction, speed)) => {
                let _ = events.send(DownloadEvent::Progress { fraction, speed });
            }
            None => debug!(target: "ytdlp", "{line}"),
        }
    }

    let status = child.wait().await?;
    let tail = stderr_task.await.unwrap_or_default();

    if !status.success() {
        return Err(DownloadError::ToolFailed {
            status,
            detail: tail.join("\n"),
        });
    }
    Ok(())
}

/// Worker entry point. Every failure is forwarded as a `Failed` event so the
/// UI never has to notice a dead task.
pub async fn spawn_download(
    url: String,
    download_folder: String,
    events: UnboundedSender<DownloadEvent>,
) {
    if let Err(err) = download(&url, &download_folder, &events).await {
        warn!(%url, error = %err, "download failed");
        let _ = events.send(DownloadEvent::Failed {
            message: err.to_string(),
        });
    }
}

async fn download(
    url: &str,
    download_folder: &str,
    events: &UnboundedSender<DownloadEvent>,
) -> Result<()> {
    let bin = resolve_ytdlp().await?;

    let title = fetch_title(&bin, url).await?;
    let _ = events.send(DownloadEvent::Metadata { title });

    run_ytdlp(&bin, url, download_folder, events).await?;
    let _ = events.send(DownloadEvent::Completed);
    info!(%url, "download finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_args_carry_template_and_destination() {
        let args = build_args("https://youtu.be/abc", "/tmp/dl");

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--newline".to_string()));

        let tpl = args
            .iter()
            .position(|a| a == "--progress-template")
            .expect("template flag present");
        assert_eq!(args[tpl + 1], PROGRESS_TEMPLATE);

        let out = args.iter().position(|a| a == "-o").expect("-o present");
        assert_eq!(args[out + 1], "/tmp/dl/%(title)s.%(ext)s");

        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc"));
    }

    #[test]
    fn no_format_flag_is_passed() {
        let args = build_args("https://youtu.be/abc", "downloads");
        assert!(!args.contains(&"-f".to_string()));
    }
}
