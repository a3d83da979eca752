//! Playlist listing and per-video metadata through the `yt-dlp` executable.

use crate::core::config::YtdlpOptions;
use crate::core::filter::VideoRecord;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

const MAX_VIDEO_ID_LEN: usize = 128;

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Source of playlist entries and video metadata.
pub trait VideoSource {
    /// Video ids of the playlist in playlist order, at most `max_items`.
    async fn scan_playlist(&self, playlist: &str, max_items: usize) -> Result<Vec<String>>;

    async fn fetch_video(&self, video_id: &str) -> Result<VideoRecord>;
}

#[derive(Debug, Deserialize)]
struct FlatPlaylistJson {
    #[serde(default)]
    entries: Vec<Option<FlatEntryJson>>,
}

#[derive(Debug, Deserialize)]
struct FlatEntryJson {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoInfoJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
}

/// Extracts entry ids from `--flat-playlist --dump-single-json` output.
pub fn parse_playlist_ids(json: &str, max_items: usize) -> Result<Vec<String>> {
    let playlist: FlatPlaylistJson = serde_json::from_str(json)?;
    Ok(playlist
        .entries
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.id)
        .filter(|id| match sanitize_video_id(id) {
            Ok(_) => true,
            Err(e) => {
                warn!("Ignoring playlist entry {id:?}: {e}");
                false
            }
        })
        .take(max_items)
        .collect())
}

/// Builds a record from `--dump-single-json` output of one video.
pub fn parse_video_info(video_id: &str, json: &str) -> Result<VideoRecord> {
    let info: VideoInfoJson = serde_json::from_str(json)?;
    Ok(VideoRecord {
        id: video_id.to_string(),
        title: info.title.unwrap_or_default(),
        upload_date: info.upload_date.unwrap_or_default(),
        url: watch_url(video_id),
    })
}

/// Ensure a video identifier is safe to hand to yt-dlp and to embed in file
/// names: ASCII alphanumerics plus `_` and `-` only.
pub fn sanitize_video_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::custom("Video ID cannot be empty"));
    }

    if trimmed.len() > MAX_VIDEO_ID_LEN {
        return Err(Error::custom("Video ID is unexpectedly long"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(Error::custom(
            "Video ID contains unsupported characters; expected only letters, numbers, '-' or '_'",
        ));
    }

    Ok(trimmed.to_string())
}

pub struct YtDlp {
    options: YtdlpOptions,
}

impl YtDlp {
    /// Confirms the executable runs before any playlist is touched.
    pub async fn new(options: YtdlpOptions) -> Result<Self> {
        let output = Command::new(&options.bin)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::tool_failed(&options.bin, format!("cannot start: {e}")))?;

        if !output.status.success() {
            return Err(Error::tool_failed(
                &options.bin,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }
        debug!(
            "Using {} {}",
            options.bin,
            String::from_utf8_lossy(&output.stdout).trim()
        );

        Ok(Self { options })
    }

    fn base_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--skip-download".into(),
            "--dump-single-json".into(),
        ];
        args.extend(common_args(&self.options));
        args
    }

    async fn run_json(&self, args: &[String]) -> Result<String> {
        let output = Command::new(&self.options.bin)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::tool_failed(&self.options.bin, format!("cannot start: {e}")))?;

        if !output.status.success() {
            return Err(Error::tool_failed(
                &self.options.bin,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Tuning flags shared by every invocation.
fn common_args(options: &YtdlpOptions) -> Vec<String> {
    let mut args = Vec::new();
    for runtime in &options.js_runtimes {
        args.push("--js-runtimes".to_string());
        args.push(runtime.clone());
    }
    if let Some(location) = &options.ffmpeg_location {
        args.push("--ffmpeg-location".to_string());
        args.push(location.clone());
    }
    args
}

impl VideoSource for YtDlp {
    async fn scan_playlist(&self, playlist: &str, max_items: usize) -> Result<Vec<String>> {
        let mut args = self.base_args();
        args.push("--flat-playlist".into());
        if max_items > 0 {
            args.push("--playlist-end".into());
            args.push(max_items.to_string());
        }
        args.push(playlist.to_string());

        let json = self.run_json(&args).await?;
        parse_playlist_ids(&json, max_items)
    }

    async fn fetch_video(&self, video_id: &str) -> Result<VideoRecord> {
        let video_id = sanitize_video_id(video_id)?;
        let mut args = self.base_args();
        args.push("--no-playlist".into());
        args.push(watch_url(&video_id));

        let json = self.run_json(&args).await?;
        parse_video_info(&video_id, &json)
    }
}
