use crate::core::filter::VideoRecord;
use crate::core::transcript::TranscriptError;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

const MAX_NAME_LEN: usize = 80;
const FILE_SUFFIX: &str = ".txt";
const VIDEO_FALLBACK: &str = "video";
const PRODUCT_FALLBACK: &str = "product";

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 _-]+").expect("static pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// File name for one matched video: `<base> - <video id>.txt`.
pub fn video_filename(title: &str, video_id: &str) -> String {
    format!("{} - {video_id}{FILE_SUFFIX}", sanitize_base(title, VIDEO_FALLBACK))
}

/// File name for a product summary: `<base>.txt`.
pub fn product_filename(product: &str) -> String {
    format!("{}{FILE_SUFFIX}", sanitize_base(product, PRODUCT_FALLBACK))
}

fn sanitize_base(raw: &str, fallback: &str) -> String {
    let replaced = DISALLOWED.replace_all(raw, "_");
    let collapsed = WHITESPACE.replace_all(replaced.trim(), " ");
    let base = collapsed.trim();
    if base.is_empty() {
        return fallback.to_string();
    }
    // Only ASCII survives the allow-list, so byte and char lengths agree.
    if base.len() > MAX_NAME_LEN {
        return base[..MAX_NAME_LEN].trim_end().to_string();
    }
    base.to_string()
}

/// What became of a matched video's transcript.
#[derive(Debug)]
pub enum TranscriptBody<'a> {
    Text(&'a str),
    Unavailable(&'a TranscriptError),
}

/// Header plus transcript (or failure line) for a per-video file.
pub fn render_video_file(product: &str, video: &VideoRecord, body: TranscriptBody<'_>) -> String {
    let mut content = format!(
        "Product: {product}\nTitle: {}\nURL: {}\nUploadDate: {}\n\n",
        video.title, video.url, video.upload_date
    );
    match body {
        TranscriptBody::Text(text) => {
            content.push_str(text);
            content.push('\n');
        }
        TranscriptBody::Unavailable(err) => {
            let label = if err.is_unavailable() {
                "Transcript unavailable"
            } else {
                "Transcript error"
            };
            content.push_str(&format!("{label}: {}: {err}\n", err.kind()));
        }
    }
    content
}

/// The dated directory receiving every file of one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    dir: PathBuf,
}

impl RunOutput {
    pub async fn create(root: &Path, run_date: NaiveDate) -> Result<Self> {
        let dir = root.join(run_date.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&dir).await.map_err(|e| {
            Error::custom(format!("Cannot create output directory {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn write_video(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        self.write(file_name, content).await
    }

    pub async fn write_summary(&self, product: &str, summary: &str) -> Result<PathBuf> {
        self.write(&product_filename(product), &format!("{summary}\n"))
            .await
    }

    async fn write(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, content).await?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoRecord {
        VideoRecord {
            id: "dQw4w9WgXcQ".into(),
            title: "Sprint 7 Review".into(),
            upload_date: "20240115".into(),
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
        }
    }

    #[test]
    fn replaces_disallowed_characters() {
        assert_eq!(
            video_filename("TinaCMS - Sprint #12: Review!", "abc"),
            "TinaCMS - Sprint _12_ Review_ - abc.txt"
        );
        assert_eq!(product_filename("Tina.io"), "Tina_io.txt");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(product_filename("  Yak    Shaver  "), "Yak Shaver.txt");
        assert_eq!(product_filename("Yak\tShaver"), "Yak_Shaver.txt");
    }

    #[test]
    fn empty_names_use_fallback() {
        assert_eq!(video_filename("   ", "id1"), "video - id1.txt");
        assert_eq!(product_filename(""), "product.txt");
    }

    #[test]
    fn long_names_are_truncated_then_trimmed() {
        let title = format!("{}  tail", "a".repeat(79));
        let name = video_filename(&title, "id");
        assert_eq!(name, format!("{} - id.txt", "a".repeat(79)));

        let name = product_filename(&"b".repeat(200));
        assert_eq!(name.len(), MAX_NAME_LEN + FILE_SUFFIX.len());
    }

    #[test]
    fn sanitized_names_stay_in_allow_list() {
        for raw in ["ünïcødé ✓ title", "../../etc/passwd", "a/b\\c:d*e?f", "日本語"] {
            let base = sanitize_base(raw, "x");
            assert!(!base.is_empty());
            assert!(base.len() <= MAX_NAME_LEN);
            assert!(
                base.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-')),
                "{base:?}"
            );
        }
    }

    #[test]
    fn renders_transcript_file() {
        let content = render_video_file("TinaCMS", &video(), TranscriptBody::Text("hello\nworld"));
        assert_eq!(
            content,
            "Product: TinaCMS\nTitle: Sprint 7 Review\nURL: https://www.youtube.com/watch?v=dQw4w9WgXcQ\nUploadDate: 20240115\n\nhello\nworld\n"
        );
    }

    #[test]
    fn renders_unavailable_and_error_placeholders() {
        let disabled = TranscriptError::TranscriptsDisabled("dQw4w9WgXcQ".into());
        let content = render_video_file("TinaCMS", &video(), TranscriptBody::Unavailable(&disabled));
        assert!(content.ends_with(&format!(
            "\n\nTranscript unavailable: TranscriptsDisabled: {disabled}\n"
        )));

        let other = TranscriptError::Other("task panicked".into());
        let content = render_video_file("TinaCMS", &video(), TranscriptBody::Unavailable(&other));
        assert!(content.ends_with("\n\nTranscript error: Other: task panicked\n"));
    }

    #[tokio::test]
    async fn run_output_writes_into_dated_directory() {
        let root = tempfile::tempdir().expect("temp dir");
        let date = NaiveDate::from_ymd_opt(2024, 1, 20).expect("date");
        let output = RunOutput::create(root.path(), date).await.expect("created");
        assert_eq!(output.dir(), root.path().join("2024-01-20"));

        let path = output
            .write_summary("Tina.io", "- Shipped X")
            .await
            .expect("written");
        assert_eq!(path, root.path().join("2024-01-20").join("Tina_io.txt"));
        let written = std::fs::read_to_string(path).expect("readable");
        assert_eq!(written, "- Shipped X\n");
    }
}
