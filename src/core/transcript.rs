use crate::error::{Error, Result};
use derive_more::Display;
use std::path::Path;
use tracing::{debug, info};
use yt_transcript_rs::api::YouTubeTranscriptApi;
use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};

/// Typed outcome of a failed transcript retrieval.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum TranscriptError {
    #[display("Transcripts are disabled for video {_0}")]
    TranscriptsDisabled(String),

    #[display("No transcript found for video {_0}")]
    NoTranscriptFound(String),

    #[display("Video {_0} is unavailable")]
    VideoUnavailable(String),

    #[display("{_0}")]
    CouldNotRetrieveTranscript(String),

    #[display("{_0}")]
    Other(String),
}

impl TranscriptError {
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptError::TranscriptsDisabled(_) => "TranscriptsDisabled",
            TranscriptError::NoTranscriptFound(_) => "NoTranscriptFound",
            TranscriptError::VideoUnavailable(_) => "VideoUnavailable",
            TranscriptError::CouldNotRetrieveTranscript(_) => "CouldNotRetrieveTranscript",
            TranscriptError::Other(_) => "Other",
        }
    }

    /// Whether the platform reported the transcript as unobtainable, as
    /// opposed to an unexpected failure on our side.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, TranscriptError::Other(_))
    }
}

impl std::error::Error for TranscriptError {}

/// Maps a retrieval failure for `video_id` onto the typed outcome.
fn classify(video_id: &str, err: CouldNotRetrieveTranscript) -> TranscriptError {
    let video_id = video_id.to_string();
    match err.reason {
        Some(CouldNotRetrieveTranscriptReason::TranscriptsDisabled) => {
            TranscriptError::TranscriptsDisabled(video_id)
        }
        Some(CouldNotRetrieveTranscriptReason::NoTranscriptFound { .. }) => {
            TranscriptError::NoTranscriptFound(video_id)
        }
        Some(CouldNotRetrieveTranscriptReason::VideoUnavailable) => {
            TranscriptError::VideoUnavailable(video_id)
        }
        Some(_) => TranscriptError::CouldNotRetrieveTranscript(err.to_string()),
        None => TranscriptError::Other(err.to_string()),
    }
}

/// Raw access to a transcript provider.
pub trait TranscriptBackend {
    /// Segment texts of the transcript in the first matching language.
    async fn fetch_segments(
        &self,
        video_id: &str,
        languages: &[&str],
    ) -> std::result::Result<Vec<String>, TranscriptError>;

    /// Language codes of every transcript the video offers: manually created
    /// ones first, then generated ones, each group sorted by language code.
    async fn list_languages(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<String>, TranscriptError>;
}

/// YouTube transcripts, optionally authenticated with exported cookies.
pub struct YouTubeBackend {
    api: YouTubeTranscriptApi,
}

impl YouTubeBackend {
    pub fn new(cookie_file: &Path) -> Result<Self> {
        let cookies = if cookie_file.exists() {
            info!("Using cookies from {}", cookie_file.display());
            Some(cookie_file)
        } else {
            None
        };
        let api = YouTubeTranscriptApi::new(cookies, None, None)
            .map_err(|e| Error::custom(format!("Failed to build transcript client: {e}")))?;
        Ok(Self { api })
    }
}

impl TranscriptBackend for YouTubeBackend {
    async fn fetch_segments(
        &self,
        video_id: &str,
        languages: &[&str],
    ) -> std::result::Result<Vec<String>, TranscriptError> {
        let transcript = self
            .api
            .fetch_transcript(video_id, languages, false)
            .await
            .map_err(|e| classify(video_id, e))?;
        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| snippet.text)
            .collect())
    }

    async fn list_languages(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<String>, TranscriptError> {
        let list = self
            .api
            .list_transcripts(video_id)
            .await
            .map_err(|e| classify(video_id, e))?;
        Ok(order_listing(
            list.transcripts()
                .map(|transcript| {
                    (
                        transcript.is_generated(),
                        transcript.language_code().to_string(),
                    )
                })
                .collect(),
        ))
    }
}

pub struct TranscriptService<B = YouTubeBackend> {
    backend: B,
    languages: Vec<String>,
}

impl<B: TranscriptBackend> TranscriptService<B> {
    pub fn new(backend: B, languages: Vec<String>) -> Self {
        Self { backend, languages }
    }

    /// Fetches the transcript in a preferred language, falling back to the
    /// first transcript the video lists, and returns it as newline-joined text.
    pub async fn fetch_text(&self, video_id: &str) -> std::result::Result<String, TranscriptError> {
        let preferred: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let segments = match self.backend.fetch_segments(video_id, &preferred).await {
            Ok(segments) => segments,
            Err(e) => {
                debug!("Preferred transcript unavailable for {video_id} ({e}); trying first listed");
                let listed = self.backend.list_languages(video_id).await?;
                let Some(first) = listed.first() else {
                    return Err(TranscriptError::NoTranscriptFound(video_id.to_string()));
                };
                self.backend
                    .fetch_segments(video_id, &[first.as_str()])
                    .await?
            }
        };

        Ok(join_segments(&segments))
    }
}

/// Orders `(is_generated, language_code)` pairs so the fallback pick does not
/// depend on the provider's hash order.
pub fn order_listing(mut listing: Vec<(bool, String)>) -> Vec<String> {
    listing.sort();
    listing.into_iter().map(|(_, code)| code).collect()
}

/// Trims every segment, drops blank ones and joins the rest with newlines.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
