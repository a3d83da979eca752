//! One run: scan every product playlist, persist matched transcripts, then
//! write one summary per product.

use crate::core::{
    Completion, Config, Product, RunOutput, TranscriptBackend, TranscriptBody, TranscriptItem,
    TranscriptService, VideoFilter, VideoSource, normalize_bullets, render_video_file,
    summarize_product, video_filename,
};
use crate::error::Result;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub video_files: usize,
    pub summary_files: usize,
    pub summaries_skipped: bool,
}

/// Per-product result of the scan phase.
#[derive(Debug)]
enum Collected {
    Skipped,
    ScanFailed(String),
    Items(Vec<TranscriptItem>),
}

pub struct Pipeline<'a, V, B> {
    config: &'a Config,
    videos: &'a V,
    transcripts: &'a TranscriptService<B>,
    today: NaiveDate,
}

impl<'a, V: VideoSource, B: TranscriptBackend> Pipeline<'a, V, B> {
    pub fn new(
        config: &'a Config,
        videos: &'a V,
        transcripts: &'a TranscriptService<B>,
        today: NaiveDate,
    ) -> Self {
        Self {
            config,
            videos,
            transcripts,
            today,
        }
    }

    /// Runs the whole pipeline. Only failing to create the output directory
    /// is an error; everything else degrades to placeholder files.
    pub async fn run<C: Completion>(&self, completion: Option<&C>) -> Result<RunSummary> {
        let output = RunOutput::create(&self.config.output_root, self.today).await?;
        let filter = VideoFilter::new(
            &self.config.title_keyword,
            self.config.days_back,
            self.today,
        );

        let mut video_files = 0;
        let mut collected = Vec::with_capacity(self.config.products.len());
        for product in &self.config.products {
            let result = self
                .collect_product(product, &filter, &output, &mut video_files)
                .await;
            collected.push((product, result));
        }
        info!("Wrote {video_files} file(s) to {}", output.dir().display());

        let mut summary = RunSummary {
            output_dir: output.dir().to_path_buf(),
            video_files,
            summary_files: 0,
            summaries_skipped: false,
        };

        let Some(completion) = completion else {
            warn!("OPENAI_API_KEY not set; skipping product summaries.");
            summary.summaries_skipped = true;
            return Ok(summary);
        };

        for (product, result) in &collected {
            let text = self.product_summary(completion, product, result).await;
            match output.write_summary(&product.name, &text).await {
                Ok(path) => {
                    summary.summary_files += 1;
                    info!("Saved summary: {}", path.display());
                }
                Err(e) => error!("Cannot write summary for {}: {e}", product.name),
            }
        }

        Ok(summary)
    }

    async fn collect_product(
        &self,
        product: &Product,
        filter: &VideoFilter,
        output: &RunOutput,
        video_files: &mut usize,
    ) -> Collected {
        let Some(playlist) = product.playlist() else {
            info!("Skipping {}: no playlist URL set", product.name);
            return Collected::Skipped;
        };

        info!("Fetching playlist ({}): {playlist}", product.name);
        let video_ids = match self
            .videos
            .scan_playlist(playlist, self.config.playlist_max_items)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                error!("Playlist fetch failed for {}: {e}", product.name);
                return Collected::ScanFailed(single_line(&e.to_string()));
            }
        };
        info!("Found {} videos in playlist.", video_ids.len());

        let total = video_ids.len();
        let mut items = Vec::new();
        for (idx, video_id) in video_ids.iter().enumerate() {
            let position = idx + 1;
            let video = match self.videos.fetch_video(video_id).await {
                Ok(video) => video,
                Err(e) => {
                    warn!("[{position}/{total}] Skipping {video_id}: metadata fetch failed ({e})");
                    continue;
                }
            };
            info!("[{position}/{total}] {} | {}", video.upload_date, video.title);

            if let Err(reason) = filter.check(&video) {
                debug!("Ignoring {video_id}: {reason:?}");
                continue;
            }

            let fetched = self.transcripts.fetch_text(&video.id).await;
            let content = match &fetched {
                Ok(text) => render_video_file(&product.name, &video, TranscriptBody::Text(text)),
                Err(e) => {
                    warn!("Transcript unavailable for {video_id}: {e}");
                    render_video_file(&product.name, &video, TranscriptBody::Unavailable(e))
                }
            };
            if let Ok(transcript) = fetched {
                items.push(TranscriptItem {
                    title: video.title.clone(),
                    url: video.url.clone(),
                    upload_date: video.upload_date.clone(),
                    transcript,
                });
            }

            let file_name = video_filename(&format!("{} - {}", product.name, video.title), &video.id);
            match output.write_video(&file_name, &content).await {
                Ok(path) => {
                    *video_files += 1;
                    info!("Saved transcript: {}", path.display());
                }
                Err(e) => error!("Cannot write {file_name}: {e}"),
            }

            if !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        Collected::Items(items)
    }

    async fn product_summary<C: Completion>(
        &self,
        completion: &C,
        product: &Product,
        collected: &Collected,
    ) -> String {
        let items = match collected {
            Collected::Skipped => return "- Playlist URL not set for this product.".to_string(),
            Collected::ScanFailed(message) => return format!("- Playlist fetch failed: {message}"),
            Collected::Items(items) => items,
        };

        if items.is_empty() {
            return format!(
                "- No Sprint transcripts found in the last {} days for this product.",
                self.config.days_back
            );
        }

        match summarize_product(
            completion,
            &self.config.prompt_template,
            &product.name,
            items,
            self.config.max_bullets,
            self.config.max_product_chars,
        )
        .await
        {
            Ok(raw) => normalize_bullets(&raw, self.config.max_bullets),
            Err(e) => {
                error!("Summary failed for {}: {e}", product.name);
                format!("- Summary error: {}: {}", e.kind(), single_line(&e.to_string()))
            }
        }
    }
}

fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
