use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sprint-digest")]
#[command(about = "Collect sprint review transcripts and summarize delivered work per product")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Model used for product summaries
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-5")]
    pub model: String,

    /// Only keep videos uploaded within this many days
    #[arg(long, env = "SPRINT_DAYS_BACK", default_value_t = 30)]
    pub days_back: i64,

    /// Case-insensitive keyword a video title must contain
    #[arg(long, env = "SPRINT_TITLE_KEYWORD", default_value = "sprint")]
    pub keyword: String,

    /// Maximum bullets per product summary
    #[arg(long, env = "SPRINT_MAX_BULLETS", default_value_t = 6)]
    pub max_bullets: usize,

    /// Character budget for the transcripts sent per product
    #[arg(long, env = "SPRINT_MAX_PRODUCT_CHARS", default_value_t = 60_000)]
    pub max_product_chars: usize,

    /// Number of playlist entries scanned per product
    #[arg(long, env = "SPRINT_PLAYLIST_MAX_ITEMS", default_value_t = 12)]
    pub playlist_max_items: usize,

    /// Seconds to wait after each processed video
    #[arg(long, env = "SPRINT_REQUEST_DELAY", default_value_t = 3)]
    pub request_delay: u64,

    /// Preferred transcript languages (comma-separated)
    #[arg(long, env = "SPRINT_LANGUAGES", default_value = "en")]
    pub languages: String,

    /// Browser-exported cookie file used for transcript requests
    #[arg(long, env = "SPRINT_COOKIES_FILE", default_value = "cookies.txt")]
    pub cookies: PathBuf,

    /// Prompt template file
    #[arg(long, env = "SPRINT_PROMPT_FILE", default_value = "prompt.txt")]
    pub prompt_file: PathBuf,

    /// JSON file listing products and their playlists
    #[arg(long, env = "SPRINT_PLAYLISTS_FILE")]
    pub playlists: Option<PathBuf>,

    /// Directory in which the dated run directory is created
    #[arg(long, env = "SPRINT_OUTPUT_ROOT", default_value = ".")]
    pub output_root: PathBuf,

    /// yt-dlp executable
    #[arg(long = "ytdlp", env = "YTDLP_BIN", default_value = "yt-dlp")]
    pub ytdlp_bin: String,

    /// JS runtimes handed to yt-dlp (comma-separated)
    #[arg(long, env = "YTDLP_JS_RUNTIMES")]
    pub ytdlp_js_runtimes: Option<String>,

    /// ffmpeg location handed to yt-dlp
    #[arg(long, env = "YTDLP_FFMPEG_LOCATION")]
    pub ytdlp_ffmpeg_location: Option<String>,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "sprint-digest",
            "--days-back",
            "7",
            "--keyword",
            "review",
            "--max-bullets",
            "3",
        ])
        .expect("valid args");
        assert_eq!(cli.days_back, 7);
        assert_eq!(cli.keyword, "review");
        assert_eq!(cli.max_bullets, 3);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["sprint-digest", "--bogus"]).is_err());
    }
}
