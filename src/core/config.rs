use crate::cli::Cli;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_PROMPT: &str = "You are writing internal product delivery updates for SSW employees. \
Summarize the main delivered items for product \"{product}\" based on the transcripts below. \
Focus on shipped/delivered work (not plans). \
Output up to {max_bullets} concise bullet points.";

const DEFAULT_PLAYLISTS: &[(&str, &str)] = &[
    (
        "YakShaver",
        "https://www.youtube.com/playlist?list=PLmfR0xIf_xEcXCxAldVDQGFitxvyEdAjz",
    ),
    (
        "Tina.io",
        "https://www.youtube.com/playlist?list=PLPar4H9PHKVrHmaXk1oDxBBkTYEHmsvjv",
    ),
    (
        "TinaCMS",
        "https://www.youtube.com/playlist?list=PLPar4H9PHKVqKlX1mqe07JZyl1L0zjqpZ",
    ),
    (
        "TinaCloud",
        "https://www.youtube.com/playlist?list=PLPar4H9PHKVrahKk4PzKtcEstFDDMlxzr",
    ),
];

/// A product and the playlist its sprint reviews are published to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub playlist: Option<String>,
}

impl Product {
    /// The playlist to scan, or `None` when the product is skipped.
    pub fn playlist(&self) -> Option<&str> {
        self.playlist
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Settings handed to yt-dlp on every invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YtdlpOptions {
    pub bin: String,
    pub js_runtimes: Vec<String>,
    pub ffmpeg_location: Option<String>,
}

/// Immutable run configuration, built once in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub products: Vec<Product>,
    pub model: String,
    pub api_key: Option<String>,
    pub days_back: i64,
    pub title_keyword: String,
    pub max_bullets: usize,
    pub max_product_chars: usize,
    pub playlist_max_items: usize,
    pub request_delay: Duration,
    pub languages: Vec<String>,
    pub cookies_file: PathBuf,
    pub prompt_template: String,
    pub output_root: PathBuf,
    pub ytdlp: YtdlpOptions,
}

impl Config {
    pub fn from_cli(cli: Cli, api_key: Option<String>) -> Result<Self> {
        let products = match &cli.playlists {
            Some(path) => load_products(path)?,
            None => default_products(),
        };

        let mut languages = split_list(&cli.languages);
        if languages.is_empty() {
            languages.push("en".to_string());
        }

        Ok(Self {
            products,
            model: cli.model,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            days_back: cli.days_back,
            title_keyword: cli.keyword.to_lowercase(),
            max_bullets: cli.max_bullets,
            max_product_chars: cli.max_product_chars,
            playlist_max_items: cli.playlist_max_items,
            request_delay: Duration::from_secs(cli.request_delay),
            languages,
            cookies_file: cli.cookies,
            prompt_template: load_prompt_template(&cli.prompt_file),
            output_root: cli.output_root,
            ytdlp: YtdlpOptions {
                bin: cli.ytdlp_bin,
                js_runtimes: cli
                    .ytdlp_js_runtimes
                    .as_deref()
                    .map(split_list)
                    .unwrap_or_default(),
                ffmpeg_location: cli
                    .ytdlp_ffmpeg_location
                    .filter(|location| !location.trim().is_empty()),
            },
        })
    }
}

pub fn default_products() -> Vec<Product> {
    DEFAULT_PLAYLISTS
        .iter()
        .map(|(name, playlist)| Product {
            name: name.to_string(),
            playlist: Some(playlist.to_string()),
        })
        .collect()
}

pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::custom(format!("Cannot read playlists file {}: {e}", path.display())))?;
    let products: Vec<Product> = serde_json::from_str(&raw)?;
    debug!(count = products.len(), "loaded products from {}", path.display());
    Ok(products)
}

/// Reads the prompt template, falling back to the built-in prompt when the
/// file is missing, unreadable or blank.
pub fn load_prompt_template(path: &Path) -> String {
    if !path.exists() {
        return DEFAULT_PROMPT.to_string();
    }
    match fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => content.trim().to_string(),
        Ok(_) => DEFAULT_PROMPT.to_string(),
        Err(e) => {
            warn!("Cannot read prompt file {}: {e}", path.display());
            DEFAULT_PROMPT.to_string()
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blank_playlist_means_skipped() {
        let product = Product {
            name: "Empty".into(),
            playlist: Some("   ".into()),
        };
        assert_eq!(product.playlist(), None);

        let product = Product {
            name: "None".into(),
            playlist: None,
        };
        assert_eq!(product.playlist(), None);
    }

    #[test]
    fn default_products_keep_declared_order() {
        let names: Vec<_> = default_products().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["YakShaver", "Tina.io", "TinaCMS", "TinaCloud"]);
    }

    #[test]
    fn loads_products_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"name": "Alpha", "playlist": "https://example.com/a"}}, {{"name": "Beta"}}]"#
        )
        .expect("write");

        let products = load_products(file.path()).expect("parses");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].playlist(), Some("https://example.com/a"));
        assert_eq!(products[1].playlist(), None);
    }

    #[test]
    fn prompt_falls_back_when_missing_or_blank() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("prompt.txt");
        assert_eq!(load_prompt_template(&missing), DEFAULT_PROMPT);

        fs::write(&missing, "  \n").expect("write");
        assert_eq!(load_prompt_template(&missing), DEFAULT_PROMPT);

        fs::write(&missing, "\nSummarize {product}\n").expect("write");
        assert_eq!(load_prompt_template(&missing), "Summarize {product}");
    }

    #[test]
    fn splits_comma_lists() {
        assert_eq!(split_list(" node, deno ,,"), ["node", "deno"]);
        assert!(split_list("").is_empty());
    }
}
