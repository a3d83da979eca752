use crate::error::Result;
use async_openai::{
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, EasyInputMessageArgs, InputItem, InputParam, OutputItem,
        OutputMessageContent, Role,
    },
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const TRUNCATION_MARKER: &str = "\n[Truncated]\n\n";
pub const NO_DELIVERED_ITEMS: &str = "- No clearly delivered items were stated in the transcripts.";

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•]\s*").expect("static pattern"));
static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[\).\s-]+").expect("static pattern"));

/// A transcript collected for a product during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptItem {
    pub title: String,
    pub url: String,
    pub upload_date: String,
    pub transcript: String,
}

/// Concatenates header-plus-transcript blocks until `max_chars` characters
/// are used. The block that crosses the budget is cut to fit and followed by
/// [`TRUNCATION_MARKER`]; nothing is added after it.
pub fn build_product_context(items: &[TranscriptItem], max_chars: usize) -> String {
    let mut context = String::new();
    let mut total = 0usize;

    for item in items {
        let block = format!(
            "Title: {}\nURL: {}\nUploadDate: {}\n\n{}\n\n",
            item.title, item.url, item.upload_date, item.transcript
        );
        let block_chars = block.chars().count();

        if total + block_chars > max_chars {
            let remaining = max_chars.saturating_sub(total);
            if remaining == 0 {
                break;
            }
            context.extend(block.chars().take(remaining));
            context.push_str(TRUNCATION_MARKER);
            break;
        }

        context.push_str(&block);
        total += block_chars;
        if total >= max_chars {
            break;
        }
    }

    context
}

/// Fills `{product}` and `{max_bullets}` in the prompt template.
pub fn render_prompt(template: &str, product: &str, max_bullets: usize) -> String {
    template
        .replace("{product}", product)
        .replace("{max_bullets}", &max_bullets.to_string())
}

/// Full completion input: prompt, separator, then the transcripts.
pub fn build_summary_input(prompt: &str, context: &str) -> String {
    format!("{prompt}\n\nTranscripts:\n{context}")
}

/// Rewrites model output as at most `max_items` `- ` bullets.
pub fn normalize_bullets(text: &str, max_items: usize) -> String {
    let bullets: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let line = strip_list_markers(line);
            (!line.is_empty()).then(|| format!("- {line}"))
        })
        .collect();

    if bullets.is_empty() {
        return NO_DELIVERED_ITEMS.to_string();
    }
    bullets
        .into_iter()
        .take(max_items)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes bullet and numbering prefixes until none is left, so stacked
/// markers such as `- 1. 2) x` reduce to `x`.
fn strip_list_markers(line: &str) -> &str {
    let mut current = line.trim();
    loop {
        let stripped = match BULLET_PREFIX.find(current) {
            Some(m) => &current[m.end()..],
            None => current,
        };
        let stripped = match NUMBER_PREFIX.find(stripped) {
            Some(m) => &stripped[m.end()..],
            None => stripped,
        }
        .trim();
        if stripped.len() == current.len() {
            return current;
        }
        current = stripped;
    }
}

/// A text-generation endpoint: prompt in, text out.
pub trait Completion {
    async fn complete(&self, input: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct ReportService {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
}

impl ReportService {
    pub fn new(api_key: &str, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: async_openai::Client::with_config(config),
            model: model.to_string(),
        }
    }
}

impl Completion for ReportService {
    async fn complete(&self, input: &str) -> Result<String> {
        let request = CreateResponseArgs::default()
            .model(self.model.as_str())
            .input(InputParam::Items(vec![InputItem::EasyMessage(
                EasyInputMessageArgs::default()
                    .role(Role::User)
                    .content(input)
                    .build()?,
            )]))
            .build()?;

        debug!(model = %self.model, chars = input.chars().count(), "requesting summary");
        let response = self.client.responses().create(request).await?;

        let mut content = String::new();
        for output in response.output {
            if let OutputItem::Message(out) = output {
                for c in out.content {
                    match c {
                        OutputMessageContent::OutputText(text) => content.push_str(&text.text),
                        _ => {
                            warn!("Unexpected content type: {c:?}");
                            continue;
                        }
                    }
                }
            }
        }

        Ok(content)
    }
}

/// Builds the product context, fills the template and asks the model for a
/// summary. Returns the raw model output.
pub async fn summarize_product<C: Completion>(
    completion: &C,
    template: &str,
    product: &str,
    items: &[TranscriptItem],
    max_bullets: usize,
    max_chars: usize,
) -> Result<String> {
    let context = build_product_context(items, max_chars);
    let prompt = render_prompt(template, product, max_bullets);
    completion
        .complete(&build_summary_input(&prompt, &context))
        .await
}
