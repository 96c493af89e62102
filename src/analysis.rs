//! Reflection on a finished passage by a remote text-analysis model.
//!
//! The request runs on a worker thread and its reply is tagged with the
//! generation of the session that asked for it, so the app can drop replies
//! that arrive after a reset.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No API key; detected before any request is made.
    #[error("reflection API key is not configured")]
    Configuration,
    #[error("reflection request failed: {0}")]
    Service(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Service(e.to_string())
    }
}

/// Text shown in place of a reflection when the call fails
pub fn fallback_message(error: &AnalysisError) -> String {
    match error {
        AnalysisError::Configuration => {
            "The reflection API key is not configured. Set GEMINI_API_KEY to use this feature."
                .to_string()
        }
        AnalysisError::Service(_) => "Sorry, there was an error analyzing your text.".to_string(),
    }
}

pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<String, AnalysisError>;
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following text for its emotional tone and provide one brief, constructive \
         suggestion for improving its clarity or impact.\n\
         Present the analysis in a calm, encouraging, and zen-like manner, as if you are a guide \
         in a peaceful garden.\n\
         Format your response using markdown. Start with a title for the tone \
         (e.g., \"**Tone: Reflective Calm**\"), followed by your suggestion \
         (e.g., \"**A Gentle Suggestion:** ...\").\n\n\
         Text to analyze: \"{}\"",
        text
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        let text = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<String>();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiAnalyzer {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok();
        if api_key.is_none() {
            tracing::warn!("no reflection API key found; reflection mode will not work");
        }
        Self::new(api_key, model)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl Analyzer for GeminiAnalyzer {
    fn analyze(&self, text: &str) -> Result<String, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::Configuration)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(text)),
                }],
            }],
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let response = client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?
            .error_for_status()?;

        response
            .json::<GenerateContentResponse>()?
            .into_text()
            .ok_or_else(|| AnalysisError::Service("response contained no text".to_string()))
    }
}

/// Reply from a reflection worker
#[derive(Debug)]
pub struct ReflectionReply {
    pub generation: u64,
    pub outcome: Result<String, AnalysisError>,
}

/// Runs `analyzer` on a worker thread and sends the tagged reply to `tx`.
pub fn spawn_reflection(
    analyzer: Arc<dyn Analyzer>,
    text: String,
    generation: u64,
    tx: Sender<ReflectionReply>,
) {
    let spawned = thread::Builder::new()
        .name("zengarden-reflection".to_string())
        .spawn(move || {
            let outcome = analyzer.analyze(&text);
            // receiver gone means the app has quit
            let _ = tx.send(ReflectionReply {
                generation,
                outcome,
            });
        });

    if let Err(e) = spawned {
        tracing::error!("failed to spawn reflection worker: {}", e);
    }
}
