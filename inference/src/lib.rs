//! Minimal HTTP client for the local inference sidecar.
//!
//! The sidecar serves the three models the dialogue engine depends on
//! behind a small REST surface:
//! - `POST /generate` — narrative continuation from a prompt
//! - `POST /extract` — named-entity spans from a sentence
//! - `POST /embed` — fixed-dimension sentence embedding
//!
//! Each concern gets its own focused client so callers only carry the
//! capability they need.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default address of the inference sidecar.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8701";

/// Errors that can occur when talking to the sidecar.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client")
}

fn build_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
    client: &reqwest::Client,
    url: String,
    body: &Req,
) -> Result<Resp, Error> {
    let response = client
        .post(url)
        .headers(build_headers())
        .json(body)
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status,
            message: body,
        });
    }

    response.json().await.map_err(|e| Error::Parse(e.to_string()))
}

// ============================================================================
// Generation
// ============================================================================

/// Sampling and termination options forwarded verbatim to the model.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    pub max_new_tokens: u32,
    pub stop_sequence: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            top_k: 50,
            repetition_penalty: 1.0,
            max_new_tokens: 2000,
            stop_sequence: STOP_TOKEN.to_string(),
        }
    }
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = penalty;
        self
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequence = stop.into();
        self
    }
}

/// A generated continuation plus whatever metadata the model reported.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    /// The cleaned narrative text.
    pub text: String,
    /// Open metadata map (token counts, model name, timing).
    pub meta: serde_json::Map<String, serde_json::Value>,
}

/// Token the model is instructed to end its answer with.
const STOP_TOKEN: &str = "[END]";

/// Marker separating the prompt scaffolding from the model's answer.
const ANSWER_SEPARATOR: &str = "Answer:";

/// Prompt template for the game-master model.
///
/// The preamble is the story hook the whole campaign hangs off; the
/// rest of the scaffolding stays fixed so the answer separator can be
/// relied on when cleaning responses.
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    pub preamble: String,
}

impl SystemPrompt {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Render the full prompt for one turn.
    pub fn render(&self, context: &str, statement: &str) -> String {
        format!(
            "You are the game master and you are talking with a player. \
Respond to the player's actions corresponding to the context.\n\
Generate an answer of 2-3 sentences to the player's action to continue the story. \
End this answer with the token {STOP_TOKEN}\n\
Story Hook: {}\n\
Context: {context}\n\
Player Action: {statement}\n\
{ANSWER_SEPARATOR}\n",
            self.preamble
        )
    }

    /// Strip the echoed prompt and the stop token from raw model output.
    pub fn clean_response(&self, raw: &str) -> String {
        raw.rsplit(ANSWER_SEPARATOR)
            .next()
            .unwrap_or(raw)
            .replace(STOP_TOKEN, "")
            .replace(&STOP_TOKEN.to_lowercase(), "")
            .trim()
            .to_string()
    }
}

/// Client for the game-master generation endpoint.
#[derive(Debug, Clone)]
pub struct MasterClient {
    client: reqwest::Client,
    base_url: String,
    prompt: SystemPrompt,
}

impl MasterClient {
    /// Create a client with the given sidecar address and story hook.
    pub fn new(base_url: impl Into<String>, preamble: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.into(),
            prompt: SystemPrompt::new(preamble),
        }
    }

    /// The prompt template in use.
    pub fn prompt(&self) -> &SystemPrompt {
        &self.prompt
    }

    /// Generate a narrative continuation for one dialogue turn.
    pub async fn generate(
        &self,
        context: &str,
        statement: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationOutcome, Error> {
        let request = ApiGenerateRequest {
            prompt: self.prompt.render(context, statement),
            options: options.clone(),
        };

        let response: ApiGenerateResponse = post_json(
            &self.client,
            format!("{}/generate", self.base_url),
            &request,
        )
        .await?;

        Ok(GenerationOutcome {
            text: self.prompt.clean_response(&response.text),
            meta: response.meta,
        })
    }
}

#[derive(Debug, Serialize)]
struct ApiGenerateRequest {
    prompt: String,
    options: GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    text: String,
    #[serde(default)]
    meta: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Entity extraction
// ============================================================================

/// A named-entity span as reported by the extraction model.
///
/// The category is kept as the raw wire string here; the engine maps it
/// into its closed tag set.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEntity {
    pub text: String,
    pub category: String,
}

/// Client for the named-entity extraction endpoint.
#[derive(Debug, Clone)]
pub struct ExtractorClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExtractorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.into(),
        }
    }

    /// Extract the entity spans mentioned in `text`, in order.
    pub async fn extract(&self, text: &str) -> Result<Vec<ApiEntity>, Error> {
        let response: ApiExtractResponse = post_json(
            &self.client,
            format!("{}/extract", self.base_url),
            &ApiTextRequest { text },
        )
        .await?;
        Ok(response.entities)
    }
}

#[derive(Debug, Serialize)]
struct ApiTextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiExtractResponse {
    #[serde(default)]
    entities: Vec<ApiEntity>,
}

// ============================================================================
// Embeddings
// ============================================================================

/// Client for the sentence-embedding endpoint.
///
/// The embedding dimension is fixed at construction; every vector this
/// client returns has exactly that length.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    dimension: usize,
}

impl EmbeddingClient {
    pub fn new(base_url: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: build_http_client(),
            base_url: base_url.into(),
            dimension,
        }
    }

    /// The fixed dimensionality of vectors produced by this client.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed `text` into a vector of `dimension()` floats.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let response: ApiEmbedResponse = post_json(
            &self.client,
            format!("{}/embed", self.base_url),
            &ApiTextRequest { text },
        )
        .await?;

        if response.vector.len() != self.dimension {
            return Err(Error::Parse(format!(
                "embedding has {} dimensions, expected {}",
                response.vector.len(),
                self.dimension
            )));
        }

        Ok(response.vector)
    }
}

#[derive(Debug, Deserialize)]
struct ApiEmbedResponse {
    vector: Vec<f32>,
}
