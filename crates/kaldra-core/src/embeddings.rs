//! **Embeddings** — convert text into the fixed-length vector the Δ12 projector consumes.
//!
//! Implement `Embedder` for any backend. `HashEmbedder` is offline and deterministic;
//! `RemoteEmbedder` calls an OpenAI-compatible `/embeddings` endpoint. Use
//! `create_embedder` to pick one from settings.

use crate::error::{KaldraError, KaldraResult};
use crate::settings::BiasSettings;
use sha2::{Digest, Sha256};

/// Output width of [`HashEmbedder`].
pub const HASH_EMBEDDING_SIZE: usize = 384;

/// √3: maps a byte uniform on [−1, 1] to unit variance.
const UNIT_VARIANCE_SCALE: f32 = 1.732_050_8;

/// Backend converting text to an embedding vector. Calls may block (model inference, HTTP).
pub trait Embedder: Send + Sync {
    /// Embed one text. Must be deterministic for a given (text, model version).
    fn embed(&self, text: &str) -> KaldraResult<Vec<f32>>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Deterministic embedder. Chunk `c` of the output is the SHA-256 digest of the
/// UTF-8 text followed by `c` as little-endian `u32`; each byte is centred and
/// scaled to zero mean and unit variance, so every value lies in [−√3, √3].
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    size: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            size: HASH_EMBEDDING_SIZE,
        }
    }

    /// Embedder with a custom output width (must be > 0).
    pub fn with_size(size: usize) -> KaldraResult<Self> {
        if size == 0 {
            return Err(KaldraError::Config("hash embedding size must be > 0".to_string()));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> KaldraResult<Vec<f32>> {
        let mut out = Vec::with_capacity(self.size);
        let mut chunk: u32 = 0;
        while out.len() < self.size {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(chunk.to_le_bytes());
            let digest = hasher.finalize();
            let take = (self.size - out.len()).min(digest.len());
            out.extend(
                digest[..take]
                    .iter()
                    .map(|&b| (b as f32 / 127.5 - 1.0) * UNIT_VARIANCE_SCALE),
            );
            chunk += 1;
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Remote embedder for OpenAI-compatible APIs (`POST {base_url}/embeddings`).
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    client: reqwest::blocking::Client,
}

impl RemoteEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> KaldraResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| KaldraError::Embedding(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            client,
        })
    }

    /// Build from settings: `embedding_api_url` is required.
    pub fn from_settings(settings: &BiasSettings) -> KaldraResult<Self> {
        let base_url = settings
            .embedding_api_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                KaldraError::Config(
                    "remote embedding backend requires KALDRA_BIAS_EMBEDDING_API_URL".to_string(),
                )
            })?;
        Self::new(
            base_url,
            settings.embedding_api_key.clone(),
            settings.embedding_model.clone(),
        )
    }
}

impl Embedder for RemoteEmbedder {
    fn embed(&self, text: &str) -> KaldraResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let mut req = self.client.post(&url).json(&serde_json::json!({
            "model": self.model,
            "input": text,
        }));
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().map_err(|e| KaldraError::Embedding(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(KaldraError::Embedding(format!(
                "embedding API error {}: {}",
                status, body
            )));
        }
        let json: serde_json::Value = res.json().map_err(|e| KaldraError::Embedding(e.to_string()))?;
        parse_embedding_response(&json)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Extract `data[0].embedding` from an OpenAI-style embeddings response.
fn parse_embedding_response(json: &serde_json::Value) -> KaldraResult<Vec<f32>> {
    let values = json
        .get("data")
        .and_then(|d| d.get(0))
        .and_then(|d| d.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| KaldraError::Embedding("response has no data[0].embedding".to_string()))?;
    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| KaldraError::Embedding("embedding contains a non-number".to_string()))
        })
        .collect()
}

/// Pick the embedder named by `settings.embedding_backend`: "hash" or "remote".
pub fn create_embedder(settings: &BiasSettings) -> KaldraResult<Box<dyn Embedder>> {
    match settings.embedding_backend.trim().to_lowercase().as_str() {
        "hash" => Ok(Box::new(HashEmbedder::new())),
        "remote" => Ok(Box::new(RemoteEmbedder::from_settings(settings)?)),
        other => Err(KaldraError::Config(format!(
            "unknown embedding backend '{}' (expected \"hash\" or \"remote\")",
            other
        ))),
    }
}
